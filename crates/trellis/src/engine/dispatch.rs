//! Input routing.
//!
//! Every input is offered to the instances that own its target, innermost
//! first. The first instance that handles it stops propagation, so an inner
//! widget's keys never leak into its outer namesake. Keys no owner wants fall
//! back to document-level handling: Tab honours the active focus trap and
//! Escape closes the most recently opened dismissible disclosure.

use trellis_core::logging::targets;
use trellis_core::{DocumentResult, NodeId};

use super::Engine;
use crate::focus;
use crate::input::{InputEvent, Key, KeyboardModifiers, Point};
use crate::widget::kind::TriggerMode;
use crate::widget::InstanceId;

/// Outcome of [`Engine::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchResult {
    /// A widget or document-level handler acted on the input.
    Accepted,
    /// Nothing handled the input.
    Ignored,
    /// The target node does not exist.
    TargetNotFound,
}

impl DispatchResult {
    /// Whether the input was handled.
    pub fn is_accepted(self) -> bool {
        self == DispatchResult::Accepted
    }
}

/// Where a target sits relative to one disclosure instance.
#[derive(Debug, Clone, Copy, Default)]
struct Region {
    trigger: bool,
    content: bool,
    close: bool,
}

impl Engine {
    /// Deliver one input event.
    ///
    /// Errors inside handlers are logged and reported as
    /// [`DispatchResult::Ignored`]; the engine stays consistent either way.
    #[tracing::instrument(skip(self), target = "trellis::dispatch", level = "debug", fields(event = input.name()))]
    pub fn dispatch(&mut self, input: InputEvent) -> DispatchResult {
        if let Some(target) = input.target() {
            if !self.doc.exists(target) {
                tracing::debug!(target: targets::DISPATCH, ?target, "input target not found");
                return DispatchResult::TargetNotFound;
            }
        }

        let coalesce = self.coalesce.take();
        let outcome = match input {
            InputEvent::KeyDown { target, key, modifiers } => self.handle_key(target, key, modifiers),
            InputEvent::Click { target, synthetic } => {
                if synthetic && coalesce == Some(target) {
                    tracing::trace!(target: targets::DISPATCH, ?target, "synthetic click coalesced");
                    Ok(true)
                } else {
                    self.handle_click(target)
                }
            }
            InputEvent::PointerDown { target, point } => self.handle_pointer_down(target, point),
            InputEvent::PointerMove { point } => self.drag_move(point),
            InputEvent::PointerUp { point } => self.drag_end(point),
            InputEvent::PointerEnter { target } => self.handle_hover(target, true),
            InputEvent::PointerLeave { target } => self.handle_hover(target, false),
            InputEvent::FocusIn { target } => {
                self.move_focus(Some(target));
                Ok(true)
            }
            InputEvent::FocusOut { target } => {
                let focused = self.doc.active_element() == Some(target);
                if focused {
                    self.move_focus(None);
                }
                Ok(focused)
            }
            InputEvent::ContextMenu { target, .. } => self.handle_context_menu(target),
        };

        match outcome {
            Ok(true) => DispatchResult::Accepted,
            Ok(false) => DispatchResult::Ignored,
            Err(error) => {
                tracing::warn!(target: targets::DISPATCH, %error, "input handler failed");
                DispatchResult::Ignored
            }
        }
    }

    fn region(&self, id: InstanceId, target: NodeId) -> Region {
        let Some(instance) = self.instances.get(id) else {
            return Region::default();
        };
        let scope = self.scope();
        let inside = |slot: Option<NodeId>| slot.is_some_and(|node| scope.logical_contains(node, target));
        Region {
            trigger: inside(instance.slots.trigger),
            content: inside(instance.slots.content),
            close: inside(instance.slots.close),
        }
    }

    fn is_disabled(&self, id: InstanceId) -> bool {
        self.instances.get(id).is_none_or(|i| i.disabled)
    }

    // =========================================================================
    // Keyboard
    // =========================================================================

    fn handle_key(&mut self, target: NodeId, key: Key, modifiers: KeyboardModifiers) -> DocumentResult<bool> {
        let owners = self.scope().owners(target);
        for id in owners {
            if self.is_disabled(id) {
                continue;
            }
            if self.instance_key(id, target, key, modifiers)? {
                if key.is_activation() {
                    self.coalesce = Some(target);
                }
                return Ok(true);
            }
        }
        match key {
            Key::Tab => self.handle_tab(target, modifiers.shift),
            Key::Escape => self.escape_fallback(),
            _ => Ok(false),
        }
    }

    fn instance_key(
        &mut self,
        id: InstanceId,
        target: NodeId,
        key: Key,
        modifiers: KeyboardModifiers,
    ) -> DocumentResult<bool> {
        let Some(instance) = self.instances.get(id) else {
            return Ok(false);
        };
        let (spec, open) = (instance.disclosure_spec(), instance.is_open());
        let roving = instance.selection.is_some();
        let region = self.region(id, target);

        if let (Some(spec), true) = (spec, region.trigger) {
            match key {
                Key::Enter | Key::Space if spec.trigger == TriggerMode::Click => {
                    self.toggle_disclosure(id)?;
                    return Ok(true);
                }
                Key::ArrowDown | Key::ArrowUp if roving && spec.trigger == TriggerMode::Click => {
                    if open {
                        return Ok(false);
                    }
                    if spec.haspopup == Some("menu") {
                        return self.open_at_edge(id, key == Key::ArrowUp);
                    }
                    return self.open_disclosure(id, true);
                }
                Key::Escape if open => return self.escape_disclosure(id),
                _ => {}
            }
        }

        if roving {
            if let Some(index) = self.item_at(id, target, true) {
                if self.roving_key(id, index, key, modifiers)? {
                    return Ok(true);
                }
            }
        }

        if let Some(index) = self.separator_at(id, target) {
            if self.separator_key(id, index, key)? {
                return Ok(true);
            }
        }

        if spec.is_some() && open && region.content {
            if region.close && key.is_activation() {
                return self.close_disclosure(id, true);
            }
            if key == Key::Escape {
                return self.escape_disclosure(id);
            }
        }
        Ok(false)
    }

    fn handle_tab(&mut self, current: NodeId, backwards: bool) -> DocumentResult<bool> {
        if let Some(trap) = self.traps.active() {
            let next = focus::trap_step(&self.doc, trap.content, Some(current), backwards);
            tracing::trace!(target: targets::DISPATCH, ?next, "tab inside focus trap");
            self.move_focus(Some(next));
            return Ok(true);
        }
        let root = self.doc.root();
        match focus::sequential_target(&self.doc, root, Some(current), backwards) {
            Some(next) => {
                self.move_focus(Some(next));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // =========================================================================
    // Pointer
    // =========================================================================

    fn handle_click(&mut self, target: NodeId) -> DocumentResult<bool> {
        let owners = self.scope().owners(target);
        for id in owners {
            if self.is_disabled(id) {
                continue;
            }
            if self.instance_click(id, target)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn instance_click(&mut self, id: InstanceId, target: NodeId) -> DocumentResult<bool> {
        let Some(instance) = self.instances.get(id) else {
            return Ok(false);
        };
        let (spec, open) = (instance.disclosure_spec(), instance.is_open());
        let region = self.region(id, target);

        if let (Some(spec), true) = (spec, region.trigger) {
            if spec.trigger == TriggerMode::Click {
                self.toggle_disclosure(id)?;
                return Ok(true);
            }
        }
        if let Some(index) = self.item_at(id, target, false) {
            self.move_active(id, index, true)?;
            self.activate_item(id, index)?;
            return Ok(true);
        }
        if open && region.close {
            return self.close_disclosure(id, true);
        }
        Ok(false)
    }

    fn handle_pointer_down(&mut self, target: NodeId, point: Point) -> DocumentResult<bool> {
        let dismissed = self.dismiss_outside(target)?;
        let owners = self.scope().owners(target);
        for id in owners {
            let Some(index) = self.separator_at(id, target) else {
                continue;
            };
            if self.is_disabled(id) {
                return Ok(dismissed);
            }
            if focus::is_focusable(&self.doc, target) {
                self.move_focus(Some(target));
            }
            return Ok(self.drag_start(id, index, point) || dismissed);
        }
        Ok(dismissed)
    }

    /// Whether `target` is inside a hover disclosure's trigger or content.
    fn in_hover_region(&self, id: InstanceId, target: NodeId) -> bool {
        let hover = self
            .instances
            .get(id)
            .and_then(|i| i.disclosure_spec())
            .is_some_and(|spec| spec.trigger == TriggerMode::Hover);
        if !hover || self.is_disabled(id) {
            return false;
        }
        let region = self.region(id, target);
        region.trigger || region.content
    }

    fn handle_hover(&mut self, target: NodeId, entered: bool) -> DocumentResult<bool> {
        let owners = self.scope().owners(target);
        let mut handled = false;
        for id in owners {
            if !self.in_hover_region(id, target) {
                continue;
            }
            if entered {
                self.hover_enter(id)?;
            } else {
                self.hover_leave(id)?;
            }
            handled = true;
        }
        Ok(handled)
    }

    fn handle_context_menu(&mut self, target: NodeId) -> DocumentResult<bool> {
        let owners = self.scope().owners(target);
        for id in owners {
            let context = self
                .instances
                .get(id)
                .and_then(|i| i.disclosure_spec())
                .is_some_and(|spec| spec.trigger == TriggerMode::ContextMenu);
            if !context || self.is_disabled(id) || !self.region(id, target).trigger {
                continue;
            }
            if self.instances.get(id).is_some_and(|i| i.is_open()) {
                self.close_disclosure(id, false)?;
            }
            return self.open_at_edge(id, false);
        }
        Ok(false)
    }

    // =========================================================================
    // Focus reactions
    // =========================================================================

    /// Focus arrived on `node`: sync the roving tab stop and start hover
    /// transitions.
    pub(super) fn focus_arrived(&mut self, node: NodeId) {
        let owners = self.scope().owners(node);
        if let Some((id, index)) = owners
            .iter()
            .find_map(|&id| self.item_at(id, node, true).map(|index| (id, index)))
        {
            if let Err(error) = self.move_active(id, index, false) {
                tracing::warn!(target: targets::DISPATCH, %error, "roving sync failed");
            }
        }
        for id in owners {
            if self.in_hover_region(id, node) {
                if let Err(error) = self.hover_enter(id) {
                    tracing::warn!(target: targets::DISPATCH, %error, "hover open failed");
                }
            }
        }
    }

    /// Focus left `node`: schedule hover disclosures to close.
    pub(super) fn focus_left(&mut self, node: NodeId) {
        let owners = self.scope().owners(node);
        for id in owners {
            if self.in_hover_region(id, node) {
                if let Err(error) = self.hover_leave(id) {
                    tracing::warn!(target: targets::DISPATCH, %error, "hover close failed");
                }
            }
        }
    }
}
