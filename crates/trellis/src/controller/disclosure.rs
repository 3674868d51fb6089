//! Disclosure controller.
//!
//! Opening sets state, projects `aria-expanded`, reveals the content, installs
//! modal semantics, moves focus and relocates portaled content. Closing first
//! closes any disclosure still open inside the content, reverses those steps in
//! the opposite order and then returns focus to the trigger unless focus has
//! already moved somewhere unrelated.

use std::time::Duration;

use trellis_core::logging::targets;
use trellis_core::{DocumentResult, NodeId, TimerId};

use crate::engine::Engine;
use crate::event::{EventDetail, EventKind};
use crate::focus;
use crate::portal::PortalHandle;
use crate::widget::{InstanceId, SelectionMode, WidgetKind};

/// A delayed hover/focus transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingTransition {
    /// The content opens when the delay elapses.
    Open,
    /// The content closes when the delay elapses.
    Close,
}

/// Open/close state of one disclosure instance.
#[derive(Debug, Clone)]
pub struct DisclosureState {
    pub(crate) open: bool,
    pub(crate) persistent: bool,
    pub(crate) return_focus: Option<NodeId>,
    pub(crate) portal: Option<PortalHandle>,
    pub(crate) pending: Option<(TimerId, PendingTransition)>,
    pub(crate) open_delay: Duration,
    pub(crate) close_delay: Duration,
}

impl DisclosureState {
    /// A closed disclosure.
    pub fn new(persistent: bool, open_delay: Duration, close_delay: Duration) -> Self {
        Self {
            open: false,
            persistent,
            return_focus: None,
            portal: None,
            pending: None,
            open_delay,
            close_delay,
        }
    }

    /// Whether the content is shown.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Whether Escape and outside pointer-down are ignored.
    #[inline]
    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    /// Where focus returns on close.
    pub fn return_focus(&self) -> Option<NodeId> {
        self.return_focus
    }

    /// Whether the content currently lives in the overlay container.
    pub fn is_portaled(&self) -> bool {
        self.portal.is_some()
    }

    /// The transition waiting on a timer, if any.
    pub fn pending(&self) -> Option<PendingTransition> {
        self.pending.map(|(_, transition)| transition)
    }

    /// Delay before a hover/focus open.
    pub fn open_delay(&self) -> Duration {
        self.open_delay
    }

    /// Delay before a hover/focus close.
    pub fn close_delay(&self) -> Duration {
        self.close_delay
    }
}

impl Engine {
    pub(crate) fn disclosure_mut(&mut self, id: InstanceId) -> Option<&mut DisclosureState> {
        self.instances.get_mut(id)?.disclosure.as_mut()
    }

    /// Open a disclosure. Returns `false` when it was already open or the
    /// instance is disabled.
    pub(crate) fn open_disclosure(&mut self, id: InstanceId, move_focus: bool) -> DocumentResult<bool> {
        let Some(instance) = self.instances.get(id) else {
            return Ok(false);
        };
        let (Some(spec), Some(state)) = (instance.disclosure_spec(), instance.disclosure.as_ref()) else {
            return Ok(false);
        };
        if state.open || instance.disabled {
            return Ok(false);
        }
        let (kind, host) = (instance.kind, instance.host);
        let (trigger, content) = (instance.slots.trigger, instance.slots.content);

        self.cancel_pending(id);
        if kind == WidgetKind::Collapsible {
            self.close_accordion_siblings(id)?;
        }

        let return_focus = trigger.or(self.doc.active_element());
        if let Some(state) = self.disclosure_mut(id) {
            state.open = true;
            state.return_focus = return_focus;
        }
        self.open_stack.push(id);

        self.doc.set_attribute(host, "open", "")?;
        if let (true, Some(trigger)) = (spec.expanded_attr, trigger) {
            self.doc.set_attribute(trigger, "aria-expanded", "true")?;
        }
        if let Some(content) = content {
            self.doc.remove_attribute(content, "hidden")?;
            if spec.modal {
                self.doc.set_attribute(content, "aria-modal", "true")?;
                self.traps.push(id, content);
            }
            if spec.portaled {
                let handle = self.portals.relocate(&mut self.doc, content)?;
                if let Some(state) = self.disclosure_mut(id) {
                    state.portal = Some(handle);
                }
            }
            if move_focus && spec.focus_content {
                let target = match self.active_item(id) {
                    Some(item) => item,
                    None => focus::first_focus_target(&mut self.doc, content)?,
                };
                self.move_focus(Some(target));
            }
        }

        tracing::debug!(target: targets::DISCLOSURE, kind = kind.name(), ?host, "opened");
        self.emit(id, EventKind::Open, EventDetail::None, false);
        self.emit(id, EventKind::Toggle, EventDetail::Toggle { open: true }, false);
        Ok(true)
    }

    /// Close a disclosure. Returns `false` when it was already closed.
    ///
    /// With `restore_focus`, focus goes back to the recorded trigger unless a
    /// `close` listener prevents it or focus already moved elsewhere.
    pub(crate) fn close_disclosure(&mut self, id: InstanceId, restore_focus: bool) -> DocumentResult<bool> {
        let Some(instance) = self.instances.get(id) else {
            return Ok(false);
        };
        let (Some(spec), Some(state)) = (instance.disclosure_spec(), instance.disclosure.as_ref()) else {
            return Ok(false);
        };
        if !state.open {
            return Ok(false);
        }
        let (kind, host) = (instance.kind, instance.host);
        let (trigger, content) = (instance.slots.trigger, instance.slots.content);
        let (return_focus, portal) = (state.return_focus, state.portal);

        if let Some(content) = content {
            self.close_nested(id, content)?;
        }
        self.cancel_pending(id);
        if let Some(handle) = portal {
            self.portals.restore(&mut self.doc, handle)?;
        }
        self.traps.remove(id);
        if let Some(content) = content {
            self.doc.set_attribute(content, "hidden", "")?;
            if spec.modal {
                self.doc.remove_attribute(content, "aria-modal")?;
            }
        }
        if let (true, Some(trigger)) = (spec.expanded_attr, trigger) {
            self.doc.set_attribute(trigger, "aria-expanded", "false")?;
        }
        self.doc.remove_attribute(host, "open")?;

        if let Some(state) = self.disclosure_mut(id) {
            state.open = false;
            state.portal = None;
            state.return_focus = None;
        }
        self.open_stack.retain(|&open| open != id);

        tracing::debug!(target: targets::DISCLOSURE, kind = kind.name(), ?host, "closed");
        let proceed = self.emit(id, EventKind::Close, EventDetail::None, true);
        self.emit(id, EventKind::Toggle, EventDetail::Toggle { open: false }, false);

        if restore_focus && proceed {
            if let Some(target) = return_focus {
                if self.focus_belongs_to(host, trigger, content, spec.focus_content) {
                    self.move_focus(Some(target));
                }
            }
        }
        Ok(true)
    }

    pub(crate) fn toggle_disclosure(&mut self, id: InstanceId) -> DocumentResult<bool> {
        let open = self.instances.get(id).is_some_and(|i| i.is_open());
        if open {
            self.close_disclosure(id, true)
        } else {
            self.open_disclosure(id, true)
        }
    }

    /// Whether the current focus is still "ours" and may be returned. Lost
    /// focus is only reclaimed by kinds that moved it into the content.
    fn focus_belongs_to(&self, host: NodeId, trigger: Option<NodeId>, content: Option<NodeId>, reclaim: bool) -> bool {
        let Some(active) = self.doc.active_element() else {
            return reclaim;
        };
        let scope = self.scope();
        let inside = active == host
            || trigger.is_some_and(|t| scope.logical_contains(t, active))
            || content.is_some_and(|c| scope.logical_contains(c, active));
        inside || (reclaim && (!self.doc.is_connected(active) || self.doc.is_hidden(active)))
    }

    /// Open disclosures hosted inside `content` close with it, innermost
    /// first. Their focus is not restored; the outer close decides that.
    fn close_nested(&mut self, id: InstanceId, content: NodeId) -> DocumentResult<()> {
        let scope = self.scope();
        let mut nested: Vec<(usize, InstanceId)> = self
            .open_stack
            .iter()
            .copied()
            .filter(|&other| other != id)
            .filter_map(|other| {
                let host = self.instances.get(other)?.host;
                scope
                    .logical_contains(content, host)
                    .then(|| (scope.depth(host), other))
            })
            .collect();
        nested.sort_by(|a, b| b.0.cmp(&a.0));
        for (_, inner) in nested {
            tracing::trace!(target: targets::DISCLOSURE, ?inner, "closing nested disclosure");
            self.close_disclosure(inner, false)?;
        }
        Ok(())
    }

    /// Single-mode accordions keep at most one collapsible open.
    fn close_accordion_siblings(&mut self, id: InstanceId) -> DocumentResult<()> {
        let Some(host) = self.instances.get(id).map(|i| i.host) else {
            return Ok(());
        };
        let scope = self.scope();
        let Some(accordion) = scope.resolve(host, WidgetKind::Accordion) else {
            return Ok(());
        };
        if self.instances.get(accordion).map(|a| a.mode) != Some(SelectionMode::Single) {
            return Ok(());
        }
        let siblings: Vec<InstanceId> = self
            .open_stack
            .iter()
            .copied()
            .filter(|&other| other != id)
            .filter(|&other| {
                self.instances.get(other).is_some_and(|i| {
                    i.kind == WidgetKind::Collapsible
                        && scope.resolve(i.host, WidgetKind::Accordion) == Some(accordion)
                })
            })
            .collect();
        for sibling in siblings {
            tracing::trace!(target: targets::DISCLOSURE, ?sibling, "closing accordion sibling");
            self.close_disclosure(sibling, false)?;
        }
        Ok(())
    }

    /// Whether `target` is inside the instance's host, trigger or content.
    pub(crate) fn disclosure_contains(&self, id: InstanceId, target: NodeId) -> bool {
        let Some(instance) = self.instances.get(id) else {
            return false;
        };
        let scope = self.scope();
        scope.logical_contains(instance.host, target)
            || instance.slots.trigger.is_some_and(|t| scope.logical_contains(t, target))
            || instance.slots.content.is_some_and(|c| scope.logical_contains(c, target))
    }

    /// Close every open, dismissible disclosure that does not contain `target`.
    pub(crate) fn dismiss_outside(&mut self, target: NodeId) -> DocumentResult<bool> {
        let doomed: Vec<InstanceId> = self
            .open_stack
            .iter()
            .rev()
            .copied()
            .filter(|&id| {
                self.instances.get(id).is_some_and(|i| {
                    i.disclosure_spec().is_some_and(|s| s.outside_dismiss)
                        && i.disclosure.as_ref().is_some_and(|d| !d.persistent)
                })
            })
            .filter(|&id| !self.disclosure_contains(id, target))
            .collect();
        let mut closed = false;
        for id in doomed {
            tracing::trace!(target: targets::DISCLOSURE, ?id, ?target, "outside pointer-down");
            closed |= self.close_disclosure(id, true)?;
        }
        Ok(closed)
    }

    /// Escape handling for one disclosure. Persistent disclosures consume the
    /// key without closing.
    pub(crate) fn escape_disclosure(&mut self, id: InstanceId) -> DocumentResult<bool> {
        let Some(instance) = self.instances.get(id) else {
            return Ok(false);
        };
        let dismissible = instance.disclosure_spec().is_some_and(|s| s.escape_dismiss);
        let Some(state) = instance.disclosure.as_ref() else {
            return Ok(false);
        };
        if !state.open || !dismissible {
            return Ok(false);
        }
        if state.persistent {
            tracing::trace!(target: targets::DISCLOSURE, ?id, "escape ignored, persistent");
            return Ok(true);
        }
        self.close_disclosure(id, true)
    }

    /// Escape that reached no owner: the most recently opened dismissible
    /// disclosure handles it.
    pub(crate) fn escape_fallback(&mut self) -> DocumentResult<bool> {
        let candidate = self.open_stack.iter().rev().copied().find(|&id| {
            self.instances
                .get(id)
                .is_some_and(|i| i.disclosure_spec().is_some_and(|s| s.escape_dismiss))
        });
        match candidate {
            Some(id) => self.escape_disclosure(id),
            None => Ok(false),
        }
    }

    pub(crate) fn cancel_pending(&mut self, id: InstanceId) {
        let Some((timer, transition)) = self.disclosure_mut(id).and_then(|s| s.pending.take()) else {
            return;
        };
        self.timer_owners.remove(&timer);
        if let Err(error) = self.timers.stop(timer) {
            tracing::trace!(target: targets::DISCLOSURE, %error, "pending timer already gone");
        }
        tracing::trace!(target: targets::DISCLOSURE, ?id, ?transition, "pending transition cancelled");
    }

    fn schedule(&mut self, id: InstanceId, transition: PendingTransition) -> DocumentResult<()> {
        let Some(state) = self.instances.get(id).and_then(|i| i.disclosure.as_ref()) else {
            return Ok(());
        };
        if state.pending() == Some(transition) {
            return Ok(());
        }
        let delay = match transition {
            PendingTransition::Open => state.open_delay,
            PendingTransition::Close => state.close_delay,
        };
        self.cancel_pending(id);
        if delay.is_zero() {
            return self.run_transition(id, transition);
        }
        let timer = self.timers.start_one_shot(delay);
        self.timer_owners.insert(timer, id);
        if let Some(state) = self.disclosure_mut(id) {
            state.pending = Some((timer, transition));
        }
        tracing::trace!(target: targets::DISCLOSURE, ?id, ?transition, ?delay, "transition scheduled");
        Ok(())
    }

    fn run_transition(&mut self, id: InstanceId, transition: PendingTransition) -> DocumentResult<()> {
        match transition {
            PendingTransition::Open => self.open_disclosure(id, false)?,
            PendingTransition::Close => self.close_disclosure(id, true)?,
        };
        Ok(())
    }

    /// Pointer entered, or focus arrived on, a hover disclosure's trigger or
    /// content.
    pub(crate) fn hover_enter(&mut self, id: InstanceId) -> DocumentResult<()> {
        let open = self.instances.get(id).is_some_and(|i| i.is_open());
        if open {
            self.cancel_pending(id);
            Ok(())
        } else {
            self.schedule(id, PendingTransition::Open)
        }
    }

    /// Pointer left, or focus left, a hover disclosure's trigger or content.
    pub(crate) fn hover_leave(&mut self, id: InstanceId) -> DocumentResult<()> {
        let open = self.instances.get(id).is_some_and(|i| i.is_open());
        if open {
            self.schedule(id, PendingTransition::Close)
        } else {
            self.cancel_pending(id);
            Ok(())
        }
    }

    /// Run the transition owned by an expired timer.
    pub(crate) fn fire_timer(&mut self, timer: TimerId) -> DocumentResult<bool> {
        let Some(id) = self.timer_owners.remove(&timer) else {
            return Ok(false);
        };
        let transition = match self.disclosure_mut(id) {
            Some(state) => match state.pending {
                Some((pending, transition)) if pending == timer => {
                    state.pending = None;
                    transition
                }
                _ => return Ok(false),
            },
            None => return Ok(false),
        };
        tracing::trace!(target: targets::DISCLOSURE, ?id, ?transition, "timer fired");
        self.run_transition(id, transition)?;
        Ok(true)
    }
}
