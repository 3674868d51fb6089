//! Widget lifecycle: mount, unmount and structural change notifications.

use std::time::Duration;

use trellis_core::logging::targets;
use trellis_core::{Document, DocumentError, DocumentResult, NodeId, TimerId};

use super::Engine;
use crate::config::DelayConfig;
use crate::controller::DisclosureState;
use crate::error::{EngineError, Result};
use crate::identity::RelationKind;
use crate::slot;
use crate::widget::attributes;
use crate::widget::{Capability, InstanceId, Orientation, SelectionMode, Slots, WidgetInstance, WidgetKind};

impl Engine {
    // =========================================================================
    // Mounting
    // =========================================================================

    /// Mount the widget whose host element is `host`.
    ///
    /// Mounting an already mounted host returns its existing instance.
    #[tracing::instrument(skip(self), target = "trellis::mount", level = "debug")]
    pub fn connect(&mut self, host: NodeId) -> Result<InstanceId> {
        if let Some(id) = self.instance_for(host) {
            return Ok(id);
        }
        if !self.doc.exists(host) {
            return Err(EngineError::Document(DocumentError::InvalidNode));
        }
        let tag = self.doc.tag(host).ok_or(DocumentError::NotAnElement)?;
        let Some(kind) = WidgetKind::from_tag(tag, &self.config.tag_prefix) else {
            return Err(EngineError::UnknownWidget { tag: tag.to_string() });
        };
        if !self.doc.is_connected(host) {
            return Err(EngineError::NotConnected(host));
        }

        let element_id = self.identity.ensure_id(&mut self.doc, host)?;
        let mut instance = WidgetInstance::new(kind, host, element_id);
        parse_host(&self.doc, &mut instance);
        instance.slots = self.resolve_slots(kind, host);
        if kind.has(Capability::Disclosure) {
            instance.disclosure = Some(self.disclosure_state(kind, host));
        }

        let id = self.instances.insert(instance);
        self.hosts.insert(host, id);
        if let Err(error) = self.setup(id, kind, host) {
            tracing::warn!(target: targets::MOUNT, kind = kind.name(), %error, "mount failed, rolling back");
            self.unmount(id)?;
            return Err(error.into());
        }
        tracing::debug!(target: targets::MOUNT, kind = kind.name(), ?host, ?id, "mounted");
        Ok(id)
    }

    /// Mount every unmounted widget host in the document, outermost first.
    pub fn connect_all(&mut self) -> Result<Vec<InstanceId>> {
        let root = self.doc.root();
        self.connect_subtree(root)
    }

    fn connect_subtree(&mut self, root: NodeId) -> Result<Vec<InstanceId>> {
        let candidates: Vec<NodeId> = std::iter::once(root)
            .chain(self.doc.descendants(root))
            .filter(|&node| slot::is_widget_host(&self.doc, node, &self.config.tag_prefix))
            .filter(|node| !self.hosts.contains_key(node))
            .collect();
        let mut mounted = Vec::with_capacity(candidates.len());
        for node in candidates {
            // An outer mount may have generated or moved markup.
            if self.doc.is_connected(node) && !self.hosts.contains_key(&node) {
                mounted.push(self.connect(node)?);
            }
        }
        Ok(mounted)
    }

    fn setup(&mut self, id: InstanceId, kind: WidgetKind, host: NodeId) -> DocumentResult<()> {
        if kind.has(Capability::Disclosure) {
            self.setup_disclosure(id)?;
        }
        if kind.has(Capability::RovingSelection) {
            self.setup_roving(id)?;
        }
        if kind.has(Capability::Resizer) {
            self.setup_split(id)?;
        }
        if kind.has(Capability::Disclosure) && attributes::flag(&self.doc, host, "open") {
            self.open_disclosure(id, false)?;
        }
        Ok(())
    }

    fn resolve_slots(&self, kind: WidgetKind, host: NodeId) -> Slots {
        let prefix = &self.config.tag_prefix;
        let mut slots = Slots::default();
        if kind.has(Capability::Disclosure) {
            slots.trigger = slot::resolve_slot(&self.doc, host, "trigger", prefix);
            slots.content = slot::resolve_slot(&self.doc, host, "body", prefix);
            slots.close = slot::resolve_slot(&self.doc, host, "close", prefix);
            if slots.trigger.is_none() {
                tracing::warn!(target: targets::MOUNT, kind = kind.name(), ?host, "missing trigger slot");
            }
            if slots.content.is_none() {
                tracing::warn!(target: targets::MOUNT, kind = kind.name(), ?host, "missing body slot");
            }
        }
        if kind.roving().is_some_and(|spec| spec.panels) {
            slots.panels = slot::resolve_all(&self.doc, host, "panel", prefix);
        }
        slots
    }

    fn delays(&self, kind: WidgetKind, host: NodeId) -> (Duration, Duration) {
        let defaults = match kind {
            WidgetKind::HoverCard => self.config.hover_card,
            WidgetKind::Tooltip => self.config.tooltip,
            _ => DelayConfig {
                open_delay_ms: 0,
                close_delay_ms: 0,
            },
        };
        (
            attributes::millis(&self.doc, host, "open-delay").unwrap_or(defaults.open_delay()),
            attributes::millis(&self.doc, host, "close-delay").unwrap_or(defaults.close_delay()),
        )
    }

    fn disclosure_state(&self, kind: WidgetKind, host: NodeId) -> DisclosureState {
        let (open_delay, close_delay) = self.delays(kind, host);
        DisclosureState::new(
            attributes::flag(&self.doc, host, "persistent"),
            open_delay,
            close_delay,
        )
    }

    /// Project the closed-state ARIA and register trigger/content ids.
    fn setup_disclosure(&mut self, id: InstanceId) -> DocumentResult<()> {
        let Some(instance) = self.instances.get(id) else {
            return Ok(());
        };
        let Some(spec) = instance.disclosure_spec() else {
            return Ok(());
        };
        let (trigger, content) = (instance.slots.trigger, instance.slots.content);
        let label = instance.label.clone();

        if let Some(trigger) = trigger {
            if let Some(popup) = spec.haspopup {
                self.doc.set_attribute(trigger, "aria-haspopup", popup)?;
            }
            if spec.expanded_attr {
                self.doc.set_attribute(trigger, "aria-expanded", "false")?;
            }
        }
        let Some(content) = content else {
            return Ok(());
        };
        slot::project_role(&mut self.doc, content, spec.content_role)?;
        self.doc.set_attribute(content, "hidden", "")?;
        if let Some(trigger) = trigger {
            self.identity
                .relate(&mut self.doc, id, trigger, content, spec.relation)?;
        }
        match (label, trigger) {
            (Some(label), _) => self.doc.set_attribute(content, "aria-label", label)?,
            (None, Some(trigger)) if spec.labelled_by_trigger => {
                self.identity
                    .relate(&mut self.doc, id, content, trigger, RelationKind::LabelledBy)?;
            }
            _ => {}
        }
        Ok(())
    }

    // =========================================================================
    // Unmounting
    // =========================================================================

    /// Unmount the widget on `host` and every widget logically nested in it,
    /// innermost first.
    #[tracing::instrument(skip(self), target = "trellis::mount", level = "debug")]
    pub fn disconnect(&mut self, host: NodeId) -> Result<()> {
        let id = self.mounted(host)?;
        let scope = self.scope();
        let mut nested: Vec<(usize, InstanceId)> = self
            .hosts
            .iter()
            .filter(|&(&node, &other)| other != id && scope.logical_contains(host, node))
            .map(|(&node, &other)| (scope.depth(node), other))
            .collect();
        nested.sort_by(|a, b| b.0.cmp(&a.0));
        for (_, inner) in nested {
            self.unmount(inner)?;
        }
        self.unmount(id)?;
        Ok(())
    }

    /// Release everything one instance registered.
    fn unmount(&mut self, id: InstanceId) -> DocumentResult<()> {
        let Some(instance) = self.instances.get(id) else {
            return Ok(());
        };
        let (kind, host) = (instance.kind, instance.host);
        let portal = instance.disclosure.as_ref().and_then(|d| d.portal);

        self.cancel_pending(id);
        let timers: Vec<TimerId> = self
            .timer_owners
            .iter()
            .filter(|&(_, &owner)| owner == id)
            .map(|(&timer, _)| timer)
            .collect();
        for timer in timers {
            self.timer_owners.remove(&timer);
            if let Err(error) = self.timers.stop(timer) {
                tracing::trace!(target: targets::MOUNT, ?timer, %error, "timer already stopped");
            }
        }

        if let Some(handle) = portal {
            self.portals.restore(&mut self.doc, handle)?;
        }
        self.traps.remove(id);
        self.open_stack.retain(|&open| open != id);
        if self.drag.is_some_and(|drag| drag.instance == id) {
            self.drag = None;
        }
        self.teardown_split(id)?;
        self.identity.release(&mut self.doc, id);

        if let Some(instance) = self.instances.remove(id) {
            instance.events.disconnect_all();
        }
        self.hosts.remove(&host);
        tracing::debug!(target: targets::MOUNT, kind = kind.name(), ?host, "unmounted");
        Ok(())
    }

    // =========================================================================
    // Structural changes
    // =========================================================================

    /// Append `child` under `parent`, mounting any widget hosts it brings and
    /// refreshing the items of the widgets that own `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` under `parent` before `reference`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) -> Result<()> {
        let previous = self.scope().logical_parent(child);
        self.doc.insert_before(parent, child, reference)?;
        if self.doc.is_connected(child) {
            self.connect_subtree(child)?;
        }
        if let Some(previous) = previous.filter(|&p| p != parent && self.doc.exists(p)) {
            self.refresh_owners(previous)?;
        }
        self.refresh_owners(parent)?;
        Ok(())
    }

    /// Detach `node`, unmounting every widget inside it first.
    #[tracing::instrument(skip(self), target = "trellis::mount", level = "debug")]
    pub fn remove(&mut self, node: NodeId) -> Result<()> {
        if !self.doc.exists(node) {
            return Err(EngineError::Document(DocumentError::InvalidNode));
        }
        let parent = self.scope().logical_parent(node);
        let scope = self.scope();
        let mut inside: Vec<(usize, NodeId)> = self
            .hosts
            .keys()
            .copied()
            .filter(|&host| scope.logical_contains(node, host))
            .map(|host| (scope.depth(host), host))
            .collect();
        inside.sort_by_key(|&(depth, _)| depth);
        for (_, host) in inside {
            // Cascades already removed hosts nested in an earlier one.
            if self.hosts.contains_key(&host) {
                self.disconnect(host)?;
            }
        }

        if self.doc.active_element().is_some_and(|active| self.doc.contains(node, active)) {
            self.move_focus(None);
        }
        self.doc.detach(node)?;
        if let Some(parent) = parent {
            self.refresh_owners(parent)?;
        }
        Ok(())
    }

    /// Re-collect items for every roving widget owning `node`.
    fn refresh_owners(&mut self, node: NodeId) -> DocumentResult<()> {
        let owners = self.scope().owners(node);
        for id in owners {
            if self.instances.get(id).is_some_and(|i| i.selection.is_some()) {
                self.refresh_items(id)?;
            }
        }
        Ok(())
    }

    // =========================================================================
    // Attribute changes
    // =========================================================================

    /// Set an attribute and apply its effect on mounted widgets.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()> {
        self.doc.set_attribute(node, name, value)?;
        self.attribute_changed(node, &name.to_ascii_lowercase())?;
        Ok(())
    }

    /// Remove an attribute and apply its effect on mounted widgets.
    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<Option<String>> {
        let previous = self.doc.remove_attribute(node, name)?;
        if previous.is_some() {
            self.attribute_changed(node, &name.to_ascii_lowercase())?;
        }
        Ok(previous)
    }

    fn attribute_changed(&mut self, node: NodeId, name: &str) -> DocumentResult<()> {
        let Some(id) = self.instance_for(node) else {
            if matches!(name, "disabled" | "slot" | "value" | "data-value" | "data-level") {
                self.refresh_owners(node)?;
            }
            return Ok(());
        };
        let kind = self.instances[id].kind;
        tracing::trace!(target: targets::MOUNT, kind = kind.name(), name, "host attribute changed");

        match name {
            "open" if kind.has(Capability::Disclosure) => {
                if attributes::flag(&self.doc, node, "open") {
                    self.open_disclosure(id, false)?;
                } else {
                    self.close_disclosure(id, false)?;
                }
            }
            "persistent" => {
                let persistent = attributes::flag(&self.doc, node, "persistent");
                if let Some(state) = self.disclosure_mut(id) {
                    state.persistent = persistent;
                }
            }
            "open-delay" | "close-delay" => {
                let (open_delay, close_delay) = self.delays(kind, node);
                if let Some(state) = self.disclosure_mut(id) {
                    state.open_delay = open_delay;
                    state.close_delay = close_delay;
                }
            }
            "disabled" | "orientation" | "mode" | "multiple" | "label" => self.reparse(id)?,
            "value" if kind.has(Capability::RovingSelection) => self.sync_value(id)?,
            "min" | "max" | "step" if kind.has(Capability::Resizer) => self.update_split_limits(id)?,
            _ => {}
        }
        Ok(())
    }

    /// Select the items whose value matches the host `value`. Programmatic
    /// changes do not emit `change`.
    fn sync_value(&mut self, id: InstanceId) -> DocumentResult<()> {
        let Some(instance) = self.instances.get_mut(id) else {
            return Ok(());
        };
        let value = attributes::text(&self.doc, instance.host, "value");
        if let (Some(value), Some(state)) = (value, instance.selection.as_mut()) {
            let keys: Vec<String> = state
                .items()
                .iter()
                .filter(|item| item.value == value)
                .map(|item| item.key.clone())
                .collect();
            state.set_selected_keys(keys);
        }
        self.render_selection(id)
    }

    /// Re-read host attributes and re-project.
    fn reparse(&mut self, id: InstanceId) -> DocumentResult<()> {
        let Some(instance) = self.instances.get_mut(id) else {
            return Ok(());
        };
        parse_host(&self.doc, instance);
        let (mode, orientation) = (instance.mode, instance.orientation);
        if let Some(state) = instance.selection.as_mut() {
            state.set_mode(mode);
            state.set_orientation(orientation);
        }
        if let Some(layout) = instance.split.as_mut() {
            layout.set_orientation(orientation);
        }
        let content = instance.disclosure.as_ref().and(instance.slots.content);
        if let (Some(content), Some(label)) = (content, instance.label.clone()) {
            self.doc.set_attribute(content, "aria-label", label)?;
        }
        self.render_selection(id)?;
        self.render_split_instance(id)
    }
}

/// Read the host attributes shared by every kind.
fn parse_host(doc: &Document, instance: &mut WidgetInstance) {
    let (kind, host) = (instance.kind, instance.host);
    let roving = kind.roving();
    let default_orientation = roving.map_or(Orientation::Horizontal, |s| s.default_orientation);
    let default_mode = match (kind, roving) {
        (WidgetKind::Accordion, _) => SelectionMode::Single,
        (_, Some(spec)) => spec.default_mode,
        (_, None) => SelectionMode::None,
    };
    instance.orientation = attributes::orientation(doc, host, default_orientation);
    instance.mode = attributes::mode(doc, host, default_mode);
    instance.disabled = attributes::flag(doc, host, "disabled");
    instance.label = attributes::text(doc, host, "label");
}
