//! The interaction engine.
//!
//! [`Engine`] owns the document, every mounted widget instance and the shared
//! services they use (identity registry, overlay portals, focus traps and the
//! timer wheel). All mutation flows through it, so each operation runs to
//! completion before the next one starts.
//!
//! # Example
//!
//! ```
//! use trellis::{Engine, InputEvent, Key};
//!
//! let mut engine = Engine::new();
//! let root = engine.document().root();
//! let doc = engine.document_mut();
//! let host = doc.append_element(root, "t-collapsible", &[]).unwrap();
//! let trigger = doc.append_element(host, "button", &[("slot", "trigger")]).unwrap();
//! doc.append_element(host, "div", &[("slot", "body")]).unwrap();
//!
//! engine.connect(host).unwrap();
//! engine.dispatch(InputEvent::key(trigger, Key::Enter));
//! assert!(engine.is_open(host).unwrap());
//! assert_eq!(engine.document().attribute(trigger, "aria-expanded"), Some("true"));
//! ```

mod dispatch;
mod mount;

use std::collections::HashMap;
use std::time::Duration;

use slotmap::SlotMap;
use trellis_core::logging::targets;
use trellis_core::{ConnectionId, Document, DocumentError, DocumentTreeDebug, NodeId, TimerId, TimerManager};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::event::{EventDetail, EventKind, WidgetEvent};
use crate::focus::{self, FocusTrapStack};
use crate::identity::IdentityRegistry;
use crate::portal::OverlayPortalManager;
use crate::scope::ScopeResolver;
use crate::widget::{Capability, InstanceId, WidgetInstance, WidgetKind};

pub use dispatch::DispatchResult;

/// An in-progress separator drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct DragState {
    pub(crate) instance: InstanceId,
    pub(crate) separator: usize,
    pub(crate) origin: f64,
    pub(crate) start_value: f64,
}

/// Headless engine hosting accessible widgets over a [`Document`].
pub struct Engine {
    pub(crate) doc: Document,
    pub(crate) config: EngineConfig,
    pub(crate) instances: SlotMap<InstanceId, WidgetInstance>,
    pub(crate) hosts: HashMap<NodeId, InstanceId>,
    pub(crate) identity: IdentityRegistry,
    pub(crate) portals: OverlayPortalManager,
    pub(crate) timers: TimerManager,
    pub(crate) timer_owners: HashMap<TimerId, InstanceId>,
    pub(crate) traps: FocusTrapStack,
    pub(crate) open_stack: Vec<InstanceId>,
    pub(crate) drag: Option<DragState>,
    pub(crate) coalesce: Option<NodeId>,
}

static_assertions::assert_impl_all!(Engine: Send, Sync);

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("nodes", &self.doc.node_count())
            .field("instances", &self.instances.len())
            .field("open", &self.open_stack.len())
            .field("traps", &self.traps.len())
            .field("relocations", &self.portals.active_count())
            .finish()
    }
}

impl Engine {
    /// Create an engine over an empty document with default configuration.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create an engine over an empty document.
    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_document(Document::new(), config)
    }

    /// Create an engine over an empty document, configured from a TOML file.
    pub fn from_config_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let config = EngineConfig::load(path)?;
        Ok(Self::with_config(config))
    }

    /// Create an engine over existing markup. Nothing is mounted until
    /// [`connect`](Self::connect) or [`connect_all`](Self::connect_all).
    pub fn with_document(doc: Document, config: EngineConfig) -> Self {
        tracing::debug!(
            target: targets::ENGINE,
            id_prefix = %config.id_prefix,
            tag_prefix = %config.tag_prefix,
            "engine created"
        );
        Self {
            doc,
            identity: IdentityRegistry::new(config.id_prefix.clone()),
            portals: OverlayPortalManager::new(config.overlay_id.clone()),
            config,
            instances: SlotMap::with_key(),
            hosts: HashMap::new(),
            timers: TimerManager::new(),
            timer_owners: HashMap::new(),
            traps: FocusTrapStack::new(),
            open_stack: Vec::new(),
            drag: None,
            coalesce: None,
        }
    }

    /// The document.
    #[inline]
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Mutable access for building author markup.
    ///
    /// Structural changes made here bypass connect/disconnect callbacks; use
    /// [`append_child`](Self::append_child), [`insert_before`](Self::insert_before),
    /// [`remove`](Self::remove) and [`set_attribute`](Self::set_attribute) for
    /// markup that touches mounted widgets.
    #[inline]
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Render the document tree for debugging.
    pub fn debug_tree(&self) -> String {
        DocumentTreeDebug::new().format_tree(&self.doc)
    }

    // =========================================================================
    // Instances
    // =========================================================================

    /// Instance mounted on `host`.
    pub fn instance_for(&self, host: NodeId) -> Option<InstanceId> {
        self.hosts.get(&host).copied()
    }

    /// Instance state.
    pub fn instance(&self, id: InstanceId) -> Option<&WidgetInstance> {
        self.instances.get(id)
    }

    /// Every mounted instance.
    pub fn instances(&self) -> impl Iterator<Item = (InstanceId, &WidgetInstance)> + '_ {
        self.instances.iter()
    }

    /// Number of mounted instances.
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Nearest instance of `kind` owning `node`, following portal
    /// relocations back to the authored position.
    pub fn resolve_scope(&self, node: NodeId, kind: WidgetKind) -> Option<InstanceId> {
        self.scope().resolve(node, kind)
    }

    pub(crate) fn scope(&self) -> ScopeResolver<'_> {
        ScopeResolver::new(&self.doc, &self.portals, &self.hosts, &self.instances)
    }

    fn mounted(&self, host: NodeId) -> Result<InstanceId> {
        if !self.doc.exists(host) {
            return Err(EngineError::Document(DocumentError::InvalidNode));
        }
        self.instance_for(host).ok_or(EngineError::NotMounted(host))
    }

    fn require(&self, host: NodeId, capability: Capability) -> Result<InstanceId> {
        let id = self.mounted(host)?;
        let kind = self.instances[id].kind;
        if !kind.has(capability) {
            return Err(EngineError::Unsupported {
                kind: kind.name(),
                capability: match capability {
                    Capability::Disclosure => "disclosure",
                    Capability::RovingSelection => "roving selection",
                    Capability::Resizer => "resizing",
                },
            });
        }
        Ok(id)
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    /// Listen for one notification kind on the widget mounted on `host`.
    pub fn on<F>(&self, host: NodeId, kind: EventKind, listener: F) -> Result<ConnectionId>
    where
        F: Fn(&WidgetEvent) + Send + Sync + 'static,
    {
        let id = self.mounted(host)?;
        Ok(self.instances[id].events.on(kind, listener))
    }

    /// Listen for every notification on the widget mounted on `host`.
    pub fn listen<F>(&self, host: NodeId, listener: F) -> Result<ConnectionId>
    where
        F: Fn(&WidgetEvent) + Send + Sync + 'static,
    {
        let id = self.mounted(host)?;
        Ok(self.instances[id].events.connect(listener))
    }

    /// Remove a listener.
    pub fn unlisten(&self, host: NodeId, connection: ConnectionId) -> Result<bool> {
        let id = self.mounted(host)?;
        Ok(self.instances[id].events.disconnect(connection))
    }

    pub(crate) fn emit(&self, id: InstanceId, kind: EventKind, detail: EventDetail, cancelable: bool) -> bool {
        let Some(instance) = self.instances.get(id) else {
            return true;
        };
        let event = WidgetEvent::new(kind, id, instance.host, detail, cancelable);
        instance.events.emit(&event)
    }

    // =========================================================================
    // Disclosure
    // =========================================================================

    /// Open the disclosure mounted on `host`. Returns `false` when it was
    /// already open.
    pub fn open(&mut self, host: NodeId) -> Result<bool> {
        let id = self.require(host, Capability::Disclosure)?;
        Ok(self.open_disclosure(id, true)?)
    }

    /// Close the disclosure mounted on `host`. Returns `false` when it was
    /// already closed.
    pub fn close(&mut self, host: NodeId) -> Result<bool> {
        let id = self.require(host, Capability::Disclosure)?;
        Ok(self.close_disclosure(id, true)?)
    }

    /// Flip the disclosure mounted on `host`.
    pub fn toggle(&mut self, host: NodeId) -> Result<bool> {
        let id = self.require(host, Capability::Disclosure)?;
        Ok(self.toggle_disclosure(id)?)
    }

    /// Whether the disclosure mounted on `host` is open.
    pub fn is_open(&self, host: NodeId) -> Result<bool> {
        let id = self.require(host, Capability::Disclosure)?;
        Ok(self.instances[id].is_open())
    }

    // =========================================================================
    // Roving selection
    // =========================================================================

    /// Index of the item holding the tab stop, `-1` when there is none.
    pub fn active_index(&self, host: NodeId) -> Result<isize> {
        let id = self.require(host, Capability::RovingSelection)?;
        Ok(self.instances[id]
            .selection
            .as_ref()
            .map_or(-1, |s| s.active_index()))
    }

    /// Values of the selected items, in item order.
    pub fn selected_values(&self, host: NodeId) -> Result<Vec<String>> {
        let id = self.require(host, Capability::RovingSelection)?;
        Ok(self.instances[id]
            .selection
            .as_ref()
            .map(|s| s.selected_values())
            .unwrap_or_default())
    }

    /// Move the tab stop to item `index` without activating it.
    pub fn set_active_index(&mut self, host: NodeId, index: usize) -> Result<bool> {
        let id = self.require(host, Capability::RovingSelection)?;
        Ok(self.move_active(id, index, false)?)
    }

    /// Activate item `index` as if the user pressed Enter on it.
    pub fn select_index(&mut self, host: NodeId, index: usize) -> Result<bool> {
        let id = self.require(host, Capability::RovingSelection)?;
        Ok(self.activate_item(id, index)?)
    }

    /// Expand or collapse a hierarchical item.
    pub fn set_expanded(&mut self, host: NodeId, index: usize, expanded: bool) -> Result<bool> {
        let id = self.require(host, Capability::RovingSelection)?;
        Ok(self.set_item_expanded(id, index, expanded)?)
    }

    // =========================================================================
    // Resizer
    // =========================================================================

    /// Current value of separator `index` in the split mounted on `host`.
    pub fn separator_value(&self, host: NodeId, index: usize) -> Result<Option<f64>> {
        let id = self.require(host, Capability::Resizer)?;
        Ok(self.instances[id]
            .split
            .as_ref()
            .and_then(|layout| layout.separators().get(index))
            .map(|s| s.range.value()))
    }

    /// Move separator `index` to `value` (clamped) and emit `resize`.
    pub fn set_separator_value(&mut self, host: NodeId, index: usize, value: f64) -> Result<bool> {
        let id = self.require(host, Capability::Resizer)?;
        Ok(self.set_separator(id, index, value)?)
    }

    // =========================================================================
    // Focus and time
    // =========================================================================

    /// The focused element.
    pub fn focused(&self) -> Option<NodeId> {
        self.doc.active_element()
    }

    /// Focus `node`. Returns `false` when the node cannot take focus.
    pub fn focus(&mut self, node: NodeId) -> Result<bool> {
        if !self.doc.exists(node) {
            return Err(EngineError::Document(DocumentError::InvalidNode));
        }
        if !focus::is_focusable(&self.doc, node) {
            tracing::debug!(target: targets::DISPATCH, ?node, "focus refused, not focusable");
            return Ok(false);
        }
        self.move_focus(Some(node));
        Ok(true)
    }

    /// Clear focus.
    pub fn blur(&mut self) {
        self.move_focus(None);
    }

    /// Move focus and run focus-in/focus-out reactions.
    pub(crate) fn move_focus(&mut self, node: Option<NodeId>) {
        let previous = self.doc.active_element();
        if previous == node {
            return;
        }
        if let Err(error) = self.doc.set_active_element(node) {
            tracing::warn!(target: targets::DISPATCH, %error, "focus target vanished");
            return;
        }
        tracing::trace!(target: targets::DISPATCH, ?previous, ?node, "focus moved");
        if let Some(previous) = previous.filter(|&p| self.doc.exists(p)) {
            self.focus_left(previous);
        }
        if let Some(node) = node {
            self.focus_arrived(node);
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    /// Advance the virtual clock, running every hover/focus transition whose
    /// delay expires. Returns the number of timers that fired.
    #[tracing::instrument(skip(self), target = "trellis::dispatch", level = "trace")]
    pub fn advance_time(&mut self, delta: Duration) -> usize {
        let target = self.timers.now() + delta;
        let mut fired = 0;
        while let Some(timer) = self.timers.fire_next(target) {
            fired += 1;
            if let Err(error) = self.fire_timer(timer) {
                tracing::warn!(target: targets::DISCLOSURE, %error, "timer transition failed");
            }
        }
        self.timers.settle(target);
        fired
    }

    /// Time until the next pending transition.
    pub fn time_until_next_timer(&mut self) -> Option<Duration> {
        self.timers.time_until_next()
    }
}
