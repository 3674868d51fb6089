//! Mounted widget instances.

use slotmap::new_key_type;
use trellis_core::NodeId;

use super::kind::{DisclosureSpec, RovingSpec, WidgetKind};
use super::{Orientation, SelectionMode};
use crate::controller::{DisclosureState, SelectionState, SplitLayout};
use crate::event::EventChannel;

new_key_type! {
    /// A unique identifier for a mounted widget instance.
    ///
    /// Invalidated when the host is disconnected.
    pub struct InstanceId;
}

/// Author elements resolved from named slots at mount time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Slots {
    /// `slot="trigger"`: the element that toggles a disclosure.
    pub trigger: Option<NodeId>,
    /// `slot="body"`: the disclosure content.
    pub content: Option<NodeId>,
    /// `slot="close"`: an explicit close control inside the content.
    pub close: Option<NodeId>,
    /// `slot="panel"`: tab panels, paired with items by position.
    pub panels: Vec<NodeId>,
}

/// State of one mounted widget.
///
/// Each instance exclusively owns its controller state. Other instances only
/// reach it through the scope resolver.
#[derive(Debug)]
pub struct WidgetInstance {
    pub(crate) kind: WidgetKind,
    pub(crate) host: NodeId,
    pub(crate) id: String,
    pub(crate) orientation: Orientation,
    pub(crate) disabled: bool,
    pub(crate) mode: SelectionMode,
    pub(crate) label: Option<String>,
    pub(crate) slots: Slots,
    pub(crate) disclosure: Option<DisclosureState>,
    pub(crate) selection: Option<SelectionState>,
    pub(crate) split: Option<SplitLayout>,
    pub(crate) events: EventChannel,
}

impl WidgetInstance {
    pub(crate) fn new(kind: WidgetKind, host: NodeId, id: String) -> Self {
        Self {
            kind,
            host,
            id,
            orientation: Orientation::default(),
            disabled: false,
            mode: SelectionMode::default(),
            label: None,
            slots: Slots::default(),
            disclosure: None,
            selection: None,
            split: None,
            events: EventChannel::new(),
        }
    }

    /// Widget kind.
    #[inline]
    pub fn kind(&self) -> WidgetKind {
        self.kind
    }

    /// Host element.
    #[inline]
    pub fn host(&self) -> NodeId {
        self.host
    }

    /// Host `id`, generated when the author supplied none.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Parsed orientation.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Whether the host is `disabled`.
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Parsed selection mode.
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Resolved slots.
    pub fn slots(&self) -> &Slots {
        &self.slots
    }

    /// Disclosure state, for disclosure kinds.
    pub fn disclosure(&self) -> Option<&DisclosureState> {
        self.disclosure.as_ref()
    }

    /// Selection state, for roving kinds.
    pub fn selection(&self) -> Option<&SelectionState> {
        self.selection.as_ref()
    }

    /// Pane and separator layout, for split hosts.
    pub fn split(&self) -> Option<&SplitLayout> {
        self.split.as_ref()
    }

    /// Notification channel.
    pub fn events(&self) -> &EventChannel {
        &self.events
    }

    pub(crate) fn disclosure_spec(&self) -> Option<DisclosureSpec> {
        self.kind.disclosure()
    }

    pub(crate) fn roving_spec(&self) -> Option<RovingSpec> {
        self.kind.roving()
    }

    /// Whether the disclosure is open. `false` for other kinds.
    pub fn is_open(&self) -> bool {
        self.disclosure.as_ref().is_some_and(|d| d.open)
    }

    /// Element that carries the roving container role.
    pub(crate) fn roving_container(&self) -> NodeId {
        if self.disclosure.is_some() {
            self.slots.content.unwrap_or(self.host)
        } else {
            self.host
        }
    }
}
