//! Widget notifications.
//!
//! Every widget instance owns an [`EventChannel`]. Listeners receive a
//! [`WidgetEvent`] after the engine has already updated state and attributes.
//! Cancelable events let a listener suppress the documented default action
//! via [`WidgetEvent::prevent_default`].

use std::sync::atomic::{AtomicBool, Ordering};

use trellis_core::logging::targets;
use trellis_core::{ConnectionId, NodeId, Signal};

use crate::widget::InstanceId;

/// Notification kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A disclosure opened.
    Open,
    /// A disclosure closed. Default action: return focus to the trigger.
    Close,
    /// A disclosure changed state; detail carries the new state.
    Toggle,
    /// A selection changed.
    Change,
    /// An item was chosen. Cancelable for menus and selects.
    Select,
    /// A toolbar item was activated.
    Action,
    /// A separator finished moving.
    Resize,
}

impl EventKind {
    /// DOM-style event name.
    pub fn name(self) -> &'static str {
        match self {
            EventKind::Open => "open",
            EventKind::Close => "close",
            EventKind::Toggle => "toggle",
            EventKind::Change => "change",
            EventKind::Select => "select",
            EventKind::Action => "action",
            EventKind::Resize => "resize",
        }
    }
}

/// Payload carried by a [`WidgetEvent`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EventDetail {
    /// No detail.
    #[default]
    None,
    /// New disclosure state.
    Toggle { open: bool },
    /// Single selected value.
    Value(String),
    /// All selected values, in item order.
    Values(Vec<String>),
    /// Pressed state of a single toggle item.
    Pressed { item: NodeId, pressed: bool },
    /// The item a select/action refers to.
    Item { item: NodeId, value: String },
    /// Final separator offset and resulting pane sizes.
    Size { value: f64, sizes: Vec<f64> },
}

/// A notification emitted by a widget instance.
#[derive(Debug)]
pub struct WidgetEvent {
    kind: EventKind,
    instance: InstanceId,
    host: NodeId,
    detail: EventDetail,
    cancelable: bool,
    default_prevented: AtomicBool,
}

impl WidgetEvent {
    pub(crate) fn new(
        kind: EventKind,
        instance: InstanceId,
        host: NodeId,
        detail: EventDetail,
        cancelable: bool,
    ) -> Self {
        Self {
            kind,
            instance,
            host,
            detail,
            cancelable,
            default_prevented: AtomicBool::new(false),
        }
    }

    /// The notification kind.
    #[inline]
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// The emitting instance.
    #[inline]
    pub fn instance(&self) -> InstanceId {
        self.instance
    }

    /// The emitting instance's host element.
    #[inline]
    pub fn host(&self) -> NodeId {
        self.host
    }

    /// Event payload.
    #[inline]
    pub fn detail(&self) -> &EventDetail {
        &self.detail
    }

    /// Whether [`prevent_default`](Self::prevent_default) has any effect.
    #[inline]
    pub fn is_cancelable(&self) -> bool {
        self.cancelable
    }

    /// Suppress the default action. No-op for informational events.
    pub fn prevent_default(&self) {
        if self.cancelable {
            self.default_prevented.store(true, Ordering::SeqCst);
        }
    }

    /// Whether a listener suppressed the default action.
    pub fn default_prevented(&self) -> bool {
        self.default_prevented.load(Ordering::SeqCst)
    }
}

/// Per-instance notification channel.
#[derive(Debug, Default)]
pub struct EventChannel {
    signal: Signal<WidgetEvent>,
}

impl EventChannel {
    /// Create an empty channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to every notification.
    pub fn connect<F>(&self, listener: F) -> ConnectionId
    where
        F: Fn(&WidgetEvent) + Send + Sync + 'static,
    {
        self.signal.connect(listener)
    }

    /// Subscribe to one notification kind.
    pub fn on<F>(&self, kind: EventKind, listener: F) -> ConnectionId
    where
        F: Fn(&WidgetEvent) + Send + Sync + 'static,
    {
        self.signal.connect(move |event| {
            if event.kind() == kind {
                listener(event);
            }
        })
    }

    /// Remove a listener.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.signal.disconnect(id)
    }

    /// Remove every listener.
    pub fn disconnect_all(&self) {
        self.signal.disconnect_all();
    }

    /// Number of listeners.
    pub fn listener_count(&self) -> usize {
        self.signal.connection_count()
    }

    /// Deliver an event. Returns `true` unless a listener prevented the default.
    pub(crate) fn emit(&self, event: &WidgetEvent) -> bool {
        tracing::debug!(
            target: targets::DISPATCH,
            event = event.kind().name(),
            host = ?event.host(),
            "emitting widget event"
        );
        self.signal.emit_ref(event);
        !event.default_prevented()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    fn event(kind: EventKind, cancelable: bool) -> WidgetEvent {
        WidgetEvent::new(
            kind,
            InstanceId::default(),
            NodeId::default(),
            EventDetail::None,
            cancelable,
        )
    }

    #[test]
    fn test_prevent_default_only_when_cancelable() {
        let channel = EventChannel::new();
        channel.connect(|e| e.prevent_default());

        assert!(!channel.emit(&event(EventKind::Select, true)));
        assert!(channel.emit(&event(EventKind::Change, false)));
    }

    #[test]
    fn test_on_filters_by_kind() {
        let channel = EventChannel::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        channel.on(EventKind::Open, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        channel.emit(&event(EventKind::Open, false));
        channel.emit(&event(EventKind::Close, true));
        channel.emit(&event(EventKind::Open, false));
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(channel.listener_count(), 1);
    }
}
