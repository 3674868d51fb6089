//! Shared fixtures for the engine integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;
use trellis::{DispatchResult, Engine, EngineConfig, EventDetail, EventKind, InputEvent, Key, KeyboardModifiers, NodeId};

/// Install a test-friendly subscriber once. Honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Events recorded from one widget.
pub type EventLog = Arc<Mutex<Vec<(EventKind, EventDetail)>>>;

/// An engine plus markup helpers.
pub struct Fixture {
    pub engine: Engine,
    pub root: NodeId,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        init_tracing();
        let engine = Engine::with_config(config);
        let root = engine.document().root();
        Self { engine, root }
    }

    /// Append an element to `parent`.
    pub fn el(&mut self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        self.engine
            .document_mut()
            .append_element(parent, tag, attrs)
            .unwrap()
    }

    /// Append a `button` carrying `slot`.
    pub fn slotted(&mut self, parent: NodeId, slot: &str) -> NodeId {
        self.el(parent, "button", &[("slot", slot)])
    }

    /// Append `count` items with values `prefix-0`, `prefix-1`, ...
    pub fn items(&mut self, parent: NodeId, prefix: &str, count: usize) -> Vec<NodeId> {
        (0..count)
            .map(|i| {
                let value = format!("{prefix}-{i}");
                self.el(parent, "button", &[("slot", "item"), ("value", value.as_str())])
            })
            .collect()
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        self.engine.document().attribute(node, name).map(str::to_string)
    }

    pub fn hidden(&self, node: NodeId) -> bool {
        self.engine.document().is_hidden(node)
    }

    pub fn key(&mut self, target: NodeId, key: Key) -> DispatchResult {
        self.engine.dispatch(InputEvent::key(target, key))
    }

    pub fn key_with(&mut self, target: NodeId, key: Key, modifiers: KeyboardModifiers) -> DispatchResult {
        self.engine.dispatch(InputEvent::KeyDown { target, key, modifiers })
    }

    /// Press `key` on whatever currently has focus.
    pub fn press(&mut self, key: Key) -> DispatchResult {
        let target = self.engine.focused().expect("something should be focused");
        self.key(target, key)
    }

    pub fn click(&mut self, target: NodeId) -> DispatchResult {
        self.engine.dispatch(InputEvent::click(target))
    }

    /// Items among `nodes` that are in the tab sequence.
    pub fn tab_stops(&self, nodes: &[NodeId]) -> Vec<NodeId> {
        nodes
            .iter()
            .copied()
            .filter(|&n| self.engine.document().attribute(n, "tabindex") == Some("0"))
            .collect()
    }

    /// Record every notification from the widget on `host`.
    pub fn record(&self, host: NodeId) -> EventLog {
        let log: EventLog = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        self.engine
            .listen(host, move |event| {
                sink.lock().push((event.kind(), event.detail().clone()));
            })
            .unwrap();
        log
    }
}

/// Kinds in a log, in emission order.
pub fn kinds(log: &EventLog) -> Vec<EventKind> {
    log.lock().iter().map(|(kind, _)| *kind).collect()
}

/// Markup for a disclosure widget: host, trigger, content.
pub struct Disclosure {
    pub host: NodeId,
    pub trigger: NodeId,
    pub content: NodeId,
}

impl Fixture {
    /// `<t-{kind}>` with a trigger button and a body holding `buttons`
    /// focusable buttons.
    pub fn disclosure(&mut self, parent: NodeId, kind: &str, attrs: &[(&str, &str)], buttons: usize) -> (Disclosure, Vec<NodeId>) {
        let tag = format!("t-{kind}");
        let host = self.el(parent, &tag, attrs);
        let trigger = self.slotted(host, "trigger");
        let content = self.el(host, "div", &[("slot", "body")]);
        let inner = (0..buttons).map(|_| self.el(content, "button", &[])).collect();
        (Disclosure { host, trigger, content }, inner)
    }

    /// A menu with `count` items inside its body.
    pub fn menu(&mut self, parent: NodeId, prefix: &str, count: usize) -> (Disclosure, Vec<NodeId>) {
        let (menu, _) = self.disclosure(parent, "menu", &[], 0);
        let items = self.items(menu.content, prefix, count);
        (menu, items)
    }
}
