//! Trellis - accessible UI primitives over a headless interaction engine.
//!
//! Authors write plain markup with `slot` annotations; the [`Engine`] mounts
//! each widget host, projects ARIA roles, states and id relationships onto the
//! markup, and drives keyboard, pointer, focus and timer input through three
//! shared controllers (disclosure, roving selection and resizer).
//!
//! # Example
//!
//! ```
//! use trellis::{Engine, EventKind, InputEvent, Key};
//!
//! let mut engine = Engine::new();
//! let root = engine.document().root();
//! let doc = engine.document_mut();
//! let tabs = doc.append_element(root, "t-tabs", &[]).unwrap();
//! let first = doc.append_element(tabs, "button", &[("slot", "item"), ("value", "general")]).unwrap();
//! let second = doc.append_element(tabs, "button", &[("slot", "item"), ("value", "advanced")]).unwrap();
//! doc.append_element(tabs, "div", &[("slot", "panel")]).unwrap();
//! doc.append_element(tabs, "div", &[("slot", "panel")]).unwrap();
//!
//! engine.connect_all().unwrap();
//! engine.on(tabs, EventKind::Change, |event| println!("{:?}", event.detail())).unwrap();
//!
//! engine.dispatch(InputEvent::key(first, Key::ArrowRight));
//! assert_eq!(engine.focused(), Some(second));
//! assert_eq!(engine.selected_values(tabs).unwrap(), vec!["advanced".to_string()]);
//! ```

#[cfg(feature = "accessibility")]
pub mod accessibility;
mod config;
pub mod controller;
mod engine;
mod error;
mod event;
pub mod focus;
pub mod identity;
mod input;
pub mod portal;
pub mod scope;
pub mod slot;
pub mod widget;

pub use config::{DelayConfig, EngineConfig, ResizerConfig};
pub use engine::{DispatchResult, Engine};
pub use error::{ConfigError, EngineError, Result};
pub use event::{EventChannel, EventDetail, EventKind, WidgetEvent};
pub use input::{InputEvent, Key, KeyboardModifiers, Point};
pub use widget::{AriaRole, Capability, InstanceId, Orientation, SelectionMode, WidgetInstance, WidgetKind};

pub use trellis_core::{Document, DocumentTreeDebug, NodeId};

/// Logging targets, re-exported for subscriber filters.
pub use trellis_core::logging::targets;
