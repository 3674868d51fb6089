//! Core systems for Trellis.
//!
//! This crate provides the foundational pieces the widget engine builds on:
//!
//! - **Document**: A headless, arena-backed element tree with attributes and focus
//! - **Signal/Slot System**: Type-safe change notification
//! - **Timers**: One-shot and repeating timers driven by a virtual clock
//! - **Logging**: `tracing` targets and document tree visualization
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use trellis_core::{Document, Signal, TimerManager};
//!
//! let mut doc = Document::new();
//! let root = doc.root();
//! let dialog = doc.append_element(root, "t-dialog", &[("id", "confirm")]).unwrap();
//!
//! let opened = Signal::<bool>::new();
//! opened.connect(|open| println!("dialog open: {open}"));
//! opened.emit(true);
//!
//! let mut timers = TimerManager::new();
//! let delay = timers.start_one_shot(Duration::from_millis(300));
//! assert_eq!(timers.advance(Duration::from_millis(300)), vec![delay]);
//! assert!(doc.is_connected(dialog));
//! ```

pub mod document;
mod error;
pub mod logging;
pub mod signal;
pub mod timer;

pub use document::{Attribute, Document, NodeId, NodeKind};
pub use error::{DocumentError, DocumentResult, TimerError};
pub use logging::{DocumentTreeDebug, TreeFormatOptions, TreeStyle};
pub use signal::{ConnectionId, Signal};
pub use timer::{TimerId, TimerKind, TimerManager};
