//! Behavior controllers.
//!
//! Each capability has a plain state model (testable without an engine) and
//! an `impl Engine` block that applies it to the document: state first, then
//! attributes, then notifications.

mod disclosure;
mod resizer;
mod roving;

pub use disclosure::{DisclosureState, PendingTransition};
pub use resizer::{Pane, RangeState, Separator, SplitLayout};
pub use roving::{ItemRef, RovingAction, SelectionState};
