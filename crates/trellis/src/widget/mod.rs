//! Widget model: kinds, roles, instances and declarative attributes.
//!
//! A widget is a custom element (`<t-menu>`, `<t-tabs>`, ...) whose author
//! markup is projected into ARIA roles and attributes. Each mounted host owns
//! one [`WidgetInstance`]; the behavior it composes is described by its
//! [`WidgetKind`].

pub mod attributes;
mod instance;
pub mod kind;
pub mod role;

pub use instance::{InstanceId, Slots, WidgetInstance};
pub use kind::{Capability, WidgetKind};
pub use role::AriaRole;

/// Layout axis of a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    /// Items run left to right.
    #[default]
    Horizontal,
    /// Items run top to bottom.
    Vertical,
}

impl Orientation {
    /// Parse an `orientation` attribute value.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "horizontal" => Some(Orientation::Horizontal),
            "vertical" => Some(Orientation::Vertical),
            _ => None,
        }
    }

    /// Attribute value.
    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Horizontal => "horizontal",
            Orientation::Vertical => "vertical",
        }
    }

    /// The other axis.
    pub fn perpendicular(self) -> Self {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }
}

/// Selection semantics of a roving widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SelectionMode {
    /// Activation makes the item the sole selection.
    Single,
    /// Activation toggles the item independently.
    Multiple,
    /// Pure navigation; activation never changes the selection.
    #[default]
    None,
}

impl SelectionMode {
    /// Parse a `mode` attribute value.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "single" => Some(SelectionMode::Single),
            "multiple" => Some(SelectionMode::Multiple),
            "none" => Some(SelectionMode::None),
            _ => None,
        }
    }

    /// Attribute value.
    pub fn as_str(self) -> &'static str {
        match self {
            SelectionMode::Single => "single",
            SelectionMode::Multiple => "multiple",
            SelectionMode::None => "none",
        }
    }
}
