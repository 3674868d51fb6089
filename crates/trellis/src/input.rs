//! Typed input delivered by the host to [`Engine::dispatch`](crate::Engine::dispatch).
//!
//! The engine never reads devices itself. A browser shim, terminal front-end
//! or test harness translates its native events into [`InputEvent`] values.

use trellis_core::NodeId;

/// Keyboard modifiers that may be held during input events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct KeyboardModifiers {
    /// The Shift key is held.
    pub shift: bool,
    /// The Control key is held.
    pub control: bool,
    /// The Alt key is held.
    pub alt: bool,
    /// The Meta key is held.
    pub meta: bool,
}

impl KeyboardModifiers {
    /// No modifiers pressed.
    pub const NONE: Self = Self {
        shift: false,
        control: false,
        alt: false,
        meta: false,
    };

    /// Shift modifier only.
    pub const SHIFT: Self = Self {
        shift: true,
        control: false,
        alt: false,
        meta: false,
    };

    /// Control modifier only.
    pub const CTRL: Self = Self {
        shift: false,
        control: true,
        alt: false,
        meta: false,
    };

    /// Check if any modifier is pressed.
    pub fn any(&self) -> bool {
        self.shift || self.control || self.alt || self.meta
    }
}

/// Keys the engine reacts to. Everything else maps to [`Key::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Up arrow.
    ArrowUp,
    /// Down arrow.
    ArrowDown,
    /// Left arrow.
    ArrowLeft,
    /// Right arrow.
    ArrowRight,
    /// Home.
    Home,
    /// End.
    End,
    /// Page Up.
    PageUp,
    /// Page Down.
    PageDown,
    /// Enter or Return.
    Enter,
    /// The space bar.
    Space,
    /// Tab; Shift+Tab arrives as this key with the shift modifier.
    Tab,
    /// Escape.
    Escape,
    /// A printable character.
    Character(char),
    /// Any key without engine behavior.
    Other,
}

impl Key {
    /// Map a web `KeyboardEvent.key` value to a [`Key`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "ArrowUp" | "Up" => Key::ArrowUp,
            "ArrowDown" | "Down" => Key::ArrowDown,
            "ArrowLeft" | "Left" => Key::ArrowLeft,
            "ArrowRight" | "Right" => Key::ArrowRight,
            "Home" => Key::Home,
            "End" => Key::End,
            "PageUp" => Key::PageUp,
            "PageDown" => Key::PageDown,
            "Enter" => Key::Enter,
            " " | "Space" | "Spacebar" => Key::Space,
            "Tab" => Key::Tab,
            "Escape" | "Esc" => Key::Escape,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Character(c),
                    _ => Key::Other,
                }
            }
        }
    }

    /// Whether the key activates the focused control.
    #[inline]
    pub fn is_activation(self) -> bool {
        matches!(self, Key::Enter | Key::Space)
    }
}

/// A point in host coordinates (CSS pixels for a browser host).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Create a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Input delivered to the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A key was pressed while `target` had focus.
    KeyDown {
        target: NodeId,
        key: Key,
        modifiers: KeyboardModifiers,
    },
    /// `target` was activated. `synthetic` marks clicks the host synthesized
    /// from a preceding Enter/Space keydown.
    Click { target: NodeId, synthetic: bool },
    /// A pointer button went down over `target`.
    PointerDown { target: NodeId, point: Point },
    /// The pointer moved.
    PointerMove { point: Point },
    /// The pointer button was released.
    PointerUp { point: Point },
    /// The pointer entered `target`.
    PointerEnter { target: NodeId },
    /// The pointer left `target`.
    PointerLeave { target: NodeId },
    /// `target` received focus.
    FocusIn { target: NodeId },
    /// `target` lost focus.
    FocusOut { target: NodeId },
    /// A context menu was requested over `target`.
    ContextMenu { target: NodeId, point: Point },
}

impl InputEvent {
    /// Convenience constructor for an unmodified key press.
    pub fn key(target: NodeId, key: Key) -> Self {
        InputEvent::KeyDown {
            target,
            key,
            modifiers: KeyboardModifiers::NONE,
        }
    }

    /// Convenience constructor for a user click.
    pub fn click(target: NodeId) -> Self {
        InputEvent::Click {
            target,
            synthetic: false,
        }
    }

    /// The node the event is addressed to, if it has one.
    pub fn target(&self) -> Option<NodeId> {
        match *self {
            InputEvent::KeyDown { target, .. }
            | InputEvent::Click { target, .. }
            | InputEvent::PointerDown { target, .. }
            | InputEvent::PointerEnter { target }
            | InputEvent::PointerLeave { target }
            | InputEvent::FocusIn { target }
            | InputEvent::FocusOut { target }
            | InputEvent::ContextMenu { target, .. } => Some(target),
            InputEvent::PointerMove { .. } | InputEvent::PointerUp { .. } => None,
        }
    }

    /// Static name used in log output.
    pub fn name(&self) -> &'static str {
        match self {
            InputEvent::KeyDown { .. } => "keydown",
            InputEvent::Click { .. } => "click",
            InputEvent::PointerDown { .. } => "pointerdown",
            InputEvent::PointerMove { .. } => "pointermove",
            InputEvent::PointerUp { .. } => "pointerup",
            InputEvent::PointerEnter { .. } => "pointerenter",
            InputEvent::PointerLeave { .. } => "pointerleave",
            InputEvent::FocusIn { .. } => "focusin",
            InputEvent::FocusOut { .. } => "focusout",
            InputEvent::ContextMenu { .. } => "contextmenu",
        }
    }
}
