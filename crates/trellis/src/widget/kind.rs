//! The closed table of widget kinds.
//!
//! Widgets do not subclass a base behavior. Each kind declares which
//! capabilities it composes and supplies a small spec describing its ARIA
//! projection; the controllers read those specs and never match on the kind
//! for behavior.

use crate::identity::RelationKind;
use crate::widget::role::AriaRole;
use crate::widget::{Orientation, SelectionMode};

/// Behavior capabilities a widget kind can compose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Open/close state machine.
    Disclosure,
    /// Roving tabindex with a selection model.
    RovingSelection,
    /// Numeric range driven by pointer and keyboard.
    Resizer,
}

/// Every widget the engine knows how to mount.
///
/// ```
/// use trellis::{Capability, WidgetKind};
///
/// let kind = WidgetKind::from_tag("t-hover-card", "t").unwrap();
/// assert_eq!(kind, WidgetKind::HoverCard);
/// assert!(kind.has(Capability::Disclosure));
/// assert_eq!(WidgetKind::Split.tag("t"), "t-split");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    /// A single section that shows and hides its content.
    Collapsible,
    /// A stack of collapsible sections.
    Accordion,
    /// A modal dialog that traps focus.
    Dialog,
    /// Non-modal floating content anchored to a trigger.
    Popover,
    /// A menu button with a popup list of actions.
    Menu,
    /// A menu opened by a context-menu gesture on its trigger.
    ContextMenu,
    /// Supplementary content shown while hovering a trigger.
    HoverCard,
    /// A short description shown on hover or focus.
    Tooltip,
    /// A listbox popup choosing one or more values.
    Select,
    /// A tab list with one panel per tab.
    Tabs,
    /// A list of links with a current item.
    Navigation,
    /// A radio group.
    Choice,
    /// A group of independent toggle buttons.
    Toggles,
    /// A hierarchical list with expandable items.
    Tree,
    /// A two-dimensional grid of cells.
    Grid,
    /// A grid whose rows expand like a tree.
    TreeGrid,
    /// A row of controls sharing one tab stop.
    Toolbar,
    /// A scrolling list of articles.
    Feed,
    /// A rotating set of slides.
    Carousel,
    /// Panes separated by draggable separators.
    Split,
}

/// What activates a disclosure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerMode {
    /// Click, Enter or Space on the trigger.
    Click,
    /// Pointer hover or focus on the trigger, after a delay.
    Hover,
    /// A context-menu request anywhere inside the trigger region.
    ContextMenu,
}

/// ARIA projection and behavior flags for a disclosure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisclosureSpec {
    /// `aria-haspopup` value on the trigger.
    pub haspopup: Option<&'static str>,
    /// Whether the trigger carries `aria-expanded`.
    pub expanded_attr: bool,
    /// Role assigned to the content.
    pub content_role: AriaRole,
    /// Whether content is modal (`aria-modal`, focus trap).
    pub modal: bool,
    /// Whether content is relocated to the overlay container while open.
    pub portaled: bool,
    /// What opens the disclosure.
    pub trigger: TriggerMode,
    /// Whether Escape closes it.
    pub escape_dismiss: bool,
    /// Whether a pointer-down outside trigger and content closes it.
    pub outside_dismiss: bool,
    /// Whether opening moves focus into the content.
    pub focus_content: bool,
    /// Relationship from trigger to content.
    pub relation: RelationKind,
    /// Whether the content is labelled by the trigger.
    pub labelled_by_trigger: bool,
}

/// Which state attribute a roving item carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionAttr {
    /// `aria-selected`
    Selected,
    /// `aria-checked`
    Checked,
    /// `aria-pressed`
    Pressed,
    /// `aria-current="page"` on the current item only.
    Current,
    /// No state attribute.
    None,
}

impl SelectionAttr {
    /// Attribute name, if any.
    pub fn attribute(self) -> Option<&'static str> {
        match self {
            SelectionAttr::Selected => Some("aria-selected"),
            SelectionAttr::Checked => Some("aria-checked"),
            SelectionAttr::Pressed => Some("aria-pressed"),
            SelectionAttr::Current => Some("aria-current"),
            SelectionAttr::None => None,
        }
    }
}

/// How roving items are arranged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Structure {
    /// A flat sequence.
    Flat,
    /// Items nest inside items via `slot="group"` containers.
    Nested,
    /// Flat rows whose hierarchy comes from `data-level`.
    Leveled,
    /// Cells inside `slot="row"` containers.
    Grid,
}

/// What activating an item does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Apply the selection mode; emit `change` when the selection changed.
    Select,
    /// Apply the selection mode, then emit a cancelable `select` whose default
    /// closes the owning disclosure.
    Choose,
    /// Emit `action`.
    Action,
    /// Emit an informational `select`.
    Inform,
}

/// ARIA projection and behavior flags for a roving selection kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RovingSpec {
    /// Role of the item container.
    pub container_role: AriaRole,
    /// Role of each item; `None` keeps the native role.
    pub item_role: Option<AriaRole>,
    /// State attribute projected onto items.
    pub selection_attr: SelectionAttr,
    /// Orientation when the host has no valid `orientation`.
    pub default_orientation: Orientation,
    /// Whether the container carries `aria-orientation`.
    pub orientation_attr: bool,
    /// Mode when the host has no valid `mode`/`multiple`.
    pub default_mode: SelectionMode,
    /// Default wrap-around policy.
    pub wrap: bool,
    /// Item arrangement.
    pub structure: Structure,
    /// Whether moving the active item also selects it.
    pub follows_focus: bool,
    /// Whether an empty selection is replaced by the active item.
    pub requires_selection: bool,
    /// Activation behavior.
    pub activation: Activation,
    /// Whether PageUp/PageDown move like the arrow keys.
    pub paging: bool,
    /// Whether items are paired with `slot="panel"` elements by position.
    pub panels: bool,
    /// `aria-roledescription` on the item container.
    pub roledescription: Option<&'static str>,
    /// `aria-roledescription` on each panel.
    pub panel_roledescription: Option<&'static str>,
    /// Whether items carry `aria-posinset`/`aria-setsize`.
    pub set_position: bool,
}

const ROVING_BASE: RovingSpec = RovingSpec {
    container_role: AriaRole::Group,
    item_role: None,
    selection_attr: SelectionAttr::None,
    default_orientation: Orientation::Horizontal,
    orientation_attr: false,
    default_mode: SelectionMode::None,
    wrap: false,
    structure: Structure::Flat,
    follows_focus: false,
    requires_selection: false,
    activation: Activation::Inform,
    paging: false,
    panels: false,
    roledescription: None,
    panel_roledescription: None,
    set_position: false,
};

const DISCLOSURE_BASE: DisclosureSpec = DisclosureSpec {
    haspopup: None,
    expanded_attr: true,
    content_role: AriaRole::Region,
    modal: false,
    portaled: false,
    trigger: TriggerMode::Click,
    escape_dismiss: true,
    outside_dismiss: true,
    focus_content: true,
    relation: RelationKind::Controls,
    labelled_by_trigger: true,
};

impl WidgetKind {
    /// Every kind, in table order.
    pub const ALL: [WidgetKind; 20] = [
        WidgetKind::Collapsible,
        WidgetKind::Accordion,
        WidgetKind::Dialog,
        WidgetKind::Popover,
        WidgetKind::Menu,
        WidgetKind::ContextMenu,
        WidgetKind::HoverCard,
        WidgetKind::Tooltip,
        WidgetKind::Select,
        WidgetKind::Tabs,
        WidgetKind::Navigation,
        WidgetKind::Choice,
        WidgetKind::Toggles,
        WidgetKind::Tree,
        WidgetKind::Grid,
        WidgetKind::TreeGrid,
        WidgetKind::Toolbar,
        WidgetKind::Feed,
        WidgetKind::Carousel,
        WidgetKind::Split,
    ];

    /// Kind name, as used in tags and configuration keys.
    pub fn name(self) -> &'static str {
        match self {
            WidgetKind::Collapsible => "collapsible",
            WidgetKind::Accordion => "accordion",
            WidgetKind::Dialog => "dialog",
            WidgetKind::Popover => "popover",
            WidgetKind::Menu => "menu",
            WidgetKind::ContextMenu => "context-menu",
            WidgetKind::HoverCard => "hover-card",
            WidgetKind::Tooltip => "tooltip",
            WidgetKind::Select => "select",
            WidgetKind::Tabs => "tabs",
            WidgetKind::Navigation => "navigation",
            WidgetKind::Choice => "choice",
            WidgetKind::Toggles => "toggles",
            WidgetKind::Tree => "tree",
            WidgetKind::Grid => "grid",
            WidgetKind::TreeGrid => "treegrid",
            WidgetKind::Toolbar => "toolbar",
            WidgetKind::Feed => "feed",
            WidgetKind::Carousel => "carousel",
            WidgetKind::Split => "split",
        }
    }

    /// Look up a kind by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Look up a kind from an element tag such as `t-menu`.
    pub fn from_tag(tag: &str, prefix: &str) -> Option<Self> {
        let name = tag.strip_prefix(prefix)?.strip_prefix('-')?;
        Self::from_name(name)
    }

    /// The element tag for this kind.
    pub fn tag(self, prefix: &str) -> String {
        format!("{prefix}-{}", self.name())
    }

    /// Capabilities this kind composes.
    pub fn capabilities(self) -> &'static [Capability] {
        match self {
            WidgetKind::Collapsible
            | WidgetKind::Dialog
            | WidgetKind::Popover
            | WidgetKind::HoverCard
            | WidgetKind::Tooltip => &[Capability::Disclosure],
            WidgetKind::Menu | WidgetKind::ContextMenu | WidgetKind::Select => {
                &[Capability::Disclosure, Capability::RovingSelection]
            }
            WidgetKind::Tabs
            | WidgetKind::Navigation
            | WidgetKind::Choice
            | WidgetKind::Toggles
            | WidgetKind::Tree
            | WidgetKind::Grid
            | WidgetKind::TreeGrid
            | WidgetKind::Toolbar
            | WidgetKind::Feed
            | WidgetKind::Carousel => &[Capability::RovingSelection],
            WidgetKind::Split => &[Capability::Resizer],
            WidgetKind::Accordion => &[],
        }
    }

    /// Whether this kind composes `capability`.
    pub fn has(self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    /// Disclosure spec, for kinds with [`Capability::Disclosure`].
    pub fn disclosure(self) -> Option<DisclosureSpec> {
        let spec = match self {
            WidgetKind::Collapsible => DisclosureSpec {
                escape_dismiss: false,
                outside_dismiss: false,
                focus_content: false,
                ..DISCLOSURE_BASE
            },
            WidgetKind::Dialog => DisclosureSpec {
                haspopup: Some("dialog"),
                content_role: AriaRole::Dialog,
                modal: true,
                portaled: true,
                ..DISCLOSURE_BASE
            },
            WidgetKind::Popover => DisclosureSpec {
                haspopup: Some("dialog"),
                content_role: AriaRole::Dialog,
                portaled: true,
                ..DISCLOSURE_BASE
            },
            WidgetKind::Menu => DisclosureSpec {
                haspopup: Some("menu"),
                content_role: AriaRole::Menu,
                ..DISCLOSURE_BASE
            },
            WidgetKind::ContextMenu => DisclosureSpec {
                haspopup: Some("menu"),
                expanded_attr: false,
                content_role: AriaRole::Menu,
                trigger: TriggerMode::ContextMenu,
                labelled_by_trigger: false,
                ..DISCLOSURE_BASE
            },
            WidgetKind::HoverCard => DisclosureSpec {
                expanded_attr: false,
                content_role: AriaRole::Dialog,
                portaled: true,
                trigger: TriggerMode::Hover,
                outside_dismiss: false,
                focus_content: false,
                labelled_by_trigger: false,
                ..DISCLOSURE_BASE
            },
            WidgetKind::Tooltip => DisclosureSpec {
                expanded_attr: false,
                content_role: AriaRole::Tooltip,
                portaled: true,
                trigger: TriggerMode::Hover,
                outside_dismiss: false,
                focus_content: false,
                relation: RelationKind::DescribedBy,
                labelled_by_trigger: false,
                ..DISCLOSURE_BASE
            },
            WidgetKind::Select => DisclosureSpec {
                haspopup: Some("listbox"),
                content_role: AriaRole::Listbox,
                ..DISCLOSURE_BASE
            },
            _ => return None,
        };
        Some(spec)
    }

    /// Roving spec, for kinds with [`Capability::RovingSelection`].
    pub fn roving(self) -> Option<RovingSpec> {
        let spec = match self {
            WidgetKind::Menu | WidgetKind::ContextMenu => RovingSpec {
                container_role: AriaRole::Menu,
                item_role: Some(AriaRole::MenuItem),
                default_orientation: Orientation::Vertical,
                wrap: true,
                activation: Activation::Choose,
                ..ROVING_BASE
            },
            WidgetKind::Select => RovingSpec {
                container_role: AriaRole::Listbox,
                item_role: Some(AriaRole::Option),
                selection_attr: SelectionAttr::Selected,
                default_orientation: Orientation::Vertical,
                default_mode: SelectionMode::Single,
                activation: Activation::Choose,
                ..ROVING_BASE
            },
            WidgetKind::Tabs => RovingSpec {
                container_role: AriaRole::TabList,
                item_role: Some(AriaRole::Tab),
                selection_attr: SelectionAttr::Selected,
                orientation_attr: true,
                default_mode: SelectionMode::Single,
                wrap: true,
                follows_focus: true,
                requires_selection: true,
                activation: Activation::Select,
                panels: true,
                ..ROVING_BASE
            },
            // A tabbed carousel: the items pick slides.
            WidgetKind::Carousel => RovingSpec {
                container_role: AriaRole::TabList,
                item_role: Some(AriaRole::Tab),
                selection_attr: SelectionAttr::Selected,
                default_mode: SelectionMode::Single,
                wrap: true,
                follows_focus: true,
                requires_selection: true,
                activation: Activation::Select,
                panels: true,
                roledescription: Some("carousel"),
                panel_roledescription: Some("slide"),
                ..ROVING_BASE
            },
            WidgetKind::Navigation => RovingSpec {
                container_role: AriaRole::Navigation,
                selection_attr: SelectionAttr::Current,
                ..ROVING_BASE
            },
            WidgetKind::Choice => RovingSpec {
                container_role: AriaRole::RadioGroup,
                item_role: Some(AriaRole::Radio),
                selection_attr: SelectionAttr::Checked,
                default_orientation: Orientation::Vertical,
                orientation_attr: true,
                default_mode: SelectionMode::Single,
                wrap: true,
                follows_focus: true,
                activation: Activation::Select,
                ..ROVING_BASE
            },
            WidgetKind::Toggles => RovingSpec {
                selection_attr: SelectionAttr::Pressed,
                default_mode: SelectionMode::Multiple,
                activation: Activation::Select,
                ..ROVING_BASE
            },
            WidgetKind::Tree => RovingSpec {
                container_role: AriaRole::Tree,
                item_role: Some(AriaRole::TreeItem),
                selection_attr: SelectionAttr::Selected,
                default_orientation: Orientation::Vertical,
                default_mode: SelectionMode::Single,
                structure: Structure::Nested,
                activation: Activation::Select,
                ..ROVING_BASE
            },
            WidgetKind::Grid => RovingSpec {
                container_role: AriaRole::Grid,
                item_role: Some(AriaRole::GridCell),
                selection_attr: SelectionAttr::Selected,
                structure: Structure::Grid,
                ..ROVING_BASE
            },
            WidgetKind::TreeGrid => RovingSpec {
                container_role: AriaRole::TreeGrid,
                item_role: Some(AriaRole::Row),
                selection_attr: SelectionAttr::Selected,
                default_orientation: Orientation::Vertical,
                structure: Structure::Leveled,
                ..ROVING_BASE
            },
            WidgetKind::Toolbar => RovingSpec {
                container_role: AriaRole::Toolbar,
                orientation_attr: true,
                activation: Activation::Action,
                ..ROVING_BASE
            },
            WidgetKind::Feed => RovingSpec {
                container_role: AriaRole::Feed,
                item_role: Some(AriaRole::Article),
                default_orientation: Orientation::Vertical,
                paging: true,
                set_position: true,
                ..ROVING_BASE
            },
            _ => return None,
        };
        Some(spec)
    }
}
