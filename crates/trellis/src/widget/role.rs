//! ARIA roles projected onto elements.

/// The ARIA roles the engine assigns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AriaRole {
    Article,
    Dialog,
    Feed,
    Grid,
    GridCell,
    Group,
    Listbox,
    Menu,
    MenuItem,
    Navigation,
    Option,
    Radio,
    RadioGroup,
    Region,
    Row,
    Separator,
    Tab,
    TabList,
    TabPanel,
    Toolbar,
    Tooltip,
    Tree,
    TreeGrid,
    TreeItem,
}

impl AriaRole {
    /// The `role` attribute value.
    pub fn as_str(self) -> &'static str {
        match self {
            AriaRole::Article => "article",
            AriaRole::Dialog => "dialog",
            AriaRole::Feed => "feed",
            AriaRole::Grid => "grid",
            AriaRole::GridCell => "gridcell",
            AriaRole::Group => "group",
            AriaRole::Listbox => "listbox",
            AriaRole::Menu => "menu",
            AriaRole::MenuItem => "menuitem",
            AriaRole::Navigation => "navigation",
            AriaRole::Option => "option",
            AriaRole::Radio => "radio",
            AriaRole::RadioGroup => "radiogroup",
            AriaRole::Region => "region",
            AriaRole::Row => "row",
            AriaRole::Separator => "separator",
            AriaRole::Tab => "tab",
            AriaRole::TabList => "tablist",
            AriaRole::TabPanel => "tabpanel",
            AriaRole::Toolbar => "toolbar",
            AriaRole::Tooltip => "tooltip",
            AriaRole::Tree => "tree",
            AriaRole::TreeGrid => "treegrid",
            AriaRole::TreeItem => "treeitem",
        }
    }

    /// Parse a `role` attribute value. Only the first token is considered.
    pub fn parse(value: &str) -> Option<Self> {
        let role = match value.split_whitespace().next()? {
            "article" => AriaRole::Article,
            "dialog" | "alertdialog" => AriaRole::Dialog,
            "feed" => AriaRole::Feed,
            "grid" => AriaRole::Grid,
            "gridcell" => AriaRole::GridCell,
            "group" => AriaRole::Group,
            "listbox" => AriaRole::Listbox,
            "menu" => AriaRole::Menu,
            "menuitem" => AriaRole::MenuItem,
            "navigation" => AriaRole::Navigation,
            "option" => AriaRole::Option,
            "radio" => AriaRole::Radio,
            "radiogroup" => AriaRole::RadioGroup,
            "region" => AriaRole::Region,
            "row" => AriaRole::Row,
            "separator" => AriaRole::Separator,
            "tab" => AriaRole::Tab,
            "tablist" => AriaRole::TabList,
            "tabpanel" => AriaRole::TabPanel,
            "toolbar" => AriaRole::Toolbar,
            "tooltip" => AriaRole::Tooltip,
            "tree" => AriaRole::Tree,
            "treegrid" => AriaRole::TreeGrid,
            "treeitem" => AriaRole::TreeItem,
            _ => return None,
        };
        Some(role)
    }
}
