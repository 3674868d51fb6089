//! AccessKit export of the projected document.
//!
//! Hosts without a DOM (native shells, test harnesses) can feed the engine's
//! ARIA projection to platform accessibility APIs through
//! [AccessKit](https://accesskit.dev/). Each document node becomes one AccessKit
//! node whose id is the raw [`NodeId`] value.

use accesskit::{Node, NodeId as AccessKitNodeId, Orientation as AccessKitOrientation, Role, Toggled, Tree, TreeUpdate};
use trellis_core::{Document, NodeId, NodeKind};

use crate::engine::Engine;
use crate::widget::AriaRole;

/// Convert a document node id to an AccessKit node id.
pub fn node_id(id: NodeId) -> AccessKitNodeId {
    AccessKitNodeId(id.as_raw())
}

fn role_for(doc: &Document, node: NodeId) -> Role {
    if let Some(role) = doc.attribute(node, "role").and_then(AriaRole::parse) {
        return match role {
            AriaRole::Article => Role::Article,
            AriaRole::Dialog => Role::Dialog,
            AriaRole::Feed => Role::Feed,
            AriaRole::Grid => Role::Grid,
            AriaRole::GridCell => Role::GridCell,
            AriaRole::Group => Role::Group,
            AriaRole::Listbox => Role::ListBox,
            AriaRole::Menu => Role::Menu,
            AriaRole::MenuItem => Role::MenuItem,
            AriaRole::Navigation => Role::Navigation,
            AriaRole::Option => Role::ListBoxOption,
            AriaRole::Radio => Role::RadioButton,
            AriaRole::RadioGroup => Role::RadioGroup,
            AriaRole::Region => Role::Region,
            AriaRole::Row => Role::Row,
            AriaRole::Separator => Role::Splitter,
            AriaRole::Tab => Role::Tab,
            AriaRole::TabList => Role::TabList,
            AriaRole::TabPanel => Role::TabPanel,
            AriaRole::Toolbar => Role::Toolbar,
            AriaRole::Tooltip => Role::Tooltip,
            AriaRole::Tree => Role::Tree,
            AriaRole::TreeGrid => Role::TreeGrid,
            AriaRole::TreeItem => Role::TreeItem,
        };
    }
    match doc.kind(node) {
        Some(NodeKind::Text(_)) => Role::Label,
        _ => match doc.tag(node) {
            Some("button") => Role::Button,
            Some("a") => Role::Link,
            _ => Role::GenericContainer,
        },
    }
}

fn bool_attr(doc: &Document, node: NodeId, name: &str) -> Option<bool> {
    match doc.attribute(node, name)? {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn number_attr(doc: &Document, node: NodeId, name: &str) -> Option<f64> {
    doc.attribute(node, name)?.trim().parse().ok()
}

fn id_refs(doc: &Document, node: NodeId, name: &str) -> Vec<AccessKitNodeId> {
    doc.attribute(node, name)
        .map(|value| {
            value
                .split_whitespace()
                .filter_map(|id| doc.element_by_id(id))
                .map(node_id)
                .collect()
        })
        .unwrap_or_default()
}

/// Build the AccessKit node for one document node.
pub fn build_node(doc: &Document, node: NodeId) -> Node {
    let mut out = Node::new(role_for(doc, node));

    if let Some(NodeKind::Text(text)) = doc.kind(node) {
        out.set_value(text.trim().to_string());
        return out;
    }

    if let Some(label) = doc.attribute(node, "aria-label") {
        out.set_label(label.to_string());
    } else if doc.element_children(node).next().is_none() {
        let text = doc.text_content(node);
        if !text.trim().is_empty() {
            out.set_label(text.trim().to_string());
        }
    }

    if let Some(description) = doc.attribute(node, "aria-roledescription") {
        out.set_role_description(description.to_string());
    }

    if let Some(expanded) = bool_attr(doc, node, "aria-expanded") {
        out.set_expanded(expanded);
    }
    if let Some(selected) = bool_attr(doc, node, "aria-selected") {
        out.set_selected(selected);
    }
    let toggled = bool_attr(doc, node, "aria-checked").or_else(|| bool_attr(doc, node, "aria-pressed"));
    if let Some(toggled) = toggled {
        out.set_toggled(if toggled { Toggled::True } else { Toggled::False });
    }
    if let Some(value) = number_attr(doc, node, "aria-valuenow") {
        out.set_numeric_value(value);
    }
    if let Some(min) = number_attr(doc, node, "aria-valuemin") {
        out.set_min_numeric_value(min);
    }
    if let Some(max) = number_attr(doc, node, "aria-valuemax") {
        out.set_max_numeric_value(max);
    }
    if let Some(level) = number_attr(doc, node, "aria-level") {
        out.set_level(level as usize);
    }
    if let Some(position) = number_attr(doc, node, "aria-posinset") {
        out.set_position_in_set(position as usize);
    }
    if let Some(size) = number_attr(doc, node, "aria-setsize") {
        out.set_size_of_set(size as usize);
    }
    match doc.attribute(node, "aria-orientation") {
        Some("horizontal") => out.set_orientation(AccessKitOrientation::Horizontal),
        Some("vertical") => out.set_orientation(AccessKitOrientation::Vertical),
        _ => {}
    }
    if bool_attr(doc, node, "aria-modal") == Some(true) {
        out.set_modal();
    }
    if doc.has_attribute(node, "hidden") {
        out.set_hidden();
    }
    if bool_attr(doc, node, "aria-disabled") == Some(true) || doc.has_attribute(node, "disabled") {
        out.set_disabled();
    }

    let controls = id_refs(doc, node, "aria-controls");
    if !controls.is_empty() {
        out.set_controls(controls);
    }
    let labelled_by = id_refs(doc, node, "aria-labelledby");
    if !labelled_by.is_empty() {
        out.set_labelled_by(labelled_by);
    }
    let described_by = id_refs(doc, node, "aria-describedby");
    if !described_by.is_empty() {
        out.set_described_by(described_by);
    }

    let children: Vec<_> = doc.children(node).iter().copied().map(node_id).collect();
    if !children.is_empty() {
        out.set_children(children);
    }
    out
}

/// Build a full tree update rooted at the document root.
pub fn build_tree_update(doc: &Document) -> TreeUpdate {
    let root = doc.root();
    let nodes = std::iter::once(root)
        .chain(doc.descendants(root))
        .map(|id| (node_id(id), build_node(doc, id)))
        .collect();
    TreeUpdate {
        nodes,
        tree: Some(Tree::new(node_id(root))),
        focus: node_id(doc.active_element().unwrap_or(root)),
    }
}

impl Engine {
    /// Snapshot the projected document as an AccessKit tree update.
    pub fn accessibility_tree(&self) -> TreeUpdate {
        build_tree_update(&self.doc)
    }
}
