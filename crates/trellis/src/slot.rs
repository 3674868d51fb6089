//! Slot projection.
//!
//! Authors mark parts of a widget with `slot="name"` or wrap them in
//! `<slot name="name">`. A wrapper resolves to its first element child, so
//! roles and ARIA attributes always land on the real element and the wrapper
//! stays invisible to assistive technology.
//!
//! Lookups are scoped: the walk never descends into a nested widget host,
//! which keeps an inner widget's slots away from its outer namesake.

use trellis_core::logging::targets;
use trellis_core::{Document, DocumentResult, NodeId};

use crate::widget::{AriaRole, WidgetKind};

/// Elements inside `root`'s scope in pre-order, excluding `root`.
///
/// Nested widget hosts are included but not descended into.
pub fn scope_elements(doc: &Document, root: NodeId, tag_prefix: &str) -> Vec<NodeId> {
    let mut result = Vec::new();
    let mut stack: Vec<NodeId> = doc.element_children(root).collect();
    stack.reverse();
    while let Some(node) = stack.pop() {
        result.push(node);
        if is_widget_host(doc, node, tag_prefix) {
            continue;
        }
        let before = stack.len();
        stack.extend(doc.element_children(node));
        stack[before..].reverse();
    }
    result
}

/// Whether the element's tag names a widget kind.
pub fn is_widget_host(doc: &Document, node: NodeId, tag_prefix: &str) -> bool {
    doc.tag(node)
        .is_some_and(|tag| WidgetKind::from_tag(tag, tag_prefix).is_some())
}

fn slot_name(doc: &Document, node: NodeId) -> Option<&str> {
    if doc.tag(node) == Some("slot") {
        doc.attribute(node, "name")
    } else {
        doc.attribute(node, "slot")
    }
}

fn project_target(doc: &Document, node: NodeId) -> Option<NodeId> {
    if doc.tag(node) == Some("slot") {
        let target = doc.element_children(node).next();
        if target.is_none() {
            tracing::warn!(target: targets::MOUNT, ?node, "empty slot wrapper");
        }
        target
    } else {
        Some(node)
    }
}

/// First element projected into slot `name` within `root`'s scope.
pub fn resolve_slot(doc: &Document, root: NodeId, name: &str, tag_prefix: &str) -> Option<NodeId> {
    scope_elements(doc, root, tag_prefix)
        .into_iter()
        .filter(|&node| slot_name(doc, node) == Some(name))
        .find_map(|node| project_target(doc, node))
}

/// Every element projected into slot `name` within `root`'s scope, in order.
///
/// Wrappers nested inside another match of the same slot are still returned,
/// which is how hierarchical items are found.
pub fn resolve_all(doc: &Document, root: NodeId, name: &str, tag_prefix: &str) -> Vec<NodeId> {
    scope_elements(doc, root, tag_prefix)
        .into_iter()
        .filter(|&node| slot_name(doc, node) == Some(name))
        .filter_map(|node| project_target(doc, node))
        .collect()
}

/// Assign `role` unless the author already chose one.
pub fn project_role(doc: &mut Document, node: NodeId, role: AriaRole) -> DocumentResult<()> {
    if doc.attribute(node, "role").is_some_and(|r| !r.trim().is_empty()) {
        return Ok(());
    }
    doc.set_attribute(node, "role", role.as_str())
}

/// Write engine-owned attributes, replacing author values.
pub fn project(doc: &mut Document, node: NodeId, attributes: &[(&str, &str)]) -> DocumentResult<()> {
    for (name, value) in attributes {
        if doc.attribute(node, name) != Some(*value) {
            doc.set_attribute(node, name, *value)?;
        }
    }
    Ok(())
}
