//! Document tree for Trellis.
//!
//! Provides the element tree every widget is projected into:
//! - Stable node identifiers via arena-based storage
//! - Parent-child relationships with ordered children
//! - Ordered attribute lists on elements
//! - The document-wide active (focused) element
//!
//! The tree is headless: nothing here knows about layout or painting. A host
//! (browser shim, test harness, terminal front-end) mirrors it however it likes.
//!
//! # Key Types
//!
//! - [`Document`] - The arena owning every node
//! - [`NodeId`] - Unique stable identifier for each node
//! - [`NodeKind`] - Element or text payload
//!
//! # Example
//!
//! ```
//! use trellis_core::Document;
//!
//! let mut doc = Document::new();
//! let root = doc.root();
//! let button = doc.append_element(root, "button", &[("id", "save")]).unwrap();
//! doc.append_text(button, "Save").unwrap();
//!
//! assert_eq!(doc.element_by_id("save"), Some(button));
//! assert_eq!(doc.text_content(button), "Save");
//! ```

use std::fmt;

use slotmap::{new_key_type, SlotMap};

use crate::error::{DocumentError, DocumentResult};
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a node in a [`Document`].
    ///
    /// `NodeId`s are stable handles that remain valid while the node moves
    /// around the tree. They become invalid when the node is destroyed.
    pub struct NodeId;
}

impl NodeId {
    /// Convert the NodeId to a raw u64 value.
    ///
    /// This is useful for interop with external systems that need a numeric ID.
    #[inline]
    pub fn as_raw(self) -> u64 {
        use slotmap::Key;
        self.data().as_ffi()
    }
}

/// A single `name="value"` pair on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name (lowercase).
    pub name: String,
    /// Attribute value. Boolean attributes carry an empty string.
    pub value: String,
}

/// The payload of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// An element with a tag name and ordered attributes.
    Element {
        /// Lowercase tag name.
        tag: String,
        /// Attributes in insertion order.
        attributes: Vec<Attribute>,
    },
    /// A text node.
    Text(String),
}

/// Internal data stored in the arena for each node.
#[derive(Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl NodeData {
    fn element(tag: &str) -> Self {
        Self {
            kind: NodeKind::Element {
                tag: tag.to_ascii_lowercase(),
                attributes: Vec::new(),
            },
            parent: None,
            children: Vec::new(),
        }
    }

    fn text(content: &str) -> Self {
        Self {
            kind: NodeKind::Text(content.to_string()),
            parent: None,
            children: Vec::new(),
        }
    }

    fn attributes(&self) -> Option<&Vec<Attribute>> {
        match &self.kind {
            NodeKind::Element { attributes, .. } => Some(attributes),
            NodeKind::Text(_) => None,
        }
    }

    fn attributes_mut(&mut self) -> Option<&mut Vec<Attribute>> {
        match &mut self.kind {
            NodeKind::Element { attributes, .. } => Some(attributes),
            NodeKind::Text(_) => None,
        }
    }
}

/// An arena-allocated element tree.
///
/// The document always has a root element (`body`). Nodes created with
/// [`create_element`](Self::create_element) start detached; they become part
/// of the document once inserted under a connected parent.
pub struct Document {
    nodes: SlotMap<NodeId, NodeData>,
    root: NodeId,
    active_element: Option<NodeId>,
}

impl Document {
    /// Create a new document containing only the root element.
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(NodeData::element("body"));
        Self {
            nodes,
            root,
            active_element: None,
        }
    }

    /// The root element.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes in the arena, connected or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Check whether a node ID refers to a live node.
    #[inline]
    pub fn exists(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    fn check(&self, node: NodeId) -> DocumentResult<&NodeData> {
        self.nodes.get(node).ok_or(DocumentError::InvalidNode)
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = self.nodes.insert(NodeData::element(tag));
        tracing::trace!(target: targets::DOCUMENT, ?id, tag, "created element");
        id
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.nodes.insert(NodeData::text(content))
    }

    /// Create an element with attributes and append it to `parent`.
    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        attributes: &[(&str, &str)],
    ) -> DocumentResult<NodeId> {
        self.check(parent)?;
        let id = self.create_element(tag);
        for (name, value) in attributes {
            self.set_attribute(id, name, *value)?;
        }
        self.append_child(parent, id)?;
        Ok(id)
    }

    /// Create a text node and append it to `parent`.
    pub fn append_text(&mut self, parent: NodeId, content: &str) -> DocumentResult<NodeId> {
        self.check(parent)?;
        let id = self.create_text(content);
        self.append_child(parent, id)?;
        Ok(id)
    }

    // =========================================================================
    // Tree mutation
    // =========================================================================

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DocumentResult<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` under `parent` before `reference`, or at the end when
    /// `reference` is `None`.
    ///
    /// The child is detached from its current parent first.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DocumentResult<()> {
        if !matches!(self.check(parent)?.kind, NodeKind::Element { .. }) {
            return Err(DocumentError::NotAnElement);
        }
        self.check(child)?;
        if self.contains(child, parent) {
            return Err(DocumentError::CircularParentage);
        }

        let mut reference = reference;
        if let Some(r) = reference {
            if self.nodes.get(r).and_then(|n| n.parent) != Some(parent) {
                return Err(DocumentError::NotAChild);
            }
            if r == child {
                reference = self.next_sibling(child);
            }
        }

        self.unlink(child);

        let children = &mut self.nodes[parent].children;
        let index = reference
            .and_then(|r| children.iter().position(|&c| c == r))
            .unwrap_or(children.len());
        children.insert(index, child);
        self.nodes[child].parent = Some(parent);

        tracing::trace!(target: targets::DOCUMENT, ?parent, ?child, index, "inserted node");
        Ok(())
    }

    /// Remove a node from its parent. The node and its subtree stay alive.
    pub fn detach(&mut self, node: NodeId) -> DocumentResult<()> {
        self.check(node)?;
        self.unlink(node);
        Ok(())
    }

    fn unlink(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get_mut(node).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(parent_data) = self.nodes.get_mut(parent) {
            parent_data.children.retain(|&c| c != node);
        }
    }

    /// Destroy a node and all of its descendants.
    ///
    /// The root element cannot be destroyed; destroying it removes its
    /// children instead.
    #[tracing::instrument(skip(self), target = "trellis_core::document", level = "trace")]
    pub fn destroy(&mut self, node: NodeId) -> DocumentResult<()> {
        self.check(node)?;
        let mut doomed = self.descendants(node);
        if node == self.root {
            for child in self.nodes[node].children.clone() {
                self.unlink(child);
            }
        } else {
            self.unlink(node);
            doomed.push(node);
        }

        for id in doomed {
            self.nodes.remove(id);
            if self.active_element == Some(id) {
                self.active_element = None;
            }
        }
        Ok(())
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Parent of a node, if it has one.
    #[inline]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|n| n.parent)
    }

    /// Children of a node in order. Empty for invalid nodes.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Element children of a node in order.
    pub fn element_children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(node)
            .iter()
            .copied()
            .filter(|&c| self.is_element(c))
    }

    /// The sibling following `node` under the same parent.
    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(node)?);
        let index = siblings.iter().position(|&c| c == node)?;
        siblings.get(index + 1).copied()
    }

    /// The sibling preceding `node` under the same parent.
    pub fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(node)?);
        let index = siblings.iter().position(|&c| c == node)?;
        index.checked_sub(1).map(|i| siblings[i])
    }

    /// Ancestors of a node, nearest first, excluding the node itself.
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(node), move |&n| self.parent(n))
    }

    /// Descendants of a node in pre-order, excluding the node itself.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            result.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        result
    }

    /// Whether `node` is `ancestor` or one of its descendants.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).any(|a| a == ancestor)
    }

    /// Whether the node is reachable from the root.
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.exists(node) && self.contains(self.root, node)
    }

    // =========================================================================
    // Node data
    // =========================================================================

    /// Whether the node is an element.
    #[inline]
    pub fn is_element(&self, node: NodeId) -> bool {
        self.nodes
            .get(node)
            .is_some_and(|n| matches!(n.kind, NodeKind::Element { .. }))
    }

    /// The node payload.
    pub fn kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.nodes.get(node).map(|n| &n.kind)
    }

    /// Lowercase tag name of an element.
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.nodes.get(node)?.kind {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    /// Concatenated text of the node and its descendants.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut text = String::new();
        if let Some(NodeKind::Text(content)) = self.kind(node) {
            text.push_str(content);
        }
        for id in self.descendants(node) {
            if let Some(NodeKind::Text(content)) = self.kind(id) {
                text.push_str(content);
            }
        }
        text
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    /// All attributes of an element. Empty for text or invalid nodes.
    pub fn attributes(&self, node: NodeId) -> &[Attribute] {
        self.nodes
            .get(node)
            .and_then(NodeData::attributes)
            .map(|a| a.as_slice())
            .unwrap_or(&[])
    }

    /// Value of an attribute.
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.attributes(node)
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Whether an attribute is present.
    #[inline]
    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    /// Set an attribute, replacing any existing value in place.
    pub fn set_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        value: impl Into<String>,
    ) -> DocumentResult<()> {
        let attributes = self
            .nodes
            .get_mut(node)
            .ok_or(DocumentError::InvalidNode)?
            .attributes_mut()
            .ok_or(DocumentError::NotAnElement)?;
        let value = value.into();
        let name = name.to_ascii_lowercase();
        match attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => attributes.push(Attribute { name, value }),
        }
        Ok(())
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> DocumentResult<Option<String>> {
        let attributes = self
            .nodes
            .get_mut(node)
            .ok_or(DocumentError::InvalidNode)?
            .attributes_mut()
            .ok_or(DocumentError::NotAnElement)?;
        let removed = attributes
            .iter()
            .position(|a| a.name == name)
            .map(|index| attributes.remove(index).value);
        Ok(removed)
    }

    /// Force a boolean attribute on (`""`) or off.
    pub fn toggle_attribute(&mut self, node: NodeId, name: &str, force: bool) -> DocumentResult<()> {
        if force {
            if !self.has_attribute(node, name) {
                self.set_attribute(node, name, "")?;
            }
        } else {
            self.remove_attribute(node, name)?;
        }
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Find the first connected element with the given `id` attribute.
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .find(|&node| self.attribute(node, "id") == Some(id))
    }

    /// Whether the node or any ancestor carries the `hidden` attribute.
    pub fn is_hidden(&self, node: NodeId) -> bool {
        std::iter::once(node)
            .chain(self.ancestors(node))
            .any(|n| self.has_attribute(n, "hidden"))
    }

    // =========================================================================
    // Focus
    // =========================================================================

    /// The element that currently has focus.
    #[inline]
    pub fn active_element(&self) -> Option<NodeId> {
        self.active_element
    }

    /// Record the focused element. Callers validate focusability.
    pub fn set_active_element(&mut self, node: Option<NodeId>) -> DocumentResult<()> {
        if let Some(id) = node {
            self.check(id)?;
        }
        self.active_element = node;
        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.nodes.len())
            .field("root", &self.root)
            .field("active_element", &self.active_element)
            .finish()
    }
}

static_assertions::assert_impl_all!(Document: Send, Sync);
