//! Overlay portal manager.
//!
//! Floating content (dialogs, popovers, tooltips) is moved to a shared
//! top-level overlay container while open and returned to its authored
//! position when closed. A move changes location only; the node keeps its
//! id, attributes and listeners.
//!
//! Each relocation is an independent record. Restoring one never touches
//! another's restoration point.

use std::collections::HashMap;

use slotmap::{new_key_type, SlotMap};
use trellis_core::logging::targets;
use trellis_core::{Document, DocumentResult, NodeId};

new_key_type! {
    /// Handle to an active relocation.
    pub struct PortalHandle;
}

/// Where a relocated node came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Relocation {
    node: NodeId,
    parent: Option<NodeId>,
    next_sibling: Option<NodeId>,
}

/// Registry of relocation handles plus the lazily created overlay container.
#[derive(Debug)]
pub struct OverlayPortalManager {
    overlay_id: String,
    container: Option<NodeId>,
    relocations: SlotMap<PortalHandle, Relocation>,
    by_node: HashMap<NodeId, PortalHandle>,
}

impl OverlayPortalManager {
    /// Create a manager whose container uses `overlay_id`.
    pub fn new(overlay_id: impl Into<String>) -> Self {
        Self {
            overlay_id: overlay_id.into(),
            container: None,
            relocations: SlotMap::with_key(),
            by_node: HashMap::new(),
        }
    }

    /// The overlay container, created on first use.
    ///
    /// An author element carrying the overlay id is adopted instead.
    pub fn container(&mut self, doc: &mut Document) -> DocumentResult<NodeId> {
        if let Some(container) = self.container.filter(|&c| doc.is_connected(c)) {
            return Ok(container);
        }
        let container = match doc.element_by_id(&self.overlay_id) {
            Some(existing) => existing,
            None => {
                let root = doc.root();
                doc.append_element(
                    root,
                    "div",
                    &[("id", self.overlay_id.as_str()), ("data-trellis-overlay", "")],
                )?
            }
        };
        tracing::debug!(target: targets::PORTAL, ?container, "overlay container ready");
        self.container = Some(container);
        Ok(container)
    }

    /// The container, if it has been created.
    pub fn existing_container(&self) -> Option<NodeId> {
        self.container
    }

    /// Move `node` into the overlay container, recording where it was.
    ///
    /// Relocating an already relocated node returns its existing handle.
    pub fn relocate(&mut self, doc: &mut Document, node: NodeId) -> DocumentResult<PortalHandle> {
        if let Some(&handle) = self.by_node.get(&node) {
            return Ok(handle);
        }
        let record = Relocation {
            node,
            parent: doc.parent(node),
            next_sibling: doc.next_sibling(node),
        };
        let container = self.container(doc)?;
        doc.append_child(container, node)?;

        let handle = self.relocations.insert(record);
        self.by_node.insert(node, handle);
        tracing::debug!(
            target: targets::PORTAL,
            ?node,
            parent = ?record.parent,
            next_sibling = ?record.next_sibling,
            "relocated to overlay"
        );
        Ok(handle)
    }

    /// Return a relocated node to its recorded position.
    ///
    /// Falls back to appending to the original parent when the recorded
    /// sibling is no longer a child of it. Returns `false` for stale handles.
    pub fn restore(&mut self, doc: &mut Document, handle: PortalHandle) -> DocumentResult<bool> {
        let Some(record) = self.relocations.remove(handle) else {
            return Ok(false);
        };
        self.by_node.remove(&record.node);
        if !doc.exists(record.node) {
            return Ok(true);
        }

        match record.parent.filter(|&p| doc.exists(p)) {
            Some(parent) => {
                let reference = record
                    .next_sibling
                    .filter(|&s| s != record.node && doc.parent(s) == Some(parent));
                if record.next_sibling.is_some() && reference.is_none() {
                    tracing::debug!(
                        target: targets::PORTAL,
                        node = ?record.node,
                        "recorded sibling gone, appending to parent"
                    );
                }
                doc.insert_before(parent, record.node, reference)?;
            }
            None => doc.detach(record.node)?,
        }
        tracing::debug!(target: targets::PORTAL, node = ?record.node, "restored from overlay");
        Ok(true)
    }

    /// Handle of the relocation holding `node`.
    pub fn handle_for(&self, node: NodeId) -> Option<PortalHandle> {
        self.by_node.get(&node).copied()
    }

    /// Whether `node` currently lives in the overlay.
    pub fn is_relocated(&self, node: NodeId) -> bool {
        self.by_node.contains_key(&node)
    }

    /// Authored parent of a relocated node.
    pub fn original_parent(&self, node: NodeId) -> Option<NodeId> {
        let handle = self.by_node.get(&node)?;
        self.relocations.get(*handle)?.parent
    }

    /// Number of active relocations.
    pub fn active_count(&self) -> usize {
        self.relocations.len()
    }
}
