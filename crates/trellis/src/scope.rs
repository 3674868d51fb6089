//! Scope resolution across nesting and portals.
//!
//! The logical parent of a relocated node is its authored parent, not the
//! overlay container. Walking logical parents from any node therefore finds
//! the widgets that own it even while their content floats in the overlay.

use std::collections::HashMap;

use slotmap::SlotMap;
use trellis_core::{Document, NodeId};

use crate::portal::OverlayPortalManager;
use crate::widget::{InstanceId, WidgetInstance, WidgetKind};

/// Borrowed view used to answer "which instance owns this node?".
pub struct ScopeResolver<'a> {
    doc: &'a Document,
    portals: &'a OverlayPortalManager,
    hosts: &'a HashMap<NodeId, InstanceId>,
    instances: &'a SlotMap<InstanceId, WidgetInstance>,
}

impl<'a> ScopeResolver<'a> {
    pub(crate) fn new(
        doc: &'a Document,
        portals: &'a OverlayPortalManager,
        hosts: &'a HashMap<NodeId, InstanceId>,
        instances: &'a SlotMap<InstanceId, WidgetInstance>,
    ) -> Self {
        Self {
            doc,
            portals,
            hosts,
            instances,
        }
    }

    /// Authored parent for relocated nodes, document parent otherwise.
    pub fn logical_parent(&self, node: NodeId) -> Option<NodeId> {
        self.portals
            .original_parent(node)
            .or_else(|| self.doc.parent(node))
    }

    /// `node` followed by its logical ancestors.
    pub fn logical_path(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        // Bounded so a corrupt relocation record cannot loop forever.
        let limit = self.doc.node_count() + 1;
        std::iter::successors(Some(node), move |&n| self.logical_parent(n)).take(limit)
    }

    /// Whether `node` is `ancestor` or logically inside it.
    pub fn logical_contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.logical_path(node).any(|n| n == ancestor)
    }

    /// Number of logical ancestors.
    pub fn depth(&self, node: NodeId) -> usize {
        self.logical_path(node).count() - 1
    }

    /// Nearest instance of `kind` whose host is `node` or a logical ancestor.
    pub fn resolve(&self, node: NodeId, kind: WidgetKind) -> Option<InstanceId> {
        self.owners(node)
            .into_iter()
            .find(|&id| self.instances.get(id).is_some_and(|i| i.kind == kind))
    }

    /// Every instance whose host is `node` or a logical ancestor, innermost
    /// first.
    pub fn owners(&self, node: NodeId) -> Vec<InstanceId> {
        self.logical_path(node)
            .filter_map(|n| self.hosts.get(&n).copied())
            .collect()
    }
}
