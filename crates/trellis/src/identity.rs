//! Identity registry: generated ids and ARIA id relationships.
//!
//! Relationships are stored one way, keyed by element id, and rendered as
//! space-separated id references (`aria-controls`, `aria-labelledby`,
//! `aria-describedby`). Both sides of a trigger/content pair read from the
//! registry; neither side holds a reference to the other.

use slotmap::{new_key_type, SlotMap};
use trellis_core::{Document, DocumentResult, NodeId};

use crate::widget::InstanceId;

/// Kind of id relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// The source controls the target (`aria-controls`).
    Controls,
    /// The source is labelled by the target (`aria-labelledby`).
    LabelledBy,
    /// The source is described by the target (`aria-describedby`).
    DescribedBy,
}

impl RelationKind {
    /// Attribute carrying the relationship on the source element.
    pub fn attribute(self) -> &'static str {
        match self {
            RelationKind::Controls => "aria-controls",
            RelationKind::LabelledBy => "aria-labelledby",
            RelationKind::DescribedBy => "aria-describedby",
        }
    }
}

new_key_type! {
    /// Handle to a registered relationship.
    pub struct RelationId;
}

/// A registered relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    /// Instance that created the relationship and releases it on disconnect.
    pub owner: InstanceId,
    /// Element carrying the attribute.
    pub source: NodeId,
    /// Id of the source element.
    pub source_id: String,
    /// Id the attribute refers to.
    pub target_id: String,
    /// Relationship kind.
    pub kind: RelationKind,
}

/// Generates ids and tracks relationships.
#[derive(Debug)]
pub struct IdentityRegistry {
    prefix: String,
    counter: u64,
    relations: SlotMap<RelationId, Relation>,
}

impl IdentityRegistry {
    /// Create a registry generating ids of the form `{prefix}-{n}`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: 0,
            relations: SlotMap::with_key(),
        }
    }

    /// Generate an id not used by any connected element.
    pub fn generate(&mut self, doc: &Document) -> String {
        loop {
            self.counter += 1;
            let id = format!("{}-{}", self.prefix, self.counter);
            if doc.element_by_id(&id).is_none() {
                return id;
            }
        }
    }

    /// Return the element's id, assigning a generated one if it has none.
    pub fn ensure_id(&mut self, doc: &mut Document, node: NodeId) -> DocumentResult<String> {
        if let Some(id) = doc.attribute(node, "id").filter(|id| !id.is_empty()) {
            return Ok(id.to_string());
        }
        let id = self.generate(doc);
        doc.set_attribute(node, "id", id.clone())?;
        Ok(id)
    }

    /// Register `source --kind--> target` and render it onto `source`.
    ///
    /// Registering the same relationship twice is a no-op.
    pub fn relate(
        &mut self,
        doc: &mut Document,
        owner: InstanceId,
        source: NodeId,
        target: NodeId,
        kind: RelationKind,
    ) -> DocumentResult<RelationId> {
        let source_id = self.ensure_id(doc, source)?;
        let target_id = self.ensure_id(doc, target)?;

        if let Some((existing, _)) = self.relations.iter().find(|(_, r)| {
            r.owner == owner && r.source == source && r.target_id == target_id && r.kind == kind
        }) {
            return Ok(existing);
        }

        add_token(doc, source, kind.attribute(), &target_id)?;
        Ok(self.relations.insert(Relation {
            owner,
            source,
            source_id,
            target_id,
            kind,
        }))
    }

    /// Id that `source_id` refers to through `kind`.
    pub fn target_of(&self, source_id: &str, kind: RelationKind) -> Option<&str> {
        self.relations
            .values()
            .find(|r| r.source_id == source_id && r.kind == kind)
            .map(|r| r.target_id.as_str())
    }

    /// Id of the element that refers to `target_id` through `kind`.
    pub fn source_of(&self, target_id: &str, kind: RelationKind) -> Option<&str> {
        self.relations
            .values()
            .find(|r| r.target_id == target_id && r.kind == kind)
            .map(|r| r.source_id.as_str())
    }

    /// Relationships created by `owner`.
    pub fn relations_for(&self, owner: InstanceId) -> impl Iterator<Item = &Relation> + '_ {
        self.relations.values().filter(move |r| r.owner == owner)
    }

    /// Number of registered relationships.
    pub fn len(&self) -> usize {
        self.relations.len()
    }

    /// Whether no relationship is registered.
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// Drop every relationship created by `owner` and strip its id tokens.
    pub fn release(&mut self, doc: &mut Document, owner: InstanceId) {
        let doomed: Vec<RelationId> = self
            .relations
            .iter()
            .filter(|(_, r)| r.owner == owner)
            .map(|(id, _)| id)
            .collect();
        for id in doomed {
            if let Some(relation) = self.relations.remove(id) {
                // The source may already be gone with its subtree.
                let _ = remove_token(
                    doc,
                    relation.source,
                    relation.kind.attribute(),
                    &relation.target_id,
                );
            }
        }
    }
}

fn add_token(doc: &mut Document, node: NodeId, attribute: &str, token: &str) -> DocumentResult<()> {
    let current = doc.attribute(node, attribute).unwrap_or_default();
    if current.split_whitespace().any(|t| t == token) {
        return Ok(());
    }
    let value = if current.trim().is_empty() {
        token.to_string()
    } else {
        format!("{} {token}", current.trim())
    };
    doc.set_attribute(node, attribute, value)
}

fn remove_token(
    doc: &mut Document,
    node: NodeId,
    attribute: &str,
    token: &str,
) -> DocumentResult<()> {
    let Some(current) = doc.attribute(node, attribute) else {
        return Ok(());
    };
    let remaining: Vec<&str> = current.split_whitespace().filter(|t| *t != token).collect();
    if remaining.is_empty() {
        doc.remove_attribute(node, attribute)?;
    } else {
        let value = remaining.join(" ");
        doc.set_attribute(node, attribute, value)?;
    }
    Ok(())
}
