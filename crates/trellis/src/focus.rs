//! Focus rules: focusability, tab order and focus traps.
//!
//! Tab order is document pre-order over visible elements. Hidden subtrees are
//! skipped entirely. Positive `tabindex` values are treated like `0`.
//!
//! A [`FocusTrapStack`] tracks open modal content. The top entry constrains
//! Tab/Shift+Tab; a nested modal only traps within its own content.

use trellis_core::{Document, DocumentResult, NodeId};

use crate::widget::InstanceId;

const NATIVE_INTERACTIVE: &[&str] = &["button", "input", "select", "textarea", "summary"];

fn tabindex(doc: &Document, node: NodeId) -> Option<i32> {
    doc.attribute(node, "tabindex")
        .and_then(|value| value.trim().parse().ok())
}

fn is_native_interactive(doc: &Document, node: NodeId) -> bool {
    match doc.tag(node) {
        Some("a") => doc.has_attribute(node, "href"),
        Some(tag) => NATIVE_INTERACTIVE.contains(&tag),
        None => false,
    }
}

/// Whether `node` can receive focus at all (by script or pointer).
pub fn is_focusable(doc: &Document, node: NodeId) -> bool {
    if !doc.is_element(node) || !doc.is_connected(node) || doc.is_hidden(node) {
        return false;
    }
    if doc.has_attribute(node, "disabled") && is_native_interactive(doc, node) {
        return false;
    }
    is_native_interactive(doc, node) || tabindex(doc, node).is_some()
}

/// Whether `node` participates in sequential (Tab) navigation.
pub fn is_tabbable(doc: &Document, node: NodeId) -> bool {
    is_focusable(doc, node) && tabindex(doc, node).is_none_or(|index| index >= 0)
}

/// Visible elements under `root` in pre-order, excluding `root`.
fn visible_order(doc: &Document, root: NodeId) -> Vec<NodeId> {
    let mut order = Vec::new();
    let mut stack: Vec<NodeId> = doc.element_children(root).collect();
    stack.reverse();
    while let Some(node) = stack.pop() {
        if doc.has_attribute(node, "hidden") {
            continue;
        }
        order.push(node);
        let before = stack.len();
        stack.extend(doc.element_children(node));
        stack[before..].reverse();
    }
    order
}

/// Tabbable elements under `root` in tab order.
pub fn tabbable_within(doc: &Document, root: NodeId) -> Vec<NodeId> {
    if doc.is_hidden(root) {
        return Vec::new();
    }
    visible_order(doc, root)
        .into_iter()
        .filter(|&node| is_tabbable(doc, node))
        .collect()
}

/// The tabbable element after (or before) `current` within `root`, wrapping
/// at the ends.
///
/// `current` does not need to be tabbable itself; its document position is
/// used. Returns `None` when nothing under `root` is tabbable.
pub fn sequential_target(
    doc: &Document,
    root: NodeId,
    current: Option<NodeId>,
    backwards: bool,
) -> Option<NodeId> {
    let order = visible_order(doc, root);
    let tabbable: Vec<usize> = order
        .iter()
        .enumerate()
        .filter(|(_, node)| is_tabbable(doc, **node))
        .map(|(i, _)| i)
        .collect();
    let (&first, &last) = (tabbable.first()?, tabbable.last()?);

    let position = current.and_then(|c| order.iter().position(|&n| n == c));
    let index = match (position, backwards) {
        (None, false) => first,
        (None, true) => last,
        (Some(pos), false) => tabbable.iter().copied().find(|&i| i > pos).unwrap_or(first),
        (Some(pos), true) => tabbable
            .iter()
            .rev()
            .copied()
            .find(|&i| i < pos)
            .unwrap_or(last),
    };
    Some(order[index])
}

/// Where focus goes when content opens: its first tabbable descendant, or the
/// content itself (made programmatically focusable) when it has none.
pub fn first_focus_target(doc: &mut Document, content: NodeId) -> DocumentResult<NodeId> {
    if let Some(&first) = tabbable_within(doc, content).first() {
        return Ok(first);
    }
    if !is_focusable(doc, content) {
        doc.set_attribute(content, "tabindex", "-1")?;
    }
    Ok(content)
}

/// Next focus target for Tab inside a trap.
///
/// Cycles through the content's tabbable descendants; with none, focus stays
/// on the content container.
pub fn trap_step(doc: &Document, content: NodeId, current: Option<NodeId>, backwards: bool) -> NodeId {
    let list = tabbable_within(doc, content);
    let (Some(&first), Some(&last)) = (list.first(), list.last()) else {
        return content;
    };
    let position = current.and_then(|c| list.iter().position(|&n| n == c));
    match (position, backwards) {
        (Some(pos), false) if pos + 1 < list.len() => list[pos + 1],
        (Some(pos), true) if pos > 0 => list[pos - 1],
        (Some(_), false) => first,
        (Some(_), true) => last,
        (None, false) => {
            // Focus on the container or on a non-tabbable descendant.
            let order = visible_order(doc, content);
            let pos = current.and_then(|c| order.iter().position(|&n| n == c));
            pos.and_then(|p| order[p + 1..].iter().copied().find(|n| list.contains(n)))
                .unwrap_or(first)
        }
        (None, true) => last,
    }
}

/// One active focus trap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusTrap {
    /// Instance that installed the trap.
    pub owner: InstanceId,
    /// Content element focus is confined to.
    pub content: NodeId,
}

/// Stack of active focus traps, innermost last.
#[derive(Debug, Default)]
pub struct FocusTrapStack {
    traps: Vec<FocusTrap>,
}

impl FocusTrapStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a trap. An existing trap for the same owner moves to the top.
    pub fn push(&mut self, owner: InstanceId, content: NodeId) {
        self.traps.retain(|t| t.owner != owner);
        self.traps.push(FocusTrap { owner, content });
    }

    /// Remove the trap installed by `owner`.
    pub fn remove(&mut self, owner: InstanceId) -> bool {
        let before = self.traps.len();
        self.traps.retain(|t| t.owner != owner);
        self.traps.len() != before
    }

    /// The innermost trap.
    pub fn active(&self) -> Option<FocusTrap> {
        self.traps.last().copied()
    }

    /// Number of installed traps.
    pub fn len(&self) -> usize {
        self.traps.len()
    }

    /// Whether no trap is installed.
    pub fn is_empty(&self) -> bool {
        self.traps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn dialog_doc() -> (Document, NodeId, Vec<NodeId>) {
        let mut doc = Document::new();
        let root = doc.root();
        let content = doc.append_element(root, "div", &[]).unwrap();
        let a = doc.append_element(content, "button", &[]).unwrap();
        let link = doc
            .append_element(content, "a", &[("href", "#x")])
            .unwrap();
        let skipped = doc
            .append_element(content, "div", &[("tabindex", "-1")])
            .unwrap();
        let disabled = doc
            .append_element(content, "button", &[("disabled", "")])
            .unwrap();
        let hidden = doc
            .append_element(content, "section", &[("hidden", "")])
            .unwrap();
        doc.append_element(hidden, "button", &[]).unwrap();
        let b = doc.append_element(content, "input", &[]).unwrap();
        let _ = (skipped, disabled);
        (doc, content, vec![a, link, b])
    }

    #[test]
    fn test_tabbable_order() {
        let (doc, content, expected) = dialog_doc();
        assert_eq!(tabbable_within(&doc, content), expected);
    }

    #[test]
    fn test_focusable_but_not_tabbable() {
        let mut doc = Document::new();
        let root = doc.root();
        let item = doc
            .append_element(root, "li", &[("tabindex", "-1")])
            .unwrap();
        let plain = doc.append_element(root, "div", &[]).unwrap();
        let anchor = doc.append_element(root, "a", &[]).unwrap();

        assert!(is_focusable(&doc, item));
        assert!(!is_tabbable(&doc, item));
        assert!(!is_focusable(&doc, plain));
        assert!(!is_focusable(&doc, anchor));
    }

    #[test]
    fn test_trap_cycles() {
        let (doc, content, list) = dialog_doc();
        let (first, last) = (list[0], list[2]);

        assert_eq!(trap_step(&doc, content, Some(last), false), first);
        assert_eq!(trap_step(&doc, content, Some(first), true), last);
        assert_eq!(trap_step(&doc, content, Some(first), false), list[1]);
        assert_eq!(trap_step(&doc, content, Some(content), false), first);
        assert_eq!(trap_step(&doc, content, None, true), last);
    }

    #[test]
    fn test_trap_without_focusables_stays_on_content() {
        let mut doc = Document::new();
        let root = doc.root();
        let content = doc.append_element(root, "div", &[]).unwrap();
        doc.append_text(content, "Nothing to focus").unwrap();

        assert_eq!(first_focus_target(&mut doc, content).unwrap(), content);
        assert_eq!(doc.attribute(content, "tabindex"), Some("-1"));
        assert_eq!(trap_step(&doc, content, Some(content), false), content);
    }

    #[test]
    fn test_sequential_wraps() {
        let (doc, _, list) = dialog_doc();
        let root = doc.root();
        assert_eq!(sequential_target(&doc, root, Some(list[2]), false), Some(list[0]));
        assert_eq!(sequential_target(&doc, root, Some(list[0]), true), Some(list[2]));
        assert_eq!(sequential_target(&doc, root, None, false), Some(list[0]));
    }

    #[test]
    fn test_trap_stack() {
        let mut ids: SlotMap<InstanceId, ()> = SlotMap::with_key();
        let (outer, inner) = (ids.insert(()), ids.insert(()));
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.append_element(root, "div", &[]).unwrap();
        let b = doc.append_element(root, "div", &[]).unwrap();

        let mut traps = FocusTrapStack::new();
        traps.push(outer, a);
        traps.push(inner, b);
        traps.push(outer, a);
        assert_eq!(traps.len(), 2);
        assert_eq!(traps.active().map(|t| t.owner), Some(outer));

        assert!(traps.remove(outer));
        assert_eq!(traps.active().map(|t| t.content), Some(b));
        assert!(!traps.remove(outer));
    }
}
