//! Roving tabindex and selection.
//!
//! Exactly one navigable item carries `tabindex="0"`; every other item carries
//! `-1`. Arrow keys move that single tab stop along the widget's orientation,
//! skipping disabled items and items hidden under a collapsed parent.
//!
//! [`SelectionState`] is a plain model. The `impl Engine` block at the bottom
//! collects items from markup, applies key intents and projects the result.

use std::collections::{BTreeSet, HashMap};

use trellis_core::logging::targets;
use trellis_core::{Document, DocumentResult, NodeId};

use crate::engine::Engine;
use crate::event::{EventDetail, EventKind};
use crate::identity::{IdentityRegistry, RelationKind};
use crate::input::{Key, KeyboardModifiers};
use crate::slot;
use crate::widget::attributes;
use crate::widget::kind::{Activation, RovingSpec, SelectionAttr, Structure};
use crate::widget::{AriaRole, InstanceId, Orientation, SelectionMode, WidgetInstance};

/// One item as seen by the selection model.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRef {
    /// The item element.
    pub node: NodeId,
    /// Stable selection key (the element id).
    pub key: String,
    /// Value reported in `change`/`select` events.
    pub value: String,
    /// Skipped by navigation and activation.
    pub disabled: bool,
    /// Nesting level, starting at 1.
    pub level: usize,
    /// Index of the parent item in hierarchical widgets.
    pub parent: Option<usize>,
    /// `Some` for items that have children.
    pub expanded: Option<bool>,
    /// Row index in grids.
    pub row: usize,
    /// Column index in grids.
    pub column: usize,
}

impl ItemRef {
    /// A top-level, enabled item.
    pub fn new(node: NodeId, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            node,
            key: key.into(),
            value: value.into(),
            disabled: false,
            level: 1,
            parent: None,
            expanded: None,
            row: 0,
            column: 0,
        }
    }
}

/// What a key press asks the model to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RovingAction {
    /// Move the active item (possibly to itself at a boundary).
    Move(usize),
    /// Expand or collapse a parent item without moving.
    Expand { index: usize, expanded: bool },
    /// Activate the item.
    Activate(usize),
    /// The key has no roving meaning.
    Ignore,
}

/// Active item, selection set and navigation rules of a roving widget.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    items: Vec<ItemRef>,
    active: Option<usize>,
    selected: BTreeSet<String>,
    mode: SelectionMode,
    orientation: Orientation,
    wrap: bool,
    rows: Vec<NodeId>,
}

impl SelectionState {
    /// Create a model with nothing selected and no active item.
    pub fn new(items: Vec<ItemRef>, mode: SelectionMode, orientation: Orientation, wrap: bool) -> Self {
        Self {
            items,
            active: None,
            selected: BTreeSet::new(),
            mode,
            orientation,
            wrap,
            rows: Vec::new(),
        }
    }

    pub(crate) fn with_rows(mut self, rows: Vec<NodeId>) -> Self {
        self.rows = rows;
        self
    }

    /// Items in document order.
    pub fn items(&self) -> &[ItemRef] {
        &self.items
    }

    /// Grid row containers.
    pub fn rows(&self) -> &[NodeId] {
        &self.rows
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index of the item holding the tab stop.
    #[inline]
    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Index of the item holding the tab stop, `-1` when there is none.
    pub fn active_index(&self) -> isize {
        self.active.map_or(-1, |i| i as isize)
    }

    /// The item holding the tab stop.
    pub fn active_item(&self) -> Option<&ItemRef> {
        self.items.get(self.active?)
    }

    /// Selection mode.
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Navigation axis.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Whether navigation wraps at the ends.
    pub fn wraps(&self) -> bool {
        self.wrap
    }

    /// Whether the item at `index` is selected.
    pub fn is_selected(&self, index: usize) -> bool {
        self.items
            .get(index)
            .is_some_and(|item| self.selected.contains(&item.key))
    }

    /// Indices of selected items, in item order.
    pub fn selected_indices(&self) -> Vec<usize> {
        (0..self.items.len()).filter(|&i| self.is_selected(i)).collect()
    }

    /// Values of selected items, in item order.
    pub fn selected_values(&self) -> Vec<String> {
        self.selected_indices()
            .into_iter()
            .map(|i| self.items[i].value.clone())
            .collect()
    }

    /// Index of the item whose element is `node`.
    pub fn index_of(&self, node: NodeId) -> Option<usize> {
        self.items.iter().position(|item| item.node == node)
    }

    /// Whether every ancestor item is expanded.
    pub fn is_visible(&self, index: usize) -> bool {
        let mut parent = self.items.get(index).and_then(|item| item.parent);
        while let Some(p) = parent {
            let Some(item) = self.items.get(p) else {
                return true;
            };
            if item.expanded != Some(true) {
                return false;
            }
            parent = item.parent;
        }
        true
    }

    /// Whether navigation may land on the item.
    pub fn is_navigable(&self, index: usize) -> bool {
        self.items.get(index).is_some_and(|item| !item.disabled) && self.is_visible(index)
    }

    /// First navigable item.
    pub fn first_navigable(&self) -> Option<usize> {
        (0..self.items.len()).find(|&i| self.is_navigable(i))
    }

    /// Last navigable item.
    pub fn last_navigable(&self) -> Option<usize> {
        (0..self.items.len()).rev().find(|&i| self.is_navigable(i))
    }

    /// The next navigable item after (or before) `from`, honoring wrap.
    pub fn step(&self, from: usize, forward: bool) -> Option<usize> {
        let count = self.items.len();
        let mut index = from;
        for _ in 0..count {
            index = match (forward, index) {
                (true, i) if i + 1 < count => i + 1,
                (true, _) if self.wrap => 0,
                (false, i) if i > 0 => i - 1,
                (false, _) if self.wrap => count - 1,
                _ => return None,
            };
            if index == from {
                return None;
            }
            if self.is_navigable(index) {
                return Some(index);
            }
        }
        None
    }

    /// Move the tab stop. Returns `false` for unchanged or non-navigable
    /// targets.
    pub fn set_active(&mut self, index: usize) -> bool {
        if self.active == Some(index) || !self.is_navigable(index) {
            return false;
        }
        self.active = Some(index);
        true
    }

    /// Re-establish a valid tab stop: keep a navigable active item, else the
    /// first selected navigable item, else the first navigable item.
    pub fn ensure_active(&mut self) {
        if self.active.is_some_and(|i| self.is_navigable(i)) {
            return;
        }
        self.active = self
            .selected_indices()
            .into_iter()
            .find(|&i| self.is_navigable(i))
            .or_else(|| self.first_navigable());
    }

    /// Make `index` the only selected item.
    pub fn select_only(&mut self, index: usize) -> bool {
        let Some(item) = self.items.get(index) else {
            return false;
        };
        if self.selected.len() == 1 && self.selected.contains(&item.key) {
            return false;
        }
        self.selected.clear();
        self.selected.insert(item.key.clone());
        true
    }

    /// Flip selection of `index`.
    pub fn toggle(&mut self, index: usize) -> bool {
        let Some(item) = self.items.get(index) else {
            return false;
        };
        if !self.selected.remove(&item.key) {
            self.selected.insert(item.key.clone());
        }
        true
    }

    /// Apply activation according to the selection mode.
    pub fn activate(&mut self, index: usize) -> bool {
        if !self.is_navigable(index) {
            return false;
        }
        match self.mode {
            SelectionMode::Single => self.select_only(index),
            SelectionMode::Multiple => self.toggle(index),
            SelectionMode::None => false,
        }
    }

    /// Replace the selection with the given keys, trimmed to one in single
    /// mode.
    pub fn set_selected_keys(&mut self, keys: impl IntoIterator<Item = String>) {
        let known: BTreeSet<&str> = self.items.iter().map(|i| i.key.as_str()).collect();
        let mut ordered: Vec<String> = keys
            .into_iter()
            .filter(|k| known.contains(k.as_str()))
            .collect();
        ordered.sort_by_key(|k| self.items.iter().position(|i| &i.key == k));
        if self.mode == SelectionMode::Single {
            ordered.truncate(1);
        }
        self.selected = ordered.into_iter().collect();
    }

    /// Expand or collapse a parent item. Collapsing pulls the tab stop out of
    /// the hidden subtree onto the collapsed item.
    pub fn set_expanded(&mut self, index: usize, expanded: bool) -> bool {
        let Some(item) = self.items.get_mut(index) else {
            return false;
        };
        if item.expanded.is_none() || item.expanded == Some(expanded) {
            return false;
        }
        item.expanded = Some(expanded);
        if !expanded && self.active.is_some_and(|a| self.is_descendant(a, index)) {
            self.active = Some(index);
        }
        true
    }

    fn is_descendant(&self, index: usize, ancestor: usize) -> bool {
        let mut parent = self.items.get(index).and_then(|i| i.parent);
        while let Some(p) = parent {
            if p == ancestor {
                return true;
            }
            parent = self.items.get(p).and_then(|i| i.parent);
        }
        false
    }

    /// First navigable child of a parent item.
    pub fn first_child(&self, index: usize) -> Option<usize> {
        (index + 1..self.items.len()).find(|&i| self.items[i].parent == Some(index) && self.is_navigable(i))
    }

    /// Cell reached by moving `rows`/`columns` from `from` in a grid.
    ///
    /// Row moves keep the column, falling back to the nearest earlier column
    /// in shorter rows.
    pub fn grid_move(&self, from: usize, rows: isize, columns: isize) -> Option<usize> {
        let origin = self.items.get(from)?;
        if columns != 0 {
            let in_row = (0..self.items.len()).filter(|&i| self.items[i].row == origin.row && self.is_navigable(i));
            return if columns > 0 {
                in_row.into_iter().find(|&i| self.items[i].column > origin.column)
            } else {
                in_row.into_iter().filter(|&i| self.items[i].column < origin.column).last()
            };
        }
        let last_row = self.items.iter().map(|i| i.row).max()?;
        let mut row = origin.row as isize + rows;
        while rows != 0 && row >= 0 && row as usize <= last_row {
            let found = (0..self.items.len())
                .filter(|&i| self.items[i].row == row as usize && self.is_navigable(i))
                .filter(|&i| self.items[i].column <= origin.column)
                .last();
            if found.is_some() {
                return found;
            }
            row += rows;
        }
        None
    }

    /// First or last navigable cell in the row of `from`.
    pub fn row_edge(&self, from: usize, end: bool) -> Option<usize> {
        let row = self.items.get(from)?.row;
        let mut cells = (0..self.items.len()).filter(|&i| self.items[i].row == row && self.is_navigable(i));
        if end { cells.last() } else { cells.next() }
    }

    /// Translate a key press on the active item into an intent.
    pub fn key_action(&self, key: Key, modifiers: KeyboardModifiers, spec: &RovingSpec) -> RovingAction {
        let Some(current) = self.active else {
            return RovingAction::Ignore;
        };
        if key.is_activation() {
            return RovingAction::Activate(current);
        }
        let target = match spec.structure {
            Structure::Grid => match key {
                Key::ArrowRight => self.grid_move(current, 0, 1),
                Key::ArrowLeft => self.grid_move(current, 0, -1),
                Key::ArrowDown => self.grid_move(current, 1, 0),
                Key::ArrowUp => self.grid_move(current, -1, 0),
                Key::Home if modifiers.control => self.first_navigable(),
                Key::End if modifiers.control => self.last_navigable(),
                Key::Home => self.row_edge(current, false),
                Key::End => self.row_edge(current, true),
                _ => return RovingAction::Ignore,
            },
            Structure::Nested | Structure::Leveled => match key {
                Key::ArrowDown => self.step(current, true),
                Key::ArrowUp => self.step(current, false),
                Key::ArrowRight => match self.items[current].expanded {
                    Some(false) => {
                        return RovingAction::Expand {
                            index: current,
                            expanded: true,
                        };
                    }
                    Some(true) => self.first_child(current),
                    None => None,
                },
                Key::ArrowLeft => match self.items[current].expanded {
                    Some(true) => {
                        return RovingAction::Expand {
                            index: current,
                            expanded: false,
                        };
                    }
                    _ => self.items[current].parent.filter(|&p| self.is_navigable(p)),
                },
                Key::Home => self.first_navigable(),
                Key::End => self.last_navigable(),
                _ => return RovingAction::Ignore,
            },
            Structure::Flat => {
                let (next, previous) = match self.orientation {
                    Orientation::Horizontal => (Key::ArrowRight, Key::ArrowLeft),
                    Orientation::Vertical => (Key::ArrowDown, Key::ArrowUp),
                };
                match key {
                    k if k == next => self.step(current, true),
                    k if k == previous => self.step(current, false),
                    Key::PageDown if spec.paging => self.step(current, true),
                    Key::PageUp if spec.paging => self.step(current, false),
                    Key::Home => self.first_navigable(),
                    Key::End => self.last_navigable(),
                    _ => return RovingAction::Ignore,
                }
            }
        };
        RovingAction::Move(target.unwrap_or(current))
    }

    /// Swap in a freshly collected item list, keeping the tab stop and the
    /// selection for items that survived.
    pub(crate) fn replace_items(&mut self, items: Vec<ItemRef>, rows: Vec<NodeId>) {
        let active_node = self.active_item().map(|item| item.node);
        let keep: Vec<String> = self.selected.iter().cloned().collect();
        self.items = items;
        self.rows = rows;
        self.active = active_node.and_then(|node| self.index_of(node));
        self.set_selected_keys(keep);
        self.ensure_active();
    }

    pub(crate) fn set_mode(&mut self, mode: SelectionMode) {
        self.mode = mode;
        let keep: Vec<String> = self.selected.iter().cloned().collect();
        self.set_selected_keys(keep);
    }

    pub(crate) fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }
}

fn item_value(doc: &Document, node: NodeId) -> String {
    attributes::text(doc, node, "value")
        .or_else(|| attributes::text(doc, node, "data-value"))
        .unwrap_or_else(|| doc.text_content(node).trim().to_string())
}

fn make_item(doc: &mut Document, identity: &mut IdentityRegistry, node: NodeId) -> DocumentResult<ItemRef> {
    let key = identity.ensure_id(doc, node)?;
    let mut item = ItemRef::new(node, key, item_value(doc, node));
    item.disabled = attributes::flag(doc, node, "disabled");
    Ok(item)
}

fn authored_expanded(doc: &Document, node: NodeId) -> bool {
    doc.attribute(node, "aria-expanded") == Some("true") || attributes::flag(doc, node, "expanded")
}

/// Collect the items of a roving widget, plus grid rows.
fn collect_items(
    doc: &mut Document,
    identity: &mut IdentityRegistry,
    root: NodeId,
    spec: &RovingSpec,
    tag_prefix: &str,
) -> DocumentResult<(Vec<ItemRef>, Vec<NodeId>)> {
    let mut items = Vec::new();
    let mut rows = Vec::new();
    match spec.structure {
        Structure::Flat => {
            for node in slot::resolve_all(doc, root, "item", tag_prefix) {
                items.push(make_item(doc, identity, node)?);
            }
        }
        Structure::Nested => {
            let nodes = slot::resolve_all(doc, root, "item", tag_prefix);
            let positions: HashMap<NodeId, usize> = nodes.iter().enumerate().map(|(i, &n)| (n, i)).collect();
            for &node in &nodes {
                let mut item = make_item(doc, identity, node)?;
                item.parent = doc
                    .ancestors(node)
                    .take_while(|&a| a != root)
                    .find_map(|a| positions.get(&a).copied());
                item.level = item.parent.map_or(1, |p: usize| items.get(p).map_or(1, |i: &ItemRef| i.level + 1));
                items.push(item);
            }
        }
        Structure::Leveled => {
            let nodes = slot::resolve_all(doc, root, "item", tag_prefix);
            let mut chain: Vec<usize> = Vec::new();
            for node in nodes {
                let mut item = make_item(doc, identity, node)?;
                let level = attributes::number(doc, node, "data-level")
                    .or_else(|| attributes::number(doc, node, "aria-level"))
                    .map_or(1, |l| l.max(1.0) as usize);
                while chain.last().is_some_and(|&p| items.get(p).is_some_and(|i: &ItemRef| i.level >= level)) {
                    chain.pop();
                }
                item.level = level;
                item.parent = chain.last().copied();
                chain.push(items.len());
                items.push(item);
            }
        }
        Structure::Grid => {
            for (r, row) in slot::resolve_all(doc, root, "row", tag_prefix).into_iter().enumerate() {
                for (c, cell) in slot::resolve_all(doc, row, "item", tag_prefix).into_iter().enumerate() {
                    let mut item = make_item(doc, identity, cell)?;
                    item.row = r;
                    item.column = c;
                    items.push(item);
                }
                rows.push(row);
            }
        }
    }

    if matches!(spec.structure, Structure::Nested | Structure::Leveled) {
        for index in 0..items.len() {
            if items.iter().any(|i| i.parent == Some(index)) {
                items[index].expanded = Some(authored_expanded(doc, items[index].node));
            }
        }
    }
    Ok((items, rows))
}

/// Keys of items the author marked as selected, or whose value matches the
/// host `value`.
fn authored_selection(doc: &Document, host: NodeId, spec: &RovingSpec, items: &[ItemRef]) -> Vec<String> {
    if let Some(value) = attributes::text(doc, host, "value") {
        return items
            .iter()
            .filter(|item| item.value == value)
            .map(|item| item.key.clone())
            .collect();
    }
    let state_attr = spec.selection_attr.attribute();
    items
        .iter()
        .filter(|item| {
            let marked = match (spec.selection_attr, state_attr) {
                (SelectionAttr::Current, Some(name)) => attributes::flag(doc, item.node, name),
                (_, Some(name)) => doc.attribute(item.node, name) == Some("true"),
                (_, None) => false,
            };
            marked || attributes::flag(doc, item.node, "selected")
        })
        .map(|item| item.key.clone())
        .collect()
}

fn bool_attr(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

/// Project roles, tab stops and state attributes for a roving instance.
fn render_roving(doc: &mut Document, instance: &WidgetInstance, tag_prefix: &str) -> DocumentResult<()> {
    let (Some(spec), Some(state)) = (instance.roving_spec(), instance.selection.as_ref()) else {
        return Ok(());
    };
    let container = instance.roving_container();
    slot::project_role(doc, container, spec.container_role)?;
    if let Some(description) = spec.roledescription {
        slot::project(doc, container, &[("aria-roledescription", description)])?;
    }
    if spec.orientation_attr {
        slot::project(doc, container, &[("aria-orientation", instance.orientation.as_str())])?;
    }
    if spec.selection_attr == SelectionAttr::Selected {
        doc.toggle_attribute(container, "aria-multiselectable", false)?;
        if state.mode() == SelectionMode::Multiple {
            doc.set_attribute(container, "aria-multiselectable", "true")?;
        }
    }
    match &instance.label {
        Some(label) => slot::project(doc, container, &[("aria-label", label.as_str())])?,
        None => {
            doc.remove_attribute(container, "aria-label")?;
        }
    }
    if instance.disabled {
        doc.set_attribute(container, "aria-disabled", "true")?;
    } else {
        doc.remove_attribute(container, "aria-disabled")?;
    }

    // Clear every old tab stop before granting the new one, so there is
    // never a moment with two.
    let active = if instance.disabled { None } else { state.active() };
    for (index, item) in state.items().iter().enumerate() {
        if Some(index) != active {
            slot::project(doc, item.node, &[("tabindex", "-1")])?;
        }
    }
    if let Some(item) = active.and_then(|i| state.items().get(i)) {
        slot::project(doc, item.node, &[("tabindex", "0")])?;
    }

    let count = state.len().to_string();
    let hierarchical = matches!(spec.structure, Structure::Nested | Structure::Leveled);
    for (index, item) in state.items().iter().enumerate() {
        let node = item.node;
        if let Some(role) = spec.item_role {
            slot::project_role(doc, node, role)?;
        }
        let selected = state.is_selected(index);
        match (spec.selection_attr, spec.selection_attr.attribute()) {
            (SelectionAttr::Current, _) => {
                if selected {
                    doc.set_attribute(node, "aria-current", "page")?;
                } else {
                    doc.remove_attribute(node, "aria-current")?;
                }
            }
            (_, Some(name)) if state.mode() != SelectionMode::None => {
                doc.set_attribute(node, name, bool_attr(selected))?;
            }
            _ => {}
        }
        if item.disabled {
            doc.set_attribute(node, "aria-disabled", "true")?;
        } else {
            doc.remove_attribute(node, "aria-disabled")?;
        }
        if hierarchical {
            doc.set_attribute(node, "aria-level", item.level.to_string())?;
            match item.expanded {
                Some(expanded) => doc.set_attribute(node, "aria-expanded", bool_attr(expanded))?,
                None => {
                    doc.remove_attribute(node, "aria-expanded")?;
                }
            }
        }
        if spec.set_position {
            doc.set_attribute(node, "aria-posinset", (index + 1).to_string())?;
            doc.set_attribute(node, "aria-setsize", count.as_str())?;
        }
        match spec.structure {
            Structure::Nested => {
                if let (Some(expanded), Some(group)) = (item.expanded, slot::resolve_slot(doc, node, "group", tag_prefix)) {
                    slot::project_role(doc, group, AriaRole::Group)?;
                    doc.toggle_attribute(group, "hidden", !expanded)?;
                }
            }
            Structure::Leveled => doc.toggle_attribute(node, "hidden", !state.is_visible(index))?,
            _ => {}
        }
    }

    for &row in state.rows() {
        slot::project_role(doc, row, AriaRole::Row)?;
    }

    for (index, &panel) in instance.slots.panels.iter().enumerate() {
        slot::project_role(doc, panel, AriaRole::TabPanel)?;
        if let Some(description) = spec.panel_roledescription {
            slot::project(doc, panel, &[("aria-roledescription", description)])?;
        }
        doc.toggle_attribute(panel, "hidden", !state.is_selected(index))?;
    }
    Ok(())
}

impl Engine {
    pub(crate) fn selection_mut(&mut self, id: InstanceId) -> Option<&mut SelectionState> {
        self.instances.get_mut(id)?.selection.as_mut()
    }

    /// Build the selection model for a freshly mounted instance.
    pub(crate) fn setup_roving(&mut self, id: InstanceId) -> DocumentResult<()> {
        let Some(instance) = self.instances.get(id) else {
            return Ok(());
        };
        let Some(spec) = instance.roving_spec() else {
            return Ok(());
        };
        let (kind, host, container) = (instance.kind, instance.host, instance.roving_container());
        let (mode, orientation) = (instance.mode, instance.orientation);
        let wrap = self.config.wrap_for(kind.name(), spec.wrap);

        let (items, rows) =
            collect_items(&mut self.doc, &mut self.identity, container, &spec, &self.config.tag_prefix)?;
        if items.iter().all(|item| item.disabled) {
            tracing::warn!(target: targets::ROVING, kind = kind.name(), ?host, "no navigable items");
        }
        let authored = authored_selection(&self.doc, host, &spec, &items);

        let mut state = SelectionState::new(items, mode, orientation, wrap).with_rows(rows);
        state.set_selected_keys(authored);
        state.ensure_active();
        if spec.requires_selection && state.selected_indices().is_empty() {
            if let Some(active) = state.active() {
                state.select_only(active);
            }
        }
        tracing::debug!(
            target: targets::ROVING,
            kind = kind.name(),
            items = state.len(),
            active = state.active_index(),
            "selection model built"
        );
        if let Some(instance) = self.instances.get_mut(id) {
            instance.selection = Some(state);
        }
        self.relate_panels(id)?;
        self.render_selection(id)
    }

    /// Re-collect items after the author changed markup inside the widget.
    pub(crate) fn refresh_items(&mut self, id: InstanceId) -> DocumentResult<()> {
        let Some(instance) = self.instances.get(id) else {
            return Ok(());
        };
        let (Some(spec), true) = (instance.roving_spec(), instance.selection.is_some()) else {
            return Ok(());
        };
        let (host, container) = (instance.host, instance.roving_container());
        let (items, rows) =
            collect_items(&mut self.doc, &mut self.identity, container, &spec, &self.config.tag_prefix)?;
        let panels = if spec.panels {
            slot::resolve_all(&self.doc, host, "panel", &self.config.tag_prefix)
        } else {
            Vec::new()
        };
        let Some(instance) = self.instances.get_mut(id) else {
            return Ok(());
        };
        instance.slots.panels = panels;
        if let Some(state) = instance.selection.as_mut() {
            state.replace_items(items, rows);
            if spec.requires_selection && state.selected_indices().is_empty() {
                if let Some(active) = state.active() {
                    state.select_only(active);
                }
            }
            tracing::debug!(target: targets::ROVING, items = state.len(), "items refreshed");
        }
        self.relate_panels(id)?;
        self.render_selection(id)
    }

    fn relate_panels(&mut self, id: InstanceId) -> DocumentResult<()> {
        let Some(instance) = self.instances.get(id) else {
            return Ok(());
        };
        let Some(state) = instance.selection.as_ref() else {
            return Ok(());
        };
        let panels = &instance.slots.panels;
        if panels.is_empty() {
            return Ok(());
        }
        if panels.len() != state.len() {
            tracing::warn!(
                target: targets::ROVING,
                items = state.len(),
                panels = panels.len(),
                "tab and panel counts differ, pairing by position"
            );
        }
        let pairs: Vec<(NodeId, NodeId)> = state
            .items()
            .iter()
            .map(|item| item.node)
            .zip(panels.iter().copied())
            .collect();
        for (tab, panel) in pairs {
            self.identity.relate(&mut self.doc, id, tab, panel, RelationKind::Controls)?;
            self.identity.relate(&mut self.doc, id, panel, tab, RelationKind::LabelledBy)?;
        }
        Ok(())
    }

    pub(crate) fn render_selection(&mut self, id: InstanceId) -> DocumentResult<()> {
        match self.instances.get(id) {
            Some(instance) => render_roving(&mut self.doc, instance, &self.config.tag_prefix),
            None => Ok(()),
        }
    }

    /// Element of the item holding the tab stop.
    pub(crate) fn active_item(&self, id: InstanceId) -> Option<NodeId> {
        let state = self.instances.get(id)?.selection.as_ref()?;
        state.active_item().map(|item| item.node)
    }

    /// Index of the item that is, or contains, `target`.
    pub(crate) fn item_at(&self, id: InstanceId, target: NodeId, exact: bool) -> Option<usize> {
        let state = self.instances.get(id)?.selection.as_ref()?;
        if exact {
            return state.index_of(target);
        }
        state
            .items()
            .iter()
            .rposition(|item| self.doc.contains(item.node, target))
    }

    /// Move the tab stop, selecting along the way where selection follows
    /// focus, and optionally focus the item.
    pub(crate) fn move_active(&mut self, id: InstanceId, index: usize, focus: bool) -> DocumentResult<bool> {
        let Some(spec) = self.instances.get(id).and_then(|i| i.roving_spec()) else {
            return Ok(false);
        };
        let Some(state) = self.selection_mut(id) else {
            return Ok(false);
        };
        if !state.is_navigable(index) {
            return Ok(false);
        }
        let moved = state.set_active(index);
        let selection_changed =
            spec.follows_focus && state.mode() != SelectionMode::None && state.select_only(index);
        let node = state.items()[index].node;

        if moved || selection_changed {
            tracing::trace!(target: targets::ROVING, ?id, index, "active item moved");
            self.render_selection(id)?;
        }
        if selection_changed {
            self.emit_change(id, index);
        }
        if focus {
            self.move_focus(Some(node));
        }
        Ok(moved)
    }

    /// Activate an item according to the kind's activation rule.
    pub(crate) fn activate_item(&mut self, id: InstanceId, index: usize) -> DocumentResult<bool> {
        let Some(instance) = self.instances.get(id) else {
            return Ok(false);
        };
        let (Some(spec), has_disclosure) = (instance.roving_spec(), instance.disclosure.is_some()) else {
            return Ok(false);
        };
        let Some(state) = self.selection_mut(id) else {
            return Ok(false);
        };
        if !state.is_navigable(index) {
            return Ok(false);
        }
        state.set_active(index);
        let item = state.items()[index].clone();
        let changed = match spec.activation {
            Activation::Select | Activation::Choose => state.activate(index),
            Activation::Action | Activation::Inform => false,
        };
        self.render_selection(id)?;
        if changed {
            self.emit_change(id, index);
        }

        let detail = EventDetail::Item {
            item: item.node,
            value: item.value,
        };
        tracing::trace!(target: targets::ROVING, ?id, index, activation = ?spec.activation, "item activated");
        match spec.activation {
            Activation::Select => Ok(changed),
            Activation::Choose => {
                let proceed = self.emit(id, EventKind::Select, detail, true);
                if proceed && has_disclosure {
                    self.close_disclosure(id, true)?;
                }
                Ok(true)
            }
            Activation::Action => {
                self.emit(id, EventKind::Action, detail, false);
                Ok(true)
            }
            Activation::Inform => {
                self.emit(id, EventKind::Select, detail, false);
                Ok(true)
            }
        }
    }

    fn emit_change(&self, id: InstanceId, index: usize) {
        let Some(instance) = self.instances.get(id) else {
            return;
        };
        let (Some(spec), Some(state)) = (instance.roving_spec(), instance.selection.as_ref()) else {
            return;
        };
        let detail = match (spec.selection_attr, state.mode()) {
            (SelectionAttr::Pressed, _) => EventDetail::Pressed {
                item: state.items()[index].node,
                pressed: state.is_selected(index),
            },
            (_, SelectionMode::Multiple) => EventDetail::Values(state.selected_values()),
            _ => EventDetail::Value(state.selected_values().into_iter().next().unwrap_or_default()),
        };
        self.emit(id, EventKind::Change, detail, false);
    }

    /// Expand or collapse a hierarchical item.
    pub(crate) fn set_item_expanded(&mut self, id: InstanceId, index: usize, expanded: bool) -> DocumentResult<bool> {
        let Some(state) = self.selection_mut(id) else {
            return Ok(false);
        };
        if !state.set_expanded(index, expanded) {
            return Ok(false);
        }
        let active = state.active_item().map(|item| item.node);
        tracing::trace!(target: targets::ROVING, ?id, index, expanded, "item expansion changed");
        self.render_selection(id)?;

        // Focus inside a collapsed subtree follows the tab stop out.
        if let (Some(focused), Some(active)) = (self.doc.active_element(), active) {
            if focused != active && self.doc.is_hidden(focused) {
                self.move_focus(Some(active));
            }
        }
        Ok(true)
    }

    /// Key press on the item at `index`.
    pub(crate) fn roving_key(
        &mut self,
        id: InstanceId,
        index: usize,
        key: Key,
        modifiers: KeyboardModifiers,
    ) -> DocumentResult<bool> {
        let Some(spec) = self.instances.get(id).and_then(|i| i.roving_spec()) else {
            return Ok(false);
        };
        let Some(state) = self.selection_mut(id) else {
            return Ok(false);
        };
        let synced = state.set_active(index);
        let action = state.key_action(key, modifiers, &spec);
        if synced {
            self.render_selection(id)?;
        }
        match action {
            RovingAction::Move(target) => {
                self.move_active(id, target, true)?;
                Ok(true)
            }
            RovingAction::Expand { index, expanded } => {
                self.set_item_expanded(id, index, expanded)?;
                Ok(true)
            }
            RovingAction::Activate(index) => {
                self.activate_item(id, index)?;
                Ok(true)
            }
            RovingAction::Ignore => Ok(false),
        }
    }

    /// Open a menu-like disclosure from its trigger and land on the first or
    /// last item.
    pub(crate) fn open_at_edge(&mut self, id: InstanceId, last: bool) -> DocumentResult<bool> {
        self.open_disclosure(id, false)?;
        if !self.instances.get(id).is_some_and(|i| i.is_open()) {
            return Ok(false);
        }
        let target = self
            .instances
            .get(id)
            .and_then(|i| i.selection.as_ref())
            .and_then(|s| if last { s.last_navigable() } else { s.first_navigable() });
        if let Some(index) = target {
            self.move_active(id, index, true)?;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn nodes(count: usize) -> Vec<NodeId> {
        let mut map: SlotMap<NodeId, ()> = SlotMap::with_key();
        (0..count).map(|_| map.insert(())).collect()
    }

    fn flat(count: usize, mode: SelectionMode, wrap: bool) -> SelectionState {
        let items = nodes(count)
            .into_iter()
            .enumerate()
            .map(|(i, n)| ItemRef::new(n, format!("item-{i}"), format!("v{i}")))
            .collect();
        let mut state = SelectionState::new(items, mode, Orientation::Horizontal, wrap);
        state.ensure_active();
        state
    }

    fn spec(structure: Structure) -> RovingSpec {
        RovingSpec {
            structure,
            ..crate::widget::WidgetKind::Toolbar.roving().unwrap()
        }
    }

    #[test]
    fn test_step_skips_disabled() {
        let mut state = flat(4, SelectionMode::None, false);
        state.items[1].disabled = true;

        assert_eq!(state.active(), Some(0));
        assert_eq!(state.step(0, true), Some(2));
        assert_eq!(state.step(3, true), None);
        assert_eq!(state.step(2, false), Some(0));
    }

    #[test]
    fn test_wrap() {
        let state = flat(3, SelectionMode::Single, true);
        assert_eq!(state.step(2, true), Some(0));
        assert_eq!(state.step(0, false), Some(2));
    }

    #[test]
    fn test_boundary_move_stays_put() {
        let mut state = flat(3, SelectionMode::None, false);
        state.set_active(2);
        let action = state.key_action(Key::ArrowRight, KeyboardModifiers::NONE, &spec(Structure::Flat));
        assert_eq!(action, RovingAction::Move(2));
        let action = state.key_action(Key::ArrowDown, KeyboardModifiers::NONE, &spec(Structure::Flat));
        assert_eq!(action, RovingAction::Ignore);
        let action = state.key_action(Key::Home, KeyboardModifiers::NONE, &spec(Structure::Flat));
        assert_eq!(action, RovingAction::Move(0));
    }

    #[test]
    fn test_activation_modes() {
        let mut single = flat(3, SelectionMode::Single, false);
        assert!(single.activate(1));
        assert!(!single.activate(1));
        assert!(single.activate(2));
        assert_eq!(single.selected_indices(), vec![2]);

        let mut multiple = flat(3, SelectionMode::Multiple, false);
        assert!(multiple.activate(2));
        assert!(multiple.activate(0));
        assert_eq!(multiple.selected_values(), vec!["v0", "v2"]);
        assert!(multiple.activate(2));
        assert_eq!(multiple.selected_values(), vec!["v0"]);

        let mut none = flat(3, SelectionMode::None, false);
        assert!(!none.activate(0));
    }

    #[test]
    fn test_ensure_active_prefers_selection() {
        let mut state = flat(3, SelectionMode::Single, false);
        state.active = None;
        state.set_selected_keys(vec!["item-2".to_string(), "item-1".to_string()]);
        assert_eq!(state.selected_indices(), vec![1]);
        state.ensure_active();
        assert_eq!(state.active(), Some(1));
    }

    fn tree() -> SelectionState {
        // a
        //   a1
        //   a2
        // b
        let n = nodes(4);
        let mut a = ItemRef::new(n[0], "a", "a");
        a.expanded = Some(false);
        let mut a1 = ItemRef::new(n[1], "a1", "a1");
        a1.parent = Some(0);
        a1.level = 2;
        let mut a2 = ItemRef::new(n[2], "a2", "a2");
        a2.parent = Some(0);
        a2.level = 2;
        let b = ItemRef::new(n[3], "b", "b");
        let mut state = SelectionState::new(vec![a, a1, a2, b], SelectionMode::Single, Orientation::Vertical, false);
        state.ensure_active();
        state
    }

    #[test]
    fn test_tree_navigation() {
        let mut state = tree();
        let spec = spec(Structure::Nested);
        let none = KeyboardModifiers::NONE;

        assert_eq!(state.step(0, true), Some(3));
        assert_eq!(
            state.key_action(Key::ArrowRight, none, &spec),
            RovingAction::Expand {
                index: 0,
                expanded: true
            }
        );
        assert!(state.set_expanded(0, true));
        assert_eq!(state.key_action(Key::ArrowRight, none, &spec), RovingAction::Move(1));

        state.set_active(2);
        assert_eq!(state.key_action(Key::ArrowLeft, none, &spec), RovingAction::Move(0));

        assert!(state.set_expanded(0, false));
        assert_eq!(state.active(), Some(0));
        assert!(!state.is_navigable(2));
    }

    #[test]
    fn test_grid_moves() {
        // 2x3 grid, cell (1,2) missing
        let n = nodes(5);
        let cells: Vec<ItemRef> = [(0, 0), (0, 1), (0, 2), (1, 0), (1, 1)]
            .iter()
            .enumerate()
            .map(|(i, &(r, c))| {
                let mut item = ItemRef::new(n[i], format!("c{i}"), "");
                item.row = r;
                item.column = c;
                item
            })
            .collect();
        let mut state = SelectionState::new(cells, SelectionMode::None, Orientation::Horizontal, false);
        state.ensure_active();
        let spec = spec(Structure::Grid);

        assert_eq!(state.grid_move(0, 0, 1), Some(1));
        assert_eq!(state.grid_move(1, 1, 0), Some(4));
        assert_eq!(state.grid_move(2, 1, 0), Some(4));
        assert_eq!(state.grid_move(3, -1, 0), Some(0));
        assert_eq!(state.grid_move(4, 1, 0), None);

        state.set_active(4);
        assert_eq!(state.key_action(Key::Home, KeyboardModifiers::NONE, &spec), RovingAction::Move(3));
        assert_eq!(state.key_action(Key::End, KeyboardModifiers::CTRL, &spec), RovingAction::Move(4));
        assert_eq!(state.key_action(Key::Home, KeyboardModifiers::CTRL, &spec), RovingAction::Move(0));
    }

    #[test]
    fn test_replace_items_keeps_active_and_selection() {
        let mut state = flat(3, SelectionMode::Single, false);
        state.set_active(2);
        state.select_only(2);
        let kept = state.items[2].clone();
        let fresh = ItemRef::new(nodes(1)[0], "fresh", "fresh");

        state.replace_items(vec![fresh, kept], Vec::new());
        assert_eq!(state.active(), Some(1));
        assert_eq!(state.selected_indices(), vec![1]);
    }
}
