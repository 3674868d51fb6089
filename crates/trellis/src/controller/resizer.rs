//! Split panes and their separators.
//!
//! Each separator owns a [`RangeState`] whose value is the offset of the
//! boundary between pane `i` and pane `i + 1`, measured from the start of the
//! split container. Moving a boundary resizes only its two neighbours; the
//! other boundaries keep their values and only their bounds are recomputed.

use trellis_core::logging::targets;
use trellis_core::{Document, DocumentResult, NodeId};

use crate::engine::{DragState, Engine};
use crate::event::{EventDetail, EventKind};
use crate::identity::RelationKind;
use crate::input::{Key, Point};
use crate::slot;
use crate::widget::attributes::{self, format_number};
use crate::widget::{AriaRole, InstanceId, Orientation, WidgetInstance};

/// A bounded numeric value with a remembered "expanded" position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeState {
    value: f64,
    min: f64,
    max: f64,
    step: f64,
    collapsed_value: f64,
}

impl RangeState {
    /// Create a range. `min > max` is corrected by raising `max` to `min`.
    pub fn new(value: f64, min: f64, max: f64, step: f64) -> Self {
        let mut range = Self {
            value,
            min,
            max,
            step,
            collapsed_value: value,
        };
        range.set_bounds(min, max);
        range.collapsed_value = range.value;
        range
    }

    /// Current value.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Lower bound.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound, never below [`min`](Self::min).
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Distance moved by one arrow key press.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Value restored by the next collapse toggle.
    pub fn collapsed_value(&self) -> f64 {
        self.collapsed_value
    }

    /// Whether the value sits at the minimum.
    pub fn is_collapsed(&self) -> bool {
        self.value <= self.min
    }

    /// Replace the bounds and clamp the value into them.
    pub fn set_bounds(&mut self, min: f64, max: f64) {
        let max = if min > max {
            tracing::warn!(target: targets::RESIZER, min, max, "range min exceeds max, raising max");
            min
        } else {
            max
        };
        self.min = min;
        self.max = max;
        self.value = self.clamp(self.value);
    }

    /// Clamp `value` into `[min, max]`.
    #[inline]
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Set the value, clamped. Returns whether it changed.
    pub fn set_value(&mut self, value: f64) -> bool {
        let value = self.clamp(value);
        if value == self.value {
            return false;
        }
        self.value = value;
        true
    }

    /// Move by `steps` steps.
    pub fn step_by(&mut self, steps: f64) -> bool {
        self.set_value(self.value + steps * self.step)
    }

    /// Jump to `min`, remembering the current value.
    pub fn collapse(&mut self) -> bool {
        if !self.is_collapsed() {
            self.collapsed_value = self.value;
        }
        self.set_value(self.min)
    }

    /// Jump to `max`.
    pub fn maximize(&mut self) -> bool {
        self.set_value(self.max)
    }

    /// Toggle between `min` and the remembered value.
    pub fn toggle_collapsed(&mut self) -> bool {
        if self.is_collapsed() {
            let restore = self.collapsed_value;
            self.collapsed_value = self.value;
            self.set_value(restore)
        } else {
            self.collapse()
        }
    }
}

/// One pane of a split.
#[derive(Debug, Clone, PartialEq)]
pub struct Pane {
    /// The pane element.
    pub node: NodeId,
    /// Extent along the split axis.
    pub size: f64,
    /// Smallest allowed extent.
    pub min: f64,
    /// Largest allowed extent, if capped.
    pub max: Option<f64>,
}

/// A generated separator between two panes.
#[derive(Debug, Clone, PartialEq)]
pub struct Separator {
    /// The generated separator element.
    pub node: NodeId,
    /// Boundary offset and its bounds.
    pub range: RangeState,
}

/// Panes, separators and the container they share.
#[derive(Debug, Clone)]
pub struct SplitLayout {
    orientation: Orientation,
    container: f64,
    panes: Vec<Pane>,
    separators: Vec<Separator>,
    limit_min: Option<f64>,
    limit_max: Option<f64>,
}

impl SplitLayout {
    /// Build a layout.
    ///
    /// Panes without a size share the space the sized panes leave. Without a
    /// container size the panes' total is used. `separators` must hold one
    /// node per adjacent pane pair.
    pub fn new(
        orientation: Orientation,
        container: Option<f64>,
        mut panes: Vec<Pane>,
        separators: Vec<NodeId>,
        limits: (Option<f64>, Option<f64>),
        step: f64,
    ) -> Self {
        let known: f64 = panes.iter().filter(|p| p.size > 0.0).map(|p| p.size).sum();
        let unsized_count = panes.iter().filter(|p| p.size <= 0.0).count();
        let container = match container {
            Some(size) if size >= known => size,
            Some(size) => {
                tracing::warn!(target: targets::RESIZER, size, known, "panes exceed split size");
                known
            }
            None => known,
        };
        if unsized_count > 0 {
            let share = (container - known).max(0.0) / unsized_count as f64;
            for pane in panes.iter_mut().filter(|p| p.size <= 0.0) {
                pane.size = share;
            }
        }

        let mut layout = Self {
            orientation,
            container,
            panes,
            separators: Vec::new(),
            limit_min: limits.0,
            limit_max: limits.1,
        };
        layout.separators = separators
            .into_iter()
            .enumerate()
            .map(|(index, node)| {
                let (min, max) = layout.bounds(index);
                Separator {
                    node,
                    range: RangeState::new(layout.boundary(index), min, max, step),
                }
            })
            .collect();

        // Pull authored sizes into the bounds.
        for index in 0..layout.separators.len() {
            let value = layout.separators[index].range.value();
            layout.move_separator(index, value);
            let value = layout.separators[index].range.value();
            layout.separators[index].range.collapsed_value = value;
        }
        layout
    }

    /// Axis the panes are laid out along.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Total extent shared by the panes.
    pub fn container_size(&self) -> f64 {
        self.container
    }

    /// Panes in document order.
    pub fn panes(&self) -> &[Pane] {
        &self.panes
    }

    /// Separators; separator `i` sits between pane `i` and pane `i + 1`.
    pub fn separators(&self) -> &[Separator] {
        &self.separators
    }

    /// Current pane sizes in order.
    pub fn sizes(&self) -> Vec<f64> {
        self.panes.iter().map(|p| p.size).collect()
    }

    /// Index of the separator element `node`.
    pub fn separator_index(&self, node: NodeId) -> Option<usize> {
        self.separators.iter().position(|s| s.node == node)
    }

    /// Offset of the end of pane `index`.
    fn boundary(&self, index: usize) -> f64 {
        self.panes.iter().take(index + 1).map(|p| p.size).sum()
    }

    fn bounds(&self, index: usize) -> (f64, f64) {
        let previous = if index == 0 { 0.0 } else { self.boundary(index - 1) };
        let next = if index + 2 >= self.panes.len() {
            self.container
        } else {
            self.boundary(index + 1)
        };
        let (before, after) = (&self.panes[index], &self.panes[index + 1]);

        let mut min = previous + before.min;
        let mut max = next - after.min;
        if let Some(limit) = after.max {
            min = min.max(next - limit);
        }
        if let Some(limit) = before.max {
            max = max.min(previous + limit);
        }
        // Host limits never push a boundary outside the panes it separates.
        match self.limit_min {
            Some(limit) if limit <= max => min = min.max(limit),
            Some(limit) => {
                tracing::warn!(target: targets::RESIZER, index, limit, max, "split min out of range, ignored");
            }
            None => {}
        }
        match self.limit_max {
            Some(limit) if limit >= min => max = max.min(limit),
            Some(limit) => {
                tracing::warn!(target: targets::RESIZER, index, limit, min, "split max out of range, ignored");
            }
            None => {}
        }
        (min, max)
    }

    fn refresh_bounds(&mut self) {
        for index in 0..self.separators.len() {
            let (min, max) = self.bounds(index);
            self.separators[index].range.set_bounds(min, max);
        }
    }

    /// Move separator `index` to `value` (clamped). Returns whether the
    /// panes changed.
    pub fn move_separator(&mut self, index: usize, value: f64) -> bool {
        let Some(range) = self.separators.get(index).map(|s| s.range) else {
            return false;
        };
        let value = range.clamp(value);
        let delta = value - self.boundary(index);
        self.separators[index].range.value = value;
        if delta == 0.0 {
            return false;
        }
        self.panes[index].size += delta;
        self.panes[index + 1].size -= delta;
        self.refresh_bounds();
        true
    }

    /// Apply a key press to separator `index`. `None` when the key has no
    /// meaning for this split's axis.
    pub fn apply_key(&mut self, index: usize, key: Key) -> Option<bool> {
        let mut range = self.separators.get(index)?.range;
        let (decrease, increase) = match self.orientation {
            Orientation::Horizontal => (Key::ArrowLeft, Key::ArrowRight),
            Orientation::Vertical => (Key::ArrowUp, Key::ArrowDown),
        };
        match key {
            k if k == decrease => range.step_by(-1.0),
            k if k == increase => range.step_by(1.0),
            Key::Home => range.collapse(),
            Key::End => range.maximize(),
            Key::Enter => range.toggle_collapsed(),
            _ => return None,
        };
        let changed = self.move_separator(index, range.value);
        if let Some(separator) = self.separators.get_mut(index) {
            separator.range.collapsed_value = range.collapsed_value;
        }
        Some(changed)
    }

    /// Switch the split axis. Sizes and offsets carry over unchanged.
    pub(crate) fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    pub(crate) fn set_limits(&mut self, limits: (Option<f64>, Option<f64>), step: f64) {
        self.limit_min = limits.0;
        self.limit_max = limits.1;
        for separator in &mut self.separators {
            separator.range.step = step;
        }
        self.refresh_bounds();
        for index in 0..self.separators.len() {
            let value = self.separators[index].range.value();
            self.move_separator(index, value);
        }
    }

    pub(crate) fn axis(&self, point: Point) -> f64 {
        match self.orientation {
            Orientation::Horizontal => point.x,
            Orientation::Vertical => point.y,
        }
    }
}

/// Project separator and pane attributes.
fn render_split(doc: &mut Document, instance: &WidgetInstance) -> DocumentResult<()> {
    let Some(layout) = instance.split.as_ref() else {
        return Ok(());
    };
    let orientation = layout.orientation().perpendicular();
    for separator in layout.separators() {
        let range = &separator.range;
        let (min, max, now) = (
            format_number(range.min()),
            format_number(range.max()),
            format_number(range.value()),
        );
        slot::project_role(doc, separator.node, AriaRole::Separator)?;
        slot::project(
            doc,
            separator.node,
            &[
                ("aria-orientation", orientation.as_str()),
                ("aria-valuemin", min.as_str()),
                ("aria-valuemax", max.as_str()),
                ("aria-valuenow", now.as_str()),
                ("tabindex", if instance.disabled { "-1" } else { "0" }),
            ],
        )?;
    }
    for pane in layout.panes() {
        let size = format_number(pane.size);
        slot::project(doc, pane.node, &[("data-size", size.as_str())])?;
    }
    Ok(())
}

fn split_limits(doc: &Document, host: NodeId) -> (Option<f64>, Option<f64>) {
    (attributes::number(doc, host, "min"), attributes::number(doc, host, "max"))
}

impl Engine {
    /// Build panes and generate separators for a split host.
    pub(crate) fn setup_split(&mut self, id: InstanceId) -> DocumentResult<()> {
        let Some(instance) = self.instances.get(id) else {
            return Ok(());
        };
        let (host, orientation) = (instance.host, instance.orientation);
        let pane_nodes = slot::resolve_all(&self.doc, host, "item", &self.config.tag_prefix);
        if pane_nodes.len() < 2 {
            tracing::warn!(target: targets::RESIZER, ?host, panes = pane_nodes.len(), "split needs two panes");
        }

        let mut panes = Vec::with_capacity(pane_nodes.len());
        for &node in &pane_nodes {
            self.identity.ensure_id(&mut self.doc, node)?;
            panes.push(Pane {
                node,
                size: attributes::number(&self.doc, node, "data-size").unwrap_or(0.0).max(0.0),
                min: attributes::number(&self.doc, node, "data-min").unwrap_or(0.0).max(0.0),
                max: attributes::number(&self.doc, node, "data-max"),
            });
        }

        let mut separators = Vec::new();
        for window in pane_nodes.windows(2) {
            let (primary, next) = (window[0], window[1]);
            let separator = self.doc.create_element("div");
            self.doc.set_attribute(separator, "data-trellis-separator", "")?;
            match self.doc.parent(next) {
                Some(parent) => self.doc.insert_before(parent, separator, Some(next))?,
                None => self.doc.append_child(host, separator)?,
            }
            self.identity
                .relate(&mut self.doc, id, separator, primary, RelationKind::Controls)?;
            separators.push(separator);
        }

        let step = self.split_step(host);
        let layout = SplitLayout::new(
            orientation,
            attributes::number(&self.doc, host, "size"),
            panes,
            separators,
            split_limits(&self.doc, host),
            step,
        );
        tracing::debug!(
            target: targets::RESIZER,
            ?host,
            size = layout.container_size(),
            separators = layout.separators().len(),
            "split layout built"
        );
        if let Some(instance) = self.instances.get_mut(id) {
            instance.split = Some(layout);
        }
        self.render_split_instance(id)
    }

    fn split_step(&self, host: NodeId) -> f64 {
        attributes::number(&self.doc, host, "step")
            .filter(|step| *step > 0.0)
            .unwrap_or(self.config.resizer.step)
    }

    /// Re-read `min`/`max`/`step` after an attribute change.
    pub(crate) fn update_split_limits(&mut self, id: InstanceId) -> DocumentResult<()> {
        let Some(host) = self.instances.get(id).map(|i| i.host) else {
            return Ok(());
        };
        let limits = split_limits(&self.doc, host);
        let step = self.split_step(host);
        if let Some(layout) = self.instances.get_mut(id).and_then(|i| i.split.as_mut()) {
            layout.set_limits(limits, step);
        }
        self.render_split_instance(id)
    }

    pub(crate) fn render_split_instance(&mut self, id: InstanceId) -> DocumentResult<()> {
        match self.instances.get(id) {
            Some(instance) => render_split(&mut self.doc, instance),
            None => Ok(()),
        }
    }

    /// Remove generated separators.
    pub(crate) fn teardown_split(&mut self, id: InstanceId) -> DocumentResult<()> {
        let nodes: Vec<NodeId> = self
            .instances
            .get(id)
            .and_then(|i| i.split.as_ref())
            .map(|layout| layout.separators().iter().map(|s| s.node).collect())
            .unwrap_or_default();
        for node in nodes {
            if self.doc.exists(node) {
                self.doc.destroy(node)?;
            }
        }
        Ok(())
    }

    pub(crate) fn separator_at(&self, id: InstanceId, node: NodeId) -> Option<usize> {
        self.instances.get(id)?.split.as_ref()?.separator_index(node)
    }

    fn emit_resize(&self, id: InstanceId, index: usize) {
        let Some(layout) = self.instances.get(id).and_then(|i| i.split.as_ref()) else {
            return;
        };
        let Some(separator) = layout.separators().get(index) else {
            return;
        };
        let detail = EventDetail::Size {
            value: separator.range.value(),
            sizes: layout.sizes(),
        };
        self.emit(id, EventKind::Resize, detail, false);
    }

    /// Move a separator programmatically.
    pub(crate) fn set_separator(&mut self, id: InstanceId, index: usize, value: f64) -> DocumentResult<bool> {
        let Some(layout) = self.instances.get_mut(id).and_then(|i| i.split.as_mut()) else {
            return Ok(false);
        };
        if !layout.move_separator(index, value) {
            return Ok(false);
        }
        self.render_split_instance(id)?;
        self.emit_resize(id, index);
        Ok(true)
    }

    /// Key press on a separator.
    pub(crate) fn separator_key(&mut self, id: InstanceId, index: usize, key: Key) -> DocumentResult<bool> {
        let Some(layout) = self.instances.get_mut(id).and_then(|i| i.split.as_mut()) else {
            return Ok(false);
        };
        let Some(changed) = layout.apply_key(index, key) else {
            return Ok(false);
        };
        tracing::trace!(target: targets::RESIZER, ?id, index, ?key, changed, "separator key");
        if changed {
            self.render_split_instance(id)?;
            self.emit_resize(id, index);
        }
        Ok(true)
    }

    /// Pointer-down on a separator starts a drag.
    pub(crate) fn drag_start(&mut self, id: InstanceId, index: usize, point: Point) -> bool {
        let Some(layout) = self.instances.get(id).and_then(|i| i.split.as_ref()) else {
            return false;
        };
        let Some(separator) = layout.separators().get(index) else {
            return false;
        };
        self.drag = Some(DragState {
            instance: id,
            separator: index,
            origin: layout.axis(point),
            start_value: separator.range.value(),
        });
        tracing::trace!(target: targets::RESIZER, ?id, index, "drag started");
        true
    }

    /// Live resize while dragging.
    pub(crate) fn drag_move(&mut self, point: Point) -> DocumentResult<bool> {
        let Some(drag) = self.drag else {
            return Ok(false);
        };
        let Some(layout) = self.instances.get_mut(drag.instance).and_then(|i| i.split.as_mut()) else {
            self.drag = None;
            return Ok(false);
        };
        let candidate = drag.start_value + (layout.axis(point) - drag.origin);
        if layout.move_separator(drag.separator, candidate) {
            self.render_split_instance(drag.instance)?;
        }
        Ok(true)
    }

    /// Pointer-up ends the drag and reports the final value.
    pub(crate) fn drag_end(&mut self, point: Point) -> DocumentResult<bool> {
        if self.drag.is_none() {
            return Ok(false);
        }
        self.drag_move(point)?;
        let Some(drag) = self.drag.take() else {
            return Ok(false);
        };
        tracing::trace!(target: targets::RESIZER, id = ?drag.instance, "drag finished");
        self.emit_resize(drag.instance, drag.separator);
        Ok(true)
    }
}
