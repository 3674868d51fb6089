//! Declarative attribute parsing.
//!
//! Author markup never produces an error. Malformed values log a warning and
//! fall back to the documented default.

use std::time::Duration;

use trellis_core::logging::targets;
use trellis_core::{Document, NodeId};

use super::{Orientation, SelectionMode};

/// Presence boolean. An explicit `"false"` counts as absent.
pub fn flag(doc: &Document, node: NodeId, name: &str) -> bool {
    doc.attribute(node, name)
        .is_some_and(|value| !value.eq_ignore_ascii_case("false"))
}

/// `orientation`, falling back to `default`.
pub fn orientation(doc: &Document, node: NodeId, default: Orientation) -> Orientation {
    match doc.attribute(node, "orientation") {
        None => default,
        Some(value) => Orientation::parse(value).unwrap_or_else(|| {
            tracing::warn!(
                target: targets::MOUNT,
                ?node,
                value,
                fallback = default.as_str(),
                "invalid orientation"
            );
            default
        }),
    }
}

/// `mode`, or presence of `multiple`, falling back to `default`.
pub fn mode(doc: &Document, node: NodeId, default: SelectionMode) -> SelectionMode {
    if let Some(value) = doc.attribute(node, "mode") {
        return SelectionMode::parse(value).unwrap_or_else(|| {
            tracing::warn!(
                target: targets::MOUNT,
                ?node,
                value,
                fallback = default.as_str(),
                "invalid selection mode"
            );
            default
        });
    }
    if flag(doc, node, "multiple") {
        SelectionMode::Multiple
    } else {
        default
    }
}

/// A finite number. Absent or malformed values yield `None`.
pub fn number(doc: &Document, node: NodeId, name: &str) -> Option<f64> {
    let raw = doc.attribute(node, name)?;
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix("px").unwrap_or(trimmed);
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => {
            tracing::warn!(target: targets::MOUNT, ?node, name, value = raw, "invalid number");
            None
        }
    }
}

/// A non-negative delay in milliseconds.
pub fn millis(doc: &Document, node: NodeId, name: &str) -> Option<Duration> {
    match number(doc, node, name)? {
        ms if ms >= 0.0 => Some(Duration::from_millis(ms.round() as u64)),
        ms => {
            tracing::warn!(target: targets::MOUNT, ?node, name, ms, "negative delay ignored");
            None
        }
    }
}

/// Non-empty trimmed text value.
pub fn text(doc: &Document, node: NodeId, name: &str) -> Option<String> {
    doc.attribute(node, name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Render a number the way it appears in attributes (`200`, `12.5`).
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(attrs: &[(&str, &str)]) -> (Document, NodeId) {
        let mut doc = Document::new();
        let root = doc.root();
        let node = doc.append_element(root, "t-split", attrs).unwrap();
        (doc, node)
    }

    #[test]
    fn test_flag() {
        let (doc, node) = element(&[("open", ""), ("persistent", "false")]);
        assert!(flag(&doc, node, "open"));
        assert!(!flag(&doc, node, "persistent"));
        assert!(!flag(&doc, node, "disabled"));
    }

    #[test]
    fn test_orientation_fallback() {
        let (doc, node) = element(&[("orientation", "sideways")]);
        assert_eq!(
            orientation(&doc, node, Orientation::Vertical),
            Orientation::Vertical
        );
    }

    #[test]
    fn test_mode_from_multiple_flag() {
        let (doc, node) = element(&[("multiple", "")]);
        assert_eq!(mode(&doc, node, SelectionMode::Single), SelectionMode::Multiple);

        let (doc, node) = element(&[("mode", "bogus"), ("multiple", "")]);
        assert_eq!(mode(&doc, node, SelectionMode::Single), SelectionMode::Single);
    }

    #[test]
    fn test_number_parsing() {
        let (doc, node) = element(&[("min", "100px"), ("max", "abc"), ("step", "NaN")]);
        assert_eq!(number(&doc, node, "min"), Some(100.0));
        assert_eq!(number(&doc, node, "max"), None);
        assert_eq!(number(&doc, node, "step"), None);
        assert_eq!(number(&doc, node, "value"), None);
    }

    #[test]
    fn test_millis() {
        let (doc, node) = element(&[("open-delay", "150"), ("close-delay", "-5")]);
        assert_eq!(millis(&doc, node, "open-delay"), Some(Duration::from_millis(150)));
        assert_eq!(millis(&doc, node, "close-delay"), None);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(200.0), "200");
        assert_eq!(format_number(12.5), "12.5");
        assert_eq!(format_number(-3.0), "-3");
    }
}
