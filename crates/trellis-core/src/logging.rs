//! Logging and debugging facilities for Trellis.
//!
//! This module provides:
//! - Target names for filtering `tracing` output by subsystem
//! - Debug visualization for document trees
//!
//! # Tracing Integration
//!
//! Trellis is instrumented with the `tracing` crate. Install any subscriber
//! in the host application to see the output:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("trellis=debug,trellis_core=trace")
//!     .init();
//! ```
//!
//! # Debug Visualization
//!
//! ```
//! use trellis_core::{Document, DocumentTreeDebug};
//!
//! let mut doc = Document::new();
//! let root = doc.root();
//! doc.append_element(root, "t-tabs", &[("id", "settings")]).unwrap();
//!
//! let output = DocumentTreeDebug::new().format_tree(&doc);
//! assert!(output.contains("t-tabs"));
//! ```

use std::fmt::Write as FmtWrite;

use crate::document::{Document, NodeId, NodeKind};

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "trellis_core";
    /// Document tree target.
    pub const DOCUMENT: &str = "trellis_core::document";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "trellis_core::signal";
    /// Timer system target.
    pub const TIMER: &str = "trellis_core::timer";

    /// Engine crate target.
    pub const ENGINE: &str = "trellis";
    /// Widget mount/unmount target.
    pub const MOUNT: &str = "trellis::mount";
    /// Input dispatch target.
    pub const DISPATCH: &str = "trellis::dispatch";
    /// Disclosure controller target.
    pub const DISCLOSURE: &str = "trellis::disclosure";
    /// Roving selection controller target.
    pub const ROVING: &str = "trellis::roving";
    /// Resizer controller target.
    pub const RESIZER: &str = "trellis::resizer";
    /// Overlay portal target.
    pub const PORTAL: &str = "trellis::portal";
    /// Configuration loading target.
    pub const CONFIG: &str = "trellis::config";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact dash-prefixed representation.
    Compact,
}

/// Configuration for document tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show node IDs.
    pub show_ids: bool,
    /// Whether to show element attributes.
    pub show_attributes: bool,
    /// Whether to show text nodes.
    pub show_text: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: false,
            show_attributes: true,
            show_text: true,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Options for detailed debugging output.
    pub fn detailed() -> Self {
        Self {
            show_ids: true,
            ..Default::default()
        }
    }

    /// Options for minimal output: tags only.
    pub fn minimal() -> Self {
        Self {
            show_ids: false,
            show_attributes: false,
            show_text: false,
            ..Default::default()
        }
    }
}

/// Debug utility for visualizing a [`Document`].
#[derive(Debug, Clone, Default)]
pub struct DocumentTreeDebug {
    options: TreeFormatOptions,
}

impl DocumentTreeDebug {
    /// Create a new debug visualizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a debug visualizer with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format the whole document from its root.
    pub fn format_tree(&self, doc: &Document) -> String {
        let mut output = String::new();
        let _ = writeln!(output, "Document ({} nodes):", doc.node_count());
        self.format_subtree_into(doc, doc.root(), 0, true, &mut output);
        output
    }

    /// Format the subtree rooted at `root`.
    pub fn format_subtree(&self, doc: &Document, root: NodeId) -> String {
        let mut output = String::new();
        self.format_subtree_into(doc, root, 0, true, &mut output);
        output
    }

    fn format_subtree_into(
        &self,
        doc: &Document,
        id: NodeId,
        depth: usize,
        is_last: bool,
        output: &mut String,
    ) {
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return;
        }
        let Some(kind) = doc.kind(id) else {
            return;
        };

        match kind {
            NodeKind::Text(content) => {
                if !self.options.show_text || content.trim().is_empty() {
                    return;
                }
                output.push_str(&self.build_prefix(depth, is_last));
                let _ = write!(output, "{:?}", content.trim());
            }
            NodeKind::Element { tag, attributes } => {
                output.push_str(&self.build_prefix(depth, is_last));
                let _ = write!(output, "<{tag}");
                if self.options.show_attributes {
                    for attr in attributes {
                        if attr.value.is_empty() {
                            let _ = write!(output, " {}", attr.name);
                        } else {
                            let _ = write!(output, " {}={:?}", attr.name, attr.value);
                        }
                    }
                }
                output.push('>');
            }
        }
        if self.options.show_ids {
            let _ = write!(output, " [{id:?}]");
        }
        output.push('\n');

        let children: Vec<NodeId> = doc
            .children(id)
            .iter()
            .copied()
            .filter(|&c| self.options.show_text || doc.is_element(c))
            .collect();
        let child_count = children.len();
        for (i, child) in children.into_iter().enumerate() {
            self.format_subtree_into(doc, child, depth + 1, i + 1 == child_count, output);
        }
    }

    /// Build the prefix string for a tree node.
    fn build_prefix(&self, depth: usize, is_last: bool) -> String {
        if depth == 0 {
            return String::new();
        }

        let (branch, corner, last) = match self.options.style {
            TreeStyle::Ascii => ("|", "+--", "`--"),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500}", "\u{2514}\u{2500}\u{2500}"),
            TreeStyle::Compact => ("", "-", "-"),
        };

        let mut prefix = String::new();
        for _ in 0..(depth - 1) {
            prefix.push_str(branch);
            for _ in 0..self.options.indent_size {
                prefix.push(' ');
            }
        }
        prefix.push_str(if is_last { last } else { corner });
        prefix.push(' ');
        prefix
    }
}
