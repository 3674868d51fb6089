//! Error types for Trellis core systems.

/// Errors that can occur during document operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    /// The node ID is invalid or the node has been destroyed.
    #[error("Invalid or destroyed node ID")]
    InvalidNode,
    /// The operation requires an element but the node is a text node.
    #[error("Node is not an element")]
    NotAnElement,
    /// Attempted to insert a node into itself or one of its descendants.
    #[error("Cannot insert a node into itself or one of its descendants")]
    CircularParentage,
    /// The reference node passed to an insertion is not a child of the parent.
    #[error("Reference node is not a child of the target parent")]
    NotAChild,
}

/// Timer-specific errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TimerError {
    /// The timer ID is invalid or the timer has already fired or been stopped.
    #[error("Invalid or expired timer ID")]
    InvalidTimerId,
}

/// Result type for document operations.
pub type DocumentResult<T> = std::result::Result<T, DocumentError>;
