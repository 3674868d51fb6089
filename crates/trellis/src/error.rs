//! Error types for the Trellis engine.

use std::path::PathBuf;

use trellis_core::{DocumentError, NodeId};

/// Errors returned by [`Engine`](crate::Engine) operations.
///
/// Problems inside author markup (missing slots, malformed numbers) are not
/// errors; they degrade to defaults and are logged. These variants cover
/// handles the caller passed in.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A document operation failed.
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// The element's tag does not name a widget kind.
    #[error("element <{tag}> is not a widget host")]
    UnknownWidget {
        /// The offending tag.
        tag: String,
    },

    /// The host must be connected to the document before mounting.
    #[error("node {0:?} is not connected to the document")]
    NotConnected(NodeId),

    /// No mounted widget instance is associated with the node.
    #[error("no widget instance is mounted on node {0:?}")]
    NotMounted(NodeId),

    /// The widget instance does not have the requested capability.
    #[error("widget `{kind}` does not support {capability}")]
    Unsupported {
        /// Widget kind name.
        kind: &'static str,
        /// Capability that was requested.
        capability: &'static str,
    },

    /// A configuration file could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised while loading or saving [`EngineConfig`](crate::EngineConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The TOML text could not be parsed into a configuration.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be serialized.
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Reading the configuration file failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
