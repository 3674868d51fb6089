//! Engine configuration.
//!
//! Every field has a default, so an empty TOML document is a valid
//! configuration:
//!
//! ```
//! use trellis::EngineConfig;
//!
//! let config = EngineConfig::from_toml_str(r#"
//! id_prefix = "app"
//!
//! [tooltip]
//! open_delay_ms = 250
//!
//! [wrap]
//! toolbar = true
//! "#).unwrap();
//!
//! assert_eq!(config.id_prefix, "app");
//! assert_eq!(config.tooltip.open_delay_ms, 250);
//! assert_eq!(config.tag_prefix, "t");
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use trellis_core::logging::targets;

use crate::error::ConfigError;

/// Open/close delays for hover and focus driven disclosures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayConfig {
    /// Delay before opening after pointer-enter or focus, in milliseconds.
    pub open_delay_ms: u64,
    /// Delay before closing after pointer-leave or blur, in milliseconds.
    pub close_delay_ms: u64,
}

impl DelayConfig {
    /// Open delay as a [`Duration`].
    pub fn open_delay(&self) -> Duration {
        Duration::from_millis(self.open_delay_ms)
    }

    /// Close delay as a [`Duration`].
    pub fn close_delay(&self) -> Duration {
        Duration::from_millis(self.close_delay_ms)
    }
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            open_delay_ms: 700,
            close_delay_ms: 300,
        }
    }
}

/// Split-pane separator settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizerConfig {
    /// Keyboard step in pixels when the split host has no `step` attribute.
    pub step: f64,
}

impl Default for ResizerConfig {
    fn default() -> Self {
        Self { step: 10.0 }
    }
}

/// Configuration for an [`Engine`](crate::Engine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Prefix for generated element ids (`{prefix}-{n}`).
    pub id_prefix: String,
    /// Prefix for widget tags (`{prefix}-menu`, `{prefix}-tabs`, ...).
    pub tag_prefix: String,
    /// Id of the top-level overlay container used for portaled content.
    pub overlay_id: String,
    /// Delays for `hover-card` widgets.
    pub hover_card: DelayConfig,
    /// Delays for `tooltip` widgets.
    pub tooltip: DelayConfig,
    /// Separator settings for `split` widgets.
    pub resizer: ResizerConfig,
    /// Wrap-around navigation overrides keyed by widget kind name.
    pub wrap: BTreeMap<String, bool>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            id_prefix: "trellis".to_string(),
            tag_prefix: "t".to_string(),
            overlay_id: "trellis-overlay".to_string(),
            hover_card: DelayConfig::default(),
            tooltip: DelayConfig {
                open_delay_ms: 500,
                close_delay_ms: 100,
            },
            resizer: ResizerConfig::default(),
            wrap: BTreeMap::new(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(target: targets::CONFIG, path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Serialize the configuration to TOML text.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// Wrap policy for a widget kind, falling back to the kind's default.
    pub fn wrap_for(&self, kind_name: &str, default: bool) -> bool {
        self.wrap.get(kind_name).copied().unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_tables() {
        let config = EngineConfig::from_toml_str(
            r#"
            overlay_id = "portal-root"

            [hover_card]
            close_delay_ms = 50

            [resizer]
            step = 4.0

            [wrap]
            navigation = true
            tabs = false
            "#,
        )
        .unwrap();

        assert_eq!(config.overlay_id, "portal-root");
        assert_eq!(config.hover_card.open_delay_ms, 700);
        assert_eq!(config.hover_card.close_delay(), Duration::from_millis(50));
        assert_eq!(config.resizer.step, 4.0);
        assert!(config.wrap_for("navigation", false));
        assert!(!config.wrap_for("tabs", true));
        assert!(config.wrap_for("menu", true));
    }

    #[test]
    fn test_round_trip_through_toml() {
        let mut config = EngineConfig::default();
        config.wrap.insert("toolbar".into(), true);
        let text = config.to_toml_string().unwrap();
        assert_eq!(EngineConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_malformed_toml() {
        let result = EngineConfig::from_toml_str("id_prefix = 3");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = EngineConfig::load("/nonexistent/trellis.toml");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
