//! Display configuration for outline views.
//!
//! [`OutlineConfig`] carries the handful of presentation constants the view
//! needs (indentation step, affordance width, loading label). It can be built
//! in code or loaded from a TOML file; missing keys fall back to the defaults.
//!
//! ```toml
//! indentation = 24.0
//! expand_indicator_size = 16.0
//! root_decorated = true
//! loading_label = "Fetching…"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Presentation settings for an [`OutlineView`](crate::widget::OutlineView).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineConfig {
    /// Horizontal offset added per depth level.
    pub indentation: f32,
    /// Width reserved for the expand affordance.
    pub expand_indicator_size: f32,
    /// Whether root rows reserve space for an affordance.
    pub root_decorated: bool,
    /// Text shown next to a node while its children are loading.
    pub loading_label: String,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            indentation: 20.0,
            expand_indicator_size: 16.0,
            root_decorated: true,
            loading_label: "Loading\u{2026}".to_string(),
        }
    }
}

impl OutlineConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse { path: None, source })
    }

    /// Loads a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: Some(path.to_path_buf()),
            source,
        })?;
        tracing::debug!(target: "horizon_outline::config", path = %path.display(), "loaded outline config");
        Ok(config)
    }

    /// Serializes to TOML text.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Sets the per-level indentation.
    pub fn with_indentation(mut self, indentation: f32) -> Self {
        self.indentation = indentation;
        self
    }

    /// Sets whether root rows reserve affordance space.
    pub fn with_root_decorated(mut self, decorated: bool) -> Self {
        self.root_decorated = decorated;
        self
    }

    /// Sets the loading label.
    pub fn with_loading_label(mut self, label: impl Into<String>) -> Self {
        self.loading_label = label.into();
        self
    }

    /// Leading offset of a row's content at `depth`.
    pub fn indent_for(&self, depth: usize) -> f32 {
        let base = if self.root_decorated {
            self.expand_indicator_size
        } else {
            0.0
        };
        base + depth as f32 * self.indentation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OutlineConfig::default();
        assert_eq!(config.indentation, 20.0);
        assert_eq!(config.expand_indicator_size, 16.0);
        assert!(config.root_decorated);
        assert_eq!(config.loading_label, "Loading\u{2026}");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = OutlineConfig::from_toml_str("indentation = 12.0").unwrap();
        assert_eq!(config.indentation, 12.0);
        assert_eq!(config.loading_label, OutlineConfig::default().loading_label);
    }

    #[test]
    fn test_invalid_toml() {
        let err = OutlineConfig::from_toml_str("indentation = \"wide\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { path: None, .. }));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = OutlineConfig::default()
            .with_indentation(8.0)
            .with_loading_label("wait");
        let text = config.to_toml_string().unwrap();
        assert_eq!(OutlineConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_indent_for() {
        let config = OutlineConfig::default();
        assert_eq!(config.indent_for(0), 16.0);
        assert_eq!(config.indent_for(2), 56.0);

        let flat = config.with_root_decorated(false);
        assert_eq!(flat.indent_for(0), 0.0);
        assert_eq!(flat.indent_for(1), 20.0);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = OutlineConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outline.toml");
        std::fs::write(&path, "root_decorated = false\nloading_label = \"...\"\n").unwrap();

        let config = OutlineConfig::load(&path).unwrap();
        assert!(!config.root_decorated);
        assert_eq!(config.loading_label, "...");
    }
}
