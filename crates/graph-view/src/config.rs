//! Engine configuration
//!
//! Loaded from YAML. Every field has a default so a partial file (or no file
//! at all) is valid.
//!
//! ```yaml
//! selection_debounce_ms: 100
//! hover_expand_ms: 500
//! max_focus_paths: 100
//! max_preview_popovers: 5
//! title_truncate_words: 3
//! pixel_ratio: 2.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use viewport::{ZoomBounds, DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM};

/// Environment variable naming a YAML config file
pub const CONFIG_ENV_VAR: &str = "GRAPH_VIEW_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Config field {field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("Invalid zoom bounds: min_zoom {min} must be > 0 and <= max_zoom {max}")]
    ZoomBounds { min: f64, max: f64 },
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "CONFIG_IO",
            Self::Parse(_) => "CONFIG_PARSE",
            Self::Zero { .. } => "CONFIG_ZERO",
            Self::ZoomBounds { .. } => "CONFIG_ZOOM_BOUNDS",
        }
    }
}

/// Tunables of the view engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Quiet period before coalesced selection is emitted
    pub selection_debounce_ms: u64,
    /// Pointer dwell before a truncated title expands
    pub hover_expand_ms: u64,
    /// Paths kept by a single path-focus request
    pub max_focus_paths: usize,
    /// Simultaneously open detail previews
    pub max_preview_popovers: usize,
    /// Words kept in a truncated node title
    pub title_truncate_words: usize,
    /// Device pixel ratio of the canvas (pixels per point)
    pub pixel_ratio: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            selection_debounce_ms: 100,
            hover_expand_ms: 500,
            max_focus_paths: 100,
            max_preview_popovers: 5,
            title_truncate_words: 3,
            pixel_ratio: 1.0,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
        }
    }
}

impl EngineConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_yaml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded engine config");
        Ok(config)
    }

    /// Load from the file named by `GRAPH_VIEW_CONFIG`, or defaults when unset
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = [
            ("selection_debounce_ms", self.selection_debounce_ms as usize),
            ("hover_expand_ms", self.hover_expand_ms as usize),
            ("max_focus_paths", self.max_focus_paths),
            ("max_preview_popovers", self.max_preview_popovers),
            ("title_truncate_words", self.title_truncate_words),
        ];
        if let Some((field, _)) = limits.iter().find(|(_, v)| *v == 0) {
            return Err(ConfigError::Zero { field });
        }
        if !(self.pixel_ratio > 0.0) || !self.pixel_ratio.is_finite() {
            return Err(ConfigError::Zero {
                field: "pixel_ratio",
            });
        }
        self.zoom_bounds()?;
        Ok(())
    }

    pub fn zoom_bounds(&self) -> Result<ZoomBounds, ConfigError> {
        ZoomBounds::new(self.min_zoom, self.max_zoom).map_err(|_| ConfigError::ZoomBounds {
            min: self.min_zoom,
            max: self.max_zoom,
        })
    }
}
