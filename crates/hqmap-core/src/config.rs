//! Configuration
//!
//! Loaded from an optional TOML file, then overridden from the environment:
//!
//! | variable               | setting              |
//! |------------------------|----------------------|
//! | `GEMINI_API_KEY`       | `model.api_key`      |
//! | `HQMAP_MODEL`          | `model.model`        |
//! | `HQMAP_MODEL_ENDPOINT` | `model.endpoint`     |
//! | `HQMAP_TIMEOUT_SECS`   | `model.timeout_secs` |
//! | `HQMAP_FENCE`          | `view.fence`         |

use crate::error::ConfigError;
use crate::view_state::FencePolicy;
use hqmap_extract::{ModelConfig, NormalizerConfig};
use hqmap_geo::FocusPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// View settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Treatment of overlapping submits
    pub fence: FencePolicy,
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    /// Model connection
    pub model: ModelConfig,
    /// Viewport framing
    pub focus: FocusPolicy,
    /// Response normalization
    pub normalizer: NormalizerConfig,
    /// View state
    pub view: ViewConfig,
}

impl AtlasConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With model settings
    #[inline]
    #[must_use]
    pub fn with_model(mut self, model: ModelConfig) -> Self {
        self.model = model;
        self
    }

    /// With focus policy
    #[inline]
    #[must_use]
    pub fn with_focus(mut self, focus: FocusPolicy) -> Self {
        self.focus = focus;
        self
    }

    /// With fence policy
    #[inline]
    #[must_use]
    pub fn with_fence(mut self, fence: FencePolicy) -> Self {
        self.view.fence = fence;
        self
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// `ConfigError::Toml` on syntax or type errors
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read a TOML file
    ///
    /// # Errors
    /// `ConfigError::Io` if unreadable, `ConfigError::Toml` if unparseable
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// File (if any) + process environment, validated
    ///
    /// # Errors
    /// Any load, override or validation error
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        let config = base.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    ///
    /// # Errors
    /// `ConfigError::Invalid` for unparseable values
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a lookup function
    ///
    /// # Errors
    /// `ConfigError::Invalid` for unparseable values
    pub fn apply_env_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(key) = var("GEMINI_API_KEY") {
            self.model.api_key = Some(key);
        }
        if let Some(model) = var("HQMAP_MODEL") {
            self.model.model = model;
        }
        if let Some(endpoint) = var("HQMAP_MODEL_ENDPOINT") {
            self.model.endpoint = endpoint;
        }
        if let Some(timeout) = var("HQMAP_TIMEOUT_SECS") {
            self.model.timeout_secs = timeout
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("HQMAP_TIMEOUT_SECS: {timeout}")))?;
        }
        if let Some(fence) = var("HQMAP_FENCE") {
            self.view.fence = fence.parse().map_err(ConfigError::Invalid)?;
        }
        Ok(self)
    }

    /// Check ranges
    ///
    /// # Errors
    /// `ConfigError::Invalid` naming the first bad setting
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| -> Result<(), ConfigError> { Err(ConfigError::Invalid(msg)) };

        if self.model.timeout_secs == 0 {
            return invalid("model.timeout_secs must be > 0".into());
        }
        if self.model.model.trim().is_empty() {
            return invalid("model.model must not be empty".into());
        }
        let endpoint = self.model.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return invalid(format!("model.endpoint must be an http(s) URL: {endpoint}"));
        }
        if !(self.focus.zoom_multiplier.is_finite() && self.focus.zoom_multiplier > 0.0) {
            return invalid("focus.zoom_multiplier must be > 0".into());
        }
        if !(self.focus.projected_scale.is_finite() && self.focus.projected_scale > 0.0) {
            return invalid("focus.projected_scale must be > 0".into());
        }
        if !self.focus.horizontal_offset.is_finite() {
            return invalid("focus.horizontal_offset must be finite".into());
        }
        if let Some(floor) = self.normalizer.floors.first_invalid() {
            return invalid(format!("normalizer.floors.{floor} must be > 0"));
        }
        Ok(())
    }
}
