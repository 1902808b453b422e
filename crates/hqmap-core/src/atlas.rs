//! Atlas facade
//!
//! Wires configuration into the pipeline, the focus resolver and view-state
//! controllers.

use crate::config::AtlasConfig;
use crate::error::AtlasError;
use crate::view_state::ViewStateController;
use hqmap_extract::{
    connect, ExtractionPipeline, ModelClient, PipelineStatsSnapshot, Resolution, ResponseNormalizer,
};
use hqmap_geo::{Focus, FocusQuery, GeoFocusResolver, RegionAnchor};
use std::sync::Arc;

/// Entry point for resolving companies and framing the map
#[derive(Debug)]
pub struct Atlas {
    config: AtlasConfig,
    pipeline: Arc<ExtractionPipeline>,
    resolver: GeoFocusResolver,
}

impl Atlas {
    /// Build from configuration, connecting the configured model
    ///
    /// Without an API key every resolution degrades to a fallback record.
    ///
    /// # Errors
    /// `AtlasError::Config` for invalid settings, `AtlasError::Model` if the
    /// HTTP client cannot be built
    pub fn from_config(config: AtlasConfig) -> Result<Self, AtlasError> {
        config.validate()?;
        let model = connect(&config.model)?;
        Ok(Self::with_model(config, model))
    }

    /// Build around an explicit model client
    #[must_use]
    pub fn with_model(config: AtlasConfig, model: Arc<dyn ModelClient>) -> Self {
        let pipeline = ExtractionPipeline::new(model)
            .with_normalizer(ResponseNormalizer::from_config(config.normalizer));
        let resolver = GeoFocusResolver::new().with_policy(config.focus);
        tracing::info!(
            model = pipeline.model_name(),
            fence = %config.view.fence,
            "atlas ready"
        );
        Self {
            config,
            pipeline: Arc::new(pipeline),
            resolver,
        }
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &AtlasConfig {
        &self.config
    }

    /// Resolve a company name
    ///
    /// # Errors
    /// `AtlasError::Extract` with `InvalidQuery`
    pub async fn resolve(&self, entity_name: &str) -> Result<Resolution, AtlasError> {
        Ok(self.pipeline.resolve_detailed(entity_name).await?)
    }

    /// Frame a region code and/or coordinate
    #[must_use]
    pub fn focus(&self, query: FocusQuery<'_>) -> Focus {
        self.resolver.resolve_query(query)
    }

    /// All region anchors, sorted by code
    #[must_use]
    pub fn regions(&self) -> Vec<RegionAnchor> {
        self.resolver.table().sorted()
    }

    /// New controller sharing this atlas' pipeline
    #[must_use]
    pub fn controller(&self) -> ViewStateController {
        ViewStateController::new(Arc::clone(&self.pipeline), self.resolver.clone())
            .with_fence(self.config.view.fence)
    }

    /// Pipeline outcome counters
    #[must_use]
    pub fn stats(&self) -> PipelineStatsSnapshot {
        self.pipeline.stats()
    }
}
