//! Extraction pipeline
//!
//! prompt → model → normalizer, degrading to [`FallbackProvider`] on any
//! model or validation failure. Exactly one model call per resolution, never
//! retried.

use crate::error::ExtractError;
use crate::fallback::FallbackProvider;
use crate::model::ModelClient;
use crate::normalize::{excerpt, ResponseNormalizer};
use crate::prompt::PromptBuilder;
use hqmap_record::{EntityRecord, RecordSource};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

const LOG_EXCERPT_CHARS: usize = 160;

/// A record with its provenance
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// The record, always complete
    pub record: EntityRecord,
    /// How it was produced
    pub source: RecordSource,
}

/// Outcome counters
#[derive(Debug, Default)]
pub struct PipelineStats {
    extracted: AtomicU64,
    model_unavailable: AtomicU64,
    malformed: AtomicU64,
    invalid_queries: AtomicU64,
}

/// Point-in-time copy of [`PipelineStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStatsSnapshot {
    /// Successfully extracted records
    pub extracted: u64,
    /// Fallbacks after a model failure
    pub model_unavailable: u64,
    /// Fallbacks after a validation failure
    pub malformed: u64,
    /// Rejected queries
    pub invalid_queries: u64,
}

impl PipelineStatsSnapshot {
    /// Total resolutions that returned a record
    #[must_use]
    pub fn resolved(&self) -> u64 {
        self.extracted + self.model_unavailable + self.malformed
    }
}

impl PipelineStats {
    fn record(&self, source: RecordSource) {
        let counter = match source {
            RecordSource::Extracted => &self.extracted,
            RecordSource::FallbackModelUnavailable => &self.model_unavailable,
            RecordSource::FallbackMalformed => &self.malformed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Current counts
    #[must_use]
    pub fn snapshot(&self) -> PipelineStatsSnapshot {
        PipelineStatsSnapshot {
            extracted: self.extracted.load(Ordering::Relaxed),
            model_unavailable: self.model_unavailable.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            invalid_queries: self.invalid_queries.load(Ordering::Relaxed),
        }
    }
}

/// Entity name → validated record
pub struct ExtractionPipeline {
    model: Arc<dyn ModelClient>,
    prompts: PromptBuilder,
    normalizer: ResponseNormalizer,
    fallback: FallbackProvider,
    stats: PipelineStats,
}

impl std::fmt::Debug for ExtractionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionPipeline")
            .field("model", &self.model.name())
            .field("prompts", &self.prompts)
            .field("normalizer", &self.normalizer)
            .field("fallback", &self.fallback)
            .finish_non_exhaustive()
    }
}

impl ExtractionPipeline {
    /// Create pipeline over a model with default components
    #[must_use]
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self {
            model,
            prompts: PromptBuilder::default(),
            normalizer: ResponseNormalizer::default(),
            fallback: FallbackProvider::default(),
            stats: PipelineStats::default(),
        }
    }

    /// With prompt builder
    #[must_use]
    pub fn with_prompt_builder(mut self, prompts: PromptBuilder) -> Self {
        self.prompts = prompts;
        self
    }

    /// With normalizer
    #[must_use]
    pub fn with_normalizer(mut self, normalizer: ResponseNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// With fallback provider
    #[must_use]
    pub fn with_fallback(mut self, fallback: FallbackProvider) -> Self {
        self.fallback = fallback;
        self
    }

    /// Name of the underlying model client
    #[must_use]
    pub fn model_name(&self) -> &'static str {
        self.model.name()
    }

    /// Outcome counters
    #[must_use]
    pub fn stats(&self) -> PipelineStatsSnapshot {
        self.stats.snapshot()
    }

    /// Check a query without calling the model
    ///
    /// # Errors
    /// `ExtractError::InvalidQuery` for names [`resolve`](Self::resolve) would reject
    pub fn validate<'a>(&self, entity_name: &'a str) -> Result<&'a str, ExtractError> {
        self.prompts.validate(entity_name)
    }

    /// Resolve an entity name to a record
    ///
    /// # Errors
    /// Only `ExtractError::InvalidQuery`; every later failure degrades to a
    /// fallback record
    pub async fn resolve(&self, entity_name: &str) -> Result<EntityRecord, ExtractError> {
        self.resolve_detailed(entity_name).await.map(|r| r.record)
    }

    /// Resolve and report how the record was produced
    ///
    /// # Errors
    /// Only `ExtractError::InvalidQuery`
    #[tracing::instrument(name = "pipeline.resolve", skip(self))]
    pub async fn resolve_detailed(&self, entity_name: &str) -> Result<Resolution, ExtractError> {
        let prompt = match self.prompts.build(entity_name) {
            Ok(prompt) => prompt,
            Err(e) => {
                self.stats.invalid_queries.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(error = %e, "query rejected");
                return Err(e);
            }
        };
        let entity = prompt.entity();
        let started = Instant::now();

        let resolution = match self.model.generate(prompt.as_str()).await {
            Err(e) => {
                tracing::warn!(
                    model = self.model.name(),
                    error = %e,
                    auth = e.is_auth(),
                    quota = e.is_quota(),
                    "model unavailable, using fallback"
                );
                Resolution {
                    record: self.fallback.synthesize(entity),
                    source: RecordSource::FallbackModelUnavailable,
                }
            }
            Ok(raw) => match self.normalizer.normalize(&raw) {
                Ok(record) => Resolution {
                    record,
                    source: RecordSource::Extracted,
                },
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        raw = %excerpt(&raw, LOG_EXCERPT_CHARS),
                        "malformed model response, using fallback"
                    );
                    Resolution {
                        record: self.fallback.synthesize(entity),
                        source: RecordSource::FallbackMalformed,
                    }
                }
            },
        };

        self.stats.record(resolution.source);
        tracing::info!(
            entity,
            source = %resolution.source,
            region = %resolution.record.location.region_code,
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "resolved"
        );
        Ok(resolution)
    }
}
