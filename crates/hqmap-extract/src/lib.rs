//! hqmap Extract
//!
//! Turns a free-text company name into a validated [`EntityRecord`] using an
//! external text model, and never lets an unchecked model shape past
//! [`ResponseNormalizer`].
//!
//! # Overview
//!
//! - [`PromptBuilder`]: input validation and the fixed-schema prompt
//! - [`ModelClient`]: the model boundary ([`GeminiClient`], [`UnconfiguredModel`])
//! - [`ResponseNormalizer`]: fence stripping, parsing, validation, coercion
//! - [`FallbackProvider`]: deterministic degraded records
//! - [`ExtractionPipeline`]: one model call per query, total past validation
//!
//! # Example
//!
//! ```rust
//! use hqmap_extract::ResponseNormalizer;
//!
//! let raw = r#"Here you go: {"name":"Acme","location":{"city":"Austin",
//!  "region":"Travis County","regionCode":"TX","coordinates":{"lat":30.27,"lng":-97.74}},
//!  "scale":{"headcount":"12,000"},"summary":"Anvils."}"#;
//! let record = ResponseNormalizer::new().normalize(raw).unwrap();
//! assert_eq!(record.location.region_code, "TX");
//! ```
//!
//! [`EntityRecord`]: hqmap_record::EntityRecord

#![warn(missing_docs)]

pub mod error;
pub mod fallback;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod prompt;

// Re-exports
pub use error::{ExtractError, MalformedReason, ModelError};
pub use fallback::FallbackProvider;
pub use model::{connect, GeminiClient, ModelClient, ModelConfig, UnconfiguredModel};
pub use normalize::{strip_fences, CostFloors, NormalizerConfig, ResponseNormalizer};
pub use pipeline::{ExtractionPipeline, PipelineStatsSnapshot, Resolution};
pub use prompt::{PromptBuilder, PromptText, RESPONSE_SCHEMA};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for extraction
    pub use crate::{
        ExtractError, ExtractionPipeline, FallbackProvider, ModelClient, ModelConfig, ModelError,
        PromptBuilder, ResponseNormalizer,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
