//! hqmap Record Types
//!
//! The validated, immutable record that leaves the extraction pipeline.
//!
//! # Overview
//!
//! - [`EntityRecord`]: a company with its location, scale, summary and
//!   optional enrichment sequences
//! - [`Coordinates`]: latitude/longitude pair whose ranges are checked at
//!   construction
//! - [`RecordSource`]: whether a record came from model extraction or from
//!   the deterministic fallback
//! - [`money`]: parsing of loose currency text and compact display formatting
//!
//! # Example
//!
//! ```rust
//! use hqmap_record::{Coordinates, EntityRecord, Location, Scale};
//!
//! let location = Location::new(
//!     "Mountain View",
//!     "Santa Clara County",
//!     "CA",
//!     Coordinates::new(37.42, -122.08).unwrap(),
//! );
//! let record = EntityRecord::new("Google", location, Scale::new("180,000"), "Search company.");
//! assert!(record.check().is_ok());
//! ```

#![warn(missing_docs)]

pub mod enrichment;
pub mod money;
pub mod record;

// Re-exports
pub use enrichment::{
    CostItem, ImpactSummary, NeighborFlow, RiskLevel, SearchSignal, Sentiment, SentimentSample,
    Topic,
};
pub use record::{Coordinates, EntityRecord, Location, RecordError, RecordSource, Scale};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with records
    pub use crate::{
        Coordinates, CostItem, EntityRecord, ImpactSummary, Location, NeighborFlow, RecordSource,
        Scale, SearchSignal, SentimentSample,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
