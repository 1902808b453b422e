//! Core record types
//!
//! [`EntityRecord`] is constructed once per query and never mutated. Every
//! required field is a plain owned value, so a record cannot exist with a
//! field missing; [`EntityRecord::check`] additionally enforces the textual
//! non-emptiness rules.

use crate::enrichment::{CostItem, ImpactSummary, NeighborFlow, SearchSignal, SentimentSample};
use serde::Serialize;
use std::fmt;

/// Record construction errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    /// Latitude or longitude outside its valid range (or not finite)
    #[error("{axis} out of range: {value}")]
    CoordinateOutOfRange {
        /// `"lat"` or `"lng"`
        axis: &'static str,
        /// Offending value
        value: f64,
    },

    /// Required text field is empty after trimming
    #[error("required field is empty: {0}")]
    EmptyField(&'static str),
}

/// Geographic coordinate in degrees
///
/// Latitude is always within [-90, 90] and longitude within [-180, 180].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    lat: f64,
    lng: f64,
}

impl Coordinates {
    /// Create checked coordinates
    ///
    /// # Errors
    /// `RecordError::CoordinateOutOfRange` for non-finite or out-of-range values
    pub fn new(lat: f64, lng: f64) -> Result<Self, RecordError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(RecordError::CoordinateOutOfRange { axis: "lat", value: lat });
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(RecordError::CoordinateOutOfRange { axis: "lng", value: lng });
        }
        Ok(Self { lat, lng })
    }

    /// Create coordinates, clamping into range; non-finite values become 0
    #[must_use]
    pub fn clamped(lat: f64, lng: f64) -> Self {
        let finite = |v: f64| if v.is_finite() { v } else { 0.0 };
        Self {
            lat: finite(lat).clamp(-90.0, 90.0),
            lng: finite(lng).clamp(-180.0, 180.0),
        }
    }

    /// Latitude in degrees
    #[inline]
    #[must_use]
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees
    #[inline]
    #[must_use]
    pub fn lng(&self) -> f64 {
        self.lng
    }
}

/// Headquarters location
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// City name
    pub city: String,
    /// County or metro area
    pub region: String,
    /// Short region code, e.g. `"CA"`
    pub region_code: String,
    /// Headquarters coordinate
    pub coordinates: Coordinates,
}

impl Location {
    /// Create new location
    #[must_use]
    pub fn new(
        city: impl Into<String>,
        region: impl Into<String>,
        region_code: impl Into<String>,
        coordinates: Coordinates,
    ) -> Self {
        Self {
            city: city.into(),
            region: region.into(),
            region_code: region_code.into(),
            coordinates,
        }
    }
}

/// Company size information
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scale {
    /// Approximate headcount as display text, e.g. `"150,000+"`
    pub headcount: String,
    /// Industry label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    /// Revenue as display text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue: Option<String>,
}

impl Scale {
    /// Create scale with headcount only
    #[inline]
    #[must_use]
    pub fn new(headcount: impl Into<String>) -> Self {
        Self {
            headcount: headcount.into(),
            industry: None,
            revenue: None,
        }
    }

    /// With industry
    #[inline]
    #[must_use]
    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(industry.into());
        self
    }

    /// With revenue
    #[inline]
    #[must_use]
    pub fn with_revenue(mut self, revenue: impl Into<String>) -> Self {
        self.revenue = Some(revenue.into());
        self
    }
}

/// Validated company record
///
/// Serializes in camelCase for the rendering boundary.
///
/// Fields are public for reading; outside this crate a record is built with
/// [`EntityRecord::new`]. [`EntityRecord::check`] is the validity contract:
/// records handed out by the extraction pipeline have passed it, and code that
/// edits fields afterwards must run it again before handing the record on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct EntityRecord {
    /// Official company name
    pub name: String,
    /// Headquarters location
    pub location: Location,
    /// Company size
    pub scale: Scale,
    /// One-sentence summary
    pub summary: String,
    /// Commuter inflow from neighboring areas
    pub neighbor_flows: Vec<NeighborFlow>,
    /// Simulated local social-media sentiment
    pub sentiment_samples: Vec<SentimentSample>,
    /// Rising health-related search terms
    pub search_signals: Vec<SearchSignal>,
    /// Headline cost/impact figures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact: Option<ImpactSummary>,
    /// Per-condition cost breakdown
    pub cost_breakdown: Vec<CostItem>,
}

impl EntityRecord {
    /// Create record with required fields and empty enrichment
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        location: Location,
        scale: Scale,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            location,
            scale,
            summary: summary.into(),
            neighbor_flows: Vec::new(),
            sentiment_samples: Vec::new(),
            search_signals: Vec::new(),
            impact: None,
            cost_breakdown: Vec::new(),
        }
    }

    /// Check the required-field contract
    ///
    /// # Errors
    /// `RecordError::EmptyField` naming the first empty required field
    pub fn check(&self) -> Result<(), RecordError> {
        let required = [
            ("name", self.name.as_str()),
            ("summary", self.summary.as_str()),
            ("location.regionCode", self.location.region_code.as_str()),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(RecordError::EmptyField(field));
            }
        }
        Ok(())
    }

    /// Whether any enrichment sequence carries data
    #[must_use]
    pub fn has_enrichment(&self) -> bool {
        !self.neighbor_flows.is_empty()
            || !self.sentiment_samples.is_empty()
            || !self.search_signals.is_empty()
            || !self.cost_breakdown.is_empty()
            || self.impact.is_some()
    }
}

/// Where a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    /// Normalized from model output
    Extracted,
    /// Synthesized because the model call failed
    FallbackModelUnavailable,
    /// Synthesized because the model output failed validation
    FallbackMalformed,
}

impl RecordSource {
    /// Whether the record is a degraded placeholder
    #[inline]
    #[must_use]
    pub fn is_degraded(self) -> bool {
        !matches!(self, Self::Extracted)
    }
}

impl fmt::Display for RecordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Extracted => "extracted",
            Self::FallbackModelUnavailable => "fallback (model unavailable)",
            Self::FallbackMalformed => "fallback (malformed response)",
        };
        f.write_str(label)
    }
}
