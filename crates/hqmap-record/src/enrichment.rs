//! Optional enrichment sequences
//!
//! These feed the side panels. Each entry is individually validated by the
//! normalizer, so a bad entry is dropped without affecting its siblings.

use crate::money::format_usd_compact;
use serde::Serialize;

/// Health risk classification for a commuter flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum RiskLevel {
    /// High risk
    High,
    /// Medium risk
    Medium,
    /// Low risk
    Low,
    /// Not stated or unrecognized
    #[default]
    Unknown,
}

impl RiskLevel {
    /// Parse leniently; unrecognized text maps to `Unknown`
    #[must_use]
    pub fn parse_lenient(text: &str) -> Self {
        match text.trim().to_ascii_lowercase().as_str() {
            "high" => Self::High,
            "medium" | "moderate" | "med" => Self::Medium,
            "low" => Self::Low,
            _ => Self::Unknown,
        }
    }
}

/// Commuter inflow from a neighboring area
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborFlow {
    /// Origin area name
    pub origin: String,
    /// Approximate number of commuters
    pub count: u64,
    /// Share of the workforce, 0..=100
    pub percent: f64,
    /// Risk classification
    pub risk_level: RiskLevel,
    /// Most relevant health concern
    pub top_concern: String,
}

/// Post sentiment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    /// Positive
    Positive,
    /// Negative
    Negative,
    /// Neutral or unrecognized
    #[default]
    Neutral,
}

impl Sentiment {
    /// Parse leniently; unrecognized text maps to `Neutral`
    #[must_use]
    pub fn parse_lenient(text: &str) -> Self {
        match text.trim().to_ascii_lowercase().as_str() {
            "positive" => Self::Positive,
            "negative" => Self::Negative,
            _ => Self::Neutral,
        }
    }
}

/// Post topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    /// Air quality
    Air,
    /// General wellbeing
    Happiness,
    /// Water quality
    Water,
    /// Anything else
    #[default]
    General,
}

impl Topic {
    /// Parse leniently; unrecognized text maps to `General`
    #[must_use]
    pub fn parse_lenient(text: &str) -> Self {
        match text.trim().to_ascii_lowercase().as_str() {
            "air" | "air quality" => Self::Air,
            "happiness" | "wellbeing" => Self::Happiness,
            "water" | "water quality" => Self::Water,
            _ => Self::General,
        }
    }
}

/// Simulated social-media post
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentSample {
    /// Stable identifier within the record
    pub id: u64,
    /// Handle of the author
    pub author: String,
    /// Post text
    pub content: String,
    /// Sentiment
    pub sentiment: Sentiment,
    /// Topic
    pub topic: Topic,
}

/// Rising search term
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchSignal {
    /// Search term
    pub term: String,
    /// Volume label, e.g. `"High"`
    pub volume: String,
    /// Growth label, e.g. `"+150%"`
    pub growth: String,
}

/// Headline cost/impact figures, all strictly positive
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactSummary {
    /// Health-related absenteeism cost per year (USD)
    pub estimated_annual_cost: f64,
    /// Average annual cost per employee (USD)
    pub cost_per_employee: f64,
    /// Savings with preventive care (USD)
    pub potential_savings: f64,
    /// Return multiple, e.g. `3.31`
    pub roi_multiple: f64,
}

impl ImpactSummary {
    /// Display text for the ROI multiple, e.g. `"3.31x"`
    #[must_use]
    pub fn roi_label(&self) -> String {
        format!("{:.2}x", self.roi_multiple)
    }

    /// Display text for the annual cost
    #[must_use]
    pub fn annual_cost_label(&self) -> String {
        format_usd_compact(self.estimated_annual_cost)
    }
}

/// One condition's share of the annual cost
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostItem {
    /// Condition name
    pub name: String,
    /// Annual cost in USD, strictly positive
    pub cost: f64,
    /// Display text for `cost`
    pub formatted_cost: String,
}

impl CostItem {
    /// Create item with generated display text
    #[must_use]
    pub fn new(name: impl Into<String>, cost: f64) -> Self {
        Self {
            name: name.into(),
            cost,
            formatted_cost: format_usd_compact(cost),
        }
    }
}
