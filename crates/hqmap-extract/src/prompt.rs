//! Extraction prompt
//!
//! The schema block is a single `const` so every prompt carries exactly the
//! shape [`ResponseNormalizer`](crate::ResponseNormalizer) validates.

use crate::error::ExtractError;
use std::fmt;

/// Output schema embedded verbatim in every prompt
pub const RESPONSE_SCHEMA: &str = r#"{
  "name": "Company Name",
  "location": {
    "city": "City",
    "region": "County or metro area",
    "regionCode": "2-letter state code",
    "coordinates": { "lat": 0.0, "lng": 0.0 }
  },
  "scale": { "headcount": "100,000", "industry": "Tech", "revenue": "$10B" },
  "summary": "One sentence summary.",
  "neighborFlows": [
    { "origin": "Neighbor County", "count": 5000, "percent": 15, "riskLevel": "High", "topConcern": "Hypertension" }
  ],
  "sentimentSamples": [
    { "id": 1, "author": "@user123", "content": "Air quality is rough today...", "sentiment": "negative", "topic": "air" }
  ],
  "searchSignals": [
    { "term": "Flu symptoms", "volume": "High", "growth": "+150%" }
  ],
  "impact": { "estimatedAnnualCost": 14200000, "costPerEmployee": 1420, "potentialSavings": 3976000, "roiMultiple": 3.31 },
  "costBreakdown": [
    { "name": "Depression", "cost": 3600000, "formattedCost": "$3.6M" }
  ]
}"#;

const INSTRUCTIONS: &str = "\
You are an expert business analyst and urban planner. Given a company name, return a JSON object with:
1. The official company name.
2. Headquarters location: city, county or metro area, 2-letter state code and coordinates.
3. Approximate number of US employees.
4. A one-sentence summary.
5. Neighbor flows: the top 3 neighboring counties people commute from, with approximate counts, percentages, a riskLevel (High/Medium/Low) and the top health concern.
6. Sentiment samples: 3-4 realistic local social media posts about health or environment (air quality, happiness, water quality, traffic stress) with mixed sentiment.
7. Search signals: the top 3 rising health-related search terms in the region.
8. Impact: estimated annual cost of health-related absenteeism for this company size, average cost per employee, potential savings from a mobile health unit and the ROI multiple.
9. Cost breakdown: the 5 most relevant health conditions for this location and industry with realistic annual costs.
Never return zero for any cost. Use national averages when local data is sparse.";

/// Default number of name characters placed into a prompt
pub const DEFAULT_MAX_NAME_CHARS: usize = 200;

/// A built prompt for one entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptText {
    entity: String,
    text: String,
}

impl PromptText {
    /// Entity name as it appears in the prompt
    #[inline]
    #[must_use]
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Full prompt text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for PromptText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Builds extraction prompts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptBuilder {
    max_name_chars: usize,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self {
            max_name_chars: DEFAULT_MAX_NAME_CHARS,
        }
    }
}

impl PromptBuilder {
    /// Create builder with default limits
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With the number of name characters kept in the prompt
    #[inline]
    #[must_use]
    pub fn with_max_name_chars(mut self, max: usize) -> Self {
        self.max_name_chars = max;
        self
    }

    /// Validate an entity name and return it trimmed
    ///
    /// # Errors
    /// `ExtractError::InvalidQuery` when nothing is left after trimming
    pub fn validate<'a>(&self, entity_name: &'a str) -> Result<&'a str, ExtractError> {
        let name = entity_name.trim();
        if name.is_empty() {
            return Err(ExtractError::InvalidQuery("entity name is empty".into()));
        }
        Ok(name)
    }

    /// Build the prompt for an entity
    ///
    /// Control characters become spaces, whitespace runs collapse and the
    /// name is clipped to the configured length before it enters the prompt.
    ///
    /// # Errors
    /// `ExtractError::InvalidQuery` when [`validate`](Self::validate) rejects the name
    pub fn build(&self, entity_name: &str) -> Result<PromptText, ExtractError> {
        let name = self.sanitize(self.validate(entity_name)?);
        let text = format!(
            "{INSTRUCTIONS}\n\nReturn ONLY valid JSON in exactly this format:\n{RESPONSE_SCHEMA}\n\nCompany: {name}\n"
        );
        tracing::debug!(entity = %name, prompt_chars = text.len(), "prompt built");
        Ok(PromptText { entity: name, text })
    }

    fn sanitize(&self, name: &str) -> String {
        let spaced: String = name
            .chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect();
        let collapsed = spaced.split_whitespace().collect::<Vec<_>>().join(" ");
        let clipped: String = collapsed.chars().take(self.max_name_chars.max(1)).collect();
        match clipped.trim_end() {
            "" => crate::fallback::UNKNOWN_ENTITY.to_string(),
            kept => kept.to_string(),
        }
    }
}
