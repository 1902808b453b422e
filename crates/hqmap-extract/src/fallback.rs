//! Degraded records
//!
//! Used when the model is unreachable or its output fails validation, so a
//! caller past input validation always gets a complete record.

use hqmap_record::{Coordinates, EntityRecord, Location, Scale};

/// Summary carried by every degraded record
pub const DEGRADED_SUMMARY: &str =
    "Company details are unavailable right now; showing a placeholder location.";

/// Name used when `synthesize` is handed a blank name
pub const UNKNOWN_ENTITY: &str = "Unknown company";

/// Synthesizes placeholder records
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackProvider {
    placeholder: Location,
}

impl Default for FallbackProvider {
    fn default() -> Self {
        Self {
            placeholder: Location::new(
                "Unknown",
                "Unknown",
                "CA",
                Coordinates::clamped(37.7749, -122.4194),
            ),
        }
    }
}

impl FallbackProvider {
    /// Placeholder in San Francisco, region `CA`
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With custom placeholder location; a blank region code keeps the default
    #[must_use]
    pub fn with_placeholder(mut self, location: Location) -> Self {
        if location.region_code.trim().is_empty() {
            tracing::warn!("placeholder location without region code ignored");
        } else {
            self.placeholder = location;
        }
        self
    }

    /// Placeholder location
    #[inline]
    #[must_use]
    pub fn placeholder(&self) -> &Location {
        &self.placeholder
    }

    /// Build the degraded record for `entity_name`
    ///
    /// Deterministic; enrichment is always empty.
    #[must_use]
    pub fn synthesize(&self, entity_name: &str) -> EntityRecord {
        let name = match entity_name.trim() {
            "" => UNKNOWN_ENTITY,
            trimmed => trimmed,
        };
        EntityRecord::new(
            name,
            self.placeholder.clone(),
            Scale::new("Unknown"),
            DEGRADED_SUMMARY,
        )
    }
}
