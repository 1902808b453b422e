//! Curated region anchors
//!
//! Hand-tuned framing for each state on the 959×593 map. The table is built
//! once per process and never mutated; lookups are O(1) on the normalized code.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Viewport anchor for a known region
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegionAnchor {
    /// Normalized region code, e.g. `"CA"`
    pub code: &'static str,
    /// Horizontal focus point in map units
    pub x: f64,
    /// Vertical focus point in map units
    pub y: f64,
    /// Zoom scale applied when focused
    pub scale: f64,
}

const fn anchor(code: &'static str, x: f64, y: f64, scale: f64) -> RegionAnchor {
    RegionAnchor { code, x, y, scale }
}

const US_ANCHORS: [RegionAnchor; 51] = [
    // Northeast
    anchor("ME", 920.0, 50.0, 4.0),
    anchor("NH", 890.0, 90.0, 5.0),
    anchor("VT", 870.0, 80.0, 5.0),
    anchor("MA", 890.0, 110.0, 5.0),
    anchor("RI", 900.0, 125.0, 6.0),
    anchor("CT", 880.0, 130.0, 6.0),
    anchor("NY", 840.0, 100.0, 2.5),
    anchor("NJ", 860.0, 160.0, 5.0),
    anchor("PA", 810.0, 160.0, 3.0),
    // Mid-Atlantic
    anchor("DE", 840.0, 190.0, 6.0),
    anchor("MD", 820.0, 200.0, 5.0),
    anchor("DC", 815.0, 210.0, 7.0),
    anchor("VA", 800.0, 230.0, 2.5),
    anchor("WV", 770.0, 210.0, 3.5),
    // Southeast
    anchor("NC", 800.0, 270.0, 2.5),
    anchor("SC", 790.0, 310.0, 3.0),
    anchor("GA", 750.0, 340.0, 2.5),
    anchor("FL", 780.0, 450.0, 2.0),
    anchor("AL", 690.0, 350.0, 2.8),
    anchor("MS", 640.0, 350.0, 3.0),
    anchor("TN", 680.0, 290.0, 3.0),
    anchor("KY", 700.0, 240.0, 3.0),
    // Midwest
    anchor("OH", 740.0, 190.0, 3.0),
    anchor("IN", 690.0, 200.0, 3.2),
    anchor("IL", 640.0, 200.0, 2.5),
    anchor("MI", 700.0, 130.0, 2.5),
    anchor("WI", 620.0, 120.0, 2.8),
    anchor("MN", 550.0, 100.0, 2.2),
    anchor("IA", 570.0, 180.0, 3.0),
    anchor("MO", 580.0, 250.0, 2.5),
    anchor("ND", 450.0, 60.0, 2.5),
    anchor("SD", 450.0, 120.0, 2.5),
    anchor("NE", 450.0, 190.0, 2.2),
    anchor("KS", 480.0, 260.0, 2.2),
    // South
    anchor("AR", 590.0, 310.0, 3.0),
    anchor("LA", 600.0, 400.0, 2.8),
    anchor("OK", 500.0, 320.0, 2.5),
    anchor("TX", 450.0, 400.0, 1.5),
    // West
    anchor("MT", 280.0, 70.0, 2.0),
    anchor("ID", 200.0, 140.0, 2.2),
    anchor("WY", 300.0, 160.0, 2.2),
    anchor("CO", 340.0, 240.0, 2.2),
    anchor("NM", 320.0, 330.0, 2.0),
    anchor("AZ", 200.0, 330.0, 2.0),
    anchor("UT", 220.0, 230.0, 2.2),
    anchor("NV", 140.0, 200.0, 2.2),
    anchor("CA", 70.0, 250.0, 1.8),
    anchor("OR", 80.0, 120.0, 2.2),
    anchor("WA", 100.0, 50.0, 2.5),
    // Insets
    anchor("AK", 100.0, 450.0, 1.5),
    anchor("HI", 300.0, 500.0, 3.0),
];

const US_NAMES: [(&str, &str); 51] = [
    ("ALABAMA", "AL"),
    ("ALASKA", "AK"),
    ("ARIZONA", "AZ"),
    ("ARKANSAS", "AR"),
    ("CALIFORNIA", "CA"),
    ("COLORADO", "CO"),
    ("CONNECTICUT", "CT"),
    ("DELAWARE", "DE"),
    ("DISTRICT OF COLUMBIA", "DC"),
    ("FLORIDA", "FL"),
    ("GEORGIA", "GA"),
    ("HAWAII", "HI"),
    ("IDAHO", "ID"),
    ("ILLINOIS", "IL"),
    ("INDIANA", "IN"),
    ("IOWA", "IA"),
    ("KANSAS", "KS"),
    ("KENTUCKY", "KY"),
    ("LOUISIANA", "LA"),
    ("MAINE", "ME"),
    ("MARYLAND", "MD"),
    ("MASSACHUSETTS", "MA"),
    ("MICHIGAN", "MI"),
    ("MINNESOTA", "MN"),
    ("MISSISSIPPI", "MS"),
    ("MISSOURI", "MO"),
    ("MONTANA", "MT"),
    ("NEBRASKA", "NE"),
    ("NEVADA", "NV"),
    ("NEW HAMPSHIRE", "NH"),
    ("NEW JERSEY", "NJ"),
    ("NEW MEXICO", "NM"),
    ("NEW YORK", "NY"),
    ("NORTH CAROLINA", "NC"),
    ("NORTH DAKOTA", "ND"),
    ("OHIO", "OH"),
    ("OKLAHOMA", "OK"),
    ("OREGON", "OR"),
    ("PENNSYLVANIA", "PA"),
    ("RHODE ISLAND", "RI"),
    ("SOUTH CAROLINA", "SC"),
    ("SOUTH DAKOTA", "SD"),
    ("TENNESSEE", "TN"),
    ("TEXAS", "TX"),
    ("UTAH", "UT"),
    ("VERMONT", "VT"),
    ("VIRGINIA", "VA"),
    ("WASHINGTON", "WA"),
    ("WEST VIRGINIA", "WV"),
    ("WISCONSIN", "WI"),
    ("WYOMING", "WY"),
];

static US_TABLE: Lazy<Arc<RegionTable>> = Lazy::new(|| {
    let table = RegionTable::from_anchors(US_ANCHORS).with_aliases(US_NAMES);
    tracing::debug!(anchors = table.len(), "region table loaded");
    Arc::new(table)
});

/// Immutable lookup from region code to anchor
#[derive(Debug, Clone, Default)]
pub struct RegionTable {
    anchors: HashMap<&'static str, RegionAnchor>,
    aliases: HashMap<&'static str, &'static str>,
}

impl RegionTable {
    /// The process-wide United States table
    #[must_use]
    pub fn shared() -> Arc<RegionTable> {
        Arc::clone(&US_TABLE)
    }

    /// Build a table from anchors; later duplicates replace earlier ones
    ///
    /// Anchors with a non-finite position or scale are skipped.
    #[must_use]
    pub fn from_anchors(anchors: impl IntoIterator<Item = RegionAnchor>) -> Self {
        let anchors = anchors
            .into_iter()
            .filter(|a| {
                let usable = a.x.is_finite() && a.y.is_finite() && a.scale.is_finite();
                if !usable {
                    tracing::warn!(code = a.code, "skipping non-finite region anchor");
                }
                usable
            })
            .map(|a| (a.code, a))
            .collect();
        Self {
            anchors,
            aliases: HashMap::new(),
        }
    }

    /// With full-name aliases (`"CALIFORNIA"` → `"CA"`), keys in upper case
    #[must_use]
    pub fn with_aliases(
        mut self,
        aliases: impl IntoIterator<Item = (&'static str, &'static str)>,
    ) -> Self {
        self.aliases.extend(aliases);
        self
    }

    /// Lookup anchor by code or alias
    ///
    /// Matching ignores case and surrounding whitespace, strips a `US-`
    /// prefix and accepts full names registered as aliases.
    #[must_use]
    pub fn lookup(&self, code: &str) -> Option<&RegionAnchor> {
        let key = Self::normalize(code);
        if key.is_empty() {
            return None;
        }
        if let Some(anchor) = self.anchors.get(key.as_str()) {
            return Some(anchor);
        }
        self.aliases
            .get(key.as_str())
            .and_then(|canonical| self.anchors.get(canonical))
    }

    /// Whether a code resolves to an anchor
    #[inline]
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.lookup(code).is_some()
    }

    /// Number of anchors
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    /// Whether the table has no anchors
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Anchors sorted by code
    #[must_use]
    pub fn sorted(&self) -> Vec<RegionAnchor> {
        let mut all: Vec<_> = self.anchors.values().copied().collect();
        all.sort_by_key(|a| a.code);
        all
    }

    fn normalize(code: &str) -> String {
        let upper = code.trim().to_ascii_uppercase();
        let stripped = upper
            .strip_prefix("US-")
            .or_else(|| upper.strip_prefix("US "))
            .unwrap_or(upper.as_str());
        stripped.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}
