//! Response normalization
//!
//! The only place raw model text becomes typed data. Processing order:
//!
//! 1. strip a surrounding code fence (with or without a language tag)
//! 2. parse JSON; on failure retry on the first balanced `{...}` in the text
//! 3. validate required fields, failing with `missing:`/`invalid:` paths
//! 4. fill or coerce optional fields, dropping individual bad entries
//! 5. replace zero/negative cost figures with configured floors
//!
//! Steps 4 and 5 never fail the record.

use crate::error::{ExtractError, MalformedReason};
use hqmap_record::money::{format_usd_compact, parse_amount};
use hqmap_record::{
    Coordinates, CostItem, EntityRecord, ImpactSummary, Location, NeighborFlow, RecordError,
    RiskLevel, Scale, SearchSignal, Sentiment, SentimentSample, Topic,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

type Object = Map<String, Value>;

const FENCE: &str = "```";

/// Replacement values for cost figures that come back zero or negative
///
/// Every floor must be strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostFloors {
    /// Per-condition cost in the breakdown
    pub breakdown_cost: f64,
    /// `impact.estimatedAnnualCost`
    pub annual_cost: f64,
    /// `impact.costPerEmployee`
    pub cost_per_employee: f64,
    /// `impact.potentialSavings`
    pub potential_savings: f64,
    /// `impact.roiMultiple`
    pub roi_multiple: f64,
}

impl Default for CostFloors {
    fn default() -> Self {
        Self {
            breakdown_cost: 100_000.0,
            annual_cost: 100_000.0,
            cost_per_employee: 100.0,
            potential_savings: 10_000.0,
            roi_multiple: 1.0,
        }
    }
}

impl CostFloors {
    /// Name of the first floor that is not a positive finite number
    #[must_use]
    pub fn first_invalid(&self) -> Option<&'static str> {
        [
            ("breakdown_cost", self.breakdown_cost),
            ("annual_cost", self.annual_cost),
            ("cost_per_employee", self.cost_per_employee),
            ("potential_savings", self.potential_savings),
            ("roi_multiple", self.roi_multiple),
        ]
        .into_iter()
        .find(|(_, v)| !is_positive(*v))
        .map(|(name, _)| name)
    }

    fn sanitized(self) -> Self {
        let defaults = Self::default();
        let pick = |v: f64, d: f64| if is_positive(v) { v } else { d };
        let sane = Self {
            breakdown_cost: pick(self.breakdown_cost, defaults.breakdown_cost),
            annual_cost: pick(self.annual_cost, defaults.annual_cost),
            cost_per_employee: pick(self.cost_per_employee, defaults.cost_per_employee),
            potential_savings: pick(self.potential_savings, defaults.potential_savings),
            roi_multiple: pick(self.roi_multiple, defaults.roi_multiple),
        };
        if sane != self {
            tracing::warn!(requested = ?self, using = ?sane, "cost floors adjusted");
        }
        sane
    }
}

/// Normalizer configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Cost floors
    pub floors: CostFloors,
}

/// Raw model text → validated [`EntityRecord`]
#[derive(Debug, Clone, Default)]
pub struct ResponseNormalizer {
    floors: CostFloors,
}

impl ResponseNormalizer {
    /// Create normalizer with default floors
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create normalizer from configuration
    #[must_use]
    pub fn from_config(config: NormalizerConfig) -> Self {
        Self::new().with_floors(config.floors)
    }

    /// With cost floors; non-positive floors fall back to defaults
    #[must_use]
    pub fn with_floors(mut self, floors: CostFloors) -> Self {
        self.floors = floors.sanitized();
        self
    }

    /// Active floors
    #[inline]
    #[must_use]
    pub fn floors(&self) -> CostFloors {
        self.floors
    }

    /// Normalize raw model output
    ///
    /// # Errors
    /// `ExtractError::MalformedResponse` when the text is not JSON, is not an
    /// object, or lacks a required field
    pub fn normalize(&self, raw: &str) -> Result<EntityRecord, ExtractError> {
        let root = parse_document(raw)?;
        let obj = root
            .as_object()
            .ok_or(ExtractError::MalformedResponse(MalformedReason::NotObject))?;

        let name = required_text(obj, "name", "name")?;
        let location = location(obj)?;
        let scale = scale(obj)?;
        let summary = required_text(obj, "summary", "summary")?;

        let mut record = EntityRecord::new(name, location, scale, summary);
        record.neighbor_flows = entries(obj, "neighborFlows", neighbor_flow);
        record.sentiment_samples = entries(obj, "sentimentSamples", sentiment_sample);
        record.search_signals = entries(obj, "searchSignals", search_signal);
        record.cost_breakdown = entries(obj, "costBreakdown", |_, e| self.cost_item(e));
        record.impact = self.impact(obj);

        record.check().map_err(from_record_error)?;
        Ok(record)
    }

    fn cost_item(&self, entry: &Object) -> Option<CostItem> {
        let name = field(entry, "name").and_then(text)?;
        let (cost, floored) = match field(entry, "cost").and_then(number).filter(|c| *c > 0.0) {
            Some(cost) => (cost, false),
            None => (self.floors.breakdown_cost, true),
        };
        let formatted_cost = if floored {
            None
        } else {
            field(entry, "formattedCost").and_then(text)
        }
        .unwrap_or_else(|| format_usd_compact(cost));
        Some(CostItem {
            name,
            cost,
            formatted_cost,
        })
    }

    fn impact(&self, obj: &Object) -> Option<ImpactSummary> {
        let value = field(obj, "impact")?;
        let Some(figures) = value.as_object() else {
            tracing::debug!(field = "impact", "expected object, dropping");
            return None;
        };
        let figure = |key: &str, floor: f64| {
            field(figures, key)
                .and_then(number)
                .filter(|v| *v > 0.0)
                .unwrap_or(floor)
        };
        Some(ImpactSummary {
            estimated_annual_cost: figure("estimatedAnnualCost", self.floors.annual_cost),
            cost_per_employee: figure("costPerEmployee", self.floors.cost_per_employee),
            potential_savings: figure("potentialSavings", self.floors.potential_savings),
            roi_multiple: figure("roiMultiple", self.floors.roi_multiple),
        })
    }
}

/// Remove a surrounding code fence, tagged (```` ```json ````) or not
#[must_use]
pub fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix(FENCE) {
        let tag_len = rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(rest.len());
        text = &rest[tag_len..];
    }
    if let Some(rest) = text.strip_suffix(FENCE) {
        text = rest;
    }
    text.trim()
}

/// Balanced `{...}` candidates in `text`, in order of their opening brace
fn object_candidates(text: &str) -> impl Iterator<Item = &str> {
    text.match_indices('{')
        .filter_map(move |(start, _)| balanced_object(text, start))
}

/// Balanced `{...}` opening at byte `start`, ignoring braces inside strings
fn balanced_object(text: &str, start: usize) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_document(raw: &str) -> Result<Value, ExtractError> {
    let body = strip_fences(raw);
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return Ok(value);
    }
    object_candidates(body)
        .find_map(|candidate| serde_json::from_str(candidate).ok())
        .ok_or(ExtractError::MalformedResponse(MalformedReason::Parse))
}

/// Shortened copy of `raw` for log lines
pub(crate) fn excerpt(raw: &str, max_chars: usize) -> String {
    let mut out: String = raw.chars().take(max_chars).collect();
    if raw.chars().nth(max_chars).is_some() {
        out.push('…');
    }
    out
}

fn missing(path: impl Into<String>) -> ExtractError {
    ExtractError::MalformedResponse(MalformedReason::Missing(path.into()))
}

fn invalid(path: impl Into<String>) -> ExtractError {
    ExtractError::MalformedResponse(MalformedReason::Invalid(path.into()))
}

fn from_record_error(error: RecordError) -> ExtractError {
    match error {
        RecordError::CoordinateOutOfRange { axis, .. } => {
            invalid(format!("location.coordinates.{axis}"))
        }
        RecordError::EmptyField(path) => missing(path),
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Present and not `null`
fn field<'a>(obj: &'a Object, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

/// Non-blank string (trimmed) or number rendered as text
fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Finite number, or numeric-looking string
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_amount(s),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

fn required_text(obj: &Object, key: &str, path: &str) -> Result<String, ExtractError> {
    let value = field(obj, key).ok_or_else(|| missing(path))?;
    match value {
        Value::String(s) if s.trim().is_empty() => Err(missing(path)),
        _ => text(value).ok_or_else(|| invalid(path)),
    }
}

fn required_number(obj: &Object, key: &str, path: &str) -> Result<f64, ExtractError> {
    number(field(obj, key).ok_or_else(|| missing(path))?).ok_or_else(|| invalid(path))
}

fn required_object<'a>(obj: &'a Object, key: &str, path: &str) -> Result<&'a Object, ExtractError> {
    field(obj, key)
        .ok_or_else(|| missing(path))?
        .as_object()
        .ok_or_else(|| invalid(path))
}

fn location(obj: &Object) -> Result<Location, ExtractError> {
    let loc = required_object(obj, "location", "location")?;
    let city = required_text(loc, "city", "location.city")?;
    let region = required_text(loc, "region", "location.region")?;
    let region_code = required_text(loc, "regionCode", "location.regionCode")?;

    let coords = required_object(loc, "coordinates", "location.coordinates")?;
    let lat = required_number(coords, "lat", "location.coordinates.lat")?;
    let lng = required_number(coords, "lng", "location.coordinates.lng")?;
    let coordinates = Coordinates::new(lat, lng).map_err(from_record_error)?;

    Ok(Location::new(city, region, region_code, coordinates))
}

fn scale(obj: &Object) -> Result<Scale, ExtractError> {
    let scale_obj = required_object(obj, "scale", "scale")?;
    let headcount = required_text(scale_obj, "headcount", "scale.headcount")?;
    Ok(Scale {
        headcount,
        industry: field(scale_obj, "industry").and_then(text),
        revenue: field(scale_obj, "revenue").and_then(text),
    })
}

/// Collect an optional array, dropping entries `build` rejects
fn entries<T>(obj: &Object, key: &str, mut build: impl FnMut(usize, &Object) -> Option<T>) -> Vec<T> {
    let Some(value) = field(obj, key) else {
        return Vec::new();
    };
    let Some(items) = value.as_array() else {
        tracing::debug!(field = key, "expected array, using empty");
        return Vec::new();
    };

    let mut kept = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match item.as_object().and_then(|entry| build(index, entry)) {
            Some(built) => kept.push(built),
            None => tracing::debug!(field = key, index, "dropped entry"),
        }
    }
    kept
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn neighbor_flow(_index: usize, entry: &Object) -> Option<NeighborFlow> {
    let origin = field(entry, "origin").and_then(text)?;
    let count = field(entry, "count").and_then(number).filter(|c| *c >= 0.0)?;
    let percent = match field(entry, "percent") {
        None => 0.0,
        Some(value) => number(value).filter(|p| (0.0..=100.0).contains(p))?,
    };
    Some(NeighborFlow {
        origin,
        count: count.round() as u64,
        percent,
        risk_level: field(entry, "riskLevel")
            .and_then(text)
            .map_or(RiskLevel::Unknown, |t| RiskLevel::parse_lenient(&t)),
        top_concern: field(entry, "topConcern").and_then(text).unwrap_or_default(),
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn sentiment_sample(index: usize, entry: &Object) -> Option<SentimentSample> {
    let content = field(entry, "content").and_then(text)?;
    let id = field(entry, "id")
        .and_then(number)
        .filter(|v| *v >= 0.0 && v.fract() == 0.0 && *v <= 9_007_199_254_740_992.0)
        .map_or(index as u64 + 1, |v| v as u64);
    Some(SentimentSample {
        id,
        author: field(entry, "author").and_then(text).unwrap_or_default(),
        content,
        sentiment: field(entry, "sentiment")
            .and_then(text)
            .map_or(Sentiment::Neutral, |t| Sentiment::parse_lenient(&t)),
        topic: field(entry, "topic")
            .and_then(text)
            .map_or(Topic::General, |t| Topic::parse_lenient(&t)),
    })
}

fn search_signal(_index: usize, entry: &Object) -> Option<SearchSignal> {
    Some(SearchSignal {
        term: field(entry, "term").and_then(text)?,
        volume: field(entry, "volume").and_then(text).unwrap_or_default(),
        growth: field(entry, "growth").and_then(text).unwrap_or_default(),
    })
}
