//! Normalizer properties
//!
//! Every input either normalizes into a complete record or fails with
//! `MalformedResponse`; cost figures in a normalized record are never
//! zero or negative.

use hqmap_extract::{ExtractError, MalformedReason, ResponseNormalizer, RESPONSE_SCHEMA};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::{json, Value};

fn base() -> Value {
    json!({
        "name": "Acme",
        "location": {
            "city": "Austin",
            "region": "Travis County",
            "regionCode": "TX",
            "coordinates": { "lat": 30.27, "lng": -97.74 }
        },
        "scale": { "headcount": "12,000" },
        "summary": "Makes anvils."
    })
}

fn loose_number() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        Just(json!(0)),
        Just(json!("0")),
        Just(json!("N/A")),
        Just(json!(true)),
        Just(json!([])),
        (-1e9f64..1e9).prop_map(|v| json!(v)),
        (-1_000_000i64..1_000_000).prop_map(|v| json!(format!("${v}"))),
        (0u32..999).prop_map(|v| json!(format!("{v}.5M"))),
    ]
}

proptest! {
    #[test]
    fn prop_normalize_is_total(raw in ".{0,200}") {
        match ResponseNormalizer::new().normalize(&raw) {
            Ok(record) => prop_assert!(record.check().is_ok()),
            Err(ExtractError::MalformedResponse(_)) => {}
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }

    #[test]
    fn prop_costs_never_non_positive(
        breakdown in proptest::collection::vec(loose_number(), 0..6),
        annual in loose_number(),
        per_employee in loose_number(),
        savings in loose_number(),
        roi in loose_number(),
    ) {
        let mut value = base();
        value["costBreakdown"] = Value::Array(
            breakdown.into_iter().map(|cost| json!({ "name": "Condition", "cost": cost })).collect(),
        );
        value["impact"] = json!({
            "estimatedAnnualCost": annual,
            "costPerEmployee": per_employee,
            "potentialSavings": savings,
            "roiMultiple": roi,
        });

        let record = ResponseNormalizer::new().normalize(&value.to_string()).unwrap();
        for item in &record.cost_breakdown {
            prop_assert!(item.cost > 0.0);
            prop_assert!(!item.formatted_cost.is_empty());
        }
        let impact = record.impact.unwrap();
        for figure in [
            impact.estimated_annual_cost,
            impact.cost_per_employee,
            impact.potential_savings,
            impact.roi_multiple,
        ] {
            prop_assert!(figure > 0.0 && figure.is_finite());
        }
    }

    #[test]
    fn prop_missing_required_field_is_reported(index in 0usize..4) {
        let (key, expected) = [
            ("name", "missing:name"),
            ("location", "missing:location"),
            ("scale", "missing:scale"),
            ("summary", "missing:summary"),
        ][index];
        let mut value = base();
        value.as_object_mut().unwrap().remove(key);
        match ResponseNormalizer::new().normalize(&value.to_string()) {
            Err(ExtractError::MalformedResponse(reason)) => prop_assert_eq!(reason.to_string(), expected),
            other => prop_assert!(false, "expected malformed, got {other:?}"),
        }
    }
}

#[test]
fn fenced_complete_schema() {
    let raw = format!("```json\n{RESPONSE_SCHEMA}\n```");
    let record = ResponseNormalizer::new().normalize(&raw).unwrap();
    assert_eq!(record.name, "Company Name");
    assert_eq!(record.scale.revenue.as_deref(), Some("$10B"));
    assert_eq!(record.sentiment_samples[0].author, "@user123");
    assert_eq!(record.search_signals[0].growth, "+150%");
    assert_eq!(record.impact.unwrap().roi_multiple, 3.31);
}

#[test]
fn not_json_is_parse_failure() {
    assert_eq!(
        ResponseNormalizer::new().normalize("not json at all"),
        Err(ExtractError::MalformedResponse(MalformedReason::Parse))
    );
}

#[test]
fn serialized_record_uses_wire_names() {
    let record = ResponseNormalizer::new().normalize(RESPONSE_SCHEMA).unwrap();
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["neighborFlows"][0]["riskLevel"], "High");
    assert_eq!(json["costBreakdown"][0]["formattedCost"], "$3.6M");
    assert_eq!(json["impact"]["roiMultiple"], 3.31);
}
