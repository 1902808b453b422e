//! Focus resolution properties
//!
//! Totality, precedence and idempotence of `GeoFocusResolver` over
//! arbitrary codes and coordinates.

use hqmap_geo::{FocusBasis, FocusQuery, GeoFocusResolver, RegionTable, ViewportTransform};
use hqmap_record::{Coordinates, Location};
use proptest::prelude::*;

fn code_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("CA".to_string()),
        Just("tx".to_string()),
        Just("US-NY".to_string()),
        Just("Hawaii".to_string()),
        Just("ZZ".to_string()),
        Just(String::new()),
        "[A-Za-z -]{0,12}",
    ]
}

fn assert_in_range(transform: ViewportTransform) {
    assert!(transform.scale > 0.0 && transform.scale.is_finite());
    assert!((0.0..=1.0).contains(&transform.origin_x));
    assert!((0.0..=1.0).contains(&transform.origin_y));
    assert_eq!(transform.translate_x, 0.0);
    assert_eq!(transform.translate_y, 0.0);
}

proptest! {
    #[test]
    fn prop_resolve_is_total(
        code in code_strategy(),
        lat in -90.0f64..=90.0,
        lng in -180.0f64..=180.0,
        with_coordinates in any::<bool>(),
    ) {
        let resolver = GeoFocusResolver::new();
        let coordinates = Coordinates::new(lat, lng).unwrap();
        let query = FocusQuery {
            region_code: Some(code.as_str()),
            coordinates: with_coordinates.then_some(coordinates),
        };
        assert_in_range(resolver.resolve_query(query).transform);
    }

    #[test]
    fn prop_resolve_is_idempotent(
        code in code_strategy(),
        lat in -90.0f64..=90.0,
        lng in -180.0f64..=180.0,
    ) {
        let resolver = GeoFocusResolver::new();
        let location = Location::new("City", "Region", code, Coordinates::new(lat, lng).unwrap());
        let first = resolver.resolve(&location);
        let second = resolver.resolve(&location);
        prop_assert_eq!(first.scale.to_bits(), second.scale.to_bits());
        prop_assert_eq!(first.origin_x.to_bits(), second.origin_x.to_bits());
        prop_assert_eq!(first.origin_y.to_bits(), second.origin_y.to_bits());
        prop_assert_eq!(first.translate_x.to_bits(), second.translate_x.to_bits());
    }

    #[test]
    fn prop_known_code_ignores_coordinates(
        lat in -90.0f64..=90.0,
        lng in -180.0f64..=180.0,
    ) {
        let resolver = GeoFocusResolver::new();
        let table = RegionTable::shared();
        let anchor = table.lookup("WA").unwrap();
        let location = Location::new("Seattle", "King County", "WA", Coordinates::new(lat, lng).unwrap());
        let transform = resolver.resolve(&location);
        prop_assert_eq!(transform.scale, anchor.scale);
        prop_assert_eq!(transform.origin_x, anchor.x / 959.0);
        prop_assert_eq!(transform.origin_y, anchor.y / 593.0);
    }
}

#[test]
fn known_code_with_coordinates_uses_anchor() {
    let resolver = GeoFocusResolver::new();
    let location = Location::new(
        "San Francisco",
        "San Francisco County",
        "CA",
        Coordinates::new(37.7, -122.4).unwrap(),
    );
    let focus = resolver.resolve_query(FocusQuery::from(&location));
    assert_eq!(focus.basis, FocusBasis::Anchor("CA"));
    assert_eq!(focus.transform.scale, 1.8);
}

#[test]
fn unknown_code_off_map_is_identity() {
    let resolver = GeoFocusResolver::new();
    let location = Location::new("Paris", "Ile-de-France", "ZZ", Coordinates::new(48.8, 2.3).unwrap());
    assert_eq!(resolver.resolve(&location), ViewportTransform::IDENTITY);
}

#[test]
fn unknown_code_on_map_is_projected() {
    let resolver = GeoFocusResolver::new();
    let query = FocusQuery::code("ZZ").with_coordinates(Coordinates::new(37.7749, -122.4194).unwrap());
    let focus = resolver.resolve_query(query);
    assert_eq!(focus.basis, FocusBasis::Projected);
    assert!((focus.transform.origin_x - 27.341 / 959.0).abs() < 1e-4);
    assert!((focus.transform.origin_y - 256.436 / 593.0).abs() < 1e-4);
}

#[test]
fn inset_coordinates_project() {
    let resolver = GeoFocusResolver::new();
    let anchorage = resolver.resolve_query(FocusQuery::coordinates(Coordinates::new(61.2, -149.9).unwrap()));
    assert_eq!(anchorage.basis, FocusBasis::Projected);
    let honolulu = resolver.resolve_query(FocusQuery::coordinates(Coordinates::new(21.3, -157.85).unwrap()));
    assert_eq!(honolulu.basis, FocusBasis::Projected);
}
