//! Viewport focus resolution
//!
//! [`GeoFocusResolver`] is total: every location yields a usable
//! [`ViewportTransform`]. Resolution order is fixed:
//!
//! 1. a curated [`RegionAnchor`](crate::RegionAnchor) for the region code
//! 2. the projected coordinate, when it lands on the map
//! 3. [`ViewportTransform::IDENTITY`]
//!
//! The resolver holds no mutable state, so identical inputs give
//! bit-identical transforms.

use crate::map::{MapExtent, Point2, US_MAP};
use crate::projection::GeoProjector;
use crate::region_table::RegionTable;
use hqmap_record::{Coordinates, Location};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Camera transform applied to the map surface
///
/// `scale > 0`; origins are fractions of the map extent in [0, 1];
/// `translate_y` is always 0 and `translate_x` is the policy's horizontal
/// offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportTransform {
    /// Zoom factor
    pub scale: f64,
    /// Horizontal translation in map units
    pub translate_x: f64,
    /// Vertical translation in map units
    pub translate_y: f64,
    /// Transform origin, fraction of width
    pub origin_x: f64,
    /// Transform origin, fraction of height
    pub origin_y: f64,
}

impl ViewportTransform {
    /// Whole-map view
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
        origin_x: 0.5,
        origin_y: 0.5,
    };

    /// Whether this is exactly the whole-map view
    #[inline]
    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// CSS `transform-origin` value, e.g. `"7.3% 42.16%"`
    #[must_use]
    pub fn transform_origin_css(&self) -> String {
        format!(
            "{}% {}%",
            round2(self.origin_x * 100.0),
            round2(self.origin_y * 100.0)
        )
    }
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Framing policy applied on top of anchors and projections
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusPolicy {
    /// Multiplier applied to every focused scale
    pub zoom_multiplier: f64,
    /// Horizontal translation, e.g. to clear a side panel
    pub horizontal_offset: f64,
    /// Scale used when focusing on a projected coordinate
    pub projected_scale: f64,
}

impl Default for FocusPolicy {
    fn default() -> Self {
        Self {
            zoom_multiplier: 1.0,
            horizontal_offset: 0.0,
            projected_scale: 2.0,
        }
    }
}

impl FocusPolicy {
    /// With zoom multiplier
    #[inline]
    #[must_use]
    pub fn with_zoom_multiplier(mut self, zoom: f64) -> Self {
        self.zoom_multiplier = zoom;
        self
    }

    /// With horizontal offset
    #[inline]
    #[must_use]
    pub fn with_horizontal_offset(mut self, offset: f64) -> Self {
        self.horizontal_offset = offset;
        self
    }

    /// With projected scale
    #[inline]
    #[must_use]
    pub fn with_projected_scale(mut self, scale: f64) -> Self {
        self.projected_scale = scale;
        self
    }

    /// Replace unusable values with defaults
    fn sanitized(self) -> Self {
        let defaults = Self::default();
        let positive = |v: f64, fallback: f64| if v.is_finite() && v > 0.0 { v } else { fallback };
        let sane = Self {
            zoom_multiplier: positive(self.zoom_multiplier, defaults.zoom_multiplier),
            horizontal_offset: if self.horizontal_offset.is_finite() {
                self.horizontal_offset
            } else {
                defaults.horizontal_offset
            },
            projected_scale: positive(self.projected_scale, defaults.projected_scale),
        };
        if sane != self {
            tracing::warn!(requested = ?self, using = ?sane, "focus policy adjusted");
        }
        sane
    }
}

/// What the resolver is asked to focus on
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FocusQuery<'a> {
    /// Region code or full region name
    pub region_code: Option<&'a str>,
    /// Geographic coordinate
    pub coordinates: Option<Coordinates>,
}

impl<'a> FocusQuery<'a> {
    /// Query by region code only
    #[inline]
    #[must_use]
    pub fn code(code: &'a str) -> Self {
        Self {
            region_code: Some(code),
            coordinates: None,
        }
    }

    /// Query by coordinate only
    #[inline]
    #[must_use]
    pub fn coordinates(coordinates: Coordinates) -> Self {
        Self {
            region_code: None,
            coordinates: Some(coordinates),
        }
    }

    /// With coordinate
    #[inline]
    #[must_use]
    pub fn with_coordinates(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = Some(coordinates);
        self
    }
}

impl<'a> From<&'a Location> for FocusQuery<'a> {
    fn from(location: &'a Location) -> Self {
        Self {
            region_code: Some(location.region_code.as_str()),
            coordinates: Some(location.coordinates),
        }
    }
}

/// Which rule produced a transform
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "code", rename_all = "snake_case")]
pub enum FocusBasis {
    /// Curated anchor for this code
    Anchor(&'static str),
    /// Projected coordinate
    Projected,
    /// Nothing resolvable
    Identity,
}

/// Transform together with how it was derived
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Focus {
    /// Camera transform
    pub transform: ViewportTransform,
    /// Resolution rule
    pub basis: FocusBasis,
}

/// Location → viewport transform
#[derive(Debug, Clone)]
pub struct GeoFocusResolver {
    table: Arc<RegionTable>,
    projector: GeoProjector,
    policy: FocusPolicy,
    extent: MapExtent,
}

impl Default for GeoFocusResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl GeoFocusResolver {
    /// Resolver over the shared United States table and map
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: RegionTable::shared(),
            projector: GeoProjector::us_map(),
            policy: FocusPolicy::default(),
            extent: US_MAP,
        }
    }

    /// With framing policy
    #[must_use]
    pub fn with_policy(mut self, policy: FocusPolicy) -> Self {
        self.policy = policy.sanitized();
        self
    }

    /// With custom region table
    #[must_use]
    pub fn with_table(mut self, table: Arc<RegionTable>) -> Self {
        self.table = table;
        self
    }

    /// With custom projector; the map extent follows the projector
    #[must_use]
    pub fn with_projector(mut self, projector: GeoProjector) -> Self {
        self.extent = projector.extent();
        self.projector = projector;
        self
    }

    /// Active policy
    #[inline]
    #[must_use]
    pub fn policy(&self) -> FocusPolicy {
        self.policy
    }

    /// Region table in use
    #[inline]
    #[must_use]
    pub fn table(&self) -> &Arc<RegionTable> {
        &self.table
    }

    /// Transform for a record location
    #[must_use]
    pub fn resolve(&self, location: &Location) -> ViewportTransform {
        self.resolve_query(FocusQuery::from(location)).transform
    }

    /// Transform and basis for an arbitrary query
    #[must_use]
    pub fn resolve_query(&self, query: FocusQuery<'_>) -> Focus {
        let anchored = query
            .region_code
            .and_then(|code| self.table.lookup(code))
            .and_then(|anchor| {
                self.framed(Point2::new(anchor.x, anchor.y), anchor.scale)
                    .map(|transform| (transform, anchor.code))
            });
        if let Some((transform, code)) = anchored {
            return Focus {
                transform,
                basis: FocusBasis::Anchor(code),
            };
        }

        let projected = query
            .coordinates
            .and_then(|c| self.projector.project(c.lat(), c.lng()))
            .and_then(|point| self.framed(point, self.policy.projected_scale));
        if let Some(transform) = projected {
            return Focus {
                transform,
                basis: FocusBasis::Projected,
            };
        }

        tracing::debug!(code = ?query.region_code, "location unresolvable, using whole map");
        Focus {
            transform: ViewportTransform::IDENTITY,
            basis: FocusBasis::Identity,
        }
    }

    /// `None` when the point has no finite position on the map
    fn framed(&self, point: Point2, scale: f64) -> Option<ViewportTransform> {
        let (origin_x, origin_y) = self.extent.relative(point);
        if !(origin_x.is_finite() && origin_y.is_finite()) {
            tracing::debug!(x = point.x, y = point.y, "focus point not on the map");
            return None;
        }
        let scale = scale * self.policy.zoom_multiplier;
        Some(ViewportTransform {
            scale: if scale.is_finite() && scale > 0.0 { scale } else { 1.0 },
            translate_x: self.policy.horizontal_offset,
            translate_y: 0.0,
            origin_x,
            origin_y,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region_table::RegionAnchor;
    use pretty_assertions::assert_eq;

    fn location(code: &str, lat: f64, lng: f64) -> Location {
        Location::new("City", "Region", code, Coordinates::new(lat, lng).unwrap())
    }

    #[test]
    fn anchor_wins_over_coordinates() {
        let resolver = GeoFocusResolver::new();
        // New York coordinates, California code
        let focus = resolver.resolve_query(FocusQuery::from(&location("CA", 40.71, -74.0)));
        assert_eq!(focus.basis, FocusBasis::Anchor("CA"));
        assert_eq!(focus.transform.scale, 1.8);
        assert_eq!(focus.transform.origin_x, 70.0 / 959.0);
        assert_eq!(focus.transform.origin_y, 250.0 / 593.0);
        assert_eq!(focus.transform.translate_x, 0.0);
    }

    #[test]
    fn projection_when_code_unknown() {
        let resolver = GeoFocusResolver::new();
        let focus = resolver.resolve_query(FocusQuery::from(&location("ZZ", 30.27, -97.74)));
        assert_eq!(focus.basis, FocusBasis::Projected);
        assert_eq!(focus.transform.scale, 2.0);
        assert!((focus.transform.origin_x - 456.48 / 959.0).abs() < 1e-3);
        assert!((focus.transform.origin_y - 492.39 / 593.0).abs() < 1e-3);
    }

    #[test]
    fn non_finite_anchor_falls_through() {
        let table = RegionTable::from_anchors([
            RegionAnchor { code: "CA", x: f64::NAN, y: 250.0, scale: 1.8 },
            RegionAnchor { code: "TX", x: 450.0, y: f64::INFINITY, scale: 1.5 },
        ]);
        let resolver = GeoFocusResolver::new().with_table(Arc::new(table));

        let focus = resolver.resolve_query(FocusQuery::from(&location("CA", 37.7749, -122.4194)));
        assert_eq!(focus.basis, FocusBasis::Projected);
        assert!((0.0..=1.0).contains(&focus.transform.origin_x));
        assert!((0.0..=1.0).contains(&focus.transform.origin_y));

        let focus = resolver.resolve_query(FocusQuery::code("TX"));
        assert_eq!(focus.basis, FocusBasis::Identity);
        assert!(focus.transform.is_identity());
    }

    #[test]
    fn identity_when_nothing_resolves() {
        let resolver = GeoFocusResolver::new();
        let transform = resolver.resolve(&location("ZZ", 48.8, 2.3));
        assert!(transform.is_identity());
        assert_eq!(resolver.resolve_query(FocusQuery::default()).basis, FocusBasis::Identity);
    }

    #[test]
    fn policy_applies_to_anchor() {
        let resolver = GeoFocusResolver::new().with_policy(
            FocusPolicy::default()
                .with_zoom_multiplier(2.0)
                .with_horizontal_offset(200.0),
        );
        let transform = resolver.resolve_query(FocusQuery::code("TX")).transform;
        assert_eq!(transform.scale, 3.0);
        assert_eq!(transform.translate_x, 200.0);
        assert_eq!(transform.translate_y, 0.0);
    }

    #[test]
    fn unusable_policy_is_sanitized() {
        let resolver = GeoFocusResolver::new().with_policy(FocusPolicy {
            zoom_multiplier: -1.0,
            horizontal_offset: f64::NAN,
            projected_scale: 0.0,
        });
        assert_eq!(resolver.policy(), FocusPolicy::default());
    }

    #[test]
    fn css_origin() {
        let transform = ViewportTransform {
            origin_x: 0.073,
            origin_y: 0.4216,
            ..ViewportTransform::IDENTITY
        };
        assert_eq!(transform.transform_origin_css(), "7.3% 42.16%");
        assert_eq!(ViewportTransform::IDENTITY.transform_origin_css(), "50% 50%");
    }

    #[test]
    fn transform_serializes_camel_case() {
        let json = serde_json::to_value(ViewportTransform::IDENTITY).unwrap();
        assert_eq!(json["translateX"], 0.0);
        assert_eq!(json["originY"], 0.5);
    }

    #[test]
    fn policy_deserializes_partial() {
        let policy: FocusPolicy = serde_json::from_str(r#"{"zoom_multiplier": 1.5}"#).unwrap();
        assert_eq!(policy.zoom_multiplier, 1.5);
        assert_eq!(policy.projected_scale, 2.0);
    }
}
