//! Albers-USA composite projection
//!
//! Lower-48 conic equal-area (standard parallels 29.5°/45.5°) with Alaska
//! and Hawaii insets, each clipped to its own rectangle. Constants follow the
//! widely used d3 `geoAlbersUsa` layout; [`GeoProjector::us_map`] calibrates
//! it to the 959×593 map (scale 1300, translate 480/300).
//!
//! A point is unresolvable (`None`) when it lands outside every inset's clip
//! rectangle or outside the map's drawable extent.

use crate::map::{MapExtent, Point2, US_MAP};

const CLIP_EPSILON: f64 = 1e-6;

/// Raw conic equal-area projection for a pair of standard parallels
#[derive(Debug, Clone, Copy)]
struct ConicEqualArea {
    n: f64,
    c: f64,
    r0: f64,
}

impl ConicEqualArea {
    fn new(parallel0_deg: f64, parallel1_deg: f64) -> Self {
        let sy0 = parallel0_deg.to_radians().sin();
        let n = (sy0 + parallel1_deg.to_radians().sin()) / 2.0;
        let c = 1.0 + sy0 * (2.0 * n - sy0);
        Self {
            n,
            c,
            r0: c.sqrt() / n,
        }
    }

    /// Project radians to unit plane coordinates (y up)
    fn raw(&self, lambda: f64, phi: f64) -> Option<(f64, f64)> {
        let rr = self.c - 2.0 * self.n * phi.sin();
        if rr < 0.0 {
            return None;
        }
        let r = rr.sqrt() / self.n;
        let theta = lambda * self.n;
        Some((r * theta.sin(), self.r0 - r * theta.cos()))
    }
}

/// Axis-aligned clip rectangle in screen units
#[derive(Debug, Clone, Copy)]
struct ClipRect {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
}

impl ClipRect {
    fn contains(&self, p: Point2) -> bool {
        p.x >= self.x0 && p.x <= self.x1 && p.y >= self.y0 && p.y <= self.y1
    }
}

/// One projected region of the composite
#[derive(Debug, Clone, Copy)]
struct Inset {
    conic: ConicEqualArea,
    rotate_deg: f64,
    k: f64,
    tx: f64,
    ty: f64,
    cx: f64,
    cy: f64,
    clip: ClipRect,
}

impl Inset {
    fn new(
        parallels: (f64, f64),
        rotate_deg: f64,
        center_deg: (f64, f64),
        k: f64,
        translate: (f64, f64),
        clip: ClipRect,
    ) -> Self {
        let conic = ConicEqualArea::new(parallels.0, parallels.1);
        let (cx, cy) = conic
            .raw(center_deg.0.to_radians(), center_deg.1.to_radians())
            .unwrap_or((0.0, 0.0));
        Self {
            conic,
            rotate_deg,
            k,
            tx: translate.0,
            ty: translate.1,
            cx,
            cy,
            clip,
        }
    }

    fn project(&self, lat: f64, lng: f64) -> Option<Point2> {
        let lambda = wrap_degrees(lng + self.rotate_deg).to_radians();
        let (x, y) = self.conic.raw(lambda, lat.to_radians())?;
        let point = Point2::new(
            self.tx + self.k * (x - self.cx),
            self.ty - self.k * (y - self.cy),
        );
        (point.x.is_finite() && point.y.is_finite() && self.clip.contains(point)).then_some(point)
    }
}

fn wrap_degrees(lambda: f64) -> f64 {
    if lambda > 180.0 {
        lambda - 360.0
    } else if lambda < -180.0 {
        lambda + 360.0
    } else {
        lambda
    }
}

/// Albers-USA composite (lower 48, Alaska, Hawaii)
#[derive(Debug, Clone, Copy)]
pub struct AlbersUsa {
    lower48: Inset,
    alaska: Inset,
    hawaii: Inset,
}

impl AlbersUsa {
    /// Build the composite for a scale and translation
    #[must_use]
    pub fn new(scale: f64, translate: (f64, f64)) -> Self {
        let k = scale;
        let (x, y) = translate;

        let lower48 = Inset::new(
            (29.5, 45.5),
            96.0,
            (-0.6, 38.7),
            k,
            translate,
            ClipRect {
                x0: x - 0.455 * k,
                y0: y - 0.238 * k,
                x1: x + 0.455 * k,
                y1: y + 0.238 * k,
            },
        );

        let alaska = Inset::new(
            (55.0, 65.0),
            154.0,
            (-2.0, 58.5),
            k * 0.35,
            (x - 0.307 * k, y + 0.201 * k),
            ClipRect {
                x0: x - 0.425 * k + CLIP_EPSILON,
                y0: y + 0.120 * k + CLIP_EPSILON,
                x1: x - 0.214 * k - CLIP_EPSILON,
                y1: y + 0.234 * k - CLIP_EPSILON,
            },
        );

        let hawaii = Inset::new(
            (8.0, 18.0),
            157.0,
            (-3.0, 19.9),
            k,
            (x - 0.205 * k, y + 0.212 * k),
            ClipRect {
                x0: x - 0.214 * k + CLIP_EPSILON,
                y0: y + 0.166 * k + CLIP_EPSILON,
                x1: x - 0.115 * k - CLIP_EPSILON,
                y1: y + 0.234 * k - CLIP_EPSILON,
            },
        );

        Self {
            lower48,
            alaska,
            hawaii,
        }
    }

    /// Project degrees; lower 48 first, then Alaska, then Hawaii
    #[must_use]
    pub fn project(&self, lat: f64, lng: f64) -> Option<Point2> {
        if !lat.is_finite() || !lng.is_finite() {
            return None;
        }
        self.lower48
            .project(lat, lng)
            .or_else(|| self.alaska.project(lat, lng))
            .or_else(|| self.hawaii.project(lat, lng))
    }
}

/// Geographic coordinate → map point, bounded by the map extent
#[derive(Debug, Clone, Copy)]
pub struct GeoProjector {
    projection: AlbersUsa,
    extent: MapExtent,
}

impl GeoProjector {
    /// Scale calibrated to the 959×593 map
    pub const US_MAP_SCALE: f64 = 1300.0;
    /// Translation calibrated to the 959×593 map
    pub const US_MAP_TRANSLATE: (f64, f64) = (480.0, 300.0);

    /// Create projector for a custom calibration
    #[inline]
    #[must_use]
    pub fn new(projection: AlbersUsa, extent: MapExtent) -> Self {
        Self { projection, extent }
    }

    /// Projector for the United States map
    #[must_use]
    pub fn us_map() -> Self {
        Self::new(
            AlbersUsa::new(Self::US_MAP_SCALE, Self::US_MAP_TRANSLATE),
            US_MAP,
        )
    }

    /// Map extent this projector is bounded by
    #[inline]
    #[must_use]
    pub fn extent(&self) -> MapExtent {
        self.extent
    }

    /// Project a coordinate; `None` means unresolvable, not a fault
    #[must_use]
    pub fn project(&self, lat: f64, lng: f64) -> Option<Point2> {
        self.projection
            .project(lat, lng)
            .filter(|p| self.extent.contains(*p))
    }
}

impl Default for GeoProjector {
    fn default() -> Self {
        Self::us_map()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Point2, x: f64, y: f64) {
        assert!(
            (actual.x - x).abs() < 1e-6 && (actual.y - y).abs() < 1e-6,
            "expected ({x}, {y}), got {actual:?}"
        );
    }

    #[test]
    fn reference_layout_matches_default_calibration() {
        // scale 1070 / translate (480, 250) is the conventional default layout
        let albers = AlbersUsa::new(1070.0, (480.0, 250.0));
        let sf = albers.project(37.7749, -122.4194).unwrap();
        assert_close(sf, 107.426_899_831_795, 214.143_098_523_948_6);
    }

    #[test]
    fn projects_lower48() {
        let projector = GeoProjector::us_map();
        assert_close(
            projector.project(37.7749, -122.4194).unwrap(),
            27.341_093_253_582_756,
            256.435_540_262_741_3,
        );
        assert_close(
            projector.project(40.7128, -74.006).unwrap(),
            862.218_765_019_926_4,
            210.740_521_873_010_95,
        );
    }

    #[test]
    fn projects_insets() {
        let projector = GeoProjector::us_map();
        let anchorage = projector.project(61.2, -149.9).unwrap();
        assert_close(anchorage, 104.787_469_169_461_67, 539.421_841_061_888);
        let honolulu = projector.project(21.3, -157.85).unwrap();
        assert_close(honolulu, 259.636_104_855_029, 544.346_432_393_010_9);
    }

    #[test]
    fn outside_every_inset_is_none() {
        let projector = GeoProjector::us_map();
        assert!(projector.project(48.8, 2.3).is_none()); // Paris
        assert!(projector.project(35.6, 139.7).is_none()); // Tokyo
        assert!(projector.project(22.0, -100.0).is_none()); // central Mexico
        assert!(projector.project(90.0, 0.0).is_none());
        assert!(projector.project(-90.0, 0.0).is_none());
    }

    #[test]
    fn outside_map_extent_is_none() {
        // Inside the lower-48 clip rectangle but above the top edge of the map
        let albers = AlbersUsa::new(GeoProjector::US_MAP_SCALE, GeoProjector::US_MAP_TRANSLATE);
        let raw = albers.project(52.0, -100.0).unwrap();
        assert!(raw.y < 0.0);
        assert!(GeoProjector::us_map().project(52.0, -100.0).is_none());
    }

    #[test]
    fn non_finite_is_none() {
        let projector = GeoProjector::us_map();
        assert!(projector.project(f64::NAN, -100.0).is_none());
        assert!(projector.project(40.0, f64::INFINITY).is_none());
    }

    #[test]
    fn wrap_keeps_range() {
        assert_eq!(wrap_degrees(200.0), -160.0);
        assert_eq!(wrap_degrees(-190.0), 170.0);
        assert_eq!(wrap_degrees(45.0), 45.0);
    }
}
