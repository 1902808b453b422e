//! hqmap Geo
//!
//! Turns a record's location into a camera transform for the fixed 959×593
//! United States vector map.
//!
//! # Overview
//!
//! - [`RegionTable`]: curated per-state anchors, loaded once per process
//! - [`GeoProjector`]: Albers-USA composite projection calibrated to the map
//! - [`GeoFocusResolver`]: anchor first, projection second, identity last
//!
//! # Example
//!
//! ```rust
//! use hqmap_geo::{FocusQuery, GeoFocusResolver, ViewportTransform};
//!
//! let resolver = GeoFocusResolver::new();
//! let focus = resolver.resolve_query(FocusQuery::code("CA"));
//! assert_eq!(focus.transform.scale, 1.8);
//!
//! let unknown = resolver.resolve_query(FocusQuery::code("ZZ"));
//! assert_eq!(unknown.transform, ViewportTransform::IDENTITY);
//! ```

#![warn(missing_docs)]

pub mod focus;
pub mod map;
pub mod projection;
pub mod region_table;

// Re-exports
pub use focus::{Focus, FocusBasis, FocusPolicy, FocusQuery, GeoFocusResolver, ViewportTransform};
pub use map::{MapExtent, Point2, US_MAP};
pub use projection::{AlbersUsa, GeoProjector};
pub use region_table::{RegionAnchor, RegionTable};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for map focus
    pub use crate::{
        FocusPolicy, FocusQuery, GeoFocusResolver, GeoProjector, RegionAnchor, RegionTable,
        ViewportTransform,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
