//! Built-in CRS registry and transform.

use super::projection::{Ellipsoid, Projection};
use super::{Crs, GeoTransform, ProjectionError, EPSG_WGS84};
use crate::geometry::Point;
use std::collections::HashMap;

/// Central meridians of the EPSG:3571..=3576 north pole LAEA family.
const NORTH_POLE_LAEA: [(u32, f64); 6] = [
    (3571, 180.0),
    (3572, -150.0),
    (3573, -100.0),
    (3574, -40.0),
    (3575, 10.0),
    (3576, 90.0),
];

/// Self-contained [`GeoTransform`] over a registry of EPSG definitions.
///
/// The default registry contains:
///
/// | EPSG | Definition |
/// |------|------------|
/// | 4326 | WGS84 longitude/latitude |
/// | 3857 | spherical web mercator |
/// | 3571–3576 | north pole Lambert azimuthal equal-area (WGS84) |
/// | 3413 | NSIDC sea ice polar stereographic north |
/// | 3995 | arctic polar stereographic |
#[derive(Clone, Debug)]
pub struct BuiltinTransform {
    registry: HashMap<u32, Projection>,
}

impl Default for BuiltinTransform {
    fn default() -> Self {
        let mut registry = HashMap::new();
        registry.insert(EPSG_WGS84, Projection::Geographic);
        registry.insert(3857, Projection::WebMercator);
        for (code, lon0_deg) in NORTH_POLE_LAEA {
            registry.insert(
                code,
                Projection::PolarAzimuthalEqualArea {
                    ellipsoid: Ellipsoid::WGS84,
                    lon0_deg,
                },
            );
        }
        registry.insert(
            3413,
            Projection::PolarStereographic {
                ellipsoid: Ellipsoid::WGS84,
                lon0_deg: -45.0,
                lat_ts_deg: 70.0,
            },
        );
        registry.insert(
            3995,
            Projection::PolarStereographic {
                ellipsoid: Ellipsoid::WGS84,
                lon0_deg: 0.0,
                lat_ts_deg: 71.0,
            },
        );
        Self { registry }
    }
}

impl BuiltinTransform {
    /// Creates a transform with the default registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the projection used for an EPSG code.
    pub fn register(&mut self, code: u32, projection: Projection) {
        self.registry.insert(code, projection);
    }

    /// Returns the projection registered for `crs`.
    pub fn projection(&self, crs: &Crs) -> Result<&Projection, ProjectionError> {
        let code = crs.code().ok_or(ProjectionError::InvalidCrs)?;
        self.registry
            .get(&code)
            .ok_or(ProjectionError::UnsupportedCrs { code })
    }
}

impl GeoTransform for BuiltinTransform {
    fn transform_point(
        &self,
        point: Point,
        source: &Crs,
        target: &Crs,
    ) -> Result<Point, ProjectionError> {
        let from = self.projection(source)?;
        let to = self.projection(target)?;
        if source == target {
            return if point.is_finite() {
                Ok(point)
            } else {
                Err(ProjectionError::NonFinite)
            };
        }
        let lonlat = from.inverse(point)?;
        to.forward(lonlat)
    }

    fn is_valid(&self, crs: &Crs) -> bool {
        self.projection(crs).is_ok()
    }

    fn is_geographic(&self, crs: &Crs) -> bool {
        self.projection(crs)
            .map(Projection::is_geographic)
            .unwrap_or(false)
    }
}
