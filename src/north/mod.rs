//! Grid-to-true north convergence.
//!
//! The convergence angle at a point is found numerically: the extent center
//! is taken to geographic coordinates, nudged north by a small latitude step,
//! and brought back into the map CRS. The direction from the center to the
//! nudged point is true north as seen on the map grid.

use crate::geo::{Crs, Extent, GeoTransform, ProjectionError};
use crate::geometry::Point;
use crate::trace::{trace_event, trace_span};
use crate::util::{NorthFitError, NorthFitResult};

/// Default latitude step in degrees.
///
/// Small enough that the grid direction is locally straight, large enough
/// that the projected displacement stays well above round-off for metre-based
/// CRSs (roughly 111 m on the ground).
pub const DEFAULT_STEP_DEG: f64 = 1e-3;

/// Latitudes this close to ±90 are treated as the pole itself.
const POLE_EPS_DEG: f64 = 1e-9;

/// Computes the angle between grid north and true north.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TrueNorthCalculator {
    step_deg: f64,
}

impl Default for TrueNorthCalculator {
    fn default() -> Self {
        Self {
            step_deg: DEFAULT_STEP_DEG,
        }
    }
}

impl TrueNorthCalculator {
    /// Creates a calculator with the default latitude step.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a calculator with a custom latitude step in degrees.
    pub fn with_step_deg(step_deg: f64) -> NorthFitResult<Self> {
        if !step_deg.is_finite() || step_deg <= 0.0 || step_deg >= 1.0 {
            return Err(NorthFitError::InvalidInput(
                "latitude step must be finite and in (0, 1) degrees",
            ));
        }
        Ok(Self { step_deg })
    }

    /// Latitude step in degrees.
    pub fn step_deg(&self) -> f64 {
        self.step_deg
    }

    /// Clockwise angle in degrees from grid up to true north at the center
    /// of `extent`.
    ///
    /// The result lies in `(-180, 180]`. Geographic CRSs yield 0. Near the
    /// pole, where stepping north would cross 90°, the step is taken south
    /// and the direction reversed. A center on the pole has no north and
    /// yields [`ProjectionError::DegenerateDirection`].
    pub fn convergence_angle(
        &self,
        extent: &Extent,
        crs: &Crs,
        geo: &dyn GeoTransform,
    ) -> Result<f64, ProjectionError> {
        let _span = trace_span!("convergence_angle").entered();
        if !crs.is_set() {
            return Err(ProjectionError::InvalidCrs);
        }
        if !extent.is_finite() {
            return Err(ProjectionError::NonFinite);
        }
        let center = extent.center();
        let lonlat = geo.transform_point(center, crs, &Crs::WGS84)?;
        if 90.0 - lonlat.y.abs() <= POLE_EPS_DEG {
            return Err(ProjectionError::DegenerateDirection {
                x: center.x,
                y: center.y,
            });
        }

        let southward = lonlat.y + self.step_deg > 90.0;
        let step = if southward {
            -self.step_deg
        } else {
            self.step_deg
        };
        let nudged = Point::new(lonlat.x, lonlat.y + step);
        let north = geo.transform_point(nudged, &Crs::WGS84, crs)?;

        let (mut dx, mut dy) = (north.x - center.x, north.y - center.y);
        if southward {
            dx = -dx;
            dy = -dy;
        }
        if !(dx.is_finite() && dy.is_finite()) {
            return Err(ProjectionError::NonFinite);
        }
        if dx == 0.0 && dy == 0.0 {
            return Err(ProjectionError::DegenerateDirection {
                x: center.x,
                y: center.y,
            });
        }
        let angle = dx.atan2(dy).to_degrees();
        trace_event!("convergence", lon = lonlat.x, lat = lonlat.y, angle = angle);
        Ok(angle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::BuiltinTransform;

    /// Transform that maps every point to the same place.
    struct Collapse;

    impl GeoTransform for Collapse {
        fn transform_point(&self, _: Point, _: &Crs, _: &Crs) -> Result<Point, ProjectionError> {
            Ok(Point::new(1.0, 1.0))
        }

        fn is_valid(&self, _: &Crs) -> bool {
            true
        }

        fn is_geographic(&self, _: &Crs) -> bool {
            false
        }
    }

    #[test]
    fn geographic_crs_has_no_convergence() {
        let calc = TrueNorthCalculator::new();
        let extent = Extent::new(10.0, 40.0, 20.0, 50.0);
        let angle = calc
            .convergence_angle(&extent, &Crs::WGS84, &BuiltinTransform::new())
            .unwrap();
        assert!(angle.abs() < 1e-9);
    }

    #[test]
    fn web_mercator_has_no_convergence() {
        let calc = TrueNorthCalculator::new();
        let extent = Extent::new(1.0e6, 5.0e6, 2.0e6, 6.0e6);
        let angle = calc
            .convergence_angle(&extent, &Crs::epsg(3857), &BuiltinTransform::new())
            .unwrap();
        assert!(angle.abs() < 1e-6);
    }

    #[test]
    fn polar_laea_convergence_is_longitude_offset() {
        // For a north polar azimuthal projection the convergence equals the
        // negated longitude offset from the central meridian.
        let geo = BuiltinTransform::new();
        let crs = Crs::epsg(3575);
        let p = geo
            .transform_point(Point::new(40.0, 70.0), &Crs::WGS84, &crs)
            .unwrap();
        let extent = Extent::new(p.x - 1000.0, p.y - 1000.0, p.x + 1000.0, p.y + 1000.0);
        let angle = TrueNorthCalculator::new()
            .convergence_angle(&extent, &crs, &geo)
            .unwrap();
        assert!((angle + 30.0).abs() < 1e-3, "angle {angle}");
    }

    #[test]
    fn steps_south_at_the_pole_edge() {
        let geo = BuiltinTransform::new();
        let crs = Crs::epsg(3575);
        let p = geo
            .transform_point(Point::new(-20.0, 89.9995), &Crs::WGS84, &crs)
            .unwrap();
        let extent = Extent::new(p.x, p.y, p.x, p.y);
        let angle = TrueNorthCalculator::new()
            .convergence_angle(&extent, &crs, &geo)
            .unwrap();
        assert!((angle - 30.0).abs() < 1e-3, "angle {angle}");
    }

    #[test]
    fn pole_center_has_no_direction() {
        let geo = BuiltinTransform::new();
        let calc = TrueNorthCalculator::new();
        for code in [3575, 3413] {
            let extent = Extent::new(-1000.0, -1000.0, 1000.0, 1000.0);
            assert_eq!(
                calc.convergence_angle(&extent, &Crs::epsg(code), &geo),
                Err(ProjectionError::DegenerateDirection { x: 0.0, y: 0.0 }),
                "EPSG:{code}"
            );
        }
    }

    #[test]
    fn invalid_crs_is_an_error() {
        let calc = TrueNorthCalculator::new();
        let geo = BuiltinTransform::new();
        let extent = Extent::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(
            calc.convergence_angle(&extent, &Crs::INVALID, &geo),
            Err(ProjectionError::InvalidCrs)
        );
        assert_eq!(
            calc.convergence_angle(&extent, &Crs::epsg(2056), &geo),
            Err(ProjectionError::UnsupportedCrs { code: 2056 })
        );
    }

    #[test]
    fn collapsed_direction_is_an_error() {
        let extent = Extent::new(0.0, 0.0, 2.0, 2.0);
        let err = TrueNorthCalculator::new()
            .convergence_angle(&extent, &Crs::epsg(1), &Collapse)
            .unwrap_err();
        assert_eq!(err, ProjectionError::DegenerateDirection { x: 1.0, y: 1.0 });
    }

    #[test]
    fn step_must_be_positive() {
        assert!(TrueNorthCalculator::with_step_deg(0.0).is_err());
        assert!(TrueNorthCalculator::with_step_deg(f64::NAN).is_err());
        assert_eq!(
            TrueNorthCalculator::with_step_deg(1e-4).unwrap().step_deg(),
            1e-4
        );
    }
}
