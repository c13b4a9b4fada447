//! Forward and inverse map projections on an ellipsoid.
//!
//! Formulas follow the standard ellipsoidal forms for the Lambert azimuthal
//! equal-area and stereographic projections in their north polar aspect.
//! Longitude and latitude are in degrees; projected coordinates in metres.

use super::ProjectionError;
use crate::geometry::Point;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

/// Latitude limit of the square web mercator world.
const WEB_MERCATOR_MAX_LAT_DEG: f64 = 85.051_128_779_806_59;

/// Fixed-point iterations for the stereographic inverse.
const STEREO_MAX_ITER: usize = 16;
const STEREO_TOL: f64 = 1e-14;

/// Reference ellipsoid.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis in metres.
    pub a: f64,
    /// Inverse flattening (`0.0` for a sphere).
    pub inv_f: f64,
}

impl Ellipsoid {
    /// WGS84.
    pub const WGS84: Ellipsoid = Ellipsoid {
        a: 6_378_137.0,
        inv_f: 298.257_223_563,
    };

    /// First eccentricity.
    pub fn eccentricity(&self) -> f64 {
        if self.inv_f == 0.0 {
            return 0.0;
        }
        let f = 1.0 / self.inv_f;
        (f * (2.0 - f)).sqrt()
    }
}

/// A projection between geographic coordinates and a planar CRS.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Projection {
    /// Longitude/latitude in degrees; the identity map.
    Geographic,
    /// Spherical (pseudo) mercator as used by web maps.
    WebMercator,
    /// North polar Lambert azimuthal equal-area.
    PolarAzimuthalEqualArea {
        ellipsoid: Ellipsoid,
        lon0_deg: f64,
    },
    /// North polar stereographic with a latitude of true scale.
    PolarStereographic {
        ellipsoid: Ellipsoid,
        lon0_deg: f64,
        lat_ts_deg: f64,
    },
}

impl Projection {
    /// Returns true for the geographic identity projection.
    pub fn is_geographic(&self) -> bool {
        matches!(self, Self::Geographic)
    }

    /// Projects geographic `(lon, lat)` to planar coordinates.
    pub fn forward(&self, lonlat: Point) -> Result<Point, ProjectionError> {
        if !lonlat.is_finite() {
            return Err(ProjectionError::NonFinite);
        }
        if lonlat.y.abs() > 90.0 {
            return Err(out_of_domain(lonlat));
        }
        let projected = match *self {
            Self::Geographic => lonlat,
            Self::WebMercator => {
                if lonlat.y.abs() > WEB_MERCATOR_MAX_LAT_DEG {
                    return Err(out_of_domain(lonlat));
                }
                let a = Ellipsoid::WGS84.a;
                let phi = lonlat.y.to_radians();
                Point::new(
                    a * lonlat.x.to_radians(),
                    a * (FRAC_PI_4 + phi * 0.5).tan().ln(),
                )
            }
            Self::PolarAzimuthalEqualArea {
                ellipsoid,
                lon0_deg,
            } => {
                let e = ellipsoid.eccentricity();
                let q = authalic_q(lonlat.y.to_radians(), e);
                let qp = authalic_q(FRAC_PI_2, e);
                let rho = ellipsoid.a * (qp - q).max(0.0).sqrt();
                polar_xy(rho, lonlat.x - lon0_deg)
            }
            Self::PolarStereographic {
                ellipsoid,
                lon0_deg,
                lat_ts_deg,
            } => {
                let e = ellipsoid.eccentricity();
                let t = conformal_t(lonlat.y.to_radians(), e);
                let rho = ellipsoid.a * stereo_scale(lat_ts_deg.to_radians(), e) * t;
                polar_xy(rho, lonlat.x - lon0_deg)
            }
        };
        if projected.is_finite() {
            Ok(projected)
        } else {
            Err(ProjectionError::NonFinite)
        }
    }

    /// Recovers geographic `(lon, lat)` from planar coordinates.
    pub fn inverse(&self, xy: Point) -> Result<Point, ProjectionError> {
        if !xy.is_finite() {
            return Err(ProjectionError::NonFinite);
        }
        let lonlat = match *self {
            Self::Geographic => {
                if xy.y.abs() > 90.0 {
                    return Err(out_of_domain(xy));
                }
                xy
            }
            Self::WebMercator => {
                let a = Ellipsoid::WGS84.a;
                let lat = 2.0 * (xy.y / a).exp().atan() - FRAC_PI_2;
                Point::new((xy.x / a).to_degrees(), lat.to_degrees())
            }
            Self::PolarAzimuthalEqualArea {
                ellipsoid,
                lon0_deg,
            } => {
                let e = ellipsoid.eccentricity();
                let qp = authalic_q(FRAC_PI_2, e);
                let rho = xy.x.hypot(xy.y);
                let q = qp - (rho / ellipsoid.a).powi(2);
                if q < -qp - 1e-12 {
                    return Err(out_of_domain(xy));
                }
                let beta = (q / qp).clamp(-1.0, 1.0).asin();
                let lat = authalic_to_geodetic(beta, e);
                Point::new(polar_lon(xy, lon0_deg), lat.to_degrees())
            }
            Self::PolarStereographic {
                ellipsoid,
                lon0_deg,
                lat_ts_deg,
            } => {
                let e = ellipsoid.eccentricity();
                let rho = xy.x.hypot(xy.y);
                let t = rho / (ellipsoid.a * stereo_scale(lat_ts_deg.to_radians(), e));
                let lat = conformal_t_inverse(t, e)?;
                Point::new(polar_lon(xy, lon0_deg), lat.to_degrees())
            }
        };
        if lonlat.is_finite() {
            Ok(lonlat)
        } else {
            Err(ProjectionError::NonFinite)
        }
    }
}

fn out_of_domain(p: Point) -> ProjectionError {
    ProjectionError::OutOfDomain { x: p.x, y: p.y }
}

/// Planar coordinates of a north polar aspect for radius `rho` and
/// longitude offset `dlon_deg` from the central meridian.
fn polar_xy(rho: f64, dlon_deg: f64) -> Point {
    let (sin, cos) = dlon_deg.to_radians().sin_cos();
    Point::new(rho * sin, -rho * cos)
}

fn polar_lon(xy: Point, lon0_deg: f64) -> f64 {
    let lon = lon0_deg + xy.x.atan2(-xy.y).to_degrees();
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

/// The `q` function of the authalic latitude.
fn authalic_q(phi: f64, e: f64) -> f64 {
    let sin = phi.sin();
    if e == 0.0 {
        return 2.0 * sin;
    }
    let es = e * sin;
    (1.0 - e * e) * (sin / (1.0 - es * es) - (1.0 / (2.0 * e)) * ((1.0 - es) / (1.0 + es)).ln())
}

/// Series inversion from authalic latitude `beta` to geodetic latitude.
fn authalic_to_geodetic(beta: f64, e: f64) -> f64 {
    let e2 = e * e;
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    beta + (e2 / 3.0 + 31.0 * e4 / 180.0 + 517.0 * e6 / 5040.0) * (2.0 * beta).sin()
        + (23.0 * e4 / 360.0 + 251.0 * e6 / 3780.0) * (4.0 * beta).sin()
        + (761.0 * e6 / 45360.0) * (6.0 * beta).sin()
}

/// Conformal `t` function of the stereographic projection.
fn conformal_t(phi: f64, e: f64) -> f64 {
    let es = e * phi.sin();
    (FRAC_PI_4 - phi * 0.5).tan() / ((1.0 - es) / (1.0 + es)).powf(e * 0.5)
}

fn conformal_t_inverse(t: f64, e: f64) -> Result<f64, ProjectionError> {
    let mut phi = FRAC_PI_2 - 2.0 * t.atan();
    for _ in 0..STEREO_MAX_ITER {
        let es = e * phi.sin();
        let next = FRAC_PI_2 - 2.0 * (t * ((1.0 - es) / (1.0 + es)).powf(e * 0.5)).atan();
        if (next - phi).abs() < STEREO_TOL {
            return Ok(next);
        }
        phi = next;
    }
    if phi.is_finite() {
        Ok(phi)
    } else {
        Err(ProjectionError::NonFinite)
    }
}

/// Ratio `rho / (a * t)` for a latitude of true scale.
fn stereo_scale(lat_ts: f64, e: f64) -> f64 {
    if (lat_ts - FRAC_PI_2).abs() < 1e-12 {
        // True scale at the pole (k0 = 1).
        return 2.0 / ((1.0 + e).powf(1.0 + e) * (1.0 - e).powf(1.0 - e)).sqrt();
    }
    let es = e * lat_ts.sin();
    let m = lat_ts.cos() / (1.0 - es * es).sqrt();
    m / conformal_t(lat_ts, e)
}
