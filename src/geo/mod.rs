//! Coordinate reference systems and the point-transform collaborator.
//!
//! The engine only consumes two operations from a CRS backend: "transform a
//! point between CRS A and CRS B" and "query CRS properties". Both live on the
//! [`GeoTransform`] trait. [`BuiltinTransform`] is a small self-contained
//! implementation covering geographic WGS84, web mercator and the north polar
//! projections commonly used for arctic layouts.
//!
//! Geographic points use `x = longitude`, `y = latitude`, both in degrees.

mod builtin;
mod projection;

pub use builtin::BuiltinTransform;
pub use projection::{Ellipsoid, Projection};

use crate::geometry::Point;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// EPSG code of geographic WGS84.
pub const EPSG_WGS84: u32 = 4326;

/// Errors raised by coordinate transforms.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ProjectionError {
    /// The CRS is the invalid sentinel or could not be parsed.
    #[error("invalid coordinate reference system")]
    InvalidCrs,
    /// The CRS is valid but the backend has no definition for it.
    #[error("unsupported coordinate reference system EPSG:{code}")]
    UnsupportedCrs { code: u32 },
    /// The point lies outside the projection's domain.
    #[error("point ({x}, {y}) is outside the projection domain")]
    OutOfDomain { x: f64, y: f64 },
    /// The input or the result is NaN or infinite.
    #[error("non-finite coordinate in transform")]
    NonFinite,
    /// Projected north direction collapsed to a zero-length vector.
    #[error("north direction is undefined at ({x}, {y})")]
    DegenerateDirection { x: f64, y: f64 },
}

/// Coordinate reference system identity.
///
/// A CRS is identified by its EPSG code. The invalid sentinel stands for a
/// CRS that was never set or could not be resolved.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Crs {
    epsg: Option<u32>,
}

impl Crs {
    /// Geographic WGS84 (EPSG:4326).
    pub const WGS84: Crs = Crs {
        epsg: Some(EPSG_WGS84),
    };
    /// The invalid sentinel.
    pub const INVALID: Crs = Crs { epsg: None };

    /// Creates a CRS from an EPSG code.
    pub const fn epsg(code: u32) -> Self {
        Self { epsg: Some(code) }
    }

    /// Returns the EPSG code, or `None` for the invalid sentinel.
    pub fn code(&self) -> Option<u32> {
        self.epsg
    }

    /// Returns true unless this is the invalid sentinel.
    pub fn is_set(&self) -> bool {
        self.epsg.is_some()
    }
}

impl Default for Crs {
    fn default() -> Self {
        Self::WGS84
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.epsg {
            Some(code) => write!(f, "EPSG:{code}"),
            None => f.write_str("(invalid)"),
        }
    }
}

impl FromStr for Crs {
    type Err = ProjectionError;

    /// Parses an authority id such as `EPSG:3575` (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (authority, code) = s.trim().split_once(':').ok_or(ProjectionError::InvalidCrs)?;
        if !authority.eq_ignore_ascii_case("epsg") {
            return Err(ProjectionError::InvalidCrs);
        }
        let code = code
            .trim()
            .parse::<u32>()
            .map_err(|_| ProjectionError::InvalidCrs)?;
        Ok(Self::epsg(code))
    }
}

/// Axis-aligned extent of a map in its own CRS units (`y` grows northwards).
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Extent {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl Extent {
    /// Creates an extent, swapping bounds given in the wrong order.
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            xmin: xmin.min(xmax),
            ymin: ymin.min(ymax),
            xmax: xmin.max(xmax),
            ymax: ymin.max(ymax),
        }
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Midpoint of the extent.
    pub fn center(&self) -> Point {
        Point::new(
            self.xmin + self.width() * 0.5,
            self.ymin + self.height() * 0.5,
        )
    }

    /// Returns true if all bounds are finite.
    pub fn is_finite(&self) -> bool {
        self.xmin.is_finite() && self.ymin.is_finite() && self.xmax.is_finite() && self.ymax.is_finite()
    }
}

/// CRS backend consumed by the true-north calculation.
///
/// Implementations must be pure with respect to their inputs: the same point
/// and CRS pair always produce the same result.
pub trait GeoTransform: Send + Sync {
    /// Transforms `point` from `source` to `target`.
    fn transform_point(
        &self,
        point: Point,
        source: &Crs,
        target: &Crs,
    ) -> Result<Point, ProjectionError>;

    /// Returns true if the backend can transform from and to `crs`.
    fn is_valid(&self, crs: &Crs) -> bool;

    /// Returns true if `crs` is a geographic (longitude/latitude) CRS.
    fn is_geographic(&self, crs: &Crs) -> bool;
}
