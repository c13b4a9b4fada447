//! northfit places pictures in print layouts and keeps them pointing north.
//!
//! The crate fits an image into its frame under one of several resize modes
//! and derives a picture's rotation from a linked map, either following the
//! map's grid or true north at the map center. Coordinate transforms are
//! consumed through the [`GeoTransform`] trait; a small built-in
//! implementation covers geographic, web mercator and north polar systems.
//! Optional parallel refitting is available via the `rayon` feature.

pub mod composition;
pub mod fit;
pub mod geo;
pub mod geometry;
pub mod item;
pub mod lowlevel;
pub mod north;
pub mod probe;
pub mod sync;
mod trace;
pub mod util;

pub use composition::{Composition, PictureEvent};
pub use fit::{Anchor, FitConfig, FitOutcome, ResizeFitter, ResizeMode};
pub use geo::{BuiltinTransform, Crs, Extent, GeoTransform, ProjectionError};
pub use geometry::{NaturalSize, Point, Rect, Size};
pub use item::{ItemId, ItemKind, MapItem, MapUpdate, PictureItem, PictureSource};
pub use north::TrueNorthCalculator;
pub use probe::ImageProbe;
#[cfg(feature = "image-io")]
pub use probe::ImageFileProbe;
pub use sync::{NorthMode, RotationState, RotationSynchronizer};
pub use util::{Condition, NorthFitError, NorthFitResult};
