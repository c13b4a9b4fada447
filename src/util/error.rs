//! Error and condition types for northfit.

use crate::geo::ProjectionError;
use crate::item::{ItemId, ItemKind};
use crate::sync::NorthMode;
use std::fmt;
use thiserror::Error;

/// Result alias for northfit operations.
pub type NorthFitResult<T> = std::result::Result<T, NorthFitError>;

/// Errors returned by northfit operations.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum NorthFitError {
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// No item with this id exists in the composition.
    #[error("no {kind} item with id {id}")]
    UnknownItem { id: ItemId, kind: ItemKind },
    /// The picture rotation is derived from a linked map and cannot be set.
    #[error("picture rotation is derived from the linked map while north mode is {mode}")]
    RotationLocked { mode: NorthMode },
    /// A coordinate transform failed.
    #[error(transparent)]
    Projection(#[from] ProjectionError),
    /// Reading image metadata failed.
    #[error("image i/o failed: {reason}")]
    ImageIo { reason: String },
}

/// Non-fatal condition reported while fitting or synchronizing a picture.
///
/// Conditions never abort an update; the item is left in a well-defined state
/// and the condition is reported alongside the result.
#[derive(Clone, Debug, PartialEq)]
pub enum Condition {
    /// True north could not be computed; grid north was used instead.
    ProjectionFallback { map: ItemId, error: ProjectionError },
    /// The linked map id does not resolve to a map in the composition.
    UnresolvedLink { map: ItemId },
    /// The frame or the image has zero area; the displayed rect is empty.
    DegenerateGeometry,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProjectionFallback { map, error } => {
                write!(f, "true north unavailable for map {map}, using grid north: {error}")
            }
            Self::UnresolvedLink { map } => write!(f, "linked map {map} does not exist"),
            Self::DegenerateGeometry => f.write_str("zero-area frame or image"),
        }
    }
}
