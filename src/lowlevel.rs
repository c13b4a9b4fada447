//! Low-level building blocks for custom layout engines.
//!
//! These expose the projection formulas, rotated-rect geometry and angle
//! reduction used inside [`Composition`](crate::Composition). Most users
//! should drive pictures through the composition setters instead.

pub use crate::geo::{Ellipsoid, Projection, EPSG_WGS84};
pub use crate::geometry::{largest_rotated_rect_within, rotated_bounds};
pub use crate::north::DEFAULT_STEP_DEG;
pub use crate::sync::{SyncOutcome, SyncState};
pub use crate::util::math::wrap_rotation_deg;
