//! Picture rotation driven by a linked map.
//!
//! A picture in `GridNorth` or `TrueNorth` mode takes its rotation from the
//! map it is linked to. While the link resolves, the rotation is derived and
//! cannot be set directly. When the link is missing or dangling the base
//! angle is 0, so the rotation is the reduced north offset until the user
//! sets a rotation of their own; from then on it is free, exactly as in
//! `None` mode. The chosen mode is kept so that relinking restores
//! synchronization.

use crate::geo::GeoTransform;
use crate::item::{ItemId, MapItem};
use crate::north::TrueNorthCalculator;
use crate::trace::{trace_event, trace_warn};
use crate::util::math::wrap_rotation_deg;
use crate::util::{Condition, NorthFitError, NorthFitResult};
use std::fmt;
use std::str::FromStr;

/// North reference a picture is synchronized to.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum NorthMode {
    /// Rotation is set by the user.
    #[default]
    None,
    /// Rotation follows the linked map's rotation.
    GridNorth,
    /// Rotation follows true north at the linked map's center.
    TrueNorth,
}

impl NorthMode {
    fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::GridNorth => "grid-north",
            Self::TrueNorth => "true-north",
        }
    }
}

impl fmt::Display for NorthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NorthMode {
    type Err = NorthFitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('_', "-");
        [Self::None, Self::GridNorth, Self::TrueNorth]
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(&wanted))
            .ok_or(NorthFitError::InvalidInput("unknown north mode"))
    }
}

/// Whether a synchronized picture currently follows its map.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SyncState {
    /// No resolvable map. `pinned` is set once the rotation was chosen by
    /// the user rather than derived from the offset.
    Detached { rotation_deg: f64, pinned: bool },
    /// Rotation is `base_deg + offset` reduced modulo 360.
    Attached { base_deg: f64, rotation_deg: f64 },
}

impl SyncState {
    fn rotation_deg(&self) -> f64 {
        match *self {
            Self::Detached { rotation_deg, .. } | Self::Attached { rotation_deg, .. } => {
                rotation_deg
            }
        }
    }
}

/// Rotation of a picture, tagged by north mode.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RotationState {
    None {
        rotation_deg: f64,
    },
    GridNorth {
        sync: SyncState,
    },
    TrueNorth {
        sync: SyncState,
        /// Last convergence angle, `None` if it could not be computed.
        convergence_deg: Option<f64>,
    },
}

impl Default for RotationState {
    fn default() -> Self {
        Self::None { rotation_deg: 0.0 }
    }
}

impl RotationState {
    /// North mode of this state.
    pub fn mode(&self) -> NorthMode {
        match self {
            Self::None { .. } => NorthMode::None,
            Self::GridNorth { .. } => NorthMode::GridNorth,
            Self::TrueNorth { .. } => NorthMode::TrueNorth,
        }
    }

    /// Displayed rotation in degrees.
    pub fn rotation_deg(&self) -> f64 {
        match self {
            Self::None { rotation_deg } => *rotation_deg,
            Self::GridNorth { sync } | Self::TrueNorth { sync, .. } => sync.rotation_deg(),
        }
    }

    /// Returns true while the rotation is derived from a map.
    pub fn is_attached(&self) -> bool {
        matches!(
            self,
            Self::GridNorth {
                sync: SyncState::Attached { .. }
            } | Self::TrueNorth {
                sync: SyncState::Attached { .. },
                ..
            }
        )
    }

    fn is_pinned(&self) -> bool {
        matches!(
            self,
            Self::GridNorth {
                sync: SyncState::Detached { pinned: true, .. }
            } | Self::TrueNorth {
                sync: SyncState::Detached { pinned: true, .. },
                ..
            }
        )
    }

    fn detached(mode: NorthMode, rotation_deg: f64, pinned: bool) -> Self {
        let sync = SyncState::Detached {
            rotation_deg,
            pinned,
        };
        match mode {
            NorthMode::None => Self::None { rotation_deg },
            NorthMode::GridNorth => Self::GridNorth { sync },
            NorthMode::TrueNorth => Self::TrueNorth {
                sync,
                convergence_deg: None,
            },
        }
    }
}

/// What a resolve pass changed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SyncOutcome {
    /// Set if the displayed rotation changed.
    pub rotation_changed: bool,
    /// Fallback or dangling-link condition, if any.
    pub condition: Option<Condition>,
}

/// Owns the north mode, the map link and the offset of one picture.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RotationSynchronizer {
    state: RotationState,
    link: Option<ItemId>,
    offset_deg: f64,
}

impl RotationSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &RotationState {
        &self.state
    }

    pub fn mode(&self) -> NorthMode {
        self.state.mode()
    }

    pub fn rotation_deg(&self) -> f64 {
        self.state.rotation_deg()
    }

    /// Stored map link, whether or not it resolves.
    pub fn link(&self) -> Option<ItemId> {
        self.link
    }

    pub fn offset_deg(&self) -> f64 {
        self.offset_deg
    }

    /// Switches the north mode, keeping the current rotation until the next
    /// resolve. A synchronized mode without a resolvable map then takes the
    /// offset as its rotation.
    pub fn set_mode(&mut self, mode: NorthMode) {
        if mode != self.mode() {
            self.state = RotationState::detached(mode, self.rotation_deg(), false);
        }
    }

    /// Replaces the map link. Returns the previous link.
    pub fn set_link(&mut self, link: Option<ItemId>) -> Option<ItemId> {
        std::mem::replace(&mut self.link, link)
    }

    pub fn set_offset_deg(&mut self, offset_deg: f64) -> NorthFitResult<()> {
        if !offset_deg.is_finite() {
            return Err(NorthFitError::InvalidInput("north offset must be finite"));
        }
        self.offset_deg = offset_deg;
        Ok(())
    }

    /// Sets the rotation directly. Fails while the rotation is derived.
    ///
    /// While detached, the value sticks: offset changes no longer replace it
    /// until the picture attaches again or its mode changes.
    pub fn set_free_rotation(&mut self, rotation_deg: f64) -> NorthFitResult<bool> {
        if !rotation_deg.is_finite() {
            return Err(NorthFitError::InvalidInput("rotation must be finite"));
        }
        if self.state.is_attached() {
            return Err(NorthFitError::RotationLocked { mode: self.mode() });
        }
        let changed = self.rotation_deg() != rotation_deg;
        self.state = RotationState::detached(self.mode(), rotation_deg, true);
        Ok(changed)
    }

    /// Recomputes the rotation from the linked map.
    ///
    /// `map` is the result of looking up [`link`](Self::link) in the
    /// composition. A missing map detaches the picture with base 0, so its
    /// rotation becomes the reduced offset unless the user pinned a rotation
    /// since detaching. Projection failures in `TrueNorth` mode fall back to
    /// the map rotation.
    pub fn resolve(
        &mut self,
        map: Option<&MapItem>,
        north: &TrueNorthCalculator,
        geo: &dyn GeoTransform,
    ) -> SyncOutcome {
        let mode = self.mode();
        let before = self.rotation_deg();
        if mode == NorthMode::None {
            return SyncOutcome::default();
        }

        let mut condition = None;
        let Some(map) = map else {
            if let Some(id) = self.link {
                trace_warn!("unresolved_link", map = id.get());
                condition = Some(Condition::UnresolvedLink { map: id });
            }
            if !self.state.is_pinned() {
                let rotation_deg = wrap_rotation_deg(self.offset_deg);
                self.state = RotationState::detached(mode, rotation_deg, false);
            }
            return SyncOutcome {
                rotation_changed: self.rotation_deg() != before,
                condition,
            };
        };

        let (base_deg, convergence_deg) = match mode {
            NorthMode::TrueNorth => {
                match north.convergence_angle(map.extent(), map.crs(), geo) {
                    Ok(c) => (c + map.rotation_deg(), Some(c)),
                    Err(error) => {
                        trace_warn!("true_north_fallback", map = map.id().get());
                        condition = Some(Condition::ProjectionFallback {
                            map: map.id(),
                            error,
                        });
                        (map.rotation_deg(), None)
                    }
                }
            }
            _ => (map.rotation_deg(), None),
        };
        let rotation_deg = wrap_rotation_deg(base_deg + self.offset_deg);
        let sync = SyncState::Attached {
            base_deg,
            rotation_deg,
        };
        self.state = match mode {
            NorthMode::TrueNorth => RotationState::TrueNorth {
                sync,
                convergence_deg,
            },
            _ => RotationState::GridNorth { sync },
        };
        trace_event!("north_synced", base = base_deg, rotation = rotation_deg);
        SyncOutcome {
            rotation_changed: rotation_deg != before,
            condition,
        }
    }
}
