//! Layout items: the maps pictures link to and the pictures themselves.

mod source;

pub use source::PictureSource;

use crate::fit::{Anchor, FitConfig, FitOutcome, ResizeFitter, ResizeMode};
use crate::geo::{Crs, Extent};
use crate::geometry::{NaturalSize, Rect};
use crate::sync::{NorthMode, RotationSynchronizer};
use crate::util::{Condition, NorthFitResult};
use std::fmt;

/// Identity of an item in a composition. Ids are never reused.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(u64);

impl ItemId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of a layout item.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Map,
    Picture,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Map => "map",
            Self::Picture => "picture",
        })
    }
}

/// A map element as seen by linked pictures.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MapItem {
    id: ItemId,
    extent: Extent,
    crs: Crs,
    rotation_deg: f64,
}

impl MapItem {
    pub(crate) fn new(id: ItemId, extent: Extent, crs: Crs, rotation_deg: f64) -> Self {
        Self {
            id,
            extent,
            crs,
            rotation_deg,
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Visible extent in map CRS units.
    pub fn extent(&self) -> &Extent {
        &self.extent
    }

    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    /// Rotation of the map content on the page, clockwise degrees.
    pub fn rotation_deg(&self) -> f64 {
        self.rotation_deg
    }

    pub(crate) fn apply(&mut self, update: &MapUpdate) {
        if let Some(extent) = update.extent {
            self.extent = extent;
        }
        if let Some(crs) = update.crs {
            self.crs = crs;
        }
        if let Some(rotation_deg) = update.rotation_deg {
            self.rotation_deg = rotation_deg;
        }
    }
}

/// A batch of map changes applied with a single propagation.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct MapUpdate {
    pub extent: Option<Extent>,
    pub crs: Option<Crs>,
    pub rotation_deg: Option<f64>,
}

impl MapUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extent(mut self, extent: Extent) -> Self {
        self.extent = Some(extent);
        self
    }

    pub fn crs(mut self, crs: Crs) -> Self {
        self.crs = Some(crs);
        self
    }

    pub fn rotation_deg(mut self, rotation_deg: f64) -> Self {
        self.rotation_deg = Some(rotation_deg);
        self
    }

    /// Returns true if the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.extent.is_none() && self.crs.is_none() && self.rotation_deg.is_none()
    }
}

/// What a refit changed.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) struct Refit {
    pub frame_changed: bool,
    pub displayed_changed: bool,
    pub degenerate: bool,
}

/// A picture element: an image fitted into a frame, optionally rotated to a
/// north reference.
#[derive(Clone, Debug)]
pub struct PictureItem {
    id: ItemId,
    source: Option<PictureSource>,
    natural: Option<NaturalSize>,
    frame: Rect,
    frame_enabled: bool,
    resize_mode: ResizeMode,
    fitter: ResizeFitter,
    fit: FitOutcome,
    sync: RotationSynchronizer,
}

impl PictureItem {
    pub(crate) fn new(id: ItemId, frame: Rect, fitter: ResizeFitter) -> Self {
        let frame = frame.normalized();
        let mut picture = Self {
            id,
            source: None,
            natural: None,
            frame,
            frame_enabled: false,
            resize_mode: ResizeMode::default(),
            fitter,
            fit: FitOutcome {
                displayed: Rect::default(),
                new_frame: None,
                visible: Rect::default(),
                condition: None,
            },
            sync: RotationSynchronizer::new(),
        };
        picture.refit();
        picture
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn source(&self) -> Option<&PictureSource> {
        self.source.as_ref()
    }

    /// Natural pixel size, once reported by the image loader.
    pub fn natural_size(&self) -> Option<NaturalSize> {
        self.natural
    }

    /// Bounding frame on the page.
    pub fn frame(&self) -> Rect {
        self.frame
    }

    pub fn frame_enabled(&self) -> bool {
        self.frame_enabled
    }

    /// Rect the image is drawn into, before rotation.
    pub fn displayed_rect(&self) -> Rect {
        self.fit.displayed
    }

    /// Part of the displayed rect inside the frame.
    pub fn visible_rect(&self) -> Rect {
        self.fit.visible
    }

    pub fn resize_mode(&self) -> ResizeMode {
        self.resize_mode
    }

    pub fn fit_config(&self) -> &FitConfig {
        self.fitter.config()
    }

    pub fn anchor(&self) -> Anchor {
        self.fitter.config().anchor
    }

    pub fn north_mode(&self) -> NorthMode {
        self.sync.mode()
    }

    pub fn north_offset_deg(&self) -> f64 {
        self.sync.offset_deg()
    }

    /// Displayed rotation in clockwise degrees.
    pub fn rotation_deg(&self) -> f64 {
        self.sync.rotation_deg()
    }

    /// Rotation synchronization state.
    pub fn synchronizer(&self) -> &RotationSynchronizer {
        &self.sync
    }

    /// Geometry condition from the last fit.
    pub fn condition(&self) -> Option<&Condition> {
        self.fit.condition.as_ref()
    }

    pub(crate) fn sync_mut(&mut self) -> &mut RotationSynchronizer {
        &mut self.sync
    }

    pub(crate) fn set_source(&mut self, source: Option<PictureSource>) {
        if self.source != source {
            self.natural = None;
        }
        self.source = source;
    }

    pub(crate) fn set_natural_size(&mut self, natural: Option<NaturalSize>) {
        self.natural = natural;
    }

    pub(crate) fn set_frame(&mut self, frame: Rect) {
        self.frame = frame.normalized();
    }

    pub(crate) fn set_frame_enabled(&mut self, enabled: bool) -> bool {
        std::mem::replace(&mut self.frame_enabled, enabled) != enabled
    }

    pub(crate) fn set_resize_mode(&mut self, mode: ResizeMode) {
        self.resize_mode = mode;
    }

    pub(crate) fn set_fit_config(&mut self, cfg: FitConfig) -> NorthFitResult<()> {
        self.fitter = ResizeFitter::new(cfg)?;
        Ok(())
    }

    /// Recomputes the displayed rect, replacing the frame for the
    /// frame-resizing modes.
    pub(crate) fn refit(&mut self) -> Refit {
        let fit = self.natural.map(|natural| {
            self.fitter.fit_rotated(
                self.frame,
                natural,
                self.resize_mode,
                self.sync.rotation_deg(),
            )
        });
        self.apply_fit(fit)
    }

    /// Refits after the rotation changed from `previous_deg`, keeping the
    /// image size of a shrink-wrapped frame.
    pub(crate) fn refit_rotation(&mut self, previous_deg: f64) -> Refit {
        if !self.resize_mode.is_rotation_aware() {
            return Refit::default();
        }
        let fit = self.natural.map(|natural| {
            self.fitter.refit_rotation(
                self.frame,
                natural,
                self.resize_mode,
                previous_deg,
                self.sync.rotation_deg(),
            )
        });
        self.apply_fit(fit)
    }

    fn apply_fit(&mut self, fit: Option<FitOutcome>) -> Refit {
        let before = self.fit.displayed;
        let fit = match fit {
            Some(fit) => fit,
            None => {
                let empty = Rect::from_origin_size(self.frame.origin(), Default::default());
                FitOutcome {
                    displayed: empty,
                    new_frame: None,
                    visible: empty,
                    condition: None,
                }
            }
        };
        let new_frame = fit.frame_or(self.frame);
        let frame_changed = new_frame != self.frame;
        self.frame = new_frame;
        self.fit = fit;
        Refit {
            frame_changed,
            displayed_changed: self.fit.displayed != before,
            degenerate: self.fit.condition.is_some(),
        }
    }
}
