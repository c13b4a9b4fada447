//! Fitting a source image into a picture frame.
//!
//! [`ResizeFitter::fit`] maps a frame rect, the natural pixel size of the
//! image and a [`ResizeMode`] to the rect the image is drawn into, and for the
//! frame-resizing modes a replacement frame. Fitting is a pure function of its
//! inputs; applying the same mode twice yields the same rects.
//!
//! When a picture is rotated, the aspect-preserving modes size the image so
//! that its rotated footprint (not the unrotated rect) stays inside the frame.
//! The frame-resizing modes keep the frame's anchor point fixed.

mod anchor;

pub use anchor::Anchor;

use crate::geometry::{largest_rotated_rect_within, rotated_bounds, NaturalSize, Rect, Size};
use crate::util::math::quarter_turns;
use crate::util::{Condition, NorthFitError, NorthFitResult};
use std::fmt;
use std::str::FromStr;

/// Relative tolerance under which the frame and image aspect ratios are
/// treated as equal.
const ASPECT_SNAP: f64 = 1e-12;

/// Policy for fitting an image into its frame.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ResizeMode {
    /// Scale uniformly to fit inside the frame, placed at the anchor.
    #[default]
    Zoom,
    /// Scale each axis independently to fill the frame exactly.
    Stretch,
    /// Draw at natural size at the anchor, cropped by the frame.
    Clip,
    /// Scale uniformly to fit, then shrink the frame to the scaled image
    /// around the anchor point.
    ZoomResizeFrame,
    /// Resize the frame to the natural size of the image around the anchor
    /// point.
    FrameToImageSize,
}

impl ResizeMode {
    /// All modes, in declaration order.
    pub const ALL: [ResizeMode; 5] = [
        ResizeMode::Zoom,
        ResizeMode::Stretch,
        ResizeMode::Clip,
        ResizeMode::ZoomResizeFrame,
        ResizeMode::FrameToImageSize,
    ];

    /// Returns true if the mode may replace the frame rect.
    pub fn resizes_frame(self) -> bool {
        matches!(self, Self::ZoomResizeFrame | Self::FrameToImageSize)
    }

    /// Returns true if the fitted rect depends on the picture rotation.
    pub fn is_rotation_aware(self) -> bool {
        !matches!(self, Self::Stretch)
    }

    fn name(self) -> &'static str {
        match self {
            Self::Zoom => "zoom",
            Self::Stretch => "stretch",
            Self::Clip => "clip",
            Self::ZoomResizeFrame => "zoom-resize-frame",
            Self::FrameToImageSize => "frame-to-image-size",
        }
    }
}

impl fmt::Display for ResizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResizeMode {
    type Err = NorthFitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(&wanted))
            .ok_or(NorthFitError::InvalidInput("unknown resize mode"))
    }
}

/// Fitting parameters shared by all modes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FitConfig {
    /// Image pixels per layout unit, used by the natural-size modes.
    pub pixels_per_unit: f64,
    /// Reference point used to place the image inside the frame.
    pub anchor: Anchor,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            // 96 DPI expressed per millimetre.
            pixels_per_unit: 96.0 / 25.4,
            anchor: Anchor::Middle,
        }
    }
}

impl FitConfig {
    /// Sets the pixels-per-unit factor.
    pub fn with_pixels_per_unit(mut self, pixels_per_unit: f64) -> Self {
        self.pixels_per_unit = pixels_per_unit;
        self
    }

    /// Sets the placement anchor.
    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub(crate) fn validate(&self) -> NorthFitResult<()> {
        if !self.pixels_per_unit.is_finite() || self.pixels_per_unit <= 0.0 {
            return Err(NorthFitError::InvalidInput(
                "pixels_per_unit must be finite and > 0",
            ));
        }
        Ok(())
    }
}

/// Result of fitting an image into a frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FitOutcome {
    /// Rect the (unrotated) image is drawn into.
    pub displayed: Rect,
    /// Replacement frame for the frame-resizing modes.
    pub new_frame: Option<Rect>,
    /// Part of `displayed` inside the frame (the cropped area for `Clip`).
    pub visible: Rect,
    /// Set when the frame or the image has zero area.
    pub condition: Option<Condition>,
}

impl FitOutcome {
    /// The frame after fitting: `new_frame` or the original.
    pub fn frame_or(&self, original: Rect) -> Rect {
        self.new_frame.unwrap_or(original)
    }
}

/// Computes displayed rects for pictures.
#[derive(Clone, Debug, Default)]
pub struct ResizeFitter {
    cfg: FitConfig,
}

impl ResizeFitter {
    /// Creates a fitter, validating the configuration.
    pub fn new(cfg: FitConfig) -> NorthFitResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &FitConfig {
        &self.cfg
    }

    /// Fits an unrotated image.
    pub fn fit(&self, frame: Rect, natural: NaturalSize, mode: ResizeMode) -> FitOutcome {
        self.fit_rotated(frame, natural, mode, 0.0)
    }

    /// Fits an image that is drawn rotated by `rotation_deg` about the center
    /// of its displayed rect.
    pub fn fit_rotated(
        &self,
        frame: Rect,
        natural: NaturalSize,
        mode: ResizeMode,
        rotation_deg: f64,
    ) -> FitOutcome {
        let frame = frame.normalized();
        let rotation_deg = if rotation_deg.is_finite() {
            rotation_deg
        } else {
            0.0
        };
        // Only FrameToImageSize ignores the incoming frame size.
        let frame_bound = mode != ResizeMode::FrameToImageSize;
        if natural.is_empty() || (frame_bound && frame.is_empty()) || !frame.is_finite() {
            return self.degenerate(frame);
        }

        let anchor = self.cfg.anchor;
        let (displayed, bounds) = match mode {
            ResizeMode::Zoom => {
                let size = contain_rotated(frame.size(), natural, rotation_deg);
                (place_rotated(frame, size, rotation_deg, anchor), frame)
            }
            ResizeMode::Stretch => (frame, frame),
            ResizeMode::Clip => {
                let size = natural.to_layout(self.cfg.pixels_per_unit);
                (place_rotated(frame, size, rotation_deg, anchor), frame)
            }
            ResizeMode::ZoomResizeFrame => {
                let size = contain_rotated(frame.size(), natural, rotation_deg);
                wrap_frame(frame, size, rotation_deg, anchor)
            }
            ResizeMode::FrameToImageSize => {
                let size = natural.to_layout(self.cfg.pixels_per_unit);
                wrap_frame(frame, size, rotation_deg, anchor)
            }
        };
        outcome(displayed, bounds, mode.resizes_frame().then_some(bounds))
    }

    /// Refits after the picture rotation changed from `from_deg` to `to_deg`.
    ///
    /// `ZoomResizeFrame` keeps the image size it had at `from_deg` and moves
    /// the frame to the new rotated footprint around the anchor point, so a
    /// rotation and its inverse restore the frame. Other modes fit as
    /// [`fit_rotated`](Self::fit_rotated) does.
    pub fn refit_rotation(
        &self,
        frame: Rect,
        natural: NaturalSize,
        mode: ResizeMode,
        from_deg: f64,
        to_deg: f64,
    ) -> FitOutcome {
        let frame = frame.normalized();
        let usable = !natural.is_empty() && !frame.is_empty() && frame.is_finite();
        if mode != ResizeMode::ZoomResizeFrame || !usable || !from_deg.is_finite() {
            return self.fit_rotated(frame, natural, mode, to_deg);
        }
        let to_deg = if to_deg.is_finite() { to_deg } else { 0.0 };
        let size = contain_rotated(frame.size(), natural, from_deg);
        let (displayed, new_frame) = wrap_frame(frame, size, to_deg, self.cfg.anchor);
        outcome(displayed, new_frame, Some(new_frame))
    }

    fn degenerate(&self, frame: Rect) -> FitOutcome {
        let origin = if frame.is_finite() {
            self.cfg.anchor.point_in(frame)
        } else {
            Default::default()
        };
        let empty = Rect::new(origin.x, origin.y, 0.0, 0.0);
        FitOutcome {
            displayed: empty,
            new_frame: None,
            visible: empty,
            condition: Some(Condition::DegenerateGeometry),
        }
    }
}

fn outcome(displayed: Rect, frame: Rect, new_frame: Option<Rect>) -> FitOutcome {
    FitOutcome {
        displayed,
        new_frame,
        visible: frame.intersection(&displayed),
        condition: None,
    }
}

/// Resizes `frame` to the rotated footprint of `size`, keeping the anchor
/// point, and centers the image in it. Returns `(displayed, frame)`.
///
/// Footprint axes that differ from the frame only by rounding take the frame
/// size.
fn wrap_frame(frame: Rect, size: Size, rotation_deg: f64, anchor: Anchor) -> (Rect, Rect) {
    let snap = |fitted: f64, original: f64| {
        if (fitted - original).abs() <= ASPECT_SNAP * original {
            original
        } else {
            fitted
        }
    };
    let footprint = rotated_bounds(size, rotation_deg);
    let snapped = Size::new(
        snap(footprint.width, frame.width),
        snap(footprint.height, frame.height),
    );
    let new_frame = anchor.place(frame, snapped);
    (Rect::centered_at(new_frame.center(), size), new_frame)
}

/// Unrotated size of the largest image whose rotated footprint fits `bounds`.
fn contain_rotated(bounds: Size, natural: NaturalSize, rotation_deg: f64) -> Size {
    let (nw, nh) = (natural.width as f64, natural.height as f64);
    match quarter_turns(rotation_deg) {
        Some(0 | 2) => contain(bounds, nw, nh),
        Some(_) => {
            let swapped = contain(bounds, nh, nw);
            Size::new(swapped.height, swapped.width)
        }
        None => Size::new(nw, nh)
            .aspect_ratio()
            .map(|aspect| largest_rotated_rect_within(bounds, aspect, rotation_deg))
            .unwrap_or_default(),
    }
}

/// Uniform "contain" scale of `nw × nh` into `bounds`.
///
/// The constraining axis takes the bound exactly, and near-equal aspect
/// ratios fill the bounds exactly, so repeated fitting does not drift.
fn contain(bounds: Size, nw: f64, nh: f64) -> Size {
    let scale_x = bounds.width / nw;
    let scale_y = bounds.height / nh;
    if (scale_x - scale_y).abs() <= ASPECT_SNAP * scale_x.max(scale_y) {
        bounds
    } else if scale_x < scale_y {
        Size::new(bounds.width, nh * scale_x)
    } else {
        Size::new(nw * scale_y, bounds.height)
    }
}

/// Places the rotated footprint of `size` at `anchor` inside `frame` and
/// returns the unrotated rect sharing its center.
fn place_rotated(frame: Rect, size: Size, rotation_deg: f64, anchor: Anchor) -> Rect {
    let footprint = rotated_bounds(size, rotation_deg);
    let placed = anchor.place(frame, footprint);
    Rect::centered_at(placed.center(), size)
}
