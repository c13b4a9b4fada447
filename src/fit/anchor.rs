use crate::geometry::{Point, Rect, Size};
use crate::util::NorthFitError;
use std::fmt;
use std::str::FromStr;

/// Reference point of the frame that the image is aligned to.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Anchor {
    UpperLeft,
    UpperMiddle,
    UpperRight,
    MiddleLeft,
    #[default]
    Middle,
    MiddleRight,
    LowerLeft,
    LowerMiddle,
    LowerRight,
}

impl Anchor {
    /// All anchors in row-major order.
    pub const ALL: [Anchor; 9] = [
        Anchor::UpperLeft,
        Anchor::UpperMiddle,
        Anchor::UpperRight,
        Anchor::MiddleLeft,
        Anchor::Middle,
        Anchor::MiddleRight,
        Anchor::LowerLeft,
        Anchor::LowerMiddle,
        Anchor::LowerRight,
    ];

    /// Horizontal and vertical placement factors in `[0, 1]`.
    pub fn factors(self) -> (f64, f64) {
        let fx = match self {
            Self::UpperLeft | Self::MiddleLeft | Self::LowerLeft => 0.0,
            Self::UpperMiddle | Self::Middle | Self::LowerMiddle => 0.5,
            Self::UpperRight | Self::MiddleRight | Self::LowerRight => 1.0,
        };
        let fy = match self {
            Self::UpperLeft | Self::UpperMiddle | Self::UpperRight => 0.0,
            Self::MiddleLeft | Self::Middle | Self::MiddleRight => 0.5,
            Self::LowerLeft | Self::LowerMiddle | Self::LowerRight => 1.0,
        };
        (fx, fy)
    }

    /// The anchor point on the boundary (or center) of `frame`.
    pub fn point_in(self, frame: Rect) -> Point {
        let (fx, fy) = self.factors();
        Point::new(frame.x + frame.width * fx, frame.y + frame.height * fy)
    }

    /// Places a rect of `size` inside `frame` so that their anchor points
    /// coincide. The result may overflow the frame.
    pub fn place(self, frame: Rect, size: Size) -> Rect {
        let (fx, fy) = self.factors();
        Rect::new(
            frame.x + (frame.width - size.width) * fx,
            frame.y + (frame.height - size.height) * fy,
            size.width,
            size.height,
        )
    }

    fn name(self) -> &'static str {
        match self {
            Self::UpperLeft => "upper-left",
            Self::UpperMiddle => "upper-middle",
            Self::UpperRight => "upper-right",
            Self::MiddleLeft => "middle-left",
            Self::Middle => "middle",
            Self::MiddleRight => "middle-right",
            Self::LowerLeft => "lower-left",
            Self::LowerMiddle => "lower-middle",
            Self::LowerRight => "lower-right",
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Anchor {
    type Err = NorthFitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(&wanted))
            .ok_or(NorthFitError::InvalidInput("unknown anchor"))
    }
}
