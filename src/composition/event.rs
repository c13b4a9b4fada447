use crate::geometry::Rect;
use crate::item::ItemId;
use crate::util::Condition;

/// Notification for the renderer about a picture.
#[derive(Clone, Debug, PartialEq)]
pub enum PictureEvent {
    /// The picture needs repainting (displayed rect, frame style or source).
    Repainted { picture: ItemId },
    /// A frame-resizing mode replaced the frame.
    FrameResized { picture: ItemId, frame: Rect },
    /// The displayed rotation changed.
    RotationChanged { picture: ItemId, rotation_deg: f64 },
    /// A non-fatal condition occurred while updating the picture.
    Condition {
        picture: ItemId,
        condition: Condition,
    },
}

impl PictureEvent {
    /// Picture the event refers to.
    pub fn picture(&self) -> ItemId {
        match self {
            Self::Repainted { picture }
            | Self::FrameResized { picture, .. }
            | Self::RotationChanged { picture, .. }
            | Self::Condition { picture, .. } => *picture,
        }
    }
}
