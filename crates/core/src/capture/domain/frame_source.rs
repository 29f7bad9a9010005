use thiserror::Error;

use crate::capture::domain::frame_lease::FrameLease;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("camera error: {0}")]
    Device(String),
    #[error("frame consumer has gone away")]
    SlotClosed,
}

/// Produces camera frames in capture order.
///
/// Implementations handle device details; the monitoring session only sees
/// leased [`Frame`](crate::shared::frame::Frame)s stamped with a capture
/// time.
pub trait FrameSource: Send {
    /// Returns an iterator over captured frames. Ends when the device stops.
    fn frames(&mut self) -> Box<dyn Iterator<Item = Result<FrameLease, CaptureError>> + '_>;
}
