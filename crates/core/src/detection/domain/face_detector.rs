use thiserror::Error;

use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DetectionError {
    #[error("face detection failed: {0}")]
    Failed(String),
}

/// Either the faces found in a frame or the reason detection failed.
pub type DetectionResult = Result<Vec<FaceBox>, DetectionError>;

/// Domain interface for the external face detector.
///
/// Implementations may be stateful (e.g., tracking across frames),
/// hence `&mut self`. A failure is reported for that frame only; callers
/// treat it as "no faces".
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> DetectionResult;
}
