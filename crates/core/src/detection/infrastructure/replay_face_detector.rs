use std::collections::HashMap;
use std::sync::Arc;

use crate::detection::domain::face_detector::{DetectionResult, FaceDetector};
use crate::shared::frame::Frame;

/// Replays recorded detection results by frame index.
///
/// Used to rerun a captured session through the estimator and policy
/// without a camera or model. Frames absent from the recording have no
/// faces.
pub struct ReplayFaceDetector {
    recorded: Arc<HashMap<usize, DetectionResult>>,
}

impl ReplayFaceDetector {
    pub fn new(recorded: Arc<HashMap<usize, DetectionResult>>) -> Self {
        Self { recorded }
    }
}

impl FaceDetector for ReplayFaceDetector {
    fn detect(&mut self, frame: &Frame) -> DetectionResult {
        self.recorded
            .get(&frame.index())
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}
