use thiserror::Error;

use crate::estimation::domain::camera_calibration::CameraCalibration;
use crate::shared::clock::Timestamp;
use crate::shared::face_box::FaceBox;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EstimationError {
    /// The observation cannot produce a finite distance (zero or negative
    /// face width, or a zero frame width).
    #[error(
        "invalid observation: face width {bounding_box_width_px}px in a {frame_width_px}px frame"
    )]
    InvalidObservation {
        bounding_box_width_px: i32,
        frame_width_px: u32,
    },
}

/// One detected face, reduced to what the distance model needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceObservation {
    pub bounding_box_width_px: i32,
    pub frame_width_px: u32,
    pub timestamp: Timestamp,
}

/// Estimated face-to-screen distance.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct DistanceEstimate {
    pub centimeters: f64,
}

impl DistanceEstimate {
    /// Strict comparison: a face exactly at the threshold is not close.
    pub fn is_closer_than(&self, threshold_cm: f64) -> bool {
        self.centimeters < threshold_cm
    }
}

/// Pinhole-camera approximation of viewing distance.
///
/// `distance = face_width_cm * frame_width_px / box_width_px + correction_cm`
///
/// Apparent face width is inversely proportional to distance; the additive
/// correction absorbs the offset between the lens and the user's eyes
/// measured for the reference camera.
#[derive(Clone, Copy, Debug, Default)]
pub struct DistanceEstimator {
    calibration: CameraCalibration,
}

impl DistanceEstimator {
    pub fn new(calibration: CameraCalibration) -> Self {
        Self { calibration }
    }

    pub fn calibration(&self) -> &CameraCalibration {
        &self.calibration
    }

    /// Builds an observation for a detected face.
    ///
    /// Observations are stamped with the calibration's reference width, not
    /// the capture width: the constants are only meaningful at that width.
    pub fn observe(&self, face: &FaceBox, timestamp: Timestamp) -> FaceObservation {
        FaceObservation {
            bounding_box_width_px: face.width,
            frame_width_px: self.calibration.reference_frame_width_px,
            timestamp,
        }
    }

    pub fn estimate(
        &self,
        observation: &FaceObservation,
    ) -> Result<DistanceEstimate, EstimationError> {
        self.estimate_width(
            observation.bounding_box_width_px,
            observation.frame_width_px,
        )
    }

    pub fn estimate_width(
        &self,
        bounding_box_width_px: i32,
        frame_width_px: u32,
    ) -> Result<DistanceEstimate, EstimationError> {
        if bounding_box_width_px <= 0 || frame_width_px == 0 {
            return Err(EstimationError::InvalidObservation {
                bounding_box_width_px,
                frame_width_px,
            });
        }
        let c = &self.calibration;
        let centimeters = (c.average_face_width_cm * frame_width_px as f64)
            / bounding_box_width_px as f64
            + c.correction_factor_cm;
        Ok(DistanceEstimate { centimeters })
    }
}
