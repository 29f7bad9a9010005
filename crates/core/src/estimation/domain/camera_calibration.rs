use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::constants::{
    AVERAGE_FACE_WIDTH_CM, CORRECTION_FACTOR_CM, REFERENCE_FRAME_WIDTH_PX,
};

#[derive(Debug, Error, PartialEq)]
pub enum CalibrationError {
    #[error("average face width must be a positive finite number, got {0}")]
    FaceWidth(f64),
    #[error("correction factor must be finite, got {0}")]
    CorrectionFactor(f64),
    #[error("reference frame width must be positive")]
    ReferenceWidth,
}

/// Empirical constants for the pinhole distance model.
///
/// The defaults were tuned for one front camera at 1280px capture width.
/// They are not physically derived; recalibrating changes every estimate.
/// Missing fields take their defaults when deserialized.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraCalibration {
    pub average_face_width_cm: f64,
    pub correction_factor_cm: f64,
    pub reference_frame_width_px: u32,
}

impl Default for CameraCalibration {
    fn default() -> Self {
        Self {
            average_face_width_cm: AVERAGE_FACE_WIDTH_CM,
            correction_factor_cm: CORRECTION_FACTOR_CM,
            reference_frame_width_px: REFERENCE_FRAME_WIDTH_PX,
        }
    }
}

impl CameraCalibration {
    pub fn validate(&self) -> Result<(), CalibrationError> {
        if !self.average_face_width_cm.is_finite() || self.average_face_width_cm <= 0.0 {
            return Err(CalibrationError::FaceWidth(self.average_face_width_cm));
        }
        if !self.correction_factor_cm.is_finite() {
            return Err(CalibrationError::CorrectionFactor(self.correction_factor_cm));
        }
        if self.reference_frame_width_px == 0 {
            return Err(CalibrationError::ReferenceWidth);
        }
        Ok(())
    }
}
