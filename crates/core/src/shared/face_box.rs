use serde::{Deserialize, Serialize};

/// Axis-aligned face bounding box as reported by a detector, in pixels.
///
/// Components are signed: detectors occasionally emit boxes with zero or
/// negative extent, and those must reach the estimator so it can reject
/// them explicitly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl FaceBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}
