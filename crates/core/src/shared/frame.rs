use crate::shared::clock::Timestamp;

/// A single captured camera frame.
///
/// The monitoring core only needs the frame's geometry and capture time;
/// pixels stay with the host and its detector.
#[derive(Clone, Debug)]
pub struct Frame {
    width: u32,
    height: u32,
    index: usize,
    timestamp: Timestamp,
}

impl Frame {
    pub fn new(width: u32, height: u32, index: usize, timestamp: Timestamp) -> Self {
        Self {
            width,
            height,
            index,
            timestamp,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}
