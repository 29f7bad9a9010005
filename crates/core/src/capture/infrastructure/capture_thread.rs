use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::capture::domain::frame_source::{CaptureError, FrameSource};

use super::latest_frame_slot::FramePublisher;

/// Runs a frame source on its own thread, feeding the latest-only slot.
///
/// Stops when the source is exhausted, the session is cancelled, or the
/// consumer goes away. Returns the number of frames captured; frames
/// replaced before the consumer took them are counted by the slot.
pub fn spawn_capture(
    mut source: Box<dyn FrameSource>,
    publisher: FramePublisher,
    cancelled: Arc<AtomicBool>,
) -> JoinHandle<Result<usize, CaptureError>> {
    std::thread::spawn(move || {
        let mut captured = 0;
        for lease in source.frames() {
            if cancelled.load(Ordering::Relaxed) {
                log::debug!("Capture cancelled after {captured} frames");
                break;
            }
            match publisher.publish(lease?) {
                Ok(()) => captured += 1,
                Err(CaptureError::SlotClosed) => {
                    log::debug!("Frame consumer closed, stopping capture");
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        log::debug!(
            "Capture finished: {captured} frames, {} dropped",
            publisher.dropped_frames()
        );
        Ok(captured)
    })
}
