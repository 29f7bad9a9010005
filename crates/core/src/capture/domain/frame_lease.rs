use std::ops::Deref;

use crate::shared::frame::Frame;

type ReleaseFn = Box<dyn FnOnce(&Frame) + Send>;

/// Scoped ownership of a captured frame.
///
/// Capture backends lend out buffers that must be handed back once the
/// frame has been analysed. The release callback runs exactly once when
/// the lease is dropped, whether detection succeeded, failed, or the frame
/// was discarded as stale.
pub struct FrameLease {
    frame: Frame,
    release: Option<ReleaseFn>,
}

impl FrameLease {
    /// A lease with nothing to release.
    pub fn new(frame: Frame) -> Self {
        Self {
            frame,
            release: None,
        }
    }

    pub fn with_release(frame: Frame, release: impl FnOnce(&Frame) + Send + 'static) -> Self {
        Self {
            frame,
            release: Some(Box::new(release)),
        }
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }
}

impl Deref for FrameLease {
    type Target = Frame;

    fn deref(&self) -> &Frame {
        &self.frame
    }
}

impl Drop for FrameLease {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release(&self.frame);
        }
    }
}

impl std::fmt::Debug for FrameLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameLease")
            .field("frame", &self.frame.index())
            .field("releasable", &self.release.is_some())
            .finish()
    }
}
