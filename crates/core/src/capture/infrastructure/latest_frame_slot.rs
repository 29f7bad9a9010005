use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};

use crate::capture::domain::frame_lease::FrameLease;
use crate::capture::domain::frame_source::CaptureError;

/// Creates a single-frame hand-off with "keep only latest" backpressure.
///
/// The publisher never blocks: a frame the consumer has not yet taken is
/// discarded (and its lease released) in favour of the newer one.
pub fn latest_frame_slot() -> (FramePublisher, FrameSubscriber) {
    let (tx, rx) = crossbeam_channel::bounded::<FrameLease>(1);
    let dropped = Arc::new(AtomicUsize::new(0));
    let closed = Arc::new(AtomicBool::new(false));
    let publisher = FramePublisher {
        tx,
        stale: rx.clone(),
        dropped: dropped.clone(),
        closed: closed.clone(),
    };
    let subscriber = FrameSubscriber {
        rx,
        dropped,
        closed,
    };
    (publisher, subscriber)
}

pub struct FramePublisher {
    tx: Sender<FrameLease>,
    stale: Receiver<FrameLease>,
    dropped: Arc<AtomicUsize>,
    closed: Arc<AtomicBool>,
}

impl FramePublisher {
    pub fn publish(&self, lease: FrameLease) -> Result<(), CaptureError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(CaptureError::SlotClosed);
        }
        let mut pending = lease;
        loop {
            match self.tx.try_send(pending) {
                Ok(()) => return Ok(()),
                Err(TrySendError::Full(back)) => {
                    if let Ok(stale) = self.stale.try_recv() {
                        self.dropped.fetch_add(1, Ordering::Relaxed);
                        log::trace!("Dropped stale frame {}", stale.index());
                    }
                    pending = back;
                }
                Err(TrySendError::Disconnected(_)) => return Err(CaptureError::SlotClosed),
            }
        }
    }

    pub fn dropped_frames(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

pub struct FrameSubscriber {
    rx: Receiver<FrameLease>,
    dropped: Arc<AtomicUsize>,
    closed: Arc<AtomicBool>,
}

impl FrameSubscriber {
    /// Waits for the next frame. `Disconnected` means the publisher is gone
    /// and every frame has been taken.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<FrameLease, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    pub fn try_recv(&self) -> Option<FrameLease> {
        self.rx.try_recv().ok()
    }

    pub fn dropped_frames(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Drop for FrameSubscriber {
    fn drop(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::clock::Timestamp;
    use crate::shared::frame::Frame;

    fn lease(index: usize) -> FrameLease {
        FrameLease::new(Frame::new(1280, 960, index, Timestamp::from_millis(index as u64)))
    }

    fn tracked_lease(index: usize, released: &Arc<AtomicUsize>) -> FrameLease {
        let released = released.clone();
        FrameLease::with_release(Frame::new(1280, 960, index, Timestamp::ZERO), move |_| {
            released.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_single_frame_passes_through() {
        let (publisher, subscriber) = latest_frame_slot();
        publisher.publish(lease(0)).unwrap();
        assert_eq!(subscriber.try_recv().unwrap().index(), 0);
        assert_eq!(subscriber.dropped_frames(), 0);
    }

    #[test]
    fn test_keeps_only_latest_frame() {
        let (publisher, subscriber) = latest_frame_slot();
        for i in 0..5 {
            publisher.publish(lease(i)).unwrap();
        }

        assert_eq!(subscriber.try_recv().unwrap().index(), 4);
        assert!(subscriber.try_recv().is_none());
        assert_eq!(publisher.dropped_frames(), 4);
    }

    #[test]
    fn test_stale_frames_are_released() {
        let released = Arc::new(AtomicUsize::new(0));
        let (publisher, subscriber) = latest_frame_slot();

        publisher.publish(tracked_lease(0, &released)).unwrap();
        publisher.publish(tracked_lease(1, &released)).unwrap();
        assert_eq!(released.load(Ordering::SeqCst), 1);

        drop(subscriber.try_recv());
        assert_eq!(released.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_publish_after_subscriber_dropped_fails() {
        let (publisher, subscriber) = latest_frame_slot();
        drop(subscriber);
        assert!(matches!(
            publisher.publish(lease(0)),
            Err(CaptureError::SlotClosed)
        ));
    }

    #[test]
    fn test_subscriber_sees_disconnect_after_draining() {
        let (publisher, subscriber) = latest_frame_slot();
        publisher.publish(lease(7)).unwrap();
        drop(publisher);

        let frame = subscriber.recv_timeout(Duration::from_millis(50)).unwrap();
        assert_eq!(frame.index(), 7);
        assert_eq!(
            subscriber.recv_timeout(Duration::from_millis(50)).unwrap_err(),
            RecvTimeoutError::Disconnected
        );
    }

    #[test]
    fn test_empty_slot_times_out() {
        let (_publisher, subscriber) = latest_frame_slot();
        assert_eq!(
            subscriber.recv_timeout(Duration::from_millis(10)).unwrap_err(),
            RecvTimeoutError::Timeout
        );
    }
}
