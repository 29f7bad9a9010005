use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};

use crate::alerting::domain::alert_sink::{AlertSink, SinkError};
use crate::alerting::domain::close_face_alert::CloseFaceAlert;
use crate::shared::constants::{DIALOG_ACTION_LABEL, DIALOG_MESSAGE, DIALOG_TITLE};

#[derive(Clone, Debug, PartialEq)]
pub struct AlertDialog {
    pub title: String,
    pub message: String,
    pub action_label: String,
    /// Whether tapping outside dismisses the dialog. Always false for
    /// close-face alerts.
    pub cancelable: bool,
    pub distance_cm: f64,
}

impl AlertDialog {
    fn close_face(distance_cm: f64) -> Self {
        Self {
            title: DIALOG_TITLE.to_string(),
            message: DIALOG_MESSAGE.to_string(),
            action_label: DIALOG_ACTION_LABEL.to_string(),
            cancelable: false,
            distance_cm,
        }
    }
}

/// Interactive delivery: every fired alert becomes a blocking dialog.
///
/// Dialog requests are marshaled to the UI thread over a channel; the UI
/// side drains them through the paired [`DialogPresenter`].
pub struct BlockingDialogSink {
    tx: Sender<AlertDialog>,
    outstanding: Arc<AtomicUsize>,
}

impl BlockingDialogSink {
    pub fn new() -> (Self, DialogPresenter) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let outstanding = Arc::new(AtomicUsize::new(0));
        let presenter = DialogPresenter {
            rx,
            outstanding: outstanding.clone(),
        };
        (Self { tx, outstanding }, presenter)
    }

    /// Dialogs requested but not yet acknowledged.
    pub fn outstanding_dialogs(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }
}

impl AlertSink for BlockingDialogSink {
    fn fire_alert(&mut self, alert: &CloseFaceAlert) -> Result<(), SinkError> {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        if self
            .tx
            .send(AlertDialog::close_face(alert.distance_cm))
            .is_err()
        {
            self.outstanding.fetch_sub(1, Ordering::SeqCst);
            return Err(SinkError::Disconnected);
        }
        log::info!("Requested close-face dialog ({:.1}cm)", alert.distance_cm);
        Ok(())
    }
}

/// UI-thread end of a [`BlockingDialogSink`].
pub struct DialogPresenter {
    rx: Receiver<AlertDialog>,
    outstanding: Arc<AtomicUsize>,
}

impl DialogPresenter {
    /// Blocks until the next dialog is requested. `None` once the sink is
    /// gone and every request has been shown.
    pub fn show(&self) -> Option<ShownDialog> {
        self.rx.recv().ok().map(|dialog| self.shown(dialog))
    }

    pub fn try_show(&self) -> Option<ShownDialog> {
        self.rx.try_recv().ok().map(|dialog| self.shown(dialog))
    }

    pub fn show_timeout(&self, timeout: Duration) -> Option<ShownDialog> {
        self.rx
            .recv_timeout(timeout)
            .ok()
            .map(|dialog| self.shown(dialog))
    }

    fn shown(&self, dialog: AlertDialog) -> ShownDialog {
        ShownDialog {
            dialog,
            outstanding: self.outstanding.clone(),
        }
    }
}

/// A dialog currently on screen. It closes when acknowledged (or when the
/// UI drops it on teardown).
pub struct ShownDialog {
    dialog: AlertDialog,
    outstanding: Arc<AtomicUsize>,
}

impl ShownDialog {
    pub fn dialog(&self) -> &AlertDialog {
        &self.dialog
    }

    /// A tap outside the dialog. Non-cancelable dialogs stay on screen and
    /// are handed back.
    pub fn tap_outside(self) -> Result<(), ShownDialog> {
        if self.dialog.cancelable {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// The single acknowledgement action.
    pub fn acknowledge(self) {
        log::debug!("Close-face dialog acknowledged");
    }
}

impl Drop for ShownDialog {
    fn drop(&mut self) {
        self.outstanding.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::clock::Timestamp;

    fn alert(distance_cm: f64) -> CloseFaceAlert {
        CloseFaceAlert {
            timestamp: Timestamp::ZERO,
            distance_cm,
        }
    }

    #[test]
    fn test_fire_presents_warning_dialog() {
        let (mut sink, presenter) = BlockingDialogSink::new();

        sink.fire_alert(&alert(21.5)).unwrap();

        let shown = presenter.try_show().unwrap();
        let dialog = shown.dialog();
        assert_eq!(dialog.title, "Warning");
        assert_eq!(
            dialog.message,
            "Your face is too close to the screen. Please move back."
        );
        assert_eq!(dialog.action_label, "OK");
        assert!(!dialog.cancelable);
        assert!((dialog.distance_cm - 21.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_tap_outside_keeps_dialog_open() {
        let (mut sink, presenter) = BlockingDialogSink::new();
        sink.fire_alert(&alert(20.0)).unwrap();

        let shown = presenter.try_show().unwrap();
        let still_shown = shown.tap_outside().unwrap_err();

        assert_eq!(sink.outstanding_dialogs(), 1);
        still_shown.acknowledge();
        assert_eq!(sink.outstanding_dialogs(), 0);
    }

    #[test]
    fn test_outstanding_counts_unacknowledged() {
        let (mut sink, presenter) = BlockingDialogSink::new();
        sink.fire_alert(&alert(20.0)).unwrap();
        sink.fire_alert(&alert(19.0)).unwrap();
        assert_eq!(sink.outstanding_dialogs(), 2);

        presenter.try_show().unwrap().acknowledge();
        assert_eq!(sink.outstanding_dialogs(), 1);
    }

    #[test]
    fn test_show_timeout_delivers_across_threads() {
        let (mut sink, presenter) = BlockingDialogSink::new();
        let handle = std::thread::spawn(move || {
            sink.fire_alert(&alert(18.0)).unwrap();
            sink
        });

        let shown = presenter.show_timeout(Duration::from_secs(5));
        let sink = handle.join().unwrap();

        assert!(shown.is_some());
        drop(shown);
        assert_eq!(sink.outstanding_dialogs(), 0);
    }

    #[test]
    fn test_show_ends_after_sink_dropped() {
        let (mut sink, presenter) = BlockingDialogSink::new();
        sink.fire_alert(&alert(20.0)).unwrap();
        drop(sink);

        presenter.show().unwrap().acknowledge();
        assert!(presenter.show().is_none());
    }

    #[test]
    fn test_no_dialog_when_nothing_fired() {
        let (_sink, presenter) = BlockingDialogSink::new();
        assert!(presenter.try_show().is_none());
    }

    #[test]
    fn test_closed_presenter_is_an_error() {
        let (mut sink, presenter) = BlockingDialogSink::new();
        drop(presenter);
        assert!(matches!(
            sink.fire_alert(&alert(20.0)),
            Err(SinkError::Disconnected)
        ));
        assert_eq!(sink.outstanding_dialogs(), 0);
    }
}
