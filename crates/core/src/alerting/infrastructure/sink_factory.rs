use crossbeam_channel::Receiver;

use crate::alerting::domain::alert_sink::{AlertDelivery, AlertSink};

use super::background_watcher_sink::{BackgroundWatcherSink, WatcherCommand};
use super::blocking_dialog_sink::{BlockingDialogSink, DialogPresenter};

/// Host-facing end of a sink created by [`create_sink`].
pub enum AlertReceiver {
    Watcher(Receiver<WatcherCommand>),
    Dialog(DialogPresenter),
}

/// Creates the sink for the configured delivery variant along with the
/// receiving end the host must service.
pub fn create_sink(delivery: AlertDelivery) -> (Box<dyn AlertSink>, AlertReceiver) {
    log::info!("Using {delivery} alert delivery");
    match delivery {
        AlertDelivery::Watcher => {
            let (sink, rx) = BackgroundWatcherSink::new();
            (Box::new(sink), AlertReceiver::Watcher(rx))
        }
        AlertDelivery::Dialog => {
            let (sink, presenter) = BlockingDialogSink::new();
            (Box::new(sink), AlertReceiver::Dialog(presenter))
        }
    }
}
