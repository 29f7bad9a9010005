use crossbeam_channel::{Receiver, Sender};

use crate::alerting::domain::alert_sink::{AlertSink, SinkError};
use crate::alerting::domain::close_face_alert::CloseFaceAlert;
use crate::shared::constants::{
    WATCHER_CHANNEL_DESCRIPTION, WATCHER_CHANNEL_ID, WATCHER_CHANNEL_NAME,
    WATCHER_NOTIFICATION_ID, WATCHER_NOTIFICATION_TEXT, WATCHER_NOTIFICATION_TITLE,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotificationChannel {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl Default for NotificationChannel {
    fn default() -> Self {
        Self {
            id: WATCHER_CHANNEL_ID.to_string(),
            name: WATCHER_CHANNEL_NAME.to_string(),
            description: WATCHER_CHANNEL_DESCRIPTION.to_string(),
        }
    }
}

/// The persistent notification shown while the watcher runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WatcherNotification {
    pub channel_id: String,
    pub id: u32,
    pub title: String,
    pub text: String,
}

impl Default for WatcherNotification {
    fn default() -> Self {
        Self {
            channel_id: WATCHER_CHANNEL_ID.to_string(),
            id: WATCHER_NOTIFICATION_ID,
            title: WATCHER_NOTIFICATION_TITLE.to_string(),
            text: WATCHER_NOTIFICATION_TEXT.to_string(),
        }
    }
}

/// Instructions for the host that runs the background watcher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WatcherCommand {
    /// Register the channel (idempotent on the host) and go foreground
    /// with the given notification.
    Start {
        channel: NotificationChannel,
        notification: WatcherNotification,
    },
    Stop {
        notification_id: u32,
    },
}

/// Notify-and-keep-monitoring delivery: the first alert starts a persistent
/// background watcher; later alerts find it running and do nothing.
pub struct BackgroundWatcherSink {
    tx: Sender<WatcherCommand>,
    channel: NotificationChannel,
    notification: WatcherNotification,
    running: bool,
}

impl BackgroundWatcherSink {
    pub fn new() -> (Self, Receiver<WatcherCommand>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let sink = Self {
            tx,
            channel: NotificationChannel::default(),
            notification: WatcherNotification::default(),
            running: false,
        };
        (sink, rx)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl AlertSink for BackgroundWatcherSink {
    fn fire_alert(&mut self, alert: &CloseFaceAlert) -> Result<(), SinkError> {
        if self.running {
            log::debug!("Background watcher already running");
            return Ok(());
        }
        self.tx
            .send(WatcherCommand::Start {
                channel: self.channel.clone(),
                notification: self.notification.clone(),
            })
            .map_err(|_| SinkError::Disconnected)?;
        self.running = true;
        log::info!(
            "Started background watcher (face at {:.1}cm, {})",
            alert.distance_cm,
            alert.timestamp
        );
        Ok(())
    }

    fn shutdown(&mut self) {
        if !self.running {
            return;
        }
        let stop = WatcherCommand::Stop {
            notification_id: self.notification.id,
        };
        if self.tx.send(stop).is_err() {
            log::debug!("Watcher host gone before stop");
        }
        self.running = false;
    }
}
