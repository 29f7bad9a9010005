use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::alerting::domain::close_face_alert::CloseFaceAlert;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("alert receiver is no longer listening")]
    Disconnected,
    #[error("background watcher failed to start: {0}")]
    WatcherStart(String),
}

/// Domain interface for delivering a fired alert to the user.
///
/// Implementations own any thread marshaling their side effect needs; the
/// policy calls `fire_alert` from the frame-delivery timeline.
pub trait AlertSink: Send {
    fn fire_alert(&mut self, alert: &CloseFaceAlert) -> Result<(), SinkError>;

    /// Called once when the monitoring session ends. Default: no-op.
    fn shutdown(&mut self) {}
}

/// How alerts reach the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertDelivery {
    /// Keep a background watcher with a persistent notification running.
    Watcher,
    /// Show a blocking dialog that must be acknowledged.
    Dialog,
}

impl AlertDelivery {
    pub const ALL: &[AlertDelivery] = &[AlertDelivery::Watcher, AlertDelivery::Dialog];
}

impl std::fmt::Display for AlertDelivery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertDelivery::Watcher => write!(f, "watcher"),
            AlertDelivery::Dialog => write!(f, "dialog"),
        }
    }
}

impl FromStr for AlertDelivery {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "watcher" => Ok(AlertDelivery::Watcher),
            "dialog" => Ok(AlertDelivery::Dialog),
            other => Err(format!(
                "Alert delivery must be 'watcher' or 'dialog', got '{other}'"
            )),
        }
    }
}
