/// Average adult face width the distance model was tuned against (cm).
pub const AVERAGE_FACE_WIDTH_CM: f64 = 15.0;

/// Empirical offset added to the pinhole estimate (cm).
pub const CORRECTION_FACTOR_CM: f64 = 13.0;

/// Capture width the calibration constants were tuned at.
pub const REFERENCE_FRAME_WIDTH_PX: u32 = 1280;
pub const REFERENCE_FRAME_HEIGHT_PX: u32 = 960;

/// Faces estimated strictly nearer than this are "too close".
pub const CLOSE_THRESHOLD_CM: f64 = 25.0;

/// Minimum spacing between two alerts (one minute).
pub const ALERT_INTERVAL_MS: u64 = 60_000;

pub const WATCHER_CHANNEL_ID: &str = "eye_protection_channel";
pub const WATCHER_CHANNEL_NAME: &str = "Eye Protection Service";
pub const WATCHER_CHANNEL_DESCRIPTION: &str = "Channel for eye protection service";
pub const WATCHER_NOTIFICATION_ID: u32 = 1;
pub const WATCHER_NOTIFICATION_TITLE: &str = "Eye Protection Service";
pub const WATCHER_NOTIFICATION_TEXT: &str = "Monitoring face distance to protect your eyes.";

pub const DIALOG_TITLE: &str = "Warning";
pub const DIALOG_MESSAGE: &str = "Your face is too close to the screen. Please move back.";
pub const DIALOG_ACTION_LABEL: &str = "OK";

pub const SETTINGS_DIR_NAME: &str = "EyeGuard";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
