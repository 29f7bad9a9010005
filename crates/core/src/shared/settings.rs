use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::alerting::domain::alert_policy::AlertPolicyConfig;
use crate::alerting::domain::alert_sink::AlertDelivery;
use crate::estimation::domain::camera_calibration::CameraCalibration;
use crate::shared::constants::{SETTINGS_DIR_NAME, SETTINGS_FILE_NAME};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("no configuration directory available on this platform")]
    NoConfigDir,
    #[error("failed to write settings to {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// User-tunable configuration, persisted as JSON.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub calibration: CameraCalibration,
    #[serde(default)]
    pub policy: AlertPolicyConfig,
    #[serde(default = "default_delivery")]
    pub delivery: AlertDelivery,
}

fn default_delivery() -> AlertDelivery {
    AlertDelivery::Watcher
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            calibration: CameraCalibration::default(),
            policy: AlertPolicyConfig::default(),
            delivery: default_delivery(),
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(SETTINGS_DIR_NAME).join(SETTINGS_FILE_NAME))
    }

    /// Loads from the platform config directory, falling back to defaults.
    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Loads from `path`. A missing file yields defaults silently; an
    /// unreadable or malformed one yields defaults with a warning.
    pub fn load_from(path: &Path) -> Self {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                log::warn!("Could not read settings {}: {e}", path.display());
                return Self::default();
            }
        };
        match serde_json::from_str(&json) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring malformed settings {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<PathBuf, SettingsError> {
        let path = Self::config_path().ok_or(SettingsError::NoConfigDir)?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        let io_err = |source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(io_err)?;
        log::debug!("Saved settings to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_matches_calibrated_constants() {
        let s = Settings::default();
        assert_eq!(s.calibration.average_face_width_cm, 15.0);
        assert_eq!(s.calibration.correction_factor_cm, 13.0);
        assert_eq!(s.calibration.reference_frame_width_px, 1280);
        assert_eq!(s.policy.close_threshold_cm, 25.0);
        assert_eq!(s.policy.alert_interval_ms, 60_000);
        assert!(!s.policy.reset_on_far);
        assert_eq!(s.delivery, AlertDelivery::Watcher);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("EyeGuard").join("settings.json");
        let mut settings = Settings::default();
        settings.delivery = AlertDelivery::Dialog;
        settings.policy.reset_on_far = true;
        settings.policy.alert_interval_ms = 5_000;

        settings.save_to(&path).unwrap();

        assert_eq!(Settings::load_from(&path), settings);
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = TempDir::new().unwrap();
        let loaded = Settings::load_from(&dir.path().join("absent.json"));
        assert_eq!(loaded, Settings::default());
    }

    #[test]
    fn test_malformed_file_loads_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_partial_file_fills_missing_sections() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"delivery": "dialog"}"#).unwrap();

        let loaded = Settings::load_from(&path);

        assert_eq!(loaded.delivery, AlertDelivery::Dialog);
        assert_eq!(loaded.calibration, CameraCalibration::default());
        assert_eq!(loaded.policy, AlertPolicyConfig::default());
    }

    #[test]
    fn test_partial_section_keeps_user_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{"delivery":"dialog","policy":{"alert_interval_ms":5000},"calibration":{"reference_frame_width_px":640}}"#,
        )
        .unwrap();

        let loaded = Settings::load_from(&path);

        assert_eq!(loaded.delivery, AlertDelivery::Dialog);
        assert_eq!(loaded.policy.alert_interval_ms, 5_000);
        assert_eq!(loaded.policy.close_threshold_cm, 25.0);
        assert_eq!(loaded.calibration.reference_frame_width_px, 640);
        assert_eq!(loaded.calibration.average_face_width_cm, 15.0);
    }

    #[test]
    fn test_save_into_file_path_parent_fails() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        let err = Settings::default()
            .save_to(&blocker.join("settings.json"))
            .unwrap_err();

        assert!(matches!(err, SettingsError::Io { .. }));
    }
}
