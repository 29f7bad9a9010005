use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::alerting::domain::close_face_alert::{AlertDecision, CloseFaceAlert, Proximity};
use crate::estimation::domain::distance_estimator::DistanceEstimate;
use crate::shared::clock::Timestamp;
use crate::shared::constants::{ALERT_INTERVAL_MS, CLOSE_THRESHOLD_CM};

#[derive(Debug, Error, PartialEq)]
pub enum PolicyConfigError {
    #[error("close threshold must be a positive finite distance, got {0}cm")]
    Threshold(f64),
}

/// Missing fields take their defaults when deserialized.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertPolicyConfig {
    pub close_threshold_cm: f64,
    pub alert_interval_ms: u64,
    /// When set, a frame with no close face re-arms the policy immediately
    /// instead of waiting out the interval.
    pub reset_on_far: bool,
}

impl Default for AlertPolicyConfig {
    fn default() -> Self {
        Self {
            close_threshold_cm: CLOSE_THRESHOLD_CM,
            alert_interval_ms: ALERT_INTERVAL_MS,
            reset_on_far: false,
        }
    }
}

impl AlertPolicyConfig {
    /// A non-positive threshold would silently disable alerting.
    pub fn validate(&self) -> Result<(), PolicyConfigError> {
        if !self.close_threshold_cm.is_finite() || self.close_threshold_cm <= 0.0 {
            return Err(PolicyConfigError::Threshold(self.close_threshold_cm));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolicyState {
    Idle,
    Cooldown,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AlertStats {
    pub close_frames: u64,
    pub alerts_fired: u64,
    pub alerts_suppressed: u64,
}

/// Debounced close-face alerting.
///
/// `Idle → Cooldown` on the first close frame (one alert). `Cooldown → Idle`
/// purely by elapsed time once `alert_interval_ms` has passed since the last
/// alert; far frames do not shorten the cooldown unless `reset_on_far` is set.
///
/// The last-alert timestamp never moves backwards. A `now` earlier than it
/// (clock adjustment) counts as still cooling down.
#[derive(Clone, Debug)]
pub struct AlertPolicy {
    config: AlertPolicyConfig,
    last_alert: Option<Timestamp>,
    rearmed: bool,
    stats: AlertStats,
}

impl AlertPolicy {
    pub fn new(config: AlertPolicyConfig) -> Self {
        Self {
            config,
            last_alert: None,
            rearmed: false,
            stats: AlertStats::default(),
        }
    }

    pub fn config(&self) -> &AlertPolicyConfig {
        &self.config
    }

    pub fn last_alert(&self) -> Option<Timestamp> {
        self.last_alert
    }

    pub fn stats(&self) -> AlertStats {
        self.stats
    }

    /// Whether a persistent watcher should keep sampling: true once the
    /// session has seen a close face that raised an alert.
    pub fn watcher_required(&self) -> bool {
        self.stats.alerts_fired > 0
    }

    pub fn state_at(&self, now: Timestamp) -> PolicyState {
        if self.is_armed(now) {
            PolicyState::Idle
        } else {
            PolicyState::Cooldown
        }
    }

    /// Closest estimate strictly below the threshold, if any.
    pub fn closest_close(&self, estimates: &[DistanceEstimate]) -> Option<DistanceEstimate> {
        estimates
            .iter()
            .filter(|e| e.is_closer_than(self.config.close_threshold_cm))
            .copied()
            .reduce(|a, b| if b.centimeters < a.centimeters { b } else { a })
    }

    pub fn classify(&self, estimates: &[DistanceEstimate]) -> Proximity {
        if self.closest_close(estimates).is_some() {
            Proximity::Close
        } else {
            Proximity::Far
        }
    }

    /// Feeds one frame's estimates (empty when no usable face) to the policy.
    pub fn evaluate(&mut self, now: Timestamp, estimates: &[DistanceEstimate]) -> AlertDecision {
        let Some(closest) = self.closest_close(estimates) else {
            if self.config.reset_on_far && self.last_alert.is_some() {
                self.rearmed = true;
            }
            return AlertDecision::Clear;
        };

        self.stats.close_frames += 1;

        if !self.is_armed(now) {
            self.stats.alerts_suppressed += 1;
            log::debug!(
                "Close face at {:.1}cm suppressed, alert cooldown active",
                closest.centimeters
            );
            return AlertDecision::Suppressed;
        }

        let fired_at = match self.last_alert {
            Some(last) => last.max(now),
            None => now,
        };
        self.last_alert = Some(fired_at);
        self.rearmed = false;
        self.stats.alerts_fired += 1;
        log::info!(
            "Face too close ({:.1}cm < {:.1}cm), raising alert",
            closest.centimeters,
            self.config.close_threshold_cm
        );

        AlertDecision::Fired(CloseFaceAlert {
            timestamp: fired_at,
            distance_cm: closest.centimeters,
        })
    }

    fn is_armed(&self, now: Timestamp) -> bool {
        if self.rearmed {
            return true;
        }
        match self.last_alert {
            None => true,
            Some(last) => now
                .millis_since(last)
                .is_some_and(|elapsed| elapsed >= self.config.alert_interval_ms),
        }
    }
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self::new(AlertPolicyConfig::default())
    }
}
