use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::RecvTimeoutError;
use thiserror::Error;

use crate::alerting::domain::alert_policy::{
    AlertPolicy, AlertPolicyConfig, AlertStats, PolicyConfigError,
};
use crate::alerting::domain::alert_sink::AlertSink;
use crate::alerting::domain::close_face_alert::{AlertDecision, Proximity};
use crate::capture::domain::frame_source::{CaptureError, FrameSource};
use crate::capture::infrastructure::capture_thread::spawn_capture;
use crate::capture::infrastructure::latest_frame_slot::{latest_frame_slot, FrameSubscriber};
use crate::detection::domain::face_detector::FaceDetector;
use crate::estimation::domain::camera_calibration::{CalibrationError, CameraCalibration};
use crate::estimation::domain::distance_estimator::{DistanceEstimate, DistanceEstimator};
use crate::shared::clock::{Clock, Timestamp};
use crate::shared::frame::Frame;

use super::session_logger::SessionLogger;

const LIVE_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Camera permission denied")]
    PermissionDenied,
    #[error("invalid camera calibration: {0}")]
    Calibration(#[from] CalibrationError),
    #[error("invalid alert policy: {0}")]
    Policy(#[from] PolicyConfigError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
}

/// What the session made of one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameReport {
    pub index: usize,
    /// Decision time fed to the policy.
    pub timestamp: Timestamp,
    pub faces_detected: usize,
    /// Estimates for the faces that produced a usable distance.
    pub estimates: Vec<DistanceEstimate>,
    pub proximity: Proximity,
    pub decision: AlertDecision,
}

impl FrameReport {
    pub fn min_distance_cm(&self) -> Option<f64> {
        self.estimates
            .iter()
            .map(|e| e.centimeters)
            .min_by(f64::total_cmp)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub frames_processed: u64,
    /// Frames replaced in the latest-only slot before they were processed.
    pub frames_dropped: u64,
    pub faces_detected: u64,
    pub invalid_faces: u64,
    pub detector_failures: u64,
    pub sink_failures: u64,
    pub alerts: AlertStats,
    pub watcher_required: bool,
}

/// Runs face detection, distance estimation and alert throttling over a
/// stream of frames, delivering fired alerts to a sink.
///
/// One session owns one [`AlertPolicy`]; its cooldown state lives exactly as
/// long as the session. Cancelling the shared flag stops `run`/`run_live`
/// after the frame in hand.
///
/// Runs stream each [`FrameReport`] to a callback instead of collecting
/// them, so a session can monitor indefinitely in constant memory.
pub struct MonitoringSession {
    detector: Box<dyn FaceDetector>,
    estimator: DistanceEstimator,
    policy: AlertPolicy,
    sink: Box<dyn AlertSink>,
    logger: Box<dyn SessionLogger>,
    clock: Option<Box<dyn Clock>>,
    cancelled: Arc<AtomicBool>,
    warned_frame_width: bool,
    summary: SessionSummary,
}

impl MonitoringSession {
    pub fn new(
        detector: Box<dyn FaceDetector>,
        calibration: CameraCalibration,
        policy: AlertPolicyConfig,
        sink: Box<dyn AlertSink>,
        logger: Box<dyn SessionLogger>,
        cancelled: Option<Arc<AtomicBool>>,
    ) -> Result<Self, SessionError> {
        calibration.validate()?;
        policy.validate()?;
        Ok(Self {
            detector,
            estimator: DistanceEstimator::new(calibration),
            policy: AlertPolicy::new(policy),
            sink,
            logger,
            clock: None,
            cancelled: cancelled.unwrap_or_else(|| Arc::new(AtomicBool::new(false))),
            warned_frame_width: false,
            summary: SessionSummary::default(),
        })
    }

    /// Takes decision time from `clock` when each frame is processed,
    /// instead of the frame's capture timestamp.
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn policy(&self) -> &AlertPolicy {
        &self.policy
    }

    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            alerts: self.policy.stats(),
            watcher_required: self.policy.watcher_required(),
            ..self.summary
        }
    }

    pub fn process_frame(&mut self, frame: &Frame) -> FrameReport {
        let started = Instant::now();
        self.logger.frame(frame.index());
        self.check_frame_width(frame);

        let faces = match self.detector.detect(frame) {
            Ok(faces) => faces,
            Err(e) => {
                self.summary.detector_failures += 1;
                log::warn!("Face detection failed on frame {}: {e}", frame.index());
                Vec::new()
            }
        };
        self.logger
            .timing("detect", started.elapsed().as_secs_f64() * 1000.0);

        if faces.is_empty() {
            log::debug!("No faces detected");
        } else {
            log::debug!("{} faces detected", faces.len());
        }
        self.summary.faces_detected += faces.len() as u64;

        let now = self.decision_time(frame);
        let mut estimates = Vec::with_capacity(faces.len());
        for face in &faces {
            let observation = self.estimator.observe(face, now);
            match self.estimator.estimate(&observation) {
                Ok(estimate) => estimates.push(estimate),
                Err(e) => {
                    self.summary.invalid_faces += 1;
                    log::debug!("Ignoring face on frame {}: {e}", frame.index());
                }
            }
        }
        for estimate in &estimates {
            self.logger.metric("distance_cm", estimate.centimeters);
        }

        let decision = self.policy.evaluate(now, &estimates);
        if let Some(alert) = decision.fired() {
            self.logger.info(&format!(
                "Close-face alert on frame {} ({:.1}cm)",
                frame.index(),
                alert.distance_cm
            ));
            if let Err(e) = self.sink.fire_alert(alert) {
                self.summary.sink_failures += 1;
                log::warn!("Failed to deliver close-face alert: {e}");
            }
        }

        self.summary.frames_processed += 1;
        self.logger
            .timing("frame", started.elapsed().as_secs_f64() * 1000.0);

        FrameReport {
            index: frame.index(),
            timestamp: now,
            faces_detected: faces.len(),
            estimates,
            proximity: decision.proximity(),
            decision,
        }
    }

    /// Processes every frame of `source` on the calling thread. Returns the
    /// number of frames processed.
    pub fn run(
        &mut self,
        source: &mut dyn FrameSource,
        mut on_report: impl FnMut(&FrameReport),
    ) -> Result<u64, SessionError> {
        let mut frames = source.frames();
        let mut processed = 0;
        // Checked before pulling: a paced source sleeps inside `next`.
        while !self.is_cancelled() {
            let Some(lease) = frames.next() else {
                break;
            };
            let lease = lease?;
            on_report(&self.process_frame(&lease));
            processed += 1;
        }
        Ok(processed)
    }

    /// Processes frames from a latest-only slot until the publisher goes away
    /// or the session is cancelled. Frames replaced in the slot are skipped.
    pub fn run_live(
        &mut self,
        subscriber: &FrameSubscriber,
        mut on_report: impl FnMut(&FrameReport),
    ) -> u64 {
        let mut processed = 0;
        while !self.is_cancelled() {
            match subscriber.recv_timeout(LIVE_POLL_INTERVAL) {
                Ok(lease) => {
                    on_report(&self.process_frame(&lease));
                    processed += 1;
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        self.summary.frames_dropped = subscriber.dropped_frames() as u64;
        processed
    }

    /// Captures from `source` on its own thread and processes the latest
    /// frame whenever the session is free.
    pub fn run_threaded(
        &mut self,
        source: Box<dyn FrameSource>,
        on_report: impl FnMut(&FrameReport),
    ) -> Result<u64, SessionError> {
        let (publisher, subscriber) = latest_frame_slot();
        let capture = spawn_capture(source, publisher, self.cancelled.clone());

        let processed = self.run_live(&subscriber, on_report);
        drop(subscriber);

        let captured = capture
            .join()
            .map_err(|_| CaptureError::Device("capture thread panicked".into()))??;
        log::debug!("Captured {captured} frames, processed {processed}");
        Ok(processed)
    }

    /// Ends the session: stops the sink and reports what happened.
    pub fn finish(mut self) -> SessionSummary {
        self.sink.shutdown();
        self.logger.summary();
        let summary = self.summary();
        log::info!(
            "Monitoring stopped: {} frames, {} alerts, {} suppressed",
            summary.frames_processed,
            summary.alerts.alerts_fired,
            summary.alerts.alerts_suppressed
        );
        summary
    }

    fn decision_time(&self, frame: &Frame) -> Timestamp {
        match &self.clock {
            Some(clock) => clock.now(),
            None => frame.timestamp(),
        }
    }

    fn check_frame_width(&mut self, frame: &Frame) {
        let reference = self.estimator.calibration().reference_frame_width_px;
        if !self.warned_frame_width && frame.width() != reference {
            self.warned_frame_width = true;
            log::warn!(
                "Capture width {}px differs from calibrated {reference}px, distance estimates may be inaccurate",
                frame.width()
            );
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}
