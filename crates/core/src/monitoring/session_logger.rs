use std::collections::HashMap;
use std::time::Instant;

/// Cross-cutting logger for monitoring-session events.
///
/// Decouples the session from specific output mechanisms (stdout, host UI,
/// log crate) so each caller can observe behaviour without changing the
/// decision code.
pub trait SessionLogger: Send {
    /// Report that a frame has been processed.
    fn frame(&mut self, index: usize);

    /// Record how long a named stage took for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time metric (e.g. faces per frame, distance).
    fn metric(&mut self, name: &str, value: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-session summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullSessionLogger;

impl SessionLogger for NullSessionLogger {
    fn frame(&mut self, _index: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Running statistics for one named stage or metric.
///
/// Fixed size regardless of how many samples were recorded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aggregate {
    pub count: u64,
    pub sum: f64,
    pub min: f64,
    pub max: f64,
}

impl Aggregate {
    fn new(value: f64) -> Self {
        Self {
            count: 1,
            sum: value,
            min: value,
            max: value,
        }
    }

    fn record(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// CLI-oriented logger that aggregates per-stage timing and metrics and
/// reports a summary when the session ends.
///
/// Frame progress is logged every `throttle_frames` frames.
pub struct StdoutSessionLogger {
    throttle_frames: usize,
    timings: HashMap<String, Aggregate>,
    metrics: HashMap<String, Aggregate>,
    start_time: Instant,
    frames: usize,
}

impl StdoutSessionLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: HashMap::new(),
            metrics: HashMap::new(),
            start_time: Instant::now(),
            frames: 0,
        }
    }

    /// Returns the formatted summary, or `None` if nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let mut lines = vec![format!(
            "Session summary ({} frames, {:.1}s):",
            self.frames,
            elapsed_ms / 1000.0
        )];

        let mut stages: Vec<_> = self.timings.iter().collect();
        stages.sort_by(|a, b| a.0.cmp(b.0));
        for (stage, t) in stages {
            lines.push(format!(
                "  {stage:12}: avg {:6.2}ms  max {:6.2}ms  total {:7.0}ms",
                t.mean(),
                t.max,
                t.sum
            ));
        }

        let mut names: Vec<_> = self.metrics.iter().collect();
        names.sort_by(|a, b| a.0.cmp(b.0));
        for (name, m) in names {
            lines.push(format!("  {name}: avg {:.1}  min {:.1}", m.mean(), m.min));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&Aggregate> {
        self.timings.get(stage)
    }

    pub fn metrics_for(&self, name: &str) -> Option<&Aggregate> {
        self.metrics.get(name)
    }
}

fn record(table: &mut HashMap<String, Aggregate>, key: &str, value: f64) {
    match table.get_mut(key) {
        Some(aggregate) => aggregate.record(value),
        None => {
            table.insert(key.to_string(), Aggregate::new(value));
        }
    }
}

impl Default for StdoutSessionLogger {
    fn default() -> Self {
        Self::new(30)
    }
}

impl SessionLogger for StdoutSessionLogger {
    fn frame(&mut self, index: usize) {
        self.frames += 1;
        if self.frames % self.throttle_frames == 0 {
            log::info!("Monitoring: {} frames processed (last #{index})", self.frames);
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        record(&mut self.timings, stage, duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        record(&mut self.metrics, name, value);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_null_logger_all_methods_are_noop() {
        let mut logger = NullSessionLogger;
        logger.frame(1);
        logger.timing("estimate", 0.1);
        logger.metric("faces", 1.0);
        logger.info("hello");
        logger.summary();
    }

    #[test]
    fn test_timing_aggregates_values() {
        let mut logger = StdoutSessionLogger::new(10);
        logger.timing("detect", 20.0);
        logger.timing("detect", 30.0);
        logger.timing("decide", 0.5);

        let detect = logger.timings_for("detect").unwrap();
        assert_eq!(detect.count, 2);
        assert_abs_diff_eq!(detect.mean(), 25.0);
        assert_abs_diff_eq!(detect.min, 20.0);
        assert_abs_diff_eq!(detect.max, 30.0);
        assert_eq!(logger.timings_for("decide").unwrap().count, 1);
        assert!(logger.timings_for("missing").is_none());
    }

    #[test]
    fn test_metric_aggregates_values() {
        let mut logger = StdoutSessionLogger::new(10);
        logger.metric("distance_cm", 37.0);
        logger.metric("distance_cm", 22.0);

        let distance = logger.metrics_for("distance_cm").unwrap();
        assert_eq!(distance.count, 2);
        assert_abs_diff_eq!(distance.min, 22.0);
        assert_abs_diff_eq!(distance.sum, 59.0);
    }

    #[test]
    fn test_storage_stays_constant_over_long_session() {
        let mut logger = StdoutSessionLogger::default();
        for i in 0..100_000 {
            logger.frame(i);
            logger.timing("detect", 1.0);
            logger.timing("frame", 2.0);
            logger.metric("distance_cm", 30.0 + (i % 10) as f64);
        }

        assert_eq!(logger.timings.len(), 2);
        assert_eq!(logger.metrics.len(), 1);
        assert_eq!(logger.timings_for("frame").unwrap().count, 100_000);
        let distance = logger.metrics_for("distance_cm").unwrap();
        assert_eq!(distance.count, 100_000);
        assert_abs_diff_eq!(distance.min, 30.0);
        assert_abs_diff_eq!(distance.max, 39.0);
    }

    #[test]
    fn test_summary_includes_stages_and_metrics() {
        let mut logger = StdoutSessionLogger::new(10);
        logger.frame(0);
        logger.frame(1);
        logger.timing("detect", 4.0);
        logger.metric("distance_cm", 37.0);
        logger.metric("distance_cm", 22.0);

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("Session summary (2 frames"));
        assert!(summary.contains("detect"));
        assert!(summary.contains("distance_cm: avg 29.5  min 22.0"));
    }

    #[test]
    fn test_empty_summary_returns_none() {
        let logger = StdoutSessionLogger::new(10);
        assert!(logger.summary_string().is_none());
    }

    #[test]
    fn test_frame_counts_every_call() {
        let mut logger = StdoutSessionLogger::new(10);
        for i in 0..25 {
            logger.frame(i);
        }
        assert_eq!(logger.frames, 25);
    }

    #[test]
    fn test_throttle_is_at_least_one() {
        let logger = StdoutSessionLogger::new(0);
        assert_eq!(logger.throttle_frames, 1);
        assert_eq!(StdoutSessionLogger::default().throttle_frames, 30);
    }
}
