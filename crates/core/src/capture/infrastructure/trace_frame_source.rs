use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::Deserialize;
use thiserror::Error;

use crate::capture::domain::frame_lease::FrameLease;
use crate::capture::domain::frame_source::{CaptureError, FrameSource};
use crate::detection::domain::face_detector::{DetectionError, DetectionResult};
use crate::shared::clock::Timestamp;
use crate::shared::constants::{REFERENCE_FRAME_HEIGHT_PX, REFERENCE_FRAME_WIDTH_PX};
use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("failed to read trace {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("trace line {line}: {source}")]
    Parse {
        line: usize,
        source: serde_json::Error,
    },
    #[error("trace line {line}: timestamp {timestamp_ms}ms is earlier than the previous frame")]
    OutOfOrder { line: usize, timestamp_ms: u64 },
}

/// One recorded frame: capture time, geometry, and what the detector saw.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TraceRecord {
    pub timestamp_ms: u64,
    #[serde(default)]
    pub frame_width: Option<u32>,
    #[serde(default)]
    pub frame_height: Option<u32>,
    #[serde(default)]
    pub faces: Vec<FaceBox>,
    /// Detector failure reason; takes precedence over `faces`.
    #[serde(default)]
    pub error: Option<String>,
}

/// A recorded monitoring session in JSON-lines form.
///
/// Blank lines and `#` comments are skipped. Timestamps must not decrease.
#[derive(Clone, Debug, Default)]
pub struct Trace {
    records: Vec<TraceRecord>,
}

impl Trace {
    pub fn open(path: &Path) -> Result<Self, TraceError> {
        let file = File::open(path).map_err(|source| TraceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(BufReader::new(file)).map_err(|e| match e {
            TraceError::Io { source, .. } => TraceError::Io {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    pub fn parse(reader: impl BufRead) -> Result<Self, TraceError> {
        let mut records: Vec<TraceRecord> = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line_no = i + 1;
            let line = line.map_err(|source| TraceError::Io {
                path: PathBuf::new(),
                source,
            })?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let record: TraceRecord =
                serde_json::from_str(trimmed).map_err(|source| TraceError::Parse {
                    line: line_no,
                    source,
                })?;
            if let Some(prev) = records.last() {
                if record.timestamp_ms < prev.timestamp_ms {
                    return Err(TraceError::OutOfOrder {
                        line: line_no,
                        timestamp_ms: record.timestamp_ms,
                    });
                }
            }
            records.push(record);
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[TraceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Duration covered by the recording, first to last frame.
    pub fn span_ms(&self) -> u64 {
        match (self.records.first(), self.records.last()) {
            (Some(first), Some(last)) => last.timestamp_ms - first.timestamp_ms,
            _ => 0,
        }
    }

    /// Recorded detector output keyed by frame index.
    pub fn detections(&self) -> HashMap<usize, DetectionResult> {
        self.records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let result = match &record.error {
                    Some(reason) => Err(DetectionError::Failed(reason.clone())),
                    None => Ok(record.faces.clone()),
                };
                (index, result)
            })
            .collect()
    }

    pub fn frame_source(&self, paced: bool) -> TraceFrameSource {
        TraceFrameSource::new(self, paced)
    }
}

/// Replays a [`Trace`]'s frames, optionally at their recorded pace.
pub struct TraceFrameSource {
    frames: Vec<Frame>,
    position: usize,
    paced: bool,
    started: Option<Instant>,
}

impl TraceFrameSource {
    fn new(trace: &Trace, paced: bool) -> Self {
        let frames = trace
            .records
            .iter()
            .enumerate()
            .map(|(index, r)| {
                Frame::new(
                    r.frame_width.unwrap_or(REFERENCE_FRAME_WIDTH_PX),
                    r.frame_height.unwrap_or(REFERENCE_FRAME_HEIGHT_PX),
                    index,
                    Timestamp::from_millis(r.timestamp_ms),
                )
            })
            .collect();
        Self {
            frames,
            position: 0,
            paced,
            started: None,
        }
    }

    fn next_lease(&mut self) -> Option<Result<FrameLease, CaptureError>> {
        let frame = self.frames.get(self.position)?.clone();
        self.position += 1;
        if self.paced {
            self.wait_until(frame.timestamp());
        }
        Some(Ok(FrameLease::new(frame)))
    }

    fn wait_until(&mut self, timestamp: Timestamp) {
        let origin = self.frames[0].timestamp();
        let started = *self.started.get_or_insert_with(Instant::now);
        let offset = Duration::from_millis(timestamp.millis_since(origin).unwrap_or(0));
        let due = started + offset;
        let now = Instant::now();
        if due > now {
            std::thread::sleep(due - now);
        }
    }
}

impl FrameSource for TraceFrameSource {
    fn frames(&mut self) -> Box<dyn Iterator<Item = Result<FrameLease, CaptureError>> + '_> {
        Box::new(std::iter::from_fn(move || self.next_lease()))
    }
}
