//! Run summary and machine-readable output.

use crate::error::Error;
use crate::video::VideoGeometry;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Version of the JSON envelope layout.
pub const ENVELOPE_VERSION: &str = "1.0";

/// Counters collected while annotating one video.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Input stream geometry.
    pub geometry: VideoGeometry,
    /// Frames read from the input (and written to the output).
    pub frames_read: u64,
    /// Frames the detector ran on.
    pub frames_analyzed: u64,
    /// Indices of frames that raised an alert.
    pub alerted_frames: Vec<u64>,
    /// Boxes drawn per watched label.
    pub detections_by_label: BTreeMap<String, u64>,
    /// Wall-clock time of the run in seconds.
    pub elapsed_secs: f64,
    /// Annotated video location, once committed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

impl RunSummary {
    /// Empty summary for a stream of the given geometry.
    pub fn new(geometry: VideoGeometry) -> Self {
        Self {
            geometry,
            frames_read: 0,
            frames_analyzed: 0,
            alerted_frames: Vec::new(),
            detections_by_label: BTreeMap::new(),
            elapsed_secs: 0.0,
            output: None,
        }
    }

    /// Boxes drawn across all labels.
    pub fn boxes_drawn(&self) -> u64 {
        self.detections_by_label.values().sum()
    }

    pub(crate) fn record_detection(&mut self, label: &str) {
        *self
            .detections_by_label
            .entry(label.to_string())
            .or_insert(0) += 1;
    }
}

/// Kind of event carried by a [`JsonEnvelope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// Annotation finished.
    Result,
    /// Annotation failed.
    Error,
}

/// Wrapper for everything printed with `--json`.
#[derive(Debug, Serialize)]
pub struct JsonEnvelope<T> {
    /// Envelope layout version.
    pub spec_version: &'static str,
    /// When the event was produced.
    pub timestamp: DateTime<Utc>,
    /// Event kind.
    pub event: EventType,
    /// Event payload.
    pub payload: T,
}

impl<T: Serialize> JsonEnvelope<T> {
    /// Wrap `payload` with the current time.
    pub fn new(event: EventType, payload: T) -> Self {
        Self {
            spec_version: ENVELOPE_VERSION,
            timestamp: Utc::now(),
            event,
            payload,
        }
    }

    /// Serialize to a single JSON line.
    pub fn to_json(&self) -> crate::Result<String> {
        serde_json::to_string(self).map_err(|e| Error::SummarySerialize { source: e })
    }
}

/// Payload of an [`EventType::Error`] event.
#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    /// Broad error category.
    pub category: String,
    /// Human-readable message.
    pub message: String,
}

impl From<&Error> for ErrorPayload {
    fn from(error: &Error) -> Self {
        Self {
            category: format!("{:?}", error.category()).to_lowercase(),
            message: error.to_string(),
        }
    }
}
