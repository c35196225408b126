// Core types for diagnostic capture

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A captured screenshot ready to be written to a sink
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Position in the run, starting at 1
    pub sequence: u64,

    /// Human description of the moment captured
    pub description: String,

    /// Unique file name derived from sequence, description and timestamp
    pub name: String,

    /// When the screenshot was taken
    pub timestamp: DateTime<Utc>,

    /// PNG payload
    pub image: Vec<u8>,
}

/// Metadata kept for every artifact of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub sequence: u64,

    pub description: String,

    pub name: String,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    /// Size of the PNG payload in bytes
    pub size: usize,

    /// Image dimensions when the payload could be decoded
    pub dimensions: Option<(u32, u32)>,

    /// Where the sink stored it, if it stores to a path
    pub location: Option<PathBuf>,

    /// False when the sink write failed
    pub persisted: bool,
}

impl ArtifactRecord {
    pub fn from_artifact(artifact: &Artifact) -> Self {
        Self {
            sequence: artifact.sequence,
            description: artifact.description.clone(),
            name: artifact.name.clone(),
            timestamp: artifact.timestamp,
            size: artifact.image.len(),
            dimensions: super::utils::image_dimensions(&artifact.image),
            location: None,
            persisted: false,
        }
    }
}

/// A capture that could not be completed. Logged, never raised.
#[derive(Debug)]
pub enum CaptureFailure {
    /// The page could not produce a screenshot
    Snapshot(String),

    /// The sink rejected the artifact
    Write { name: String, source: std::io::Error },

    /// There is no open session to capture from
    SessionClosed,
}

impl std::fmt::Display for CaptureFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureFailure::Snapshot(msg) => write!(f, "Failed to take screenshot: {}", msg),
            CaptureFailure::Write { name, source } => {
                write!(f, "Failed to save screenshot {}: {}", name, source)
            }
            CaptureFailure::SessionClosed => write!(f, "No open session to capture"),
        }
    }
}

impl std::error::Error for CaptureFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CaptureFailure::Write { source, .. } => Some(source),
            _ => None,
        }
    }
}
