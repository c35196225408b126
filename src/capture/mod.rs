//! Diagnostic capture: numbered screenshots written to an artifact sink.
//!
//! The sequence counter belongs to a `DiagnosticCapture` instance; one
//! instance is shared by reference across a whole run.

pub mod sink;
pub mod types;
pub mod utils;

pub use sink::{
    ArtifactSink, DirectorySink, MemorySink, RUN_METADATA_FILE, cleanup_old_runs,
    list_run_artifacts, list_runs,
};
pub use types::{Artifact, ArtifactRecord, CaptureFailure};
pub use utils::{artifact_name, generate_timestamp, sanitize_description};

use chrono::Utc;
use tracing::{info, warn};

use crate::page::PageAutomation;

/// Takes screenshots, numbers them and hands them to a sink
pub struct DiagnosticCapture {
    next_sequence: u64,
    sink: Box<dyn ArtifactSink>,
    records: Vec<ArtifactRecord>,
}

impl DiagnosticCapture {
    pub fn new(sink: Box<dyn ArtifactSink>) -> Self {
        Self {
            next_sequence: 1,
            sink,
            records: Vec::new(),
        }
    }

    /// Snapshot the page and store it.
    ///
    /// Failures are logged and returned for inspection; they are not
    /// `HarnessError`s and cannot be propagated with `?`.
    pub fn capture(
        &mut self,
        page: &mut dyn PageAutomation,
        description: &str,
    ) -> Result<ArtifactRecord, CaptureFailure> {
        let image = match page.capture_visual() {
            Ok(image) => image,
            Err(e) => return Err(self.failed(description, CaptureFailure::Snapshot(e.to_string()))),
        };

        let timestamp = Utc::now();
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let artifact = Artifact {
            sequence,
            description: description.to_string(),
            name: artifact_name(sequence, description, &timestamp),
            timestamp,
            image,
        };

        let mut record = ArtifactRecord::from_artifact(&artifact);
        let written = self.sink.write(&artifact.name, &artifact.image);
        record.persisted = written.is_ok();
        record.location = self.sink.location(&artifact.name);
        self.records.push(record.clone());

        match written {
            Ok(()) => {
                info!("Screenshot saved: {}", artifact.name);
                Ok(record)
            }
            Err(source) => Err(self.failed(
                description,
                CaptureFailure::Write {
                    name: artifact.name,
                    source,
                },
            )),
        }
    }

    /// Log a capture that could not happen
    pub fn failed(&self, description: &str, failure: CaptureFailure) -> CaptureFailure {
        warn!(description, "{}", failure);
        failure
    }

    /// Every artifact taken so far, in sequence order
    pub fn records(&self) -> &[ArtifactRecord] {
        &self.records
    }

    /// Sequence number the next artifact will receive
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{PageAutomation, SimulatedBank};
    use std::collections::HashSet;

    struct FailingSink;

    impl ArtifactSink for FailingSink {
        fn write(&mut self, _name: &str, _bytes: &[u8]) -> std::io::Result<()> {
            Err(std::io::Error::other("disk full"))
        }
    }

    fn bank() -> SimulatedBank {
        let mut bank = SimulatedBank::new();
        bank.navigate("index.htm").unwrap();
        bank
    }

    #[test]
    fn test_sequence_starts_at_one_without_gaps() {
        let sink = MemorySink::new();
        let mut capture = DiagnosticCapture::new(Box::new(sink.clone()));
        let mut page = bank();

        for _ in 0..5 {
            capture.capture(&mut page, "same description").unwrap();
        }

        let sequences: Vec<u64> = capture.records().iter().map(|r| r.sequence).collect();
        assert_eq!(sequences, vec![1, 2, 3, 4, 5]);

        let names: HashSet<String> = sink.names().into_iter().collect();
        assert_eq!(names.len(), 5, "identical descriptions must still get unique names");
    }

    #[test]
    fn test_record_carries_png_dimensions() {
        let mut capture = DiagnosticCapture::new(Box::new(MemorySink::new()));
        let record = capture.capture(&mut bank(), "login page loaded").unwrap();
        assert_eq!(record.dimensions, Some((800, 600)));
        assert!(record.name.starts_with("screenshot_01_login_page_loaded_"));
        assert!(record.persisted);
    }

    #[test]
    fn test_sink_failure_is_reported_not_raised() {
        let mut capture = DiagnosticCapture::new(Box::new(FailingSink));
        let mut page = bank();

        let failure = capture.capture(&mut page, "first").unwrap_err();
        assert!(matches!(failure, CaptureFailure::Write { .. }));
        capture.capture(&mut page, "second").unwrap_err();

        let records = capture.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].sequence, 2);
        assert!(records.iter().all(|r| !r.persisted));
    }

    #[test]
    fn test_snapshot_failure_consumes_no_sequence() {
        let mut capture = DiagnosticCapture::new(Box::new(MemorySink::new()));
        let mut broken = SimulatedBank::new().fail_visuals(true);

        let failure = capture.capture(&mut broken, "broken").unwrap_err();
        assert!(matches!(failure, CaptureFailure::Snapshot(_)));
        assert_eq!(capture.next_sequence(), 1);
        assert!(capture.records().is_empty());
    }
}
