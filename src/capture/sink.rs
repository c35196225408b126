//! Artifact sinks.
//!
//! - `DirectorySink` writes each artifact into a per-run directory under a
//!   base location, with run metadata in `.run.json`
//! - `MemorySink` keeps artifacts in memory behind a shared handle

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use super::utils::{generate_timestamp, sanitize_description};

/// Metadata file written into every run directory
pub const RUN_METADATA_FILE: &str = ".run.json";

/// Destination for captured artifacts
pub trait ArtifactSink: Send {
    /// Store `bytes` under `name`
    fn write(&mut self, name: &str, bytes: &[u8]) -> std::io::Result<()>;

    /// Path an artifact named `name` is stored at, for sinks backed by files
    fn location(&self, _name: &str) -> Option<PathBuf> {
        None
    }
}

/// Writes artifacts into one directory per run
#[derive(Debug, Clone)]
pub struct DirectorySink {
    /// Unique run ID
    pub id: String,
    /// Directory receiving this run's artifacts
    pub dir: PathBuf,
}

impl DirectorySink {
    /// Create a run directory named `<name>_<timestamp>` under `base`
    pub fn with_name(base: impl AsRef<Path>, name: &str) -> Self {
        let id = format!("{}_{}", sanitize_description(name), generate_timestamp());
        let dir = base.as_ref().join(&id);
        Self { id, dir }
    }

    /// Use `dir` as-is
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let id = dir
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "run".to_string());
        Self { id, dir }
    }

    /// Create the directory and write run metadata
    pub fn init(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;

        let host = hostname::get()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        let metadata = serde_json::json!({
            "id": self.id,
            "created": chrono::Utc::now().to_rfc3339(),
            "host": host,
            "pid": std::process::id(),
        });

        let metadata_path = self.dir.join(RUN_METADATA_FILE);
        fs::write(metadata_path, serde_json::to_string_pretty(&metadata)?)?;
        Ok(())
    }

    /// All PNG artifacts in the run directory, sorted by name
    pub fn list_artifacts(&self) -> std::io::Result<Vec<PathBuf>> {
        list_pngs(&self.dir)
    }
}

impl ArtifactSink for DirectorySink {
    fn write(&mut self, name: &str, bytes: &[u8]) -> std::io::Result<()> {
        fs::write(self.dir.join(name), bytes)
    }

    fn location(&self, name: &str) -> Option<PathBuf> {
        Some(self.dir.join(name))
    }
}

/// Keeps artifacts in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    stored: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names written so far, in write order
    pub fn names(&self) -> Vec<String> {
        self.stored
            .lock()
            .map(|stored| stored.iter().map(|(name, _)| name.clone()).collect())
            .unwrap_or_default()
    }
}

impl ArtifactSink for MemorySink {
    fn write(&mut self, name: &str, bytes: &[u8]) -> std::io::Result<()> {
        let mut stored = self
            .stored
            .lock()
            .map_err(|_| std::io::Error::other("memory sink poisoned"))?;
        stored.push((name.to_string(), bytes.to_vec()));
        Ok(())
    }
}

fn list_pngs(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut artifacts = Vec::new();
    if dir.exists() {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().map(|e| e == "png").unwrap_or(false) {
                artifacts.push(path);
            }
        }
    }
    artifacts.sort();
    Ok(artifacts)
}

/// List run directories under `base`, sorted by name
pub fn list_runs(base: &Path) -> std::io::Result<Vec<PathBuf>> {
    if !base.exists() {
        return Ok(Vec::new());
    }

    let mut runs = Vec::new();
    for entry in fs::read_dir(base)? {
        let path = entry?.path();
        if path.is_dir() {
            runs.push(path);
        }
    }
    runs.sort();
    Ok(runs)
}

/// List the PNG artifacts of one run directory
pub fn list_run_artifacts(run_dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    list_pngs(run_dir)
}

/// Remove run directories under `base` last modified more than `max_age` ago
pub fn cleanup_old_runs(base: &Path, max_age: std::time::Duration) -> std::io::Result<usize> {
    let now = SystemTime::now();
    let mut cleaned = 0;

    for run in list_runs(base)? {
        let age = fs::metadata(&run)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| now.duration_since(modified).ok());
        if matches!(age, Some(age) if age > max_age) && fs::remove_dir_all(&run).is_ok() {
            cleaned += 1;
        }
    }

    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_name_sanitizes_id() {
        let sink = DirectorySink::with_name("/tmp/base", "simulated run");
        assert!(sink.id.starts_with("simulated_run_"));
        assert!(sink.dir.starts_with("/tmp/base"));
    }

    #[test]
    fn test_directory_sink_writes_and_lists() {
        let base = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::in_dir(base.path().join("run_1"));
        sink.init().unwrap();

        sink.write("screenshot_02_b_1.png", b"png").unwrap();
        sink.write("screenshot_01_a_1.png", b"png").unwrap();

        let listed = sink.list_artifacts().unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].ends_with("screenshot_01_a_1.png"));
        assert!(sink.dir.join(RUN_METADATA_FILE).exists());
        assert_eq!(
            sink.location("x.png"),
            Some(base.path().join("run_1").join("x.png"))
        );

        let runs = list_runs(base.path()).unwrap();
        assert_eq!(runs, vec![base.path().join("run_1")]);
    }

    #[test]
    fn test_directory_sink_write_fails_without_init() {
        let base = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::in_dir(base.path().join("missing").join("run"));
        assert!(sink.write("a.png", b"png").is_err());
    }

    #[test]
    fn test_memory_sink_clones_share_contents() {
        let sink = MemorySink::new();
        let mut writer = sink.clone();
        writer.write("a.png", &[1, 2, 3]).unwrap();
        assert_eq!(sink.names(), vec!["a.png".to_string()]);
    }

    #[test]
    fn test_cleanup_keeps_recent_runs() {
        let base = tempfile::tempdir().unwrap();
        fs::create_dir_all(base.path().join("recent")).unwrap();
        let cleaned = cleanup_old_runs(base.path(), std::time::Duration::from_secs(3600)).unwrap();
        assert_eq!(cleaned, 0);
        assert!(base.path().join("recent").exists());
    }
}
