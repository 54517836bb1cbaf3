//! Display persistence
//!
//! Only [`DisplayRecord`]s are stored. Frames are fetched again from the
//! record's source on reload.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::display::DisplayRecord;
use crate::error::StoreError;

/// Durable home of the display list
pub trait DisplayStore: Send + Sync + 'static {
    /// Every persisted display
    fn load(&self) -> impl Future<Output = Result<Vec<DisplayRecord>, StoreError>> + Send;

    /// Replace the persisted list with `records`
    fn save(&self, records: &[DisplayRecord]) -> impl Future<Output = Result<(), StoreError>> + Send;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    displays: Vec<DisplayRecord>,
}

/// Pretty-printed JSON file, replaced atomically on every save
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "displays.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl DisplayStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<DisplayRecord>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No display file yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
        tracing::debug!(
            path = %self.path.display(),
            displays = snapshot.displays.len(),
            "Loaded display file"
        );
        Ok(snapshot.displays)
    }

    async fn save(&self, records: &[DisplayRecord]) -> Result<(), StoreError> {
        let snapshot = Snapshot {
            displays: records.to_vec(),
        };
        let json = serde_json::to_vec_pretty(&snapshot)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, &json).await?;
        tokio::fs::rename(&temp, &self.path).await?;

        tracing::debug!(
            path = %self.path.display(),
            displays = records.len(),
            "Saved display file"
        );
        Ok(())
    }
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<DisplayRecord>>,
    saves: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with records
    pub fn with_records(records: Vec<DisplayRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Default::default()
        }
    }

    /// Current contents
    pub fn records(&self) -> Vec<DisplayRecord> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::Relaxed)
    }

    /// Make saves fail with an I/O error
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }
}

impl DisplayStore for MemoryStore {
    async fn load(&self) -> Result<Vec<DisplayRecord>, StoreError> {
        Ok(self.records())
    }

    async fn save(&self, records: &[DisplayRecord]) -> Result<(), StoreError> {
        if self.failing.load(Ordering::Relaxed) {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "store unavailable",
            )));
        }

        *self.records.lock().unwrap_or_else(|e| e.into_inner()) = records.to_vec();
        self.saves.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
