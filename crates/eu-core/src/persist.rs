//! Durable diagram storage and debounced write scheduling.
//!
//! Storage is best-effort: loading never fails loudly (garbage or a missing
//! file reads as "no saved diagram") and save errors are logged, not
//! returned to the mutating caller. Writes are debounced so a drag producing
//! hundreds of moves results in one write once the pointer goes quiet.

use crate::error::StorageError;
use crate::model::{Arrow, DiagramData, DrawingPath, Shape};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Fixed key the diagram is stored under.
pub const STORAGE_KEY: &str = "easy-uml-diagram";

// ─── Config ───────────────────────────────────────────────────────────────

/// Persistence settings. Every field may be omitted in JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersistConfig {
    /// Storage key (file stem for `FileStorage`).
    pub key: String,
    /// Quiet period before a scheduled write runs. Default: **300 ms**.
    pub debounce_ms: u64,
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            key: STORAGE_KEY.to_string(),
            debounce_ms: 300,
        }
    }
}

impl PersistConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

// ─── Storage contract ─────────────────────────────────────────────────────

/// The document written to storage: the three collections plus a save time.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedDiagram<'a> {
    pub shapes: &'a [Shape],
    pub arrows: &'a [Arrow],
    pub drawing_paths: &'a [DrawingPath],
    pub timestamp: i64,
}

/// Load/save contract for a durable diagram slot.
pub trait DiagramStorage {
    fn save(&mut self, diagram: &SavedDiagram<'_>) -> Result<(), StorageError>;

    /// The stored diagram, or `None` if nothing usable is stored.
    fn load(&self) -> Option<DiagramData>;
}

/// Parse a stored document, treating any failure as "nothing saved".
pub fn parse_saved(json: &str) -> Option<DiagramData> {
    match serde_json::from_str::<DiagramData>(json) {
        Ok(data) => Some(data),
        Err(e) => {
            log::warn!("failed to load saved diagram: {e}");
            None
        }
    }
}

// ─── File storage ─────────────────────────────────────────────────────────

/// Stores the diagram as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{key}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DiagramStorage for FileStorage {
    fn save(&mut self, diagram: &SavedDiagram<'_>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(diagram)?;
        fs::write(&self.path, json)?;
        log::debug!("saved diagram to {}", self.path.display());
        Ok(())
    }

    fn load(&self) -> Option<DiagramData> {
        match fs::read_to_string(&self.path) {
            Ok(json) => parse_saved(&json),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                log::warn!("failed to read {}: {e}", self.path.display());
                None
            }
        }
    }
}

// ─── Memory storage ───────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct MemorySlot {
    json: Option<String>,
    writes: usize,
}

/// In-memory storage slot. Clones share the same slot, so a host (or test)
/// can keep a handle while the scene owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Rc<RefCell<MemorySlot>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed the slot with raw JSON.
    pub fn with_contents(json: impl Into<String>) -> Self {
        let storage = Self::new();
        storage.slot.borrow_mut().json = Some(json.into());
        storage
    }

    pub fn contents(&self) -> Option<String> {
        self.slot.borrow().json.clone()
    }

    /// Number of completed `save` calls.
    pub fn write_count(&self) -> usize {
        self.slot.borrow().writes
    }
}

impl DiagramStorage for MemoryStorage {
    fn save(&mut self, diagram: &SavedDiagram<'_>) -> Result<(), StorageError> {
        let json = serde_json::to_string(diagram)?;
        let mut slot = self.slot.borrow_mut();
        slot.json = Some(json);
        slot.writes += 1;
        Ok(())
    }

    fn load(&self) -> Option<DiagramData> {
        self.slot.borrow().json.as_deref().and_then(parse_saved)
    }
}

// ─── Debounced writer ─────────────────────────────────────────────────────

/// A storage backend plus a rescheduling write deadline.
pub struct Persistence {
    storage: Box<dyn DiagramStorage>,
    debounce: Duration,
    deadline: Option<Instant>,
}

impl Persistence {
    pub fn new(storage: Box<dyn DiagramStorage>, config: &PersistConfig) -> Self {
        Self {
            storage,
            debounce: config.debounce(),
            deadline: None,
        }
    }

    /// Push the write deadline to `now + debounce`, replacing any earlier one.
    pub fn schedule_at(&mut self, now: Instant) {
        self.deadline = Some(now + self.debounce);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Whether the quiet period has elapsed at `now`.
    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }

    /// Write immediately and clear the deadline. Errors are logged.
    pub fn write(&mut self, diagram: &SavedDiagram<'_>) {
        self.deadline = None;
        if let Err(e) = self.storage.save(diagram) {
            log::warn!("failed to save diagram: {e}");
        }
    }

    pub fn load(&self) -> Option<DiagramData> {
        self.storage.load()
    }
}

impl std::fmt::Debug for Persistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persistence")
            .field("debounce", &self.debounce)
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}
