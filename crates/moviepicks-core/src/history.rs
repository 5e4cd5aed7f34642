use chrono::NaiveDate;
use moviepicks_models::HistoryEntry;
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to read history file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("history file {path} is not valid JSON: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write history file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Append-only record of previously sent items, stored as one JSON array.
///
/// Loading never fails: a missing or corrupt file yields an empty history,
/// and the legacy shape (bare ids) is migrated to dated entries right here so
/// nothing else ever sees it. Persisting is best-effort.
pub struct HistoryStore {
    path: PathBuf,
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    pub fn open(path: PathBuf) -> Self {
        let entries = Self::load(&path);
        Self { path, entries }
    }

    /// In-memory store that is never read from disk; `persist` still writes
    /// to `path`.
    #[cfg(test)]
    pub fn empty(path: PathBuf) -> Self {
        Self {
            path,
            entries: Vec::new(),
        }
    }

    pub fn load(path: &Path) -> Vec<HistoryEntry> {
        match Self::try_load(path) {
            Ok(entries) => {
                debug!(path = %path.display(), entries = entries.len(), "History loaded");
                entries
            }
            Err(e) => {
                warn!(error = %e, "History unreadable, starting with empty history");
                Vec::new()
            }
        }
    }

    fn try_load(path: &Path) -> Result<Vec<HistoryEntry>, PersistenceError> {
        if !path.exists() {
            debug!(path = %path.display(), "History file does not exist");
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(path).map_err(|source| PersistenceError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let document: Value = serde_json::from_str(&content).map_err(|source| PersistenceError::Corrupt {
            path: path.display().to_string(),
            source,
        })?;

        Ok(migrate(document))
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True iff some dated entry for `id` is on or after `cutoff`. Undated
    /// (epoch) entries never block, however early the cutoff.
    pub fn recently_used(&self, id: u64, cutoff: NaiveDate) -> bool {
        self.last_sent(id)
            .filter(|date| *date != HistoryEntry::epoch())
            .map(|date| date >= cutoff)
            .unwrap_or(false)
    }

    /// Most recent send date for `id`; duplicates are resolved here
    pub fn last_sent(&self, id: u64) -> Option<NaiveDate> {
        self.entries
            .iter()
            .filter(|entry| entry.id == id)
            .map(|entry| entry.sent_on)
            .max()
    }

    pub fn append<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = HistoryEntry>,
    {
        self.entries.extend(entries);
    }

    /// Entries newest first (stable for equal dates: later appends first)
    pub fn newest_first(&self, limit: usize) -> Vec<HistoryEntry> {
        let mut entries: Vec<(usize, HistoryEntry)> = self.entries.iter().copied().enumerate().collect();
        entries.sort_by(|(ia, a), (ib, b)| b.sent_on.cmp(&a.sent_on).then(ib.cmp(ia)));
        entries.into_iter().take(limit).map(|(_, entry)| entry).collect()
    }

    /// Full overwrite of the history file. Failures are logged and reported
    /// as `false`; they never propagate.
    pub fn persist(&self) -> bool {
        match self.try_persist() {
            Ok(()) => {
                info!(path = %self.path.display(), entries = self.entries.len(), "History saved");
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to save history; items may be repeated on a later run");
                false
            }
        }
    }

    fn try_persist(&self) -> Result<(), PersistenceError> {
        let write_err = |source| PersistenceError::Write {
            path: self.path.display().to_string(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let content = serde_json::to_string_pretty(&self.entries)?;

        // Atomic write: write to temp file, then rename
        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, content).map_err(write_err)?;
        std::fs::rename(&temp_path, &self.path).map_err(write_err)?;
        Ok(())
    }
}

/// Canonicalize any accepted document shape into dated entries.
///
/// Accepted elements: `{"id": n, "date": "YYYY-MM-DD"}`, `{"id": n}` and bare
/// `n`. Missing or unparseable dates become the epoch so they never block a
/// repeat. Anything else is dropped.
fn migrate(document: Value) -> Vec<HistoryEntry> {
    let Value::Array(items) = document else {
        warn!("History document is not a list, ignoring it");
        return Vec::new();
    };

    let mut entries = Vec::with_capacity(items.len());
    let mut legacy = 0usize;
    let mut dropped = 0usize;

    for item in items {
        match item {
            Value::Number(n) => match n.as_u64() {
                Some(id) => {
                    legacy += 1;
                    entries.push(HistoryEntry::new(id, HistoryEntry::epoch()));
                }
                None => dropped += 1,
            },
            Value::Object(map) => {
                let Some(id) = map.get("id").and_then(Value::as_u64) else {
                    dropped += 1;
                    continue;
                };
                let sent_on = map
                    .get("date")
                    .and_then(Value::as_str)
                    .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
                    .unwrap_or_else(HistoryEntry::epoch);
                entries.push(HistoryEntry::new(id, sent_on));
            }
            _ => dropped += 1,
        }
    }

    if legacy > 0 {
        info!(legacy, "Migrated legacy id-only history entries");
    }
    if dropped > 0 {
        warn!(dropped, "Dropped unrecognized history entries");
    }
    entries
}
