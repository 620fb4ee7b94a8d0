// JobPulse - app/loader.rs
//
// Dataset loading: reads the CSV source, decodes it, normalises it, and
// turns every table-level failure into data (empty table + LoadError).
// DatasetCache memoises outcomes per input identity so repeated loads of an
// unchanged source reuse the earlier result.

use crate::core::model::NormalizedTable;
use crate::core::normalizer::{normalize, NormalizeConfig};
use crate::core::reader::read_raw_table;
use crate::platform::fs;
use crate::util::error::LoadError;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// Result of one dataset load. `error` is `Some` only for table-level
/// failures, in which case `table` is empty.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub table: Arc<NormalizedTable>,
    pub error: Option<LoadError>,
}

impl LoadOutcome {
    fn failed(error: LoadError) -> Self {
        Self {
            table: Arc::new(NormalizedTable::empty()),
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Load and normalise the CSV dataset at `path`.
///
/// Never fails: a missing source yields `SourceNotFound`, any other read,
/// encoding, or tokenising failure yields `LoadFailure` with the cause text.
pub fn load_dataset(path: &Path, config: &NormalizeConfig) -> LoadOutcome {
    let bytes = match fs::read_bytes(path) {
        Ok(b) => b,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "CSV source not found");
            return LoadOutcome::failed(LoadError::SourceNotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "CSV source unreadable");
            return LoadOutcome::failed(LoadError::LoadFailure {
                path: path.to_path_buf(),
                cause: e.to_string(),
            });
        }
    };

    let raw = match read_raw_table(bytes.as_slice()) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "CSV source could not be decoded");
            return LoadOutcome::failed(LoadError::LoadFailure {
                path: path.to_path_buf(),
                cause: e.to_string(),
            });
        }
    };

    let table = normalize(&raw, config);
    tracing::info!(
        path = %path.display(),
        records = table.len(),
        degraded_fields = table.stats().total_failures(),
        "Loaded records from CSV"
    );

    LoadOutcome {
        table: Arc::new(table),
        error: None,
    }
}

/// Identity of one load: the source path, its modification time when it
/// exists, and the options that change the normalised result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SourceKey {
    path: PathBuf,
    modified: Option<SystemTime>,
    day_first: bool,
    max_field_failures: usize,
}

impl SourceKey {
    fn same_options(&self, other: &SourceKey) -> bool {
        self.path == other.path
            && self.day_first == other.day_first
            && self.max_field_failures == other.max_field_failures
    }
}

/// Memoises load outcomes. Outcomes, including failures, are reused until
/// the source's modification time changes.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<SourceKey, LoadOutcome>,
    hits: u64,
    misses: u64,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load through the cache.
    pub fn load(&mut self, path: &Path, config: &NormalizeConfig) -> LoadOutcome {
        let key = SourceKey {
            path: path.to_path_buf(),
            modified: fs::modified_time(path),
            day_first: config.day_first,
            max_field_failures: config.max_field_failures,
        };

        if let Some(outcome) = self.entries.get(&key) {
            self.hits += 1;
            tracing::debug!(path = %path.display(), "Dataset served from cache");
            return outcome.clone();
        }

        self.misses += 1;
        // Older versions of the same source are never asked for again.
        self.entries.retain(|k, _| !k.same_options(&key));
        let outcome = load_dataset(path, config);
        self.entries.insert(key, outcome.clone());
        outcome
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
