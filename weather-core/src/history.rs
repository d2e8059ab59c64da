use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::{model::SearchRecord, storage::KeyValueStore};

/// Storage key holding the JSON array of recent searches.
pub const HISTORY_KEY: &str = "recentSearches";

/// Maximum number of remembered searches.
pub const MAX_ENTRIES: usize = 5;

/// Most-recent-first list of distinct searches, mirrored to a key-value store.
#[derive(Debug)]
pub struct SearchHistory {
    store: Box<dyn KeyValueStore>,
    entries: Vec<SearchRecord>,
}

impl SearchHistory {
    /// Read the persisted history. Missing or unreadable data gives an empty history.
    pub fn load(store: Box<dyn KeyValueStore>) -> Self {
        let entries = match store.get(HISTORY_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<SearchRecord>>(&raw) {
                Ok(mut entries) => {
                    normalize(&mut entries);
                    entries
                }
                Err(e) => {
                    warn!(error = %e, "Ignoring malformed search history");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read search history");
                Vec::new()
            }
        };

        debug!(count = entries.len(), "Loaded search history");
        Self { store, entries }
    }

    pub fn entries(&self) -> &[SearchRecord] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Move `entry` to the front, keep the newest five and persist the result.
    ///
    /// The in-memory list is updated even when persisting fails; the error is returned
    /// for the caller to report.
    pub fn record(&mut self, entry: SearchRecord) -> Result<&[SearchRecord]> {
        self.entries.retain(|e| e != &entry);
        self.entries.insert(0, entry);
        self.entries.truncate(MAX_ENTRIES);

        let json =
            serde_json::to_string(&self.entries).context("Failed to serialize search history")?;
        self.store.set(HISTORY_KEY, &json).context("Failed to persist search history")?;

        Ok(&self.entries)
    }
}

/// Enforce the invariants on data written by someone else.
fn normalize(entries: &mut Vec<SearchRecord>) {
    let mut seen = Vec::with_capacity(entries.len());
    entries.retain(|e| {
        if seen.contains(e) {
            false
        } else {
            seen.push(e.clone());
            true
        }
    });
    entries.truncate(MAX_ENTRIES);
}
