//! Persistent record of which feed entries have already been republished.
//!
//! The state file is a pretty-printed JSON object mapping identity keys to
//! [`PublishRecord`]s. It is rewritten atomically after every record so that
//! a crash right after a publish still finds the entry on the next run.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use relay_core::{FeedEntry, IdentityKey, Outcome, PublishRecord, DESTINATION_SENT_FLAG};
use relay_logging::{relay_debug, relay_info, relay_warn};
use serde::Deserialize;

use crate::persist::{AtomicFileWriter, PersistError};

#[derive(Debug, Clone)]
pub struct DedupStore {
    path: PathBuf,
    records: BTreeMap<IdentityKey, PublishRecord>,
}

impl DedupStore {
    /// An empty store that will persist to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: BTreeMap::new(),
        }
    }

    /// Loads the store from `path`.
    ///
    /// Never fails: a missing file yields an empty store, an unreadable or
    /// malformed one yields an empty store plus a warning. Running on an
    /// emptied store may republish entries, which is logged, not fatal.
    pub fn load(path: impl Into<PathBuf>) -> Outcome<Self> {
        let path = path.into();
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                relay_debug!("No dedup state at {:?}; starting empty", path);
                return Outcome::clean(Self::empty(path));
            }
            Err(err) => {
                let warning = format!("failed to read dedup state from {path:?}: {err}");
                relay_warn!("{}", warning);
                return Outcome::degraded(Self::empty(path), vec![warning]);
            }
        };

        if content.trim().is_empty() {
            return Outcome::clean(Self::empty(path));
        }

        let state: StoredState = match serde_json::from_str(&content) {
            Ok(state) => state,
            Err(err) => {
                let warning = format!(
                    "dedup state at {path:?} is corrupt ({err}); treating as empty, \
                     already published entries may be sent again"
                );
                relay_warn!("{}", warning);
                return Outcome::degraded(Self::empty(path), vec![warning]);
            }
        };

        let records = state.into_records();
        relay_info!("Loaded {} dedup records from {:?}", records.len(), path);
        Outcome::clean(Self { path, records })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, key: &IdentityKey) -> bool {
        self.records.contains_key(key)
    }

    /// Whether `entry` was already published.
    ///
    /// Besides `key`, this accepts a record stored under the entry's title,
    /// which is how title-list state files identified entries.
    pub fn contains_entry(&self, key: &IdentityKey, entry: &FeedEntry) -> bool {
        if self.contains(key) {
            return true;
        }
        let title = entry.title_text();
        if title.is_empty() {
            return false;
        }
        self.records
            .get(&IdentityKey::from_hint(title))
            .is_some_and(|record| record.source_title.trim() == title)
    }

    pub fn get(&self, key: &IdentityKey) -> Option<&PublishRecord> {
        self.records.get(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Inserts `record` unless `key` is already present, then persists the
    /// whole mapping before returning. Returns `false` for an existing key,
    /// in which case nothing is written.
    ///
    /// On a persist error the record stays in memory, so the current run
    /// still will not publish the key again.
    pub fn record(&mut self, key: IdentityKey, record: PublishRecord) -> Result<bool, PersistError> {
        if self.records.contains_key(&key) {
            return Ok(false);
        }
        self.records.insert(key, record);
        self.persist()?;
        Ok(true)
    }

    fn persist(&self) -> Result<(), PersistError> {
        let serializable: BTreeMap<&str, &PublishRecord> = self
            .records
            .iter()
            .map(|(key, record)| (key.as_str(), record))
            .collect();
        let content = serde_json::to_string_pretty(&serializable)?;

        let filename = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| PersistError::OutputDir(format!("invalid state path {:?}", self.path)))?;
        AtomicFileWriter::for_file(&self.path).write(filename, content.as_bytes())?;
        relay_debug!("Persisted {} dedup records to {:?}", self.records.len(), self.path);
        Ok(())
    }
}

/// Shapes the state file has taken over time. New files are always written
/// as [`StoredState::Records`] with full [`PublishRecord`] values.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredState {
    Records(BTreeMap<String, StoredValue>),
    Titles(Vec<String>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredValue {
    Record(PublishRecord),
    Legacy(LegacyRecord),
    Flag(bool),
    Timestamp(f64),
    Destination(String),
}

#[derive(Debug, Deserialize)]
struct LegacyRecord {
    #[serde(default)]
    title_de: String,
    #[serde(default)]
    title_fa: String,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    sent_at: i64,
}

impl StoredState {
    fn into_records(self) -> BTreeMap<IdentityKey, PublishRecord> {
        match self {
            StoredState::Records(map) => map
                .into_iter()
                .map(|(key, value)| (IdentityKey::from_persisted(key), value.into_record()))
                .collect(),
            StoredState::Titles(titles) => titles
                .into_iter()
                .map(|title| {
                    let key = IdentityKey::from_hint(title.trim());
                    let record = PublishRecord {
                        translated_title: String::new(),
                        destination: DESTINATION_SENT_FLAG.to_string(),
                        sent_at: 0,
                        source_link: None,
                        source_title: title,
                    };
                    (key, record)
                })
                .collect(),
        }
    }
}

impl StoredValue {
    fn into_record(self) -> PublishRecord {
        let flag = |sent_at: i64, destination: String| PublishRecord {
            source_title: String::new(),
            translated_title: String::new(),
            destination,
            sent_at,
            source_link: None,
        };
        match self {
            StoredValue::Record(record) => record,
            StoredValue::Legacy(legacy) => PublishRecord {
                source_title: legacy.title_de,
                translated_title: legacy.title_fa,
                destination: DESTINATION_SENT_FLAG.to_string(),
                sent_at: legacy.sent_at,
                source_link: legacy.link.filter(|l| !l.is_empty()),
            },
            StoredValue::Flag(_) => flag(0, DESTINATION_SENT_FLAG.to_string()),
            StoredValue::Timestamp(ts) => flag(ts as i64, DESTINATION_SENT_FLAG.to_string()),
            StoredValue::Destination(url) => flag(0, url),
        }
    }
}
