//! Custom recognizer store.
//!
//! All records live as one JSON array under a single key; every mutation
//! reads the array, changes it and writes it back together with a fresh
//! last-update timestamp and a bumped revision counter.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::cache::Cache;
use crate::types::PatternRecord;
use scrubber_core::{Error, Result};

pub const RECOGNIZERS_KEY: &str = "custom_recognizers";
pub const TIMESTAMP_KEY: &str = "custom_recognizers:last_update";
pub const REVISION_KEY: &str = "custom_recognizers:revision";

/// CRUD over custom recognizers.
pub struct RecognizerStore {
    cache: Arc<dyn Cache>,
    /// Serializes read-modify-write cycles.
    write_lock: Mutex<()>,
}

impl RecognizerStore {
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self {
            cache,
            write_lock: Mutex::new(()),
        }
    }

    /// Add a recognizer. Fails if one with the same name exists.
    pub fn insert(&self, record: PatternRecord) -> Result<()> {
        let _guard = self.write_lock.lock();
        let mut records = self.load()?;
        if records.iter().any(|r| r.name == record.name) {
            return Err(Error::AlreadyExists(format!(
                "custom pattern recognizer with name '{}' already exists",
                record.name
            )));
        }
        info!("Inserting recognizer '{}'", record.name);
        records.push(record);
        self.save(&records)
    }

    /// Replace an existing recognizer. Fails if the name is unknown.
    pub fn update(&self, record: PatternRecord) -> Result<()> {
        let _guard = self.write_lock.lock();
        let mut records = self.load()?;
        let existing = records
            .iter_mut()
            .find(|r| r.name == record.name)
            .ok_or_else(|| not_found(&record.name))?;
        info!("Updating recognizer '{}'", record.name);
        *existing = record;
        self.save(&records)
    }

    /// Fetch one recognizer by name.
    pub fn get(&self, name: &str) -> Result<PatternRecord> {
        self.load()?
            .into_iter()
            .find(|r| r.name == name)
            .ok_or_else(|| not_found(name))
    }

    /// All stored recognizers, in insertion order.
    pub fn get_all(&self) -> Result<Vec<PatternRecord>> {
        self.load()
    }

    /// Remove a recognizer. Fails if the name is unknown.
    pub fn delete(&self, name: &str) -> Result<()> {
        let _guard = self.write_lock.lock();
        let mut records = self.load()?;
        let before = records.len();
        records.retain(|r| r.name != name);
        if records.len() == before {
            warn!("Recognizer '{}' not found for deletion", name);
            return Err(not_found(name));
        }
        info!("Deleted recognizer '{}'", name);
        self.save(&records)
    }

    /// Unix seconds of the last mutation.
    pub fn last_update_timestamp(&self) -> Result<u64> {
        let raw = self
            .cache
            .get(TIMESTAMP_KEY)?
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::NotFound("last update timestamp".into()))?;
        raw.parse()
            .map_err(|_| Error::Storage(format!("corrupt last update timestamp '{}'", raw)))
    }

    /// Number of mutations so far; 0 when nothing was ever stored.
    /// Unlike the timestamp, it changes on every mutation.
    pub fn revision(&self) -> Result<u64> {
        match self.cache.get(REVISION_KEY)? {
            Some(raw) if !raw.is_empty() => raw
                .parse()
                .map_err(|_| Error::Storage(format!("corrupt recognizer revision '{}'", raw))),
            _ => Ok(0),
        }
    }

    fn load(&self) -> Result<Vec<PatternRecord>> {
        match self.cache.get(RECOGNIZERS_KEY)? {
            Some(raw) if !raw.is_empty() => serde_json::from_str(&raw)
                .map_err(|e| Error::Storage(format!("corrupt recognizer data: {}", e))),
            _ => Ok(Vec::new()),
        }
    }

    // Callers hold `write_lock`.
    fn save(&self, records: &[PatternRecord]) -> Result<()> {
        let raw = serde_json::to_string(records)?;
        self.cache.set(RECOGNIZERS_KEY, &raw)?;
        let now = chrono::Utc::now().timestamp().max(0);
        self.cache.set(TIMESTAMP_KEY, &now.to_string())?;
        let revision = self.revision()? + 1;
        self.cache.set(REVISION_KEY, &revision.to_string())
    }
}

fn not_found(name: &str) -> Error {
    Error::NotFound(format!(
        "custom pattern recognizer with name '{}' was not found",
        name
    ))
}
