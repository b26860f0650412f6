//! Key-value cache abstraction shared by the recognizer and template stores.

use std::collections::HashMap;

use parking_lot::RwLock;
use scrubber_core::Result;

/// String key-value storage.
///
/// Values are whole serialized records; callers read, modify and write
/// them back. There are no field-level updates.
pub trait Cache: Send + Sync {
    /// Fetch a value. `None` when the key was never set or was deleted.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Insert or overwrite a value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value. Returns true if it existed.
    fn delete(&self, key: &str) -> Result<bool>;

    /// Backend name for logs (e.g., "memory", "sqlite").
    fn name(&self) -> &str;
}

/// Process-local cache. Contents are lost when the process exits.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.entries.write().remove(key).is_some())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
