//! Recognizer registry: predefined recognizers plus custom ones from the store.

use std::sync::Arc;

use parking_lot::RwLock;
use scrubber_core::Result;
use scrubber_store::RecognizerStore;
use tracing::{debug, info, warn};

use crate::predefined;
use crate::recognizer::PatternRecognizer;
use crate::template::AnalyzeTemplate;

struct CustomSet {
    /// Store revision the set was loaded at; `None` before the first load.
    loaded_at: Option<u64>,
    recognizers: Vec<Arc<PatternRecognizer>>,
}

pub struct RecognizerRegistry {
    predefined: Vec<Arc<PatternRecognizer>>,
    store: Option<Arc<RecognizerStore>>,
    custom: RwLock<CustomSet>,
}

impl RecognizerRegistry {
    /// Registry with only the built-in recognizers.
    pub fn new() -> Self {
        Self {
            predefined: predefined::recognizers().into_iter().map(Arc::new).collect(),
            store: None,
            custom: RwLock::new(CustomSet {
                loaded_at: None,
                recognizers: Vec::new(),
            }),
        }
    }

    /// Registry that also serves custom recognizers from `store`.
    pub fn with_store(store: Arc<RecognizerStore>) -> Self {
        Self {
            store: Some(store),
            ..Self::new()
        }
    }

    /// Recognizers selected by `template`.
    ///
    /// Custom recognizers are reloaded whenever the store's revision
    /// differs from the one they were loaded at.
    pub fn recognizers(&self, template: &AnalyzeTemplate) -> Result<Vec<Arc<PatternRecognizer>>> {
        self.refresh()?;

        let custom = self.custom.read();
        let selected = self
            .predefined
            .iter()
            .chain(custom.recognizers.iter())
            .filter(|r| r.language == template.language)
            .filter(|r| template.all_fields || template.fields.iter().any(|f| f.name == r.entity))
            .cloned()
            .collect();
        Ok(selected)
    }

    /// Entity names the registry currently knows about, sorted and deduplicated.
    pub fn entities(&self) -> Result<Vec<String>> {
        self.refresh()?;

        let custom = self.custom.read();
        let mut entities: Vec<String> = self
            .predefined
            .iter()
            .chain(custom.recognizers.iter())
            .map(|r| r.entity.clone())
            .collect();
        entities.sort();
        entities.dedup();
        Ok(entities)
    }

    fn refresh(&self) -> Result<()> {
        let Some(store) = &self.store else {
            return Ok(());
        };

        let revision = store.revision()?;

        if self.custom.read().loaded_at == Some(revision) {
            return Ok(());
        }

        let mut custom = self.custom.write();
        if custom.loaded_at == Some(revision) {
            return Ok(());
        }

        // Revision 0: nothing stored yet.
        let records = if revision == 0 {
            Vec::new()
        } else {
            store.get_all()?
        };

        let mut loaded = Vec::with_capacity(records.len());
        for record in &records {
            match PatternRecognizer::from_record(record) {
                Ok(r) => loaded.push(Arc::new(r)),
                Err(e) => warn!("Skipping custom recognizer '{}': {}", record.name, e),
            }
        }

        if revision != 0 {
            info!("Loaded {} custom recognizers at revision {}", loaded.len(), revision);
        } else {
            debug!("No custom recognizers stored");
        }

        custom.recognizers = loaded;
        custom.loaded_at = Some(revision);
        Ok(())
    }
}

impl Default for RecognizerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrubber_store::{MemoryCache, PatternRecord};

    fn record(name: &str, pattern: &str, entity: &str) -> PatternRecord {
        PatternRecord {
            name: name.into(),
            pattern: pattern.into(),
            entity: entity.into(),
            language: "en".into(),
            score: 0.9,
        }
    }

    fn store() -> Arc<RecognizerStore> {
        Arc::new(RecognizerStore::new(Arc::new(MemoryCache::new())))
    }

    #[test]
    fn test_selects_by_fields() {
        let registry = RecognizerRegistry::new();
        let selected = registry
            .recognizers(&AnalyzeTemplate::with_fields(["EMAIL_ADDRESS", "US_SSN"]))
            .unwrap();
        let mut entities: Vec<_> = selected.iter().map(|r| r.entity.as_str()).collect();
        entities.sort();
        assert_eq!(entities, vec!["EMAIL_ADDRESS", "US_SSN"]);
    }

    #[test]
    fn test_all_fields_and_language() {
        let registry = RecognizerRegistry::new();
        let all = registry.recognizers(&AnalyzeTemplate::all_fields()).unwrap();
        assert_eq!(all.len(), predefined::ENTITIES.len());

        let mut german = AnalyzeTemplate::all_fields();
        german.language = "de".into();
        assert!(registry.recognizers(&german).unwrap().is_empty());
    }

    #[test]
    fn test_custom_recognizers_reload() {
        let store = store();
        let registry = RecognizerRegistry::with_store(store.clone());
        assert!(!registry.entities().unwrap().contains(&"EMPLOYEE_ID".to_string()));

        store.insert(record("EmployeeId", r"EMP-\d+", "EMPLOYEE_ID")).unwrap();

        let selected = registry
            .recognizers(&AnalyzeTemplate::with_fields(["EMPLOYEE_ID"]))
            .unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "EmployeeId");
    }

    #[test]
    fn test_back_to_back_mutations_are_seen() {
        let store = store();
        let registry = RecognizerRegistry::with_store(store.clone());

        store.insert(record("A", r"AAA-\d+", "ENT_A")).unwrap();
        assert!(registry.entities().unwrap().contains(&"ENT_A".to_string()));

        // Same second as the load above.
        store.insert(record("B", r"BBB-\d+", "ENT_B")).unwrap();
        let selected = registry
            .recognizers(&AnalyzeTemplate::with_fields(["ENT_B"]))
            .unwrap();
        assert_eq!(selected.len(), 1);

        store.update(record("B", r"CCC-\d+", "ENT_B")).unwrap();
        let selected = registry
            .recognizers(&AnalyzeTemplate::with_fields(["ENT_B"]))
            .unwrap();
        assert_eq!(selected[0].analyze("CCC-1").len(), 1);

        store.delete("A").unwrap();
        assert!(!registry.entities().unwrap().contains(&"ENT_A".to_string()));
    }

    #[test]
    fn test_invalid_custom_pattern_skipped() {
        let store = store();
        store.insert(record("Broken", "(unclosed", "BROKEN")).unwrap();
        store.insert(record("Ticket", r"TCK-\d+", "TICKET")).unwrap();

        let registry = RecognizerRegistry::with_store(store);
        let entities = registry.entities().unwrap();
        assert!(entities.contains(&"TICKET".to_string()));
        assert!(!entities.contains(&"BROKEN".to_string()));
    }
}
