//! Template store: analyze/anonymize templates per project.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cache::Cache;
use scrubber_core::{Error, Result};

/// Which stage a template configures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateAction {
    Analyze,
    Anonymize,
}

impl TemplateAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Analyze => "analyze",
            Self::Anonymize => "anonymize",
        }
    }
}

impl std::str::FromStr for TemplateAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "analyze" => Ok(Self::Analyze),
            "anonymize" => Ok(Self::Anonymize),
            other => Err(Error::NotFound(format!("template action '{}'", other))),
        }
    }
}

/// Templates stored as raw JSON under `templates:{project}:{action}:{id}`.
pub struct TemplateStore {
    cache: Arc<dyn Cache>,
}

impl TemplateStore {
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self { cache }
    }

    fn key(project: &str, action: TemplateAction, id: &str) -> String {
        format!("templates:{}:{}:{}", project, action.as_str(), id)
    }

    pub fn get(&self, project: &str, action: TemplateAction, id: &str) -> Result<serde_json::Value> {
        let key = Self::key(project, action, id);
        let raw = self
            .cache
            .get(&key)?
            .ok_or_else(|| Error::NotFound(format!("template '{}'", key)))?;
        serde_json::from_str(&raw)
            .map_err(|e| Error::Storage(format!("corrupt template '{}': {}", key, e)))
    }

    /// Store a new template. Fails if the id is taken.
    pub fn insert(
        &self,
        project: &str,
        action: TemplateAction,
        id: &str,
        template: &serde_json::Value,
    ) -> Result<()> {
        let key = Self::key(project, action, id);
        if self.cache.get(&key)?.is_some() {
            return Err(Error::AlreadyExists(format!("template '{}'", key)));
        }
        info!("Storing template {}", key);
        self.cache.set(&key, &serde_json::to_string(template)?)
    }

    /// Replace an existing template. Fails if it does not exist.
    pub fn update(
        &self,
        project: &str,
        action: TemplateAction,
        id: &str,
        template: &serde_json::Value,
    ) -> Result<()> {
        let key = Self::key(project, action, id);
        if self.cache.get(&key)?.is_none() {
            return Err(Error::NotFound(format!("template '{}'", key)));
        }
        info!("Updating template {}", key);
        self.cache.set(&key, &serde_json::to_string(template)?)
    }

    pub fn delete(&self, project: &str, action: TemplateAction, id: &str) -> Result<()> {
        let key = Self::key(project, action, id);
        if !self.cache.delete(&key)? {
            return Err(Error::NotFound(format!("template '{}'", key)));
        }
        info!("Deleted template {}", key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use serde_json::json;

    fn store() -> TemplateStore {
        TemplateStore::new(Arc::new(MemoryCache::new()))
    }

    #[test]
    fn test_template_lifecycle() {
        let store = store();
        let template = json!({"fields": [{"name": "PHONE_NUMBER"}]});

        store.insert("123", TemplateAction::Analyze, "1", &template).unwrap();
        assert_eq!(store.get("123", TemplateAction::Analyze, "1").unwrap(), template);

        let updated = json!({"fields": [], "allFields": true});
        store.update("123", TemplateAction::Analyze, "1", &updated).unwrap();
        assert_eq!(store.get("123", TemplateAction::Analyze, "1").unwrap(), updated);

        store.delete("123", TemplateAction::Analyze, "1").unwrap();
        assert!(matches!(
            store.get("123", TemplateAction::Analyze, "1"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_actions_and_projects_are_separate() {
        let store = store();
        store.insert("p1", TemplateAction::Analyze, "t", &json!({"a": 1})).unwrap();
        store.insert("p1", TemplateAction::Anonymize, "t", &json!({"b": 2})).unwrap();
        store.insert("p2", TemplateAction::Analyze, "t", &json!({"c": 3})).unwrap();

        assert_eq!(store.get("p1", TemplateAction::Anonymize, "t").unwrap(), json!({"b": 2}));
        assert_eq!(store.get("p2", TemplateAction::Analyze, "t").unwrap(), json!({"c": 3}));
    }

    #[test]
    fn test_insert_conflict_and_missing_update() {
        let store = store();
        store.insert("p", TemplateAction::Analyze, "t", &json!({})).unwrap();
        assert!(matches!(
            store.insert("p", TemplateAction::Analyze, "t", &json!({})),
            Err(Error::AlreadyExists(_))
        ));
        assert!(matches!(
            store.update("p", TemplateAction::Anonymize, "t", &json!({})),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            store.delete("p", TemplateAction::Anonymize, "t"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_corrupt_template_is_a_storage_error() {
        let cache = Arc::new(MemoryCache::new());
        cache.set("templates:p:analyze:t", "{broken").unwrap();
        let store = TemplateStore::new(cache);
        assert!(matches!(
            store.get("p", TemplateAction::Analyze, "t"),
            Err(Error::Storage(_))
        ));
    }

    #[test]
    fn test_action_parsing() {
        assert_eq!("analyze".parse::<TemplateAction>().unwrap(), TemplateAction::Analyze);
        assert_eq!("anonymize".parse::<TemplateAction>().unwrap(), TemplateAction::Anonymize);
        assert!("scan".parse::<TemplateAction>().is_err());
    }
}
