//! Store record types.

use serde::{Deserialize, Serialize};

/// A user-defined regex recognizer, keyed by `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRecord {
    pub name: String,
    pub pattern: String,
    /// Entity label reported for matches (e.g., `EMPLOYEE_ID`).
    pub entity: String,
    #[serde(default = "default_language")]
    pub language: String,
    /// Confidence assigned to every match, in [0, 1].
    pub score: f32,
}

fn default_language() -> String {
    "en".into()
}
