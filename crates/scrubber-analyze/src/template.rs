//! Analyze and anonymize templates: the configurations handed to the ports.

use serde::{Deserialize, Serialize};

/// An entity name as it appears in templates (`{"name": "EMAIL_ADDRESS"}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldType {
    pub name: String,
}

impl FieldType {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Detection configuration: which entities to look for, in which language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeTemplate {
    #[serde(default)]
    pub fields: Vec<FieldType>,
    #[serde(default = "default_language")]
    pub language: String,
    /// Run every recognizer for the language, ignoring `fields`.
    #[serde(default)]
    pub all_fields: bool,
    /// Overrides the analyzer's configured threshold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f32>,
}

fn default_language() -> String {
    "en".into()
}

impl Default for AnalyzeTemplate {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            language: default_language(),
            all_fields: false,
            min_score: None,
        }
    }
}

impl AnalyzeTemplate {
    /// Template selecting every recognizer.
    pub fn all_fields() -> Self {
        Self {
            all_fields: true,
            ..Default::default()
        }
    }

    pub fn with_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(FieldType::new).collect(),
            ..Default::default()
        }
    }
}

/// How one finding is rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Transformation {
    /// Substitute a fixed value.
    #[serde(rename_all = "camelCase")]
    Replace { new_value: String },
    /// Remove the span entirely.
    Redact,
    /// Overwrite characters with `masking_char`. `chars_to_mask` of `None`
    /// masks the whole span.
    #[serde(rename_all = "camelCase")]
    Mask {
        #[serde(default = "default_masking_char")]
        masking_char: char,
        #[serde(default)]
        chars_to_mask: Option<usize>,
        #[serde(default)]
        from_end: bool,
    },
    /// SHA-256 of the span, hex encoded.
    Hash,
    /// `<ENTITY_TYPE>`.
    Label,
}

static LABEL: Transformation = Transformation::Label;

fn default_masking_char() -> char {
    '*'
}

/// Applies `transformation` to findings whose entity is listed in `fields`.
/// An empty `fields` list matches every entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldTypeTransformation {
    #[serde(default)]
    pub fields: Vec<FieldType>,
    pub transformation: Transformation,
}

/// Transformation configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnonymizeTemplate {
    #[serde(default)]
    pub field_type_transformations: Vec<FieldTypeTransformation>,
    /// Used when no entry matches. Falls back to `Label` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_transformation: Option<Transformation>,
}

impl AnonymizeTemplate {
    /// The transformation that applies to `entity`.
    pub fn transformation_for(&self, entity: &str) -> &Transformation {
        self.field_type_transformations
            .iter()
            .find(|t| t.fields.is_empty() || t.fields.iter().any(|f| f.name == entity))
            .map(|t| &t.transformation)
            .or(self.default_transformation.as_ref())
            .unwrap_or(&LABEL)
    }
}
