//! Scrubber Analyze: concrete detection and transformation ports.
//!
//! `Analyzer` runs regex recognizers (a predefined set plus custom ones
//! from the recognizer store) and reports findings. `Anonymizer` rewrites
//! the reported spans according to an anonymize template.

pub mod analyzer;
pub mod anonymizer;
pub mod predefined;
pub mod recognizer;
pub mod registry;
pub mod template;

pub use analyzer::Analyzer;
pub use anonymizer::Anonymizer;
pub use recognizer::{Pattern, PatternRecognizer};
pub use registry::RecognizerRegistry;
pub use template::{AnalyzeTemplate, AnonymizeTemplate, FieldType, FieldTypeTransformation, Transformation};
