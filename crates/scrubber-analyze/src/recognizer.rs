//! Regex-based entity recognizers.

use regex::Regex;
use scrubber_core::{Error, Result};
use scrubber_engine::Finding;
use scrubber_store::PatternRecord;

/// Rescores a raw match. `Some(score)` replaces the pattern score,
/// `None` keeps it.
pub type Validator = fn(&str) -> Option<f32>;

/// A named regex with the confidence its matches start at.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub name: String,
    pub regex: Regex,
    pub score: f32,
}

impl Pattern {
    pub fn new(name: impl Into<String>, regex: &str, score: f32) -> Result<Self> {
        let name = name.into();
        let regex = Regex::new(regex)
            .map_err(|e| Error::Config(format!("invalid pattern '{}': {}", name, e)))?;
        Ok(Self { name, regex, score })
    }
}

/// Recognizes one entity type with one or more patterns.
#[derive(Debug, Clone)]
pub struct PatternRecognizer {
    pub name: String,
    pub entity: String,
    pub language: String,
    patterns: Vec<Pattern>,
    validator: Option<Validator>,
}

impl PatternRecognizer {
    pub fn new(
        name: impl Into<String>,
        entity: impl Into<String>,
        language: impl Into<String>,
        patterns: Vec<Pattern>,
    ) -> Self {
        Self {
            name: name.into(),
            entity: entity.into(),
            language: language.into(),
            patterns,
            validator: None,
        }
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Build a recognizer from a stored custom pattern.
    pub fn from_record(record: &PatternRecord) -> Result<Self> {
        if !(0.0..=1.0).contains(&record.score) {
            return Err(Error::Config(format!(
                "score of recognizer '{}' must be within [0, 1]",
                record.name
            )));
        }
        let pattern = Pattern::new(record.name.clone(), &record.pattern, record.score)?;
        Ok(Self::new(
            record.name.clone(),
            record.entity.clone(),
            record.language.clone(),
            vec![pattern],
        ))
    }

    /// All matches of all patterns, validated. Overlaps are kept; the
    /// analyzer resolves them across recognizers.
    pub fn analyze(&self, text: &str) -> Vec<Finding> {
        let mut findings = Vec::new();
        for pattern in &self.patterns {
            for m in pattern.regex.find_iter(text) {
                if m.as_str().is_empty() {
                    continue;
                }
                let score = self
                    .validator
                    .and_then(|validate| validate(m.as_str()))
                    .unwrap_or(pattern.score);
                findings.push(Finding {
                    entity_type: self.entity.clone(),
                    start: m.start(),
                    end: m.end(),
                    score,
                    text: m.as_str().to_string(),
                });
            }
        }
        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pattern: &str, score: f32) -> PatternRecord {
        PatternRecord {
            name: "EmployeeId".into(),
            pattern: pattern.into(),
            entity: "EMPLOYEE_ID".into(),
            language: "en".into(),
            score,
        }
    }

    #[test]
    fn test_from_record_matches() {
        let rec = PatternRecognizer::from_record(&record(r"\bEMP-\d{4}\b", 0.8)).unwrap();
        let findings = rec.analyze("badge EMP-0042 and EMP-7");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].entity_type, "EMPLOYEE_ID");
        assert_eq!(findings[0].text, "EMP-0042");
        assert_eq!((findings[0].start, findings[0].end), (6, 14));
        assert!((findings[0].score - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_from_record_rejects_bad_input() {
        assert!(matches!(
            PatternRecognizer::from_record(&record("(unclosed", 0.5)),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            PatternRecognizer::from_record(&record("x", 1.5)),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_validator_rescores() {
        let rec = PatternRecognizer::new(
            "Even",
            "EVEN",
            "en",
            vec![Pattern::new("digits", r"\d+", 0.3).unwrap()],
        )
        .with_validator(|s| Some(if s.len() % 2 == 0 { 1.0 } else { 0.0 }));

        let findings = rec.analyze("12 345");
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].score, 1.0);
        assert_eq!(findings[1].score, 0.0);
    }

    #[test]
    fn test_empty_matches_skipped() {
        let rec = PatternRecognizer::new(
            "Maybe",
            "MAYBE",
            "en",
            vec![Pattern::new("optional", r"x*", 0.5).unwrap()],
        );
        let findings = rec.analyze("abxxc");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].text, "xx");
    }
}
