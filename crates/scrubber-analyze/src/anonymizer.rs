//! Transformation port: rewrites reported spans per an anonymize template.

use async_trait::async_trait;
use scrubber_core::{Error, Result};
use scrubber_engine::{Finding, TransformationPort};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::template::{AnonymizeTemplate, Transformation};

#[derive(Debug, Default, Clone, Copy)]
pub struct Anonymizer;

impl Anonymizer {
    pub fn new() -> Self {
        Self
    }

    /// Apply `template` to every finding in `text`.
    ///
    /// Spans are applied from the end of the text backwards so earlier
    /// offsets stay valid. A finding overlapping one already applied is
    /// skipped.
    pub fn anonymize(&self, text: &str, findings: &[Finding], template: &AnonymizeTemplate) -> Result<String> {
        if findings.is_empty() {
            return Ok(text.to_string());
        }

        for f in findings {
            check_span(text, f)?;
        }

        let mut ordered: Vec<&Finding> = findings.iter().collect();
        ordered.sort_by(|a, b| b.start.cmp(&a.start).then(b.end.cmp(&a.end)));

        let mut out = text.to_string();
        let mut floor = text.len();
        let mut applied = 0;
        for f in ordered {
            if f.end > floor {
                continue;
            }
            let span = &text[f.start..f.end];
            let replacement = apply(template.transformation_for(&f.entity_type), &f.entity_type, span);
            out.replace_range(f.start..f.end, &replacement);
            floor = f.start;
            applied += 1;
        }

        debug!("Applied {} of {} findings", applied, findings.len());
        Ok(out)
    }
}

#[async_trait]
impl TransformationPort for Anonymizer {
    type Config = AnonymizeTemplate;

    async fn transform(&self, text: &str, findings: &[Finding], config: &AnonymizeTemplate) -> Result<String> {
        self.anonymize(text, findings, config)
    }
}

fn check_span(text: &str, f: &Finding) -> Result<()> {
    if f.start > f.end || f.end > text.len() {
        return Err(Error::Transformation(format!(
            "{} span {}..{} out of range for text of length {}",
            f.entity_type,
            f.start,
            f.end,
            text.len()
        )));
    }
    if !text.is_char_boundary(f.start) || !text.is_char_boundary(f.end) {
        return Err(Error::Transformation(format!(
            "{} span {}..{} is not on a character boundary",
            f.entity_type, f.start, f.end
        )));
    }
    Ok(())
}

fn apply(transformation: &Transformation, entity: &str, span: &str) -> String {
    match transformation {
        Transformation::Replace { new_value } => new_value.clone(),
        Transformation::Redact => String::new(),
        Transformation::Mask {
            masking_char,
            chars_to_mask,
            from_end,
        } => mask(span, *masking_char, *chars_to_mask, *from_end),
        Transformation::Hash => hex::encode(Sha256::digest(span.as_bytes())),
        Transformation::Label => format!("<{}>", entity),
    }
}

fn mask(span: &str, masking_char: char, chars_to_mask: Option<usize>, from_end: bool) -> String {
    let len = span.chars().count();
    let n = chars_to_mask.unwrap_or(len).min(len);
    let masked = |i: usize| if from_end { i >= len - n } else { i < n };
    span.chars()
        .enumerate()
        .map(|(i, c)| if masked(i) { masking_char } else { c })
        .collect()
}
