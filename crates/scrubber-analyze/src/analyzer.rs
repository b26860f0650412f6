//! Detection port backed by the recognizer registry.

use std::sync::Arc;

use async_trait::async_trait;
use scrubber_core::{Error, Result};
use scrubber_engine::{DetectionPort, Finding};
use tracing::debug;

use crate::registry::RecognizerRegistry;
use crate::template::AnalyzeTemplate;

pub struct Analyzer {
    registry: Arc<RecognizerRegistry>,
    /// Findings scoring at or below this are dropped.
    min_score: f32,
}

impl Analyzer {
    pub fn new(registry: Arc<RecognizerRegistry>, min_score: f32) -> Self {
        Self { registry, min_score }
    }

    pub fn registry(&self) -> &Arc<RecognizerRegistry> {
        &self.registry
    }

    /// Run the selected recognizers over `text` synchronously.
    pub fn analyze(&self, text: &str, template: &AnalyzeTemplate) -> Result<Vec<Finding>> {
        if !template.all_fields && template.fields.is_empty() {
            return Err(Error::Detection(
                "analyze template selects no fields".into(),
            ));
        }

        let threshold = template.min_score.unwrap_or(self.min_score);
        let recognizers = self.registry.recognizers(template)?;

        let mut findings: Vec<Finding> = recognizers
            .iter()
            .flat_map(|r| r.analyze(text))
            .filter(|f| f.score > threshold)
            .collect();

        debug!(
            "{} recognizers produced {} candidate findings",
            recognizers.len(),
            findings.len()
        );

        Ok(resolve_overlaps(&mut findings))
    }
}

#[async_trait]
impl DetectionPort for Analyzer {
    type Config = AnalyzeTemplate;

    async fn detect(&self, text: &str, config: &AnalyzeTemplate) -> Result<Vec<Finding>> {
        self.analyze(text, config)
    }
}

/// Keep non-overlapping findings, preferring the longest span and then the
/// highest score. The result is ordered by start offset.
fn resolve_overlaps(findings: &mut [Finding]) -> Vec<Finding> {
    findings.sort_by(|a, b| {
        (b.end - b.start)
            .cmp(&(a.end - a.start))
            .then(b.score.total_cmp(&a.score))
            .then(a.start.cmp(&b.start))
    });

    let mut kept: Vec<Finding> = Vec::with_capacity(findings.len());
    for f in findings.iter() {
        if kept.iter().all(|k| f.end <= k.start || f.start >= k.end) {
            kept.push(f.clone());
        }
    }
    kept.sort_by_key(|f| f.start);
    kept
}
