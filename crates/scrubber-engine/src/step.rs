//! Redaction of a single piece of text: placeholder check, detection, transformation.

use std::borrow::Cow;

use tracing::debug;

use crate::error::StepError;
use crate::node::is_placeholder;
use crate::ports::{DetectionPort, TransformationPort};

/// Detection and transformation bound to one configuration pair.
///
/// The same pair applies to every scalar the step is used on.
pub struct RedactionStep<D: DetectionPort, T: TransformationPort> {
    detector: D,
    transformer: T,
    detection_config: D::Config,
    transformation_config: T::Config,
}

impl<D: DetectionPort, T: TransformationPort> RedactionStep<D, T> {
    pub fn new(
        detector: D,
        transformer: T,
        detection_config: D::Config,
        transformation_config: T::Config,
    ) -> Self {
        Self {
            detector,
            transformer,
            detection_config,
            transformation_config,
        }
    }

    /// Redact `text`.
    ///
    /// Placeholders come back as `Cow::Borrowed` without either port being
    /// called. Anything else is detected, then transformed, even when
    /// detection found nothing. Port errors are passed through untouched.
    pub async fn redact<'t>(&self, text: &'t str) -> Result<Cow<'t, str>, StepError> {
        if is_placeholder(text) {
            return Ok(Cow::Borrowed(text));
        }

        let findings = self
            .detector
            .detect(text, &self.detection_config)
            .await
            .map_err(StepError::Detection)?;

        debug!("Detected {} findings", findings.len());

        let redacted = self
            .transformer
            .transform(text, &findings, &self.transformation_config)
            .await
            .map_err(StepError::Transformation)?;

        Ok(Cow::Owned(redacted))
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn transformer(&self) -> &T {
        &self.transformer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::Finding;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use scrubber_core::{Error, Result};

    #[derive(Default)]
    struct Calls(Mutex<Vec<String>>);

    /// Flags every occurrence of `needle`, or fails when `needle` is None.
    struct NeedleDetector {
        needle: Option<&'static str>,
        calls: Calls,
    }

    #[async_trait]
    impl DetectionPort for NeedleDetector {
        type Config = &'static str;

        async fn detect(&self, text: &str, config: &Self::Config) -> Result<Vec<Finding>> {
            self.calls.0.lock().push(text.to_string());
            let needle = self
                .needle
                .ok_or_else(|| Error::Detection("analyzer unreachable".into()))?;
            Ok(text
                .match_indices(needle)
                .map(|(start, m)| Finding {
                    entity_type: config.to_string(),
                    start,
                    end: start + m.len(),
                    score: 1.0,
                    text: m.to_string(),
                })
                .collect())
        }
    }

    struct Masker {
        calls: Calls,
        fail: bool,
    }

    #[async_trait]
    impl TransformationPort for Masker {
        type Config = char;

        async fn transform(&self, text: &str, findings: &[Finding], mask: &char) -> Result<String> {
            self.calls.0.lock().push(text.to_string());
            if self.fail {
                return Err(Error::Transformation("anonymizer rejected template".into()));
            }
            let mut out = text.to_string();
            for f in findings.iter().rev() {
                out.replace_range(f.start..f.end, &mask.to_string().repeat(3));
            }
            Ok(out)
        }
    }

    fn step(needle: Option<&'static str>, fail_transform: bool) -> RedactionStep<NeedleDetector, Masker> {
        RedactionStep::new(
            NeedleDetector { needle, calls: Calls::default() },
            Masker { calls: Calls::default(), fail: fail_transform },
            "PERSON",
            '*',
        )
    }

    #[tokio::test]
    async fn test_placeholder_short_circuits() {
        let step = step(Some("John"), false);
        let out = step.redact("<FIELD_NAME>").await.unwrap();
        assert!(matches!(out, Cow::Borrowed("<FIELD_NAME>")));
        assert!(step.detector.calls.0.lock().is_empty());
        assert!(step.transformer.calls.0.lock().is_empty());
    }

    #[tokio::test]
    async fn test_detect_then_transform() {
        let step = step(Some("John Smith"), false);
        let out = step.redact("call John Smith").await.unwrap();
        assert_eq!(out, "call ***");
        assert_eq!(*step.detector.calls.0.lock(), vec!["call John Smith"]);
        assert_eq!(*step.transformer.calls.0.lock(), vec!["call John Smith"]);
    }

    #[tokio::test]
    async fn test_transform_runs_without_findings() {
        let step = step(Some("John Smith"), false);
        let out = step.redact("nothing here").await.unwrap();
        assert!(matches!(out, Cow::Owned(ref s) if s == "nothing here"));
        assert_eq!(step.transformer.calls.0.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_detection_error_skips_transform() {
        let step = step(None, false);
        let err = step.redact("call John Smith").await.unwrap_err();
        assert!(matches!(err, StepError::Detection(Error::Detection(_))));
        assert!(step.transformer.calls.0.lock().is_empty());
    }

    #[tokio::test]
    async fn test_transformation_error_propagates() {
        let step = step(Some("John"), true);
        let err = step.redact("John").await.unwrap_err();
        assert!(matches!(err, StepError::Transformation(Error::Transformation(_))));
    }
}
