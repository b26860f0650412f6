//! Capabilities consumed by the engine.
//!
//! The engine never looks inside a port's configuration: each port names
//! its own `Config` type and receives it back on every call.

use std::sync::Arc;

use async_trait::async_trait;
use scrubber_core::Result;
use serde::{Deserialize, Serialize};

/// A detected span of sensitive content.
///
/// `start`/`end` are byte offsets into the text that was scanned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub entity_type: String,
    pub start: usize,
    pub end: usize,
    pub score: f32,
    pub text: String,
}

/// Finds sensitive spans in a piece of text.
#[async_trait]
pub trait DetectionPort: Send + Sync {
    type Config: Send + Sync;

    async fn detect(&self, text: &str, config: &Self::Config) -> Result<Vec<Finding>>;
}

/// Rewrites text given the spans detection reported.
///
/// Called even when `findings` is empty; the port decides what an empty
/// set means.
#[async_trait]
pub trait TransformationPort: Send + Sync {
    type Config: Send + Sync;

    async fn transform(
        &self,
        text: &str,
        findings: &[Finding],
        config: &Self::Config,
    ) -> Result<String>;
}

#[async_trait]
impl<P: DetectionPort + ?Sized> DetectionPort for Arc<P> {
    type Config = P::Config;

    async fn detect(&self, text: &str, config: &Self::Config) -> Result<Vec<Finding>> {
        (**self).detect(text, config).await
    }
}

#[async_trait]
impl<P: TransformationPort + ?Sized> TransformationPort for Arc<P> {
    type Config = P::Config;

    async fn transform(
        &self,
        text: &str,
        findings: &[Finding],
        config: &Self::Config,
    ) -> Result<String> {
        (**self).transform(text, findings, config).await
    }
}
