//! Scan failures.
//!
//! A failed scan leaves the document partially rewritten: every scalar
//! visited before the failing one already holds its redacted value, the
//! failing scalar and everything after it keep their original values.
//! Nothing is rolled back.

use scrubber_core::Error;
use thiserror::Error;

use crate::node::NodePath;

/// Failure of a single redaction step, before a location is known.
#[derive(Error, Debug)]
pub enum StepError {
    #[error("detection failed: {0}")]
    Detection(#[source] Error),

    #[error("transformation failed: {0}")]
    Transformation(#[source] Error),
}

impl StepError {
    /// Attach the location of the scalar being redacted.
    pub fn at(self, path: NodePath) -> ScanError {
        match self {
            StepError::Detection(source) => ScanError::Detection { path, source },
            StepError::Transformation(source) => ScanError::Transformation { path, source },
        }
    }
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("document is empty")]
    EmptyDocument,

    #[error("detection failed at '{path}': {source}")]
    Detection {
        path: NodePath,
        #[source]
        source: Error,
    },

    #[error("transformation failed at '{path}': {source}")]
    Transformation {
        path: NodePath,
        #[source]
        source: Error,
    },

    #[error("scan cancelled at '{path}'")]
    Cancelled { path: NodePath },
}

impl ScanError {
    /// Location of the scalar that stopped the scan, if any.
    pub fn path(&self) -> Option<&NodePath> {
        match self {
            ScanError::EmptyDocument => None,
            ScanError::Detection { path, .. }
            | ScanError::Transformation { path, .. }
            | ScanError::Cancelled { path } => Some(path),
        }
    }
}
