//! Scrubber Engine: walks an untyped JSON document and redacts every
//! scalar leaf through two injected capabilities.
//!
//! The engine owns traversal, classification and in-place mutation.
//! What counts as sensitive (`DetectionPort`) and how it is rewritten
//! (`TransformationPort`) is supplied by the caller.

pub mod engine;
pub mod error;
pub mod node;
pub mod ports;
pub mod step;

pub use engine::{Engine, ScanReport};
pub use error::{ScanError, StepError};
pub use node::{classify, is_placeholder, scalar_text, Node, NodeKind, NodePath, PathSegment};
pub use ports::{DetectionPort, Finding, TransformationPort};
pub use step::RedactionStep;
pub use tokio_util::sync::CancellationToken;
