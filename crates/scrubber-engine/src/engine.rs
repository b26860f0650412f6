//! Document traversal.
//!
//! `Engine::scan` walks a JSON object with a FIFO work list of containers.
//! For each container taken off the list it first queues child containers
//! and collects its scalar slots (elements of a directly held array are
//! collected inline), then rewrites the collected scalars in order. Arrays
//! nested inside arrays are queued like objects, so every scalar reachable
//! from the root is visited exactly once.
//!
//! Keys, array lengths and nesting never change; only scalar leaves do.
//! The first failure aborts the scan and leaves earlier rewrites in place.

use std::borrow::Cow;
use std::collections::VecDeque;

use serde::Serialize;
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::ScanError;
use crate::node::{scalar_text, Node, NodePath};
use crate::ports::{DetectionPort, TransformationPort};
use crate::step::RedactionStep;

/// Counters for one successful scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    /// Objects and arrays visited, the root included.
    pub containers: usize,
    /// Scalars sent through detection and transformation.
    pub redacted: usize,
    /// Scalars left untouched because they were placeholders.
    pub placeholders: usize,
}

enum Container<'a> {
    Object(&'a mut Map<String, Value>),
    Array(&'a mut Vec<Value>),
}

struct Pending<'a> {
    path: NodePath,
    container: Container<'a>,
}

struct Slot<'a> {
    path: NodePath,
    value: &'a mut Value,
}

/// Redacts documents with a fixed configuration pair.
///
/// Holds no per-document state, so one engine may scan many documents,
/// concurrently if each call gets its own document.
pub struct Engine<D: DetectionPort, T: TransformationPort> {
    step: RedactionStep<D, T>,
    cancel: CancellationToken,
}

impl<D: DetectionPort, T: TransformationPort> Engine<D, T> {
    pub fn new(
        detector: D,
        transformer: T,
        detection_config: D::Config,
        transformation_config: T::Config,
    ) -> Self {
        Self::from_step(RedactionStep::new(
            detector,
            transformer,
            detection_config,
            transformation_config,
        ))
    }

    pub fn from_step(step: RedactionStep<D, T>) -> Self {
        Self {
            step,
            cancel: CancellationToken::new(),
        }
    }

    /// Abort scans when `token` is cancelled.
    ///
    /// In-flight port calls are dropped and `scan` returns
    /// `ScanError::Cancelled`. Already rewritten scalars stay rewritten.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn step(&self) -> &RedactionStep<D, T> {
        &self.step
    }

    /// Redact every scalar in `document`, in place.
    pub async fn scan(&self, document: &mut Map<String, Value>) -> Result<ScanReport, ScanError> {
        if document.is_empty() {
            return Err(ScanError::EmptyDocument);
        }

        let mut report = ScanReport::default();
        let mut pending = VecDeque::new();
        pending.push_back(Pending {
            path: NodePath::root(),
            container: Container::Object(document),
        });

        while let Some(Pending { path, container }) = pending.pop_front() {
            let slots = collect(&path, container, &mut pending, &mut report);
            for slot in slots {
                if let Err(e) = self.visit(slot, &mut report).await {
                    warn!("Scan aborted: {}", e);
                    return Err(e);
                }
            }
        }

        debug!(
            "Scan complete: {} containers, {} redacted, {} placeholders",
            report.containers, report.redacted, report.placeholders
        );
        Ok(report)
    }

    async fn visit(&self, slot: Slot<'_>, report: &mut ScanReport) -> Result<(), ScanError> {
        let Slot { path, value } = slot;
        let text = scalar_text(value);

        let outcome = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            outcome = self.step.redact(&text) => Some(outcome),
        };
        let Some(outcome) = outcome else {
            return Err(ScanError::Cancelled { path });
        };

        match outcome {
            Ok(Cow::Borrowed(_)) => report.placeholders += 1,
            Ok(Cow::Owned(redacted)) => {
                *value = Value::String(redacted);
                report.redacted += 1;
            }
            Err(e) => return Err(e.at(path)),
        }
        Ok(())
    }
}

/// Queue the child containers of `container` and return its scalar slots
/// in visiting order.
fn collect<'a>(
    path: &NodePath,
    container: Container<'a>,
    pending: &mut VecDeque<Pending<'a>>,
    report: &mut ScanReport,
) -> Vec<Slot<'a>> {
    report.containers += 1;
    let mut slots = Vec::new();

    match container {
        Container::Object(map) => {
            for (key, value) in map.iter_mut() {
                let child = path.key(key);
                match Node::from(value) {
                    Node::Object(map) => pending.push_back(Pending {
                        path: child,
                        container: Container::Object(map),
                    }),
                    Node::Array(items) => {
                        report.containers += 1;
                        collect_elements(&child, items, pending, &mut slots);
                    }
                    Node::Scalar(value) => slots.push(Slot { path: child, value }),
                }
            }
        }
        Container::Array(items) => collect_elements(path, items, pending, &mut slots),
    }

    slots
}

fn collect_elements<'a>(
    path: &NodePath,
    items: &'a mut [Value],
    pending: &mut VecDeque<Pending<'a>>,
    slots: &mut Vec<Slot<'a>>,
) {
    for (index, value) in items.iter_mut().enumerate() {
        let child = path.index(index);
        match Node::from(value) {
            Node::Object(map) => pending.push_back(Pending {
                path: child,
                container: Container::Object(map),
            }),
            Node::Array(nested) => pending.push_back(Pending {
                path: child,
                container: Container::Array(nested),
            }),
            Node::Scalar(value) => slots.push(Slot { path: child, value }),
        }
    }
}
