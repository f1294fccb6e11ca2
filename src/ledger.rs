//! Run results and the failure ledger.
//!
//! Failures are kept in two distinct buckets so callers can tell "my
//! transform logic failed" apart from "the store refused to persist":
//! transform failures carry the callback's error, persist failures the
//! store's. Every entry is also logged with the document path as it is
//! recorded.

use crate::document::{DocumentKind, DocumentRef};

/// A single failed document with the captured error text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Failure {
    pub document: DocumentRef,
    pub message: String,
}

/// Why a run ended before visiting every discovered document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbortReason {
    /// A failure occurred while `interrupt_on_failure` was set.
    TransformFailure,
    /// The user declined the unsaved-scene confirmation; nothing was
    /// touched.
    UserDeclined,
}

/// Outcome of a [`refactor_components`](crate::RefactorEngine::refactor_components)
/// run: how many documents were visited, which failed, and whether the run
/// was cut short.
#[derive(Clone, Debug, Default)]
pub struct RunResult {
    pub visited: usize,
    pub transform_failures: Vec<Failure>,
    pub persist_failures: Vec<Failure>,
    pub abort: Option<AbortReason>,
}

impl RunResult {
    /// Result of a run the user declined before it touched anything.
    pub fn user_declined() -> Self {
        Self {
            abort: Some(AbortReason::UserDeclined),
            ..Self::default()
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.abort.is_some()
    }

    pub fn has_failures(&self) -> bool {
        !self.transform_failures.is_empty() || !self.persist_failures.is_empty()
    }

    /// All failures (either bucket) that hit prefab documents.
    pub fn failed_prefabs(&self) -> impl Iterator<Item = &Failure> {
        self.failures_of_kind(DocumentKind::Prefab)
    }

    /// All failures (either bucket) that hit scene documents.
    pub fn failed_scenes(&self) -> impl Iterator<Item = &Failure> {
        self.failures_of_kind(DocumentKind::Scene)
    }

    fn failures_of_kind(&self, kind: DocumentKind) -> impl Iterator<Item = &Failure> {
        self.transform_failures
            .iter()
            .chain(self.persist_failures.iter())
            .filter(move |failure| failure.document.kind == kind)
    }
}

/// Accumulates per-document failures during a run, then finalizes into a
/// [`RunResult`].
#[derive(Debug, Default)]
pub struct FailureLedger {
    transform_failures: Vec<Failure>,
    persist_failures: Vec<Failure>,
}

impl FailureLedger {
    /// Records a caller-transform failure for a document.
    pub fn record_transform(&mut self, document: DocumentRef, error: impl std::fmt::Display) {
        let message = error.to_string();
        log::warn!("transform failed for {document}: {message}");
        self.transform_failures.push(Failure { document, message });
    }

    /// Records a persistence failure for a document whose transform
    /// completed.
    pub fn record_persist(&mut self, document: DocumentRef, error: impl std::fmt::Display) {
        let message = error.to_string();
        log::warn!("save failed for {document}: {message}");
        self.persist_failures.push(Failure { document, message });
    }

    pub fn into_result(self, visited: usize, abort: Option<AbortReason>) -> RunResult {
        RunResult {
            visited,
            transform_failures: self.transform_failures,
            persist_failures: self.persist_failures,
            abort,
        }
    }
}
