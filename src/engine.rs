//! The traversal engine and batch orchestrator.
//!
//! A refactor run walks the document phases (assets, prefabs, scenes)
//! opening one document at a time, invoking the caller's transform, and
//! persisting the document only when the transform reports it completed.
//! Per-document failures are recorded in the failure ledger
//! and never leak into other documents; `interrupt_on_failure` turns the
//! first failure into a full-run abort with partial results.
//!
//! The scene phase owns the editor's open-scene session for its duration:
//! the session is snapshotted before the first scene is opened exclusively
//! and restored afterwards (active scene first, the rest additively) on
//! every exit path that got that far.

use crate::document::{DocumentKind, DocumentRef, OpenMode, SessionState};
use crate::error::{StoreError, TransformError};
use crate::graph::ObjectNode;
use crate::ledger::{AbortReason, FailureLedger, RunResult};
use crate::ordering;
use crate::progress::{LogProgress, ProgressScope, ProgressSink};
use crate::query::{Query, TypeTag};
use crate::store::ObjectStore;

/// Configuration of one `refactor_components` run.
#[derive(Clone, Debug, Default)]
pub struct RunParameters {
    /// Component types that make a sub-object qualify inside scene
    /// documents (ANDed; empty qualifies every object).
    pub types: Vec<TypeTag>,
    /// Prefab documents to visit. Ordered by the engine (base prefabs
    /// before variants) regardless of input order.
    pub prefabs: Vec<DocumentRef>,
    /// Scene documents to visit, in order.
    pub scenes: Vec<DocumentRef>,
    /// Abort the whole run on the first per-document failure instead of
    /// recording it and moving on.
    pub interrupt_on_failure: bool,
    /// Log the prefab visit order and each visited document.
    pub debug: bool,
}

impl RunParameters {
    /// Builds parameters by querying the store: prefabs matching `query`,
    /// plus every scene under the query's folders.
    pub fn discover(store: &dyn ObjectStore, query: &Query) -> Result<Self, StoreError> {
        Ok(Self {
            types: query.types.clone(),
            prefabs: store.find_prefabs(query)?,
            scenes: store.list_scenes(&query.folders)?,
            interrupt_on_failure: false,
            debug: false,
        })
    }
}

/// What a transform did to one document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransformOutcome {
    /// `true` means the document changed and must be persisted.
    pub completed: bool,
}

impl TransformOutcome {
    /// The document changed; persist it.
    pub fn completed() -> Self {
        Self { completed: true }
    }

    /// Nothing to do for this document; leave it untouched. Not a failure.
    pub fn skipped() -> Self {
        Self { completed: false }
    }
}

/// Provenance handed to the transform alongside the object it may edit.
#[derive(Clone, Debug)]
pub struct RefactorContext {
    /// Which phase the document belongs to.
    pub kind: DocumentKind,
    /// Path of the document being transformed.
    pub source: String,
}

impl RefactorContext {
    pub fn is_prefab(&self) -> bool {
        self.kind == DocumentKind::Prefab
    }
}

/// The traversal engine. Borrows an [`ObjectStore`] backend; progress goes
/// to [`LogProgress`] unless another sink is supplied.
pub struct RefactorEngine<'s> {
    pub(crate) store: &'s dyn ObjectStore,
    progress: Box<dyn ProgressSink>,
}

impl<'s> RefactorEngine<'s> {
    pub fn new(store: &'s dyn ObjectStore) -> Self {
        Self {
            store,
            progress: Box::new(LogProgress),
        }
    }

    /// Replaces the progress sink.
    #[must_use]
    pub fn with_progress(mut self, progress: Box<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// Runs `transform` over every asset matching `query`, in discovery
    /// order. A `true` return stages the asset for writing; all staged
    /// writes are committed in one batch at the end of the pass. The batch
    /// commit is best-effort: its failure is logged, not returned. Returns
    /// how many assets changed.
    pub fn refactor_assets<F>(&self, query: &Query, mut transform: F) -> Result<usize, StoreError>
    where
        F: FnMut(&mut ObjectNode) -> bool,
    {
        let assets = self.store.find_assets(query)?;
        let total = assets.len();
        let progress = ProgressScope::new(self.progress.as_ref());
        let title = format!("Refactoring {total} assets");
        let mut changed = 0;
        for (index, document) in assets.iter().enumerate() {
            progress.report(&title, document.name(), index as f32 / total as f32);
            let mut root = self.store.open_asset(document)?;
            if transform(&mut root) {
                self.store.write_asset(document, &root)?;
                changed += 1;
            }
        }
        if let Err(err) = self.store.flush_assets() {
            log::warn!("asset batch save failed: {err}");
        }
        Ok(changed)
    }

    /// Runs `transform` over the prefabs and scenes in `params`.
    ///
    /// Prefab phase: the transform is invoked once per prefab with its
    /// root node. Scene phase: once per qualifying sub-object (a node
    /// directly carrying all of `params.types`, inactive objects
    /// included). The transform's `completed` result decides persistence;
    /// an `Err` is caught at the document boundary and recorded.
    ///
    /// When scenes are in scope the user is asked to settle unsaved
    /// changes in the currently open scenes first; declining returns an
    /// empty result without touching anything.
    pub fn refactor_components<F>(&self, params: RunParameters, mut transform: F) -> RunResult
    where
        F: FnMut(&mut ObjectNode, &RefactorContext) -> Result<TransformOutcome, TransformError>,
    {
        if !params.scenes.is_empty() && !self.store.confirm_open_scene_changes() {
            log::info!("refactor cancelled: unsaved scene changes were not confirmed");
            return RunResult::user_declined();
        }

        let mut ledger = FailureLedger::default();
        let mut visited = 0;

        if self.prefab_phase(&params, &mut ledger, &mut visited, &mut transform) {
            return ledger.into_result(visited, Some(AbortReason::TransformFailure));
        }

        let aborted = self.scene_phase(&params, &mut ledger, &mut visited, &mut transform);
        ledger.into_result(visited, aborted.then_some(AbortReason::TransformFailure))
    }

    /// Phase A. Returns `true` when the run must abort.
    fn prefab_phase<F>(
        &self,
        params: &RunParameters,
        ledger: &mut FailureLedger,
        visited: &mut usize,
        transform: &mut F,
    ) -> bool
    where
        F: FnMut(&mut ObjectNode, &RefactorContext) -> Result<TransformOutcome, TransformError>,
    {
        let mut prefabs = params.prefabs.clone();
        ordering::sort_prefabs(self.store, &mut prefabs);
        if params.debug {
            for prefab in &prefabs {
                log::debug!("prefab visit order: {}", prefab.path);
            }
        }

        let total = prefabs.len();
        let progress = ProgressScope::new(self.progress.as_ref());
        let title = format!("Refactoring {total} prefabs");
        for (index, document) in prefabs.iter().enumerate() {
            progress.report(&title, document.name(), index as f32 / total as f32);
            *visited += 1;
            if params.debug {
                log::debug!("refactoring prefab {}", document.path);
            }

            let mut prefab = match self.store.open_prefab(document) {
                Ok(prefab) => prefab,
                Err(err) => {
                    ledger.record_transform(document.clone(), err);
                    if params.interrupt_on_failure {
                        return true;
                    }
                    continue;
                }
            };
            let context = RefactorContext {
                kind: DocumentKind::Prefab,
                source: document.path.clone(),
            };
            match transform(&mut prefab.root, &context) {
                Ok(outcome) if outcome.completed => {
                    if let Err(err) = self.store.save_prefab(&prefab) {
                        ledger.record_persist(document.clone(), err);
                        if params.interrupt_on_failure {
                            return true;
                        }
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    ledger.record_transform(document.clone(), err);
                    if params.interrupt_on_failure {
                        return true;
                    }
                }
            }
            // `prefab` drops here: the editable graph is released on every
            // path before the next document is opened.
        }
        false
    }

    /// Phase B. Returns `true` when the run must abort. The pre-existing
    /// session is restored whenever at least one scene was opened,
    /// including on the abort path.
    fn scene_phase<F>(
        &self,
        params: &RunParameters,
        ledger: &mut FailureLedger,
        visited: &mut usize,
        transform: &mut F,
    ) -> bool
    where
        F: FnMut(&mut ObjectNode, &RefactorContext) -> Result<TransformOutcome, TransformError>,
    {
        if params.scenes.is_empty() {
            return false;
        }

        let session = self.store.session_state();
        let mut opened_any = false;
        let mut aborted = false;
        {
            let total = params.scenes.len();
            let progress = ProgressScope::new(self.progress.as_ref());
            let title = format!("Refactoring {total} scenes");
            for (index, document) in params.scenes.iter().enumerate() {
                progress.report(&title, document.name(), index as f32 / total as f32);
                *visited += 1;
                if params.debug {
                    log::debug!("refactoring scene {}", document.path);
                }

                let mut scene = match self.store.open_scene(&document.path, OpenMode::Exclusive) {
                    Ok(scene) => scene,
                    Err(err) => {
                        ledger.record_transform(document.clone(), err);
                        if params.interrupt_on_failure {
                            aborted = true;
                            break;
                        }
                        continue;
                    }
                };
                opened_any = true;

                let context = RefactorContext {
                    kind: DocumentKind::Scene,
                    source: document.path.clone(),
                };
                let mut modified = false;
                let mut errors = 0usize;
                for root in &mut scene.graph.roots {
                    root.for_each_matching_mut(&params.types, true, &mut |node| {
                        if aborted {
                            return;
                        }
                        match transform(node, &context) {
                            Ok(outcome) => {
                                if outcome.completed {
                                    modified = true;
                                }
                            }
                            Err(err) => {
                                errors += 1;
                                ledger.record_transform(document.clone(), err);
                                if params.interrupt_on_failure {
                                    aborted = true;
                                }
                            }
                        }
                    });
                    if aborted {
                        break;
                    }
                }
                if aborted {
                    // A transform failed mid-scene: the document's edits
                    // did not complete, so its save is skipped.
                    break;
                }
                if errors > 0 {
                    log::warn!("{errors} object(s) failed in scene {}", document.path);
                }
                if modified {
                    scene.mark_dirty();
                    if let Err(err) = self.store.save_scene(&scene) {
                        ledger.record_persist(document.clone(), err);
                        if params.interrupt_on_failure {
                            aborted = true;
                            break;
                        }
                    }
                }
            }
        }

        if opened_any {
            self.restore_session(&session);
        }
        aborted
    }

    /// Reopens the snapshotted session: active scene exclusively, the
    /// remaining scenes additively. Restoration problems are logged, never
    /// escalated; the refactor results are already final at this point.
    fn restore_session(&self, session: &SessionState) {
        let Some(active) = session.active.as_deref() else {
            log::debug!("no active scene recorded; skipping session restore");
            return;
        };
        if let Err(err) = self.store.open_scene(active, OpenMode::Exclusive) {
            log::warn!("failed to restore active scene {active}: {err}");
            return;
        }
        for path in &session.open {
            if path == active {
                continue;
            }
            if let Err(err) = self.store.open_scene(path, OpenMode::Additive) {
                log::warn!("failed to restore scene {path}: {err}");
            }
        }
    }
}
