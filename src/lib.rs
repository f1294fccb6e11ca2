//! # Refactor Engine
//!
//! Batch refactoring engine for a game project's serialized object graphs:
//! apply a scripted transform across every asset, prefab, and scene that
//! contains a given component type, persist only what actually changed, and
//! survive per-document failures without corrupting the surrounding editor
//! session.
//!
//! ## Core Types
//!
//! - [`RefactorEngine`] — Traversal engine and batch orchestrator
//! - [`ObjectStore`] — Adapter contract for the project's document backend
//! - [`ObjectNode`] / [`ObjectGraph`] — Editable document object trees
//! - [`Query`] / [`TypeTag`] — Discovery by component type, text, and folder
//! - [`RunParameters`] / [`RunResult`] — Run configuration and failure ledger
//!
//! ## Example
//!
//! ```ignore
//! let store = MemoryStore::new();
//! // ... populate the store, or back it with a real project ...
//!
//! let engine = RefactorEngine::new(&store);
//! let query = Query::by_type("Health").with_descendants(DescendantMode::AllDescendants);
//! let params = RunParameters::discover(&store, &query)?;
//!
//! let result = engine.refactor_components(params, |node, _ctx| {
//!     for component in node.components.iter_mut().filter(|c| c.type_tag.name() == "Health") {
//!         component.fields.set("max", 100i64);
//!     }
//!     Ok(TransformOutcome::completed())
//! });
//! assert!(!result.has_failures());
//! ```
//!
//! See `DESIGN.md` for architecture decisions and the grounding of each part.

mod document;
mod engine;
mod error;
mod graph;
mod ledger;
mod ops;
mod ordering;
mod progress;
mod query;
mod store;
mod value;

#[cfg(feature = "memory-store")]
mod memory;

pub use document::{DocumentKind, DocumentRef, OpenMode, SessionState};
pub use engine::{RefactorContext, RefactorEngine, RunParameters, TransformOutcome};
pub use error::{StoreError, TransformError};
pub use graph::{ComponentInstance, ObjectGraph, ObjectNode};
pub use ledger::{AbortReason, Failure, FailureLedger, RunResult};
pub use ops::swap_component_type;
pub use ordering::sort_prefabs;
pub use progress::{LogProgress, NullProgress, ProgressScope, ProgressSink};
pub use query::{DescendantMode, Query, TypeTag};
pub use store::{ObjectStore, PrefabDocument, SceneDocument};
pub use value::Value;

#[cfg(feature = "memory-store")]
pub use memory::MemoryStore;
