//! The object store adapter contract.
//!
//! The engine never touches serialization or the filesystem directly;
//! everything persistent goes through an [`ObjectStore`]. Backends own all
//! side effects: how documents are found, what bytes they become on disk,
//! and what "the currently open scenes" means for the host editor.
//!
//! # Document lifecycle
//!
//! Open handles ([`PrefabDocument`], [`SceneDocument`]) are plain owned
//! values. Dropping one releases the editable graph; the engine opens
//! exactly one at a time and drops it before opening the next, so a
//! backend never sees two prefab documents in flight.
//!
//! # Asset writes
//!
//! Asset writes are staged: [`write_asset`](ObjectStore::write_asset)
//! records the new contents and marks the document dirty,
//! [`flush_assets`](ObjectStore::flush_assets) commits the whole batch.
//! Prefabs and scenes persist individually via their save calls.

use crate::document::{DocumentRef, OpenMode, SessionState};
use crate::error::StoreError;
use crate::graph::{ObjectGraph, ObjectNode};
use crate::query::{Query, TypeTag};

/// A prefab opened for editing: its source reference plus the editable
/// root node.
#[derive(Clone, Debug)]
pub struct PrefabDocument {
    pub source: DocumentRef,
    pub root: ObjectNode,
}

/// A scene opened for editing.
#[derive(Clone, Debug)]
pub struct SceneDocument {
    pub path: String,
    pub graph: ObjectGraph,
    dirty: bool,
}

impl SceneDocument {
    pub fn new(path: impl Into<String>, graph: ObjectGraph) -> Self {
        Self {
            path: path.into(),
            graph,
            dirty: false,
        }
    }

    /// Flags the scene as modified; the engine only saves dirty scenes.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

/// Backend contract consumed by the engine (always via `&dyn ObjectStore`).
pub trait ObjectStore {
    // --- Discovery ---

    /// Finds assets matching the query. The query's types are matched
    /// against the asset's root object; results are path-sorted.
    fn find_assets(&self, query: &Query) -> Result<Vec<DocumentRef>, StoreError>;

    /// Finds prefabs matching the query, honoring its descendant mode;
    /// results are path-sorted.
    fn find_prefabs(&self, query: &Query) -> Result<Vec<DocumentRef>, StoreError>;

    /// Lists scene documents under the given folders (all scenes when
    /// empty); results are path-sorted.
    fn list_scenes(&self, folders: &[String]) -> Result<Vec<DocumentRef>, StoreError>;

    // --- Assets ---

    fn open_asset(&self, document: &DocumentRef) -> Result<ObjectNode, StoreError>;

    /// Stages new contents for an asset and marks it dirty.
    fn write_asset(&self, document: &DocumentRef, root: &ObjectNode) -> Result<(), StoreError>;

    /// Commits all staged asset writes in one batch.
    fn flush_assets(&self) -> Result<(), StoreError>;

    // --- Prefabs ---

    fn open_prefab(&self, document: &DocumentRef) -> Result<PrefabDocument, StoreError>;

    fn save_prefab(&self, prefab: &PrefabDocument) -> Result<(), StoreError>;

    /// Whether the prefab inherits overrides from a base prefab. Consumed
    /// only by the ordering policy.
    fn is_variant(&self, document: &DocumentRef) -> bool;

    // --- Scenes & session ---

    fn open_scene(&self, path: &str, mode: OpenMode) -> Result<SceneDocument, StoreError>;

    fn save_scene(&self, scene: &SceneDocument) -> Result<(), StoreError>;

    /// Snapshot of the currently open scenes and the active one.
    fn session_state(&self) -> SessionState;

    /// Asks the user to deal with unsaved changes in the currently open
    /// scenes before a scene-phase run replaces them. Returning `false`
    /// cancels the whole run. The default suits non-interactive backends.
    fn confirm_open_scene_changes(&self) -> bool {
        true
    }

    // --- Type definitions ---

    /// Component type definitions whose name equals `name`, compared
    /// case-insensitively. Used by the type-swap operation, which requires
    /// exactly one match.
    fn find_component_types(&self, name: &str) -> Vec<TypeTag>;
}
