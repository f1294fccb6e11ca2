//! In-memory object store for tests and staged refactors.
//!
//! Documents are held as RON text and decoded on open, so every
//! open/save cycle is a real serialization round trip and "the persisted
//! state did not change" can be checked byte-for-byte via
//! [`document_bytes`](MemoryStore::document_bytes).
//!
//! The store is mutable after construction: fixtures are inserted with
//! `insert_*`, and failure behavior (rejected saves, a declined scene
//! confirmation) can be injected per test.
//!
//! # Example
//!
//! ```ignore
//! let store = MemoryStore::new();
//! store.insert_prefab(
//!     "Assets/Props/Barrel.prefab",
//!     &ObjectNode::new("Barrel").with_component(ComponentInstance::new("Health")),
//! );
//! store.insert_scene("Assets/Scenes/Level1.scene", &ObjectGraph::new());
//!
//! let engine = RefactorEngine::new(&store);
//! ```

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::document::{DocumentKind, DocumentRef, OpenMode, SessionState};
use crate::error::StoreError;
use crate::graph::{ObjectGraph, ObjectNode};
use crate::query::{Query, TypeTag};
use crate::store::{ObjectStore, PrefabDocument, SceneDocument};

#[derive(Clone, Debug)]
struct StoredDocument {
    kind: DocumentKind,
    text: String,
}

#[derive(Default)]
struct Inner {
    documents: HashMap<String, StoredDocument>,
    /// Staged asset writes awaiting [`ObjectStore::flush_assets`].
    pending_assets: HashMap<String, String>,
    variants: HashSet<String>,
    type_defs: Vec<TypeTag>,
    open_scenes: Vec<String>,
    active_scene: Option<String>,
    failing_saves: HashSet<String>,
    failing_flush: bool,
    confirm_declined: bool,
    flush_count: usize,
}

/// In-memory [`ObjectStore`] backend.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

fn encode<T: Serialize>(value: &T) -> Result<String, StoreError> {
    ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default())
        .map_err(|e| StoreError::Format(e.to_string()))
}

fn decode<T: DeserializeOwned>(text: &str) -> Result<T, StoreError> {
    ron::from_str(text).map_err(|e| StoreError::Format(e.to_string()))
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts (or replaces) an asset document.
    pub fn insert_asset(&self, path: impl Into<String>, root: &ObjectNode) {
        self.insert(path.into(), DocumentKind::Asset, encode_document(root));
    }

    /// Inserts (or replaces) a base prefab document.
    pub fn insert_prefab(&self, path: impl Into<String>, root: &ObjectNode) {
        self.insert(path.into(), DocumentKind::Prefab, encode_document(root));
    }

    /// Inserts (or replaces) a variant prefab document.
    pub fn insert_prefab_variant(&self, path: impl Into<String>, root: &ObjectNode) {
        let path = path.into();
        self.inner.write().variants.insert(path.clone());
        self.insert(path, DocumentKind::Prefab, encode_document(root));
    }

    /// Inserts (or replaces) a scene document.
    pub fn insert_scene(&self, path: impl Into<String>, graph: &ObjectGraph) {
        self.insert(path.into(), DocumentKind::Scene, encode_document(graph));
    }

    fn insert(&self, path: String, kind: DocumentKind, text: String) {
        self.inner
            .write()
            .documents
            .insert(path, StoredDocument { kind, text });
    }

    /// Registers a component type definition for name-based resolution.
    pub fn register_component_type(&self, tag: impl Into<TypeTag>) {
        self.inner.write().type_defs.push(tag.into());
    }

    /// Sets the editor session: which scenes are open and which is active.
    pub fn set_open_scenes(&self, open: impl IntoIterator<Item = impl Into<String>>, active: impl Into<String>) {
        let mut inner = self.inner.write();
        inner.open_scenes = open.into_iter().map(Into::into).collect();
        inner.active_scene = Some(active.into());
    }

    /// Makes every save of the given path fail with
    /// [`StoreError::SaveRejected`].
    pub fn fail_saves_on(&self, path: impl Into<String>) {
        self.inner.write().failing_saves.insert(path.into());
    }

    /// Makes the next asset batch flush fail.
    pub fn fail_asset_flush(&self) {
        self.inner.write().failing_flush = true;
    }

    /// Makes [`ObjectStore::confirm_open_scene_changes`] return `false`.
    pub fn decline_scene_confirmation(&self) {
        self.inner.write().confirm_declined = true;
    }

    /// The persisted text of a document, if it exists. Staged asset writes
    /// are not visible here until flushed.
    pub fn document_bytes(&self, path: &str) -> Option<String> {
        self.inner.read().documents.get(path).map(|d| d.text.clone())
    }

    /// How many asset batch flushes have completed.
    pub fn flush_count(&self) -> usize {
        self.inner.read().flush_count
    }

    fn find_documents(
        &self,
        kind: DocumentKind,
        query: &Query,
        matches: impl Fn(&ObjectNode, &Query) -> bool,
    ) -> Result<Vec<DocumentRef>, StoreError> {
        let inner = self.inner.read();
        let mut found = Vec::new();
        for (path, document) in &inner.documents {
            if document.kind != kind {
                continue;
            }
            let reference = DocumentRef::new(path.clone(), kind);
            if !query.matches_folders(path) || !query.matches_name(reference.name()) {
                continue;
            }
            let root: ObjectNode = decode(&document.text)?;
            if matches(&root, query) {
                found.push(reference);
            }
        }
        found.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(found)
    }
}

fn encode_document<T: Serialize>(value: &T) -> String {
    // Encoding our own derive types cannot fail in practice.
    encode(value).expect("document encoding failed")
}

impl ObjectStore for MemoryStore {
    fn find_assets(&self, query: &Query) -> Result<Vec<DocumentRef>, StoreError> {
        self.find_documents(DocumentKind::Asset, query, |root, query| query.matches_node(root))
    }

    fn find_prefabs(&self, query: &Query) -> Result<Vec<DocumentRef>, StoreError> {
        self.find_documents(DocumentKind::Prefab, query, |root, query| query.matches_graph(root))
    }

    fn list_scenes(&self, folders: &[String]) -> Result<Vec<DocumentRef>, StoreError> {
        let inner = self.inner.read();
        let mut found: Vec<DocumentRef> = inner
            .documents
            .iter()
            .filter(|(path, document)| {
                document.kind == DocumentKind::Scene
                    && (folders.is_empty() || folders.iter().any(|f| path.starts_with(f.as_str())))
            })
            .map(|(path, _)| DocumentRef::scene(path.clone()))
            .collect();
        found.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(found)
    }

    fn open_asset(&self, document: &DocumentRef) -> Result<ObjectNode, StoreError> {
        let inner = self.inner.read();
        let stored = inner
            .documents
            .get(&document.path)
            .filter(|d| d.kind == DocumentKind::Asset)
            .ok_or_else(|| StoreError::NotFound(document.path.clone()))?;
        decode(&stored.text)
    }

    fn write_asset(&self, document: &DocumentRef, root: &ObjectNode) -> Result<(), StoreError> {
        let text = encode(root)?;
        let mut inner = self.inner.write();
        if !inner.documents.contains_key(&document.path) {
            return Err(StoreError::NotFound(document.path.clone()));
        }
        inner.pending_assets.insert(document.path.clone(), text);
        Ok(())
    }

    fn flush_assets(&self) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        if inner.failing_flush {
            inner.failing_flush = false;
            return Err(StoreError::SaveRejected("asset batch".into()));
        }
        let pending: Vec<(String, String)> = inner.pending_assets.drain().collect();
        for (path, text) in pending {
            if let Some(document) = inner.documents.get_mut(&path) {
                document.text = text;
            }
        }
        inner.flush_count += 1;
        Ok(())
    }

    fn open_prefab(&self, document: &DocumentRef) -> Result<PrefabDocument, StoreError> {
        let inner = self.inner.read();
        let stored = inner
            .documents
            .get(&document.path)
            .filter(|d| d.kind == DocumentKind::Prefab)
            .ok_or_else(|| StoreError::NotFound(document.path.clone()))?;
        Ok(PrefabDocument {
            source: document.clone(),
            root: decode(&stored.text)?,
        })
    }

    fn save_prefab(&self, prefab: &PrefabDocument) -> Result<(), StoreError> {
        let text = encode(&prefab.root)?;
        let mut inner = self.inner.write();
        if inner.failing_saves.contains(&prefab.source.path) {
            return Err(StoreError::SaveRejected(prefab.source.path.clone()));
        }
        match inner.documents.get_mut(&prefab.source.path) {
            Some(document) => {
                document.text = text;
                Ok(())
            }
            None => Err(StoreError::NotFound(prefab.source.path.clone())),
        }
    }

    fn is_variant(&self, document: &DocumentRef) -> bool {
        self.inner.read().variants.contains(&document.path)
    }

    fn open_scene(&self, path: &str, mode: OpenMode) -> Result<SceneDocument, StoreError> {
        let mut inner = self.inner.write();
        let stored = inner
            .documents
            .get(path)
            .filter(|d| d.kind == DocumentKind::Scene)
            .ok_or_else(|| StoreError::NotFound(path.to_owned()))?;
        let graph: ObjectGraph = decode(&stored.text)?;
        match mode {
            OpenMode::Exclusive => {
                inner.open_scenes = vec![path.to_owned()];
                inner.active_scene = Some(path.to_owned());
            }
            OpenMode::Additive => {
                if !inner.open_scenes.iter().any(|p| p == path) {
                    inner.open_scenes.push(path.to_owned());
                }
            }
        }
        Ok(SceneDocument::new(path, graph))
    }

    fn save_scene(&self, scene: &SceneDocument) -> Result<(), StoreError> {
        let text = encode(&scene.graph)?;
        let mut inner = self.inner.write();
        if inner.failing_saves.contains(&scene.path) {
            return Err(StoreError::SaveRejected(scene.path.clone()));
        }
        match inner.documents.get_mut(&scene.path) {
            Some(document) => {
                document.text = text;
                Ok(())
            }
            None => Err(StoreError::NotFound(scene.path.clone())),
        }
    }

    fn session_state(&self) -> SessionState {
        let inner = self.inner.read();
        SessionState {
            open: inner.open_scenes.clone(),
            active: inner.active_scene.clone(),
        }
    }

    fn confirm_open_scene_changes(&self) -> bool {
        !self.inner.read().confirm_declined
    }

    fn find_component_types(&self, name: &str) -> Vec<TypeTag> {
        self.inner
            .read()
            .type_defs
            .iter()
            .filter(|tag| tag.name().eq_ignore_ascii_case(name))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ComponentInstance;
    use crate::query::DescendantMode;

    fn health_prefab(name: &str) -> ObjectNode {
        ObjectNode::new(name).with_component(ComponentInstance::new("Health").with_field("max", 10i64))
    }

    #[test]
    fn find_prefabs_by_type() {
        let store = MemoryStore::new();
        store.insert_prefab("Assets/Barrel.prefab", &health_prefab("Barrel"));
        store.insert_prefab("Assets/Rock.prefab", &ObjectNode::new("Rock"));

        let found = store.find_prefabs(&Query::by_type("Health")).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, "Assets/Barrel.prefab");
    }

    #[test]
    fn find_prefabs_descendant_modes() {
        let store = MemoryStore::new();
        let nested = ObjectNode::new("Crate").with_child(
            ObjectNode::new("lid")
                .inactive()
                .with_component(ComponentInstance::new("Health")),
        );
        store.insert_prefab("Assets/Crate.prefab", &nested);

        let self_only = Query::by_type("Health");
        assert!(store.find_prefabs(&self_only).unwrap().is_empty());

        let active = self_only.clone().with_descendants(DescendantMode::ActiveDescendants);
        assert!(store.find_prefabs(&active).unwrap().is_empty());

        let all = self_only.with_descendants(DescendantMode::AllDescendants);
        assert_eq!(store.find_prefabs(&all).unwrap().len(), 1);
    }

    #[test]
    fn find_results_are_path_sorted() {
        let store = MemoryStore::new();
        store.insert_prefab("Assets/b.prefab", &health_prefab("b"));
        store.insert_prefab("Assets/a.prefab", &health_prefab("a"));
        store.insert_prefab("Assets/c.prefab", &health_prefab("c"));

        let paths: Vec<_> = store
            .find_prefabs(&Query::by_type("Health"))
            .unwrap()
            .into_iter()
            .map(|d| d.path)
            .collect();
        assert_eq!(paths, vec!["Assets/a.prefab", "Assets/b.prefab", "Assets/c.prefab"]);
    }

    #[test]
    fn open_missing_document() {
        let store = MemoryStore::new();
        let result = store.open_prefab(&DocumentRef::prefab("nope.prefab"));
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn open_wrong_kind_is_not_found() {
        let store = MemoryStore::new();
        store.insert_asset("Assets/data.asset", &ObjectNode::new("data"));
        let result = store.open_prefab(&DocumentRef::prefab("Assets/data.asset"));
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn save_prefab_round_trips() {
        let store = MemoryStore::new();
        store.insert_prefab("Assets/Barrel.prefab", &health_prefab("Barrel"));

        let reference = DocumentRef::prefab("Assets/Barrel.prefab");
        let mut prefab = store.open_prefab(&reference).unwrap();
        prefab.root.component_mut(&TypeTag::new("Health")).unwrap().fields.set("max", 99i64);
        store.save_prefab(&prefab).unwrap();

        let reloaded = store.open_prefab(&reference).unwrap();
        let health = reloaded.root.component(&TypeTag::new("Health")).unwrap();
        assert_eq!(health.fields.get("max").and_then(crate::Value::as_i64), Some(99));
    }

    #[test]
    fn rejected_save_leaves_document_untouched() {
        let store = MemoryStore::new();
        store.insert_prefab("Assets/Barrel.prefab", &health_prefab("Barrel"));
        store.fail_saves_on("Assets/Barrel.prefab");
        let before = store.document_bytes("Assets/Barrel.prefab").unwrap();

        let reference = DocumentRef::prefab("Assets/Barrel.prefab");
        let mut prefab = store.open_prefab(&reference).unwrap();
        prefab.root.name = "Changed".into();
        assert!(matches!(store.save_prefab(&prefab), Err(StoreError::SaveRejected(_))));
        assert_eq!(store.document_bytes("Assets/Barrel.prefab").unwrap(), before);
    }

    #[test]
    fn asset_writes_commit_on_flush() {
        let store = MemoryStore::new();
        store.insert_asset("Assets/data.asset", &ObjectNode::new("data"));
        let before = store.document_bytes("Assets/data.asset").unwrap();

        let reference = DocumentRef::asset("Assets/data.asset");
        let mut root = store.open_asset(&reference).unwrap();
        root.name = "renamed".into();
        store.write_asset(&reference, &root).unwrap();

        // Staged, not yet visible.
        assert_eq!(store.document_bytes("Assets/data.asset").unwrap(), before);

        store.flush_assets().unwrap();
        assert_ne!(store.document_bytes("Assets/data.asset").unwrap(), before);
        assert_eq!(store.flush_count(), 1);
    }

    #[test]
    fn scene_open_modes_update_session() {
        let store = MemoryStore::new();
        store.insert_scene("A.scene", &ObjectGraph::new());
        store.insert_scene("B.scene", &ObjectGraph::new());

        store.open_scene("A.scene", OpenMode::Exclusive).unwrap();
        store.open_scene("B.scene", OpenMode::Additive).unwrap();

        let session = store.session_state();
        assert_eq!(session.open, vec!["A.scene", "B.scene"]);
        assert_eq!(session.active.as_deref(), Some("A.scene"));

        store.open_scene("B.scene", OpenMode::Exclusive).unwrap();
        let session = store.session_state();
        assert_eq!(session.open, vec!["B.scene"]);
        assert_eq!(session.active.as_deref(), Some("B.scene"));
    }

    #[test]
    fn component_type_lookup_is_case_insensitive() {
        let store = MemoryStore::new();
        store.register_component_type("MovementController");

        assert_eq!(store.find_component_types("movementcontroller").len(), 1);
        assert!(store.find_component_types("Movement").is_empty());
    }
}
