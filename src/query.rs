//! Discovery queries over the object store.
//!
//! A [`Query`] selects documents by component type (every listed type must
//! be present), optional name text, and optional folder scope.
//! [`DescendantMode`] decides where inside a document's object tree a type
//! is allowed to appear, and whether inactive sub-objects count.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::graph::ObjectNode;

/// Identifier of a component type (capability) attachable to object nodes.
///
/// Equality is exact; name-based resolution (see
/// [`ObjectStore::find_component_types`](crate::ObjectStore::find_component_types))
/// is case-insensitive.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeTag(String);

impl TypeTag {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeTag {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TypeTag {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// How far a query looks into a document's object tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DescendantMode {
    /// Only the document's root object.
    #[default]
    SelfOnly,
    /// The root and its active descendants. An inactive sub-tree is
    /// skipped entirely, children included.
    ActiveDescendants,
    /// The root and all descendants, active or not.
    AllDescendants,
}

/// A discovery query over the object store.
#[derive(Clone, Debug, Default)]
pub struct Query {
    /// Required component types. A document qualifies only if every listed
    /// type is found; an empty list matches every document of the queried
    /// kind.
    pub types: Vec<TypeTag>,
    /// Optional text filter, matched case-insensitively against document
    /// names.
    pub text: Option<String>,
    /// Optional folder scope; empty means the whole project.
    pub folders: Vec<String>,
    /// Where inside the document tree the types may appear.
    pub descendants: DescendantMode,
}

impl Query {
    /// Query for documents carrying a single component type.
    pub fn by_type(tag: impl Into<TypeTag>) -> Self {
        Self {
            types: vec![tag.into()],
            ..Self::default()
        }
    }

    /// Query for documents carrying all of the given component types.
    pub fn by_types(tags: impl IntoIterator<Item = TypeTag>) -> Self {
        Self {
            types: tags.into_iter().collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn in_folders(mut self, folders: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.folders = folders.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_descendants(mut self, mode: DescendantMode) -> Self {
        self.descendants = mode;
        self
    }

    /// Whether a document name passes the text filter.
    pub fn matches_name(&self, name: &str) -> bool {
        match &self.text {
            Some(text) => name.to_ascii_lowercase().contains(&text.to_ascii_lowercase()),
            None => true,
        }
    }

    /// Whether a document path falls inside the folder scope.
    pub fn matches_folders(&self, path: &str) -> bool {
        self.folders.is_empty() || self.folders.iter().any(|folder| path.starts_with(folder.as_str()))
    }

    /// Whether a node directly carries every required type.
    pub fn matches_node(&self, node: &ObjectNode) -> bool {
        self.types.iter().all(|tag| node.has_component(tag))
    }

    /// Whether a document tree qualifies: every required type is found
    /// somewhere allowed by the descendant mode. Each type is searched
    /// independently (the types need not sit on the same node).
    pub fn matches_graph(&self, root: &ObjectNode) -> bool {
        self.types
            .iter()
            .all(|tag| contains_type(root, tag, self.descendants))
    }
}

fn contains_type(root: &ObjectNode, tag: &TypeTag, mode: DescendantMode) -> bool {
    match mode {
        DescendantMode::SelfOnly => root.has_component(tag),
        DescendantMode::ActiveDescendants => contains_type_recursive(root, tag, false),
        DescendantMode::AllDescendants => contains_type_recursive(root, tag, true),
    }
}

fn contains_type_recursive(node: &ObjectNode, tag: &TypeTag, include_inactive: bool) -> bool {
    if !include_inactive && !node.active {
        return false;
    }
    node.has_component(tag)
        || node
            .children
            .iter()
            .any(|child| contains_type_recursive(child, tag, include_inactive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ComponentInstance;

    fn tree() -> ObjectNode {
        ObjectNode::new("root")
            .with_component(ComponentInstance::new(TypeTag::new("Health")))
            .with_child(
                ObjectNode::new("weapon")
                    .with_component(ComponentInstance::new(TypeTag::new("Damage"))),
            )
            .with_child(
                ObjectNode::new("disabled")
                    .inactive()
                    .with_component(ComponentInstance::new(TypeTag::new("Loot"))),
            )
    }

    #[test]
    fn self_only_sees_root_components() {
        let root = tree();
        assert!(Query::by_type("Health").matches_graph(&root));
        assert!(!Query::by_type("Damage").matches_graph(&root));
    }

    #[test]
    fn active_descendants_skip_inactive_subtrees() {
        let root = tree();
        let query = Query::by_type("Damage").with_descendants(DescendantMode::ActiveDescendants);
        assert!(query.matches_graph(&root));

        let query = Query::by_type("Loot").with_descendants(DescendantMode::ActiveDescendants);
        assert!(!query.matches_graph(&root));
    }

    #[test]
    fn all_descendants_include_inactive() {
        let root = tree();
        let query = Query::by_type("Loot").with_descendants(DescendantMode::AllDescendants);
        assert!(query.matches_graph(&root));
    }

    #[test]
    fn types_are_anded() {
        let root = tree();
        let query = Query::by_types([TypeTag::new("Health"), TypeTag::new("Damage")])
            .with_descendants(DescendantMode::AllDescendants);
        assert!(query.matches_graph(&root));

        let query = Query::by_types([TypeTag::new("Health"), TypeTag::new("Mana")])
            .with_descendants(DescendantMode::AllDescendants);
        assert!(!query.matches_graph(&root));
    }

    #[test]
    fn empty_type_list_matches_everything() {
        let root = tree();
        assert!(Query::default().matches_graph(&root));
        assert!(Query::default().matches_node(&root));
    }

    #[test]
    fn text_filter_is_case_insensitive() {
        let query = Query::by_type("Health").with_text("barrel");
        assert!(query.matches_name("Barrel_Large"));
        assert!(!query.matches_name("Crate"));
    }

    #[test]
    fn folder_scope() {
        let query = Query::by_type("Health").in_folders(["Assets/Props"]);
        assert!(query.matches_folders("Assets/Props/Barrel.prefab"));
        assert!(!query.matches_folders("Packages/Extra/Barrel.prefab"));

        assert!(Query::by_type("Health").matches_folders("anywhere/at/all"));
    }
}
