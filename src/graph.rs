//! Editable document object graphs.
//!
//! [`ObjectNode`] is the in-memory form of one object inside a prefab or
//! scene: a name, an active flag, attached [`ComponentInstance`]s, and
//! child nodes forming a recursive tree. [`ObjectGraph`] is a whole scene's
//! root set; a prefab document uses a single root node.
//!
//! Nodes always carry an implicit structural transform; `components`
//! holds only real capabilities, so a node with an empty component list is
//! a bare container.

use serde::{Deserialize, Serialize};

use crate::query::TypeTag;
use crate::value::Value;

/// A single component attached to an object node: a type tag plus its
/// serialized field data. The engine never interprets `fields`; transforms
/// own their meaning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComponentInstance {
    pub type_tag: TypeTag,
    pub fields: Value,
}

impl ComponentInstance {
    /// Creates a component of the given type with an empty field map.
    pub fn new(type_tag: impl Into<TypeTag>) -> Self {
        Self {
            type_tag: type_tag.into(),
            fields: Value::map(),
        }
    }

    /// Builder form: adds or replaces one field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.set(key, value);
        self
    }
}

/// A node in a document's object tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectNode {
    pub name: String,
    pub active: bool,
    pub components: Vec<ComponentInstance>,
    pub children: Vec<ObjectNode>,
}

impl ObjectNode {
    /// Creates an active node with no components and no children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active: true,
            components: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder form: attaches a component.
    #[must_use]
    pub fn with_component(mut self, component: ComponentInstance) -> Self {
        self.components.push(component);
        self
    }

    /// Builder form: appends a child node.
    #[must_use]
    pub fn with_child(mut self, child: ObjectNode) -> Self {
        self.children.push(child);
        self
    }

    /// Builder form: marks the node inactive.
    #[must_use]
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Whether a component of the given type is attached directly.
    pub fn has_component(&self, tag: &TypeTag) -> bool {
        self.components.iter().any(|c| c.type_tag == *tag)
    }

    /// First attached component of the given type, if any.
    pub fn component(&self, tag: &TypeTag) -> Option<&ComponentInstance> {
        self.components.iter().find(|c| c.type_tag == *tag)
    }

    /// Mutable variant of [`component`](Self::component).
    pub fn component_mut(&mut self, tag: &TypeTag) -> Option<&mut ComponentInstance> {
        self.components.iter_mut().find(|c| c.type_tag == *tag)
    }

    /// Removes every component of the given type from this node, returning
    /// how many were removed. Children are not touched.
    pub fn remove_components(&mut self, tag: &TypeTag) -> usize {
        let before = self.components.len();
        self.components.retain(|c| c.type_tag != *tag);
        before - self.components.len()
    }

    /// First direct child with the given name, if any.
    pub fn find_child(&self, name: &str) -> Option<&ObjectNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Visits this node and its descendants in pre-order, calling `f` on
    /// every node that directly carries all of `types` (an empty list
    /// matches every node). When `include_inactive` is false, an inactive
    /// node and its whole sub-tree are skipped.
    pub fn for_each_matching_mut(
        &mut self,
        types: &[TypeTag],
        include_inactive: bool,
        f: &mut dyn FnMut(&mut ObjectNode),
    ) {
        if !include_inactive && !self.active {
            return;
        }
        if types.iter().all(|tag| self.has_component(tag)) {
            f(self);
        }
        for child in &mut self.children {
            child.for_each_matching_mut(types, include_inactive, f);
        }
    }
}

/// A scene's editable object graph: the set of root objects.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectGraph {
    pub roots: Vec<ObjectNode>,
}

impl ObjectGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form: appends a root node.
    #[must_use]
    pub fn with_root(mut self, root: ObjectNode) -> Self {
        self.roots.push(root);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str) -> TypeTag {
        TypeTag::new(name)
    }

    #[test]
    fn component_lookup() {
        let node = ObjectNode::new("barrel")
            .with_component(ComponentInstance::new("Health").with_field("max", 50i64));

        assert!(node.has_component(&tag("Health")));
        assert!(!node.has_component(&tag("Mana")));
        let health = node.component(&tag("Health")).unwrap();
        assert_eq!(health.fields.get("max").and_then(Value::as_i64), Some(50));
    }

    #[test]
    fn remove_components_counts() {
        let mut node = ObjectNode::new("barrel")
            .with_component(ComponentInstance::new("Buff"))
            .with_component(ComponentInstance::new("Buff"))
            .with_component(ComponentInstance::new("Health"));

        assert_eq!(node.remove_components(&tag("Buff")), 2);
        assert_eq!(node.components.len(), 1);
        assert_eq!(node.remove_components(&tag("Buff")), 0);
    }

    #[test]
    fn walk_visits_matching_nodes_in_preorder() {
        let mut root = ObjectNode::new("root")
            .with_component(ComponentInstance::new("Marker"))
            .with_child(ObjectNode::new("a").with_component(ComponentInstance::new("Marker")))
            .with_child(ObjectNode::new("b"))
            .with_child(
                ObjectNode::new("c")
                    .with_child(ObjectNode::new("d").with_component(ComponentInstance::new("Marker"))),
            );

        let mut visited = Vec::new();
        root.for_each_matching_mut(&[tag("Marker")], true, &mut |node| {
            visited.push(node.name.clone());
        });
        assert_eq!(visited, vec!["root", "a", "d"]);
    }

    #[test]
    fn walk_skips_inactive_subtrees() {
        let mut root = ObjectNode::new("root").with_child(
            ObjectNode::new("off")
                .inactive()
                .with_component(ComponentInstance::new("Marker"))
                .with_child(ObjectNode::new("nested").with_component(ComponentInstance::new("Marker"))),
        );

        let mut visited = 0;
        root.for_each_matching_mut(&[tag("Marker")], false, &mut |_| visited += 1);
        assert_eq!(visited, 0);

        root.for_each_matching_mut(&[tag("Marker")], true, &mut |_| visited += 1);
        assert_eq!(visited, 2);
    }

    #[test]
    fn walk_with_empty_types_visits_every_node() {
        let mut root = ObjectNode::new("root").with_child(ObjectNode::new("a").with_child(ObjectNode::new("b")));

        let mut visited = 0;
        root.for_each_matching_mut(&[], true, &mut |_| visited += 1);
        assert_eq!(visited, 3);
    }
}
