//! Higher-level refactor operations built on the engine.

use crate::engine::{RefactorEngine, RunParameters, TransformOutcome};
use crate::error::StoreError;
use crate::graph::ObjectNode;
use crate::ledger::RunResult;
use crate::query::{DescendantMode, Query, TypeTag};
use crate::store::ObjectStore;

impl RefactorEngine<'_> {
    /// Removes every component of type `target` from all prefabs and
    /// scenes that contain one (descendants included, inactive included).
    ///
    /// With `destroy_empty_objects` set, an object that carried the target
    /// and is left with no children and no remaining components is removed
    /// as well. The document root handed to the transform is never removed,
    /// so a prefab's own root survives even when it becomes empty.
    pub fn destroy_components(
        &self,
        target: &TypeTag,
        destroy_empty_objects: bool,
    ) -> Result<RunResult, StoreError> {
        let query = Query::by_type(target.clone()).with_descendants(DescendantMode::AllDescendants);
        let params = RunParameters::discover(self.store, &query)?;
        Ok(self.refactor_components(params, |node, _context| {
            let removed = destroy_in_subtree(node, target, destroy_empty_objects);
            Ok(if removed > 0 {
                TransformOutcome::completed()
            } else {
                TransformOutcome::skipped()
            })
        }))
    }
}

/// Removes `target` components throughout the subtree rooted at `node`,
/// optionally pruning children that end up bare. `node` itself is never
/// removed. Returns the number of components removed.
fn destroy_in_subtree(node: &mut ObjectNode, target: &TypeTag, destroy_empty: bool) -> usize {
    let mut removed = node.remove_components(target);
    let mut index = 0;
    while index < node.children.len() {
        // Only objects that actually carried the target are candidates
        // for removal, and only once their own subtree has been swept.
        let had_target = node.children[index].has_component(target);
        removed += destroy_in_subtree(&mut node.children[index], target, destroy_empty);
        let child = &node.children[index];
        if destroy_empty && had_target && child.children.is_empty() && child.components.is_empty() {
            node.children.remove(index);
        } else {
            index += 1;
        }
    }
    removed
}

/// Rebinds every component of type `old` under `root` to the store's
/// single type definition named `new_name` (exact, case-insensitive name
/// match), leaving all field data untouched. This is a raw type rebinding,
/// not a field migration.
///
/// Returns `false` without mutating anything when no `old` instance exists
/// in the scoped subtree, or when the store knows zero or more than one
/// definition for `new_name`; both cases are logged.
pub fn swap_component_type(
    store: &dyn ObjectStore,
    root: &mut ObjectNode,
    old: &TypeTag,
    new_name: &str,
    mode: DescendantMode,
) -> bool {
    let candidates = store.find_component_types(new_name);
    let new_tag = match candidates.as_slice() {
        [tag] => tag.clone(),
        [] => {
            log::warn!("no component type named '{new_name}' found in the store");
            return false;
        }
        _ => {
            log::warn!(
                "component type name '{new_name}' is ambiguous ({} definitions)",
                candidates.len()
            );
            return false;
        }
    };

    let rebound = match mode {
        DescendantMode::SelfOnly => rebind_node(root, old, &new_tag),
        DescendantMode::ActiveDescendants => rebind_recursive(root, old, &new_tag, false),
        DescendantMode::AllDescendants => rebind_recursive(root, old, &new_tag, true),
    };
    if rebound == 0 {
        log::warn!("no '{old}' instances under '{}'; nothing to swap", root.name);
        return false;
    }
    log::info!("rebound {rebound} '{old}' instance(s) to '{new_tag}'");
    true
}

fn rebind_node(node: &mut ObjectNode, old: &TypeTag, new: &TypeTag) -> usize {
    let mut rebound = 0;
    for component in &mut node.components {
        if component.type_tag == *old {
            component.type_tag = new.clone();
            rebound += 1;
        }
    }
    rebound
}

fn rebind_recursive(node: &mut ObjectNode, old: &TypeTag, new: &TypeTag, include_inactive: bool) -> usize {
    if !include_inactive && !node.active {
        return 0;
    }
    let mut rebound = rebind_node(node, old, new);
    for child in &mut node.children {
        rebound += rebind_recursive(child, old, new, include_inactive);
    }
    rebound
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ComponentInstance;

    fn tag(name: &str) -> TypeTag {
        TypeTag::new(name)
    }

    #[test]
    fn destroy_removes_components_everywhere() {
        let mut root = ObjectNode::new("root")
            .with_component(ComponentInstance::new("Junk"))
            .with_child(
                ObjectNode::new("child")
                    .with_component(ComponentInstance::new("Junk"))
                    .with_component(ComponentInstance::new("Health")),
            );

        let removed = destroy_in_subtree(&mut root, &tag("Junk"), false);
        assert_eq!(removed, 2);
        assert!(!root.has_component(&tag("Junk")));
        assert!(root.children[0].has_component(&tag("Health")));
    }

    #[test]
    fn destroy_prunes_bare_children_but_not_root() {
        let mut root = ObjectNode::new("root")
            .with_component(ComponentInstance::new("Junk"))
            .with_child(ObjectNode::new("bare").with_component(ComponentInstance::new("Junk")))
            .with_child(
                ObjectNode::new("kept")
                    .with_component(ComponentInstance::new("Junk"))
                    .with_component(ComponentInstance::new("Health")),
            );

        destroy_in_subtree(&mut root, &tag("Junk"), true);

        // "bare" had only the target left; "kept" still carries Health.
        // The root is stripped but never removed.
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].name, "kept");
        assert!(root.components.is_empty());
    }

    #[test]
    fn destroy_prunes_cascading_empties() {
        let mut root = ObjectNode::new("root").with_child(
            ObjectNode::new("outer")
                .with_component(ComponentInstance::new("Junk"))
                .with_child(ObjectNode::new("inner").with_component(ComponentInstance::new("Junk"))),
        );

        destroy_in_subtree(&mut root, &tag("Junk"), true);
        assert!(root.children.is_empty());
    }

    #[test]
    fn destroy_leaves_unrelated_children_alone() {
        let mut root = ObjectNode::new("root")
            .with_child(ObjectNode::new("plain"))
            .with_child(ObjectNode::new("junked").with_component(ComponentInstance::new("Junk")));

        destroy_in_subtree(&mut root, &tag("Junk"), true);

        // "plain" never carried the target; it stays even though it is bare.
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].name, "plain");
    }

    #[test]
    fn rebind_scopes_by_mode() {
        let build = || {
            ObjectNode::new("root")
                .with_component(ComponentInstance::new("Old"))
                .with_child(ObjectNode::new("on").with_component(ComponentInstance::new("Old")))
                .with_child(
                    ObjectNode::new("off")
                        .inactive()
                        .with_component(ComponentInstance::new("Old")),
                )
        };

        let mut root = build();
        assert_eq!(rebind_node(&mut root, &tag("Old"), &tag("New")), 1);

        let mut root = build();
        assert_eq!(rebind_recursive(&mut root, &tag("Old"), &tag("New"), false), 2);

        let mut root = build();
        assert_eq!(rebind_recursive(&mut root, &tag("Old"), &tag("New"), true), 3);
    }

    #[test]
    fn rebind_preserves_fields() {
        let mut root = ObjectNode::new("root")
            .with_component(ComponentInstance::new("Old").with_field("hp", 42i64).with_field("label", "boss"));
        let fields_before = root.components[0].fields.clone();

        rebind_node(&mut root, &tag("Old"), &tag("New"));

        assert_eq!(root.components[0].type_tag, tag("New"));
        assert_eq!(root.components[0].fields, fields_before);
    }
}
