//! Deterministic prefab ordering for refactor runs.
//!
//! Base prefabs are visited before variants so that an edit to a base has
//! landed by the time a variant's overrides are touched; within each group
//! the order is by document name (plain code-point comparison, no locale),
//! which keeps runs reproducible for test fixtures.

use crate::document::DocumentRef;
use crate::store::ObjectStore;

/// Sorts prefabs in place: all non-variants first, then all variants,
/// each group name-sorted (ties broken by full path).
pub fn sort_prefabs(store: &dyn ObjectStore, prefabs: &mut [DocumentRef]) {
    prefabs.sort_by(|a, b| {
        let a_variant = store.is_variant(a);
        let b_variant = store.is_variant(b);
        a_variant
            .cmp(&b_variant)
            .then_with(|| a.name().cmp(b.name()))
            .then_with(|| a.path.cmp(&b.path))
    });
}
