//! Supertype unification of type models.
//!
//! The fold is left to right over a pairwise merge:
//!
//! - object ⊕ object: field union, later fields win
//! - object ⊕ intersection: the object is merged into the intersection's
//!   second member and the intersection is reassembled
//! - anything else: a flattened intersection, deduplicated by rendered text
//!
//! Only unaliased objects merge. An aliased object renders by name and is kept
//! as an intersection member.

use crate::type_model::{MemberList, TypeModel, merge_objects};

/// Fold `models` into one representative type. `None` only for an empty input.
pub fn supertype<'q>(models: impl IntoIterator<Item = TypeModel<'q>>) -> Option<TypeModel<'q>> {
    models.into_iter().reduce(merge_pair)
}

fn merge_pair<'q>(left: TypeModel<'q>, right: TypeModel<'q>) -> TypeModel<'q> {
    match (left, right) {
        (TypeModel::Object(a), TypeModel::Object(b)) if a.alias.is_none() && b.alias.is_none() => {
            merge_objects(a, b)
        }
        (TypeModel::Object(object), TypeModel::Intersection(list))
            if object.alias.is_none() && list.alias.is_none() =>
        {
            merge_into_intersection(list, |second| {
                merge_pair(TypeModel::Object(object), second)
            })
        }
        (TypeModel::Intersection(list), TypeModel::Object(object))
            if object.alias.is_none() && list.alias.is_none() =>
        {
            merge_into_intersection(list, |second| {
                merge_pair(second, TypeModel::Object(object))
            })
        }
        (left, right) => intersect(vec![left, right]),
    }
}

/// Replace the intersection's second member with `merge(second)`.
fn merge_into_intersection<'q>(
    list: MemberList<'q>,
    merge: impl FnOnce(TypeModel<'q>) -> TypeModel<'q>,
) -> TypeModel<'q> {
    let mut members = list.members.get().clone().into_iter();
    let mut parts = Vec::new();
    parts.extend(members.next());
    match members.next() {
        Some(second) => parts.push(merge(second)),
        None => {
            if let Some(first) = parts.pop() {
                parts.push(merge(first));
            }
        }
    }
    parts.extend(members);
    intersect(parts)
}

fn intersect(members: Vec<TypeModel<'_>>) -> TypeModel<'_> {
    let merged = TypeModel::intersection_of(members, None);
    debug_assert!(
        !matches!(&merged, TypeModel::Intersection(list) if list.members.is_empty()),
        "intersection of at least two members deduplicated to nothing"
    );
    merged
}

#[cfg(test)]
#[path = "tests/supertype_tests.rs"]
mod tests;
