//! Turning usage evidence into one annotation.
//!
//! [`unify_candidates`] applies the widening heuristic to the raw host types
//! collected from a binding's usage sites:
//!
//! 1. Drop the escape hatch, types that contain it (`any[]`), and deferred
//!    imports.
//! 2. Deduplicate by rendered text, keeping first occurrence order.
//! 3. All booleans collapse to `boolean`; a single candidate is used as is;
//!    several unaliased objects unify through [`supertype`].
//! 4. Up to [`UnionPolicy::max_union_members`] candidates become a union
//!    unless a bare `number`/`string` absorbs its literals. Past the limit
//!    only a homogeneous `number`/`string` survives.

use crate::query::{PrimitiveKind, TypeId, TypeQuery};
use crate::supertype::supertype;
use crate::type_model::TypeModel;
use anyfix_common::limits::DEFAULT_MAX_UNION_MEMBERS;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Thresholds for joining candidates into a union.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UnionPolicy {
    pub max_union_members: usize,
}

impl Default for UnionPolicy {
    fn default() -> Self {
        UnionPolicy {
            max_union_members: DEFAULT_MAX_UNION_MEMBERS,
        }
    }
}

struct Candidate<'q> {
    ty: TypeId,
    model: TypeModel<'q>,
}

/// Rendered annotation for `raw_types`, or `None` when there is no usable
/// evidence.
pub fn compute_types_from_list(
    query: &dyn TypeQuery,
    raw_types: &[TypeId],
    policy: &UnionPolicy,
) -> Option<String> {
    unify_candidates(query, raw_types, policy).map(|model| model.render())
}

/// Model form of [`compute_types_from_list`].
pub fn unify_candidates<'q>(
    query: &'q dyn TypeQuery,
    raw_types: &[TypeId],
    policy: &UnionPolicy,
) -> Option<TypeModel<'q>> {
    let mut seen = FxHashSet::default();
    let mut candidates = Vec::with_capacity(raw_types.len());
    for &ty in raw_types {
        if query.is_escape_hatch(ty) || query.is_deferred_import(ty) {
            continue;
        }
        let model = TypeModel::from_semantic(query, ty);
        let text = model.render();
        if contains_nested_escape_hatch(&text) {
            tracing::trace!(ty = ty.0, %text, "dropping candidate with nested any");
            continue;
        }
        if seen.insert(text) {
            candidates.push(Candidate { ty, model });
        }
    }

    if candidates.is_empty() {
        return None;
    }

    if candidates.iter().all(|c| query.is_boolean_like(c.ty)) {
        return Some(TypeModel::primitive(PrimitiveKind::Boolean));
    }

    if candidates.len() == 1 {
        return candidates.pop().map(|c| c.model);
    }

    if candidates.iter().all(|c| c.model.is_unaliased_object()) {
        return supertype(candidates.into_iter().map(|c| c.model));
    }

    let all_number = candidates.iter().all(|c| query.is_number_like(c.ty));
    let all_string = candidates.iter().all(|c| query.is_string_like(c.ty));

    if candidates.len() <= policy.max_union_members {
        let has_bare = |kind: PrimitiveKind| {
            candidates
                .iter()
                .any(|c| query.primitive_kind(c.ty) == Some(kind))
        };
        if all_number && has_bare(PrimitiveKind::Number) {
            return Some(TypeModel::primitive(PrimitiveKind::Number));
        }
        if all_string && has_bare(PrimitiveKind::String) {
            return Some(TypeModel::primitive(PrimitiveKind::String));
        }
        tracing::trace!(
            members = candidates.len(),
            "joining candidates into a union"
        );
        return Some(TypeModel::union(
            candidates.into_iter().map(|c| c.model).collect(),
        ));
    }

    if all_number {
        return Some(TypeModel::primitive(PrimitiveKind::Number));
    }
    if all_string {
        return Some(TypeModel::primitive(PrimitiveKind::String));
    }
    tracing::trace!(
        members = candidates.len(),
        limit = policy.max_union_members,
        "too many heterogeneous candidates"
    );
    None
}

/// Whether annotation text mentions `any` as a type, e.g. `any[]` or
/// `{ "a": any }`. Quoted property names, string literals and parameter
/// names (`(any: number) => void`) are skipped.
pub fn contains_nested_escape_hatch(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'"' {
            i += 1;
            while i < bytes.len() && bytes[i] != b'"' {
                if bytes[i] == b'\\' {
                    i += 1;
                }
                i += 1;
            }
            i += 1;
            continue;
        }
        if is_ident_byte(b) {
            let start = i;
            while i < bytes.len() && is_ident_byte(bytes[i]) {
                i += 1;
            }
            if &text[start..i] == "any" && !is_parameter_name(&bytes[i..]) {
                return true;
            }
            continue;
        }
        i += 1;
    }
    false
}

/// Rendered object keys are quoted, so an unquoted name followed by `:` or
/// `?:` is a parameter.
fn is_parameter_name(rest: &[u8]) -> bool {
    let rest = rest.strip_prefix(b"?").unwrap_or(rest);
    rest.first() == Some(&b':')
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

#[cfg(test)]
#[path = "tests/type_list_tests.rs"]
mod tests;
