//! Structural assignability.
//!
//! `is_assignable(source, target)` answers whether a value of `source` may be
//! stored in a location of `target`. Named types are compared structurally
//! after resolution; a pair already under comparison is assumed to relate,
//! which is what makes recursive interfaces terminate.

use crate::types::intrinsics::*;
use crate::types::{ParamInfo, PropertyInfo, TypeData, TypeTable};
use anyfix_common::limits::MAX_ASSIGNABILITY_DEPTH;
use anyfix_solver::TypeId;
use rustc_hash::FxHashSet;
use std::hash::Hash;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RecursionResult {
    Entered,
    Cycle,
    DepthExceeded,
}

/// Tracks the keys of in-progress recursive computations.
pub struct RecursionGuard<K: Hash + Eq + Copy> {
    visiting: FxHashSet<K>,
    depth: u32,
    max_depth: u32,
}

impl<K: Hash + Eq + Copy> RecursionGuard<K> {
    pub fn new(max_depth: u32) -> Self {
        RecursionGuard {
            visiting: FxHashSet::default(),
            depth: 0,
            max_depth,
        }
    }

    /// On [`RecursionResult::Entered`] the caller must [`leave`](Self::leave)
    /// with the same key.
    pub fn enter(&mut self, key: K) -> RecursionResult {
        if self.depth >= self.max_depth {
            return RecursionResult::DepthExceeded;
        }
        if !self.visiting.insert(key) {
            return RecursionResult::Cycle;
        }
        self.depth += 1;
        RecursionResult::Entered
    }

    pub fn leave(&mut self, key: K) {
        let was_present = self.visiting.remove(&key);
        debug_assert!(was_present, "leave() without a matching enter()");
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }
}

pub struct AssignabilityChecker<'t> {
    table: &'t TypeTable,
    guard: RecursionGuard<(TypeId, TypeId)>,
}

impl<'t> AssignabilityChecker<'t> {
    pub fn new(table: &'t TypeTable) -> Self {
        AssignabilityChecker {
            table,
            guard: RecursionGuard::new(MAX_ASSIGNABILITY_DEPTH),
        }
    }

    pub fn is_assignable(&mut self, source: TypeId, target: TypeId) -> bool {
        if source == target || matches!(target, ANY | UNKNOWN) || matches!(source, ANY | NEVER) {
            return true;
        }

        match self.guard.enter((source, target)) {
            RecursionResult::Entered => {}
            RecursionResult::Cycle => return true,
            RecursionResult::DepthExceeded => {
                tracing::debug!(
                    source = source.0,
                    target = target.0,
                    "assignability depth exceeded"
                );
                return false;
            }
        }
        let result = self.is_assignable_worker(source, target);
        self.guard.leave((source, target));
        result
    }

    fn is_assignable_worker(&mut self, source: TypeId, target: TypeId) -> bool {
        let table = self.table;
        let source = table.resolve(source);
        let target = table.resolve(target);
        if source == target || matches!(target, ANY | UNKNOWN) || matches!(source, ANY | NEVER) {
            return true;
        }
        let (Some(source_data), Some(target_data)) = (table.lookup(source), table.lookup(target))
        else {
            return false;
        };

        if matches!(source_data, TypeData::DeferredImport { .. })
            || matches!(target_data, TypeData::DeferredImport { .. })
        {
            return true;
        }

        // Unions and intersections on either side are decomposed first.
        if let TypeData::Union(members) = source_data {
            return members.iter().all(|&m| self.is_assignable(m, target));
        }
        if let TypeData::Union(members) = target_data {
            return members.iter().any(|&m| self.is_assignable(source, m));
        }
        if let TypeData::Intersection(members) = target_data {
            return members.iter().all(|&m| self.is_assignable(source, m));
        }
        if let TypeData::Intersection(members) = source_data {
            return members.iter().any(|&m| self.is_assignable(m, target))
                || self.merged_intersection_assignable(members, target);
        }

        if let TypeData::Object { properties } = target_data {
            return self.object_assignable(source, properties);
        }
        if let Some(base) = table.literal_base(source) {
            return base == target;
        }

        match (source_data, target_data) {
            (TypeData::Intrinsic(_), _) => source == UNDEFINED && target == VOID,
            (_, TypeData::Intrinsic(_)) => false,
            (
                TypeData::Array {
                    element: source_element,
                    readonly: source_readonly,
                },
                TypeData::Array {
                    element: target_element,
                    readonly: target_readonly,
                },
            ) => {
                (*target_readonly || !*source_readonly)
                    && self.is_assignable(*source_element, *target_element)
            }
            (
                TypeData::Tuple {
                    elements,
                    readonly: source_readonly,
                },
                TypeData::Array {
                    element,
                    readonly: target_readonly,
                },
            ) => {
                (*target_readonly || !*source_readonly)
                    && elements.iter().all(|&e| self.is_assignable(e, *element))
            }
            (
                TypeData::Tuple {
                    elements: source_elements,
                    readonly: source_readonly,
                },
                TypeData::Tuple {
                    elements: target_elements,
                    readonly: target_readonly,
                },
            ) => {
                (*target_readonly || !*source_readonly)
                    && source_elements.len() == target_elements.len()
                    && source_elements
                        .iter()
                        .zip(target_elements)
                        .all(|(&s, &t)| self.is_assignable(s, t))
            }
            (TypeData::Function(source_shape), TypeData::Function(target_shape)) => self
                .signature_assignable(
                    &source_shape.params,
                    source_shape.return_type,
                    &target_shape.params,
                    target_shape.return_type,
                ),
            (TypeData::Constructor { class: a, .. }, TypeData::Constructor { class: b, .. }) => {
                a == b
            }
            _ => false,
        }
    }

    /// Parameters compare bivariantly; a `void` return accepts any return.
    fn signature_assignable(
        &mut self,
        source_params: &[ParamInfo],
        source_return: TypeId,
        target_params: &[ParamInfo],
        target_return: TypeId,
    ) -> bool {
        let source_required = source_params.iter().filter(|p| !p.optional).count();
        if source_required > target_params.len() {
            return false;
        }
        for (source_param, target_param) in source_params.iter().zip(target_params) {
            if !self.is_assignable(target_param.type_id, source_param.type_id)
                && !self.is_assignable(source_param.type_id, target_param.type_id)
            {
                return false;
            }
        }
        target_return == VOID || self.is_assignable(source_return, target_return)
    }

    fn object_assignable(&mut self, source: TypeId, target_properties: &[PropertyInfo]) -> bool {
        if matches!(source, NULL | UNDEFINED | VOID | UNKNOWN) {
            return false;
        }
        for target_property in target_properties {
            match self.property_of(source, &target_property.name) {
                Some(source_type) => {
                    if !self.is_assignable(source_type, target_property.type_id) {
                        return false;
                    }
                }
                None if target_property.optional => {}
                None => return false,
            }
        }
        true
    }

    fn merged_intersection_assignable(&mut self, members: &[TypeId], target: TypeId) -> bool {
        let table = self.table;
        let Some(TypeData::Object { properties }) = table.lookup(target) else {
            return false;
        };
        properties.iter().all(|property| {
            let found = members
                .iter()
                .find_map(|&member| self.property_of(member, &property.name));
            match found {
                Some(found) => self.is_assignable(found, property.type_id),
                None => property.optional,
            }
        })
    }

    fn property_of(&self, ty: TypeId, name: &str) -> Option<TypeId> {
        match self.table.resolved_data(ty)? {
            TypeData::Object { properties } => properties
                .iter()
                .find(|property| property.name == name)
                .map(|property| property.type_id),
            TypeData::Intersection(members) => members
                .iter()
                .find_map(|&member| self.property_of(member, name)),
            _ => None,
        }
    }
}

/// One-shot assignability query.
pub fn is_assignable(table: &TypeTable, source: TypeId, target: TypeId) -> bool {
    AssignabilityChecker::new(table).is_assignable(source, target)
}

#[cfg(test)]
#[path = "tests/relation_tests.rs"]
mod tests;
