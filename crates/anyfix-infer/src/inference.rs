//! Per-binding inference entry point.

use crate::destructure::infer_destructured_shape;
use crate::model::{NodeId, SemanticModel};
use crate::usage::UsageCollector;
use anyfix_solver::{TypeModel, UnionPolicy, unify_candidates};

/// Result of trying to infer a type for one binding.
#[derive(Debug)]
pub enum InferenceOutcome<'q> {
    TypeFound(TypeModel<'q>),
    /// The binding is `any` but nothing usable was observed.
    NoTypeFound,
    /// The binding is not implicitly `any`; nothing to do.
    NoAny,
}

impl InferenceOutcome<'_> {
    pub fn annotation(&self) -> Option<String> {
        match self {
            InferenceOutcome::TypeFound(model) => Some(model.render()),
            InferenceOutcome::NoTypeFound | InferenceOutcome::NoAny => None,
        }
    }
}

/// Unannotated and typed as the escape hatch. An explicit `any` is left alone.
pub fn needs_inference<M: SemanticModel>(model: &M, binding: NodeId) -> bool {
    !model.has_explicit_annotation(binding) && model.is_escape_hatch(model.type_of(binding))
}

/// Infer an annotation for `binding`.
///
/// A destructuring pattern is typed from its elements alone; other bindings
/// are typed from their usage and, for parameters, their callers.
pub fn infer_binding_type<'q, M: SemanticModel>(
    model: &'q M,
    binding: NodeId,
    policy: &UnionPolicy,
) -> InferenceOutcome<'q> {
    if !needs_inference(model, binding) {
        return InferenceOutcome::NoAny;
    }

    let found = match model.binding_pattern(binding) {
        Some(pattern) => infer_destructured_shape(model, &pattern, policy),
        None => {
            let candidates = UsageCollector::new(model).collect(binding);
            unify_candidates(model, &candidates, policy)
        }
    };

    match found {
        Some(found) => InferenceOutcome::TypeFound(found),
        None => InferenceOutcome::NoTypeFound,
    }
}
