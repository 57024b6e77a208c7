//! Shapes for destructuring patterns.
//!
//! `function f({ value, nested: { flag } }, [first, , third])` destructures
//! its parameters, so the annotation must be an object (or tuple) type that
//! names exactly the destructured properties. Each element's type comes from
//! its own usage.

use crate::model::{BindingPattern, PatternTarget, SemanticModel};
use crate::usage::UsageCollector;
use anyfix_solver::{PrimitiveKind, TypeModel, UnionPolicy, unify_candidates};
use indexmap::IndexMap;

/// Object or tuple model for `pattern`, or `None` when no element in the
/// pattern has any usage evidence. Elements without evidence are `unknown`.
pub fn infer_destructured_shape<'q, M: SemanticModel>(
    model: &'q M,
    pattern: &BindingPattern,
    policy: &UnionPolicy,
) -> Option<TypeModel<'q>> {
    let (shape, has_evidence) = pattern_shape(model, pattern, policy);
    has_evidence.then_some(shape)
}

fn pattern_shape<'q, M: SemanticModel>(
    model: &'q M,
    pattern: &BindingPattern,
    policy: &UnionPolicy,
) -> (TypeModel<'q>, bool) {
    let mut has_evidence = false;
    let shape = match pattern {
        BindingPattern::Object(fields) => {
            let mut shape_fields = IndexMap::with_capacity(fields.len());
            for field in fields {
                let (field_type, evidence) = target_shape(model, &field.target, policy);
                has_evidence |= evidence;
                shape_fields.insert(field.property.clone(), field_type);
            }
            TypeModel::object(shape_fields)
        }
        BindingPattern::Array(elements) => {
            let mut shape_elements = Vec::with_capacity(elements.len());
            for element in elements {
                let element_type = match element {
                    Some(target) => {
                        let (element_type, evidence) = target_shape(model, target, policy);
                        has_evidence |= evidence;
                        element_type
                    }
                    None => TypeModel::primitive(PrimitiveKind::Unknown),
                };
                shape_elements.push(element_type);
            }
            TypeModel::tuple(shape_elements)
        }
    };
    (shape, has_evidence)
}

fn target_shape<'q, M: SemanticModel>(
    model: &'q M,
    target: &PatternTarget,
    policy: &UnionPolicy,
) -> (TypeModel<'q>, bool) {
    match target {
        PatternTarget::Binding(element) => {
            let candidates = UsageCollector::new(model).collect(*element);
            match unify_candidates(model, &candidates, policy) {
                Some(found) => (found, true),
                None => {
                    tracing::trace!(element = element.0, "no evidence for pattern element");
                    (TypeModel::primitive(PrimitiveKind::Unknown), false)
                }
            }
        }
        PatternTarget::Pattern(nested) => pattern_shape(model, nested, policy),
    }
}
