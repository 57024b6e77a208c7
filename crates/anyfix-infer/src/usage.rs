//! Candidate types from the places a binding is used.
//!
//! Each reference contributes zero, one or two raw host types depending on the
//! construct it sits in. Parameters additionally collect evidence from the
//! places their owning callable is called or passed around.

use crate::model::{
    BinaryOperator, BindingKind, NodeId, Reference, SemanticModel, UnaryOperator, UsageSite,
};
use anyfix_solver::{PrimitiveKind, TypeId};

pub struct UsageCollector<'m, M: SemanticModel> {
    model: &'m M,
}

impl<'m, M: SemanticModel> UsageCollector<'m, M> {
    pub fn new(model: &'m M) -> Self {
        UsageCollector { model }
    }

    /// Raw candidate types for `binding`, in reference order, not deduplicated.
    pub fn collect(&self, binding: NodeId) -> Vec<TypeId> {
        let mut candidates = Vec::new();

        if let Some(symbol) = self.model.symbol_of(binding) {
            for reference in self.model.references(symbol) {
                self.from_reference(&reference, &mut candidates);
            }
        }

        if let BindingKind::Parameter { callable, index } = self.model.binding_kind(binding) {
            self.from_callers(callable, index, &mut candidates);
        }

        tracing::trace!(
            binding = binding.0,
            count = candidates.len(),
            "collected usage candidates"
        );
        candidates
    }

    fn from_reference(&self, reference: &Reference, out: &mut Vec<TypeId>) {
        let model = self.model;
        let own = model.type_of(reference.node);
        tracing::trace!(node = reference.node.0, site = ?reference.site, "classifying reference");

        match &reference.site {
            UsageSite::AssignmentTarget { value } => {
                out.push(own);
                out.push(model.type_of(*value));
            }
            UsageSite::AssignmentSource { target } => {
                out.push(model.type_of(*target));
                out.push(own);
            }
            UsageSite::Initializer { declaration } => {
                if model.has_explicit_annotation(*declaration) {
                    out.push(model.type_of(*declaration));
                }
                out.push(own);
            }
            UsageSite::CallArgument { callee, index } => {
                out.push(own);
                if let Some(param) = model
                    .declared_parameter_types(*callee)
                    .and_then(|params| params.get(*index).copied())
                {
                    out.push(param);
                }
            }
            UsageSite::Binary { operator, other } => match operator {
                BinaryOperator::Minus => out.push(model.intrinsic(PrimitiveKind::Number)),
                BinaryOperator::Plus => {
                    if model.is_number_like(model.type_of(*other)) {
                        out.push(model.intrinsic(PrimitiveKind::Number));
                    }
                }
                BinaryOperator::LogicalAnd => out.push(model.intrinsic(PrimitiveKind::Boolean)),
                _ => {}
            },
            UsageSite::Unary {
                operator: UnaryOperator::Not,
            } => out.push(model.intrinsic(PrimitiveKind::Boolean)),
            UsageSite::TemplateSpan => out.push(model.intrinsic(PrimitiveKind::String)),
            UsageSite::Return { function } => {
                if let Some(declared) = model.declared_return_type(*function) {
                    out.push(declared);
                }
            }
            UsageSite::Unary { .. } | UsageSite::Callee { .. } | UsageSite::Other => {}
        }
    }

    /// Evidence for parameter `index` from references to its callable.
    fn from_callers(&self, callable: NodeId, index: usize, out: &mut Vec<TypeId>) {
        let model = self.model;
        let Some(symbol) = model.symbol_of(callable) else {
            return;
        };

        for reference in model.references(symbol) {
            match &reference.site {
                UsageSite::Callee { arguments } => {
                    if let Some(argument) = arguments.get(index) {
                        out.push(model.type_of(*argument));
                    }
                }
                UsageSite::CallArgument {
                    callee,
                    index: position,
                } => {
                    let expected = model
                        .declared_parameter_types(*callee)
                        .and_then(|params| params.get(*position).copied());
                    if let Some(expected) = expected {
                        self.push_signature_param(expected, index, out);
                    }
                }
                UsageSite::AssignmentSource { target } => {
                    self.push_signature_param(model.type_of(*target), index, out);
                }
                UsageSite::Initializer { declaration } => {
                    if model.has_explicit_annotation(*declaration) {
                        self.push_signature_param(model.type_of(*declaration), index, out);
                    }
                }
                _ => {}
            }
        }
    }

    fn push_signature_param(&self, function_type: TypeId, index: usize, out: &mut Vec<TypeId>) {
        let signature = self.model.call_signatures(function_type).into_iter().next();
        if let Some(param) = signature.and_then(|s| s.params.into_iter().nth(index)) {
            out.push(param.type_id);
        }
    }
}
