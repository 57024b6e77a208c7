//! Usage-based inference for bindings whose type is implicitly `any`.
//!
//! - [`SemanticModel`]: the program-level queries and mutations a host exposes.
//! - [`UsageCollector`]: gathers candidate types from every reference to a binding.
//! - [`infer_destructured_shape`]: object/tuple shapes for destructuring patterns.
//! - [`infer_binding_type`]: the per-binding entry point returning an
//!   [`InferenceOutcome`].

pub mod model;
pub use model::{
    BinaryOperator, BindingKind, BindingPattern, FileId, MutationError, NodeId, PatternField,
    PatternTarget, Reference, SemanticModel, SymbolId, UnaryOperator, UsageSite,
};

pub mod usage;
pub use usage::UsageCollector;

pub mod destructure;
pub use destructure::infer_destructured_shape;

pub mod inference;
pub use inference::{InferenceOutcome, infer_binding_type, needs_inference};
