//! Type model and candidate unification.
//!
//! This crate owns the host-independent half of type inference:
//!
//! - [`TypeQuery`]: the structural questions the core asks a host type checker.
//! - [`TypeModel`]: a canonical, lazily expanded representation of a host type,
//!   with text rendering and `serde` serialization.
//! - [`supertype`]: pairwise merging of structural types into one representative.
//! - [`compute_types_from_list`]: the widening heuristic that turns usage
//!   evidence into a single annotation.
//!
//! Nothing here mutates source; see `anyfix-driver` for that.

pub mod query;
pub use query::{CallSignature, LiteralValue, PrimitiveKind, SignatureParam, TypeId, TypeQuery};

pub mod deferred;
pub use deferred::Deferred;

pub mod type_model;
pub use type_model::{
    ArrayType, FunctionType, MemberList, ObjectType, PrimitiveType, Signature, TupleType,
    TypeModel,
};

mod render;

pub mod supertype;
pub use supertype::supertype;

pub mod type_list;
pub use type_list::{
    UnionPolicy, compute_types_from_list, contains_nested_escape_hatch, unify_candidates,
};

#[cfg(test)]
#[path = "tests/test_types.rs"]
pub(crate) mod test_types;
