//! Structural queries against a host type checker.
//!
//! The core never sees the host's internal type representation. It holds
//! opaque [`TypeId`] handles and asks the host about them through
//! [`TypeQuery`]. Every question is read-only.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Opaque handle to a host type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId(pub u32);

/// Keyword types the model treats as leaves.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Any,
    Unknown,
    Never,
    Void,
    Null,
    Undefined,
    Boolean,
    Number,
    String,
}

impl PrimitiveKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            PrimitiveKind::Any => "any",
            PrimitiveKind::Unknown => "unknown",
            PrimitiveKind::Never => "never",
            PrimitiveKind::Void => "void",
            PrimitiveKind::Null => "null",
            PrimitiveKind::Undefined => "undefined",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Number => "number",
            PrimitiveKind::String => "string",
        }
    }

    pub fn from_keyword(text: &str) -> Option<Self> {
        Some(match text {
            "any" => PrimitiveKind::Any,
            "unknown" => PrimitiveKind::Unknown,
            "never" => PrimitiveKind::Never,
            "void" => PrimitiveKind::Void,
            "null" => PrimitiveKind::Null,
            "undefined" => PrimitiveKind::Undefined,
            "boolean" => PrimitiveKind::Boolean,
            "number" => PrimitiveKind::Number,
            "string" => PrimitiveKind::String,
            _ => return None,
        })
    }
}

/// Value of a literal type.
#[derive(Clone, Debug, PartialEq)]
pub enum LiteralValue {
    Number(f64),
    String(String),
    Boolean(bool),
}

impl LiteralValue {
    /// The primitive a literal widens to.
    pub const fn base_kind(&self) -> PrimitiveKind {
        match self {
            LiteralValue::Number(_) => PrimitiveKind::Number,
            LiteralValue::String(_) => PrimitiveKind::String,
            LiteralValue::Boolean(_) => PrimitiveKind::Boolean,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureParam {
    pub name: String,
    pub type_id: TypeId,
    pub optional: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallSignature {
    pub params: Vec<SignatureParam>,
    pub return_type: TypeId,
}

/// Read-only structural view of a host type system.
///
/// Queries answer for the type itself, not its alias: a host resolves named
/// aliases before answering and reports the name through [`alias_name`].
///
/// [`alias_name`]: TypeQuery::alias_name
pub trait TypeQuery {
    fn primitive_kind(&self, ty: TypeId) -> Option<PrimitiveKind>;

    fn literal_value(&self, ty: TypeId) -> Option<LiteralValue>;

    fn tuple_elements(&self, ty: TypeId) -> Option<Vec<TypeId>>;

    fn array_element(&self, ty: TypeId) -> Option<TypeId>;

    /// Whether an array or tuple type is `readonly`.
    fn is_readonly(&self, ty: TypeId) -> bool;

    fn call_signatures(&self, ty: TypeId) -> SmallVec<[CallSignature; 1]>;

    /// Whether the type is an object type with enumerable properties.
    fn is_object(&self, ty: TypeId) -> bool;

    /// Properties of an object type in declaration order.
    fn properties(&self, ty: TypeId) -> Vec<(String, TypeId)>;

    fn union_members(&self, ty: TypeId) -> Option<Vec<TypeId>>;

    fn intersection_members(&self, ty: TypeId) -> Option<Vec<TypeId>>;

    /// Declared name of the type, if it has one (type alias, interface, class).
    fn alias_name(&self, ty: TypeId) -> Option<String>;

    /// A reference into a module the host could not resolve yet.
    fn is_deferred_import(&self, _ty: TypeId) -> bool {
        false
    }

    /// The host's own display text for a type.
    fn type_text(&self, ty: TypeId) -> String;

    /// Handle for a keyword type.
    fn intrinsic(&self, kind: PrimitiveKind) -> TypeId;

    // =========================================================================
    // Derived classification
    // =========================================================================

    fn is_escape_hatch(&self, ty: TypeId) -> bool {
        self.primitive_kind(ty) == Some(PrimitiveKind::Any)
    }

    /// `number` or a number literal.
    fn is_number_like(&self, ty: TypeId) -> bool {
        self.is_kind_like(ty, PrimitiveKind::Number)
    }

    /// `string` or a string literal.
    fn is_string_like(&self, ty: TypeId) -> bool {
        self.is_kind_like(ty, PrimitiveKind::String)
    }

    /// `boolean` or a boolean literal.
    fn is_boolean_like(&self, ty: TypeId) -> bool {
        self.is_kind_like(ty, PrimitiveKind::Boolean)
    }

    fn is_kind_like(&self, ty: TypeId, kind: PrimitiveKind) -> bool {
        if self.primitive_kind(ty) == Some(kind) {
            return true;
        }
        self.literal_value(ty)
            .is_some_and(|literal| literal.base_kind() == kind)
    }
}
