//! Canonical type representation.
//!
//! A [`TypeModel`] is built from a host [`TypeId`] and borrows the host for
//! `'q`. Structural members (array elements, tuple elements, object fields,
//! function signatures, union members) are [`Deferred`]: they are expanded on
//! first read, so a recursive declared type never recurses at construction.
//!
//! Classification precedence in [`TypeModel::from_semantic`]:
//! literal, keyword, tuple, callable, array, object, intersection, union,
//! and finally `Unsupported` carrying the host's display text.

use crate::deferred::Deferred;
use crate::query::{CallSignature, LiteralValue, PrimitiveKind, TypeId, TypeQuery};
use anyfix_common::limits::MAX_TYPE_MODEL_DEPTH;
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

#[derive(Clone, Debug)]
pub enum TypeModel<'q> {
    Primitive(PrimitiveType),
    Literal(LiteralValue),
    Array(ArrayType<'q>),
    Tuple(TupleType<'q>),
    Function(FunctionType<'q>),
    Object(ObjectType<'q>),
    Union(MemberList<'q>),
    Intersection(MemberList<'q>),
    /// Opaque type that only carries display text.
    Unsupported(String),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PrimitiveType {
    pub kind: PrimitiveKind,
    /// The host type this primitive was read from, if any.
    pub origin: Option<TypeId>,
}

#[derive(Clone, Debug)]
pub struct ArrayType<'q> {
    pub element: Deferred<'q, TypeModel<'q>>,
    pub readonly: bool,
    pub alias: Option<String>,
}

#[derive(Clone, Debug)]
pub struct TupleType<'q> {
    pub elements: Deferred<'q, Vec<TypeModel<'q>>>,
    pub readonly: bool,
    pub alias: Option<String>,
}

#[derive(Clone, Debug)]
pub struct Signature<'q> {
    pub params: IndexMap<String, TypeModel<'q>>,
    pub return_type: TypeModel<'q>,
}

#[derive(Clone, Debug)]
pub struct FunctionType<'q> {
    pub signature: Deferred<'q, Signature<'q>>,
    pub alias: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ObjectType<'q> {
    pub fields: Deferred<'q, IndexMap<String, TypeModel<'q>>>,
    pub alias: Option<String>,
}

#[derive(Clone, Debug)]
pub struct MemberList<'q> {
    pub members: Deferred<'q, Vec<TypeModel<'q>>>,
    pub alias: Option<String>,
}

// =============================================================================
// Construction from host types
// =============================================================================

impl<'q> TypeModel<'q> {
    pub fn from_semantic(query: &'q dyn TypeQuery, ty: TypeId) -> Self {
        Self::build(query, ty, 0)
    }

    fn build(query: &'q dyn TypeQuery, ty: TypeId, depth: u32) -> Self {
        if let Some(literal) = query.literal_value(ty) {
            return TypeModel::Literal(literal);
        }
        if let Some(kind) = query.primitive_kind(ty) {
            return TypeModel::Primitive(PrimitiveType {
                kind,
                origin: Some(ty),
            });
        }
        if depth >= MAX_TYPE_MODEL_DEPTH {
            tracing::trace!(ty = ty.0, depth, "type model depth limit reached");
            return TypeModel::Unsupported(query.type_text(ty));
        }

        let alias = query.alias_name(ty);
        let child = depth + 1;

        if let Some(elements) = query.tuple_elements(ty) {
            return TypeModel::Tuple(TupleType {
                elements: Deferred::new(move || {
                    elements
                        .into_iter()
                        .map(|element| Self::build(query, element, child))
                        .collect()
                }),
                readonly: query.is_readonly(ty),
                alias,
            });
        }

        if let Some(signature) = query.call_signatures(ty).into_iter().next() {
            return TypeModel::Function(FunctionType {
                signature: Deferred::new(move || Signature::build(query, signature, child)),
                alias,
            });
        }

        if let Some(element) = query.array_element(ty) {
            return TypeModel::Array(ArrayType {
                element: Deferred::new(move || Self::build(query, element, child)),
                readonly: query.is_readonly(ty),
                alias,
            });
        }

        if query.is_object(ty) {
            return TypeModel::Object(ObjectType {
                fields: Deferred::new(move || {
                    query
                        .properties(ty)
                        .into_iter()
                        .map(|(name, prop)| (name, Self::build(query, prop, child)))
                        .collect()
                }),
                alias,
            });
        }

        if let Some(members) = query.intersection_members(ty) {
            let parts = members
                .into_iter()
                .map(|member| Self::build(query, member, child))
                .collect();
            return Self::intersection_of(parts, alias);
        }

        if let Some(members) = query.union_members(ty) {
            return TypeModel::Union(MemberList {
                members: Deferred::new(move || {
                    collapse_boolean_literals(
                        members
                            .into_iter()
                            .map(|member| Self::build(query, member, child))
                            .collect(),
                    )
                }),
                alias,
            });
        }

        TypeModel::Unsupported(query.type_text(ty))
    }

    // =========================================================================
    // Direct constructors
    // =========================================================================

    pub fn primitive(kind: PrimitiveKind) -> Self {
        TypeModel::Primitive(PrimitiveType { kind, origin: None })
    }

    /// Unaliased object with already computed fields.
    pub fn object(fields: IndexMap<String, TypeModel<'q>>) -> Self {
        TypeModel::Object(ObjectType {
            fields: Deferred::ready(fields),
            alias: None,
        })
    }

    pub fn tuple(elements: Vec<TypeModel<'q>>) -> Self {
        TypeModel::Tuple(TupleType {
            elements: Deferred::ready(elements),
            readonly: false,
            alias: None,
        })
    }

    pub fn union(members: Vec<TypeModel<'q>>) -> Self {
        TypeModel::Union(MemberList {
            members: Deferred::ready(members),
            alias: None,
        })
    }

    /// Flatten nested unaliased intersections, merge unaliased object members
    /// into the first of them, and drop duplicates by rendered text.
    ///
    /// A single surviving member is returned as itself.
    pub fn intersection_of(members: Vec<TypeModel<'q>>, alias: Option<String>) -> Self {
        let mut parts = dedup_by_text(merge_unaliased_objects(flatten_intersections(members)));
        if parts.len() == 1 && alias.is_none() {
            if let Some(only) = parts.pop() {
                return only;
            }
        }
        TypeModel::Intersection(MemberList {
            members: Deferred::ready(parts),
            alias,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn alias(&self) -> Option<&str> {
        match self {
            TypeModel::Array(array) => array.alias.as_deref(),
            TypeModel::Tuple(tuple) => tuple.alias.as_deref(),
            TypeModel::Function(function) => function.alias.as_deref(),
            TypeModel::Object(object) => object.alias.as_deref(),
            TypeModel::Union(list) | TypeModel::Intersection(list) => list.alias.as_deref(),
            TypeModel::Primitive(_) | TypeModel::Literal(_) | TypeModel::Unsupported(_) => None,
        }
    }

    pub fn is_unaliased_object(&self) -> bool {
        matches!(self, TypeModel::Object(object) if object.alias.is_none())
    }

    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self {
            TypeModel::Primitive(primitive) => Some(primitive.kind),
            _ => None,
        }
    }

    /// Variant name used in serialized output.
    pub fn kind_name(&self) -> &'static str {
        match self {
            TypeModel::Primitive(primitive) => primitive.kind.as_str(),
            TypeModel::Literal(LiteralValue::Number(_)) => "number-literal",
            TypeModel::Literal(LiteralValue::String(_)) => "string-literal",
            TypeModel::Literal(LiteralValue::Boolean(_)) => "boolean-literal",
            TypeModel::Array(_) => "array",
            TypeModel::Tuple(_) => "tuple",
            TypeModel::Function(_) => "function",
            TypeModel::Object(_) => "object",
            TypeModel::Union(_) => "union",
            TypeModel::Intersection(_) => "intersection",
            TypeModel::Unsupported(_) => "unsupported",
        }
    }
}

impl<'q> Signature<'q> {
    fn build(query: &'q dyn TypeQuery, signature: CallSignature, depth: u32) -> Self {
        let mut params = IndexMap::with_capacity(signature.params.len());
        for (index, param) in signature.params.into_iter().enumerate() {
            let name = if param.name.is_empty() || params.contains_key(&param.name) {
                format!("arg{index}")
            } else {
                param.name
            };
            params.insert(name, TypeModel::build(query, param.type_id, depth));
        }
        Signature {
            params,
            return_type: TypeModel::build(query, signature.return_type, depth),
        }
    }
}

/// Field union of two objects; fields of `second` win on conflict but keep the
/// position they had in `first`.
pub(crate) fn merge_objects<'q>(first: ObjectType<'q>, second: ObjectType<'q>) -> TypeModel<'q> {
    TypeModel::Object(ObjectType {
        fields: Deferred::new(move || {
            let mut fields = first.fields.get().clone();
            for (name, field) in second.fields.get() {
                fields.insert(name.clone(), field.clone());
            }
            fields
        }),
        alias: None,
    })
}

fn flatten_intersections(members: Vec<TypeModel<'_>>) -> Vec<TypeModel<'_>> {
    let mut flat = Vec::with_capacity(members.len());
    for member in members {
        match member {
            TypeModel::Intersection(list) if list.alias.is_none() => {
                flat.extend(flatten_intersections(list.members.get().clone()));
            }
            other => flat.push(other),
        }
    }
    flat
}

fn merge_unaliased_objects(members: Vec<TypeModel<'_>>) -> Vec<TypeModel<'_>> {
    let mut merged: Vec<TypeModel<'_>> = Vec::with_capacity(members.len());
    let mut object_slot = None;
    for member in members {
        match member {
            TypeModel::Object(object) if object.alias.is_none() => match object_slot {
                Some(slot) => {
                    if let TypeModel::Object(previous) = &merged[slot] {
                        merged[slot] = merge_objects(previous.clone(), object);
                    }
                }
                None => {
                    object_slot = Some(merged.len());
                    merged.push(TypeModel::Object(object));
                }
            },
            other => merged.push(other),
        }
    }
    merged
}

pub(crate) fn dedup_by_text(members: Vec<TypeModel<'_>>) -> Vec<TypeModel<'_>> {
    let mut seen = rustc_hash::FxHashSet::default();
    members
        .into_iter()
        .filter(|member| seen.insert(member.render()))
        .collect()
}

fn collapse_boolean_literals(members: Vec<TypeModel<'_>>) -> Vec<TypeModel<'_>> {
    let is_bool = |member: &TypeModel<'_>, value: bool| {
        matches!(member, TypeModel::Literal(LiteralValue::Boolean(b)) if *b == value)
    };
    let has_true = members.iter().any(|m| is_bool(m, true));
    let has_false = members.iter().any(|m| is_bool(m, false));
    if !(has_true && has_false) {
        return members;
    }

    let mut collapsed = Vec::with_capacity(members.len() - 1);
    let mut placed = false;
    for member in members {
        if matches!(member, TypeModel::Literal(LiteralValue::Boolean(_))) {
            if !placed {
                collapsed.push(TypeModel::primitive(PrimitiveKind::Boolean));
                placed = true;
            }
        } else {
            collapsed.push(member);
        }
    }
    collapsed
}

// =============================================================================
// Serialization
// =============================================================================

impl Serialize for TypeModel<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("kind", self.kind_name())?;
        if let Some(alias) = self.alias() {
            map.serialize_entry("alias", alias)?;
            return map.end();
        }
        match self {
            TypeModel::Primitive(_) => {}
            TypeModel::Literal(LiteralValue::Number(value)) => {
                map.serialize_entry("value", value)?;
            }
            TypeModel::Literal(LiteralValue::String(value)) => {
                map.serialize_entry("value", value)?;
            }
            TypeModel::Literal(LiteralValue::Boolean(value)) => {
                map.serialize_entry("value", value)?;
            }
            TypeModel::Array(array) => {
                map.serialize_entry("readonly", &array.readonly)?;
                map.serialize_entry("element", array.element.get())?;
            }
            TypeModel::Tuple(tuple) => {
                map.serialize_entry("readonly", &tuple.readonly)?;
                map.serialize_entry("elements", tuple.elements.get())?;
            }
            TypeModel::Function(function) => {
                let signature = function.signature.get();
                map.serialize_entry("params", &signature.params)?;
                map.serialize_entry("returnType", &signature.return_type)?;
            }
            TypeModel::Object(object) => {
                map.serialize_entry("fields", object.fields.get())?;
            }
            TypeModel::Union(list) | TypeModel::Intersection(list) => {
                map.serialize_entry("members", list.members.get())?;
            }
            TypeModel::Unsupported(text) => {
                map.serialize_entry("text", text)?;
            }
        }
        map.end()
    }
}

#[cfg(test)]
#[path = "tests/type_model_tests.rs"]
mod tests;
