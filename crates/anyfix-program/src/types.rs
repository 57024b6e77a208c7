//! Interned type storage for the reference host.
//!
//! Every structural type is interned once in a [`TypeTable`] and addressed by
//! a `TypeId`. Intrinsics occupy fixed slots. Named types (aliases,
//! interfaces, classes) are interned as `Named(name)` and resolved through a
//! separate target map, so recursive declarations never recurse at intern time.

use anyfix_common::js_number_to_string;
use anyfix_common::limits::MAX_ALIAS_RESOLUTION_HOPS;
use anyfix_solver::{PrimitiveKind, TypeId};
use rustc_hash::FxHashMap;

pub mod intrinsics {
    use anyfix_solver::TypeId;

    pub const ANY: TypeId = TypeId(0);
    pub const UNKNOWN: TypeId = TypeId(1);
    pub const NEVER: TypeId = TypeId(2);
    pub const VOID: TypeId = TypeId(3);
    pub const NULL: TypeId = TypeId(4);
    pub const UNDEFINED: TypeId = TypeId(5);
    pub const BOOLEAN: TypeId = TypeId(6);
    pub const NUMBER: TypeId = TypeId(7);
    pub const STRING: TypeId = TypeId(8);
    pub const TRUE: TypeId = TypeId(9);
    pub const FALSE: TypeId = TypeId(10);
}

use intrinsics::*;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PropertyInfo {
    pub name: String,
    pub type_id: TypeId,
    pub optional: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParamInfo {
    pub name: String,
    pub type_id: TypeId,
    pub optional: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionShape {
    pub params: Vec<ParamInfo>,
    pub return_type: TypeId,
}

impl FunctionShape {
    pub fn required_count(&self) -> usize {
        self.params.iter().filter(|param| !param.optional).count()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    Intrinsic(PrimitiveKind),
    /// Bits of the `f64` value, so the variant stays `Eq + Hash`.
    NumberLiteral(u64),
    StringLiteral(String),
    BooleanLiteral(bool),
    Array {
        element: TypeId,
        readonly: bool,
    },
    Tuple {
        elements: Vec<TypeId>,
        readonly: bool,
    },
    Object {
        properties: Vec<PropertyInfo>,
    },
    Function(FunctionShape),
    Union(Vec<TypeId>),
    Intersection(Vec<TypeId>),
    Named(String),
    /// The value side of a class: `typeof C`.
    Constructor {
        class: String,
        params: Vec<ParamInfo>,
    },
    DeferredImport {
        module: String,
        name: String,
    },
}

pub struct TypeTable {
    types: Vec<TypeData>,
    interned: FxHashMap<TypeData, TypeId>,
    named_targets: FxHashMap<String, TypeId>,
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeTable {
    pub fn new() -> Self {
        let mut table = TypeTable {
            types: Vec::new(),
            interned: FxHashMap::default(),
            named_targets: FxHashMap::default(),
        };
        for kind in [
            PrimitiveKind::Any,
            PrimitiveKind::Unknown,
            PrimitiveKind::Never,
            PrimitiveKind::Void,
            PrimitiveKind::Null,
            PrimitiveKind::Undefined,
            PrimitiveKind::Boolean,
            PrimitiveKind::Number,
            PrimitiveKind::String,
        ] {
            table.intern(TypeData::Intrinsic(kind));
        }
        table.intern(TypeData::BooleanLiteral(true));
        table.intern(TypeData::BooleanLiteral(false));
        debug_assert_eq!(table.types.len(), FALSE.0 as usize + 1);
        table
    }

    pub fn intern(&mut self, data: TypeData) -> TypeId {
        if let Some(&id) = self.interned.get(&data) {
            return id;
        }
        let id = TypeId(self.types.len() as u32);
        self.types.push(data.clone());
        self.interned.insert(data, id);
        id
    }

    pub fn lookup(&self, id: TypeId) -> Option<&TypeData> {
        self.types.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn intrinsic(kind: PrimitiveKind) -> TypeId {
        match kind {
            PrimitiveKind::Any => ANY,
            PrimitiveKind::Unknown => UNKNOWN,
            PrimitiveKind::Never => NEVER,
            PrimitiveKind::Void => VOID,
            PrimitiveKind::Null => NULL,
            PrimitiveKind::Undefined => UNDEFINED,
            PrimitiveKind::Boolean => BOOLEAN,
            PrimitiveKind::Number => NUMBER,
            PrimitiveKind::String => STRING,
        }
    }

    pub fn number_literal(&mut self, value: f64) -> TypeId {
        self.intern(TypeData::NumberLiteral(value.to_bits()))
    }

    pub fn string_literal(&mut self, value: &str) -> TypeId {
        self.intern(TypeData::StringLiteral(value.to_string()))
    }

    pub fn boolean_literal(value: bool) -> TypeId {
        if value { TRUE } else { FALSE }
    }

    pub fn array(&mut self, element: TypeId, readonly: bool) -> TypeId {
        self.intern(TypeData::Array { element, readonly })
    }

    pub fn named(&mut self, name: &str) -> TypeId {
        self.intern(TypeData::Named(name.to_string()))
    }

    pub fn function(&mut self, params: Vec<ParamInfo>, return_type: TypeId) -> TypeId {
        self.intern(TypeData::Function(FunctionShape {
            params,
            return_type,
        }))
    }

    pub fn object(&mut self, properties: Vec<PropertyInfo>) -> TypeId {
        self.intern(TypeData::Object { properties })
    }

    /// Normalized union: nested unions flattened, duplicates and `never`
    /// removed, `any` absorbing, `true | false` collapsed to `boolean`,
    /// literals dropped when their base type is present.
    pub fn union(&mut self, members: impl IntoIterator<Item = TypeId>) -> TypeId {
        let mut flat = Vec::new();
        for member in members {
            match self.lookup(member) {
                Some(TypeData::Union(nested)) => flat.extend(nested.iter().copied()),
                _ => flat.push(member),
            }
        }

        let mut unique: Vec<TypeId> = Vec::with_capacity(flat.len());
        for member in flat {
            if member == ANY {
                return ANY;
            }
            if member != NEVER && !unique.contains(&member) {
                unique.push(member);
            }
        }

        if unique.contains(&TRUE) && unique.contains(&FALSE) {
            let first = unique.iter().position(|&m| m == TRUE || m == FALSE);
            if let Some(at) = first.filter(|_| !unique.contains(&BOOLEAN)) {
                unique[at] = BOOLEAN;
            }
            unique.retain(|&m| m != TRUE && m != FALSE);
        }

        let bases: Vec<TypeId> = unique
            .iter()
            .filter(|&&m| matches!(m, BOOLEAN | NUMBER | STRING))
            .copied()
            .collect();
        if !bases.is_empty() {
            unique.retain(|&m| !self.literal_base(m).is_some_and(|base| bases.contains(&base)));
        }

        match unique.len() {
            0 => NEVER,
            1 => unique[0],
            _ => self.intern(TypeData::Union(unique)),
        }
    }

    pub fn intersection(&mut self, members: impl IntoIterator<Item = TypeId>) -> TypeId {
        let mut flat = Vec::new();
        for member in members {
            match self.lookup(member) {
                Some(TypeData::Intersection(nested)) => {
                    for &id in nested {
                        if !flat.contains(&id) {
                            flat.push(id);
                        }
                    }
                }
                _ => {
                    if !flat.contains(&member) {
                        flat.push(member);
                    }
                }
            }
        }
        match flat.len() {
            0 => UNKNOWN,
            1 => flat[0],
            _ => self.intern(TypeData::Intersection(flat)),
        }
    }

    /// `number` for `1`, `string` for `"a"`, `boolean` for `true`.
    pub fn literal_base(&self, id: TypeId) -> Option<TypeId> {
        match self.lookup(id)? {
            TypeData::NumberLiteral(_) => Some(NUMBER),
            TypeData::StringLiteral(_) => Some(STRING),
            TypeData::BooleanLiteral(_) => Some(BOOLEAN),
            _ => None,
        }
    }

    /// Widen literal types for a mutable location.
    pub fn widen(&mut self, id: TypeId) -> TypeId {
        if let Some(base) = self.literal_base(id) {
            return base;
        }
        match self.lookup(id).cloned() {
            Some(TypeData::Union(members)) => {
                let widened: Vec<TypeId> = members.into_iter().map(|m| self.widen(m)).collect();
                self.union(widened)
            }
            _ => id,
        }
    }

    // =========================================================================
    // Named types
    // =========================================================================

    pub fn define_named(&mut self, name: &str, target: TypeId) {
        self.named_targets.insert(name.to_string(), target);
    }

    pub fn clear_named(&mut self) {
        self.named_targets.clear();
    }

    pub fn named_target(&self, name: &str) -> Option<TypeId> {
        self.named_targets.get(name).copied()
    }

    /// Follow `Named` links to a structural type. Unknown or cyclic names
    /// resolve to `unknown`.
    pub fn resolve(&self, mut id: TypeId) -> TypeId {
        for _ in 0..MAX_ALIAS_RESOLUTION_HOPS {
            match self.lookup(id) {
                Some(TypeData::Named(name)) => match self.named_target(name) {
                    Some(target) => id = target,
                    None => return UNKNOWN,
                },
                _ => return id,
            }
        }
        UNKNOWN
    }

    pub fn resolved_data(&self, id: TypeId) -> Option<&TypeData> {
        self.lookup(self.resolve(id))
    }

    pub fn name_of(&self, id: TypeId) -> Option<&str> {
        match self.lookup(id)? {
            TypeData::Named(name) => Some(name),
            _ => None,
        }
    }

    pub fn function_shape(&self, id: TypeId) -> Option<&FunctionShape> {
        match self.resolved_data(id)? {
            TypeData::Function(shape) => Some(shape),
            _ => None,
        }
    }

    // =========================================================================
    // Printing
    // =========================================================================

    /// Display text in the style of compiler diagnostics.
    pub fn type_text(&self, id: TypeId) -> String {
        let mut out = String::new();
        self.print(id, &mut out, 0);
        out
    }

    fn print(&self, id: TypeId, out: &mut String, depth: u32) {
        if depth > 16 {
            out.push_str("...");
            return;
        }
        let Some(data) = self.lookup(id) else {
            out.push_str("unknown");
            return;
        };
        match data {
            TypeData::Intrinsic(kind) => out.push_str(kind.as_str()),
            TypeData::NumberLiteral(bits) => out.push_str(&js_number_to_string(f64::from_bits(*bits))),
            TypeData::StringLiteral(value) => {
                out.push_str(&serde_json::to_string(value).unwrap_or_default());
            }
            TypeData::BooleanLiteral(value) => out.push_str(if *value { "true" } else { "false" }),
            TypeData::Array { element, readonly } => {
                if *readonly {
                    out.push_str("readonly ");
                }
                let wrap = matches!(
                    self.lookup(*element),
                    Some(TypeData::Union(_) | TypeData::Intersection(_) | TypeData::Function(_))
                );
                if wrap {
                    out.push('(');
                }
                self.print(*element, out, depth + 1);
                if wrap {
                    out.push(')');
                }
                out.push_str("[]");
            }
            TypeData::Tuple { elements, readonly } => {
                if *readonly {
                    out.push_str("readonly ");
                }
                out.push('[');
                self.print_list(elements, ", ", out, depth);
                out.push(']');
            }
            TypeData::Object { properties } => {
                if properties.is_empty() {
                    out.push_str("{}");
                    return;
                }
                out.push_str("{ ");
                for property in properties {
                    out.push_str(&property.name);
                    if property.optional {
                        out.push('?');
                    }
                    out.push_str(": ");
                    self.print(property.type_id, out, depth + 1);
                    out.push_str("; ");
                }
                out.push('}');
            }
            TypeData::Function(shape) => self.print_signature(&shape.params, shape.return_type, out, depth),
            TypeData::Union(members) => self.print_list(members, " | ", out, depth),
            TypeData::Intersection(members) => self.print_list(members, " & ", out, depth),
            TypeData::Named(name) => out.push_str(name),
            TypeData::Constructor { class, .. } => {
                out.push_str("typeof ");
                out.push_str(class);
            }
            TypeData::DeferredImport { module, name } => {
                out.push_str("import(");
                out.push_str(&serde_json::to_string(module).unwrap_or_default());
                out.push_str(").");
                out.push_str(name);
            }
        }
    }

    fn print_list(&self, members: &[TypeId], separator: &str, out: &mut String, depth: u32) {
        for (i, member) in members.iter().enumerate() {
            if i > 0 {
                out.push_str(separator);
            }
            let wrap = separator != ", " && matches!(self.lookup(*member), Some(TypeData::Function(_)));
            if wrap {
                out.push('(');
            }
            self.print(*member, out, depth + 1);
            if wrap {
                out.push(')');
            }
        }
    }

    fn print_signature(&self, params: &[ParamInfo], return_type: TypeId, out: &mut String, depth: u32) {
        out.push('(');
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(&param.name);
            if param.optional {
                out.push('?');
            }
            out.push_str(": ");
            self.print(param.type_id, out, depth + 1);
        }
        out.push_str(") => ");
        self.print(return_type, out, depth + 1);
    }
}

#[cfg(test)]
#[path = "tests/types_tests.rs"]
mod tests;
