//! Annotation text for type models.

use crate::query::LiteralValue;
use crate::type_model::{MemberList, TypeModel};
use anyfix_common::js_number_to_string;
use rustc_hash::FxHashSet;
use std::fmt;

/// Where a nested type is printed, for parenthesization.
#[derive(Copy, Clone, PartialEq, Eq)]
enum Slot {
    Top,
    ArrayElement,
    UnionMember,
    IntersectionMember,
}

impl TypeModel<'_> {
    /// Render as annotation text. Aliased models render as their alias.
    pub fn render(&self) -> String {
        let mut out = String::new();
        write_model(self, Slot::Top, &mut out);
        out
    }
}

impl fmt::Display for TypeModel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn needs_parens(model: &TypeModel<'_>, slot: Slot) -> bool {
    if model.alias().is_some() {
        return false;
    }
    match (model, slot) {
        (_, Slot::Top) => false,
        (TypeModel::Function(_), _) => true,
        (TypeModel::Union(list), Slot::ArrayElement | Slot::IntersectionMember) => {
            list.members.len() > 1
        }
        (TypeModel::Intersection(list), Slot::ArrayElement) => list.members.len() > 1,
        (TypeModel::Array(array), Slot::ArrayElement) => array.readonly,
        _ => false,
    }
}

fn write_model(model: &TypeModel<'_>, slot: Slot, out: &mut String) {
    if needs_parens(model, slot) {
        out.push('(');
        write_unparenthesized(model, out);
        out.push(')');
    } else {
        write_unparenthesized(model, out);
    }
}

fn write_unparenthesized(model: &TypeModel<'_>, out: &mut String) {
    if let Some(alias) = model.alias() {
        out.push_str(alias);
        return;
    }
    match model {
        TypeModel::Primitive(primitive) => out.push_str(primitive.kind.as_str()),
        TypeModel::Literal(LiteralValue::Number(value)) => {
            out.push_str(&js_number_to_string(*value));
        }
        TypeModel::Literal(LiteralValue::String(value)) => out.push_str(&quote(value)),
        TypeModel::Literal(LiteralValue::Boolean(value)) => {
            out.push_str(if *value { "true" } else { "false" });
        }
        TypeModel::Array(array) => {
            if array.readonly {
                out.push_str("readonly ");
            }
            write_model(array.element.get(), Slot::ArrayElement, out);
            out.push_str("[]");
        }
        TypeModel::Tuple(tuple) => {
            if tuple.readonly {
                out.push_str("readonly ");
            }
            out.push('[');
            for (i, element) in tuple.elements.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_model(element, Slot::Top, out);
            }
            out.push(']');
        }
        TypeModel::Function(function) => {
            let signature = function.signature.get();
            out.push('(');
            for (i, (name, param)) in signature.params.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(name);
                out.push_str(": ");
                write_model(param, Slot::Top, out);
            }
            out.push_str(") => ");
            write_model(&signature.return_type, Slot::Top, out);
        }
        TypeModel::Object(object) => {
            let fields = object.fields.get();
            if fields.is_empty() {
                out.push_str("{}");
                return;
            }
            out.push_str("{ ");
            for (i, (name, field)) in fields.iter().enumerate() {
                if i > 0 {
                    out.push_str("; ");
                }
                out.push_str(&quote(name));
                out.push_str(": ");
                write_model(field, Slot::Top, out);
            }
            out.push_str(" }");
        }
        TypeModel::Union(list) => write_members(list, " | ", "never", Slot::UnionMember, out),
        TypeModel::Intersection(list) => {
            write_members(list, " & ", "unknown", Slot::IntersectionMember, out);
        }
        TypeModel::Unsupported(text) => out.push_str(text),
    }
}

fn write_members(list: &MemberList<'_>, separator: &str, empty: &str, slot: Slot, out: &mut String) {
    let mut seen = FxHashSet::default();
    let mut first = true;
    for member in list.members.iter() {
        let mut text = String::new();
        write_model(member, slot, &mut text);
        if !seen.insert(text.clone()) {
            continue;
        }
        if !first {
            out.push_str(separator);
        }
        out.push_str(&text);
        first = false;
    }
    if first {
        out.push_str(empty);
    }
}

fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{text}\""))
}
