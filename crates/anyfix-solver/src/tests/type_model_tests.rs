use super::*;
use crate::test_types::{TestType, TestTypes};

fn render(types: &TestTypes, ty: TypeId) -> String {
    TypeModel::from_semantic(types, ty).render()
}

#[test]
fn test_literal_takes_precedence() {
    let mut types = TestTypes::new();
    let n = types.num(1234.0);
    let s = types.str_lit("on");
    let model = TypeModel::from_semantic(&types, n);
    assert!(matches!(model, TypeModel::Literal(LiteralValue::Number(v)) if v == 1234.0));
    assert_eq!(render(&types, n), "1234");
    assert_eq!(render(&types, s), "\"on\"");
}

#[test]
fn test_primitive_keeps_origin() {
    let types = TestTypes::new();
    let number = types.prim(PrimitiveKind::Number);
    match TypeModel::from_semantic(&types, number) {
        TypeModel::Primitive(primitive) => {
            assert_eq!(primitive.kind, PrimitiveKind::Number);
            assert_eq!(primitive.origin, Some(number));
        }
        other => panic!("expected primitive, got {other:?}"),
    }
}

#[test]
fn test_object_renders_quoted_keys() {
    let mut types = TestTypes::new();
    let string = types.prim(PrimitiveKind::String);
    let number = types.prim(PrimitiveKind::Number);
    let obj = types.object(&[("value", string), ("count", number)]);
    assert_eq!(render(&types, obj), r#"{ "value": string; "count": number }"#);

    let empty = types.object(&[]);
    assert_eq!(render(&types, empty), "{}");
}

#[test]
fn test_string_literal_escaping() {
    let mut types = TestTypes::new();
    let quoted = types.str_lit("say \"hi\"");
    assert_eq!(render(&types, quoted), r#""say \"hi\"""#);
}

#[test]
fn test_alias_renders_name() {
    let mut types = TestTypes::new();
    let number = types.prim(PrimitiveKind::Number);
    let point = types.named("Point", TestType::Object(vec![("x".into(), number)]));
    let points = types.array(point);
    assert_eq!(render(&types, point), "Point");
    assert_eq!(render(&types, points), "Point[]");
}

#[test]
fn test_recursive_alias_is_lazy() {
    let mut types = TestTypes::new();
    let number = types.prim(PrimitiveKind::Number);
    let node = types.reserve(Some("Node"));
    types.define(
        node,
        TestType::Object(vec![("next".into(), node), ("value".into(), number)]),
    );

    let model = TypeModel::from_semantic(&types, node);
    assert_eq!(model.render(), "Node");
    let TypeModel::Object(object) = &model else {
        panic!("expected object");
    };
    assert_eq!(object.fields["next"].render(), "Node");
    assert_eq!(object.fields["value"].render(), "number");
}

#[test]
fn test_anonymous_recursion_stops_at_depth_limit() {
    let mut types = TestTypes::new();
    let cyclic = types.reserve(None);
    types.define(cyclic, TestType::Object(vec![("inner".into(), cyclic)]));

    let text = render(&types, cyclic);
    assert!(text.starts_with(r#"{ "inner": { "inner": "#));
    assert!(text.contains("<type "));
}

#[test]
fn test_function_rendering() {
    let mut types = TestTypes::new();
    let string = types.prim(PrimitiveKind::String);
    let number = types.prim(PrimitiveKind::Number);
    let void = types.prim(PrimitiveKind::Void);
    let parse = types.add(TestType::Function(
        vec![("value".into(), string), ("radix".into(), number)],
        number,
    ));
    assert_eq!(render(&types, parse), "(value: string, radix: number) => number");

    let callback = types.add(TestType::Function(vec![("x".into(), number)], void));
    let callbacks = types.array(callback);
    assert_eq!(render(&types, callbacks), "((x: number) => void)[]");
}

#[test]
fn test_union_parenthesized_in_array() {
    let mut types = TestTypes::new();
    let string = types.prim(PrimitiveKind::String);
    let number = types.prim(PrimitiveKind::Number);
    let union = types.add(TestType::Union(vec![string, number]));
    let array = types.array(union);
    assert_eq!(render(&types, array), "(string | number)[]");

    let readonly = types.add(TestType::Array(number, true));
    assert_eq!(render(&types, readonly), "readonly number[]");
}

#[test]
fn test_tuple_rendering() {
    let mut types = TestTypes::new();
    let string = types.prim(PrimitiveKind::String);
    let number = types.prim(PrimitiveKind::Number);
    let pair = types.add(TestType::Tuple(vec![number, string]));
    assert_eq!(render(&types, pair), "[number, string]");
}

#[test]
fn test_boolean_literals_collapse_in_union() {
    let mut types = TestTypes::new();
    let string = types.prim(PrimitiveKind::String);
    let t = types.bool_lit(true);
    let f = types.bool_lit(false);
    let first = types.add(TestType::Union(vec![t, f, string]));
    let last = types.add(TestType::Union(vec![string, f, t]));
    let only_true = types.add(TestType::Union(vec![t, string]));
    assert_eq!(render(&types, first), "boolean | string");
    assert_eq!(render(&types, last), "string | boolean");
    assert_eq!(render(&types, only_true), "true | string");
}

#[test]
fn test_intersection_merges_unaliased_objects() {
    let mut types = TestTypes::new();
    let string = types.prim(PrimitiveKind::String);
    let number = types.prim(PrimitiveKind::Number);
    let a = types.object(&[("a", number)]);
    let named = types.named("Named", TestType::Object(vec![("n".into(), number)]));
    let b = types.object(&[("b", string), ("a", string)]);
    let both = types.add(TestType::Intersection(vec![a, named, b]));
    assert_eq!(render(&types, both), r#"{ "a": string; "b": string } & Named"#);
}

#[test]
fn test_intersection_of_objects_becomes_object() {
    let mut types = TestTypes::new();
    let number = types.prim(PrimitiveKind::Number);
    let a = types.object(&[("a", number)]);
    let b = types.object(&[("b", number)]);
    let nested = types.add(TestType::Intersection(vec![a, b]));
    let outer = types.add(TestType::Intersection(vec![nested, a]));
    let model = TypeModel::from_semantic(&types, outer);
    assert!(model.is_unaliased_object());
    assert_eq!(model.render(), r#"{ "a": number; "b": number }"#);
}

#[test]
fn test_unsupported_uses_host_text() {
    let mut types = TestTypes::new();
    let date = types.add(TestType::Opaque("Date".into()));
    let model = TypeModel::from_semantic(&types, date);
    assert_eq!(model.kind_name(), "unsupported");
    assert_eq!(model.render(), "Date");
}

#[test]
fn test_serialize_aliased_model_does_not_expand() {
    let mut types = TestTypes::new();
    let number = types.prim(PrimitiveKind::Number);
    let point = types.named("Point", TestType::Object(vec![("x".into(), number)]));
    let value = serde_json::to_value(TypeModel::from_semantic(&types, point))
        .expect("serialize");
    assert_eq!(value, serde_json::json!({ "kind": "object", "alias": "Point" }));
}

#[test]
fn test_serialize_structure() {
    let mut types = TestTypes::new();
    let one = types.num(1.0);
    let string = types.prim(PrimitiveKind::String);
    let strings = types.array(string);
    let obj = types.object(&[("a", one), ("tags", strings)]);
    let value = serde_json::to_value(TypeModel::from_semantic(&types, obj)).expect("serialize");
    assert_eq!(
        value,
        serde_json::json!({
            "kind": "object",
            "fields": {
                "a": { "kind": "number-literal", "value": 1.0 },
                "tags": { "kind": "array", "readonly": false, "element": { "kind": "string" } }
            }
        })
    );
}
