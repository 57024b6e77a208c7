use super::*;

fn prop(name: &str, type_id: TypeId) -> PropertyInfo {
    PropertyInfo {
        name: name.to_string(),
        type_id,
        optional: false,
    }
}

fn param(name: &str, type_id: TypeId, optional: bool) -> ParamInfo {
    ParamInfo {
        name: name.to_string(),
        type_id,
        optional,
    }
}

#[test]
fn test_intrinsics_have_fixed_slots() {
    let table = TypeTable::new();
    assert_eq!(table.len(), 11);
    assert_eq!(TypeTable::intrinsic(PrimitiveKind::Number), NUMBER);
    assert_eq!(table.type_text(UNDEFINED), "undefined");
    assert_eq!(table.type_text(TypeTable::boolean_literal(true)), "true");
}

#[test]
fn test_interning_is_structural() {
    let mut table = TypeTable::new();
    let a = table.number_literal(1234.0);
    let b = table.number_literal(1234.0);
    assert_eq!(a, b);
    let first = table.object(vec![prop("id", NUMBER)]);
    let second = table.object(vec![prop("id", NUMBER)]);
    assert_eq!(first, second);
    assert_ne!(table.array(NUMBER, false), table.array(NUMBER, true));
}

#[test]
fn test_union_normalization() {
    let mut table = TypeTable::new();
    let one = table.number_literal(1.0);
    let two = table.number_literal(2.0);
    let nested = table.union([one, two]);

    assert_eq!(table.union([nested, one, NEVER]), nested);
    assert_eq!(table.union([one, ANY]), ANY);
    assert_eq!(table.union([one, NUMBER]), NUMBER);
    assert_eq!(table.union([NEVER]), NEVER);
    assert_eq!(table.union([STRING]), STRING);

    let mixed = table.union([TRUE, STRING, FALSE]);
    assert_eq!(table.type_text(mixed), "boolean | string");
    assert_eq!(table.union([TRUE, FALSE]), BOOLEAN);
}

#[test]
fn test_intersection_normalization() {
    let mut table = TypeTable::new();
    let a = table.object(vec![prop("a", NUMBER)]);
    let b = table.object(vec![prop("b", STRING)]);
    let ab = table.intersection([a, b]);
    assert_eq!(table.intersection([ab, a]), ab);
    assert_eq!(table.intersection([a]), a);
    assert_eq!(table.intersection(Vec::new()), UNKNOWN);
    assert_eq!(table.type_text(ab), "{ a: number; } & { b: string; }");
}

#[test]
fn test_widen_literals() {
    let mut table = TypeTable::new();
    let one = table.number_literal(1.0);
    let text = table.string_literal("a");
    let union = table.union([one, text]);
    assert_eq!(table.widen(one), NUMBER);
    assert_eq!(table.widen(TRUE), BOOLEAN);
    let widened = table.widen(union);
    assert_eq!(table.type_text(widened), "number | string");
    let array = table.array(one, false);
    assert_eq!(table.widen(array), array);
}

#[test]
fn test_named_types_resolve_through_targets() {
    let mut table = TypeTable::new();
    let user = table.named("User");
    let alias = table.named("Account");
    assert_eq!(table.resolve(user), UNKNOWN);

    let shape = table.object(vec![prop("id", NUMBER)]);
    table.define_named("User", shape);
    table.define_named("Account", user);
    assert_eq!(table.resolve(alias), shape);
    assert_eq!(table.name_of(alias), Some("Account"));
    assert_eq!(table.type_text(alias), "Account");

    table.clear_named();
    assert_eq!(table.resolve(alias), UNKNOWN);
}

#[test]
fn test_cyclic_alias_resolves_to_unknown() {
    let mut table = TypeTable::new();
    let a = table.named("A");
    let b = table.named("B");
    table.define_named("A", b);
    table.define_named("B", a);
    assert_eq!(table.resolve(a), UNKNOWN);
}

#[test]
fn test_function_shape_and_printing() {
    let mut table = TypeTable::new();
    let callback = table.function(
        vec![param("value", NUMBER, false), param("label", STRING, true)],
        VOID,
    );
    let shape = table.function_shape(callback).expect("function shape");
    assert_eq!(shape.required_count(), 1);
    assert_eq!(
        table.type_text(callback),
        "(value: number, label?: string) => void"
    );

    let callbacks = table.array(callback, false);
    assert_eq!(
        table.type_text(callbacks),
        "((value: number, label?: string) => void)[]"
    );
}

#[test]
fn test_printing_structural_types() {
    let mut table = TypeTable::new();
    let text = table.string_literal("it's \"quoted\"");
    assert_eq!(table.type_text(text), r#""it's \"quoted\"""#);

    let half = table.number_literal(0.5);
    assert_eq!(table.type_text(half), "0.5");

    let tuple = table.intern(TypeData::Tuple {
        elements: vec![STRING, NUMBER],
        readonly: true,
    });
    assert_eq!(table.type_text(tuple), "readonly [string, number]");

    let union = table.union([STRING, NUMBER]);
    let array = table.array(union, false);
    assert_eq!(table.type_text(array), "(string | number)[]");

    let optional = table.object(vec![PropertyInfo {
        name: "tag".to_string(),
        type_id: STRING,
        optional: true,
    }]);
    assert_eq!(table.type_text(optional), "{ tag?: string; }");
    let empty = table.object(Vec::new());
    assert_eq!(table.type_text(empty), "{}");

    let import = table.intern(TypeData::DeferredImport {
        module: "./models".to_string(),
        name: "User".to_string(),
    });
    assert_eq!(table.type_text(import), "import(\"./models\").User");

    let constructor = table.intern(TypeData::Constructor {
        class: "Date".to_string(),
        params: Vec::new(),
    });
    assert_eq!(table.type_text(constructor), "typeof Date");
}
