use super::*;
use crate::test_types::{TestType, TestTypes};

fn compute(types: &TestTypes, ids: &[TypeId]) -> Option<String> {
    compute_types_from_list(types, ids, &UnionPolicy::default())
}

#[test]
fn test_empty_list_has_no_type() {
    let types = TestTypes::new();
    assert_eq!(compute(&types, &[]), None);
}

#[test]
fn test_single_literal_is_kept() {
    let mut types = TestTypes::new();
    let n = types.num(1234.0);
    assert_eq!(compute(&types, &[n]).as_deref(), Some("1234"));
}

#[test]
fn test_four_literals_make_a_union() {
    let mut types = TestTypes::new();
    let ids: Vec<_> = [1.0, 4.0, 3.0, 2.0].iter().map(|&v| types.num(v)).collect();
    assert_eq!(compute(&types, &ids).as_deref(), Some("1 | 4 | 3 | 2"));
}

#[test]
fn test_five_literals_widen_to_number() {
    let mut types = TestTypes::new();
    let ids: Vec<_> = [1.0, 4.0, 3.0, 2.0, 5.0]
        .iter()
        .map(|&v| types.num(v))
        .collect();
    assert_eq!(compute(&types, &ids).as_deref(), Some("number"));
}

#[test]
fn test_duplicates_count_once() {
    let mut types = TestTypes::new();
    let ids: Vec<_> = [1.0, 2.0, 1.0, 2.0, 3.0, 3.0]
        .iter()
        .map(|&v| types.num(v))
        .collect();
    assert_eq!(compute(&types, &ids).as_deref(), Some("1 | 2 | 3"));
}

#[test]
fn test_bare_number_absorbs_literals() {
    let mut types = TestTypes::new();
    let one = types.num(1.0);
    let number = types.prim(PrimitiveKind::Number);
    assert_eq!(compute(&types, &[one, number]).as_deref(), Some("number"));

    let a = types.str_lit("a");
    let string = types.prim(PrimitiveKind::String);
    assert_eq!(compute(&types, &[string, a]).as_deref(), Some("string"));
}

#[test]
fn test_mixed_small_list_is_a_union() {
    let mut types = TestTypes::new();
    let one = types.num(1.0);
    let string = types.prim(PrimitiveKind::String);
    assert_eq!(compute(&types, &[one, string]).as_deref(), Some("1 | string"));
}

#[test]
fn test_mixed_large_list_has_no_type() {
    let mut types = TestTypes::new();
    let mut ids: Vec<_> = [1.0, 2.0, 3.0, 4.0].iter().map(|&v| types.num(v)).collect();
    ids.push(types.str_lit("five"));
    assert_eq!(compute(&types, &ids), None);
}

#[test]
fn test_many_string_literals_widen_to_string() {
    let mut types = TestTypes::new();
    let ids: Vec<_> = ["a", "b", "c", "d", "e"]
        .iter()
        .map(|v| types.str_lit(v))
        .collect();
    assert_eq!(compute(&types, &ids).as_deref(), Some("string"));
}

#[test]
fn test_all_booleans_become_boolean() {
    let mut types = TestTypes::new();
    let t = types.bool_lit(true);
    let f = types.bool_lit(false);
    assert_eq!(compute(&types, &[t]).as_deref(), Some("boolean"));
    assert_eq!(compute(&types, &[t, f]).as_deref(), Some("boolean"));
    let boolean = types.prim(PrimitiveKind::Boolean);
    assert_eq!(compute(&types, &[boolean, t]).as_deref(), Some("boolean"));
}

#[test]
fn test_escape_hatch_candidates_are_dropped() {
    let mut types = TestTypes::new();
    let any = types.prim(PrimitiveKind::Any);
    let any_array = types.array(any);
    let with_any = types.object(&[("a", any)]);
    let import = types.add(TestType::DeferredImport("./other".into()));
    assert_eq!(compute(&types, &[any, any_array, with_any, import]), None);

    let string = types.prim(PrimitiveKind::String);
    assert_eq!(
        compute(&types, &[any, string, any_array]).as_deref(),
        Some("string")
    );
}

#[test]
fn test_objects_unify_through_supertype() {
    let mut types = TestTypes::new();
    let number = types.prim(PrimitiveKind::Number);
    let string = types.prim(PrimitiveKind::String);
    let a = types.object(&[("id", number)]);
    let b = types.object(&[("label", string)]);
    assert_eq!(
        compute(&types, &[a, b]).as_deref(),
        Some(r#"{ "id": number; "label": string }"#)
    );
}

#[test]
fn test_custom_union_limit() {
    let mut types = TestTypes::new();
    let ids: Vec<_> = [1.0, 2.0, 3.0].iter().map(|&v| types.num(v)).collect();
    let policy = UnionPolicy {
        max_union_members: 2,
    };
    assert_eq!(
        compute_types_from_list(&types, &ids, &policy).as_deref(),
        Some("number")
    );
}

#[test]
fn test_nested_escape_hatch_detection() {
    assert!(contains_nested_escape_hatch("any[]"));
    assert!(contains_nested_escape_hatch(r#"{ "a": any }"#));
    assert!(contains_nested_escape_hatch("(x: any) => void"));
    assert!(!contains_nested_escape_hatch(r#"{ "any": number }"#));
    assert!(!contains_nested_escape_hatch(r#""any""#));
    assert!(!contains_nested_escape_hatch("Company"));
    assert!(!contains_nested_escape_hatch("anyOf"));
    assert!(!contains_nested_escape_hatch("(any: number) => number"));
    assert!(!contains_nested_escape_hatch("(any?: string) => void"));
    assert!(contains_nested_escape_hatch("(any: any) => void"));
    assert!(contains_nested_escape_hatch("(x: number) => any"));
}
