use super::*;
use crate::query::{PrimitiveKind, TypeId};
use crate::test_types::{TestType, TestTypes};

fn models<'q>(types: &'q TestTypes, ids: &[TypeId]) -> Vec<TypeModel<'q>> {
    ids.iter()
        .map(|&id| TypeModel::from_semantic(types, id))
        .collect()
}

fn unify(types: &TestTypes, ids: &[TypeId]) -> String {
    supertype(models(types, ids))
        .map(|model| model.render())
        .unwrap_or_default()
}

#[test]
fn test_empty_input_has_no_supertype() {
    assert!(supertype(Vec::<TypeModel<'_>>::new()).is_none());
}

#[test]
fn test_single_model_is_its_own_supertype() {
    let mut types = TestTypes::new();
    let one = types.num(1.0);
    assert_eq!(unify(&types, &[one]), "1");
}

#[test]
fn test_objects_merge_with_later_fields_winning() {
    let mut types = TestTypes::new();
    let number = types.prim(PrimitiveKind::Number);
    let string = types.prim(PrimitiveKind::String);
    let first = types.object(&[("id", number), ("name", number)]);
    let second = types.object(&[("name", string), ("tags", string)]);
    assert_eq!(
        unify(&types, &[first, second]),
        r#"{ "id": number; "name": string; "tags": string }"#
    );
}

#[test]
fn test_aliased_object_stays_separate() {
    let mut types = TestTypes::new();
    let number = types.prim(PrimitiveKind::Number);
    let named = types.named("Named", TestType::Object(vec![("n".into(), number)]));
    let plain = types.object(&[("extra", number)]);
    assert_eq!(unify(&types, &[named, plain]), r#"Named & { "extra": number }"#);
}

#[test]
fn test_object_merges_into_intersection_second_member() {
    let mut types = TestTypes::new();
    let number = types.prim(PrimitiveKind::Number);
    let named = types.named("Named", TestType::Object(vec![("n".into(), number)]));
    let a = types.object(&[("a", number)]);
    let b = types.object(&[("b", number)]);
    // Named & { a } & { b }: the trailing object folds into the second member.
    assert_eq!(
        unify(&types, &[named, a, b]),
        r#"Named & { "a": number; "b": number }"#
    );
}

#[test]
fn test_non_objects_intersect_and_dedup() {
    let mut types = TestTypes::new();
    let string = types.prim(PrimitiveKind::String);
    let number = types.prim(PrimitiveKind::Number);
    assert_eq!(unify(&types, &[string, number, string]), "string & number");
    assert_eq!(unify(&types, &[string, string]), "string");
}

#[test]
fn test_unification_is_deterministic() {
    let mut types = TestTypes::new();
    let number = types.prim(PrimitiveKind::Number);
    let string = types.prim(PrimitiveKind::String);
    let a = types.object(&[("a", number)]);
    let b = types.object(&[("b", string)]);
    let first = unify(&types, &[a, b]);
    for _ in 0..8 {
        assert_eq!(unify(&types, &[a, b]), first);
    }
}
