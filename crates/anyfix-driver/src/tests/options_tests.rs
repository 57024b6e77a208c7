use super::*;

#[test]
fn test_defaults() {
    let options = DriverOptions::default();
    assert!(options.verify);
    assert_eq!(options.verbosity, 0);
    assert_eq!(options.policy.max_union_members, 4);
    assert_eq!(options.diagnostic_scope, DiagnosticScope::File);
}

#[test]
fn test_partial_json_keeps_defaults() {
    let options = DriverOptions::from_json(r#"{ "verify": false, "policy": { "maxUnionMembers": 2 } }"#)
        .expect("valid options");
    assert!(!options.verify);
    assert_eq!(options.policy.max_union_members, 2);
    assert_eq!(options.diagnostic_scope, DiagnosticScope::File);
}

#[test]
fn test_program_scope_from_json() {
    let options =
        DriverOptions::from_json(r#"{ "diagnosticScope": "program", "verbosity": 2 }"#)
            .expect("valid options");
    assert_eq!(options.diagnostic_scope, DiagnosticScope::Program);
    assert_eq!(options.verbosity, 2);
    assert!(options.verify);
}

#[test]
fn test_unknown_scope_is_rejected() {
    assert!(DriverOptions::from_json(r#"{ "diagnosticScope": "workspace" }"#).is_err());
}

#[test]
fn test_no_revert_preset() {
    let options = DriverOptions::no_revert();
    assert!(!options.verify);
    assert_eq!(options.policy, UnionPolicy::default());
}
