use clap::Parser;
use std::io::Write;
use std::path::PathBuf;

use crate::args::{CliArgs, Scope};
use anyfix_driver::{DiagnosticScope, DriverOptions};

#[test]
fn parses_defaults() {
    let args = CliArgs::try_parse_from(["anyfix", "main.ts"]).expect("default args should parse");

    assert!(!args.no_revert);
    assert_eq!(args.verbose, 0);
    assert_eq!(args.max_union, None);
    assert_eq!(args.diagnostic_scope, None);
    assert!(args.config.is_none());
    assert!(!args.dry_run);
    assert!(!args.json);
    assert!(!args.no_lib);
    assert_eq!(args.files, vec![PathBuf::from("main.ts")]);
    assert_eq!(
        args.driver_options().expect("options"),
        DriverOptions::default()
    );
}

#[test]
fn requires_at_least_one_file() {
    assert!(CliArgs::try_parse_from(["anyfix"]).is_err());
}

#[test]
fn parses_every_flag() {
    let args = CliArgs::try_parse_from([
        "anyfix",
        "--no-revert",
        "-vv",
        "--max-union",
        "2",
        "--diagnostic-scope",
        "PROGRAM",
        "--dry-run",
        "--json",
        "--no-lib",
        "a.ts",
        "b.ts",
    ])
    .expect("flagged args should parse");

    assert!(args.no_revert);
    assert_eq!(args.verbose, 2);
    assert_eq!(args.max_union, Some(2));
    assert_eq!(args.diagnostic_scope, Some(Scope::Program));
    assert!(args.dry_run);
    assert!(args.json);
    assert!(args.no_lib);
    assert_eq!(
        args.files,
        vec![PathBuf::from("a.ts"), PathBuf::from("b.ts")]
    );

    let options = args.driver_options().expect("options");
    assert!(!options.verify);
    assert_eq!(options.verbosity, 2);
    assert_eq!(options.policy.max_union_members, 2);
    assert_eq!(options.diagnostic_scope, DiagnosticScope::Program);
}

#[test]
fn rejects_unknown_scope() {
    assert!(
        CliArgs::try_parse_from(["anyfix", "--diagnostic-scope", "module", "a.ts"]).is_err()
    );
}

#[test]
fn flags_override_config_file() {
    let mut config = tempfile::NamedTempFile::new().expect("temp config");
    write!(
        config,
        r#"{{ "verbosity": 1, "policy": {{ "maxUnionMembers": 8 }}, "diagnosticScope": "program" }}"#
    )
    .expect("write config");

    let path = config.path().to_string_lossy().into_owned();
    let args = CliArgs::try_parse_from([
        "anyfix",
        "--config",
        path.as_str(),
        "--diagnostic-scope",
        "file",
        "a.ts",
    ])
    .expect("args should parse");

    let options = args.driver_options().expect("options");
    assert!(options.verify);
    assert_eq!(options.verbosity, 1);
    assert_eq!(options.policy.max_union_members, 8);
    assert_eq!(options.diagnostic_scope, DiagnosticScope::File);
}

#[test]
fn unreadable_config_is_an_error() {
    let args = CliArgs::try_parse_from(["anyfix", "--config", "/nonexistent/anyfix.json", "a.ts"])
        .expect("args should parse");
    let error = args.driver_options().expect_err("missing config");
    assert!(error.to_string().contains("failed to read config"));
}
