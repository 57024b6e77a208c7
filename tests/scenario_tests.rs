//! End-to-end rewrites of small programs.

use anyfix::{DriverOptions, RewriteOutput, RewriteSettings, SiteOutcome, rewrite_sources};

fn rewrite(source: &str) -> RewriteOutput {
    rewrite_with(source, &DriverOptions::default())
}

fn rewrite_with(source: &str, options: &DriverOptions) -> RewriteOutput {
    rewrite_sources([("main.ts", source)], options, RewriteSettings::default())
        .expect("rewrite")
}

fn main_text(output: &RewriteOutput) -> &str {
    output.text_of("main.ts").expect("main.ts")
}

#[test]
fn test_literal_argument() {
    let output = rewrite("function f(x) { return x; }\nf(1234);");
    assert_eq!(main_text(&output), "function f(x: 1234) { return x; }\nf(1234);");
    assert_eq!(output.report.total_changes, 1);
}

#[test]
fn test_bounded_literal_widening() {
    let output = rewrite("function f(x) {}\nf(1);\nf(4);\nf(3);\nf(2);");
    assert!(main_text(&output).starts_with("function f(x: 1 | 4 | 3 | 2) {}"));

    let output = rewrite("function f(x) {}\nf(1);\nf(4);\nf(3);\nf(2);\nf(5);");
    assert!(main_text(&output).starts_with("function f(x: number) {}"));
}

#[test]
fn test_destructured_parameter() {
    let output = rewrite("function parse({ value }) { return Number.parseInt(value); }");
    assert_eq!(
        main_text(&output),
        "function parse({ value }: { \"value\": string }) { return Number.parseInt(value); }"
    );
}

#[test]
fn test_any_only_evidence_changes_nothing() {
    let source = "function f(x) { g(x); }\nfunction g(y) {}";
    let output = rewrite(source);
    assert_eq!(main_text(&output), source);
    assert_eq!(output.report.total_changes, 0);
    assert!(output.report.converged);
    let outcomes: Vec<&SiteOutcome> = output
        .report
        .unresolved()
        .map(|(_, site)| &site.outcome)
        .collect();
    assert_eq!(outcomes, vec![&SiteOutcome::NoTypeFound, &SiteOutcome::NoTypeFound]);
}

#[test]
fn test_breaking_annotation_is_reverted() {
    let source = "function f(x) { return x.foo; }\nf(1);";
    let options = DriverOptions {
        verbosity: 1,
        ..DriverOptions::default()
    };
    let output = rewrite_with(source, &options);
    assert_eq!(main_text(&output), source);
    assert_eq!(output.report.total_changes, 0);
    assert_eq!(output.diagnostics_after, output.diagnostics_before);

    let (_, site) = output.report.unresolved().next().expect("unresolved site");
    let SiteOutcome::Reverted {
        annotation,
        introduced,
    } = &site.outcome
    else {
        panic!("expected a revert, got {:?}", site.outcome);
    };
    assert_eq!(annotation, "1");
    assert_eq!(introduced[0].code, 2339);
}

#[test]
fn test_mixed_program() {
    let source = "\
function greet(name) { return `Hello, ${name}`; }
function area(width, height) { return width * height; }
function parse({ value }) { return Number.parseInt(value); }
function broken(x) { return x.foo; }
let label;
label = greet(\"world\");
const size = area(2, 3);
broken(1);
parse({ value: \"42\" });
";
    let output = rewrite(source);
    assert_eq!(
        main_text(&output),
        "\
function greet(name: string) { return `Hello, ${name}`; }
function area(width: 2, height: 3) { return width * height; }
function parse({ value }: { \"value\": string }) { return Number.parseInt(value); }
function broken(x) { return x.foo; }
let label: string;
label = greet(\"world\");
const size = area(2, 3);
broken(1);
parse({ value: \"42\" });
"
    );
    assert_eq!(output.report.total_changes, 5);
    assert_eq!(output.diagnostics_before, 0);
    assert_eq!(output.diagnostics_after, 0);
    let unresolved: Vec<&str> = output
        .report
        .unresolved()
        .map(|(_, site)| site.name.as_str())
        .collect();
    assert_eq!(unresolved, vec!["x"]);
}

#[test]
fn test_multi_file_rewrite() {
    let output = rewrite_sources(
        [
            ("math.ts", "export function double(n) { return n * 2; }"),
            ("main.ts", "const four = double(2);\nconst six = double(3);"),
        ],
        &DriverOptions::default(),
        RewriteSettings::default(),
    )
    .expect("rewrite");
    assert_eq!(
        output.text_of("math.ts"),
        Some("export function double(n: 2 | 3) { return n * 2; }")
    );
    assert_eq!(
        output.text_of("main.ts"),
        Some("const four = double(2);\nconst six = double(3);")
    );
    let committed: Vec<(&str, &str)> = output
        .report
        .committed()
        .map(|(file, site)| (file, site.name.as_str()))
        .collect();
    assert_eq!(committed, vec![("math.ts", "n")]);
}

#[test]
fn test_output_serializes_for_tooling() {
    let output = rewrite("function f(x) { return x; }\nf(true);");
    let json = serde_json::to_value(&output).expect("serialize");
    assert_eq!(json["files"][0][0], "main.ts");
    assert_eq!(json["files"][0][1], "function f(x: true) { return x; }\nf(true);");
    assert_eq!(json["report"]["totalChanges"], 1);
    assert_eq!(json["diagnosticsBefore"], 0);
    assert_eq!(json["diagnosticsAfter"], 0);
}
