//! Diagnostics produced by the reference checker.

use anyfix_common::Diagnostic;
use anyfix_infer::{FileId, NodeId, SemanticModel};
use anyfix_program::Program;

fn program(source: &str) -> Program {
    Program::from_sources([("main.ts", source)]).expect("program")
}

fn main_file(program: &Program) -> FileId {
    program.file_by_name("main.ts").expect("main.ts")
}

fn diagnostics(source: &str) -> Vec<Diagnostic> {
    let program = program(source);
    program.diagnostics(main_file(&program))
}

fn codes(source: &str) -> Vec<u32> {
    diagnostics(source).iter().map(|d| d.code).collect()
}

fn messages(source: &str) -> Vec<String> {
    diagnostics(source)
        .into_iter()
        .map(|d| d.message_text)
        .collect()
}

fn type_of_binding(program: &Program, name: &str) -> String {
    let node: NodeId = program
        .find_binding(main_file(program), name)
        .unwrap_or_else(|| panic!("no binding named {name}"));
    program.type_text_of(node)
}

#[test]
fn test_clean_program_has_no_diagnostics() {
    let source = "\
function add(a: number, b: number): number { return a + b; }
const total = add(1, 2);
const label = `total: ${total}`;
let flag = total > 2 && label !== \"\";
";
    assert!(diagnostics(source).is_empty());
}

#[test]
fn test_lib_globals_resolve() {
    let source = "\
const n = Number.parseInt(\"42\");
const m = Math.max(n, 1);
console.log(JSON.stringify({ n, m }));
const now = new Date(0).getTime();
const valid = !isNaN(parseFloat(\"1.5\"));
";
    assert!(diagnostics(source).is_empty());
}

#[test]
fn test_argument_not_assignable() {
    let source = "function add(a: number, b: number) { return a + b; }\nadd(\"x\", 2);";
    assert_eq!(codes(source), vec![2345]);
    assert_eq!(
        messages(source),
        vec!["Argument of type '\"x\"' is not assignable to parameter of type 'number'."]
    );
}

#[test]
fn test_argument_count() {
    assert_eq!(
        messages("function add(a: number, b: number) {}\nadd(1);"),
        vec!["Expected 2 arguments, but got 1."]
    );
    assert_eq!(
        messages("function f(a: number, b?: number) {}\nf();"),
        vec!["Expected 1-2 arguments, but got 0."]
    );
}

#[test]
fn test_property_does_not_exist() {
    assert_eq!(
        messages("const n = 1;\nn.foo;"),
        vec!["Property 'foo' does not exist on type '1'."]
    );
    assert!(codes("const s = \"a\";\nconst l = s.length;").is_empty());
}

#[test]
fn test_unresolved_names() {
    let source = "missing(1);";
    let found = diagnostics(source);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].code, 2304);
    assert_eq!(found[0].message_text, "Cannot find name 'missing'.");
    assert_eq!(found[0].start, 0);
    assert_eq!(found[0].length, 7);

    assert_eq!(
        messages("let u: User;"),
        vec!["Cannot find name 'User'."]
    );
}

#[test]
fn test_type_not_assignable_to_annotation() {
    assert_eq!(
        messages("let x: string = 1;"),
        vec!["Type '1' is not assignable to type 'string'."]
    );
    assert_eq!(codes("function f(): string { return 1; }"), vec![2322]);
    assert_eq!(
        messages("let count = 0;\ncount = \"x\";"),
        vec!["Type '\"x\"' is not assignable to type 'number'."]
    );
}

#[test]
fn test_arithmetic_operands() {
    assert_eq!(codes("const s = \"a\";\nconst r = s - 1;"), vec![2362]);
    assert_eq!(codes("const s = \"a\";\nconst r = 1 * s;"), vec![2363]);
    assert!(codes("const r = \"a\" + 1;").is_empty());
    assert_eq!(
        messages("const flag = true;\nconst r = flag + 1;"),
        vec!["Operator '+' cannot be applied to types 'true' and '1'."]
    );
}

#[test]
fn test_assignment_to_constant() {
    assert_eq!(
        messages("const c = 1;\nc = 2;"),
        vec!["Cannot assign to 'c' because it is a constant."]
    );
}

#[test]
fn test_not_callable_or_constructable() {
    assert_eq!(codes("const n = 1;\nn();"), vec![2349]);
    assert_eq!(codes("const n = 1;\nnew n();"), vec![2351]);
}

#[test]
fn test_diagnostics_are_sorted_by_position() {
    let found = diagnostics("missing;\nconst n = 1;\nn.foo;\nother;");
    let starts: Vec<u32> = found.iter().map(|d| d.start).collect();
    let mut sorted = starts.clone();
    sorted.sort();
    assert_eq!(starts, sorted);
    assert_eq!(found.len(), 3);
}

#[test]
fn test_classes_members_and_this() {
    let source = "\
class Counter {
  count = 0;
  increment(step: number) {
    this.count = this.count + step;
    return this.count;
  }
}
const c = new Counter();
const next: number = c.increment(1);
c.missing;
";
    assert_eq!(
        messages(source),
        vec!["Property 'missing' does not exist on type 'Counter'."]
    );
    let program = program(source);
    assert_eq!(type_of_binding(&program, "c"), "Counter");
    assert_eq!(type_of_binding(&program, "next"), "number");
}

#[test]
fn test_contextual_typing_of_arrow_parameters() {
    let source = "\
const xs = [1, 2, 3];
const doubled = xs.map(x => x * 2);
const size: number = doubled.length;
const joined: string = xs.join(\",\");
const format: (n: number) => string = n => n.toFixed(2);
";
    assert!(diagnostics(source).is_empty());
    let program = program(source);
    assert_eq!(type_of_binding(&program, "xs"), "number[]");
    assert_eq!(type_of_binding(&program, "x"), "number");
    assert_eq!(type_of_binding(&program, "doubled"), "number[]");
    assert_eq!(type_of_binding(&program, "n"), "number");
}

#[test]
fn test_destructured_bindings_take_their_type_from_the_parent() {
    let program = program("const { a, b: [first] } = { a: 1, b: [true] };");
    assert_eq!(type_of_binding(&program, "a"), "number");
    assert_eq!(type_of_binding(&program, "first"), "boolean");
}

#[test]
fn test_unannotated_bindings_are_any() {
    let program = program("function f(a, b = 1) { return b; }\nlet v;\nconst k = 1;");
    assert_eq!(type_of_binding(&program, "a"), "any");
    assert_eq!(type_of_binding(&program, "b"), "number");
    assert_eq!(type_of_binding(&program, "v"), "any");
    assert_eq!(type_of_binding(&program, "k"), "1");
}

#[test]
fn test_recursive_functions_terminate() {
    let source = "function loop(n: number) { return loop(n); }\nconst r = loop(1);";
    assert!(diagnostics(source).is_empty());
}

#[test]
fn test_diagnostics_are_per_file() {
    let program = Program::from_sources([
        ("a.ts", "export function f(a: number) {}"),
        ("b.ts", "f(\"x\");"),
    ])
    .expect("program");
    let a = program.file_by_name("a.ts").expect("a.ts");
    let b = program.file_by_name("b.ts").expect("b.ts");
    assert!(program.diagnostics(a).is_empty());
    assert_eq!(program.diagnostics(b).len(), 1);
    assert_eq!(program.all_diagnostics().len(), 1);
}
