//! `Program` seen through the `SemanticModel` interface the driver uses.

use anyfix_infer::{
    BindingKind, FileId, NodeId, SemanticModel, UsageSite, infer_binding_type, needs_inference,
};
use anyfix_program::Program;
use anyfix_solver::{TypeQuery, UnionPolicy};

fn program(source: &str) -> Program {
    Program::from_sources([("main.ts", source)]).expect("program")
}

fn main_file(program: &Program) -> FileId {
    program.file_by_name("main.ts").expect("main.ts")
}

fn binding(program: &Program, name: &str) -> NodeId {
    program
        .find_binding(main_file(program), name)
        .unwrap_or_else(|| panic!("no binding named {name}"))
}

fn callable_of<M: SemanticModel>(model: &M, param: NodeId) -> NodeId {
    match model.binding_kind(param) {
        BindingKind::Parameter { callable, .. } => callable,
        other => panic!("not a parameter: {other:?}"),
    }
}

/// Names of every binding the driver would try to annotate.
fn implicit_any_names<M: SemanticModel>(model: &M) -> Vec<String> {
    model
        .files()
        .into_iter()
        .flat_map(|file| model.bindings(file))
        .filter(|&binding| needs_inference(model, binding))
        .map(|binding| model.binding_name(binding))
        .collect()
}

fn codes<M: SemanticModel>(model: &M, file: FileId) -> Vec<u32> {
    model.diagnostics(file).iter().map(|d| d.code).collect()
}

#[test]
fn test_only_implicit_any_bindings_need_inference() {
    let program = program("function f(a, b: number, { c }, d: any) {}\nlet e;\nlet g = 1;");
    assert_eq!(implicit_any_names(&program), vec!["a", "{ c }", "e"]);
}

#[test]
fn test_files_in_order_without_the_lib() {
    let program = Program::from_sources([("b.ts", "let b;"), ("a.ts", "let a;")])
        .expect("program");
    let names: Vec<String> = program
        .files()
        .into_iter()
        .map(|file| program.file_name(file))
        .collect();
    assert_eq!(names, vec!["b.ts", "a.ts"]);
}

#[test]
fn test_annotations_feed_back_into_checking() {
    let mut program = program("function f(x) { return x.foo; }");
    let file = main_file(&program);
    let x = binding(&program, "x");
    assert!(codes(&program, file).is_empty());

    program.set_declared_type(x, "number").expect("set");
    let diagnostics = program.diagnostics(file);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].message_text,
        "Property 'foo' does not exist on type 'number'."
    );

    program.remove_declared_type(x);
    assert!(codes(&program, file).is_empty());
    assert_eq!(program.emit(file), "function f(x) { return x.foo; }");
}

#[test]
fn test_replacing_a_written_annotation() {
    let mut program = program("let x: string = 1;");
    let file = main_file(&program);
    let x = binding(&program, "x");
    assert_eq!(codes(&program, file), vec![2322]);

    program.set_declared_type(x, "number").expect("set");
    assert!(codes(&program, file).is_empty());
    assert_eq!(program.emit(file), "let x: number = 1;");

    program.remove_declared_type(x);
    assert!(codes(&program, file).is_empty());
    assert_eq!(program.emit(file), "let x = 1;");
    assert_eq!(program.type_text_of(x), "number");
}

#[test]
fn test_references_span_files() {
    let program = Program::from_sources([
        ("a.ts", "function greet(name) { return name; }"),
        ("b.ts", "greet(\"a\");\ngreet(\"b\");"),
    ])
    .expect("program");
    let a = program.file_by_name("a.ts").expect("a.ts");
    let b = program.file_by_name("b.ts").expect("b.ts");
    let name = program.find_binding(a, "name").expect("name");
    let greet = callable_of(&program, name);
    let symbol = program.symbol_of(greet).expect("symbol");

    let references = program.references(symbol);
    assert_eq!(references.len(), 2);
    for reference in &references {
        assert_eq!(program.file_of(reference.node), b);
        assert!(matches!(&reference.site, UsageSite::Callee { arguments } if arguments.len() == 1));
    }
    assert_eq!(
        infer_binding_type(&program, name, &UnionPolicy::default())
            .annotation()
            .as_deref(),
        Some("\"a\" | \"b\"")
    );
}

#[test]
fn test_methods_are_referenced_through_member_access() {
    let source = "\
class Greeter {
  greet(name) { return name; }
}
const g = new Greeter();
g.greet(\"hi\");
";
    let program = program(source);
    let name = binding(&program, "name");
    let method = callable_of(&program, name);
    let symbol = program.symbol_of(method).expect("method symbol");
    let references = program.references(symbol);
    assert_eq!(references.len(), 1);
    assert!(matches!(references[0].site, UsageSite::Callee { .. }));
    assert_eq!(
        infer_binding_type(&program, name, &UnionPolicy::default())
            .annotation()
            .as_deref(),
        Some("\"hi\"")
    );
}

#[test]
fn test_constructor_parameters_are_fed_by_new_expressions() {
    let program = program("class Point {\n  constructor(x) {}\n}\nnew Point(3);");
    let x = binding(&program, "x");
    assert_eq!(
        infer_binding_type(&program, x, &UnionPolicy::default())
            .annotation()
            .as_deref(),
        Some("3")
    );
}

#[test]
fn test_declared_parameter_and_return_types() {
    let program = program(
        "function f(a: number, b: string): boolean { return true; }\nf(1, \"x\");\nfunction h(c) { return 1; }",
    );
    let a = binding(&program, "a");
    let f = callable_of(&program, a);
    let symbol = program.symbol_of(f).expect("symbol");
    let callee = program.references(symbol)[0].node;

    let params: Vec<String> = program
        .declared_parameter_types(callee)
        .expect("parameter types")
        .into_iter()
        .map(|ty| program.type_text(ty))
        .collect();
    assert_eq!(params, vec!["number", "string"]);

    let returns = program.declared_return_type(f).expect("declared return");
    assert_eq!(program.type_text(returns), "boolean");

    let h = callable_of(&program, binding(&program, "c"));
    assert_eq!(program.declared_return_type(h), None);
}
