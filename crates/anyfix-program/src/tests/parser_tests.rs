use super::*;

fn parse(source: &str) -> (NodeArena, Vec<NodeId>) {
    let mut arena = NodeArena::new();
    let root = parse_source_file(&mut arena, FileId(0), source).expect("parse should succeed");
    let Some(NodeKind::SourceFile { statements }) = arena.kind(root) else {
        panic!("root is not a source file");
    };
    let statements = statements.clone();
    (arena, statements)
}

fn function_data(arena: &NodeArena, node: NodeId) -> &FunctionData {
    match arena.kind(node) {
        Some(NodeKind::Function(data)) => data,
        other => panic!("expected a function, got {other:?}"),
    }
}

fn decl(arena: &NodeArena, node: NodeId) -> &BindingDecl {
    arena.binding_decl(node).expect("binding declaration")
}

fn initializer_of(arena: &NodeArena, statement: NodeId) -> NodeId {
    let Some(NodeKind::VariableStatement { declarations }) = arena.kind(statement) else {
        panic!("expected a variable statement");
    };
    decl(arena, declarations[0])
        .initializer
        .expect("initializer")
}

#[test]
fn test_function_parameters_and_annotation_positions() {
    let source = "function f(a, b?: number, c = 1) { return a; }";
    let (arena, statements) = parse(source);
    let function = function_data(&arena, statements[0]);
    assert_eq!(function.kind, FunctionKind::Declaration);
    assert_eq!(function.name.as_deref(), Some("f"));
    assert_eq!(function.params.len(), 3);

    let a = decl(&arena, function.params[0]);
    assert!(a.annotation.is_none());
    assert_eq!(a.annotation_insert, 12);
    assert_eq!(a.name_span.text(source), "a");

    let b = decl(&arena, function.params[1]);
    assert!(b.flags.contains(ModifierFlags::OPTIONAL));
    let annotation = b.annotation.as_ref().expect("annotation");
    assert_eq!(annotation.span.text(source), ": number");
    assert_eq!(annotation.ty, TypeNode::Keyword(PrimitiveKind::Number));
    assert_eq!(b.annotation_insert, 16);

    let c = decl(&arena, function.params[2]);
    assert!(c.initializer.is_some());
    assert_eq!(c.annotation_insert, 27);

    assert_eq!(arena.parent(function.params[0]), Some(statements[0]));
}

#[test]
fn test_destructuring_patterns() {
    let source = "function g({ value, nested: { flag }, count = 0 }, [first, , third]) {}";
    let (arena, statements) = parse(source);
    let function = function_data(&arena, statements[0]);

    let object = decl(&arena, function.params[0]);
    let BindingName::Object(fields) = &object.name else {
        panic!("expected an object pattern");
    };
    assert_eq!(fields.len(), 3);
    let properties: Vec<&str> = fields
        .iter()
        .map(|&field| match arena.kind(field) {
            Some(NodeKind::BindingElement { property, .. }) => property.as_str(),
            _ => panic!("expected a binding element"),
        })
        .collect();
    assert_eq!(properties, vec!["value", "nested", "count"]);
    assert!(matches!(
        arena.kind(fields[1]),
        Some(NodeKind::BindingElement {
            name: BindingName::Object(_),
            ..
        })
    ));
    assert_eq!(object.name_span.text(source), "{ value, nested: { flag }, count = 0 }");

    let array = decl(&arena, function.params[1]);
    let BindingName::Array(elements) = &array.name else {
        panic!("expected an array pattern");
    };
    assert_eq!(elements.len(), 3);
    assert!(elements[1].is_none());
    let third = elements[2].expect("third element");
    assert!(matches!(
        arena.kind(third),
        Some(NodeKind::BindingElement { property, .. }) if property == "2"
    ));
    assert_eq!(array.name.elements().len(), 2);
}

#[test]
fn test_arrow_functions_and_parenthesized_expressions() {
    let (arena, statements) = parse("const f = (a, b) => a + b;\nconst g = x => x;\nconst h = (a);");

    let f = initializer_of(&arena, statements[0]);
    let data = function_data(&arena, f);
    assert_eq!(data.kind, FunctionKind::Arrow);
    assert_eq!(data.params.len(), 2);
    assert!(matches!(data.body, Some(FunctionBody::Expression(_))));

    let g = initializer_of(&arena, statements[1]);
    assert_eq!(function_data(&arena, g).params.len(), 1);

    let h = initializer_of(&arena, statements[2]);
    assert!(matches!(arena.kind(h), Some(NodeKind::Paren { .. })));
}

#[test]
fn test_arrow_with_return_annotation_and_block_body() {
    let (arena, statements) = parse("const f = (n: number): string => { return `${n}`; };");
    let data = function_data(&arena, initializer_of(&arena, statements[0]));
    assert_eq!(
        data.return_type.as_ref().map(|annotation| &annotation.ty),
        Some(&TypeNode::Keyword(PrimitiveKind::String))
    );
    assert!(matches!(data.body, Some(FunctionBody::Block(_))));
}

#[test]
fn test_binary_precedence() {
    let (arena, statements) = parse("let r = a + b * c;\nlet s = a || b && c;");

    let r = initializer_of(&arena, statements[0]);
    let Some(NodeKind::Binary {
        operator, right, ..
    }) = arena.kind(r)
    else {
        panic!("expected a binary expression");
    };
    assert_eq!(*operator, BinaryOperator::Plus);
    assert!(matches!(
        arena.kind(*right),
        Some(NodeKind::Binary {
            operator: BinaryOperator::Multiply,
            ..
        })
    ));

    let s = initializer_of(&arena, statements[1]);
    let Some(NodeKind::Binary {
        operator, right, ..
    }) = arena.kind(s)
    else {
        panic!("expected a binary expression");
    };
    assert_eq!(*operator, BinaryOperator::LogicalOr);
    assert!(matches!(
        arena.kind(*right),
        Some(NodeKind::Binary {
            operator: BinaryOperator::LogicalAnd,
            ..
        })
    ));
}

#[test]
fn test_call_new_and_member_chains() {
    let source = "Number.parseInt(value);\nnew Date(1).getTime();";
    let (arena, statements) = parse(source);

    let Some(NodeKind::ExpressionStatement { expression }) = arena.kind(statements[0]) else {
        panic!("expected an expression statement");
    };
    let Some(NodeKind::Call { callee, arguments }) = arena.kind(*expression) else {
        panic!("expected a call");
    };
    assert_eq!(arguments.len(), 1);
    assert_eq!(arena.span(*callee).text(source), "Number.parseInt");

    let Some(NodeKind::ExpressionStatement { expression }) = arena.kind(statements[1]) else {
        panic!("expected an expression statement");
    };
    let Some(NodeKind::Call { callee, .. }) = arena.kind(*expression) else {
        panic!("expected a call");
    };
    let Some(NodeKind::PropertyAccess { object, name }) = arena.kind(*callee) else {
        panic!("expected a property access");
    };
    assert_eq!(name, "getTime");
    assert!(matches!(arena.kind(*object), Some(NodeKind::New { .. })));
}

#[test]
fn test_template_spans_are_parsed_in_place() {
    let source = "let s = `a${x + 1}b${y}`;";
    let (arena, statements) = parse(source);
    let template = initializer_of(&arena, statements[0]);
    let Some(NodeKind::Template { quasis, spans }) = arena.kind(template) else {
        panic!("expected a template");
    };
    assert_eq!(quasis, &vec!["a".to_string(), "b".to_string(), String::new()]);
    assert_eq!(arena.span(spans[0]).text(source), "x + 1");
    assert_eq!(arena.span(spans[1]).text(source), "y");
    assert_eq!(arena.parent(spans[1]), Some(template));
}

#[test]
fn test_class_members() {
    let source = "class Point {\n  private readonly x: number = 0;\n  label?: string;\n  constructor(x) {}\n  move(dx) { return dx; }\n}";
    let (arena, statements) = parse(source);
    let Some(NodeKind::Class { name, members }) = arena.kind(statements[0]) else {
        panic!("expected a class");
    };
    assert_eq!(name, "Point");
    assert_eq!(members.len(), 4);
    assert!(matches!(
        arena.kind(members[0]),
        Some(NodeKind::Property { name, annotation: Some(_), initializer: Some(_) }) if name == "x"
    ));
    assert_eq!(function_data(&arena, members[2]).kind, FunctionKind::Constructor);
    let method = function_data(&arena, members[3]);
    assert_eq!(method.kind, FunctionKind::Method);
    assert_eq!(method.name.as_deref(), Some("move"));
}

#[test]
fn test_declarations_without_bodies() {
    let (arena, statements) =
        parse("declare function parseInt(s: string): number;\ndeclare const y: any;");
    let function = function_data(&arena, statements[0]);
    assert!(function.body.is_none());
    assert!(function.flags.contains(ModifierFlags::DECLARE));

    let Some(NodeKind::VariableStatement { declarations }) = arena.kind(statements[1]) else {
        panic!("expected a variable statement");
    };
    let y = decl(&arena, declarations[0]);
    assert!(y.flags.contains(ModifierFlags::DECLARE | ModifierFlags::CONST));
}

#[test]
fn test_type_text_forms() {
    assert_eq!(
        parse_type_text("| 1 | -2 | \"a\"").expect("type"),
        TypeNode::Union(vec![
            TypeNode::Literal(LiteralValue::Number(1.0)),
            TypeNode::Literal(LiteralValue::Number(-2.0)),
            TypeNode::Literal(LiteralValue::String("a".to_string())),
        ])
    );
    assert_eq!(
        parse_type_text("readonly string[][]").expect("type"),
        TypeNode::Array {
            element: Box::new(TypeNode::Array {
                element: Box::new(TypeNode::Keyword(PrimitiveKind::String)),
                readonly: false,
            }),
            readonly: true,
        }
    );
    assert_eq!(
        parse_type_text("(value: number, label?: string) => void").expect("type"),
        TypeNode::Function {
            params: vec![
                TypeParam {
                    name: "value".to_string(),
                    ty: TypeNode::Keyword(PrimitiveKind::Number),
                    optional: false,
                },
                TypeParam {
                    name: "label".to_string(),
                    ty: TypeNode::Keyword(PrimitiveKind::String),
                    optional: true,
                },
            ],
            return_type: Box::new(TypeNode::Keyword(PrimitiveKind::Void)),
        }
    );
    assert_eq!(
        parse_type_text("import(\"./models\").User").expect("type"),
        TypeNode::Import {
            module: "./models".to_string(),
            name: "User".to_string(),
        }
    );
    assert_eq!(
        parse_type_text("(string | number)[]").expect("type"),
        TypeNode::Array {
            element: Box::new(TypeNode::Union(vec![
                TypeNode::Keyword(PrimitiveKind::String),
                TypeNode::Keyword(PrimitiveKind::Number),
            ])),
            readonly: false,
        }
    );
}

#[test]
fn test_object_type_members_accept_quoted_names_and_methods() {
    let ty = parse_type_text("{ \"value\": string; count?: number, get(key: string): boolean }")
        .expect("type");
    let TypeNode::Object(members) = ty else {
        panic!("expected an object type");
    };
    let names: Vec<&str> = members.iter().map(|member| member.name.as_str()).collect();
    assert_eq!(names, vec!["value", "count", "get"]);
    assert!(members[1].optional);
    assert!(matches!(members[2].ty, TypeNode::Function { .. }));
}

#[test]
fn test_type_text_errors() {
    let error = parse_type_text("readonly string").unwrap_err();
    assert!(error.message.contains("readonly"));

    let error = parse_type_text("number string").unwrap_err();
    assert_eq!(error.message, "unexpected text after type");
    assert_eq!(error.pos, 7);

    assert!(parse_type_text("{ a: }").is_err());
}

#[test]
fn test_parse_errors_report_the_offending_token() {
    let mut arena = NodeArena::new();
    let error = parse_source_file(&mut arena, FileId(0), "function f(a { }").unwrap_err();
    assert_eq!(error.message, "')' expected");
    assert_eq!(error.pos, 13);
}
