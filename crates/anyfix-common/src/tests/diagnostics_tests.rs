use super::*;

fn diag(code: u32, message: &str, start: u32) -> Diagnostic {
    Diagnostic::error("a.ts", start, 1, message, code)
}

#[test]
fn test_format_message_substitutes_placeholders() {
    let text = format_message(
        diagnostic_messages::ARGUMENT_NOT_ASSIGNABLE,
        &["string", "number"],
    );
    assert_eq!(
        text,
        "Argument of type 'string' is not assignable to parameter of type 'number'."
    );
}

#[test]
fn test_messages_introduced_ignores_shifted_positions() {
    let before = vec![diag(2322, "Type 'a' is not assignable to type 'b'.", 10)];
    let after = vec![diag(2322, "Type 'a' is not assignable to type 'b'.", 18)];
    assert!(messages_introduced(&before, &after).is_empty());
}

#[test]
fn test_messages_introduced_counts_duplicates() {
    let before = vec![diag(2339, "Property 'x' does not exist on type '5'.", 0)];
    let after = vec![
        diag(2339, "Property 'x' does not exist on type '5'.", 0),
        diag(2339, "Property 'x' does not exist on type '5'.", 40),
    ];
    let introduced = messages_introduced(&before, &after);
    assert_eq!(introduced.len(), 1);
    assert_eq!(introduced[0].start, 40);
}

#[test]
fn test_headline() {
    let d = diag(2304, "Cannot find name 'foo'.", 0);
    assert_eq!(d.headline(), "TS2304: Cannot find name 'foo'.");
}
