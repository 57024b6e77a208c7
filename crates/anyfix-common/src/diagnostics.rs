use rustc_hash::FxHashMap;
use serde::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Suggestion,
    Message,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub code: u32,
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
}

impl Diagnostic {
    pub fn error(
        file: impl Into<String>,
        start: u32,
        length: u32,
        message: impl Into<String>,
        code: u32,
    ) -> Self {
        Self {
            category: DiagnosticCategory::Error,
            message_text: message.into(),
            code,
            file: file.into(),
            start,
            length,
        }
    }

    /// `TS2345: Argument of type ...` style rendering without a location.
    pub fn headline(&self) -> String {
        format!("TS{}: {}", self.code, self.message_text)
    }
}

/// Diagnostic codes reported by the reference host. They match TypeScript's.
pub mod diagnostic_codes {
    pub const CANNOT_FIND_NAME: u32 = 2304;
    pub const TYPE_NOT_ASSIGNABLE: u32 = 2322;
    pub const PROPERTY_DOES_NOT_EXIST: u32 = 2339;
    pub const ARGUMENT_NOT_ASSIGNABLE: u32 = 2345;
    pub const NOT_CALLABLE: u32 = 2349;
    pub const NOT_CONSTRUCTABLE: u32 = 2351;
    pub const ARITHMETIC_LEFT_OPERAND: u32 = 2362;
    pub const ARITHMETIC_RIGHT_OPERAND: u32 = 2363;
    pub const OPERATOR_CANNOT_BE_APPLIED: u32 = 2365;
    pub const EXPECTED_ARGUMENTS: u32 = 2554;
    pub const CANNOT_ASSIGN_TO_CONSTANT: u32 = 2588;
}

/// Message templates for [`diagnostic_codes`], using `{0}`-style placeholders.
pub mod diagnostic_messages {
    pub const CANNOT_FIND_NAME: &str = "Cannot find name '{0}'.";
    pub const TYPE_NOT_ASSIGNABLE: &str = "Type '{0}' is not assignable to type '{1}'.";
    pub const PROPERTY_DOES_NOT_EXIST: &str = "Property '{0}' does not exist on type '{1}'.";
    pub const ARGUMENT_NOT_ASSIGNABLE: &str =
        "Argument of type '{0}' is not assignable to parameter of type '{1}'.";
    pub const NOT_CALLABLE: &str = "This expression is not callable.";
    pub const NOT_CONSTRUCTABLE: &str = "This expression is not constructable.";
    pub const ARITHMETIC_LEFT_OPERAND: &str = "The left-hand side of an arithmetic operation must be of type 'any', 'number', 'bigint' or an enum type.";
    pub const ARITHMETIC_RIGHT_OPERAND: &str = "The right-hand side of an arithmetic operation must be of type 'any', 'number', 'bigint' or an enum type.";
    pub const OPERATOR_CANNOT_BE_APPLIED: &str =
        "Operator '{0}' cannot be applied to types '{1}' and '{2}'.";
    pub const EXPECTED_ARGUMENTS: &str = "Expected {0} arguments, but got {1}.";
    pub const CANNOT_ASSIGN_TO_CONSTANT: &str =
        "Cannot assign to '{0}' because it is a constant.";
}

pub fn format_message(message: &str, args: &[&str]) -> String {
    let mut result = message.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

/// Diagnostics present in `after` but not in `before`, compared by code and
/// message (positions shift when annotations are inserted).
pub fn messages_introduced(before: &[Diagnostic], after: &[Diagnostic]) -> Vec<Diagnostic> {
    let mut seen: FxHashMap<(u32, &str), usize> = FxHashMap::default();
    for diag in before {
        *seen.entry((diag.code, diag.message_text.as_str())).or_default() += 1;
    }
    let mut introduced = Vec::new();
    for diag in after {
        match seen.get_mut(&(diag.code, diag.message_text.as_str())) {
            Some(count) if *count > 0 => *count -= 1,
            _ => introduced.push(diag.clone()),
        }
    }
    introduced
}

#[cfg(test)]
#[path = "tests/diagnostics_tests.rs"]
mod tests;
