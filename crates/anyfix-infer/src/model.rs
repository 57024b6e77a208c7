//! Program-level view of a host.
//!
//! [`SemanticModel`] extends [`TypeQuery`] with syntax-aware questions (which
//! bindings exist, where a symbol is referenced and in what construct) and the
//! two mutations the driver needs. Hosts answer in terms of opaque
//! [`NodeId`]/[`SymbolId`]/[`FileId`] handles.

use anyfix_common::Diagnostic;
use anyfix_solver::{TypeId, TypeQuery};
use serde::{Deserialize, Serialize};

/// Opaque handle to a syntax node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Opaque handle to a declared symbol.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolId(pub u32);

/// Opaque handle to a source file.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    Plus,
    Minus,
    Multiply,
    Divide,
    Remainder,
    LogicalAnd,
    LogicalOr,
    Equals,
    NotEquals,
    StrictEquals,
    StrictNotEquals,
    LessThan,
    GreaterThan,
    LessEquals,
    GreaterEquals,
}

impl BinaryOperator {
    pub const fn as_str(self) -> &'static str {
        match self {
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Remainder => "%",
            BinaryOperator::LogicalAnd => "&&",
            BinaryOperator::LogicalOr => "||",
            BinaryOperator::Equals => "==",
            BinaryOperator::NotEquals => "!=",
            BinaryOperator::StrictEquals => "===",
            BinaryOperator::StrictNotEquals => "!==",
            BinaryOperator::LessThan => "<",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::LessEquals => "<=",
            BinaryOperator::GreaterEquals => ">=",
        }
    }

    /// `-`, `*`, `/` and `%`: operands must be numeric.
    pub const fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOperator::Minus
                | BinaryOperator::Multiply
                | BinaryOperator::Divide
                | BinaryOperator::Remainder
        )
    }

    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOperator::Equals
                | BinaryOperator::NotEquals
                | BinaryOperator::StrictEquals
                | BinaryOperator::StrictNotEquals
                | BinaryOperator::LessThan
                | BinaryOperator::GreaterThan
                | BinaryOperator::LessEquals
                | BinaryOperator::GreaterEquals
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperator {
    Not,
    Minus,
    Plus,
    Typeof,
}

impl UnaryOperator {
    pub const fn as_str(self) -> &'static str {
        match self {
            UnaryOperator::Not => "!",
            UnaryOperator::Minus => "-",
            UnaryOperator::Plus => "+",
            UnaryOperator::Typeof => "typeof ",
        }
    }
}

/// The construct a reference appears in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UsageSite {
    /// `reference = value`
    AssignmentTarget { value: NodeId },
    /// `target = reference`
    AssignmentSource { target: NodeId },
    /// `let declaration = reference`
    Initializer { declaration: NodeId },
    /// `callee(.., reference, ..)` or `new callee(.., reference, ..)`
    CallArgument { callee: NodeId, index: usize },
    /// `reference(arguments)` or `new reference(arguments)`
    Callee { arguments: Vec<NodeId> },
    /// `reference <op> other` or `other <op> reference`
    Binary {
        operator: BinaryOperator,
        other: NodeId,
    },
    /// `<op>reference`
    Unary { operator: UnaryOperator },
    /// `${reference}` inside a template literal
    TemplateSpan,
    /// `return reference`, or the expression body of an arrow function
    Return { function: NodeId },
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reference {
    pub node: NodeId,
    pub site: UsageSite,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BindingKind {
    /// Parameter `index` of a function, method, arrow function or constructor.
    Parameter { callable: NodeId, index: usize },
    Variable,
    /// A name introduced by a destructuring pattern.
    Element,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BindingPattern {
    Object(Vec<PatternField>),
    /// Array pattern; `None` for holes.
    Array(Vec<Option<PatternTarget>>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternField {
    pub property: String,
    pub target: PatternTarget,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatternTarget {
    /// An element binding node.
    Binding(NodeId),
    Pattern(BindingPattern),
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MutationError {
    #[error("node {0:?} cannot carry a type annotation")]
    NotAnnotatable(NodeId),
    #[error("invalid type text `{text}`: {message}")]
    InvalidTypeText { text: String, message: String },
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),
}

/// Queries and mutations the driver performs against a program.
pub trait SemanticModel: TypeQuery {
    /// Files to rewrite, in a stable order.
    fn files(&self) -> Vec<FileId>;

    fn file_name(&self, file: FileId) -> String;

    /// Annotatable bindings (parameters and variables) in source order.
    fn bindings(&self, file: FileId) -> Vec<NodeId>;

    /// Display text of a binding's name or pattern.
    fn binding_name(&self, binding: NodeId) -> String;

    fn binding_kind(&self, binding: NodeId) -> BindingKind;

    /// The destructuring pattern a binding declares, if any.
    fn binding_pattern(&self, binding: NodeId) -> Option<BindingPattern>;

    fn file_of(&self, node: NodeId) -> FileId;

    fn type_of(&self, node: NodeId) -> TypeId;

    fn has_explicit_annotation(&self, node: NodeId) -> bool;

    fn declared_type_text(&self, node: NodeId) -> Option<String>;

    /// Symbol declared by a binding or a callable declaration.
    fn symbol_of(&self, node: NodeId) -> Option<SymbolId>;

    fn references(&self, symbol: SymbolId) -> Vec<Reference>;

    /// Parameter types of the signature a callee expression resolves to.
    fn declared_parameter_types(&self, callee: NodeId) -> Option<Vec<TypeId>>;

    /// Explicitly annotated return type of a function-like node.
    fn declared_return_type(&self, function: NodeId) -> Option<TypeId>;

    fn diagnostics(&self, file: FileId) -> Vec<Diagnostic>;

    fn set_declared_type(&mut self, node: NodeId, text: &str) -> Result<(), MutationError>;

    fn remove_declared_type(&mut self, node: NodeId);
}
