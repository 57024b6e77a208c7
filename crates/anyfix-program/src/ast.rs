//! Syntax tree stored in a flat arena.
//!
//! Nodes are addressed by [`NodeId`] and carry their parent and file, so a
//! reference can be classified by looking at its parent alone. Type
//! annotations are not arena nodes; they are small owned [`TypeNode`] trees
//! attached to the declaration that carries them.

use anyfix_common::Span;
use anyfix_infer::{BinaryOperator, FileId, NodeId, UnaryOperator};
use anyfix_solver::{LiteralValue, PrimitiveKind};
use bitflags::bitflags;

bitflags! {
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct ModifierFlags: u8 {
        const DECLARE = 1 << 0;
        const CONST = 1 << 1;
        const LET = 1 << 2;
        const OPTIONAL = 1 << 3;
        const READONLY = 1 << 4;
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub parent: Option<NodeId>,
    pub file: FileId,
}

#[derive(Clone, Debug)]
pub enum NodeKind {
    SourceFile {
        statements: Vec<NodeId>,
    },

    // Declarations
    Function(FunctionData),
    Class {
        name: String,
        members: Vec<NodeId>,
    },
    /// Class field.
    Property {
        name: String,
        annotation: Option<TypeAnnotation>,
        initializer: Option<NodeId>,
    },
    Parameter(BindingDecl),
    Variable(BindingDecl),
    BindingElement {
        property: String,
        name: BindingName,
        initializer: Option<NodeId>,
    },
    TypeAlias {
        name: String,
        ty: TypeNode,
    },
    Interface {
        name: String,
        members: Vec<TypeMember>,
    },

    // Statements
    VariableStatement {
        declarations: Vec<NodeId>,
    },
    Return {
        expression: Option<NodeId>,
    },
    If {
        condition: NodeId,
        then_branch: NodeId,
        else_branch: Option<NodeId>,
    },
    Block {
        statements: Vec<NodeId>,
    },
    ExpressionStatement {
        expression: NodeId,
    },

    // Expressions
    Identifier {
        name: String,
    },
    NumericLiteral {
        value: f64,
    },
    StringLiteral {
        value: String,
    },
    BooleanLiteral {
        value: bool,
    },
    NullLiteral,
    Undefined,
    This,
    Template {
        quasis: Vec<String>,
        spans: Vec<NodeId>,
    },
    ObjectLiteral {
        properties: Vec<(String, NodeId)>,
    },
    ArrayLiteral {
        elements: Vec<NodeId>,
    },
    Call {
        callee: NodeId,
        arguments: Vec<NodeId>,
    },
    New {
        callee: NodeId,
        arguments: Vec<NodeId>,
    },
    PropertyAccess {
        object: NodeId,
        name: String,
    },
    Binary {
        operator: BinaryOperator,
        left: NodeId,
        right: NodeId,
    },
    Unary {
        operator: UnaryOperator,
        operand: NodeId,
    },
    Assignment {
        target: NodeId,
        value: NodeId,
    },
    Paren {
        expression: NodeId,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FunctionKind {
    Declaration,
    Method,
    Constructor,
    Arrow,
}

#[derive(Clone, Debug)]
pub struct FunctionData {
    pub kind: FunctionKind,
    pub name: Option<String>,
    pub params: Vec<NodeId>,
    pub return_type: Option<TypeAnnotation>,
    pub body: Option<FunctionBody>,
    pub flags: ModifierFlags,
}

#[derive(Copy, Clone, Debug)]
pub enum FunctionBody {
    /// A `Block` node.
    Block(NodeId),
    /// Arrow function expression body.
    Expression(NodeId),
}

/// A parameter or variable declaration.
#[derive(Clone, Debug)]
pub struct BindingDecl {
    pub name: BindingName,
    pub annotation: Option<TypeAnnotation>,
    pub initializer: Option<NodeId>,
    pub flags: ModifierFlags,
    /// Where `: T` is inserted when there is no annotation.
    pub annotation_insert: u32,
    /// Source range of the name or pattern.
    pub name_span: Span,
}

#[derive(Clone, Debug)]
pub enum BindingName {
    Identifier(String),
    Object(Vec<NodeId>),
    /// Array pattern; `None` for holes.
    Array(Vec<Option<NodeId>>),
}

impl BindingName {
    pub fn identifier(&self) -> Option<&str> {
        match self {
            BindingName::Identifier(name) => Some(name),
            BindingName::Object(_) | BindingName::Array(_) => None,
        }
    }

    pub fn elements(&self) -> Vec<NodeId> {
        match self {
            BindingName::Identifier(_) => Vec::new(),
            BindingName::Object(elements) => elements.clone(),
            BindingName::Array(elements) => elements.iter().flatten().copied().collect(),
        }
    }
}

/// `: T` with the range from the colon to the end of the type.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeAnnotation {
    pub ty: TypeNode,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TypeNode {
    Keyword(PrimitiveKind),
    Literal(LiteralValue),
    Reference(String),
    Import { module: String, name: String },
    Array { element: Box<TypeNode>, readonly: bool },
    Tuple { elements: Vec<TypeNode>, readonly: bool },
    Object(Vec<TypeMember>),
    Function { params: Vec<TypeParam>, return_type: Box<TypeNode> },
    Union(Vec<TypeNode>),
    Intersection(Vec<TypeNode>),
}

impl TypeNode {
    /// Named references in this type, for unresolved-name reporting.
    pub fn references(&self, out: &mut Vec<String>) {
        match self {
            TypeNode::Reference(name) => out.push(name.clone()),
            TypeNode::Array { element, .. } => element.references(out),
            TypeNode::Tuple { elements, .. }
            | TypeNode::Union(elements)
            | TypeNode::Intersection(elements) => {
                for element in elements {
                    element.references(out);
                }
            }
            TypeNode::Object(members) => {
                for member in members {
                    member.ty.references(out);
                }
            }
            TypeNode::Function {
                params,
                return_type,
            } => {
                for param in params {
                    param.ty.references(out);
                }
                return_type.references(out);
            }
            TypeNode::Keyword(_) | TypeNode::Literal(_) | TypeNode::Import { .. } => {}
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeMember {
    pub name: String,
    pub ty: TypeNode,
    pub optional: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeParam {
    pub name: String,
    pub ty: TypeNode,
    pub optional: bool,
}

// =============================================================================
// Arena
// =============================================================================

#[derive(Clone, Debug, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    pub fn new() -> Self {
        NodeArena { nodes: Vec::new() }
    }

    /// Allocate a node and adopt its children.
    pub fn alloc(&mut self, kind: NodeKind, span: Span, file: FileId) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let children = children_of(&kind);
        self.nodes.push(Node {
            kind,
            span,
            parent: None,
            file,
        });
        for child in children {
            if let Some(node) = self.nodes.get_mut(child.0 as usize) {
                node.parent = Some(id);
            }
        }
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.get(id).map(|node| &node.kind)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.parent)
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.get(id).map(|node| node.span).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.kind(id).map(children_of).unwrap_or_default()
    }

    /// Pre-order walk starting at `root`.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            order.push(id);
            let children = self.children(id);
            stack.extend(children.into_iter().rev());
        }
        order
    }

    /// Nearest enclosing function-like node.
    pub fn enclosing_function(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.parent(id);
        while let Some(node) = current {
            if matches!(self.kind(node), Some(NodeKind::Function(_))) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    pub fn binding_decl(&self, id: NodeId) -> Option<&BindingDecl> {
        match self.kind(id)? {
            NodeKind::Parameter(decl) | NodeKind::Variable(decl) => Some(decl),
            _ => None,
        }
    }
}

fn children_of(kind: &NodeKind) -> Vec<NodeId> {
    match kind {
        NodeKind::SourceFile { statements } | NodeKind::Block { statements } => statements.clone(),
        NodeKind::Function(function) => {
            let mut children = function.params.clone();
            match function.body {
                Some(FunctionBody::Block(body)) | Some(FunctionBody::Expression(body)) => {
                    children.push(body);
                }
                None => {}
            }
            children
        }
        NodeKind::Class { members, .. } => members.clone(),
        NodeKind::Property { initializer, .. } => initializer.iter().copied().collect(),
        NodeKind::Parameter(decl) | NodeKind::Variable(decl) => {
            let mut children = decl.name.elements();
            children.extend(decl.initializer);
            children
        }
        NodeKind::BindingElement {
            name, initializer, ..
        } => {
            let mut children = name.elements();
            children.extend(*initializer);
            children
        }
        NodeKind::VariableStatement { declarations } => declarations.clone(),
        NodeKind::Return { expression } => expression.iter().copied().collect(),
        NodeKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            let mut children = vec![*condition, *then_branch];
            children.extend(*else_branch);
            children
        }
        NodeKind::ExpressionStatement { expression } | NodeKind::Paren { expression } => {
            vec![*expression]
        }
        NodeKind::Template { spans, .. } => spans.clone(),
        NodeKind::ObjectLiteral { properties } => {
            properties.iter().map(|(_, value)| *value).collect()
        }
        NodeKind::ArrayLiteral { elements } => elements.clone(),
        NodeKind::Call { callee, arguments } | NodeKind::New { callee, arguments } => {
            let mut children = vec![*callee];
            children.extend(arguments.iter().copied());
            children
        }
        NodeKind::PropertyAccess { object, .. } => vec![*object],
        NodeKind::Binary { left, right, .. } => vec![*left, *right],
        NodeKind::Unary { operand, .. } => vec![*operand],
        NodeKind::Assignment { target, value } => vec![*target, *value],
        NodeKind::TypeAlias { .. }
        | NodeKind::Interface { .. }
        | NodeKind::Identifier { .. }
        | NodeKind::NumericLiteral { .. }
        | NodeKind::StringLiteral { .. }
        | NodeKind::BooleanLiteral { .. }
        | NodeKind::NullLiteral
        | NodeKind::Undefined
        | NodeKind::This => Vec::new(),
    }
}
