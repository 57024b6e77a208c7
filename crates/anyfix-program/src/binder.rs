//! Name binding.
//!
//! The binder creates a symbol for every declaration and resolves every
//! `Identifier` expression to the symbol it refers to. Scoping is
//! deliberately simple: one global scope shared by all files, and one scope
//! per function holding its parameters and every declaration in its body,
//! hoisted.
//!
//! Types live in their own namespace (`type_declarations`), so
//! `interface Math` and `declare const Math: Math` coexist.

use crate::ast::{BindingName, FunctionBody, FunctionKind, NodeArena, NodeKind};
use anyfix_infer::{NodeId, SymbolId};
use rustc_hash::FxHashMap;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Parameter,
    /// A name introduced by a destructuring pattern.
    Element,
    Function,
    Class,
    Method,
}

#[derive(Clone, Debug)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub declaration: NodeId,
}

#[derive(Default)]
pub struct BinderState {
    symbols: Vec<Symbol>,
    node_symbols: FxHashMap<NodeId, SymbolId>,
    resolved: FxHashMap<NodeId, SymbolId>,
    references: FxHashMap<SymbolId, Vec<NodeId>>,
    type_declarations: FxHashMap<String, NodeId>,
    class_members: FxHashMap<String, FxHashMap<String, SymbolId>>,
    scopes: Vec<FxHashMap<String, SymbolId>>,
}

impl BinderState {
    /// Bind all files together; `roots` are `SourceFile` nodes.
    pub fn bind_program(arena: &NodeArena, roots: &[NodeId]) -> Self {
        let mut binder = BinderState {
            scopes: vec![FxHashMap::default()],
            ..Default::default()
        };
        for &root in roots {
            if let Some(NodeKind::SourceFile { statements }) = arena.kind(root) {
                binder.declare_hoisted(arena, statements);
            }
        }
        for &root in roots {
            binder.bind_node(arena, root);
        }
        binder.scopes.clear();
        tracing::debug!(
            symbols = binder.symbols.len(),
            resolved = binder.resolved.len(),
            "bound program"
        );
        binder
    }

    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0 as usize)
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// Symbol declared by `node`.
    pub fn declared_symbol(&self, node: NodeId) -> Option<SymbolId> {
        self.node_symbols.get(&node).copied()
    }

    /// Symbol an `Identifier` expression resolves to.
    pub fn resolved_symbol(&self, identifier: NodeId) -> Option<SymbolId> {
        self.resolved.get(&identifier).copied()
    }

    pub fn references(&self, symbol: SymbolId) -> &[NodeId] {
        self.references
            .get(&symbol)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn type_declaration(&self, name: &str) -> Option<NodeId> {
        self.type_declarations.get(name).copied()
    }

    pub fn type_declarations(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.type_declarations
            .iter()
            .map(|(name, &node)| (name.as_str(), node))
    }

    pub fn class_member(&self, class: &str, member: &str) -> Option<SymbolId> {
        self.class_members.get(class)?.get(member).copied()
    }

    // =========================================================================
    // Declaration
    // =========================================================================

    fn create_symbol(&mut self, name: &str, kind: SymbolKind, declaration: NodeId) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(Symbol {
            name: name.to_string(),
            kind,
            declaration,
        });
        self.node_symbols.insert(declaration, id);
        id
    }

    fn declare(&mut self, name: &str, kind: SymbolKind, declaration: NodeId) -> SymbolId {
        let id = self.create_symbol(name, kind, declaration);
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), id);
        }
        id
    }

    fn declare_binding(
        &mut self,
        arena: &NodeArena,
        name: &BindingName,
        kind: SymbolKind,
        declaration: NodeId,
    ) {
        match name {
            BindingName::Identifier(name) => {
                self.declare(name, kind, declaration);
            }
            BindingName::Object(_) | BindingName::Array(_) => {
                for element in name.elements() {
                    if let Some(NodeKind::BindingElement { name, .. }) = arena.kind(element) {
                        self.declare_binding(arena, name, SymbolKind::Element, element);
                    }
                }
            }
        }
    }

    /// Declare everything visible throughout the enclosing scope: variables
    /// and functions anywhere in `statements` (not inside nested functions),
    /// plus classes and type declarations.
    fn declare_hoisted(&mut self, arena: &NodeArena, statements: &[NodeId]) {
        for &statement in statements {
            let Some(kind) = arena.kind(statement) else {
                continue;
            };
            match kind {
                NodeKind::VariableStatement { declarations } => {
                    for &declaration in declarations {
                        if let Some(decl) = arena.binding_decl(declaration) {
                            self.declare_binding(
                                arena,
                                &decl.name,
                                SymbolKind::Variable,
                                declaration,
                            );
                        }
                    }
                }
                NodeKind::Function(function) => {
                    if let Some(name) = &function.name {
                        self.declare(name, SymbolKind::Function, statement);
                    }
                }
                NodeKind::Class { name, members } => {
                    let class_symbol = self.declare(name, SymbolKind::Class, statement);
                    self.type_declarations.insert(name.clone(), statement);
                    let mut methods = FxHashMap::default();
                    for &member in members {
                        let Some(NodeKind::Function(function)) = arena.kind(member) else {
                            continue;
                        };
                        match function.kind {
                            FunctionKind::Constructor => {
                                self.node_symbols.insert(member, class_symbol);
                            }
                            _ => {
                                let member_name = function.name.clone().unwrap_or_default();
                                let id =
                                    self.create_symbol(&member_name, SymbolKind::Method, member);
                                methods.insert(member_name, id);
                            }
                        }
                    }
                    self.class_members.insert(name.clone(), methods);
                }
                NodeKind::TypeAlias { name, .. } | NodeKind::Interface { name, .. } => {
                    self.type_declarations.insert(name.clone(), statement);
                }
                NodeKind::Block { statements } => self.declare_hoisted(arena, statements),
                NodeKind::If {
                    then_branch,
                    else_branch,
                    ..
                } => {
                    let mut branches = vec![*then_branch];
                    branches.extend(*else_branch);
                    self.declare_hoisted(arena, &branches);
                }
                _ => {}
            }
        }
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    fn resolve(&self, name: &str) -> Option<SymbolId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
    }

    fn bind_node(&mut self, arena: &NodeArena, node: NodeId) {
        let Some(kind) = arena.kind(node) else {
            return;
        };
        match kind {
            NodeKind::Identifier { name } => {
                if let Some(symbol) = self.resolve(name) {
                    self.resolved.insert(node, symbol);
                    self.references.entry(symbol).or_default().push(node);
                }
            }
            NodeKind::Function(function) => {
                self.scopes.push(FxHashMap::default());
                for &param in &function.params {
                    if let Some(decl) = arena.binding_decl(param) {
                        self.declare_binding(arena, &decl.name, SymbolKind::Parameter, param);
                    }
                }
                if let Some(FunctionBody::Block(body)) = function.body
                    && let Some(NodeKind::Block { statements }) = arena.kind(body)
                {
                    self.declare_hoisted(arena, statements);
                }
                for child in arena.children(node) {
                    self.bind_node(arena, child);
                }
                self.scopes.pop();
            }
            _ => {
                for child in arena.children(node) {
                    self.bind_node(arena, child);
                }
            }
        }
    }
}
