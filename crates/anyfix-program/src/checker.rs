//! Type checking for the reference host.
//!
//! A check runs over the whole program and produces a [`CheckResult`]:
//! the type of every expression and binding, the declared return types, the
//! diagnostics per file, and the property accesses that refer to class
//! methods.
//!
//! Checking happens in two phases. Named types (aliases, interfaces, class
//! instance types) are defined first; class methods are typed with their
//! declared return types, then again with inferred ones. All expression
//! state is then discarded and every file is checked top to bottom, which
//! is the pass that produces diagnostics.

use crate::ast::{
    BindingName, FunctionBody, FunctionData, FunctionKind, ModifierFlags, NodeArena, NodeKind,
    TypeMember, TypeNode,
};
use crate::binder::{BinderState, SymbolKind};
use crate::program::AnnotationOverride;
use crate::relation::AssignabilityChecker;
use crate::types::intrinsics::*;
use crate::types::{ParamInfo, PropertyInfo, TypeData, TypeTable};
use anyfix_common::diagnostics::diagnostic_messages;
use anyfix_common::limits::MAX_EXPR_CHECK_DEPTH;
use anyfix_common::{Diagnostic, diagnostic_codes, format_message};
use anyfix_infer::{BinaryOperator, FileId, NodeId, SymbolId, UnaryOperator};
use anyfix_solver::{LiteralValue, TypeId};
use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Debug, Default)]
pub struct CheckResult {
    /// Types of expressions, bindings, class properties and functions.
    pub node_types: FxHashMap<NodeId, TypeId>,
    /// Resolved return annotations of function-like nodes.
    pub declared_returns: FxHashMap<NodeId, TypeId>,
    pub diagnostics: FxHashMap<FileId, Vec<Diagnostic>>,
    /// `obj.method` accesses keyed by the method's symbol.
    pub member_references: FxHashMap<SymbolId, Vec<NodeId>>,
}

#[derive(Copy, Clone)]
pub struct CheckerContext<'a> {
    pub arena: &'a NodeArena,
    pub binder: &'a BinderState,
    pub roots: &'a [NodeId],
    pub file_names: &'a [String],
    pub overrides: &'a FxHashMap<NodeId, AnnotationOverride>,
}

/// Check the whole program.
pub fn check_program(context: CheckerContext<'_>, types: &mut TypeTable) -> CheckResult {
    let mut checker = CheckerState::new(context, types);
    checker.define_named_types();
    checker.reset();
    for &root in context.roots {
        if let Some(NodeKind::SourceFile { statements }) = context.arena.kind(root) {
            checker.check_statements(statements);
        }
    }
    checker.into_result()
}

pub(crate) struct CheckerState<'a> {
    arena: &'a NodeArena,
    binder: &'a BinderState,
    file_names: &'a [String],
    overrides: &'a FxHashMap<NodeId, AnnotationOverride>,
    types: &'a mut TypeTable,

    node_types: FxHashMap<NodeId, TypeId>,
    declared_returns: FxHashMap<NodeId, TypeId>,
    function_types: FxHashMap<NodeId, TypeId>,
    checked_functions: FxHashSet<NodeId>,
    /// Bindings and functions whose type is being computed.
    in_progress: FxHashSet<NodeId>,
    /// Arrow functions and the function type their context expects.
    contextual: FxHashMap<NodeId, TypeId>,
    diagnostics: FxHashMap<FileId, Vec<Diagnostic>>,
    member_references: FxHashMap<SymbolId, Vec<NodeId>>,
    depth: u32,
}

impl<'a> CheckerState<'a> {
    fn new(context: CheckerContext<'a>, types: &'a mut TypeTable) -> Self {
        CheckerState {
            arena: context.arena,
            binder: context.binder,
            file_names: context.file_names,
            overrides: context.overrides,
            types,
            node_types: FxHashMap::default(),
            declared_returns: FxHashMap::default(),
            function_types: FxHashMap::default(),
            checked_functions: FxHashSet::default(),
            in_progress: FxHashSet::default(),
            contextual: FxHashMap::default(),
            diagnostics: FxHashMap::default(),
            member_references: FxHashMap::default(),
            depth: 0,
        }
    }

    fn reset(&mut self) {
        self.node_types.clear();
        self.declared_returns.clear();
        self.function_types.clear();
        self.checked_functions.clear();
        self.in_progress.clear();
        self.contextual.clear();
        self.diagnostics.clear();
        self.member_references.clear();
    }

    fn into_result(self) -> CheckResult {
        let mut diagnostics = self.diagnostics;
        for file_diagnostics in diagnostics.values_mut() {
            file_diagnostics.sort_by_key(|d| (d.start, d.code));
        }
        tracing::debug!(
            node_types = self.node_types.len(),
            files_with_errors = diagnostics.len(),
            "check finished"
        );
        CheckResult {
            node_types: self.node_types,
            declared_returns: self.declared_returns,
            diagnostics,
            member_references: self.member_references,
        }
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    fn error(&mut self, node: NodeId, code: u32, template: &str, args: &[&str]) {
        let Some(n) = self.arena.get(node) else {
            return;
        };
        let file_name = self
            .file_names
            .get(n.file.0 as usize)
            .cloned()
            .unwrap_or_default();
        let diagnostic = Diagnostic::error(
            file_name,
            n.span.start,
            n.span.len(),
            format_message(template, args),
            code,
        );
        self.diagnostics.entry(n.file).or_default().push(diagnostic);
    }

    fn type_text(&self, ty: TypeId) -> String {
        self.types.type_text(ty)
    }

    fn is_assignable(&self, source: TypeId, target: TypeId) -> bool {
        AssignabilityChecker::new(&*self.types).is_assignable(source, target)
    }

    fn check_assignable(&mut self, source: TypeId, target: TypeId, report_at: NodeId, code: u32) {
        if self.is_assignable(source, target) {
            return;
        }
        let source_text = self.type_text(source);
        let target_text = self.type_text(target);
        let template = if code == diagnostic_codes::ARGUMENT_NOT_ASSIGNABLE {
            diagnostic_messages::ARGUMENT_NOT_ASSIGNABLE
        } else {
            diagnostic_messages::TYPE_NOT_ASSIGNABLE
        };
        self.error(report_at, code, template, &[&source_text, &target_text]);
    }

    // =========================================================================
    // Annotations and named types
    // =========================================================================

    /// The annotation in effect for a declaration, overrides included.
    fn annotation_of(&self, node: NodeId) -> Option<&'a TypeNode> {
        let overrides = self.overrides;
        match overrides.get(&node) {
            Some(AnnotationOverride::Set { ty, .. }) => return Some(ty),
            Some(AnnotationOverride::Removed) => return None,
            None => {}
        }
        let arena = self.arena;
        match arena.kind(node)? {
            NodeKind::Parameter(decl) | NodeKind::Variable(decl) => {
                decl.annotation.as_ref().map(|a| &a.ty)
            }
            NodeKind::Property { annotation, .. } => annotation.as_ref().map(|a| &a.ty),
            _ => None,
        }
    }

    fn type_from_node(&mut self, node: &TypeNode) -> TypeId {
        match node {
            TypeNode::Keyword(kind) => TypeTable::intrinsic(*kind),
            TypeNode::Literal(LiteralValue::Number(value)) => self.types.number_literal(*value),
            TypeNode::Literal(LiteralValue::String(value)) => self.types.string_literal(value),
            TypeNode::Literal(LiteralValue::Boolean(value)) => TypeTable::boolean_literal(*value),
            TypeNode::Reference(name) => {
                if self.binder.type_declaration(name).is_some() {
                    self.types.named(name)
                } else {
                    ANY
                }
            }
            TypeNode::Import { module, name } => self.types.intern(TypeData::DeferredImport {
                module: module.clone(),
                name: name.clone(),
            }),
            TypeNode::Array { element, readonly } => {
                let element = self.type_from_node(element);
                self.types.array(element, *readonly)
            }
            TypeNode::Tuple { elements, readonly } => {
                let elements = elements.iter().map(|e| self.type_from_node(e)).collect();
                self.types.intern(TypeData::Tuple {
                    elements,
                    readonly: *readonly,
                })
            }
            TypeNode::Object(members) => self.object_type_from_members(members),
            TypeNode::Function {
                params,
                return_type,
            } => {
                let params = params
                    .iter()
                    .map(|param| ParamInfo {
                        name: param.name.clone(),
                        type_id: self.type_from_node(&param.ty),
                        optional: param.optional,
                    })
                    .collect();
                let return_type = self.type_from_node(return_type);
                self.types.function(params, return_type)
            }
            TypeNode::Union(members) => {
                let members: Vec<TypeId> = members.iter().map(|m| self.type_from_node(m)).collect();
                self.types.union(members)
            }
            TypeNode::Intersection(members) => {
                let members: Vec<TypeId> = members.iter().map(|m| self.type_from_node(m)).collect();
                self.types.intersection(members)
            }
        }
    }

    fn object_type_from_members(&mut self, members: &[TypeMember]) -> TypeId {
        let properties = members
            .iter()
            .map(|member| PropertyInfo {
                name: member.name.clone(),
                type_id: self.type_from_node(&member.ty),
                optional: member.optional,
            })
            .collect();
        self.types.object(properties)
    }

    /// Report names in `ty` that do not resolve to a type declaration.
    fn check_type_node(&mut self, node: NodeId, ty: &TypeNode) {
        let mut names = Vec::new();
        ty.references(&mut names);
        for name in names {
            if self.binder.type_declaration(&name).is_none() {
                self.error(
                    node,
                    diagnostic_codes::CANNOT_FIND_NAME,
                    diagnostic_messages::CANNOT_FIND_NAME,
                    &[&name],
                );
            }
        }
    }

    fn define_named_types(&mut self) {
        self.types.clear_named();
        let binder = self.binder;
        let arena = self.arena;
        let mut declarations: Vec<(&str, NodeId)> = binder.type_declarations().collect();
        declarations.sort_by_key(|&(_, node)| node);

        let mut classes = Vec::new();
        for (name, node) in declarations {
            match arena.kind(node) {
                Some(NodeKind::TypeAlias { ty, .. }) => {
                    let target = self.type_from_node(ty);
                    self.types.define_named(name, target);
                }
                Some(NodeKind::Interface { members, .. }) => {
                    let target = self.object_type_from_members(members);
                    self.types.define_named(name, target);
                }
                Some(NodeKind::Class { .. }) => classes.push((name, node)),
                _ => {}
            }
        }

        // Method bodies may read `this`, so every class gets a provisional
        // instance type before any return type is inferred.
        for &(name, node) in &classes {
            let instance = self.class_instance_type(node, false);
            self.types.define_named(name, instance);
        }
        for &(name, node) in &classes {
            let instance = self.class_instance_type(node, true);
            self.types.define_named(name, instance);
        }
    }

    fn class_instance_type(&mut self, class: NodeId, infer_returns: bool) -> TypeId {
        let arena = self.arena;
        let Some(NodeKind::Class { members, .. }) = arena.kind(class) else {
            return UNKNOWN;
        };
        let mut properties = Vec::new();
        for &member in members {
            match arena.kind(member) {
                Some(NodeKind::Property { name, .. }) => {
                    let type_id = self.binding_type(member);
                    properties.push(PropertyInfo {
                        name: name.clone(),
                        type_id,
                        optional: false,
                    });
                }
                Some(NodeKind::Function(function)) if function.kind == FunctionKind::Method => {
                    let type_id = if infer_returns {
                        self.function_type(member)
                    } else {
                        self.declared_signature(function)
                    };
                    properties.push(PropertyInfo {
                        name: function.name.clone().unwrap_or_default(),
                        type_id,
                        optional: false,
                    });
                }
                _ => {}
            }
        }
        self.types.object(properties)
    }

    fn constructor_type(&mut self, class: NodeId) -> TypeId {
        let arena = self.arena;
        let Some(NodeKind::Class { name, members }) = arena.kind(class) else {
            return ANY;
        };
        let constructor = members.iter().find_map(|&member| match arena.kind(member) {
            Some(NodeKind::Function(function)) if function.kind == FunctionKind::Constructor => {
                Some(function)
            }
            _ => None,
        });
        let params = match constructor {
            Some(function) => self.param_infos(&function.params),
            None => Vec::new(),
        };
        self.types.intern(TypeData::Constructor {
            class: name.clone(),
            params,
        })
    }

    fn this_type(&mut self, node: NodeId) -> TypeId {
        let arena = self.arena;
        let mut current = arena.enclosing_function(node);
        while let Some(function) = current {
            match arena.kind(function) {
                Some(NodeKind::Function(data)) if data.kind == FunctionKind::Arrow => {
                    current = arena.enclosing_function(function);
                }
                Some(NodeKind::Function(_)) => {
                    return match arena.parent(function).and_then(|p| arena.kind(p)) {
                        Some(NodeKind::Class { name, .. }) => self.types.named(name),
                        _ => ANY,
                    };
                }
                _ => return ANY,
            }
        }
        ANY
    }

    // =========================================================================
    // Bindings and functions
    // =========================================================================

    pub(crate) fn binding_type(&mut self, node: NodeId) -> TypeId {
        if let Some(&ty) = self.node_types.get(&node) {
            return ty;
        }
        if !self.in_progress.insert(node) {
            return ANY;
        }
        let ty = self.compute_binding_type(node);
        self.in_progress.remove(&node);
        self.node_types.insert(node, ty);
        ty
    }

    fn compute_binding_type(&mut self, node: NodeId) -> TypeId {
        if let Some(annotation) = self.annotation_of(node) {
            return self.type_from_node(annotation);
        }
        let arena = self.arena;
        match arena.kind(node) {
            Some(NodeKind::Parameter(decl)) => {
                if let Some(contextual) = self.contextual_parameter_type(node) {
                    return contextual;
                }
                match decl.initializer {
                    Some(initializer) => {
                        let ty = self.check_expr(initializer);
                        self.types.widen(ty)
                    }
                    None => ANY,
                }
            }
            Some(NodeKind::Variable(decl)) => match decl.initializer {
                Some(initializer) => {
                    let ty = self.check_expr(initializer);
                    if decl.flags.contains(ModifierFlags::CONST) {
                        ty
                    } else {
                        self.types.widen(ty)
                    }
                }
                None => ANY,
            },
            Some(NodeKind::Property { initializer, .. }) => match initializer {
                Some(initializer) => {
                    let ty = self.check_expr(*initializer);
                    self.types.widen(ty)
                }
                None => ANY,
            },
            Some(NodeKind::BindingElement {
                property,
                initializer,
                ..
            }) => {
                let Some(parent) = arena.parent(node) else {
                    return ANY;
                };
                let parent_type = self.binding_type(parent);
                if parent_type == ANY {
                    return ANY;
                }
                let from_parent = if is_array_pattern(arena, parent) {
                    property
                        .parse::<usize>()
                        .ok()
                        .and_then(|index| self.element_type_at(parent_type, index))
                } else {
                    self.property_type(parent_type, property)
                };
                match (from_parent, initializer) {
                    (Some(ty), _) => ty,
                    (None, Some(initializer)) => {
                        let ty = self.check_expr(*initializer);
                        self.types.widen(ty)
                    }
                    (None, None) => ANY,
                }
            }
            _ => ANY,
        }
    }

    fn contextual_parameter_type(&mut self, param: NodeId) -> Option<TypeId> {
        let arena = self.arena;
        let function = arena.parent(param)?;
        let contextual = *self.contextual.get(&function)?;
        let Some(NodeKind::Function(data)) = arena.kind(function) else {
            return None;
        };
        let index = data.params.iter().position(|&p| p == param)?;
        let shape = self.types.function_shape(contextual)?;
        shape.params.get(index).map(|p| p.type_id)
    }

    fn set_contextual(&mut self, expression: NodeId, expected: TypeId) {
        let arena = self.arena;
        let mut node = expression;
        while let Some(NodeKind::Paren { expression }) = arena.kind(node) {
            node = *expression;
        }
        if let Some(NodeKind::Function(function)) = arena.kind(node)
            && function.kind == FunctionKind::Arrow
            && self.types.function_shape(expected).is_some()
        {
            self.contextual.insert(node, expected);
        }
    }

    fn param_infos(&mut self, params: &[NodeId]) -> Vec<ParamInfo> {
        let arena = self.arena;
        params
            .iter()
            .enumerate()
            .map(|(index, &param)| {
                let (name, optional) = match arena.binding_decl(param) {
                    Some(decl) => (
                        decl.name
                            .identifier()
                            .map_or_else(|| format!("__{index}"), str::to_string),
                        decl.flags.contains(ModifierFlags::OPTIONAL) || decl.initializer.is_some(),
                    ),
                    None => (format!("__{index}"), false),
                };
                ParamInfo {
                    name,
                    type_id: self.binding_type(param),
                    optional,
                }
            })
            .collect()
    }

    /// Parameters plus the declared return type, `any` when there is none.
    fn declared_signature(&mut self, function: &FunctionData) -> TypeId {
        let params = self.param_infos(&function.params);
        let return_type = match &function.return_type {
            Some(annotation) => self.type_from_node(&annotation.ty),
            None => ANY,
        };
        self.types.function(params, return_type)
    }

    pub(crate) fn function_type(&mut self, node: NodeId) -> TypeId {
        if let Some(&ty) = self.function_types.get(&node) {
            return ty;
        }
        let arena = self.arena;
        let Some(NodeKind::Function(function)) = arena.kind(node) else {
            return ANY;
        };
        let params = self.param_infos(&function.params);
        let return_type = if let Some(annotation) = &function.return_type {
            let declared = self.type_from_node(&annotation.ty);
            self.declared_returns.insert(node, declared);
            declared
        } else if function.kind == FunctionKind::Constructor {
            VOID
        } else if function.body.is_none() {
            ANY
        } else if !self.in_progress.insert(node) {
            // Recursive reference while the return type is being inferred.
            return self.types.function(params, ANY);
        } else {
            let inferred = self.infer_return_type(function);
            self.in_progress.remove(&node);
            inferred
        };
        let ty = self.types.function(params, return_type);
        self.function_types.insert(node, ty);
        self.node_types.insert(node, ty);
        ty
    }

    fn infer_return_type(&mut self, function: &FunctionData) -> TypeId {
        match function.body {
            Some(FunctionBody::Expression(body)) => {
                let ty = self.check_expr(body);
                self.types.widen(ty)
            }
            Some(FunctionBody::Block(body)) => {
                let returns = collect_returns(self.arena, body);
                if returns.is_empty() {
                    return VOID;
                }
                let mut types = Vec::with_capacity(returns.len());
                for expression in returns {
                    let ty = match expression {
                        Some(expression) => {
                            let ty = self.check_expr(expression);
                            self.types.widen(ty)
                        }
                        None => VOID,
                    };
                    types.push(ty);
                }
                self.types.union(types)
            }
            None => ANY,
        }
    }

    fn check_function(&mut self, node: NodeId) {
        if !self.checked_functions.insert(node) {
            return;
        }
        let arena = self.arena;
        let Some(NodeKind::Function(function)) = arena.kind(node) else {
            return;
        };
        self.function_type(node);

        for &param in &function.params {
            self.check_binding_declaration(param);
        }
        if let Some(annotation) = &function.return_type {
            self.check_type_node(node, &annotation.ty);
        }

        match function.body {
            Some(FunctionBody::Block(body)) => {
                if let Some(NodeKind::Block { statements }) = arena.kind(body) {
                    self.check_statements(statements);
                }
            }
            Some(FunctionBody::Expression(body)) => {
                let ty = self.check_expr(body);
                if let Some(&declared) = self.declared_returns.get(&node) {
                    self.check_assignable(ty, declared, body, diagnostic_codes::TYPE_NOT_ASSIGNABLE);
                }
            }
            None => {}
        }
    }

    /// Annotation names, initializer assignability and pattern elements of
    /// a parameter or variable.
    fn check_binding_declaration(&mut self, node: NodeId) {
        let arena = self.arena;
        let Some(decl) = arena.binding_decl(node) else {
            return;
        };
        let annotation = self.annotation_of(node);
        if let Some(annotation) = annotation {
            self.check_type_node(node, annotation);
        }
        let declared = self.binding_type(node);
        if let Some(initializer) = decl.initializer {
            if annotation.is_some() {
                self.set_contextual(initializer, declared);
                let ty = self.check_expr(initializer);
                self.check_assignable(ty, declared, initializer, diagnostic_codes::TYPE_NOT_ASSIGNABLE);
            } else {
                self.check_expr(initializer);
            }
        }
        self.check_pattern_elements(&decl.name);
    }

    fn check_pattern_elements(&mut self, name: &BindingName) {
        let arena = self.arena;
        for element in name.elements() {
            self.binding_type(element);
            if let Some(NodeKind::BindingElement {
                name, initializer, ..
            }) = arena.kind(element)
            {
                if let Some(initializer) = initializer {
                    self.check_expr(*initializer);
                }
                self.check_pattern_elements(name);
            }
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn check_statements(&mut self, statements: &[NodeId]) {
        for &statement in statements {
            self.check_statement(statement);
        }
    }

    fn check_statement(&mut self, node: NodeId) {
        let arena = self.arena;
        let Some(kind) = arena.kind(node) else {
            return;
        };
        match kind {
            NodeKind::VariableStatement { declarations } => {
                for &declaration in declarations {
                    self.check_binding_declaration(declaration);
                }
            }
            NodeKind::Function(_) => self.check_function(node),
            NodeKind::Class { members, .. } => self.check_class(members),
            NodeKind::TypeAlias { ty, .. } => self.check_type_node(node, ty),
            NodeKind::Interface { members, .. } => {
                for member in members {
                    self.check_type_node(node, &member.ty);
                }
            }
            NodeKind::Return { expression } => self.check_return(node, *expression),
            NodeKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.check_expr(*condition);
                self.check_statement(*then_branch);
                if let Some(else_branch) = else_branch {
                    self.check_statement(*else_branch);
                }
            }
            NodeKind::Block { statements } => self.check_statements(statements),
            NodeKind::ExpressionStatement { expression } => {
                self.check_expr(*expression);
            }
            _ => {}
        }
    }

    fn check_class(&mut self, members: &[NodeId]) {
        let arena = self.arena;
        for &member in members {
            match arena.kind(member) {
                Some(NodeKind::Property {
                    annotation,
                    initializer,
                    ..
                }) => {
                    if let Some(annotation) = annotation {
                        self.check_type_node(member, &annotation.ty);
                    }
                    let declared = self.binding_type(member);
                    if let Some(initializer) = initializer {
                        let ty = self.check_expr(*initializer);
                        if annotation.is_some() {
                            self.check_assignable(
                                ty,
                                declared,
                                *initializer,
                                diagnostic_codes::TYPE_NOT_ASSIGNABLE,
                            );
                        }
                    }
                }
                Some(NodeKind::Function(_)) => self.check_function(member),
                _ => {}
            }
        }
    }

    fn check_return(&mut self, node: NodeId, expression: Option<NodeId>) {
        let Some(expression) = expression else {
            return;
        };
        let ty = self.check_expr(expression);
        let declared = self
            .arena
            .enclosing_function(node)
            .and_then(|function| self.declared_returns.get(&function).copied());
        if let Some(declared) = declared {
            self.check_assignable(ty, declared, expression, diagnostic_codes::TYPE_NOT_ASSIGNABLE);
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    pub(crate) fn check_expr(&mut self, node: NodeId) -> TypeId {
        if let Some(&ty) = self.node_types.get(&node) {
            return ty;
        }
        if self.depth >= MAX_EXPR_CHECK_DEPTH {
            tracing::debug!(node = node.0, "expression check depth exceeded");
            return ANY;
        }
        self.depth += 1;
        let ty = self.compute_expr_type(node);
        self.depth -= 1;
        self.node_types.insert(node, ty);
        ty
    }

    fn compute_expr_type(&mut self, node: NodeId) -> TypeId {
        let arena = self.arena;
        let Some(kind) = arena.kind(node) else {
            return ANY;
        };
        match kind {
            NodeKind::Identifier { name } => match self.binder.resolved_symbol(node) {
                Some(symbol) => self.symbol_type(symbol),
                None => {
                    self.error(
                        node,
                        diagnostic_codes::CANNOT_FIND_NAME,
                        diagnostic_messages::CANNOT_FIND_NAME,
                        &[name],
                    );
                    ANY
                }
            },
            NodeKind::NumericLiteral { value } => self.types.number_literal(*value),
            NodeKind::StringLiteral { value } => self.types.string_literal(value),
            NodeKind::BooleanLiteral { value } => TypeTable::boolean_literal(*value),
            NodeKind::NullLiteral => NULL,
            NodeKind::Undefined => UNDEFINED,
            NodeKind::This => self.this_type(node),
            NodeKind::Template { spans, .. } => {
                for &span in spans {
                    self.check_expr(span);
                }
                STRING
            }
            NodeKind::ObjectLiteral { properties } => {
                let mut infos: Vec<PropertyInfo> = Vec::with_capacity(properties.len());
                for (name, value) in properties {
                    let ty = self.check_expr(*value);
                    let type_id = self.types.widen(ty);
                    infos.retain(|info| &info.name != name);
                    infos.push(PropertyInfo {
                        name: name.clone(),
                        type_id,
                        optional: false,
                    });
                }
                self.types.object(infos)
            }
            NodeKind::ArrayLiteral { elements } => {
                let mut element_types = Vec::with_capacity(elements.len());
                for &element in elements {
                    let ty = self.check_expr(element);
                    element_types.push(self.types.widen(ty));
                }
                let element = self.types.union(element_types);
                self.types.array(element, false)
            }
            NodeKind::Call { callee, arguments } => self.check_call(node, *callee, arguments, false),
            NodeKind::New { callee, arguments } => self.check_call(node, *callee, arguments, true),
            NodeKind::PropertyAccess { object, name } => {
                self.check_property_access(node, *object, name)
            }
            NodeKind::Binary {
                operator,
                left,
                right,
            } => self.check_binary(node, *operator, *left, *right),
            NodeKind::Unary { operator, operand } => {
                self.check_expr(*operand);
                match operator {
                    UnaryOperator::Not => BOOLEAN,
                    UnaryOperator::Minus | UnaryOperator::Plus => {
                        self.numeric_unary(*operator, *operand)
                    }
                    UnaryOperator::Typeof => STRING,
                }
            }
            NodeKind::Assignment { target, value } => self.check_assignment(*target, *value),
            NodeKind::Paren { expression } => self.check_expr(*expression),
            NodeKind::Function(_) => {
                let ty = self.function_type(node);
                self.check_function(node);
                ty
            }
            _ => ANY,
        }
    }

    /// `-1` and `+1` keep their literal type; any other operand gives `number`.
    fn numeric_unary(&mut self, operator: UnaryOperator, operand: NodeId) -> TypeId {
        let Some(&NodeKind::NumericLiteral { value }) = self.arena.kind(operand) else {
            return NUMBER;
        };
        let value = match operator {
            // -0 is displayed and compared as 0
            UnaryOperator::Minus if value != 0.0 => -value,
            _ => value,
        };
        self.types.number_literal(value)
    }

    fn symbol_type(&mut self, symbol: SymbolId) -> TypeId {
        let binder = self.binder;
        let Some(symbol) = binder.symbol(symbol) else {
            return ANY;
        };
        match symbol.kind {
            SymbolKind::Variable | SymbolKind::Parameter | SymbolKind::Element => {
                self.binding_type(symbol.declaration)
            }
            SymbolKind::Function | SymbolKind::Method => self.function_type(symbol.declaration),
            SymbolKind::Class => self.constructor_type(symbol.declaration),
        }
    }

    fn check_call(
        &mut self,
        node: NodeId,
        callee: NodeId,
        arguments: &[NodeId],
        is_new: bool,
    ) -> TypeId {
        let callee_type = self.check_expr(callee);
        let resolved = self.types.resolve(callee_type);
        if resolved == ANY {
            self.check_untyped_arguments(arguments);
            return ANY;
        }

        match self.types.lookup(resolved).cloned() {
            Some(TypeData::Constructor { class, params }) if is_new => {
                self.check_arguments(node, &params, arguments);
                self.types.named(&class)
            }
            Some(TypeData::Function(shape)) if !is_new => {
                self.check_arguments(node, &shape.params, arguments);
                self.array_callback_result(callee, arguments)
                    .unwrap_or(shape.return_type)
            }
            _ => {
                if is_new {
                    self.error(
                        callee,
                        diagnostic_codes::NOT_CONSTRUCTABLE,
                        diagnostic_messages::NOT_CONSTRUCTABLE,
                        &[],
                    );
                } else {
                    self.error(
                        callee,
                        diagnostic_codes::NOT_CALLABLE,
                        diagnostic_messages::NOT_CALLABLE,
                        &[],
                    );
                }
                self.check_untyped_arguments(arguments);
                ANY
            }
        }
    }

    fn check_untyped_arguments(&mut self, arguments: &[NodeId]) {
        for &argument in arguments {
            self.check_expr(argument);
        }
    }

    fn check_arguments(&mut self, call: NodeId, params: &[ParamInfo], arguments: &[NodeId]) {
        let required = params.iter().filter(|p| !p.optional).count();
        if arguments.len() < required || arguments.len() > params.len() {
            let expected = if required == params.len() {
                required.to_string()
            } else {
                format!("{required}-{}", params.len())
            };
            self.error(
                call,
                diagnostic_codes::EXPECTED_ARGUMENTS,
                diagnostic_messages::EXPECTED_ARGUMENTS,
                &[&expected, &arguments.len().to_string()],
            );
        }
        for (index, &argument) in arguments.iter().enumerate() {
            match params.get(index) {
                Some(param) => {
                    self.set_contextual(argument, param.type_id);
                    let ty = self.check_expr(argument);
                    self.check_assignable(
                        ty,
                        param.type_id,
                        argument,
                        diagnostic_codes::ARGUMENT_NOT_ASSIGNABLE,
                    );
                }
                None => {
                    self.check_expr(argument);
                }
            }
        }
    }

    /// `items.map(cb)` produces an array of the callback's return type.
    fn array_callback_result(&mut self, callee: NodeId, arguments: &[NodeId]) -> Option<TypeId> {
        let arena = self.arena;
        let Some(NodeKind::PropertyAccess { object, name }) = arena.kind(callee) else {
            return None;
        };
        if name != "map" {
            return None;
        }
        let object_type = *self.node_types.get(object)?;
        if !matches!(
            self.types.resolved_data(object_type),
            Some(TypeData::Array { .. } | TypeData::Tuple { .. })
        ) {
            return None;
        }
        let callback = *self.node_types.get(arguments.first()?)?;
        let return_type = self.types.function_shape(callback)?.return_type;
        let element = self.types.widen(return_type);
        Some(self.types.array(element, false))
    }

    fn check_property_access(&mut self, node: NodeId, object: NodeId, name: &str) -> TypeId {
        let object_type = self.check_expr(object);
        self.record_member_reference(object_type, name, node);
        match self.property_type(object_type, name) {
            Some(ty) => ty,
            None => {
                let type_text = self.type_text(object_type);
                self.error(
                    node,
                    diagnostic_codes::PROPERTY_DOES_NOT_EXIST,
                    diagnostic_messages::PROPERTY_DOES_NOT_EXIST,
                    &[name, &type_text],
                );
                ANY
            }
        }
    }

    fn record_member_reference(&mut self, object_type: TypeId, name: &str, node: NodeId) {
        let Some(class) = self.types.name_of(object_type) else {
            return;
        };
        if let Some(method) = self.binder.class_member(class, name) {
            self.member_references.entry(method).or_default().push(node);
        }
    }

    /// Type of property `name` on `ty`, apparent members included, without
    /// reporting anything.
    fn property_type(&mut self, ty: TypeId, name: &str) -> Option<TypeId> {
        let resolved = self.types.resolve(ty);
        if resolved == ANY {
            return Some(ANY);
        }
        match self.types.lookup(resolved).cloned()? {
            TypeData::Object { properties } => properties
                .iter()
                .find(|property| property.name == name)
                .map(|property| property.type_id),
            TypeData::Union(members) => {
                let mut found = Vec::with_capacity(members.len());
                for member in members {
                    found.push(self.property_type(member, name)?);
                }
                Some(self.types.union(found))
            }
            TypeData::Intersection(members) => {
                for member in members {
                    if let Some(found) = self.property_type(member, name) {
                        return Some(found);
                    }
                }
                None
            }
            TypeData::Array { element, .. } => self.array_member(element, name),
            TypeData::Tuple { elements, .. } => {
                if let Ok(index) = name.parse::<usize>() {
                    return elements.get(index).copied();
                }
                let element = self.types.union(elements);
                self.array_member(element, name)
            }
            TypeData::Intrinsic(_)
            | TypeData::NumberLiteral(_)
            | TypeData::StringLiteral(_)
            | TypeData::BooleanLiteral(_) => {
                let base = self.types.literal_base(resolved).unwrap_or(resolved);
                self.primitive_member(base, name)
            }
            _ => None,
        }
    }

    fn element_type_at(&mut self, ty: TypeId, index: usize) -> Option<TypeId> {
        match self.types.resolved_data(ty)? {
            TypeData::Tuple { elements, .. } => elements.get(index).copied(),
            TypeData::Array { element, .. } => Some(*element),
            _ => None,
        }
    }

    fn method(&mut self, params: &[(&str, TypeId, bool)], return_type: TypeId) -> TypeId {
        let params = params
            .iter()
            .map(|&(name, type_id, optional)| ParamInfo {
                name: name.to_string(),
                type_id,
                optional,
            })
            .collect();
        self.types.function(params, return_type)
    }

    fn primitive_member(&mut self, base: TypeId, name: &str) -> Option<TypeId> {
        let ty = match (base, name) {
            (STRING, "length") => NUMBER,
            (STRING, "toUpperCase" | "toLowerCase" | "trim") => self.method(&[], STRING),
            (STRING, "includes" | "startsWith" | "endsWith") => {
                self.method(&[("searchString", STRING, false)], BOOLEAN)
            }
            (STRING, "indexOf") => self.method(&[("searchString", STRING, false)], NUMBER),
            (STRING, "split") => {
                let strings = self.types.array(STRING, false);
                self.method(&[("separator", STRING, false)], strings)
            }
            (STRING, "slice") => {
                self.method(&[("start", NUMBER, true), ("end", NUMBER, true)], STRING)
            }
            (STRING, "charAt") => self.method(&[("pos", NUMBER, false)], STRING),
            (NUMBER, "toFixed") => self.method(&[("fractionDigits", NUMBER, true)], STRING),
            (NUMBER | BOOLEAN | STRING, "toString") => self.method(&[], STRING),
            _ => return None,
        };
        Some(ty)
    }

    fn array_member(&mut self, element: TypeId, name: &str) -> Option<TypeId> {
        let ty = match name {
            "length" => NUMBER,
            "push" => self.method(&[("item", element, false)], NUMBER),
            "pop" => self.method(&[], element),
            "includes" => self.method(&[("searchElement", element, false)], BOOLEAN),
            "indexOf" => self.method(&[("searchElement", element, false)], NUMBER),
            "join" => self.method(&[("separator", STRING, true)], STRING),
            "slice" => {
                let array = self.types.array(element, false);
                self.method(&[("start", NUMBER, true), ("end", NUMBER, true)], array)
            }
            "forEach" | "map" | "filter" => {
                let callback_return = if name == "forEach" { VOID } else { UNKNOWN };
                let callback = self.method(
                    &[("value", element, false), ("index", NUMBER, true)],
                    callback_return,
                );
                let return_type = match name {
                    "forEach" => VOID,
                    "filter" => self.types.array(element, false),
                    _ => self.types.array(UNKNOWN, false),
                };
                self.method(&[("callbackfn", callback, false)], return_type)
            }
            _ => return None,
        };
        Some(ty)
    }

    fn is_kind_like(&self, ty: TypeId, base: TypeId) -> bool {
        let resolved = self.types.resolve(ty);
        if resolved == base || self.types.literal_base(resolved) == Some(base) {
            return true;
        }
        match self.types.lookup(resolved) {
            Some(TypeData::Union(members)) => members.iter().all(|&m| self.is_kind_like(m, base)),
            _ => false,
        }
    }

    fn check_binary(
        &mut self,
        node: NodeId,
        operator: BinaryOperator,
        left: NodeId,
        right: NodeId,
    ) -> TypeId {
        let left_type = self.check_expr(left);
        let right_type = self.check_expr(right);
        let is_any = |ty: TypeId| ty == ANY;

        match operator {
            BinaryOperator::Plus => {
                if is_any(left_type) || is_any(right_type) {
                    return ANY;
                }
                if self.is_kind_like(left_type, NUMBER) && self.is_kind_like(right_type, NUMBER) {
                    return NUMBER;
                }
                if self.is_kind_like(left_type, STRING) || self.is_kind_like(right_type, STRING) {
                    return STRING;
                }
                let left_text = self.type_text(left_type);
                let right_text = self.type_text(right_type);
                self.error(
                    node,
                    diagnostic_codes::OPERATOR_CANNOT_BE_APPLIED,
                    diagnostic_messages::OPERATOR_CANNOT_BE_APPLIED,
                    &[operator.as_str(), &left_text, &right_text],
                );
                ANY
            }
            op if op.is_arithmetic() => {
                if !is_any(left_type) && !self.is_kind_like(left_type, NUMBER) {
                    self.error(
                        left,
                        diagnostic_codes::ARITHMETIC_LEFT_OPERAND,
                        diagnostic_messages::ARITHMETIC_LEFT_OPERAND,
                        &[],
                    );
                }
                if !is_any(right_type) && !self.is_kind_like(right_type, NUMBER) {
                    self.error(
                        right,
                        diagnostic_codes::ARITHMETIC_RIGHT_OPERAND,
                        diagnostic_messages::ARITHMETIC_RIGHT_OPERAND,
                        &[],
                    );
                }
                NUMBER
            }
            BinaryOperator::LogicalAnd => {
                if self.is_kind_like(left_type, BOOLEAN) && self.is_kind_like(right_type, BOOLEAN)
                {
                    BOOLEAN
                } else {
                    right_type
                }
            }
            BinaryOperator::LogicalOr => self.types.union([left_type, right_type]),
            _ => BOOLEAN,
        }
    }

    fn check_assignment(&mut self, target: NodeId, value: NodeId) -> TypeId {
        let arena = self.arena;
        if let Some(NodeKind::Identifier { name }) = arena.kind(target)
            && let Some(symbol) = self.binder.resolved_symbol(target)
            && self.is_const(symbol)
        {
            self.error(
                target,
                diagnostic_codes::CANNOT_ASSIGN_TO_CONSTANT,
                diagnostic_messages::CANNOT_ASSIGN_TO_CONSTANT,
                &[name],
            );
            return self.check_expr(value);
        }
        let target_type = self.check_expr(target);
        self.set_contextual(value, target_type);
        let value_type = self.check_expr(value);
        self.check_assignable(value_type, target_type, target, diagnostic_codes::TYPE_NOT_ASSIGNABLE);
        value_type
    }

    fn is_const(&self, symbol: SymbolId) -> bool {
        let Some(symbol) = self.binder.symbol(symbol) else {
            return false;
        };
        symbol.kind == SymbolKind::Variable
            && self
                .arena
                .binding_decl(symbol.declaration)
                .is_some_and(|decl| decl.flags.contains(ModifierFlags::CONST))
    }
}

fn is_array_pattern(arena: &NodeArena, pattern_owner: NodeId) -> bool {
    let name = match arena.kind(pattern_owner) {
        Some(NodeKind::Parameter(decl) | NodeKind::Variable(decl)) => &decl.name,
        Some(NodeKind::BindingElement { name, .. }) => name,
        _ => return false,
    };
    matches!(name, BindingName::Array(_))
}

/// Return statements of a function body, not descending into nested functions.
fn collect_returns(arena: &NodeArena, body: NodeId) -> Vec<Option<NodeId>> {
    let mut returns = Vec::new();
    let mut stack = vec![body];
    while let Some(node) = stack.pop() {
        match arena.kind(node) {
            Some(NodeKind::Return { expression }) => returns.push(*expression),
            Some(NodeKind::Function(_)) => {}
            Some(_) => {
                let children = arena.children(node);
                stack.extend(children.into_iter().rev());
            }
            None => {}
        }
    }
    returns
}
