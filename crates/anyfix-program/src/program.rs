//! The reference host: a set of parsed files plus pending annotation edits.
//!
//! `Program` implements [`SemanticModel`]. Every edit bumps a revision
//! counter; the next query re-checks the whole program and caches the result
//! for that revision. Source text is never rewritten in place: annotation
//! edits are kept as overrides and applied to the text by [`Program::emit`].

use crate::ast::{BindingName, FunctionBody, FunctionKind, NodeArena, NodeKind, TypeNode};
use crate::binder::BinderState;
use crate::checker::{CheckResult, CheckerContext, check_program};
use crate::error::ProgramError;
use crate::lib_prelude::{LIB_FILE_NAME, LIB_SOURCE};
use crate::parser::{parse_source_file, parse_type_text};
use crate::types::intrinsics::ANY;
use crate::types::{TypeData, TypeTable};
use anyfix_common::{Diagnostic, LineMap};
use anyfix_infer::{
    BindingKind, BindingPattern, FileId, MutationError, NodeId, PatternField, PatternTarget,
    Reference, SemanticModel, SymbolId, UsageSite,
};
use anyfix_solver::{CallSignature, LiteralValue, PrimitiveKind, SignatureParam, TypeId, TypeQuery};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use std::cell::RefCell;
use std::rc::Rc;

pub struct SourceFile {
    pub name: String,
    pub text: String,
    pub root: NodeId,
    pub is_lib: bool,
    pub line_map: LineMap,
}

/// A pending change to a declaration's annotation.
#[derive(Clone, Debug, PartialEq)]
pub enum AnnotationOverride {
    Set { text: String, ty: TypeNode },
    /// The declaration's written annotation is dropped.
    Removed,
}

pub struct Program {
    files: Vec<SourceFile>,
    file_names: Vec<String>,
    roots: Vec<NodeId>,
    arena: NodeArena,
    binder: BinderState,
    overrides: FxHashMap<NodeId, AnnotationOverride>,
    revision: u64,
    types: RefCell<TypeTable>,
    checked: RefCell<Option<(u64, Rc<CheckResult>)>>,
}

impl Program {
    /// Parse `sources` as one program, with the built-in lib declarations.
    pub fn from_sources<I, N, T>(sources: I) -> Result<Self, ProgramError>
    where
        I: IntoIterator<Item = (N, T)>,
        N: Into<String>,
        T: Into<String>,
    {
        Self::with_options(sources, true)
    }

    pub fn with_options<I, N, T>(sources: I, include_lib: bool) -> Result<Self, ProgramError>
    where
        I: IntoIterator<Item = (N, T)>,
        N: Into<String>,
        T: Into<String>,
    {
        let mut inputs: Vec<(String, String, bool)> = Vec::new();
        if include_lib {
            inputs.push((LIB_FILE_NAME.to_string(), LIB_SOURCE.to_string(), true));
        }
        for (name, text) in sources {
            inputs.push((name.into(), text.into(), false));
        }

        let mut seen = FxHashSet::default();
        let mut arena = NodeArena::new();
        let mut files = Vec::with_capacity(inputs.len());
        for (index, (name, text, is_lib)) in inputs.into_iter().enumerate() {
            if !seen.insert(name.clone()) {
                return Err(ProgramError::DuplicateFile(name));
            }
            let root = parse_source_file(&mut arena, FileId(index as u32), &text).map_err(
                |source| ProgramError::Parse {
                    file: name.clone(),
                    source,
                },
            )?;
            let line_map = LineMap::build(&text);
            files.push(SourceFile {
                name,
                text,
                root,
                is_lib,
                line_map,
            });
        }

        let roots: Vec<NodeId> = files.iter().map(|file| file.root).collect();
        let binder = BinderState::bind_program(&arena, &roots);
        tracing::debug!(files = files.len(), nodes = arena.len(), "program created");

        Ok(Program {
            file_names: files.iter().map(|file| file.name.clone()).collect(),
            files,
            roots,
            arena,
            binder,
            overrides: FxHashMap::default(),
            revision: 0,
            types: RefCell::new(TypeTable::new()),
            checked: RefCell::new(None),
        })
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn binder(&self) -> &BinderState {
        &self.binder
    }

    pub fn source_file(&self, file: FileId) -> Option<&SourceFile> {
        self.files.get(file.0 as usize)
    }

    pub fn file_by_name(&self, name: &str) -> Option<FileId> {
        self.files
            .iter()
            .position(|file| file.name == name)
            .map(|index| FileId(index as u32))
    }

    pub fn source_text(&self, file: FileId) -> &str {
        self.source_file(file).map_or("", |file| file.text.as_str())
    }

    pub fn line_map(&self, file: FileId) -> Option<&LineMap> {
        self.source_file(file).map(|file| &file.line_map)
    }

    /// Number of edits applied so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Source text of a node as originally parsed.
    pub fn node_text(&self, node: NodeId) -> &str {
        let Some(n) = self.arena.get(node) else {
            return "";
        };
        n.span.text(self.source_text(n.file))
    }

    /// First binding in `file` named `name`: a parameter, a variable or a
    /// destructured element.
    pub fn find_binding(&self, file: FileId, name: &str) -> Option<NodeId> {
        let root = self.source_file(file)?.root;
        self.arena
            .descendants(root)
            .into_iter()
            .find(|&node| match self.arena.kind(node) {
                Some(NodeKind::Parameter(decl) | NodeKind::Variable(decl)) => {
                    decl.name.identifier() == Some(name)
                }
                Some(NodeKind::BindingElement {
                    name: BindingName::Identifier(element),
                    ..
                }) => element == name,
                _ => false,
            })
    }

    /// Type of a node rendered by the host.
    pub fn type_text_of(&self, node: NodeId) -> String {
        let ty = self.type_of(node);
        self.types.borrow().type_text(ty)
    }

    /// Check the program at the current revision.
    pub fn check(&self) -> Rc<CheckResult> {
        if let Some((revision, result)) = &*self.checked.borrow()
            && *revision == self.revision
        {
            return Rc::clone(result);
        }

        let _span = tracing::debug_span!("check", revision = self.revision).entered();
        let context = CheckerContext {
            arena: &self.arena,
            binder: &self.binder,
            roots: &self.roots,
            file_names: &self.file_names,
            overrides: &self.overrides,
        };
        let result = Rc::new(check_program(context, &mut self.types.borrow_mut()));
        *self.checked.borrow_mut() = Some((self.revision, Rc::clone(&result)));
        result
    }

    /// Diagnostics of every user file.
    pub fn all_diagnostics(&self) -> Vec<Diagnostic> {
        self.files()
            .into_iter()
            .flat_map(|file| self.diagnostics(file))
            .collect()
    }

    /// Source text of `file` with every annotation edit applied.
    pub fn emit(&self, file: FileId) -> String {
        let Some(source) = self.source_file(file) else {
            return String::new();
        };
        let mut edits: Vec<(u32, u32, String)> = Vec::new();
        for (&node, edit) in &self.overrides {
            let Some(n) = self.arena.get(node) else {
                continue;
            };
            if n.file != file {
                continue;
            }
            let Some(decl) = self.arena.binding_decl(node) else {
                continue;
            };
            let written = decl.annotation.as_ref().map(|annotation| annotation.span);
            match (edit, written) {
                (AnnotationOverride::Set { text, .. }, Some(span)) => {
                    edits.push((span.start, span.end, format!(": {text}")));
                }
                (AnnotationOverride::Set { text, .. }, None) => {
                    let at = decl.annotation_insert;
                    edits.push((at, at, format!(": {text}")));
                }
                (AnnotationOverride::Removed, Some(span)) => {
                    edits.push((span.start, span.end, String::new()));
                }
                (AnnotationOverride::Removed, None) => {}
            }
        }

        edits.sort_by(|a, b| b.0.cmp(&a.0));
        let mut text = source.text.clone();
        for (start, end, replacement) in edits {
            text.replace_range(start as usize..end as usize, &replacement);
        }
        text
    }

    /// `(name, emitted text)` for every user file.
    pub fn emit_all(&self) -> Vec<(String, String)> {
        self.files()
            .into_iter()
            .map(|file| (self.file_name(file), self.emit(file)))
            .collect()
    }

    fn usage_site(&self, node: NodeId) -> UsageSite {
        let arena = &self.arena;
        let mut child = node;
        loop {
            let Some(parent) = arena.parent(child) else {
                return UsageSite::Other;
            };
            let Some(kind) = arena.kind(parent) else {
                return UsageSite::Other;
            };
            if let NodeKind::Paren { .. } = kind {
                child = parent;
                continue;
            }
            return match kind {
                NodeKind::Assignment { target, value } => {
                    if *target == child {
                        UsageSite::AssignmentTarget { value: *value }
                    } else {
                        UsageSite::AssignmentSource { target: *target }
                    }
                }
                NodeKind::Variable(decl) | NodeKind::Parameter(decl)
                    if decl.initializer == Some(child) =>
                {
                    UsageSite::Initializer {
                        declaration: parent,
                    }
                }
                NodeKind::Property {
                    initializer: Some(initializer),
                    ..
                } if *initializer == child => UsageSite::Initializer {
                    declaration: parent,
                },
                NodeKind::Call { callee, arguments } | NodeKind::New { callee, arguments } => {
                    if *callee == child {
                        UsageSite::Callee {
                            arguments: arguments.clone(),
                        }
                    } else {
                        match arguments.iter().position(|&argument| argument == child) {
                            Some(index) => UsageSite::CallArgument {
                                callee: *callee,
                                index,
                            },
                            None => UsageSite::Other,
                        }
                    }
                }
                NodeKind::Binary {
                    operator,
                    left,
                    right,
                } => UsageSite::Binary {
                    operator: *operator,
                    other: if *left == child { *right } else { *left },
                },
                NodeKind::Unary { operator, .. } => UsageSite::Unary {
                    operator: *operator,
                },
                NodeKind::Template { .. } => UsageSite::TemplateSpan,
                NodeKind::Return { .. } => match arena.enclosing_function(parent) {
                    Some(function) => UsageSite::Return { function },
                    None => UsageSite::Other,
                },
                NodeKind::Function(function)
                    if function.kind == FunctionKind::Arrow
                        && matches!(function.body, Some(FunctionBody::Expression(body)) if body == child) =>
                {
                    UsageSite::Return { function: parent }
                }
                _ => UsageSite::Other,
            };
        }
    }

    fn pattern_of(&self, name: &BindingName) -> Option<BindingPattern> {
        let target = |element: NodeId| -> Option<PatternTarget> {
            match self.arena.kind(element)? {
                NodeKind::BindingElement { name, .. } => match name {
                    BindingName::Identifier(_) => Some(PatternTarget::Binding(element)),
                    nested => self.pattern_of(nested).map(PatternTarget::Pattern),
                },
                _ => None,
            }
        };
        match name {
            BindingName::Identifier(_) => None,
            BindingName::Object(elements) => {
                let fields = elements
                    .iter()
                    .filter_map(|&element| {
                        let Some(NodeKind::BindingElement { property, .. }) =
                            self.arena.kind(element)
                        else {
                            return None;
                        };
                        Some(PatternField {
                            property: property.clone(),
                            target: target(element)?,
                        })
                    })
                    .collect();
                Some(BindingPattern::Object(fields))
            }
            BindingName::Array(elements) => Some(BindingPattern::Array(
                elements
                    .iter()
                    .map(|element| element.and_then(&target))
                    .collect(),
            )),
        }
    }

    fn written_annotation_text(&self, node: NodeId) -> Option<String> {
        let decl = self.arena.binding_decl(node)?;
        let span = decl.annotation.as_ref()?.span;
        let file = self.arena.get(node)?.file;
        let text = span.text(self.source_text(file));
        Some(text.trim_start_matches(':').trim().to_string())
    }
}

// =============================================================================
// TypeQuery
// =============================================================================

impl TypeQuery for Program {
    fn primitive_kind(&self, ty: TypeId) -> Option<PrimitiveKind> {
        match self.types.borrow().resolved_data(ty)? {
            TypeData::Intrinsic(kind) => Some(*kind),
            _ => None,
        }
    }

    fn literal_value(&self, ty: TypeId) -> Option<LiteralValue> {
        match self.types.borrow().resolved_data(ty)? {
            TypeData::NumberLiteral(bits) => Some(LiteralValue::Number(f64::from_bits(*bits))),
            TypeData::StringLiteral(value) => Some(LiteralValue::String(value.clone())),
            TypeData::BooleanLiteral(value) => Some(LiteralValue::Boolean(*value)),
            _ => None,
        }
    }

    fn tuple_elements(&self, ty: TypeId) -> Option<Vec<TypeId>> {
        match self.types.borrow().resolved_data(ty)? {
            TypeData::Tuple { elements, .. } => Some(elements.clone()),
            _ => None,
        }
    }

    fn array_element(&self, ty: TypeId) -> Option<TypeId> {
        match self.types.borrow().resolved_data(ty)? {
            TypeData::Array { element, .. } => Some(*element),
            _ => None,
        }
    }

    fn is_readonly(&self, ty: TypeId) -> bool {
        matches!(
            self.types.borrow().resolved_data(ty),
            Some(TypeData::Array { readonly: true, .. } | TypeData::Tuple { readonly: true, .. })
        )
    }

    fn call_signatures(&self, ty: TypeId) -> SmallVec<[CallSignature; 1]> {
        let types = self.types.borrow();
        let mut signatures = SmallVec::new();
        if let Some(shape) = types.function_shape(ty) {
            signatures.push(CallSignature {
                params: shape
                    .params
                    .iter()
                    .map(|param| SignatureParam {
                        name: param.name.clone(),
                        type_id: param.type_id,
                        optional: param.optional,
                    })
                    .collect(),
                return_type: shape.return_type,
            });
        }
        signatures
    }

    fn is_object(&self, ty: TypeId) -> bool {
        matches!(
            self.types.borrow().resolved_data(ty),
            Some(TypeData::Object { .. })
        )
    }

    fn properties(&self, ty: TypeId) -> Vec<(String, TypeId)> {
        match self.types.borrow().resolved_data(ty) {
            Some(TypeData::Object { properties }) => properties
                .iter()
                .map(|property| (property.name.clone(), property.type_id))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn union_members(&self, ty: TypeId) -> Option<Vec<TypeId>> {
        match self.types.borrow().resolved_data(ty)? {
            TypeData::Union(members) => Some(members.clone()),
            _ => None,
        }
    }

    fn intersection_members(&self, ty: TypeId) -> Option<Vec<TypeId>> {
        match self.types.borrow().resolved_data(ty)? {
            TypeData::Intersection(members) => Some(members.clone()),
            _ => None,
        }
    }

    fn alias_name(&self, ty: TypeId) -> Option<String> {
        self.types.borrow().name_of(ty).map(str::to_string)
    }

    fn is_deferred_import(&self, ty: TypeId) -> bool {
        matches!(
            self.types.borrow().resolved_data(ty),
            Some(TypeData::DeferredImport { .. })
        )
    }

    fn type_text(&self, ty: TypeId) -> String {
        self.types.borrow().type_text(ty)
    }

    fn intrinsic(&self, kind: PrimitiveKind) -> TypeId {
        TypeTable::intrinsic(kind)
    }
}

// =============================================================================
// SemanticModel
// =============================================================================

impl SemanticModel for Program {
    fn files(&self) -> Vec<FileId> {
        self.files
            .iter()
            .enumerate()
            .filter(|(_, file)| !file.is_lib)
            .map(|(index, _)| FileId(index as u32))
            .collect()
    }

    fn file_name(&self, file: FileId) -> String {
        self.file_names
            .get(file.0 as usize)
            .cloned()
            .unwrap_or_default()
    }

    fn bindings(&self, file: FileId) -> Vec<NodeId> {
        let Some(source) = self.source_file(file) else {
            return Vec::new();
        };
        let mut bindings: Vec<NodeId> = self
            .arena
            .descendants(source.root)
            .into_iter()
            .filter(|&node| self.arena.binding_decl(node).is_some())
            .collect();
        bindings.sort_by_key(|&node| {
            self.arena
                .binding_decl(node)
                .map_or(0, |decl| decl.name_span.start)
        });
        bindings
    }

    fn binding_name(&self, binding: NodeId) -> String {
        match self.arena.kind(binding) {
            Some(NodeKind::Parameter(decl) | NodeKind::Variable(decl)) => {
                let file = self.file_of(binding);
                decl.name_span.text(self.source_text(file)).to_string()
            }
            Some(NodeKind::BindingElement { name, property, .. }) => {
                name.identifier().unwrap_or(property).to_string()
            }
            _ => String::new(),
        }
    }

    fn binding_kind(&self, binding: NodeId) -> BindingKind {
        match self.arena.kind(binding) {
            Some(NodeKind::Parameter(_)) => {
                let callable = self.arena.parent(binding);
                let index = callable.and_then(|callable| match self.arena.kind(callable) {
                    Some(NodeKind::Function(function)) => {
                        function.params.iter().position(|&param| param == binding)
                    }
                    _ => None,
                });
                match (callable, index) {
                    (Some(callable), Some(index)) => BindingKind::Parameter { callable, index },
                    _ => BindingKind::Variable,
                }
            }
            Some(NodeKind::BindingElement { .. }) => BindingKind::Element,
            _ => BindingKind::Variable,
        }
    }

    fn binding_pattern(&self, binding: NodeId) -> Option<BindingPattern> {
        let decl = self.arena.binding_decl(binding)?;
        self.pattern_of(&decl.name)
    }

    fn file_of(&self, node: NodeId) -> FileId {
        self.arena.get(node).map_or(FileId(0), |n| n.file)
    }

    fn type_of(&self, node: NodeId) -> TypeId {
        self.check().node_types.get(&node).copied().unwrap_or(ANY)
    }

    fn has_explicit_annotation(&self, node: NodeId) -> bool {
        match self.overrides.get(&node) {
            Some(AnnotationOverride::Set { .. }) => return true,
            Some(AnnotationOverride::Removed) => return false,
            None => {}
        }
        match self.arena.kind(node) {
            Some(NodeKind::Parameter(decl) | NodeKind::Variable(decl)) => {
                decl.annotation.is_some()
            }
            Some(NodeKind::Property { annotation, .. }) => annotation.is_some(),
            _ => false,
        }
    }

    fn declared_type_text(&self, node: NodeId) -> Option<String> {
        match self.overrides.get(&node) {
            Some(AnnotationOverride::Set { text, .. }) => Some(text.clone()),
            Some(AnnotationOverride::Removed) => None,
            None => self.written_annotation_text(node),
        }
    }

    fn symbol_of(&self, node: NodeId) -> Option<SymbolId> {
        if let Some(symbol) = self.binder.declared_symbol(node) {
            return Some(symbol);
        }
        // `const f = (x) => ...`: the arrow is referenced through `f`.
        let parent = self.arena.parent(node)?;
        match self.arena.kind(parent)? {
            NodeKind::Variable(decl) if decl.initializer == Some(node) => {
                self.binder.declared_symbol(parent)
            }
            _ => None,
        }
    }

    fn references(&self, symbol: SymbolId) -> Vec<Reference> {
        let check = self.check();
        let mut nodes: Vec<NodeId> = self.binder.references(symbol).to_vec();
        if let Some(members) = check.member_references.get(&symbol) {
            nodes.extend(members.iter().copied());
        }
        nodes.sort_by_key(|&node| (self.file_of(node), self.arena.span(node).start, node));
        nodes.dedup();
        nodes
            .into_iter()
            .map(|node| Reference {
                node,
                site: self.usage_site(node),
            })
            .collect()
    }

    fn declared_parameter_types(&self, callee: NodeId) -> Option<Vec<TypeId>> {
        let callee_type = self.type_of(callee);
        let types = self.types.borrow();
        match types.resolved_data(callee_type)? {
            TypeData::Function(shape) => Some(shape.params.iter().map(|p| p.type_id).collect()),
            TypeData::Constructor { params, .. } => {
                Some(params.iter().map(|p| p.type_id).collect())
            }
            _ => None,
        }
    }

    fn declared_return_type(&self, function: NodeId) -> Option<TypeId> {
        self.check().declared_returns.get(&function).copied()
    }

    fn diagnostics(&self, file: FileId) -> Vec<Diagnostic> {
        self.check()
            .diagnostics
            .get(&file)
            .cloned()
            .unwrap_or_default()
    }

    fn set_declared_type(&mut self, node: NodeId, text: &str) -> Result<(), MutationError> {
        if self.arena.get(node).is_none() {
            return Err(MutationError::UnknownNode(node));
        }
        if self.arena.binding_decl(node).is_none() {
            return Err(MutationError::NotAnnotatable(node));
        }
        let ty = parse_type_text(text).map_err(|error| MutationError::InvalidTypeText {
            text: text.to_string(),
            message: error.message,
        })?;
        tracing::trace!(node = node.0, %text, "set declared type");
        self.overrides.insert(
            node,
            AnnotationOverride::Set {
                text: text.to_string(),
                ty,
            },
        );
        self.revision += 1;
        Ok(())
    }

    fn remove_declared_type(&mut self, node: NodeId) {
        let written = self
            .arena
            .binding_decl(node)
            .is_some_and(|decl| decl.annotation.is_some());
        if written {
            self.overrides.insert(node, AnnotationOverride::Removed);
        } else {
            self.overrides.remove(&node);
        }
        tracing::trace!(node = node.0, "removed declared type");
        self.revision += 1;
    }
}

#[cfg(test)]
#[path = "tests/program_tests.rs"]
mod tests;
