//! Recursive-descent parser for the TypeScript subset.
//!
//! `ParserState` walks the token vector produced by the scanner and allocates
//! nodes bottom-up into a shared [`NodeArena`]. Type annotations are parsed
//! into owned [`TypeNode`] trees; [`parse_type_text`] parses a standalone type,
//! which is how inferred annotations are validated before they are applied.

use crate::ast::{
    BindingDecl, BindingName, FunctionBody, FunctionData, FunctionKind, ModifierFlags, NodeArena,
    NodeKind, TypeAnnotation, TypeMember, TypeNode, TypeParam,
};
use crate::error::ParseError;
use crate::scanner::{ScannerState, SyntaxKind, TemplateToken, Token};
use anyfix_common::Span;
use anyfix_infer::{BinaryOperator, FileId, NodeId, UnaryOperator};
use anyfix_solver::{LiteralValue, PrimitiveKind};

type ParseResult<T> = Result<T, ParseError>;

/// Parse `source` into a `SourceFile` node.
pub fn parse_source_file(
    arena: &mut NodeArena,
    file: FileId,
    source: &str,
) -> ParseResult<NodeId> {
    let tokens = ScannerState::new(source).scan_all()?;
    let mut parser = ParserState::new(arena, file, source, tokens);
    let mut statements = Vec::new();
    while !parser.is_token(&SyntaxKind::EndOfFile) {
        statements.push(parser.parse_statement()?);
    }
    Ok(parser.finish_node(
        NodeKind::SourceFile { statements },
        0,
        source.len() as u32,
    ))
}

/// Parse a standalone type such as `{ "value": string } | number[]`.
pub fn parse_type_text(text: &str) -> ParseResult<TypeNode> {
    let tokens = ScannerState::new(text).scan_all()?;
    let mut arena = NodeArena::new();
    let mut parser = ParserState::new(&mut arena, FileId(0), text, tokens);
    let ty = parser.parse_type()?;
    if !parser.is_token(&SyntaxKind::EndOfFile) {
        return Err(parser.error("unexpected text after type"));
    }
    Ok(ty)
}

pub(crate) struct ParserState<'a> {
    arena: &'a mut NodeArena,
    file: FileId,
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> ParserState<'a> {
    fn new(arena: &'a mut NodeArena, file: FileId, source: &'a str, tokens: Vec<Token>) -> Self {
        ParserState {
            arena,
            file,
            source,
            tokens,
            pos: 0,
        }
    }

    // =========================================================================
    // Token helpers
    // =========================================================================

    fn lookahead(&self, offset: usize) -> &Token {
        let index = (self.pos + offset).min(self.tokens.len().saturating_sub(1));
        &self.tokens[index]
    }

    fn current(&self) -> &Token {
        self.lookahead(0)
    }

    fn token_start(&self) -> u32 {
        self.current().span.start
    }

    /// End of the most recently consumed token.
    fn previous_end(&self) -> u32 {
        self.pos
            .checked_sub(1)
            .and_then(|index| self.tokens.get(index))
            .map_or(0, |token| token.span.end)
    }

    fn is_token(&self, kind: &SyntaxKind) -> bool {
        &self.current().kind == kind
    }

    fn is_token_at(&self, offset: usize, kind: &SyntaxKind) -> bool {
        &self.lookahead(offset).kind == kind
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        self.is_keyword_at(0, keyword)
    }

    fn is_keyword_at(&self, offset: usize, keyword: &str) -> bool {
        matches!(&self.lookahead(offset).kind, SyntaxKind::Identifier(name) if name == keyword)
    }

    fn next_token(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn parse_optional(&mut self, kind: &SyntaxKind) -> bool {
        if self.is_token(kind) {
            self.next_token();
            true
        } else {
            false
        }
    }

    fn parse_expected(&mut self, kind: &SyntaxKind, what: &str) -> ParseResult<Token> {
        if self.is_token(kind) {
            Ok(self.next_token())
        } else {
            Err(self.error(format!("'{what}' expected")))
        }
    }

    fn parse_keyword(&mut self, keyword: &str) -> bool {
        if self.is_keyword(keyword) {
            self.next_token();
            true
        } else {
            false
        }
    }

    fn parse_identifier(&mut self) -> ParseResult<String> {
        match &self.current().kind {
            SyntaxKind::Identifier(name) => {
                let name = name.clone();
                self.next_token();
                Ok(name)
            }
            _ => Err(self.error("identifier expected")),
        }
    }

    /// Identifier, string or number used as a property name.
    fn parse_property_name(&mut self) -> ParseResult<String> {
        let name = match &self.current().kind {
            SyntaxKind::Identifier(name) | SyntaxKind::StringLiteral(name) => name.clone(),
            SyntaxKind::NumericLiteral(value) => anyfix_common::js_number_to_string(*value),
            _ => return Err(self.error("property name expected")),
        };
        self.next_token();
        Ok(name)
    }

    fn parse_semicolon(&mut self) {
        self.parse_optional(&SyntaxKind::Semicolon);
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(self.token_start(), message)
    }

    fn finish_node(&mut self, kind: NodeKind, start: u32, end: u32) -> NodeId {
        self.arena.alloc(kind, Span::new(start, end), self.file)
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_statement(&mut self) -> ParseResult<NodeId> {
        let start = self.token_start();
        self.parse_keyword("export");
        let mut flags = ModifierFlags::empty();
        if self.is_keyword("declare") && matches!(self.lookahead(1).kind, SyntaxKind::Identifier(_))
        {
            self.next_token();
            flags |= ModifierFlags::DECLARE;
        }

        if self.is_keyword("function") {
            return self.parse_function_declaration(start, flags);
        }
        if self.is_keyword("class") {
            return self.parse_class_declaration(start, flags);
        }
        if self.is_keyword("let") || self.is_keyword("const") || self.is_keyword("var") {
            return self.parse_variable_statement(start, flags);
        }
        if self.is_keyword("type") && matches!(self.lookahead(1).kind, SyntaxKind::Identifier(_)) {
            return self.parse_type_alias(start);
        }
        if self.is_keyword("interface") {
            return self.parse_interface(start);
        }
        if self.is_keyword("return") {
            self.next_token();
            let expression = if self.is_token(&SyntaxKind::Semicolon)
                || self.is_token(&SyntaxKind::CloseBrace)
                || self.is_token(&SyntaxKind::EndOfFile)
            {
                None
            } else {
                Some(self.parse_expression()?)
            };
            self.parse_semicolon();
            let end = self.previous_end();
            return Ok(self.finish_node(NodeKind::Return { expression }, start, end));
        }
        if self.is_keyword("if") {
            self.next_token();
            self.parse_expected(&SyntaxKind::OpenParen, "(")?;
            let condition = self.parse_expression()?;
            self.parse_expected(&SyntaxKind::CloseParen, ")")?;
            let then_branch = self.parse_statement()?;
            let else_branch = if self.parse_keyword("else") {
                Some(self.parse_statement()?)
            } else {
                None
            };
            let end = self.previous_end();
            return Ok(self.finish_node(
                NodeKind::If {
                    condition,
                    then_branch,
                    else_branch,
                },
                start,
                end,
            ));
        }
        if self.is_token(&SyntaxKind::OpenBrace) {
            return self.parse_block();
        }

        let expression = self.parse_expression()?;
        self.parse_semicolon();
        let end = self.previous_end();
        Ok(self.finish_node(NodeKind::ExpressionStatement { expression }, start, end))
    }

    fn parse_block(&mut self) -> ParseResult<NodeId> {
        let start = self.token_start();
        self.parse_expected(&SyntaxKind::OpenBrace, "{")?;
        let mut statements = Vec::new();
        while !self.is_token(&SyntaxKind::CloseBrace) {
            if self.is_token(&SyntaxKind::EndOfFile) {
                return Err(self.error("'}' expected"));
            }
            statements.push(self.parse_statement()?);
        }
        self.next_token();
        let end = self.previous_end();
        Ok(self.finish_node(NodeKind::Block { statements }, start, end))
    }

    fn parse_function_declaration(
        &mut self,
        start: u32,
        flags: ModifierFlags,
    ) -> ParseResult<NodeId> {
        self.next_token();
        let name = self.parse_identifier()?;
        self.parse_function_rest(start, FunctionKind::Declaration, Some(name), flags)
    }

    /// Parameter list, optional return annotation and optional body.
    fn parse_function_rest(
        &mut self,
        start: u32,
        kind: FunctionKind,
        name: Option<String>,
        flags: ModifierFlags,
    ) -> ParseResult<NodeId> {
        let params = self.parse_parameter_list()?;
        let return_type = self.parse_type_annotation()?;
        let body = if self.is_token(&SyntaxKind::OpenBrace) {
            Some(FunctionBody::Block(self.parse_block()?))
        } else {
            self.parse_semicolon();
            None
        };
        let end = self.previous_end();
        Ok(self.finish_node(
            NodeKind::Function(FunctionData {
                kind,
                name,
                params,
                return_type,
                body,
                flags,
            }),
            start,
            end,
        ))
    }

    fn parse_parameter_list(&mut self) -> ParseResult<Vec<NodeId>> {
        self.parse_expected(&SyntaxKind::OpenParen, "(")?;
        let mut params = Vec::new();
        while !self.is_token(&SyntaxKind::CloseParen) {
            params.push(self.parse_parameter()?);
            if !self.parse_optional(&SyntaxKind::Comma) {
                break;
            }
        }
        self.parse_expected(&SyntaxKind::CloseParen, ")")?;
        Ok(params)
    }

    fn parse_parameter(&mut self) -> ParseResult<NodeId> {
        let start = self.token_start();
        let name = self.parse_binding_name()?;
        let name_span = Span::new(start, self.previous_end());
        let mut flags = ModifierFlags::empty();
        if self.parse_optional(&SyntaxKind::Question) {
            flags |= ModifierFlags::OPTIONAL;
        }
        let annotation_insert = self.previous_end();
        let annotation = self.parse_type_annotation()?;
        let initializer = self.parse_initializer()?;
        let end = self.previous_end();
        Ok(self.finish_node(
            NodeKind::Parameter(BindingDecl {
                name,
                annotation,
                initializer,
                flags,
                annotation_insert,
                name_span,
            }),
            start,
            end,
        ))
    }

    fn parse_initializer(&mut self) -> ParseResult<Option<NodeId>> {
        if self.parse_optional(&SyntaxKind::Equals) {
            Ok(Some(self.parse_assignment_expression()?))
        } else {
            Ok(None)
        }
    }

    fn parse_binding_name(&mut self) -> ParseResult<BindingName> {
        if self.is_token(&SyntaxKind::OpenBrace) {
            self.next_token();
            let mut elements = Vec::new();
            while !self.is_token(&SyntaxKind::CloseBrace) {
                let start = self.token_start();
                let property = self.parse_property_name()?;
                let name = if self.parse_optional(&SyntaxKind::Colon) {
                    self.parse_binding_name()?
                } else {
                    BindingName::Identifier(property.clone())
                };
                let initializer = self.parse_initializer()?;
                let end = self.previous_end();
                elements.push(self.finish_node(
                    NodeKind::BindingElement {
                        property,
                        name,
                        initializer,
                    },
                    start,
                    end,
                ));
                if !self.parse_optional(&SyntaxKind::Comma) {
                    break;
                }
            }
            self.parse_expected(&SyntaxKind::CloseBrace, "}")?;
            return Ok(BindingName::Object(elements));
        }

        if self.is_token(&SyntaxKind::OpenBracket) {
            self.next_token();
            let mut elements = Vec::new();
            let mut index = 0usize;
            while !self.is_token(&SyntaxKind::CloseBracket) {
                if self.is_token(&SyntaxKind::Comma) {
                    self.next_token();
                    elements.push(None);
                    index += 1;
                    continue;
                }
                let start = self.token_start();
                let name = self.parse_binding_name()?;
                let initializer = self.parse_initializer()?;
                let end = self.previous_end();
                elements.push(Some(self.finish_node(
                    NodeKind::BindingElement {
                        property: index.to_string(),
                        name,
                        initializer,
                    },
                    start,
                    end,
                )));
                index += 1;
                if !self.parse_optional(&SyntaxKind::Comma) {
                    break;
                }
            }
            self.parse_expected(&SyntaxKind::CloseBracket, "]")?;
            return Ok(BindingName::Array(elements));
        }

        Ok(BindingName::Identifier(self.parse_identifier()?))
    }

    fn parse_type_annotation(&mut self) -> ParseResult<Option<TypeAnnotation>> {
        if !self.is_token(&SyntaxKind::Colon) {
            return Ok(None);
        }
        let start = self.token_start();
        self.next_token();
        let ty = self.parse_type()?;
        Ok(Some(TypeAnnotation {
            ty,
            span: Span::new(start, self.previous_end()),
        }))
    }

    fn parse_variable_statement(
        &mut self,
        start: u32,
        mut flags: ModifierFlags,
    ) -> ParseResult<NodeId> {
        if self.parse_keyword("const") {
            flags |= ModifierFlags::CONST;
        } else if self.parse_keyword("let") {
            flags |= ModifierFlags::LET;
        } else {
            self.parse_keyword("var");
        }

        let mut declarations = Vec::new();
        loop {
            let decl_start = self.token_start();
            let name = self.parse_binding_name()?;
            let name_span = Span::new(decl_start, self.previous_end());
            let annotation = self.parse_type_annotation()?;
            let initializer = self.parse_initializer()?;
            let end = self.previous_end();
            declarations.push(self.finish_node(
                NodeKind::Variable(BindingDecl {
                    name,
                    annotation,
                    initializer,
                    flags,
                    annotation_insert: name_span.end,
                    name_span,
                }),
                decl_start,
                end,
            ));
            if !self.parse_optional(&SyntaxKind::Comma) {
                break;
            }
        }
        self.parse_semicolon();
        let end = self.previous_end();
        Ok(self.finish_node(NodeKind::VariableStatement { declarations }, start, end))
    }

    fn parse_class_declaration(&mut self, start: u32, flags: ModifierFlags) -> ParseResult<NodeId> {
        self.next_token();
        let name = self.parse_identifier()?;
        self.parse_expected(&SyntaxKind::OpenBrace, "{")?;
        let mut members = Vec::new();
        while !self.is_token(&SyntaxKind::CloseBrace) {
            if self.is_token(&SyntaxKind::EndOfFile) {
                return Err(self.error("'}' expected"));
            }
            if self.parse_optional(&SyntaxKind::Semicolon) {
                continue;
            }
            members.push(self.parse_class_member(flags)?);
        }
        self.next_token();
        let end = self.previous_end();
        Ok(self.finish_node(NodeKind::Class { name, members }, start, end))
    }

    fn parse_class_member(&mut self, class_flags: ModifierFlags) -> ParseResult<NodeId> {
        let start = self.token_start();
        let mut flags = class_flags & ModifierFlags::DECLARE;
        for modifier in ["public", "private", "protected", "static", "readonly"] {
            if self.is_keyword(modifier)
                && matches!(self.lookahead(1).kind, SyntaxKind::Identifier(_))
            {
                self.next_token();
                if modifier == "readonly" {
                    flags |= ModifierFlags::READONLY;
                }
            }
        }

        if self.is_keyword("constructor") && self.is_token_at(1, &SyntaxKind::OpenParen) {
            self.next_token();
            return self.parse_function_rest(
                start,
                FunctionKind::Constructor,
                Some("constructor".to_string()),
                flags,
            );
        }

        let name = self.parse_property_name()?;
        if self.is_token(&SyntaxKind::OpenParen) {
            return self.parse_function_rest(start, FunctionKind::Method, Some(name), flags);
        }

        self.parse_optional(&SyntaxKind::Question);
        let annotation = self.parse_type_annotation()?;
        let initializer = self.parse_initializer()?;
        self.parse_semicolon();
        let end = self.previous_end();
        Ok(self.finish_node(
            NodeKind::Property {
                name,
                annotation,
                initializer,
            },
            start,
            end,
        ))
    }

    fn parse_type_alias(&mut self, start: u32) -> ParseResult<NodeId> {
        self.next_token();
        let name = self.parse_identifier()?;
        self.parse_expected(&SyntaxKind::Equals, "=")?;
        let ty = self.parse_type()?;
        self.parse_semicolon();
        let end = self.previous_end();
        Ok(self.finish_node(NodeKind::TypeAlias { name, ty }, start, end))
    }

    fn parse_interface(&mut self, start: u32) -> ParseResult<NodeId> {
        self.next_token();
        let name = self.parse_identifier()?;
        let members = self.parse_type_members()?;
        let end = self.previous_end();
        Ok(self.finish_node(NodeKind::Interface { name, members }, start, end))
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn parse_expression(&mut self) -> ParseResult<NodeId> {
        self.parse_assignment_expression()
    }

    fn parse_assignment_expression(&mut self) -> ParseResult<NodeId> {
        if self.is_start_of_arrow_function() {
            return self.parse_arrow_function();
        }
        let start = self.token_start();
        let target = self.parse_binary_expression(0)?;
        if self.parse_optional(&SyntaxKind::Equals) {
            let value = self.parse_assignment_expression()?;
            let end = self.previous_end();
            return Ok(self.finish_node(NodeKind::Assignment { target, value }, start, end));
        }
        Ok(target)
    }

    /// `x =>`, `(...) =>` or `(...): T =>`.
    fn is_start_of_arrow_function(&self) -> bool {
        if matches!(self.current().kind, SyntaxKind::Identifier(_)) {
            return self.is_token_at(1, &SyntaxKind::EqualsGreaterThan);
        }
        if !self.is_token(&SyntaxKind::OpenParen) {
            return false;
        }
        let mut depth = 0usize;
        let mut offset = 0usize;
        loop {
            match &self.lookahead(offset).kind {
                SyntaxKind::OpenParen | SyntaxKind::OpenBrace | SyntaxKind::OpenBracket => {
                    depth += 1;
                }
                SyntaxKind::CloseParen | SyntaxKind::CloseBrace | SyntaxKind::CloseBracket => {
                    depth -= 1;
                    if depth == 0 {
                        let next = &self.lookahead(offset + 1).kind;
                        return matches!(next, SyntaxKind::EqualsGreaterThan | SyntaxKind::Colon);
                    }
                }
                SyntaxKind::EndOfFile => return false,
                _ => {}
            }
            offset += 1;
        }
    }

    fn parse_arrow_function(&mut self) -> ParseResult<NodeId> {
        let start = self.token_start();
        let (params, return_type) = if self.is_token(&SyntaxKind::OpenParen) {
            let params = self.parse_parameter_list()?;
            (params, self.parse_type_annotation()?)
        } else {
            let name = self.parse_identifier()?;
            let end = self.previous_end();
            let param = self.finish_node(
                NodeKind::Parameter(BindingDecl {
                    name: BindingName::Identifier(name),
                    annotation: None,
                    initializer: None,
                    flags: ModifierFlags::empty(),
                    annotation_insert: end,
                    name_span: Span::new(start, end),
                }),
                start,
                end,
            );
            (vec![param], None)
        };
        self.parse_expected(&SyntaxKind::EqualsGreaterThan, "=>")?;
        let body = if self.is_token(&SyntaxKind::OpenBrace) {
            FunctionBody::Block(self.parse_block()?)
        } else {
            FunctionBody::Expression(self.parse_assignment_expression()?)
        };
        let end = self.previous_end();
        Ok(self.finish_node(
            NodeKind::Function(FunctionData {
                kind: FunctionKind::Arrow,
                name: None,
                params,
                return_type,
                body: Some(body),
                flags: ModifierFlags::empty(),
            }),
            start,
            end,
        ))
    }

    fn binary_operator(&self) -> Option<(BinaryOperator, u8)> {
        let operator = match self.current().kind {
            SyntaxKind::BarBar => (BinaryOperator::LogicalOr, 1),
            SyntaxKind::AmpersandAmpersand => (BinaryOperator::LogicalAnd, 2),
            SyntaxKind::EqualsEquals => (BinaryOperator::Equals, 3),
            SyntaxKind::ExclamationEquals => (BinaryOperator::NotEquals, 3),
            SyntaxKind::EqualsEqualsEquals => (BinaryOperator::StrictEquals, 3),
            SyntaxKind::ExclamationEqualsEquals => (BinaryOperator::StrictNotEquals, 3),
            SyntaxKind::LessThan => (BinaryOperator::LessThan, 4),
            SyntaxKind::GreaterThan => (BinaryOperator::GreaterThan, 4),
            SyntaxKind::LessThanEquals => (BinaryOperator::LessEquals, 4),
            SyntaxKind::GreaterThanEquals => (BinaryOperator::GreaterEquals, 4),
            SyntaxKind::Plus => (BinaryOperator::Plus, 5),
            SyntaxKind::Minus => (BinaryOperator::Minus, 5),
            SyntaxKind::Asterisk => (BinaryOperator::Multiply, 6),
            SyntaxKind::Slash => (BinaryOperator::Divide, 6),
            SyntaxKind::Percent => (BinaryOperator::Remainder, 6),
            _ => return None,
        };
        Some(operator)
    }

    /// Precedence climbing; all binary operators are left-associative.
    fn parse_binary_expression(&mut self, min_precedence: u8) -> ParseResult<NodeId> {
        let start = self.token_start();
        let mut left = self.parse_unary_expression()?;
        while let Some((operator, precedence)) = self.binary_operator() {
            if precedence <= min_precedence {
                break;
            }
            self.next_token();
            let right = self.parse_binary_expression(precedence)?;
            let end = self.previous_end();
            left = self.finish_node(
                NodeKind::Binary {
                    operator,
                    left,
                    right,
                },
                start,
                end,
            );
        }
        Ok(left)
    }

    fn parse_unary_expression(&mut self) -> ParseResult<NodeId> {
        let start = self.token_start();
        let operator = match self.current().kind {
            SyntaxKind::Exclamation => Some(UnaryOperator::Not),
            SyntaxKind::Minus => Some(UnaryOperator::Minus),
            SyntaxKind::Plus => Some(UnaryOperator::Plus),
            _ if self.is_keyword("typeof") => Some(UnaryOperator::Typeof),
            _ => None,
        };
        let Some(operator) = operator else {
            return self.parse_call_expression();
        };
        self.next_token();
        let operand = self.parse_unary_expression()?;
        let end = self.previous_end();
        Ok(self.finish_node(NodeKind::Unary { operator, operand }, start, end))
    }

    fn parse_arguments(&mut self) -> ParseResult<Vec<NodeId>> {
        self.parse_expected(&SyntaxKind::OpenParen, "(")?;
        let mut arguments = Vec::new();
        while !self.is_token(&SyntaxKind::CloseParen) {
            arguments.push(self.parse_assignment_expression()?);
            if !self.parse_optional(&SyntaxKind::Comma) {
                break;
            }
        }
        self.parse_expected(&SyntaxKind::CloseParen, ")")?;
        Ok(arguments)
    }

    fn parse_call_expression(&mut self) -> ParseResult<NodeId> {
        let start = self.token_start();
        let mut expression = if self.is_keyword("new") {
            self.next_token();
            let callee = self.parse_member_expression()?;
            let arguments = if self.is_token(&SyntaxKind::OpenParen) {
                self.parse_arguments()?
            } else {
                Vec::new()
            };
            let end = self.previous_end();
            self.finish_node(NodeKind::New { callee, arguments }, start, end)
        } else {
            self.parse_primary_expression()?
        };

        loop {
            if self.parse_optional(&SyntaxKind::Dot) {
                let name = self.parse_identifier()?;
                let end = self.previous_end();
                expression = self.finish_node(
                    NodeKind::PropertyAccess {
                        object: expression,
                        name,
                    },
                    start,
                    end,
                );
            } else if self.is_token(&SyntaxKind::OpenParen) {
                let arguments = self.parse_arguments()?;
                let end = self.previous_end();
                expression = self.finish_node(
                    NodeKind::Call {
                        callee: expression,
                        arguments,
                    },
                    start,
                    end,
                );
            } else {
                return Ok(expression);
            }
        }
    }

    /// Callee of `new`: property accesses only, no calls.
    fn parse_member_expression(&mut self) -> ParseResult<NodeId> {
        let start = self.token_start();
        let mut expression = self.parse_primary_expression()?;
        while self.parse_optional(&SyntaxKind::Dot) {
            let name = self.parse_identifier()?;
            let end = self.previous_end();
            expression = self.finish_node(
                NodeKind::PropertyAccess {
                    object: expression,
                    name,
                },
                start,
                end,
            );
        }
        Ok(expression)
    }

    fn parse_primary_expression(&mut self) -> ParseResult<NodeId> {
        let token = self.current().clone();
        let start = token.span.start;
        let end = token.span.end;
        let kind = match token.kind {
            SyntaxKind::NumericLiteral(value) => {
                self.next_token();
                NodeKind::NumericLiteral { value }
            }
            SyntaxKind::StringLiteral(value) => {
                self.next_token();
                NodeKind::StringLiteral { value }
            }
            SyntaxKind::Template(template) => {
                self.next_token();
                return self.parse_template(template, token.span);
            }
            SyntaxKind::Identifier(name) => {
                self.next_token();
                match name.as_str() {
                    "true" => NodeKind::BooleanLiteral { value: true },
                    "false" => NodeKind::BooleanLiteral { value: false },
                    "null" => NodeKind::NullLiteral,
                    "undefined" => NodeKind::Undefined,
                    "this" => NodeKind::This,
                    _ => NodeKind::Identifier { name },
                }
            }
            SyntaxKind::OpenParen => {
                self.next_token();
                let expression = self.parse_expression()?;
                self.parse_expected(&SyntaxKind::CloseParen, ")")?;
                let end = self.previous_end();
                return Ok(self.finish_node(NodeKind::Paren { expression }, start, end));
            }
            SyntaxKind::OpenBrace => return self.parse_object_literal(),
            SyntaxKind::OpenBracket => {
                self.next_token();
                let mut elements = Vec::new();
                while !self.is_token(&SyntaxKind::CloseBracket) {
                    elements.push(self.parse_assignment_expression()?);
                    if !self.parse_optional(&SyntaxKind::Comma) {
                        break;
                    }
                }
                self.parse_expected(&SyntaxKind::CloseBracket, "]")?;
                let end = self.previous_end();
                return Ok(self.finish_node(NodeKind::ArrayLiteral { elements }, start, end));
            }
            _ => return Err(self.error("expression expected")),
        };
        Ok(self.finish_node(kind, start, end))
    }

    fn parse_object_literal(&mut self) -> ParseResult<NodeId> {
        let start = self.token_start();
        self.parse_expected(&SyntaxKind::OpenBrace, "{")?;
        let mut properties = Vec::new();
        while !self.is_token(&SyntaxKind::CloseBrace) {
            let name_start = self.token_start();
            let name = self.parse_property_name()?;
            let value = if self.parse_optional(&SyntaxKind::Colon) {
                self.parse_assignment_expression()?
            } else {
                let end = self.previous_end();
                self.finish_node(
                    NodeKind::Identifier { name: name.clone() },
                    name_start,
                    end,
                )
            };
            properties.push((name, value));
            if !self.parse_optional(&SyntaxKind::Comma) {
                break;
            }
        }
        self.parse_expected(&SyntaxKind::CloseBrace, "}")?;
        let end = self.previous_end();
        Ok(self.finish_node(NodeKind::ObjectLiteral { properties }, start, end))
    }

    /// Each `${...}` range is scanned and parsed as its own expression.
    fn parse_template(&mut self, template: TemplateToken, span: Span) -> ParseResult<NodeId> {
        let mut spans = Vec::with_capacity(template.spans.len());
        for range in &template.spans {
            let tokens = ScannerState::with_range(self.source, *range).scan_all()?;
            let mut nested =
                ParserState::new(&mut *self.arena, self.file, self.source, tokens);
            let expression = nested.parse_expression()?;
            if !nested.is_token(&SyntaxKind::EndOfFile) {
                return Err(nested.error("'}' expected"));
            }
            spans.push(expression);
        }
        Ok(self.finish_node(
            NodeKind::Template {
                quasis: template.quasis,
                spans,
            },
            span.start,
            span.end,
        ))
    }

    // =========================================================================
    // Types
    // =========================================================================

    fn parse_type(&mut self) -> ParseResult<TypeNode> {
        self.parse_optional(&SyntaxKind::Bar);
        let first = self.parse_intersection_type()?;
        if !self.is_token(&SyntaxKind::Bar) {
            return Ok(first);
        }
        let mut members = vec![first];
        while self.parse_optional(&SyntaxKind::Bar) {
            members.push(self.parse_intersection_type()?);
        }
        Ok(TypeNode::Union(members))
    }

    fn parse_intersection_type(&mut self) -> ParseResult<TypeNode> {
        self.parse_optional(&SyntaxKind::Ampersand);
        let first = self.parse_type_operator()?;
        if !self.is_token(&SyntaxKind::Ampersand) {
            return Ok(first);
        }
        let mut members = vec![first];
        while self.parse_optional(&SyntaxKind::Ampersand) {
            members.push(self.parse_type_operator()?);
        }
        Ok(TypeNode::Intersection(members))
    }

    /// `readonly` applies to the outermost array or tuple.
    fn parse_type_operator(&mut self) -> ParseResult<TypeNode> {
        if !self.parse_keyword("readonly") {
            return self.parse_array_type();
        }
        match self.parse_array_type()? {
            TypeNode::Array { element, .. } => Ok(TypeNode::Array {
                element,
                readonly: true,
            }),
            TypeNode::Tuple { elements, .. } => Ok(TypeNode::Tuple {
                elements,
                readonly: true,
            }),
            _ => Err(self.error("'readonly' type modifier is only permitted on array and tuple types")),
        }
    }

    fn parse_array_type(&mut self) -> ParseResult<TypeNode> {
        let mut ty = self.parse_primary_type()?;
        while self.is_token(&SyntaxKind::OpenBracket) && self.is_token_at(1, &SyntaxKind::CloseBracket)
        {
            self.next_token();
            self.next_token();
            ty = TypeNode::Array {
                element: Box::new(ty),
                readonly: false,
            };
        }
        Ok(ty)
    }

    fn parse_primary_type(&mut self) -> ParseResult<TypeNode> {
        let token = self.current().clone();
        match token.kind {
            SyntaxKind::Identifier(name) => {
                if name == "import" && self.is_token_at(1, &SyntaxKind::OpenParen) {
                    return self.parse_import_type();
                }
                self.next_token();
                Ok(match name.as_str() {
                    "true" => TypeNode::Literal(LiteralValue::Boolean(true)),
                    "false" => TypeNode::Literal(LiteralValue::Boolean(false)),
                    _ => match PrimitiveKind::from_keyword(&name) {
                        Some(kind) => TypeNode::Keyword(kind),
                        None => TypeNode::Reference(name),
                    },
                })
            }
            SyntaxKind::NumericLiteral(value) => {
                self.next_token();
                Ok(TypeNode::Literal(LiteralValue::Number(value)))
            }
            SyntaxKind::Minus => {
                self.next_token();
                match self.current().kind.clone() {
                    SyntaxKind::NumericLiteral(value) => {
                        self.next_token();
                        Ok(TypeNode::Literal(LiteralValue::Number(-value)))
                    }
                    _ => Err(self.error("numeric literal expected")),
                }
            }
            SyntaxKind::StringLiteral(value) => {
                self.next_token();
                Ok(TypeNode::Literal(LiteralValue::String(value)))
            }
            SyntaxKind::OpenBrace => Ok(TypeNode::Object(self.parse_type_members()?)),
            SyntaxKind::OpenBracket => {
                self.next_token();
                let mut elements = Vec::new();
                while !self.is_token(&SyntaxKind::CloseBracket) {
                    elements.push(self.parse_type()?);
                    if !self.parse_optional(&SyntaxKind::Comma) {
                        break;
                    }
                }
                self.parse_expected(&SyntaxKind::CloseBracket, "]")?;
                Ok(TypeNode::Tuple {
                    elements,
                    readonly: false,
                })
            }
            SyntaxKind::OpenParen => {
                if self.is_start_of_function_type() {
                    return self.parse_function_type();
                }
                self.next_token();
                let ty = self.parse_type()?;
                self.parse_expected(&SyntaxKind::CloseParen, ")")?;
                Ok(ty)
            }
            _ => Err(self.error("type expected")),
        }
    }

    fn is_start_of_function_type(&self) -> bool {
        if self.is_token_at(1, &SyntaxKind::CloseParen) {
            return true;
        }
        if !matches!(self.lookahead(1).kind, SyntaxKind::Identifier(_)) {
            return false;
        }
        match self.lookahead(2).kind {
            SyntaxKind::Colon | SyntaxKind::Question | SyntaxKind::Comma => true,
            SyntaxKind::CloseParen => self.is_token_at(3, &SyntaxKind::EqualsGreaterThan),
            _ => false,
        }
    }

    fn parse_function_type(&mut self) -> ParseResult<TypeNode> {
        let params = self.parse_type_parameter_list()?;
        self.parse_expected(&SyntaxKind::EqualsGreaterThan, "=>")?;
        let return_type = self.parse_type()?;
        Ok(TypeNode::Function {
            params,
            return_type: Box::new(return_type),
        })
    }

    fn parse_type_parameter_list(&mut self) -> ParseResult<Vec<TypeParam>> {
        self.parse_expected(&SyntaxKind::OpenParen, "(")?;
        let mut params = Vec::new();
        while !self.is_token(&SyntaxKind::CloseParen) {
            let name = self.parse_identifier()?;
            let optional = self.parse_optional(&SyntaxKind::Question);
            let ty = if self.parse_optional(&SyntaxKind::Colon) {
                self.parse_type()?
            } else {
                TypeNode::Keyword(PrimitiveKind::Any)
            };
            params.push(TypeParam { name, ty, optional });
            if !self.parse_optional(&SyntaxKind::Comma) {
                break;
            }
        }
        self.parse_expected(&SyntaxKind::CloseParen, ")")?;
        Ok(params)
    }

    fn parse_import_type(&mut self) -> ParseResult<TypeNode> {
        self.next_token();
        self.parse_expected(&SyntaxKind::OpenParen, "(")?;
        let module = match &self.current().kind {
            SyntaxKind::StringLiteral(module) => module.clone(),
            _ => return Err(self.error("string literal expected")),
        };
        self.next_token();
        self.parse_expected(&SyntaxKind::CloseParen, ")")?;
        self.parse_expected(&SyntaxKind::Dot, ".")?;
        let name = self.parse_identifier()?;
        Ok(TypeNode::Import { module, name })
    }

    /// `{ a: T; "b"?: U, m(x: V): W }`
    fn parse_type_members(&mut self) -> ParseResult<Vec<TypeMember>> {
        self.parse_expected(&SyntaxKind::OpenBrace, "{")?;
        let mut members = Vec::new();
        while !self.is_token(&SyntaxKind::CloseBrace) {
            self.parse_keyword("readonly");
            let name = self.parse_property_name()?;
            let optional = self.parse_optional(&SyntaxKind::Question);
            let ty = if self.is_token(&SyntaxKind::OpenParen) {
                let params = self.parse_type_parameter_list()?;
                let return_type = if self.parse_optional(&SyntaxKind::Colon) {
                    self.parse_type()?
                } else {
                    TypeNode::Keyword(PrimitiveKind::Any)
                };
                TypeNode::Function {
                    params,
                    return_type: Box::new(return_type),
                }
            } else {
                self.parse_expected(&SyntaxKind::Colon, ":")?;
                self.parse_type()?
            };
            members.push(TypeMember { name, ty, optional });
            if !self.parse_optional(&SyntaxKind::Semicolon) && !self.parse_optional(&SyntaxKind::Comma)
            {
                break;
            }
        }
        self.parse_expected(&SyntaxKind::CloseBrace, "}")?;
        Ok(members)
    }
}

#[cfg(test)]
#[path = "tests/parser_tests.rs"]
mod tests;
