//! Tokenizer for the TypeScript subset.
//!
//! The scanner runs eagerly over a byte range of a source file and produces a
//! token vector; the parser looks ahead by index. Keywords are scanned as
//! identifiers and recognized contextually by the parser.
//!
//! Template literals are scanned as a single token that records the cooked
//! text chunks and the byte ranges of each `${...}` expression. The parser
//! re-scans those ranges.

use crate::error::ParseError;
use anyfix_common::Span;

#[derive(Clone, Debug, PartialEq)]
pub enum SyntaxKind {
    Identifier(String),
    NumericLiteral(f64),
    StringLiteral(String),
    Template(TemplateToken),
    OpenBrace,
    CloseBrace,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    Semicolon,
    Comma,
    Colon,
    Dot,
    Question,
    EqualsGreaterThan,
    Equals,
    EqualsEquals,
    EqualsEqualsEquals,
    Exclamation,
    ExclamationEquals,
    ExclamationEqualsEquals,
    Plus,
    Minus,
    Asterisk,
    Slash,
    Percent,
    Ampersand,
    AmpersandAmpersand,
    Bar,
    BarBar,
    LessThan,
    LessThanEquals,
    GreaterThan,
    GreaterThanEquals,
    EndOfFile,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TemplateToken {
    /// Text chunks around the expressions; always one more than `spans`.
    pub quasis: Vec<String>,
    /// Byte ranges of the embedded expressions.
    pub spans: Vec<Span>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub span: Span,
}

/// Punctuation, longest first so that `===` wins over `==` and `=`.
const PUNCTUATION: &[(&str, SyntaxKind)] = &[
    ("===", SyntaxKind::EqualsEqualsEquals),
    ("!==", SyntaxKind::ExclamationEqualsEquals),
    ("=>", SyntaxKind::EqualsGreaterThan),
    ("==", SyntaxKind::EqualsEquals),
    ("!=", SyntaxKind::ExclamationEquals),
    ("&&", SyntaxKind::AmpersandAmpersand),
    ("||", SyntaxKind::BarBar),
    ("<=", SyntaxKind::LessThanEquals),
    (">=", SyntaxKind::GreaterThanEquals),
    ("{", SyntaxKind::OpenBrace),
    ("}", SyntaxKind::CloseBrace),
    ("(", SyntaxKind::OpenParen),
    (")", SyntaxKind::CloseParen),
    ("[", SyntaxKind::OpenBracket),
    ("]", SyntaxKind::CloseBracket),
    (";", SyntaxKind::Semicolon),
    (",", SyntaxKind::Comma),
    (":", SyntaxKind::Colon),
    (".", SyntaxKind::Dot),
    ("?", SyntaxKind::Question),
    ("=", SyntaxKind::Equals),
    ("!", SyntaxKind::Exclamation),
    ("+", SyntaxKind::Plus),
    ("-", SyntaxKind::Minus),
    ("*", SyntaxKind::Asterisk),
    ("/", SyntaxKind::Slash),
    ("%", SyntaxKind::Percent),
    ("&", SyntaxKind::Ampersand),
    ("|", SyntaxKind::Bar),
    ("<", SyntaxKind::LessThan),
    (">", SyntaxKind::GreaterThan),
];

pub struct ScannerState<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    end: usize,
}

impl<'a> ScannerState<'a> {
    pub fn new(source: &'a str) -> Self {
        Self::with_range(source, Span::new(0, source.len() as u32))
    }

    /// Scan only `range` of `source`; token spans stay file-relative.
    pub fn with_range(source: &'a str, range: Span) -> Self {
        ScannerState {
            source,
            bytes: source.as_bytes(),
            pos: range.start as usize,
            end: (range.end as usize).min(source.len()),
        }
    }

    pub fn scan_all(mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.scan()?;
            let done = token.kind == SyntaxKind::EndOfFile;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn peek_byte(&self, offset: usize) -> Option<u8> {
        let index = self.pos + offset;
        (index < self.end).then(|| self.bytes[index])
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(self.pos as u32, message)
    }

    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        while let Some(b) = self.peek_byte(0) {
            match b {
                b' ' | b'\t' | b'\r' | b'\n' => self.pos += 1,
                b'/' if self.peek_byte(1) == Some(b'/') => {
                    while let Some(b) = self.peek_byte(0) {
                        if b == b'\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                b'/' if self.peek_byte(1) == Some(b'*') => {
                    let start = self.pos;
                    self.pos += 2;
                    loop {
                        match self.peek_byte(0) {
                            None => {
                                self.pos = start;
                                return Err(self.error("unterminated comment"));
                            }
                            Some(b'*') if self.peek_byte(1) == Some(b'/') => {
                                self.pos += 2;
                                break;
                            }
                            Some(_) => self.pos += 1,
                        }
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn scan(&mut self) -> Result<Token, ParseError> {
        self.skip_trivia()?;
        let start = self.pos;
        let Some(b) = self.peek_byte(0) else {
            return Ok(Token {
                kind: SyntaxKind::EndOfFile,
                span: Span::at(self.end as u32),
            });
        };

        let kind = if is_identifier_start(b) {
            while self.peek_byte(0).is_some_and(is_identifier_part) {
                self.pos += 1;
            }
            SyntaxKind::Identifier(self.source[start..self.pos].to_string())
        } else if b.is_ascii_digit() {
            self.scan_number()?
        } else if b == b'"' || b == b'\'' {
            SyntaxKind::StringLiteral(self.scan_string(b)?)
        } else if b == b'`' {
            SyntaxKind::Template(self.scan_template()?)
        } else {
            let rest = &self.source[self.pos..self.end];
            let Some((text, kind)) = PUNCTUATION.iter().find(|(text, _)| rest.starts_with(text))
            else {
                return Err(self.error(format!(
                    "unexpected character '{}'",
                    rest.chars().next().unwrap_or_default()
                )));
            };
            self.pos += text.len();
            kind.clone()
        };

        Ok(Token {
            kind,
            span: Span::new(start as u32, self.pos as u32),
        })
    }

    fn scan_number(&mut self) -> Result<SyntaxKind, ParseError> {
        let start = self.pos;
        if self.peek_byte(0) == Some(b'0') && matches!(self.peek_byte(1), Some(b'x' | b'X')) {
            self.pos += 2;
            while self.peek_byte(0).is_some_and(|b| b.is_ascii_hexdigit()) {
                self.pos += 1;
            }
            let digits = &self.source[start + 2..self.pos];
            return u64::from_str_radix(digits, 16)
                .map(|value| SyntaxKind::NumericLiteral(value as f64))
                .map_err(|_| self.error("invalid hexadecimal literal"));
        }

        while self.peek_byte(0).is_some_and(|b| b.is_ascii_digit() || b == b'_') {
            self.pos += 1;
        }
        if self.peek_byte(0) == Some(b'.') && self.peek_byte(1).is_some_and(|b| b.is_ascii_digit())
        {
            self.pos += 1;
            while self.peek_byte(0).is_some_and(|b| b.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        if matches!(self.peek_byte(0), Some(b'e' | b'E')) {
            let exponent = usize::from(matches!(self.peek_byte(1), Some(b'+' | b'-')));
            if self.peek_byte(1 + exponent).is_some_and(|b| b.is_ascii_digit()) {
                self.pos += 1 + exponent;
                while self.peek_byte(0).is_some_and(|b| b.is_ascii_digit()) {
                    self.pos += 1;
                }
            }
        }

        let text = self.source[start..self.pos].replace('_', "");
        text.parse::<f64>()
            .map(SyntaxKind::NumericLiteral)
            .map_err(|_| self.error(format!("invalid numeric literal '{text}'")))
    }

    fn scan_escape(&mut self, out: &mut String) -> Result<(), ParseError> {
        // At the byte after the backslash.
        let Some(c) = self.source[self.pos..self.end].chars().next() else {
            return Err(self.error("unterminated escape sequence"));
        };
        self.pos += c.len_utf8();
        match c {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '0' => out.push('\0'),
            'u' => {
                let hex = self
                    .source
                    .get(self.pos..self.pos + 4)
                    .ok_or_else(|| self.error("invalid unicode escape"))?;
                let code = u32::from_str_radix(hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| self.error("invalid unicode escape"))?;
                out.push(code);
                self.pos += 4;
            }
            '\n' => {}
            other => out.push(other),
        }
        Ok(())
    }

    fn scan_string(&mut self, quote: u8) -> Result<String, ParseError> {
        let start = self.pos;
        self.pos += 1;
        let mut value = String::new();
        loop {
            let Some(c) = self.source[self.pos..self.end].chars().next() else {
                self.pos = start;
                return Err(self.error("unterminated string literal"));
            };
            self.pos += c.len_utf8();
            match c {
                '\\' => self.scan_escape(&mut value)?,
                '\n' => {
                    self.pos = start;
                    return Err(self.error("unterminated string literal"));
                }
                c if c as u32 == u32::from(quote) => return Ok(value),
                c => value.push(c),
            }
        }
    }

    fn scan_template(&mut self) -> Result<TemplateToken, ParseError> {
        let start = self.pos;
        self.pos += 1;
        let mut quasis = Vec::new();
        let mut spans = Vec::new();
        let mut chunk = String::new();
        loop {
            let Some(c) = self.source[self.pos..self.end].chars().next() else {
                self.pos = start;
                return Err(self.error("unterminated template literal"));
            };
            self.pos += c.len_utf8();
            match c {
                '`' => {
                    quasis.push(chunk);
                    return Ok(TemplateToken { quasis, spans });
                }
                '\\' => self.scan_escape(&mut chunk)?,
                '$' if self.peek_byte(0) == Some(b'{') => {
                    self.pos += 1;
                    quasis.push(std::mem::take(&mut chunk));
                    let expression_start = self.pos;
                    self.skip_to_template_span_end()?;
                    spans.push(Span::new(expression_start as u32, self.pos as u32));
                    // Past the closing brace.
                    self.pos += 1;
                }
                c => chunk.push(c),
            }
        }
    }

    /// Advance to the `}` closing a `${` span, skipping nested braces and strings.
    fn skip_to_template_span_end(&mut self) -> Result<(), ParseError> {
        let mut depth = 0usize;
        while let Some(b) = self.peek_byte(0) {
            match b {
                b'{' => depth += 1,
                b'}' if depth == 0 => return Ok(()),
                b'}' => depth -= 1,
                b'"' | b'\'' => {
                    self.scan_string(b)?;
                    continue;
                }
                b'`' => {
                    self.scan_template()?;
                    continue;
                }
                _ => {}
            }
            self.pos += 1;
        }
        Err(self.error("unterminated template expression"))
    }
}

fn is_identifier_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$'
}

fn is_identifier_part(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

#[cfg(test)]
#[path = "tests/scanner_tests.rs"]
mod tests;
