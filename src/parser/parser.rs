//! Single-pass parser, analyzer and emitter
//!
//! A recursive descent over the token stream with one token of lookahead.
//! There is no syntax tree: every production checks its operands against the
//! symbol table and drives the backend the moment it recognises a construct.
//! Productions live in `declarations`, `statements` and `expressions`; this
//! file holds the parser state, token helpers and panic-mode recovery.

use super::error::{PResult, Recovered};
use super::lexer::{Keyword, LexicalToken, Punct, Token, TokenStream};
use super::span::Location;
use crate::codegen::{Emit, Label};
use crate::common::consts::{BUILTINS, PRIMITIVE_TYPES};
use crate::common::diagnostics::DiagnosticSink;
use crate::common::env::{Symbol, SymbolTable};
use crate::common::types::Type;

/// Branch targets of the innermost enclosing loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct LoopLabels {
    pub break_label: Label,
    pub continue_label: Label,
}

/// Context handed down the recursive descent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct Ctx {
    pub loop_labels: Option<LoopLabels>,
}

impl Ctx {
    pub fn in_loop(self, break_label: Label, continue_label: Label) -> Self {
        Self { loop_labels: Some(LoopLabels { break_label, continue_label }) }
    }
}

/// Parser over a token stream, wired to a backend, a diagnostics sink and a
/// symbol table
pub struct Parser<'a> {
    scanner: &'a mut dyn TokenStream,
    pub(super) token: LexicalToken,
    pub(super) emit: &'a mut dyn Emit,
    pub(super) diag: &'a mut dyn DiagnosticSink,
    pub(super) table: &'a mut SymbolTable,
}

impl<'a> Parser<'a> {
    /// Create a parser and read the first token
    pub fn new(
        scanner: &'a mut dyn TokenStream,
        emit: &'a mut dyn Emit,
        diag: &'a mut dyn DiagnosticSink,
        table: &'a mut SymbolTable,
    ) -> Self {
        let token = scanner.next_token();
        Self { scanner, token, emit, diag, table }
    }

    /// Parse a whole program.
    ///
    /// Returns true when the input was consumed to end of file and no error
    /// was reported. Warnings do not fail the parse.
    pub fn parse(&mut self) -> bool {
        self.register_builtins();
        while !self.at_eof() {
            // Recovered errors have already been reported
            let _ = self.top_level_item();
        }
        log::trace!("symbol table at end of program\n{}", self.table);
        self.diag.error_count() == 0 && self.at_eof()
    }

    fn register_builtins(&mut self) {
        for (name, ty) in PRIMITIVE_TYPES.iter() {
            if *name != "*" {
                self.table.add_to_universe(Symbol::Type { name: name.to_string(), ty: ty.clone() });
            }
        }
        for builtin in BUILTINS.iter() {
            self.table.add_to_universe(Symbol::Function {
                name: builtin.name.to_string(),
                builtin: builtin.builtin,
                return_type: builtin.return_type.clone(),
                params: builtin.params.clone(),
                variadic: builtin.variadic,
            });
        }
    }

    // Program = {FieldOrMethodDecl | Statement}
    fn top_level_item(&mut self) -> PResult<()> {
        if self.starts_type() {
            self.field_or_method_decl()
        } else if self.starts_statement() {
            self.statement(Ctx::default())
        } else if self.diag.error_count() > 0 && self.check_punct(Punct::RBrace) {
            // Closing brace orphaned by an earlier resynchronisation
            let location = self.token.location;
            let message = format!("skipping {} after earlier errors", self.token.token);
            self.diag.note(location, &message);
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!("unexpected {}", self.token.token)))
        }
    }

    // Token helpers

    pub(super) fn at_eof(&self) -> bool {
        self.token.token.is_eof()
    }

    pub(super) fn advance(&mut self) -> LexicalToken {
        let next = self.scanner.next_token();
        std::mem::replace(&mut self.token, next)
    }

    pub(super) fn check_punct(&self, punct: Punct) -> bool {
        matches!(self.token.token, Token::Punct(p) if p == punct)
    }

    pub(super) fn check_keyword(&self, keyword: Keyword) -> bool {
        matches!(self.token.token, Token::Keyword(k) if k == keyword)
    }

    pub(super) fn match_punct(&mut self, punct: Punct) -> bool {
        if self.check_punct(punct) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(super) fn match_keyword(&mut self, keyword: Keyword) -> bool {
        if self.check_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(super) fn consume_punct(&mut self, punct: Punct) -> PResult<()> {
        if self.match_punct(punct) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{}', found {}", punct.as_str(), self.token.token)))
        }
    }

    pub(super) fn expect_ident(&mut self, what: &str) -> PResult<(String, Location)> {
        if let Token::Ident(name) = &self.token.token {
            let name = name.clone();
            let location = self.advance().location;
            Ok((name, location))
        } else {
            Err(self.error(format!("expected {}, found {}", what, self.token.token)))
        }
    }

    /// `*` or an identifier that names a type in scope or on the host
    pub(super) fn starts_type(&self) -> bool {
        match &self.token.token {
            Token::Punct(Punct::Star) => true,
            Token::Ident(name) => self.table.resolve_type(name).is_some(),
            _ => false,
        }
    }

    pub(super) fn starts_statement(&self) -> bool {
        match &self.token.token {
            Token::Keyword(kw) => !matches!(kw, Keyword::Else | Keyword::Infinite),
            Token::Punct(p) => matches!(
                p,
                Punct::LBrace
                    | Punct::Semicolon
                    | Punct::LParen
                    | Punct::Plus
                    | Punct::Minus
                    | Punct::Tilde
                    | Punct::Bang
                    | Punct::Inc
                    | Punct::Dec
            ),
            Token::Ident(_) => true,
            token => token.is_literal(),
        }
    }

    // Type = Ident-naming-a-type | '*'
    pub(super) fn parse_type(&mut self) -> PResult<Type> {
        if self.match_punct(Punct::Star) {
            return Ok(Type::Pointer);
        }
        if let Token::Ident(name) = &self.token.token {
            if let Some(ty) = self.table.resolve_type(name) {
                self.advance();
                return Ok(ty);
            }
        }
        Err(self.error(format!("expected a type, found {}", self.token.token)))
    }

    // Diagnostics and recovery

    /// Report at the current token and resynchronise
    pub(super) fn error(&mut self, message: impl AsRef<str>) -> Recovered {
        let location = self.token.location;
        self.error_at(location, message)
    }

    /// Report at `location` and resynchronise from the current token
    pub(super) fn error_at(&mut self, location: Location, message: impl AsRef<str>) -> Recovered {
        self.diag.error(location, message.as_ref());
        self.skip_past_semicolon();
        Recovered
    }

    pub(super) fn warning(&mut self, location: Location, message: impl AsRef<str>) {
        self.diag.warning(location, message.as_ref());
    }

    /// Redeclaration in the current scope; the first binding stays
    pub(super) fn redeclared(&mut self, what: &str, name: &str, location: Location) -> Recovered {
        let previous = self.table.declared_in_current_scope(name);
        self.diag.error(location, &format!("{} '{}' is already declared in this scope", what, name));
        if let Some(previous) = previous.filter(|p| *p != Location::builtin()) {
            self.diag.note(previous, &format!("'{}' was first declared here", name));
        }
        self.skip_past_semicolon();
        Recovered
    }

    fn skip_past_semicolon(&mut self) {
        while !self.at_eof() {
            if self.advance().token == Token::Punct(Punct::Semicolon) {
                break;
            }
        }
    }
}
