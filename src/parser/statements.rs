//! Statement productions

use super::error::PResult;
use super::lexer::{Keyword, Punct, Token};
use super::parser::{Ctx, Parser};
use crate::common::types::Type;

impl Parser<'_> {
    /// Statement = CompoundSt | IfSt | WhileSt | LoopSt | ReturnSt
    ///           | 'break' ';' | 'continue' ';' | [Expr] ';'
    pub(super) fn statement(&mut self, ctx: Ctx) -> PResult<()> {
        match self.token.token {
            Token::Punct(Punct::LBrace) => self.compound(ctx, true),
            Token::Punct(Punct::Semicolon) => {
                self.advance();
                Ok(())
            }
            Token::Keyword(Keyword::If) => self.if_statement(ctx),
            Token::Keyword(Keyword::While) => self.while_statement(ctx),
            Token::Keyword(Keyword::Loop) => self.loop_statement(ctx),
            Token::Keyword(Keyword::Return) => self.return_statement(),
            Token::Keyword(Keyword::Break) => self.jump_statement(ctx, Keyword::Break),
            Token::Keyword(Keyword::Continue) => self.jump_statement(ctx, Keyword::Continue),
            Token::Keyword(kw @ (Keyword::Else | Keyword::Infinite)) => {
                Err(self.error(format!("'{}' without a matching statement", kw.as_str())))
            }
            _ => self.expression_statement(),
        }
    }

    /// CompoundSt = '{' {VarDecl | Statement} '}'
    ///
    /// A method body passes `open_scope = false`: its parameters' scope is
    /// already the body's scope.
    pub(super) fn compound(&mut self, ctx: Ctx, open_scope: bool) -> PResult<()> {
        self.consume_punct(Punct::LBrace)?;
        if open_scope {
            self.table.begin_scope();
            self.emit.begin_scope();
        }
        let result = self.compound_items(ctx);
        if open_scope {
            self.emit.end_scope();
            self.table.end_scope();
        }
        result
    }

    fn compound_items(&mut self, ctx: Ctx) -> PResult<()> {
        while !self.check_punct(Punct::RBrace) && !self.at_eof() {
            let item = if self.starts_type() {
                self.var_decl()
            } else {
                self.statement(ctx)
            };
            // Resynchronised at the next ';', carry on with the next item
            let _ = item;
        }
        self.consume_punct(Punct::RBrace)
    }

    /// Body of if/while/loop; a failure inside it is already resynchronised
    /// and must not skip the enclosing label bookkeeping
    fn nested_statement(&mut self, ctx: Ctx) {
        let _ = self.statement(ctx);
    }

    // '(' Expr ')' with a boolean Expr
    fn condition(&mut self) -> PResult<()> {
        self.consume_punct(Punct::LParen)?;
        let ty = self.expression()?;
        if ty != Type::Bool {
            return Err(self.error(format!("condition must be bool, found {}", ty)));
        }
        self.consume_punct(Punct::RParen)
    }

    // 'if' '(' Expr ')' Statement ['else' Statement]
    fn if_statement(&mut self, ctx: Ctx) -> PResult<()> {
        self.advance();
        self.condition()?;
        let else_label = self.emit.new_label();
        self.emit.cond_branch(else_label);
        self.nested_statement(ctx);
        if self.match_keyword(Keyword::Else) {
            let end_label = self.emit.new_label();
            self.emit.branch(end_label);
            self.emit.mark_label(else_label);
            self.nested_statement(ctx);
            self.emit.mark_label(end_label);
        } else {
            self.emit.mark_label(else_label);
        }
        Ok(())
    }

    // 'while' '(' Expr ')' Statement
    fn while_statement(&mut self, ctx: Ctx) -> PResult<()> {
        self.advance();
        let continue_label = self.emit.new_label();
        let break_label = self.emit.new_label();
        self.emit.mark_label(continue_label);
        if let Err(recovered) = self.condition() {
            self.emit.mark_label(break_label);
            return Err(recovered);
        }
        self.emit.cond_branch(break_label);
        self.nested_statement(ctx.in_loop(break_label, continue_label));
        self.emit.branch(continue_label);
        self.emit.mark_label(break_label);
        Ok(())
    }

    // 'loop' Statement 'infinite'
    fn loop_statement(&mut self, ctx: Ctx) -> PResult<()> {
        self.advance();
        let continue_label = self.emit.new_label();
        let break_label = self.emit.new_label();
        self.emit.mark_label(continue_label);
        self.nested_statement(ctx.in_loop(break_label, continue_label));
        self.emit.branch(continue_label);
        self.emit.mark_label(break_label);
        if self.match_keyword(Keyword::Infinite) {
            Ok(())
        } else {
            Err(self.error(format!("expected 'infinite' to close 'loop', found {}", self.token.token)))
        }
    }

    // 'return' [Expr] ';'
    fn return_statement(&mut self) -> PResult<()> {
        let location = self.advance().location;
        let return_type = self.emit.current_method_return_type();
        if self.check_punct(Punct::Semicolon) {
            self.emit.ret();
            if !return_type.is_void() {
                return Err(self.error_at(location, format!("missing return value of type {}", return_type)));
            }
            self.advance();
            return Ok(());
        }
        let ty = match self.expression() {
            Ok(ty) => ty,
            Err(recovered) => {
                self.emit.ret();
                return Err(recovered);
            }
        };
        if return_type.is_void() {
            self.emit.ret();
            return Err(self.error_at(location, "a void method cannot return a value"));
        }
        if !return_type.is_assignable_from(&ty) {
            self.emit.ret();
            return Err(self.error(format!("cannot return {} from a method returning {}", ty, return_type)));
        }
        self.emit.assign_cast(&return_type, &ty);
        self.emit.ret();
        self.consume_punct(Punct::Semicolon)
    }

    // 'break' ';' | 'continue' ';'
    fn jump_statement(&mut self, ctx: Ctx, keyword: Keyword) -> PResult<()> {
        let location = self.advance().location;
        let Some(labels) = ctx.loop_labels else {
            return Err(self.error_at(location, format!("'{}' outside of a loop", keyword.as_str())));
        };
        let target = if keyword == Keyword::Break {
            labels.break_label
        } else {
            labels.continue_label
        };
        self.emit.branch(target);
        self.consume_punct(Punct::Semicolon)
    }

    // [Expr] ';'
    fn expression_statement(&mut self) -> PResult<()> {
        let ty = self.expression()?;
        if !ty.is_void() {
            self.emit.pop();
        }
        self.consume_punct(Punct::Semicolon)
    }
}
