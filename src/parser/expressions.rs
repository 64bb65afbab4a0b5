//! Expression productions
//!
//! Each production returns the static type of the value it left on the
//! evaluation stack. Assignments leave nothing and report `void`.

use super::error::{PResult, Recovered};
use super::lexer::{Punct, Token};
use super::parser::Parser;
use super::span::Location;
use crate::codegen::{
    AdditiveOp, CallTarget, IncDec, Literal, MultiplicativeOp, Relation, Storage, UnaryOp,
};
use crate::common::env::Symbol;
use crate::common::types::Type;

/// How a binary operator treats its operand types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OperandRule {
    /// `+ - * /`: int, double, with promotion of a mixed pair
    Arithmetic,
    /// `+` additionally concatenates strings
    ArithmeticOrConcat,
    /// `% & | ^`
    Integral,
    /// `&& ||`
    Logical,
}

impl AdditiveOp {
    fn rule(self) -> OperandRule {
        match self {
            AdditiveOp::Add => OperandRule::ArithmeticOrConcat,
            AdditiveOp::Sub => OperandRule::Arithmetic,
            AdditiveOp::BitOr | AdditiveOp::Xor => OperandRule::Integral,
            AdditiveOp::Or => OperandRule::Logical,
        }
    }
}

impl MultiplicativeOp {
    fn rule(self) -> OperandRule {
        match self {
            MultiplicativeOp::Mul | MultiplicativeOp::Div => OperandRule::Arithmetic,
            MultiplicativeOp::Rem | MultiplicativeOp::BitAnd => OperandRule::Integral,
            MultiplicativeOp::And => OperandRule::Logical,
        }
    }
}

/// Result of checking a binary operation
enum Operation {
    Numeric(Type),
    Concat,
}

impl Parser<'_> {
    /// Expr = AdditiveExpr [RelOp AdditiveExpr]
    pub(super) fn expression(&mut self) -> PResult<Type> {
        let left = self.additive_expr()?;
        let Some(relation) = self.relation() else {
            return Ok(left);
        };
        self.advance();
        let right = self.additive_expr()?;
        if left.is_void() || right.is_void() {
            return Err(self.error(format!("cannot compare {} with {}", left, right)));
        }
        if left != right {
            return Err(self.error(format!("cannot compare {} with {}", left, right)));
        }
        self.emit.condition_op(relation, &left);
        Ok(Type::Bool)
    }

    fn relation(&self) -> Option<Relation> {
        match self.token.token {
            Token::Punct(Punct::Lt) => Some(Relation::Lt),
            Token::Punct(Punct::Le) => Some(Relation::Le),
            Token::Punct(Punct::EqEq) => Some(Relation::Eq),
            Token::Punct(Punct::Ne) => Some(Relation::Ne),
            Token::Punct(Punct::Ge) => Some(Relation::Ge),
            Token::Punct(Punct::Gt) => Some(Relation::Gt),
            _ => None,
        }
    }

    /// AdditiveExpr = ['+' | '-'] MultExpr {AddOp MultExpr}
    fn additive_expr(&mut self) -> PResult<Type> {
        let sign = match self.token.token {
            Token::Punct(Punct::Plus) => Some(false),
            Token::Punct(Punct::Minus) => Some(true),
            _ => None,
        };
        if sign.is_some() {
            self.advance();
        }
        let mut ty = self.multiplicative_expr()?;
        if let Some(negate) = sign {
            if !matches!(ty, Type::Int | Type::Double) {
                return Err(self.error(format!("unary sign needs an int or double operand, found {}", ty)));
            }
            if negate {
                self.emit.unary_op(UnaryOp::Neg, &ty);
            }
        }

        while let Some(op) = self.additive_op() {
            let location = self.advance().location;
            let right = self.multiplicative_expr()?;
            ty = match self.check_operands(op.rule(), location, &ty, &right)? {
                Operation::Concat => {
                    self.emit.concat();
                    Type::String
                }
                Operation::Numeric(result) => {
                    self.emit.additive_op(op, &ty, &right);
                    result
                }
            };
        }
        Ok(ty)
    }

    fn additive_op(&self) -> Option<AdditiveOp> {
        match self.token.token {
            Token::Punct(Punct::Plus) => Some(AdditiveOp::Add),
            Token::Punct(Punct::Minus) => Some(AdditiveOp::Sub),
            Token::Punct(Punct::Pipe) => Some(AdditiveOp::BitOr),
            Token::Punct(Punct::PipePipe) => Some(AdditiveOp::Or),
            Token::Punct(Punct::Caret) => Some(AdditiveOp::Xor),
            _ => None,
        }
    }

    /// MultExpr = SimpleExpr {MulOp SimpleExpr}
    fn multiplicative_expr(&mut self) -> PResult<Type> {
        let mut ty = self.simple_expr()?;
        while let Some(op) = self.multiplicative_op() {
            let location = self.advance().location;
            let right = self.simple_expr()?;
            ty = match self.check_operands(op.rule(), location, &ty, &right)? {
                Operation::Numeric(result) => {
                    self.emit.multiplicative_op(op, &ty, &right);
                    result
                }
                // not produced without ArithmeticOrConcat
                Operation::Concat => Type::String,
            };
        }
        Ok(ty)
    }

    fn multiplicative_op(&self) -> Option<MultiplicativeOp> {
        match self.token.token {
            Token::Punct(Punct::Star) => Some(MultiplicativeOp::Mul),
            Token::Punct(Punct::Slash) => Some(MultiplicativeOp::Div),
            Token::Punct(Punct::Percent) => Some(MultiplicativeOp::Rem),
            Token::Punct(Punct::Amp) => Some(MultiplicativeOp::BitAnd),
            Token::Punct(Punct::AndAnd) => Some(MultiplicativeOp::And),
            _ => None,
        }
    }

    /// Operand typing of binary operators. A mixed int/double pair promotes
    /// to double with exactly one warning at the operator.
    fn check_operands(
        &mut self,
        rule: OperandRule,
        operator: Location,
        left: &Type,
        right: &Type,
    ) -> PResult<Operation> {
        let numeric = matches!(rule, OperandRule::Arithmetic | OperandRule::ArithmeticOrConcat);
        match (left, right) {
            (Type::Void, _) | (_, Type::Void) => {
                Err(self.error(format!("a void value cannot be an operand, found {} and {}", left, right)))
            }
            (Type::String, _) | (_, Type::String) if rule == OperandRule::ArithmeticOrConcat => {
                Ok(Operation::Concat)
            }
            (Type::Int, Type::Int) if rule != OperandRule::Logical => Ok(Operation::Numeric(Type::Int)),
            (Type::Bool, Type::Bool) if rule == OperandRule::Logical => Ok(Operation::Numeric(Type::Bool)),
            (Type::Double, Type::Double) if numeric => Ok(Operation::Numeric(Type::Double)),
            (Type::Int, Type::Double) if numeric => {
                self.warning(operator, "left operand is implicitly converted to double; use an explicit cast");
                Ok(Operation::Numeric(Type::Double))
            }
            (Type::Double, Type::Int) if numeric => {
                self.warning(operator, "right operand is implicitly converted to double; use an explicit cast");
                Ok(Operation::Numeric(Type::Double))
            }
            _ => Err(self.error(format!("incompatible operand types {} and {}", left, right))),
        }
    }

    /// SimpleExpr = [IncDecOp] Location [IncDecOp] | Location '=' Expr
    ///            | Location '(' [Expr {',' Expr}] ')' | '(' Type ')' SimpleExpr
    ///            | '(' Expr ')' | ('-' | '~' | '!') SimpleExpr | Literal
    fn simple_expr(&mut self) -> PResult<Type> {
        if let Some(literal) = self.literal() {
            self.advance();
            let ty = literal.ty();
            self.emit.load_const(&literal);
            return Ok(ty);
        }
        match self.token.token {
            Token::Ident(_) => self.location_expr(IncDec::None),
            Token::Punct(Punct::Inc) | Token::Punct(Punct::Dec) => {
                let mode = if self.check_punct(Punct::Inc) { IncDec::PreInc } else { IncDec::PreDec };
                self.advance();
                if !matches!(self.token.token, Token::Ident(_)) {
                    return Err(self.error(format!("expected a variable, parameter or field, found {}", self.token.token)));
                }
                self.location_expr(mode)
            }
            Token::Punct(Punct::LParen) => {
                self.advance();
                if self.starts_type() {
                    self.cast_expr()
                } else {
                    let ty = self.expression()?;
                    self.consume_punct(Punct::RParen)?;
                    Ok(ty)
                }
            }
            Token::Punct(Punct::Minus) => self.unary_expr(UnaryOp::Neg),
            Token::Punct(Punct::Tilde) => self.unary_expr(UnaryOp::BitNot),
            Token::Punct(Punct::Bang) => self.unary_expr(UnaryOp::Not),
            _ => Err(self.error(format!("expected an expression, found {}", self.token.token))),
        }
    }

    fn literal(&self) -> Option<Literal> {
        match &self.token.token {
            Token::Int(v) => Some(Literal::Int(*v)),
            Token::Double(v) => Some(Literal::Double(*v)),
            Token::Bool(v) => Some(Literal::Bool(*v)),
            Token::Char(c) => Some(Literal::Char(*c)),
            Token::Str(s) => Some(Literal::Str(s.clone())),
            _ => None,
        }
    }

    // '(' Type ')' SimpleExpr, after the '('
    fn cast_expr(&mut self) -> PResult<Type> {
        let to = self.parse_type()?;
        self.consume_punct(Punct::RParen)?;
        let from = self.simple_expr()?;
        if !to.is_castable_from(&from) {
            return Err(self.error(format!("cannot cast {} to {}", from, to)));
        }
        self.emit.cast(&to, &from);
        Ok(to)
    }

    fn unary_expr(&mut self, op: UnaryOp) -> PResult<Type> {
        self.advance();
        let ty = self.simple_expr()?;
        let accepted = match op {
            UnaryOp::Neg => matches!(ty, Type::Int | Type::Double),
            UnaryOp::BitNot => ty == Type::Int,
            UnaryOp::Not => ty == Type::Bool,
        };
        if !accepted {
            return Err(self.error(format!("operator '{}' cannot be applied to {}", op, ty)));
        }
        self.emit.unary_op(op, &ty);
        Ok(ty)
    }

    /// Location = Ident ['[' Expr ']'], followed by a call, an assignment or
    /// an optional postfix increment
    fn location_expr(&mut self, prefix: IncDec) -> PResult<Type> {
        let (name, location) = self.expect_ident("an identifier")?;
        let Some(symbol) = self.table.resolve(&name) else {
            return Err(self.error_at(location, format!("undeclared identifier '{}'", name)));
        };

        let (storage, ty) = match symbol {
            Symbol::Method { .. } | Symbol::Function { .. } | Symbol::ExternalMethod { .. } => {
                if !prefix.is_none() {
                    return Err(self.error_at(location, format!("cannot increment method '{}'", name)));
                }
                return self.call(symbol, location);
            }
            Symbol::Type { .. } => {
                return Err(self.error_at(location, format!("type '{}' used as a value", name)));
            }
            Symbol::Param { handle: None, .. } => {
                return Err(self.error_at(location, format!("parameter '{}' is not available yet", name)));
            }
            Symbol::Field { handle, ty, .. } if self.check_punct(Punct::LBracket) => {
                let Some(element) = ty.element_type().cloned() else {
                    return Err(self.error(format!("'{}' is not an array", name)));
                };
                self.advance();
                self.emit.load_array_base(&handle);
                let index = self.expression()?;
                if index != Type::Int {
                    return Err(self.error(format!("array index must be int, found {}", index)));
                }
                self.consume_punct(Punct::RBracket)?;
                (Storage::Element(handle), element)
            }
            Symbol::Field { handle, ty, .. } => (Storage::Field(handle), ty),
            Symbol::Local { handle, ty, .. } => (Storage::Local(handle), ty),
            Symbol::Param { handle: Some(handle), ty, .. } => (Storage::Param(handle), ty),
        };

        if self.check_punct(Punct::LBracket) {
            return Err(self.error(format!("only array fields can be indexed, '{}' is a {}", name, ty)));
        }

        if prefix.is_none() && self.check_punct(Punct::Assign) {
            self.advance();
            let value = self.expression()?;
            if !ty.is_assignable_from(&value) {
                return Err(self.error(format!("cannot assign {} to '{}' of type {}", value, name, ty)));
            }
            self.emit.assign_cast(&ty, &value);
            self.emit.store(&storage);
            return Ok(Type::Void);
        }

        let mode = match self.token.token {
            Token::Punct(Punct::Inc) | Token::Punct(Punct::Dec) if !prefix.is_none() => {
                return Err(self.error("prefix and postfix increment cannot be combined"));
            }
            Token::Punct(Punct::Inc) => IncDec::PostInc,
            Token::Punct(Punct::Dec) => IncDec::PostDec,
            _ => prefix,
        };
        if matches!(mode, IncDec::PostInc | IncDec::PostDec) {
            self.advance();
        }
        if !mode.is_none() && !ty.is_numeric() {
            return Err(self.error(format!("'{}' of type {} cannot be incremented", name, ty)));
        }

        match &storage {
            Storage::Element(field) if mode.is_none() => self.emit.get_array(field),
            Storage::Element(_) => self.emit.increment(&storage, mode),
            _ => {
                self.emit.read(&storage);
                self.emit.increment(&storage, mode);
            }
        }
        Ok(ty)
    }

    /// Actual argument list of a call; `each` sees every argument type as
    /// soon as its value has been emitted
    fn arguments(
        &mut self,
        mut each: impl FnMut(&mut Self, usize, &Type) -> PResult<()>,
    ) -> PResult<Vec<Type>> {
        self.consume_punct(Punct::LParen)?;
        let mut args = Vec::new();
        if !self.check_punct(Punct::RParen) {
            loop {
                let ty = self.expression()?;
                each(self, args.len(), &ty)?;
                args.push(ty);
                if !self.match_punct(Punct::Comma) {
                    break;
                }
            }
        }
        self.consume_punct(Punct::RParen)?;
        Ok(args)
    }

    fn call(&mut self, symbol: Symbol, location: Location) -> PResult<Type> {
        match symbol {
            Symbol::Method { name, return_type, params, handle } => {
                let args = self.arguments(|parser, index, actual| {
                    parser.pass_argument(&name, params.get(index), index, actual)
                })?;
                let Some(handle) = handle else {
                    return Err(self.error_at(location, format!("method '{}' has no complete signature", name)));
                };
                self.emit.call(&CallTarget::Method(handle));
                if args.len() != params.len() {
                    return Err(self.arity_error(&name, params.len(), args.len(), false));
                }
                Ok(return_type)
            }
            Symbol::Function { name, builtin, return_type, params, variadic } => {
                let args = self.arguments(|parser, index, actual| {
                    parser.pass_argument(&name, params.get(index), index, actual)
                })?;
                self.emit.call(&CallTarget::Intrinsic { builtin, args: args.len() });
                let arity_ok = if variadic {
                    args.len() >= params.len()
                } else {
                    args.len() == params.len()
                };
                if !arity_ok {
                    return Err(self.arity_error(&name, params.len(), args.len(), variadic));
                }
                Ok(return_type)
            }
            Symbol::ExternalMethod { name, overloads } => {
                let args = self.arguments(|_, _, _| Ok(()))?;
                let Some(method) = self.table.host().select_overload(&overloads, &args).cloned() else {
                    let list: Vec<String> = args.iter().map(Type::to_string).collect();
                    return Err(self.error(format!("no overload of '{}' accepts ({})", name, list.join(", "))));
                };
                log::trace!("{} bound to {}.{}{:?}", name, method.owner, method.name, method.params);
                self.emit.call(&CallTarget::External(method.clone()));
                Ok(method.return_type)
            }
            other => Err(self.error_at(location, format!("'{}' is not callable", other.name()))),
        }
    }

    fn pass_argument(&mut self, callee: &str, formal: Option<&Type>, index: usize, actual: &Type) -> PResult<()> {
        let Some(formal) = formal else {
            return Ok(());
        };
        if !formal.is_assignable_from(actual) {
            return Err(self.error(format!(
                "argument {} of '{}' must be {}, found {}",
                index + 1,
                callee,
                formal,
                actual
            )));
        }
        self.emit.assign_cast(formal, actual);
        Ok(())
    }

    fn arity_error(&mut self, callee: &str, expected: usize, found: usize, variadic: bool) -> Recovered {
        let at_least = if variadic { "at least " } else { "" };
        self.error(format!(
            "'{}' expects {}{} arguments, found {}",
            callee, at_least, expected, found
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::codegen::{AdditiveOp, CallTarget, Code, IncDec, Instr, Literal, Storage};
    use crate::common::consts::Builtin;
    use crate::common::diagnostics::{DiagnosticSink, Diagnostics};
    use crate::common::env::SymbolTable;
    use crate::common::host::HostRegistry;
    use crate::common::types::Type;
    use crate::parser::lexer::Scanner;
    use crate::parser::Parser;

    fn run(source: &str) -> (bool, Diagnostics, Code) {
        let mut scanner = Scanner::new(source);
        let mut code = Code::default();
        let mut diags = Diagnostics::default();
        let mut table = SymbolTable::new(Box::new(HostRegistry::standard()));
        let ok = Parser::new(&mut scanner, &mut code, &mut diags, &mut table).parse();
        (ok, diags, code)
    }

    #[test]
    fn int_plus_int_has_no_warning() {
        let (ok, diags, code) = run("{ int a; int b; a = a + b; }");
        assert!(ok, "{}", diags);
        assert_eq!(diags.warning_count(), 0);
        assert!(code.current_code().contains(&Instr::Additive {
            op: AdditiveOp::Add,
            left: Type::Int,
            right: Type::Int
        }));
    }

    #[test]
    fn mixed_operands_warn_once_in_either_order() {
        for source in ["{ int a; double d; d = a + d; }", "{ int a; double d; d = d + a; }"] {
            let (ok, diags, _) = run(source);
            assert!(ok, "{}", diags);
            assert_eq!(diags.warning_count(), 1, "{}", source);
        }
    }

    #[test]
    fn mixed_multiplication_also_promotes() {
        let (ok, diags, _) = run("{ int a; double d; d = a * d; }");
        assert!(ok, "{}", diags);
        assert_eq!(diags.warning_count(), 1);
    }

    #[test]
    fn string_plus_anything_concatenates() {
        let (ok, diags, code) = run(r#"{ string s; s = "n=" + 1; s = 2.5 + s; }"#);
        assert!(ok, "{}", diags);
        let concat = code.current_code().iter().filter(|i| **i == Instr::Concat).count();
        assert_eq!(concat, 2);
        assert!(!code.current_code().iter().any(|i| matches!(i, Instr::Additive { .. })));
    }

    #[test]
    fn string_minus_is_an_error() {
        let (ok, diags, _) = run(r#"{ string s; s = s - 1; }"#);
        assert!(!ok);
        assert_eq!(diags.error_count(), 1);
    }

    #[test]
    fn void_operand_does_not_concatenate() {
        let (ok, diags, code) = run(r#"void f() { } { string s; s = "a" + f(); }"#);
        assert!(!ok);
        assert_eq!(diags.error_count(), 1);
        assert!(!code.current_code().contains(&Instr::Concat));
    }

    #[test]
    fn void_operands_cannot_be_compared() {
        let (ok, diags, code) = run("void f() { } { bool b; b = f() == f(); }");
        assert!(!ok);
        assert_eq!(diags.error_count(), 1);
        assert!(!code.current_code().iter().any(|i| matches!(i, Instr::Compare(..))));
    }

    #[test]
    fn relational_requires_identical_types() {
        let (ok, diags, _) = run("{ int a; double d; bool b; b = a < d; }");
        assert!(!ok);
        assert_eq!(diags.error_count(), 1);
        let (ok, diags, _) = run("{ int a; bool b; b = a <= 3; }");
        assert!(ok, "{}", diags);
    }

    #[test]
    fn logical_and_bitwise_operand_rules() {
        let (ok, _, _) = run("{ bool p; bool q; p = p && q || !q; }");
        assert!(ok);
        let (ok, diags, _) = run("{ int a; a = a & 3 | a ^ 1 % 2; a = ~a; }");
        assert!(ok, "{}", diags);
        let (ok, _, _) = run("{ double d; d = d % 2.0; }");
        assert!(!ok);
        let (ok, _, _) = run("{ int a; bool p; p = a && p; }");
        assert!(!ok);
    }

    #[test]
    fn unary_operand_rules() {
        let (ok, _, _) = run("{ bool p; p = -p; }");
        assert!(!ok);
        let (ok, _, _) = run("{ int a; a = !a; }");
        assert!(!ok);
        let (ok, diags, code) = run("{ int a; a = -a; }");
        assert!(ok, "{}", diags);
        assert!(code.current_code().iter().any(|i| matches!(i, Instr::Unary(..))));
    }

    #[test]
    fn casts() {
        let (ok, diags, code) = run("{ int a; double d; a = (int) d; d = (double) a; }");
        assert!(ok, "{}", diags);
        assert_eq!(code.current_code().iter().filter(|i| matches!(i, Instr::Cast { .. })).count(), 2);
        let (ok, _, _) = run("{ bool b; int a; a = (int) b; }");
        assert!(!ok);
    }

    #[test]
    fn parenthesised_expression_is_not_a_cast() {
        let (ok, diags, _) = run("{ int a; a = (a + 1) * 2; }");
        assert!(ok, "{}", diags);
    }

    #[test]
    fn increments_emit_read_then_inc() {
        let (ok, diags, code) = run("{ int i; i++; ++i; }");
        assert!(ok, "{}", diags);
        let ops: Vec<_> = code
            .current_code()
            .iter()
            .filter(|i| matches!(i, Instr::Read(_) | Instr::Inc(..)))
            .collect();
        assert_eq!(ops.len(), 4);
        assert!(matches!(ops[0], Instr::Read(Storage::Local(_))));
        assert!(matches!(ops[1], Instr::Inc(_, crate::codegen::IncDec::PostInc)));
        assert!(matches!(ops[3], Instr::Inc(_, crate::codegen::IncDec::PreInc)));
    }

    #[test]
    fn increment_of_bool_is_an_error() {
        let (ok, diags, _) = run("{ bool b; b++; }");
        assert!(!ok);
        assert_eq!(diags.error_count(), 1);
    }

    #[test]
    fn array_element_access() {
        let (ok, diags, code) = run("int a[4]; { int i; i = a[2]; a[i]++; a[0] = 7; }");
        assert!(ok, "{}", diags);
        let main = code.current_code();
        assert!(main.iter().any(|i| matches!(i, Instr::LoadArrayBase(_))));
        assert!(main.iter().any(|i| matches!(i, Instr::GetArray(_))));
        assert!(main.iter().any(|i| matches!(i, Instr::Inc(Storage::Element(_), _))));
        assert!(main.iter().any(|i| matches!(i, Instr::Store(Storage::Element(_)))));
    }

    #[test]
    fn element_increment_needs_no_get_array() {
        let (ok, diags, code) = run("int a[4]; { a[1]++; }");
        assert!(ok, "{}", diags);
        let main = code.current_code();
        assert_eq!(main.len(), 4);
        assert!(matches!(main[0], Instr::LoadArrayBase(_)));
        assert_eq!(main[1], Instr::Const(Literal::Int(1)));
        assert!(matches!(main[2], Instr::Inc(Storage::Element(_), IncDec::PostInc)));
        assert_eq!(main[3], Instr::Pop);
    }

    #[test]
    fn indexing_non_arrays_is_an_error() {
        let (ok, _, _) = run("int g; { g[0]; }");
        assert!(!ok);
        let (ok, _, _) = run("{ int x; x[0]; }");
        assert!(!ok);
        let (ok, _, _) = run("int a[2]; { double d; a[d]; }");
        assert!(!ok);
    }

    #[test]
    fn assignment_requires_assignable_value() {
        let (ok, diags, _) = run("{ int x; x = 2.5; }");
        assert!(!ok);
        assert_eq!(diags.error_count(), 1);
    }

    #[test]
    fn undeclared_identifier() {
        let (ok, diags, _) = run("{ y = 1; }");
        assert!(!ok);
        assert!(diags.iter().next().unwrap().message.contains("undeclared identifier 'y'"));
    }

    #[test]
    fn builtins_lower_to_intrinsics() {
        let (ok, diags, code) = run(r#"{ int n; n = abs(-3) + sqr(2); printf("%d %d\n", n, ord('a')); }"#);
        assert!(ok, "{}", diags);
        let intrinsics: Vec<_> = code
            .current_code()
            .iter()
            .filter_map(|i| match i {
                Instr::Call(CallTarget::Intrinsic { builtin, args }) => Some((*builtin, *args)),
                _ => None,
            })
            .collect();
        assert_eq!(
            intrinsics,
            [(Builtin::Abs, 1), (Builtin::Sqr, 1), (Builtin::Ord, 1), (Builtin::Printf, 3)]
        );
    }

    #[test]
    fn builtin_arity_and_argument_types() {
        let (ok, diags, code) = run("{ abs(1, 2); }");
        assert!(!ok);
        assert_eq!(diags.error_count(), 1);
        assert!(code.current_code().iter().any(|i| matches!(i, Instr::Call(_))));
        let (ok, _, _) = run("{ odd(true); }");
        assert!(!ok);
        let (ok, _, _) = run("{ printf(); }");
        assert!(!ok);
    }

    #[test]
    fn external_overload_follows_argument_types() {
        let (ok, diags, code) = run("{ double d; d = System.Math.Abs(2.5); d = System.Math.PI; }");
        assert!(ok, "{}", diags);
        let external: Vec<_> = code
            .current_code()
            .iter()
            .filter_map(|i| match i {
                Instr::Call(CallTarget::External(method)) => Some(method.params.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(external, [vec![Type::Double]]);
    }

    #[test]
    fn external_without_matching_overload() {
        let (ok, diags, _) = run(r#"{ System.Math.Abs("x"); }"#);
        assert!(!ok);
        assert!(diags.iter().next().unwrap().message.contains("no overload"));
    }

    #[test]
    fn literals_load_constants() {
        let (ok, _, code) = run(r#"'c'; "s"; true; 1.5; 7;"#);
        assert!(ok);
        let consts: Vec<_> = code
            .current_code()
            .iter()
            .filter_map(|i| match i {
                Instr::Const(literal) => Some(literal.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            consts,
            [
                Literal::Char('c'),
                Literal::Str("s".into()),
                Literal::Bool(true),
                Literal::Double(1.5),
                Literal::Int(7)
            ]
        );
    }
}
