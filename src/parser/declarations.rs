//! Declaration productions: locals, fields and methods

use super::error::PResult;
use super::lexer::{Punct, Token};
use super::parser::{Ctx, Parser};
use super::span::Location;
use crate::common::env::{ScopeHandle, Symbol};
use crate::common::types::Type;

impl Parser<'_> {
    /// VarDecl = Type Ident ';'
    pub(super) fn var_decl(&mut self) -> PResult<()> {
        let ty = self.parse_type()?;
        let (name, location) = self.expect_ident("a variable name")?;
        if ty.is_void() {
            return Err(self.error_at(location, format!("variable '{}' cannot be void", name)));
        }
        if self.table.exists_in_current_scope(&name) {
            return Err(self.redeclared("local variable", &name, location));
        }
        self.consume_punct(Punct::Semicolon)?;
        let handle = self.emit.add_local(&name, &ty);
        self.table.add_local(&name, handle, ty, location);
        Ok(())
    }

    /// FieldOrMethodDecl = Type Ident ( ArraySuffix ';' | '(' ParamList ')' Body | ';' )
    pub(super) fn field_or_method_decl(&mut self) -> PResult<()> {
        let ty = self.parse_type()?;
        let (name, location) = self.expect_ident("a field or method name")?;
        if self.check_punct(Punct::LParen) {
            return self.method_decl(ty, name, location);
        }

        let array_size = if self.match_punct(Punct::LBracket) {
            let size = match self.token.token {
                Token::Int(size) if size > 0 => size as u32,
                Token::Int(_) => return Err(self.error("array size must be positive")),
                _ => return Err(self.error(format!("expected array size, found {}", self.token.token))),
            };
            self.advance();
            self.consume_punct(Punct::RBracket)?;
            Some(size)
        } else {
            None
        };

        if ty.is_void() {
            return Err(self.error_at(location, format!("field '{}' cannot be void", name)));
        }
        if self.table.exists_in_current_scope(&name) {
            return Err(self.redeclared("field", &name, location));
        }
        self.consume_punct(Punct::Semicolon)?;

        let ty = match array_size {
            Some(_) => Type::array_of(ty),
            None => ty,
        };
        let handle = self.emit.add_field(&name, &ty, array_size);
        self.table.add_field(&name, handle, ty, location);
        Ok(())
    }

    // '(' ParamList ')' Body
    fn method_decl(&mut self, return_type: Type, name: String, location: Location) -> PResult<()> {
        if self.table.exists_in_current_scope(&name) {
            return Err(self.redeclared("method", &name, location));
        }
        self.advance();
        // Registered before the body so the method can call itself
        let outer = self.table.current_scope();
        self.table.add_method(&name, return_type.clone(), location);
        self.table.begin_scope();
        let result = self.method_signature_and_body(outer, &name, &return_type);
        self.table.end_scope();
        result
    }

    fn method_signature_and_body(
        &mut self,
        outer: ScopeHandle,
        name: &str,
        return_type: &Type,
    ) -> PResult<()> {
        let params = self.param_list()?;
        self.consume_punct(Punct::RParen)?;

        let param_types: Vec<Type> = params.iter().map(|(_, ty)| ty.clone()).collect();
        let handle = self.emit.add_method(name, return_type, &param_types);
        let scope = self.table.current_scope();
        for (index, (param, ty)) in params.iter().enumerate() {
            let param_handle = self.emit.add_param(param, index + 1, ty);
            if let Some(Symbol::Param { handle, .. }) = self.table.symbol_mut(scope, param) {
                *handle = Some(param_handle);
            }
        }
        if let Some(Symbol::Method { params, handle: method_handle, .. }) = self.table.symbol_mut(outer, name) {
            *params = param_types;
            *method_handle = Some(handle);
        }

        let body = if self.check_punct(Punct::LBrace) {
            self.compound(Ctx::default(), false)
        } else {
            Err(self.error(format!("expected method body, found {}", self.token.token)))
        };
        self.emit.end_method();
        body
    }

    // ParamList = [Type Ident {',' Type Ident}]
    fn param_list(&mut self) -> PResult<Vec<(String, Type)>> {
        let mut params = Vec::new();
        if self.check_punct(Punct::RParen) {
            return Ok(params);
        }
        loop {
            let ty = self.parse_type()?;
            let (name, location) = self.expect_ident("a parameter name")?;
            if ty.is_void() {
                return Err(self.error_at(location, format!("parameter '{}' cannot be void", name)));
            }
            if self.table.exists_in_current_scope(&name) {
                return Err(self.redeclared("parameter", &name, location));
            }
            self.table.add_param(&name, params.len() + 1, ty.clone(), location);
            params.push((name, ty));
            if !self.match_punct(Punct::Comma) {
                return Ok(params);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::codegen::{Code, Instr, Storage};
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
    fn scalar_and_array_fields() {
        let (ok, diags, code) = run("int count; double samples[8];");
        assert!(ok, "{}", diags);
        let module = code.finish().unwrap();
        assert_eq!(module.field("count").unwrap().ty, Type::Int);
        let samples = module.field("samples").unwrap();
        assert_eq!(samples.ty, Type::array_of(Type::Double));
        assert_eq!(samples.array_size, Some(8));
    }

    #[test]
    fn void_field_is_an_error() {
        let (ok, diags, code) = run("void nothing;");
        assert!(!ok);
        assert_eq!(diags.error_count(), 1);
        assert!(code.finish().unwrap().fields.is_empty());
    }

    #[test]
    fn method_with_params() {
        let (ok, diags, code) = run("int add(int a, int b) { return a + b; }");
        assert!(ok, "{}", diags);
        let module = code.finish().unwrap();
        let add = module.method("add").unwrap();
        assert_eq!(add.return_type, Type::Int);
        let ordinals: Vec<_> = add.params.iter().map(|p| (p.name.as_str(), p.ordinal)).collect();
        assert_eq!(ordinals, [("a", 1), ("b", 2)]);
        assert!(matches!(add.code[0], Instr::Read(Storage::Param(_))));
        assert_eq!(add.code.last(), Some(&Instr::Ret));
    }

    #[test]
    fn duplicate_parameter_is_an_error() {
        let (ok, diags, _) = run("int f(int a, int a) { }");
        assert!(!ok);
        assert!(diags.error_count() >= 1);
        assert!(diags.iter().next().unwrap().message.contains("parameter 'a'"));
    }

    #[test]
    fn method_body_shares_parameter_scope() {
        let (ok, diags, _) = run("void f(int a) { int a; }");
        assert!(!ok);
        assert_eq!(diags.error_count(), 1);
    }

    #[test]
    fn field_redeclaration_keeps_first() {
        let (ok, diags, code) = run("int g; double g; g = 1;");
        assert!(!ok);
        assert_eq!(diags.error_count(), 1);
        assert_eq!(diags.notes().count(), 1);
        let module = code.finish().unwrap();
        assert_eq!(module.fields.len(), 1);
        assert_eq!(module.fields[0].ty, Type::Int);
    }
}
