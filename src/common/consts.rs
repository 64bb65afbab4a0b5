//! Predeclared names of the universe scope

use once_cell::sync::Lazy;

use super::types::Type;

/// Built-in callables, lowered to intrinsic instructions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Abs,
    Sqr,
    Odd,
    Ord,
    Scanf,
    Printf,
}

/// Signature of a built-in function
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltinSignature {
    pub builtin: Builtin,
    pub name: &'static str,
    pub return_type: Type,
    pub params: Vec<Type>,
    /// Accepts any number of trailing arguments after `params`
    pub variadic: bool,
}

impl Builtin {
    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Abs => "abs",
            Builtin::Sqr => "sqr",
            Builtin::Odd => "odd",
            Builtin::Ord => "ord",
            Builtin::Scanf => "scanf",
            Builtin::Printf => "printf",
        }
    }
}

pub static BUILTINS: Lazy<Vec<BuiltinSignature>> = Lazy::new(|| {
    let sig = |builtin: Builtin, return_type, params, variadic| BuiltinSignature {
        builtin,
        name: builtin.name(),
        return_type,
        params,
        variadic,
    };
    vec![
        sig(Builtin::Abs, Type::Int, vec![Type::Int], false),
        sig(Builtin::Sqr, Type::Int, vec![Type::Int], false),
        sig(Builtin::Odd, Type::Bool, vec![Type::Int], false),
        sig(Builtin::Ord, Type::Int, vec![Type::Char], false),
        sig(Builtin::Scanf, Type::Int, vec![Type::String], true),
        sig(Builtin::Printf, Type::Int, vec![Type::String], true),
    ]
});

/// Primitive type names in declaration order, plus `*` for the opaque pointer
pub static PRIMITIVE_TYPES: Lazy<Vec<(&'static str, Type)>> = Lazy::new(|| {
    vec![
        ("int", Type::Int),
        ("bool", Type::Bool),
        ("double", Type::Double),
        ("char", Type::Char),
        ("string", Type::String),
        ("pchar", Type::NativeCharPtr),
        ("void", Type::Void),
        ("*", Type::Pointer),
    ]
});

pub fn primitive_type(name: &str) -> Option<Type> {
    PRIMITIVE_TYPES
        .iter()
        .find(|(primitive, _)| *primitive == name)
        .map(|(_, ty)| ty.clone())
}

/// Name of the synthetic method holding top-level statements
pub const DEFAULT_ENTRY_METHOD: &str = "<main>";
