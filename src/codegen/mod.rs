//! Code generation backend
//!
//! The driver talks to code generation only through [`Emit`]. Every call is
//! made at the moment the construct is recognised, so the order of calls is
//! the order of the source. [`Code`] is the in-memory implementation that
//! collects a [`Module`].

pub mod code;
pub mod error;

use std::fmt;

use crate::common::consts::Builtin;
use crate::common::host::HostMethod;
use crate::common::types::Type;

pub use code::{Code, Instr, Method, Module};
pub use error::{CodeGenError, CodeGenResult};

/// Forward-patchable branch target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(pub u32);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalHandle(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamHandle(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodHandle(pub usize);

/// A field of the module being compiled, or a static field of a host type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldHandle {
    Module(usize),
    Host { owner: String, name: String },
}

impl fmt::Display for FieldHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldHandle::Module(index) => write!(f, "field#{}", index),
            FieldHandle::Host { owner, name } => write!(f, "{}.{}", owner, name),
        }
    }
}

/// Anything a value can be read from or stored into
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Storage {
    Local(LocalHandle),
    Param(ParamHandle),
    Field(FieldHandle),
    /// Element of an array field; base and index are already on the stack
    Element(FieldHandle),
}

/// Increment mode of a location access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IncDec {
    None,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

impl IncDec {
    pub fn is_none(&self) -> bool {
        matches!(self, IncDec::None)
    }
}

/// Constant operand of `load_const`
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i32),
    Double(f64),
    Bool(bool),
    Char(char),
    Str(String),
}

impl Literal {
    pub fn ty(&self) -> Type {
        match self {
            Literal::Int(_) => Type::Int,
            Literal::Double(_) => Type::Double,
            Literal::Bool(_) => Type::Bool,
            Literal::Char(_) => Type::Char,
            Literal::Str(_) => Type::String,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(v) => write!(f, "{}", v),
            Literal::Double(v) => write!(f, "{:?}", v),
            Literal::Bool(v) => write!(f, "{}", v),
            Literal::Char(c) => write!(f, "{:?}", c),
            Literal::Str(s) => write!(f, "{:?}", s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    BitNot,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdditiveOp {
    Add,
    Sub,
    BitOr,
    Or,
    Xor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MultiplicativeOp {
    Mul,
    Div,
    Rem,
    BitAnd,
    And,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Lt,
    Le,
    Eq,
    Ne,
    Ge,
    Gt,
}

macro_rules! op_names {
    ($ty:ty { $($variant:ident => $text:expr),* $(,)? }) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(match self { $(Self::$variant => $text),* })
            }
        }
    };
}

op_names!(UnaryOp { Neg => "neg", BitNot => "not", Not => "lnot" });
op_names!(AdditiveOp { Add => "add", Sub => "sub", BitOr => "or", Or => "lor", Xor => "xor" });
op_names!(MultiplicativeOp { Mul => "mul", Div => "div", Rem => "rem", BitAnd => "and", And => "land" });
op_names!(Relation { Lt => "lt", Le => "le", Eq => "eq", Ne => "ne", Ge => "ge", Gt => "gt" });

/// What a call instruction invokes
#[derive(Debug, Clone, PartialEq)]
pub enum CallTarget {
    Method(MethodHandle),
    External(HostMethod),
    /// Built-in function; `args` is the actual argument count
    Intrinsic { builtin: Builtin, args: usize },
}

/// Emission interface driven by the parser
pub trait Emit {
    fn begin_scope(&mut self);
    fn end_scope(&mut self);

    fn add_local(&mut self, name: &str, ty: &Type) -> LocalHandle;
    fn add_field(&mut self, name: &str, ty: &Type, array_size: Option<u32>) -> FieldHandle;
    /// Start a method body; following emission goes to it until `end_method`
    fn add_method(&mut self, name: &str, return_type: &Type, params: &[Type]) -> MethodHandle;
    /// `ordinal` is the 1-based parameter position
    fn add_param(&mut self, name: &str, ordinal: usize, ty: &Type) -> ParamHandle;
    fn end_method(&mut self);

    fn new_label(&mut self) -> Label;
    fn mark_label(&mut self, label: Label);
    fn branch(&mut self, label: Label);
    /// Branch when the boolean on top of the stack is false
    fn cond_branch(&mut self, label: Label);
    fn ret(&mut self);

    fn load_const(&mut self, literal: &Literal);
    fn read(&mut self, storage: &Storage);
    fn load_array_base(&mut self, field: &FieldHandle);
    fn get_array(&mut self, field: &FieldHandle);
    /// Apply `mode` to the location. For a scalar storage the value was just
    /// produced by `read`; for `Storage::Element` the array base and index are
    /// on the stack and this both updates the element and yields its value
    /// (pre- or post-update as `mode` says), without a prior `get_array`.
    fn increment(&mut self, storage: &Storage, mode: IncDec);
    fn store(&mut self, storage: &Storage);

    fn unary_op(&mut self, op: UnaryOp, operand: &Type);
    fn additive_op(&mut self, op: AdditiveOp, left: &Type, right: &Type);
    fn multiplicative_op(&mut self, op: MultiplicativeOp, left: &Type, right: &Type);
    fn concat(&mut self);
    fn condition_op(&mut self, relation: Relation, operand: &Type);
    fn cast(&mut self, to: &Type, from: &Type);
    /// Bridge between an assignable value and its destination type
    fn assign_cast(&mut self, to: &Type, from: &Type);
    fn pop(&mut self);
    fn call(&mut self, target: &CallTarget);

    fn current_method_return_type(&self) -> Type;
}
