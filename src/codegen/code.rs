//! In-memory code buffer
//!
//! `Code` records every backend request as an [`Instr`] in the method that is
//! currently open. Labels are plain indices; a label is resolved when it is
//! marked, and [`Code::finish`] verifies the jump structure before handing out
//! the [`Module`].

use std::fmt;

use super::error::{CodeGenError, CodeGenResult};
use super::{
    AdditiveOp, CallTarget, Emit, FieldHandle, IncDec, Label, Literal, LocalHandle, MethodHandle,
    MultiplicativeOp, ParamHandle, Relation, Storage, UnaryOp,
};
use crate::common::consts::DEFAULT_ENTRY_METHOD;
use crate::common::types::Type;

/// One recorded backend request
#[derive(Debug, Clone, PartialEq)]
pub enum Instr {
    Const(Literal),
    Read(Storage),
    LoadArrayBase(FieldHandle),
    GetArray(FieldHandle),
    Inc(Storage, IncDec),
    Store(Storage),
    Unary(UnaryOp, Type),
    Additive { op: AdditiveOp, left: Type, right: Type },
    Multiplicative { op: MultiplicativeOp, left: Type, right: Type },
    Concat,
    Compare(Relation, Type),
    Cast { to: Type, from: Type },
    AssignCast { to: Type, from: Type },
    Pop,
    Call(CallTarget),
    Branch(Label),
    /// Taken when the condition is false
    BranchFalse(Label),
    Ret,
}

impl Instr {
    pub fn branch_target(&self) -> Option<Label> {
        match self {
            Instr::Branch(label) | Instr::BranchFalse(label) => Some(*label),
            _ => None,
        }
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::Const(literal) => write!(f, "const {}", literal),
            Instr::Read(storage) => write!(f, "read {}", StorageDisplay(storage)),
            Instr::LoadArrayBase(field) => write!(f, "ldbase {}", field),
            Instr::GetArray(field) => write!(f, "ldelem {}", field),
            Instr::Inc(storage, mode) => write!(f, "inc {} {:?}", StorageDisplay(storage), mode),
            Instr::Store(storage) => write!(f, "store {}", StorageDisplay(storage)),
            Instr::Unary(op, ty) => write!(f, "{}.{}", op, ty),
            Instr::Additive { op, left, right } => write!(f, "{} {} {}", op, left, right),
            Instr::Multiplicative { op, left, right } => write!(f, "{} {} {}", op, left, right),
            Instr::Concat => write!(f, "concat"),
            Instr::Compare(relation, ty) => write!(f, "cmp.{} {}", relation, ty),
            Instr::Cast { to, from } => write!(f, "cast {} -> {}", from, to),
            Instr::AssignCast { to, from } => write!(f, "acast {} -> {}", from, to),
            Instr::Pop => write!(f, "pop"),
            Instr::Call(CallTarget::Method(handle)) => write!(f, "call method#{}", handle.0),
            Instr::Call(CallTarget::External(method)) => write!(f, "call {}.{}", method.owner, method.name),
            Instr::Call(CallTarget::Intrinsic { builtin, args }) => {
                write!(f, "intrinsic {}/{}", builtin.name(), args)
            }
            Instr::Branch(label) => write!(f, "br {}", label),
            Instr::BranchFalse(label) => write!(f, "brfalse {}", label),
            Instr::Ret => write!(f, "ret"),
        }
    }
}

struct StorageDisplay<'a>(&'a Storage);

impl fmt::Display for StorageDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Storage::Local(handle) => write!(f, "local#{}", handle.0),
            Storage::Param(handle) => write!(f, "param#{}", handle.0),
            Storage::Field(field) => write!(f, "{}", field),
            Storage::Element(field) => write!(f, "{}[]", field),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: Type,
    pub array_size: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ordinal: usize,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Local {
    pub name: String,
    pub ty: Type,
    /// Block nesting depth at declaration, 0 is the method body
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: String,
    pub return_type: Type,
    pub params: Vec<Param>,
    pub locals: Vec<Local>,
    pub code: Vec<Instr>,
    depth: usize,
    unbalanced: bool,
}

impl Method {
    fn new(name: &str, return_type: Type) -> Self {
        Self {
            name: name.to_string(),
            return_type,
            params: Vec::new(),
            locals: Vec::new(),
            code: Vec::new(),
            depth: 0,
            unbalanced: false,
        }
    }

    pub fn count(&self, pred: impl Fn(&Instr) -> bool) -> usize {
        self.code.iter().filter(|instr| pred(instr)).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LabelState {
    method: usize,
    target: Option<usize>,
    marks: u32,
}

/// Output of a finished compilation
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub fields: Vec<Field>,
    /// The entry method comes first
    pub methods: Vec<Method>,
    labels: Vec<LabelState>,
}

impl Module {
    pub fn entry(&self) -> &Method {
        &self.methods[0]
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    /// Instruction index a label resolves to, in its own method
    pub fn label_target(&self, label: Label) -> Option<usize> {
        self.labels.get(label.0 as usize).and_then(|state| state.target)
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for field in &self.fields {
            match field.array_size {
                Some(size) => writeln!(f, "field {} {}[{}]", field.ty, field.name, size)?,
                None => writeln!(f, "field {} {}", field.ty, field.name)?,
            }
        }
        for (index, method) in self.methods.iter().enumerate() {
            let params: Vec<String> = method.params.iter().map(|p| format!("{} {}", p.ty, p.name)).collect();
            writeln!(f, "method {} {}({})", method.return_type, method.name, params.join(", "))?;
            for local in &method.locals {
                writeln!(f, "  local {} {} @{}", local.ty, local.name, local.depth)?;
            }
            for (pc, instr) in method.code.iter().enumerate() {
                for (id, label) in self.labels.iter().enumerate() {
                    if label.method == index && label.target == Some(pc) {
                        writeln!(f, "L{}:", id)?;
                    }
                }
                writeln!(f, "  {:4}  {}", pc, instr)?;
            }
            for (id, label) in self.labels.iter().enumerate() {
                if label.method == index && label.target == Some(method.code.len()) {
                    writeln!(f, "L{}:", id)?;
                }
            }
        }
        Ok(())
    }
}

/// Recording [`Emit`] implementation
#[derive(Debug, Clone)]
pub struct Code {
    fields: Vec<Field>,
    methods: Vec<Method>,
    labels: Vec<LabelState>,
    current: usize,
}

impl Default for Code {
    fn default() -> Self {
        Self::new(DEFAULT_ENTRY_METHOD)
    }
}

impl Code {
    /// Top-level statements are emitted into a void method named `entry`
    pub fn new(entry: &str) -> Self {
        Self {
            fields: Vec::new(),
            methods: vec![Method::new(entry, Type::Void)],
            labels: Vec::new(),
            current: 0,
        }
    }

    fn method(&mut self) -> &mut Method {
        &mut self.methods[self.current]
    }

    fn emitop(&mut self, instr: Instr) {
        log::trace!("{}: {}", self.methods[self.current].name, instr);
        self.method().code.push(instr);
    }

    /// Instructions emitted so far into the open method
    pub fn current_code(&self) -> &[Instr] {
        &self.methods[self.current].code
    }

    /// Verify labels and scopes and produce the module
    pub fn finish(self) -> CodeGenResult<Module> {
        if self.current != 0 {
            return Err(CodeGenError::UnclosedMethod {
                method: self.methods[self.current].name.clone(),
            });
        }
        if let Some(method) = self.methods.iter().find(|m| m.depth != 0 || m.unbalanced) {
            return Err(CodeGenError::UnbalancedScopes { method: method.name.clone() });
        }
        for (id, state) in self.labels.iter().enumerate() {
            let label = Label(id as u32);
            let method = self.methods[state.method].name.clone();
            match state.marks {
                0 => return Err(CodeGenError::UnmarkedLabel { method, label }),
                1 => {}
                _ => return Err(CodeGenError::LabelMarkedTwice { method, label }),
            }
        }
        for (index, method) in self.methods.iter().enumerate() {
            for target in method.code.iter().filter_map(Instr::branch_target) {
                let known = self
                    .labels
                    .get(target.0 as usize)
                    .map_or(false, |state| state.method == index);
                if !known {
                    return Err(CodeGenError::UnknownLabel { method: method.name.clone(), label: target });
                }
            }
        }
        log::debug!(
            "module finished: {} fields, {} methods, {} labels",
            self.fields.len(),
            self.methods.len(),
            self.labels.len()
        );
        Ok(Module { fields: self.fields, methods: self.methods, labels: self.labels })
    }
}

impl Emit for Code {
    fn begin_scope(&mut self) {
        self.method().depth += 1;
    }

    fn end_scope(&mut self) {
        let method = self.method();
        if method.depth == 0 {
            log::warn!("end_scope without begin_scope in '{}'", method.name);
            method.unbalanced = true;
        } else {
            method.depth -= 1;
        }
    }

    fn add_local(&mut self, name: &str, ty: &Type) -> LocalHandle {
        let method = self.method();
        let depth = method.depth;
        method.locals.push(Local { name: name.to_string(), ty: ty.clone(), depth });
        LocalHandle(method.locals.len() - 1)
    }

    fn add_field(&mut self, name: &str, ty: &Type, array_size: Option<u32>) -> FieldHandle {
        self.fields.push(Field { name: name.to_string(), ty: ty.clone(), array_size });
        FieldHandle::Module(self.fields.len() - 1)
    }

    fn add_method(&mut self, name: &str, return_type: &Type, params: &[Type]) -> MethodHandle {
        if self.current != 0 {
            log::warn!("method '{}' opened inside '{}'", name, self.methods[self.current].name);
        }
        log::debug!("method {} {}({} params)", return_type, name, params.len());
        self.methods.push(Method::new(name, return_type.clone()));
        self.current = self.methods.len() - 1;
        MethodHandle(self.current)
    }

    fn add_param(&mut self, name: &str, ordinal: usize, ty: &Type) -> ParamHandle {
        let method = self.method();
        method.params.push(Param { name: name.to_string(), ordinal, ty: ty.clone() });
        ParamHandle(method.params.len() - 1)
    }

    fn end_method(&mut self) {
        self.current = 0;
    }

    fn new_label(&mut self) -> Label {
        self.labels.push(LabelState { method: self.current, target: None, marks: 0 });
        Label(self.labels.len() as u32 - 1)
    }

    fn mark_label(&mut self, label: Label) {
        let pc = self.methods[self.current].code.len();
        match self.labels.get_mut(label.0 as usize) {
            Some(state) => {
                state.marks += 1;
                if state.target.is_none() {
                    state.target = Some(pc);
                }
            }
            None => log::warn!("mark of unknown label {}", label),
        }
    }

    fn branch(&mut self, label: Label) {
        self.emitop(Instr::Branch(label));
    }

    fn cond_branch(&mut self, label: Label) {
        self.emitop(Instr::BranchFalse(label));
    }

    fn ret(&mut self) {
        self.emitop(Instr::Ret);
    }

    fn load_const(&mut self, literal: &Literal) {
        self.emitop(Instr::Const(literal.clone()));
    }

    fn read(&mut self, storage: &Storage) {
        self.emitop(Instr::Read(storage.clone()));
    }

    fn load_array_base(&mut self, field: &FieldHandle) {
        self.emitop(Instr::LoadArrayBase(field.clone()));
    }

    fn get_array(&mut self, field: &FieldHandle) {
        self.emitop(Instr::GetArray(field.clone()));
    }

    fn increment(&mut self, storage: &Storage, mode: IncDec) {
        if !mode.is_none() {
            self.emitop(Instr::Inc(storage.clone(), mode));
        }
    }

    fn store(&mut self, storage: &Storage) {
        self.emitop(Instr::Store(storage.clone()));
    }

    fn unary_op(&mut self, op: UnaryOp, operand: &Type) {
        self.emitop(Instr::Unary(op, operand.clone()));
    }

    fn additive_op(&mut self, op: AdditiveOp, left: &Type, right: &Type) {
        self.emitop(Instr::Additive { op, left: left.clone(), right: right.clone() });
    }

    fn multiplicative_op(&mut self, op: MultiplicativeOp, left: &Type, right: &Type) {
        self.emitop(Instr::Multiplicative { op, left: left.clone(), right: right.clone() });
    }

    fn concat(&mut self) {
        self.emitop(Instr::Concat);
    }

    fn condition_op(&mut self, relation: Relation, operand: &Type) {
        self.emitop(Instr::Compare(relation, operand.clone()));
    }

    fn cast(&mut self, to: &Type, from: &Type) {
        self.emitop(Instr::Cast { to: to.clone(), from: from.clone() });
    }

    fn assign_cast(&mut self, to: &Type, from: &Type) {
        if to != from {
            self.emitop(Instr::AssignCast { to: to.clone(), from: from.clone() });
        }
    }

    fn pop(&mut self) {
        self.emitop(Instr::Pop);
    }

    fn call(&mut self, target: &CallTarget) {
        self.emitop(Instr::Call(target.clone()));
    }

    fn current_method_return_type(&self) -> Type {
        self.methods[self.current].return_type.clone()
    }
}
