//! Symbol environment
//!
//! A stack of scope frames. The bottom frame is the universe (primitive types
//! and built-in functions), the one above it holds fields and methods, and
//! every block or method parameter list pushes another. Names that no frame
//! binds are looked up in the host metadata as `Container.Member`.

use std::collections::HashMap;
use std::fmt;

use super::consts::Builtin;
use super::host::{HostMember, HostMetadata, HostMethod};
use super::types::{HostType, Type};
use crate::codegen::{FieldHandle, LocalHandle, MethodHandle, ParamHandle};
use crate::parser::span::Location;

const UNIVERSE: usize = 0;
const FIELDS: usize = 1;

/// A bound name
#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    Type {
        name: String,
        ty: Type,
    },
    Field {
        name: String,
        handle: FieldHandle,
        ty: Type,
    },
    Local {
        name: String,
        handle: LocalHandle,
        ty: Type,
    },
    Param {
        name: String,
        /// Assigned once the method signature has been emitted
        handle: Option<ParamHandle>,
        ty: Type,
        ordinal: usize,
    },
    Method {
        name: String,
        return_type: Type,
        params: Vec<Type>,
        /// Assigned once the method signature has been emitted
        handle: Option<MethodHandle>,
    },
    Function {
        name: String,
        builtin: Builtin,
        return_type: Type,
        params: Vec<Type>,
        variadic: bool,
    },
    ExternalMethod {
        name: String,
        overloads: Vec<HostMethod>,
    },
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Type { name, .. }
            | Symbol::Field { name, .. }
            | Symbol::Local { name, .. }
            | Symbol::Param { name, .. }
            | Symbol::Method { name, .. }
            | Symbol::Function { name, .. }
            | Symbol::ExternalMethod { name, .. } => name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Symbol::Type { .. } => "type",
            Symbol::Field { .. } => "field",
            Symbol::Local { .. } => "local",
            Symbol::Param { .. } => "parameter",
            Symbol::Method { .. } => "method",
            Symbol::Function { .. } => "function",
            Symbol::ExternalMethod { .. } => "external method",
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(
            self,
            Symbol::Method { .. } | Symbol::Function { .. } | Symbol::ExternalMethod { .. }
        )
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let list = |params: &[Type]| params.iter().map(Type::to_string).collect::<Vec<_>>().join(", ");
        match self {
            Symbol::Type { name, ty } => write!(f, "type {} = {}", name, ty),
            Symbol::Field { name, ty, .. } => write!(f, "field {} {}", ty, name),
            Symbol::Local { name, ty, .. } => write!(f, "local {} {}", ty, name),
            Symbol::Param { name, ty, ordinal, .. } => write!(f, "param #{} {} {}", ordinal, ty, name),
            Symbol::Method { name, return_type, params, .. } => {
                write!(f, "method {} {}({})", return_type, name, list(params))
            }
            Symbol::Function { name, return_type, params, variadic, .. } => {
                let rest = if *variadic { ", ..." } else { "" };
                write!(f, "function {} {}({}{})", return_type, name, list(params), rest)
            }
            Symbol::ExternalMethod { name, overloads } => {
                write!(f, "external {} ({} overloads)", name, overloads.len())
            }
        }
    }
}

/// Identifies a frame on the scope stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeHandle(usize);

impl ScopeHandle {
    pub fn depth(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Default)]
struct Frame {
    entries: Vec<(Symbol, Location)>,
    index: HashMap<String, usize>,
}

impl Frame {
    fn insert(&mut self, symbol: Symbol, location: Location) {
        let name = symbol.name().to_string();
        match self.index.get(&name) {
            Some(&slot) => self.entries[slot] = (symbol, location),
            None => {
                self.index.insert(name, self.entries.len());
                self.entries.push((symbol, location));
            }
        }
    }

    fn get(&self, name: &str) -> Option<&(Symbol, Location)> {
        self.index.get(name).map(|&slot| &self.entries[slot])
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        let slot = *self.index.get(name)?;
        Some(&mut self.entries[slot].0)
    }
}

/// Scoped symbol table with host fallback
pub struct SymbolTable {
    frames: Vec<Frame>,
    using: Vec<String>,
    host: Box<dyn HostMetadata>,
}

impl SymbolTable {
    pub fn new(host: Box<dyn HostMetadata>) -> Self {
        Self {
            frames: vec![Frame::default(), Frame::default()],
            using: Vec::new(),
            host,
        }
    }

    pub fn host(&self) -> &dyn HostMetadata {
        self.host.as_ref()
    }

    pub fn add_using_namespace(&mut self, namespace: impl Into<String>) {
        let namespace = namespace.into();
        if !self.using.contains(&namespace) {
            self.using.push(namespace);
        }
    }

    pub fn using_namespaces(&self) -> &[String] {
        &self.using
    }

    pub fn begin_scope(&mut self) -> ScopeHandle {
        self.frames.push(Frame::default());
        ScopeHandle(self.frames.len() - 1)
    }

    /// Pop the innermost frame; the universe and field frames stay
    pub fn end_scope(&mut self) {
        if self.frames.len() <= FIELDS + 1 {
            log::warn!("end_scope with no open block scope ignored");
            return;
        }
        log::trace!("leaving scope\n{}", self);
        self.frames.pop();
    }

    pub fn current_scope(&self) -> ScopeHandle {
        ScopeHandle(self.frames.len() - 1)
    }

    pub fn exists_in_current_scope(&self, name: &str) -> bool {
        self.top().index.contains_key(name)
    }

    /// Where `name` was declared in the innermost frame
    pub fn declared_in_current_scope(&self, name: &str) -> Option<Location> {
        self.top().get(name).map(|(_, location)| *location)
    }

    /// Innermost binding, then the host declaration universe
    pub fn resolve(&self, name: &str) -> Option<Symbol> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name))
            .map(|(symbol, _)| symbol.clone())
            .or_else(|| self.resolve_external(name))
    }

    /// Type-position lookup
    pub fn resolve_type(&self, name: &str) -> Option<Type> {
        let scoped = self.frames.iter().rev().find_map(|frame| frame.get(name));
        match scoped {
            Some((Symbol::Type { ty, .. }, _)) => Some(ty.clone()),
            Some(_) => None,
            None => self.resolve_host_type(name).map(Type::Host),
        }
    }

    fn resolve_host_type(&self, name: &str) -> Option<HostType> {
        self.host.resolve_type(name).or_else(|| {
            self.using
                .iter()
                .find_map(|ns| self.host.resolve_type(&format!("{}.{}", ns, name)))
        })
    }

    fn resolve_external(&self, name: &str) -> Option<Symbol> {
        let (container, member) = name.rsplit_once('.')?;
        if container.is_empty() || member.is_empty() {
            return None;
        }
        let owner = self.resolve_host_type(container)?;
        let symbol = match self.host.resolve_member(&owner, member)? {
            HostMember::Field(field) => Symbol::Field {
                name: name.to_string(),
                handle: FieldHandle::Host { owner: field.owner, name: field.name },
                ty: field.ty,
            },
            HostMember::Methods(overloads) => Symbol::ExternalMethod { name: name.to_string(), overloads },
        };
        log::trace!("{} resolved externally on {}", name, owner.name);
        Some(symbol)
    }

    pub fn add_to_universe(&mut self, symbol: Symbol) {
        self.frames[UNIVERSE].insert(symbol, Location::builtin());
    }

    pub fn add_type(&mut self, name: &str, ty: Type, location: Location) {
        self.top_mut().insert(Symbol::Type { name: name.to_string(), ty }, location);
    }

    pub fn add_field(&mut self, name: &str, handle: FieldHandle, ty: Type, location: Location) {
        self.frames[FIELDS].insert(Symbol::Field { name: name.to_string(), handle, ty }, location);
    }

    pub fn add_local(&mut self, name: &str, handle: LocalHandle, ty: Type, location: Location) {
        self.top_mut().insert(Symbol::Local { name: name.to_string(), handle, ty }, location);
    }

    pub fn add_param(&mut self, name: &str, ordinal: usize, ty: Type, location: Location) {
        let symbol = Symbol::Param { name: name.to_string(), handle: None, ty, ordinal };
        self.top_mut().insert(symbol, location);
    }

    pub fn add_method(&mut self, name: &str, return_type: Type, location: Location) {
        let symbol = Symbol::Method {
            name: name.to_string(),
            return_type,
            params: Vec::new(),
            handle: None,
        };
        self.top_mut().insert(symbol, location);
    }

    /// Binding of `name` in one particular frame
    pub fn symbol_mut(&mut self, scope: ScopeHandle, name: &str) -> Option<&mut Symbol> {
        self.frames.get_mut(scope.0)?.get_mut(name)
    }

    fn top(&self) -> &Frame {
        &self.frames[self.frames.len() - 1]
    }

    fn top_mut(&mut self) -> &mut Frame {
        let top = self.frames.len() - 1;
        &mut self.frames[top]
    }
}

impl fmt::Debug for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymbolTable")
            .field("depth", &self.frames.len())
            .field("using", &self.using)
            .finish()
    }
}

impl fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (depth, frame) in self.frames.iter().enumerate().rev() {
            let title = match depth {
                UNIVERSE => "universe".to_string(),
                FIELDS => "fields".to_string(),
                _ => format!("scope {}", depth),
            };
            writeln!(f, "[{}]", title)?;
            for (symbol, location) in &frame.entries {
                writeln!(f, "  {} @{}", symbol, location)?;
            }
        }
        Ok(())
    }
}
