//! Common definitions shared by the parser and the backend
//!
//! Types, the symbol table, host metadata, diagnostics and the predeclared
//! names of the universe scope.

pub mod consts;
pub mod diagnostics;
pub mod env;
pub mod host;
pub mod types;

pub use diagnostics::{Diagnostic, DiagnosticSink, Diagnostics, Severity};
pub use env::{ScopeHandle, Symbol, SymbolTable};
pub use host::{HostField, HostMember, HostMetadata, HostMethod, HostRegistry};
pub use types::{assignable, HostType, Type};
