//! Single-pass compiler core (scsc)
//!
//! Compiles a small procedural language in one pass: the recursive descent
//! parser checks every construct against a scoped symbol table and drives
//! the code generation backend as it goes. There is no syntax tree.
//!
//! ## Architecture
//!
//! - **parser**: token stream (`Scanner`) and the parse/check/emit driver
//! - **common**: types, symbol table, host metadata, diagnostics
//! - **codegen**: the `Emit` backend interface and the in-memory `Code` module
//!
//! ## Compilation Flow
//!
//! ```text
//! Source → Scanner → Parser ──→ Emit (Code) → Module
//!                      │  ↑
//!           Diagnostics   SymbolTable ← HostMetadata
//! ```

pub mod codegen;
pub mod common;
pub mod config;
pub mod error;
pub mod parser;

use std::path::Path;

pub use codegen::Module;
pub use common::diagnostics::Diagnostics;
pub use common::host::{HostMetadata, HostRegistry};
pub use config::Config;
pub use error::{Error, Result};

use codegen::Code;
use common::diagnostics::DiagnosticSink;
use common::env::SymbolTable;
use parser::{Parser, Scanner};

struct Outcome {
    success: bool,
    diagnostics: Diagnostics,
    code: Code,
}

fn run(source: &str, config: &Config, host: Box<dyn HostMetadata>) -> Outcome {
    let mut scanner = Scanner::new(source);
    let mut code = Code::new(&config.entry_method);
    let mut diagnostics = Diagnostics::new(config.max_errors);
    let mut table = SymbolTable::new(host);
    for namespace in &config.using_namespaces {
        table.add_using_namespace(namespace.as_str());
    }
    let success = Parser::new(&mut scanner, &mut code, &mut diagnostics, &mut table).parse();
    log::debug!(
        "parse finished: success={}, {} error(s), {} warning(s)",
        success,
        diagnostics.error_count(),
        diagnostics.warning_count()
    );
    Outcome { success, diagnostics, code }
}

/// Compile source text against the standard host registry
pub fn compile(source: &str, config: &Config) -> Result<Module> {
    compile_with_host(source, config, Box::new(HostRegistry::standard()))
}

/// Compile source text against caller-supplied host metadata
pub fn compile_with_host(source: &str, config: &Config, host: Box<dyn HostMetadata>) -> Result<Module> {
    let outcome = run(source, config, host);
    if !outcome.success {
        return Err(Error::Compile { diagnostics: outcome.diagnostics.into_vec() });
    }
    Ok(outcome.code.finish()?)
}

/// Compile a source file
pub fn compile_file(path: impl AsRef<Path>, config: &Config) -> Result<Module> {
    let path = path.as_ref();
    log::debug!("compiling {}", path.display());
    let bytes = std::fs::read(path)?;
    let source = String::from_utf8(bytes)
        .map_err(|e| Error::lexical_error(format!("{}: not valid UTF-8 ({})", path.display(), e)))?;
    compile(&source, config)
}

/// Run the pass only for its diagnostics, warnings included
pub fn check(source: &str, config: &Config) -> Diagnostics {
    run(source, config, Box::new(HostRegistry::standard())).diagnostics
}
