use thiserror::Error;

use crate::codegen::CodeGenError;
use crate::common::diagnostics::{Diagnostic, Severity};

/// Result type for scsc operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the scsc compiler
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Lexical error: {message}")]
    Lexical { message: String },

    #[error("Compilation failed with {} error(s)", count_errors(.diagnostics))]
    Compile { diagnostics: Vec<Diagnostic> },

    #[error("Code generation error: {0}")]
    CodeGen(#[from] CodeGenError),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

fn count_errors(diagnostics: &[Diagnostic]) -> usize {
    diagnostics.iter().filter(|d| d.severity == Severity::Error).count()
}

impl Error {
    /// Create a lexical error
    pub fn lexical_error(message: impl Into<String>) -> Self {
        Self::Lexical { message: message.into() }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// Diagnostics of a failed compilation, empty for other errors
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Self::Compile { diagnostics } => diagnostics,
            _ => &[],
        }
    }
}
