//! Specific error types for code generation operations

use thiserror::Error;

use super::Label;

pub type CodeGenResult<T> = std::result::Result<T, CodeGenError>;

/// Faults found when a module is finished
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodeGenError {
    #[error("label {label} in method '{method}' was never marked")]
    UnmarkedLabel { method: String, label: Label },
    #[error("label {label} in method '{method}' was marked more than once")]
    LabelMarkedTwice { method: String, label: Label },
    #[error("branch in method '{method}' targets unknown label {label}")]
    UnknownLabel { method: String, label: Label },
    #[error("method '{method}' was never closed")]
    UnclosedMethod { method: String },
    #[error("unbalanced scopes in method '{method}'")]
    UnbalancedScopes { method: String },
}
