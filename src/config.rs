//! Compiler configuration

use crate::common::consts::DEFAULT_ENTRY_METHOD;
use crate::common::diagnostics::DEFAULT_MAX_ERRORS;
use crate::error::{Error, Result};

/// Comma separated namespaces searched for unqualified host names
pub const ENV_USING: &str = "SCSC_USING";
/// Error cap of the diagnostics collector
pub const ENV_MAX_ERRORS: &str = "SCSC_MAX_ERRORS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Namespaces tried as prefixes when resolving host names
    pub using_namespaces: Vec<String>,
    /// Errors past this count are counted but not recorded
    pub max_errors: usize,
    /// Name of the method that receives top-level statements
    pub entry_method: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            using_namespaces: Vec::new(),
            max_errors: DEFAULT_MAX_ERRORS,
            entry_method: DEFAULT_ENTRY_METHOD.to_string(),
        }
    }
}

impl Config {
    /// Defaults overridden by `SCSC_USING` and `SCSC_MAX_ERRORS`
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(using) = std::env::var(ENV_USING) {
            for namespace in using.split(',').map(str::trim).filter(|ns| !ns.is_empty()) {
                config = config.with_using_namespace(namespace);
            }
        }
        if let Ok(max) = std::env::var(ENV_MAX_ERRORS) {
            let max = max
                .trim()
                .parse()
                .map_err(|_| Error::config_error(format!("{} must be a number, got '{}'", ENV_MAX_ERRORS, max)))?;
            config = config.with_max_errors(max);
        }
        log::debug!("configuration: {:?}", config);
        Ok(config)
    }

    pub fn with_using_namespace(mut self, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        if !self.using_namespaces.contains(&namespace) {
            self.using_namespaces.push(namespace);
        }
        self
    }

    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors;
        self
    }

    pub fn with_entry_method(mut self, name: impl Into<String>) -> Self {
        self.entry_method = name.into();
        self
    }
}
