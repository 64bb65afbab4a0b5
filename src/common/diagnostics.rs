//! Diagnostics sink
//!
//! The driver never turns a source fault into a Rust error. It records an
//! error, warning or note here and keeps going; the running error count
//! decides success at the end.

use std::fmt;

use crate::parser::span::Location;

/// Default cap on recorded errors
pub const DEFAULT_MAX_ERRORS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Note,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Note => write!(f, "note"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub location: Location,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.location, self.severity, self.message)
    }
}

/// Receiver for everything the driver reports
pub trait DiagnosticSink {
    fn error(&mut self, location: Location, message: &str);
    fn warning(&mut self, location: Location, message: &str);
    fn note(&mut self, location: Location, message: &str);
    fn error_count(&self) -> usize;
}

/// Collecting sink
#[derive(Debug, Clone)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
    errors: usize,
    max_errors: usize,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ERRORS)
    }
}

impl Diagnostics {
    /// Errors past `max_errors` are counted but not stored
    pub fn new(max_errors: usize) -> Self {
        Self { items: Vec::new(), errors: 0, max_errors }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.of(Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.of(Severity::Warning)
    }

    pub fn notes(&self) -> impl Iterator<Item = &Diagnostic> {
        self.of(Severity::Note)
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }

    fn of(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(move |d| d.severity == severity)
    }

    fn push(&mut self, severity: Severity, location: Location, message: &str) {
        match severity {
            Severity::Error => log::debug!("{}: error: {}", location, message),
            Severity::Warning => log::debug!("{}: warning: {}", location, message),
            Severity::Note => log::trace!("{}: note: {}", location, message),
        }
        if severity == Severity::Error {
            self.errors += 1;
            if self.errors > self.max_errors {
                if self.errors == self.max_errors + 1 {
                    log::warn!("more than {} errors, further errors are not recorded", self.max_errors);
                }
                return;
            }
        }
        self.items.push(Diagnostic { severity, location, message: message.to_string() });
    }
}

impl DiagnosticSink for Diagnostics {
    fn error(&mut self, location: Location, message: &str) {
        self.push(Severity::Error, location, message);
    }

    fn warning(&mut self, location: Location, message: &str) {
        self.push(Severity::Warning, location, message);
    }

    fn note(&mut self, location: Location, message: &str) {
        self.push(Severity::Note, location, message);
    }

    fn error_count(&self) -> usize {
        self.errors
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in &self.items {
            writeln!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_severity() {
        let mut diags = Diagnostics::default();
        diags.error(Location::new(1, 2, 1), "bad");
        diags.warning(Location::new(2, 1, 5), "meh");
        diags.note(Location::new(3, 1, 9), "fyi");
        assert_eq!(diags.error_count(), 1);
        assert_eq!(diags.warning_count(), 1);
        assert_eq!(diags.notes().count(), 1);
        assert_eq!(diags.to_string(), "1:2: error: bad\n2:1: warning: meh\n3:1: note: fyi\n");
    }

    #[test]
    fn errors_past_cap_are_counted_not_stored() {
        let mut diags = Diagnostics::new(2);
        for _ in 0..5 {
            diags.error(Location::start(), "x");
        }
        assert_eq!(diags.error_count(), 5);
        assert_eq!(diags.errors().count(), 2);
    }
}
