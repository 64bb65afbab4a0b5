//! Error recovery marker for the driver
//!
//! Faults in the source are reported to the diagnostics sink at the point of
//! detection. The offending tokens are then discarded up to and including the
//! next `;`, and the production unwinds with [`Recovered`] until a statement
//! loop catches it and carries on with the next statement.

use std::fmt;

/// A fault was reported and the token stream resynchronised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recovered;

impl fmt::Display for Recovered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "recovered from a reported error")
    }
}

pub type PResult<T> = std::result::Result<T, Recovered>;
