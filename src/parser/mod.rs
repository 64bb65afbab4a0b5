//! Parser module
//!
//! Lexical analysis and the single-pass parse/check/emit driver.

pub mod error;
pub mod lexer;
#[allow(clippy::module_inception)]
pub mod parser;
pub mod span;

mod declarations;
mod expressions;
mod statements;

pub use error::{PResult, Recovered};
pub use lexer::{Keyword, LexicalToken, Punct, Scanner, Token, TokenStream};
pub use parser::Parser;
pub use span::Location;
