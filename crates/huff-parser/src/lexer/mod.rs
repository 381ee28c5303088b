//! Lexical analysis for macro bodies.

mod cursor;
#[allow(clippy::module_inception)]
mod lexer;
mod token;

pub use cursor::{Cursor, is_ident, is_ident_continue};
pub use lexer::{Lexer, UnrecognizedInput};
pub use token::{Token, TokenKind};
