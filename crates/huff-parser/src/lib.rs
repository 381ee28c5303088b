//! Huff Parser crate.
//!
//! Front end of the Huff toolchain:
//! - Source flattening: comment stripping and `#include` resolution into one
//!   normalized text plus its [`InputMap`](huff_core::InputMap)
//! - Lexical analysis of macro bodies (priority-ordered token recognizers)
//! - The macro body parser, producing [`Operation`](huff_core::Operation)s
//! - The top-level parser, producing a closed [`Registry`](huff_registry::Registry)
//!
//! # Example
//!
//! ```
//! use huff_core::InputMap;
//! use huff_parser::Parser;
//!
//! let input = InputMap::single(
//!     "main.huff",
//!     "#define macro MAIN = takes(0) returns(0) { 0x01 0x02 add }",
//! );
//! let registry = Parser::parse(&input).unwrap();
//! assert_eq!(registry.get_macro("MAIN").unwrap().ops.len(), 3);
//! ```

pub mod args;
pub mod lexer;
pub mod source;

mod macro_parser;
mod parser;

pub use args::{is_literal_expression, parse_call_target, split_arguments};
pub use lexer::{Lexer, Token, TokenKind};
pub use macro_parser::MacroParser;
pub use parser::Parser;
pub use source::{FsLoader, MemoryLoader, SourceLoader, flatten, strip_comments};
