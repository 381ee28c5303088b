//! Huff Core crate.
//!
//! Shared vocabulary for every phase of the Huff toolchain:
//!
//! - [`ops`]: the operation model ([`Operation`], [`Macro`], [`JumpTable`])
//! - [`opcodes`]: the EVM mnemonic table and the opcode constants the compiler relies on
//! - [`literal`]: literal minimisation and push-width helpers
//! - [`input_map`]: the normalized source text and its byte index to (file, line) table
//! - [`error`]: the error hierarchy shared by the parser and the compiler

pub mod error;
pub mod ids;
pub mod input_map;
pub mod literal;
pub mod opcodes;
pub mod ops;

pub use error::{
    CompilationError, HuffError, LiteralError, Location, ParseError, ParseErrorKind,
    RegistrationError, SourceError, UnresolvedJump,
};
pub use ids::{FileId, SourceLocation};
pub use input_map::InputMap;
pub use opcodes::OpCode;
pub use ops::{JumpTable, Macro, Operation, OperationKind};
