//! Huff: a macro assembler for EVM bytecode.
//!
//! This crate is the facade over the workspace:
//!
//! - `huff-core`: operations, opcodes, the input map and the error types
//! - `huff-parser`: include flattening, comment stripping and parsing
//! - `huff-registry`: the closed registry of macros and jump tables
//! - `huff-compiler`: macro expansion, jump resolution and table linking
//!
//! Most callers only need [`Unit`] or the one-shot helpers below.
//!
//! ```
//! let program = huff::compile_source(
//!     "main.huff",
//!     "#define macro MAIN = takes(0) returns(0) { here: here jump }",
//!     "MAIN",
//! )?;
//! assert_eq!(program.to_hex(), "5b61000056");
//! # Ok::<(), huff::HuffError>(())
//! ```

mod unit;

use std::path::Path;

pub use unit::Unit;

pub use huff_compiler::{
    CompiledProgram, Compiler, CompilerOptions, ExpansionFrame, Expander, JumpIndex, JumpIndices,
    LinkedTable, Linker,
};
pub use huff_core::{
    CompilationError, FileId, HuffError, InputMap, JumpTable, LiteralError, Location, Macro,
    OpCode, Operation, OperationKind, ParseError, ParseErrorKind, RegistrationError, SourceError,
    SourceLocation, UnresolvedJump,
};
pub use huff_parser::{FsLoader, MemoryLoader, Parser, SourceLoader, flatten, strip_comments};
pub use huff_registry::{CallGraph, Registry};

/// Compile `entry` from a single in-memory source file.
pub fn compile_source(name: &str, text: &str, entry: &str) -> Result<CompiledProgram, HuffError> {
    Unit::from_source(name, text)?.compile(entry)
}

/// Compile `entry` from a file on disk with the given limits.
pub fn compile_file(
    path: impl AsRef<Path>,
    entry: &str,
    options: CompilerOptions,
) -> Result<CompiledProgram, HuffError> {
    Unit::open(path)?.with_options(options).compile(entry)
}
