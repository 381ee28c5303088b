//! Bytecode buffers.

mod chunk;

pub use chunk::{BytecodeChunk, PLACEHOLDER_SENTINEL};
