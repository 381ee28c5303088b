//! Compiled program output.

use huff_core::SourceLocation;
use huff_core::literal::to_hex;

use crate::expand::JumpIndices;

/// A jump table as laid out after the main code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedTable {
    pub name: String,
    /// Absolute offset of the table's first byte.
    pub offset: usize,
    /// Encoded size in bytes.
    pub size: usize,
    pub compressed: bool,
    pub labels: Vec<String>,
}

/// The final, linked output of a compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledProgram {
    /// Main code followed by every jump table.
    pub bytecode: Vec<u8>,
    /// Origin of each byte in `bytecode` (same length).
    pub source_map: Vec<SourceLocation>,
    /// Every jump label with its absolute offset.
    pub jump_indices: JumpIndices,
    /// Jump tables in declaration order.
    pub tables: Vec<LinkedTable>,
}

impl CompiledProgram {
    /// Lowercase hex of the bytecode, without a `0x` prefix.
    pub fn to_hex(&self) -> String {
        to_hex(&self.bytecode)
    }

    pub fn len(&self) -> usize {
        self.bytecode.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytecode.is_empty()
    }

    /// Length of the main code, before any jump table.
    pub fn code_len(&self) -> usize {
        self.tables
            .first()
            .map_or(self.bytecode.len(), |table| table.offset)
    }

    /// Source location of the byte at `offset`.
    pub fn location_at(&self, offset: usize) -> Option<SourceLocation> {
        self.source_map.get(offset).copied()
    }

    /// Absolute offset of `label`'s `JUMPDEST`.
    pub fn jump_offset(&self, label: &str) -> Option<usize> {
        self.jump_indices.offset_of(label)
    }

    pub fn table(&self, name: &str) -> Option<&LinkedTable> {
        self.tables.iter().find(|table| table.name == name)
    }
}
