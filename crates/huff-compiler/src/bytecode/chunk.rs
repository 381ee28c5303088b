//! Bytecode chunk for one expansion frame.
//!
//! A `BytecodeChunk` holds emitted bytes together with a parallel source map:
//! every byte has exactly one [`SourceLocation`]. Multi-byte writes repeat
//! the location once per byte, so the two vectors always have equal length.

use huff_core::opcodes::PLACEHOLDER_PUSH;
use huff_core::{CompilationError, SourceLocation};

/// Value held by a 2-byte placeholder slot until it is patched.
pub const PLACEHOLDER_SENTINEL: u16 = 0xFFFF;

/// Emitted bytes plus their per-byte source map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BytecodeChunk {
    /// The bytecode.
    code: Vec<u8>,
    /// Source location of each byte (parallel to `code`).
    locations: Vec<SourceLocation>,
}

impl BytecodeChunk {
    /// Create a new empty bytecode chunk.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bytecode chunk with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            code: Vec::with_capacity(capacity),
            locations: Vec::with_capacity(capacity),
        }
    }

    /// Write a single byte (an opcode or an operand byte).
    pub fn write_byte(&mut self, byte: u8, location: SourceLocation) {
        self.code.push(byte);
        self.locations.push(location);
    }

    /// Write a push opcode followed by its immediate bytes.
    pub fn write_push(&mut self, opcode: u8, immediate: &[u8], location: SourceLocation) {
        self.write_byte(opcode, location);
        self.write_bytes(immediate, location);
    }

    /// Write raw bytes sharing one location.
    pub fn write_bytes(&mut self, bytes: &[u8], location: SourceLocation) {
        self.code.extend_from_slice(bytes);
        self.locations
            .extend(std::iter::repeat_n(location, bytes.len()));
    }

    /// Write a 16-bit operand (big-endian).
    pub fn write_u16(&mut self, value: u16, location: SourceLocation) {
        self.write_bytes(&value.to_be_bytes(), location);
    }

    /// Emit `PUSH2 0xFFFF` and return the offset of the 2-byte slot.
    pub fn emit_placeholder(&mut self, location: SourceLocation) -> usize {
        self.write_byte(PLACEHOLDER_PUSH, location);
        let slot = self.code.len();
        self.write_u16(PLACEHOLDER_SENTINEL, location);
        slot
    }

    /// Overwrite the placeholder slot at `slot` with `value`.
    ///
    /// The slot must still hold the sentinel and `value` must fit in two
    /// bytes; `what` names the patched reference for diagnostics.
    pub fn patch_placeholder(
        &mut self,
        slot: usize,
        value: usize,
        what: &str,
    ) -> Result<(), CompilationError> {
        match self.read_u16(slot) {
            Some(PLACEHOLDER_SENTINEL) => {}
            Some(other) => {
                return Err(CompilationError::PlaceholderCorruption {
                    offset: slot,
                    found: other.to_be_bytes(),
                });
            }
            None => {
                let found = [self.read_byte(slot).unwrap_or(0), 0];
                return Err(CompilationError::PlaceholderCorruption { offset: slot, found });
            }
        }
        let value = u16::try_from(value).map_err(|_| CompilationError::OffsetOverflow {
            offset: value,
            what: what.to_string(),
        })?;
        self.code[slot..slot + 2].copy_from_slice(&value.to_be_bytes());
        Ok(())
    }

    /// Append another chunk's bytes and locations.
    pub fn append(&mut self, other: BytecodeChunk) {
        self.code.extend(other.code);
        self.locations.extend(other.locations);
    }

    /// Get the bytecode.
    pub fn code(&self) -> &[u8] {
        &self.code
    }

    /// Get the source map.
    pub fn locations(&self) -> &[SourceLocation] {
        &self.locations
    }

    /// Get the source location for a given offset.
    pub fn location_at(&self, offset: usize) -> Option<SourceLocation> {
        self.locations.get(offset).copied()
    }

    /// Get the length of the bytecode.
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// Check if the chunk is empty.
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Read a byte at the given offset.
    pub fn read_byte(&self, offset: usize) -> Option<u8> {
        self.code.get(offset).copied()
    }

    /// Read a u16 at the given offset (big-endian).
    pub fn read_u16(&self, offset: usize) -> Option<u16> {
        let bytes = self.code.get(offset..offset + 2)?;
        Some(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Split into bytecode and source map.
    pub fn into_parts(self) -> (Vec<u8>, Vec<SourceLocation>) {
        (self.code, self.locations)
    }
}
