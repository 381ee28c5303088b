//! Jump label bookkeeping for expansion frames.
//!
//! Labels resolve against the frame that defines them or any frame that
//! encloses it. A reference with no matching label in its own frame is
//! re-expressed relative to that frame's start and handed to the caller.

use rustc_hash::FxHashMap;

use huff_core::CompilationError;

use crate::bytecode::BytecodeChunk;

/// Where a jump label was defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpIndex {
    /// Index of the `JumpDest` operation within its defining macro.
    pub op_index: usize,
    /// Absolute byte offset of the `JUMPDEST` opcode.
    pub offset: usize,
}

/// Label -> definition table, merged upward through the frames.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JumpIndices {
    labels: FxHashMap<String, JumpIndex>,
}

impl JumpIndices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a definition; a later definition of the same label wins.
    pub fn record(&mut self, label: impl Into<String>, index: JumpIndex) {
        self.labels.insert(label.into(), index);
    }

    /// Merge another frame's labels; its entries win on conflict.
    pub fn merge(&mut self, other: JumpIndices) {
        self.labels.extend(other.labels);
    }

    pub fn get(&self, label: &str) -> Option<JumpIndex> {
        self.labels.get(label).copied()
    }

    /// Absolute offset of `label`'s `JUMPDEST`.
    pub fn offset_of(&self, label: &str) -> Option<usize> {
        self.get(label).map(|index| index.offset)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// All labels ordered by offset, then name.
    pub fn sorted(&self) -> Vec<(&str, JumpIndex)> {
        let mut entries: Vec<_> = self
            .labels
            .iter()
            .map(|(label, index)| (label.as_str(), *index))
            .collect();
        entries.sort_by(|a, b| a.1.offset.cmp(&b.1.offset).then(a.0.cmp(b.0)));
        entries
    }
}

/// A jump placeholder waiting for its label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingJump {
    pub label: String,
    /// Offset of the 2-byte slot, relative to the owning frame's start.
    pub slot: usize,
}

/// A table-start placeholder waiting for the linker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInstance {
    pub table: String,
    /// Absolute offset of the 2-byte slot.
    pub slot: usize,
}

/// Patch every pending jump whose label is in `indices`.
///
/// Returns the jumps that are still unmatched, in their original order.
pub fn resolve_jumps(
    chunk: &mut BytecodeChunk,
    pending: Vec<PendingJump>,
    indices: &JumpIndices,
) -> Result<Vec<PendingJump>, CompilationError> {
    let mut unmatched = Vec::new();
    for jump in pending {
        match indices.offset_of(&jump.label) {
            Some(target) => {
                chunk.patch_placeholder(jump.slot, target, &format!("jump label '{}'", jump.label))?
            }
            None => unmatched.push(jump),
        }
    }
    Ok(unmatched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use huff_core::SourceLocation;

    #[test]
    fn later_definitions_win() {
        let mut indices = JumpIndices::new();
        indices.record("a", JumpIndex { op_index: 0, offset: 1 });
        let mut child = JumpIndices::new();
        child.record("a", JumpIndex { op_index: 3, offset: 9 });
        child.record("b", JumpIndex { op_index: 4, offset: 4 });
        indices.merge(child);

        assert_eq!(indices.offset_of("a"), Some(9));
        assert_eq!(indices.len(), 2);
        let sorted: Vec<_> = indices.sorted().into_iter().map(|(l, _)| l).collect();
        assert_eq!(sorted, vec!["b", "a"]);
    }

    #[test]
    fn resolve_patches_known_and_keeps_unknown() {
        let mut chunk = BytecodeChunk::new();
        let known = chunk.emit_placeholder(SourceLocation::default());
        let unknown = chunk.emit_placeholder(SourceLocation::default());
        let mut indices = JumpIndices::new();
        indices.record("here", JumpIndex { op_index: 0, offset: 0x42 });

        let pending = vec![
            PendingJump { label: "here".into(), slot: known },
            PendingJump { label: "later".into(), slot: unknown },
        ];
        let unmatched = resolve_jumps(&mut chunk, pending, &indices).unwrap();

        assert_eq!(chunk.read_u16(known), Some(0x42));
        assert_eq!(chunk.read_u16(unknown), Some(0xFFFF));
        assert_eq!(
            unmatched,
            vec![PendingJump { label: "later".into(), slot: unknown }]
        );
    }
}
