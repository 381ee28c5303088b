//! Jump-table linking.
//!
//! Runs once the outermost expansion has no unmatched jumps left. Tables are
//! appended after the main code in declaration order, every table, whether
//! referenced or not. Each entry is the absolute offset of a jump label:
//!
//! - compressed (`jumptable__packed`): 2 bytes, big-endian
//! - uncompressed (`jumptable`): a 32-byte word, the offset in the last two
//!   bytes
//!
//! Table-start placeholders are then patched with their table's offset.
//! Every table offset is known before any placeholder is patched, and
//! patching never changes the length of the bytecode.

use tracing::debug;

use huff_core::{CompilationError, InputMap, JumpTable};
use huff_registry::Registry;

use crate::CompilerOptions;
use crate::bytecode::BytecodeChunk;
use crate::expand::{ExpansionFrame, JumpIndices};
use crate::program::{CompiledProgram, LinkedTable};

/// Appends jump tables to an expanded entry macro.
pub struct Linker<'a> {
    registry: &'a Registry,
    input: &'a InputMap,
    options: CompilerOptions,
}

impl<'a> Linker<'a> {
    pub fn new(registry: &'a Registry, input: &'a InputMap, options: CompilerOptions) -> Self {
        Self {
            registry,
            input,
            options,
        }
    }

    /// Link the outermost expansion frame into the final program.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn link(&self, frame: ExpansionFrame) -> Result<CompiledProgram, CompilationError> {
        let ExpansionFrame {
            mut chunk,
            jump_indices,
            table_instances,
            ..
        } = frame;

        let mut tables = Vec::with_capacity(self.registry.tables().len());
        for table in self.registry.tables() {
            let offset = chunk.len();
            self.append_table(&mut chunk, table, &jump_indices)?;
            debug!(
                table = %table.name,
                offset,
                size = table.size(),
                compressed = table.compressed,
                "linked jump table"
            );
            tables.push(LinkedTable {
                name: table.name.clone(),
                offset,
                size: table.size(),
                compressed: table.compressed,
                labels: table.labels.clone(),
            });
        }

        if chunk.len() > self.options.max_output_bytes {
            return Err(CompilationError::OutputLimit {
                limit: self.options.max_output_bytes,
                size: chunk.len(),
            });
        }

        for instance in &table_instances {
            let Some(table) = tables.iter().find(|t| t.name == instance.table) else {
                return Err(CompilationError::MissingJumpTable {
                    name: instance.table.clone(),
                });
            };
            chunk.patch_placeholder(
                instance.slot,
                table.offset,
                &format!("jump table '{}'", table.name),
            )?;
        }

        let (bytecode, source_map) = chunk.into_parts();
        Ok(CompiledProgram {
            bytecode,
            source_map,
            jump_indices,
            tables,
        })
    }

    fn append_table(
        &self,
        chunk: &mut BytecodeChunk,
        table: &JumpTable,
        jump_indices: &JumpIndices,
    ) -> Result<(), CompilationError> {
        let location = self.input.locate(table.source);
        let padding = [0u8; JumpTable::WORD_ENTRY_SIZE - 2];

        for label in &table.labels {
            let target = jump_indices.offset_of(label).ok_or_else(|| {
                CompilationError::MissingJumpTableLabel {
                    table: table.name.clone(),
                    label: label.clone(),
                }
            })?;
            let target = u16::try_from(target).map_err(|_| CompilationError::OffsetOverflow {
                offset: target,
                what: format!("label '{label}' in jump table '{}'", table.name),
            })?;
            if !table.compressed {
                chunk.write_bytes(&padding, location);
            }
            chunk.write_u16(target, location);
        }
        Ok(())
    }
}
