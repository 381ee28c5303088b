//! Macro expansion.
//!
//! The [`Expander`] turns one macro invocation into an [`ExpansionFrame`]:
//! the flat bytes of the macro with every nested call inlined, their source
//! map, the jump labels defined anywhere inside, the jump references that
//! could not be resolved inside, and the table-start placeholders awaiting
//! the linker.
//!
//! Expansion is a bounded recursion. The expander keeps the chain of
//! invocations currently being expanded; re-entering one with the same
//! template arguments can never terminate and is reported as a cycle.
//! Re-entry with different arguments is allowed and bounded by the depth,
//! expansion-count and output-size limits from [`CompilerOptions`].
//!
//! ## Offsets
//!
//! A frame is expanded knowing its absolute start offset. Jump labels and
//! table instances are recorded with absolute offsets; pending jumps are
//! recorded relative to the frame start so a caller can rebase them after
//! splicing the child's bytes into its own.

mod jumps;

use std::rc::Rc;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::trace;

use huff_core::literal::encode_push_usize;
use huff_core::opcodes::JUMPDEST;
use huff_core::{CompilationError, InputMap, Macro, Operation, OperationKind};
use huff_registry::Registry;

use crate::CompilerOptions;
use crate::bytecode::BytecodeChunk;
use crate::template::{ParameterPatterns, Resolved, resolve_template_argument};

pub use jumps::{JumpIndex, JumpIndices, PendingJump, TableInstance, resolve_jumps};

/// The result of expanding one macro invocation.
#[derive(Debug, Clone, Default)]
pub struct ExpansionFrame {
    /// Absolute offset the frame was expanded at.
    pub start: usize,
    /// Bytes and per-byte source map.
    pub chunk: BytecodeChunk,
    /// Labels defined in this frame and every frame it inlined.
    pub jump_indices: JumpIndices,
    /// Jump references left for an enclosing frame, relative to `start`.
    pub unmatched_jumps: Vec<PendingJump>,
    /// Table-start placeholders, at absolute offsets.
    pub table_instances: Vec<TableInstance>,
}

impl ExpansionFrame {
    fn new(start: usize) -> Self {
        Self {
            start,
            ..Self::default()
        }
    }

    /// Absolute offset of the next byte to be emitted.
    #[inline]
    fn position(&self) -> usize {
        self.start + self.chunk.len()
    }
}

/// Recursive macro expander over a closed registry.
pub struct Expander<'a> {
    registry: &'a Registry,
    input: &'a InputMap,
    options: CompilerOptions,
    /// Invocations currently being expanded, outermost first.
    active: Vec<(Arc<Macro>, Vec<String>)>,
    /// Substitution patterns, built once per templated macro.
    patterns: FxHashMap<String, Rc<ParameterPatterns>>,
    /// Expansions performed so far.
    expansions: usize,
}

impl<'a> Expander<'a> {
    pub fn new(registry: &'a Registry, input: &'a InputMap, options: CompilerOptions) -> Self {
        Self {
            registry,
            input,
            options,
            active: Vec::new(),
            patterns: FxHashMap::default(),
            expansions: 0,
        }
    }

    /// Expansions performed so far, code-size measurements included.
    pub fn expansions(&self) -> usize {
        self.expansions
    }

    /// Expand `name` with template `args`, starting at absolute offset `start`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn expand(
        &mut self,
        name: &str,
        start: usize,
        args: &[String],
    ) -> Result<ExpansionFrame, CompilationError> {
        self.expand_at(name, start, args, None)
    }

    /// Expand a macro reached from the operation at input index `site`.
    fn expand_at(
        &mut self,
        name: &str,
        start: usize,
        args: &[String],
        site: Option<usize>,
    ) -> Result<ExpansionFrame, CompilationError> {
        let input = self.input;
        let location = || site.map(|index| input.location(index));
        let mac = self
            .registry
            .get_macro(name)
            .cloned()
            .ok_or_else(|| CompilationError::UnknownMacro {
                name: name.to_string(),
                location: location(),
            })?;

        if let Some(pos) = self
            .active
            .iter()
            .position(|(m, a)| m.name == mac.name && a.as_slice() == args)
        {
            let mut chain: Vec<String> = self.active[pos..]
                .iter()
                .map(|(m, _)| m.name.clone())
                .collect();
            chain.push(mac.name.clone());
            return Err(CompilationError::MacroCycle { chain });
        }
        if self.active.len() >= self.options.max_depth {
            return Err(CompilationError::RecursionLimit {
                limit: self.options.max_depth,
                name: mac.name.clone(),
            });
        }
        self.expansions += 1;
        if self.expansions > self.options.max_expansions {
            return Err(CompilationError::ExpansionLimit {
                limit: self.options.max_expansions,
            });
        }
        if args.len() != mac.arity() {
            return Err(CompilationError::ArityMismatch {
                name: mac.name.clone(),
                expected: mac.arity(),
                found: args.len(),
                location: location(),
            });
        }

        self.active.push((Arc::clone(&mac), args.to_vec()));
        let result = self.expand_body(&mac, start, args);
        self.active.pop();

        let frame = result?;
        trace!(
            name = %mac.name,
            start,
            len = frame.chunk.len(),
            unmatched = frame.unmatched_jumps.len(),
            "expanded macro"
        );
        Ok(frame)
    }

    fn expand_body(
        &mut self,
        mac: &Macro,
        start: usize,
        args: &[String],
    ) -> Result<ExpansionFrame, CompilationError> {
        let mut frame = ExpansionFrame::new(start);
        let mut pending = Vec::new();

        for (index, op) in mac.ops.iter().enumerate() {
            self.emit(&mut frame, &mut pending, mac, args, index, op)?;

            let size = frame.position();
            if size > self.options.max_output_bytes {
                return Err(CompilationError::OutputLimit {
                    limit: self.options.max_output_bytes,
                    size,
                });
            }
        }

        frame.unmatched_jumps = resolve_jumps(&mut frame.chunk, pending, &frame.jump_indices)?;
        Ok(frame)
    }

    fn emit(
        &mut self,
        frame: &mut ExpansionFrame,
        pending: &mut Vec<PendingJump>,
        mac: &Macro,
        args: &[String],
        index: usize,
        op: &Operation,
    ) -> Result<(), CompilationError> {
        let location = self.input.locate(op.source);

        match &op.kind {
            OperationKind::Opcode(byte) => frame.chunk.write_byte(*byte, location),
            OperationKind::Push { opcode, immediate } => {
                frame.chunk.write_push(*opcode, immediate, location)
            }
            OperationKind::JumpDest(label) => {
                frame.jump_indices.record(
                    label.as_str(),
                    JumpIndex {
                        op_index: index,
                        offset: frame.position(),
                    },
                );
                frame.chunk.write_byte(JUMPDEST, location);
            }
            OperationKind::PushJumpLabel(label) => {
                let slot = frame.chunk.emit_placeholder(location);
                pending.push(PendingJump {
                    label: label.clone(),
                    slot,
                });
            }
            OperationKind::TableStartPosition(table) => {
                let slot = frame.start + frame.chunk.emit_placeholder(location);
                frame.table_instances.push(TableInstance {
                    table: table.clone(),
                    slot,
                });
            }
            OperationKind::MacroCall {
                name,
                args: call_args,
            } => {
                let call_args = self.substitute(mac, call_args, args)?;
                let child =
                    self.expand_at(name, frame.position(), &call_args, Some(op.source))?;
                splice(frame, pending, child);
            }
            OperationKind::TemplateRef(param) => {
                let Some(pos) = mac.template_params.iter().position(|p| p == param) else {
                    return Err(CompilationError::UnknownTemplateParameter {
                        name: mac.name.clone(),
                        param: param.clone(),
                        location: self.input.location(op.source),
                    });
                };
                let resolved =
                    resolve_template_argument(&args[pos], op.source, self.registry, self.input)?;
                match resolved {
                    Resolved::Inline(inline) => {
                        self.emit(frame, pending, mac, args, index, &inline)?
                    }
                    Resolved::Macro {
                        name,
                        args: template_args,
                    } => {
                        let child = self.expand_at(
                            &name,
                            frame.position(),
                            &template_args,
                            Some(op.source),
                        )?;
                        splice(frame, pending, child);
                    }
                }
            }
            OperationKind::CodeSize {
                name,
                args: size_args,
            } => {
                let size_args = self.substitute(mac, size_args, args)?;
                let measured =
                    self.expand_at(name, frame.position(), &size_args, Some(op.source))?;
                let (opcode, immediate) = encode_push_usize(measured.chunk.len());
                frame.chunk.write_push(opcode, &immediate, location);
            }
        }

        Ok(())
    }

    /// Substitute the current frame's template arguments into a nested call's
    /// arguments.
    fn substitute(
        &mut self,
        mac: &Macro,
        call_args: &[String],
        values: &[String],
    ) -> Result<Vec<String>, CompilationError> {
        if mac.arity() == 0 || call_args.is_empty() {
            return Ok(call_args.to_vec());
        }
        let patterns = match self.patterns.get(&mac.name) {
            Some(patterns) => Rc::clone(patterns),
            None => {
                let patterns = Rc::new(ParameterPatterns::for_macro(mac)?);
                self.patterns.insert(mac.name.clone(), Rc::clone(&patterns));
                patterns
            }
        };
        Ok(patterns.substitute_all(call_args, values))
    }
}

/// Append `child` to `frame`, merging its labels and table instances and
/// rebasing its unmatched jumps onto `frame`.
fn splice(frame: &mut ExpansionFrame, pending: &mut Vec<PendingJump>, child: ExpansionFrame) {
    let base = child.start - frame.start;
    pending.extend(child.unmatched_jumps.into_iter().map(|jump| PendingJump {
        label: jump.label,
        slot: base + jump.slot,
    }));
    frame.jump_indices.merge(child.jump_indices);
    frame.table_instances.extend(child.table_instances);
    frame.chunk.append(child.chunk);
}
