//! Huff Compiler
//!
//! Turns a parsed [`Registry`] into EVM bytecode.
//!
//! ## Pipeline
//!
//! 1. **Cycle check**: the static call graph reachable from the entry macro
//!    must be acyclic. Expansion is unconditional, so any cycle there is
//!    infinite.
//! 2. **Expansion**: the entry macro is expanded at offset 0, inlining every
//!    nested call and resolving jump labels frame by frame.
//! 3. **Linking**: jump tables are appended and table-start placeholders
//!    patched.
//!
//! ## Modules
//!
//! - [`bytecode`]: byte buffer with a per-byte source map and placeholder patching
//! - [`expand`]: the recursive macro expander and jump bookkeeping
//! - [`link`]: jump-table layout
//! - [`options`]: expansion limits
//! - [`program`]: the compiled output
//! - [`template`]: template argument substitution and literal arithmetic

pub mod bytecode;
pub mod expand;
pub mod link;
pub mod options;
pub mod program;
pub mod template;

pub use expand::{ExpansionFrame, Expander, JumpIndex, JumpIndices};
pub use link::Linker;
pub use options::CompilerOptions;
pub use program::{CompiledProgram, LinkedTable};

// Re-export CompilationError from core for convenience
pub use huff_core::CompilationError;

use tracing::debug;

use huff_core::{InputMap, UnresolvedJump};
use huff_registry::Registry;

/// The main compiler entry point.
///
/// A compiler borrows a closed registry and the input map it was parsed
/// from; it can compile any number of entry macros.
pub struct Compiler<'a> {
    registry: &'a Registry,
    input: &'a InputMap,
    options: CompilerOptions,
}

impl<'a> Compiler<'a> {
    pub fn new(registry: &'a Registry, input: &'a InputMap) -> Self {
        Self::with_options(registry, input, CompilerOptions::default())
    }

    pub fn with_options(
        registry: &'a Registry,
        input: &'a InputMap,
        options: CompilerOptions,
    ) -> Self {
        Self {
            registry,
            input,
            options,
        }
    }

    pub fn options(&self) -> CompilerOptions {
        self.options
    }

    /// Compile `entry`, which must take no template arguments.
    pub fn compile(&self, entry: &str) -> Result<CompiledProgram, CompilationError> {
        self.compile_with(entry, &[])
    }

    /// Compile `entry` with the given template arguments.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile_with(
        &self,
        entry: &str,
        args: &[String],
    ) -> Result<CompiledProgram, CompilationError> {
        if !self.registry.contains_macro(entry) {
            return Err(CompilationError::UnknownMacro {
                name: entry.to_string(),
                location: None,
            });
        }
        if let Some(chain) = self.registry.call_graph().find_cycle(entry) {
            return Err(CompilationError::MacroCycle { chain });
        }

        debug!(entry, args = args.len(), "compiling");

        let mut expander = Expander::new(self.registry, self.input, self.options);
        let frame = expander.expand(entry, 0, args)?;

        if !frame.unmatched_jumps.is_empty() {
            let jumps = frame
                .unmatched_jumps
                .iter()
                .map(|jump| UnresolvedJump {
                    label: jump.label.clone(),
                    // Report the PUSH2, one byte before its slot.
                    offset: jump.slot - 1,
                })
                .collect();
            return Err(CompilationError::UnresolvedJumpLabels {
                entry: entry.to_string(),
                jumps,
            });
        }

        let program = Linker::new(self.registry, self.input, self.options).link(frame)?;
        debug!(
            entry,
            bytes = program.len(),
            tables = program.tables.len(),
            expansions = expander.expansions(),
            "compiled"
        );
        Ok(program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use huff_core::{FileId, SourceLocation};
    use huff_parser::Parser;

    fn compile_with_options(
        source: &str,
        options: CompilerOptions,
    ) -> Result<CompiledProgram, CompilationError> {
        let input = InputMap::single("test.huff", source);
        let registry = Parser::parse(&input).unwrap();
        Compiler::with_options(&registry, &input, options).compile("MAIN")
    }

    fn compile(source: &str) -> Result<CompiledProgram, CompilationError> {
        compile_with_options(source, CompilerOptions::default())
    }

    #[test]
    fn compiles_simple_macro() {
        let program =
            compile("#define macro MAIN = takes(0) returns(0) { 0x01 0x02 add }").unwrap();
        assert_eq!(program.to_hex(), "6001600201");
        assert_eq!(program.source_map.len(), program.len());
        assert!(program.tables.is_empty());
    }

    #[test]
    fn jump_across_macros() {
        let source = "\
#define macro JUMP_OUT = takes(0) returns(0) { done jump }
#define macro MAIN = takes(0) returns(0) {
    JUMP_OUT()
    0x00
    done:
        stop
}";
        let program = compile(source).unwrap();
        assert_eq!(program.to_hex(), "6100065660005b00");
        assert_eq!(program.jump_offset("done"), Some(6));
    }

    #[test]
    fn unresolved_jump_reports_push_offset() {
        let err = compile("#define macro MAIN = takes(0) returns(0) { 0x01 nowhere jump }")
            .unwrap_err();
        assert_eq!(
            err,
            CompilationError::UnresolvedJumpLabels {
                entry: "MAIN".into(),
                jumps: vec![UnresolvedJump {
                    label: "nowhere".into(),
                    offset: 2,
                }],
            }
        );
    }

    #[test]
    fn packed_table_layout() {
        let source = "\
#define jumptable__packed TABLE { a b }
#define macro MAIN = takes(0) returns(0) {
    __tablestart(TABLE) __tablesize(TABLE)
    a: 0x00
    b: stop
}";
        let program = compile(source).unwrap();
        assert_eq!(program.code_len(), 10);
        assert_eq!(program.to_hex(), "61000a60045b60005b0000050008");
        let table = program.table("TABLE").unwrap();
        assert_eq!(table.offset, 10);
        assert_eq!(table.size, 4);
        assert!(table.compressed);
    }

    #[test]
    fn word_table_layout() {
        let source = "\
#define jumptable TABLE { here }
#define macro MAIN = takes(0) returns(0) { here: __tablestart(TABLE) }";
        let program = compile(source).unwrap();
        assert_eq!(program.len(), 4 + 32);
        assert_eq!(&program.bytecode[..4], &[0x5b, 0x61, 0x00, 0x04]);
        assert!(program.bytecode[4..34].iter().all(|b| *b == 0));
        assert_eq!(&program.bytecode[34..], &[0x00, 0x00]);
    }

    #[test]
    fn tables_are_laid_out_in_declaration_order() {
        let source = "\
#define jumptable__packed FIRST { x }
#define jumptable SECOND { x }
#define macro MAIN = takes(0) returns(0) { x: __tablestart(SECOND) }";
        let program = compile(source).unwrap();
        let names: Vec<_> = program.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["FIRST", "SECOND"]);
        assert_eq!(program.table("FIRST").unwrap().offset, 4);
        assert_eq!(program.table("SECOND").unwrap().offset, 6);
        assert_eq!(&program.bytecode[1..4], &[0x61, 0x00, 0x06]);
    }

    #[test]
    fn table_bytes_map_to_the_declaration() {
        let source = "\
#define macro MAIN = takes(0) returns(0) { x: }
#define jumptable__packed T { x }";
        let program = compile(source).unwrap();
        assert_eq!(program.location_at(0), Some(SourceLocation::new(FileId(0), 1)));
        assert_eq!(program.location_at(1), Some(SourceLocation::new(FileId(0), 2)));
        assert_eq!(program.location_at(2), Some(SourceLocation::new(FileId(0), 2)));
        assert_eq!(program.location_at(3), None);
    }

    #[test]
    fn table_label_must_exist() {
        let source = "\
#define jumptable T { missing }
#define macro MAIN = takes(0) returns(0) { stop }";
        assert_eq!(
            compile(source).unwrap_err(),
            CompilationError::MissingJumpTableLabel {
                table: "T".into(),
                label: "missing".into(),
            }
        );
    }

    #[test]
    fn tablestart_of_unknown_table() {
        let err =
            compile("#define macro MAIN = takes(0) returns(0) { __tablestart(NOPE) }").unwrap_err();
        assert_eq!(err, CompilationError::MissingJumpTable { name: "NOPE".into() });
    }

    #[test]
    fn tables_count_towards_output_limit() {
        let source = "\
#define jumptable T { x x x }
#define macro MAIN = takes(0) returns(0) { x: }";
        let options = CompilerOptions::default().with_max_output_bytes(64);
        let err = compile_with_options(source, options).unwrap_err();
        assert_eq!(err, CompilationError::OutputLimit { limit: 64, size: 97 });
    }

    #[test]
    fn static_cycle_is_rejected_before_expansion() {
        // Code-size targets are not checked at parse time, so they can
        // refer forward and close a cycle.
        let source = "\
#define macro A = takes(0) returns(0) { __codesize(B) }
#define macro B = takes(0) returns(0) { A() }
#define macro MAIN = takes(0) returns(0) { B() }";
        match compile(source).unwrap_err() {
            CompilationError::MacroCycle { chain } => {
                assert_eq!(chain.len(), 3);
                assert_eq!(chain.first(), chain.last());
                assert!(chain.contains(&"A".to_string()));
                assert!(chain.contains(&"B".to_string()));
            }
            other => panic!("expected a cycle, got {other:?}"),
        }
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let err = compile("#define macro MAIN = takes(0) returns(0) { __codesize(MAIN) }")
            .unwrap_err();
        assert_eq!(
            err,
            CompilationError::MacroCycle {
                chain: vec!["MAIN".into(), "MAIN".into()],
            }
        );
    }

    #[test]
    fn unknown_entry() {
        let input = InputMap::single("test.huff", "");
        let registry = Parser::parse(&input).unwrap();
        let err = Compiler::new(&registry, &input).compile("MAIN").unwrap_err();
        assert_eq!(
            err,
            CompilationError::UnknownMacro {
                name: "MAIN".into(),
                location: None
            }
        );
        assert_eq!(err.to_string(), "unknown macro 'MAIN'");
    }

    #[test]
    fn templated_entry() {
        let source = "\
template <x>
#define macro MAIN = takes(0) returns(0) { <x> }";
        let input = InputMap::single("test.huff", source);
        let registry = Parser::parse(&input).unwrap();
        let compiler = Compiler::new(&registry, &input);

        let program = compiler.compile_with("MAIN", &["0x2a".into()]).unwrap();
        assert_eq!(program.to_hex(), "602a");
        assert!(matches!(
            compiler.compile("MAIN"),
            Err(CompilationError::ArityMismatch { expected: 1, found: 0, .. })
        ));
    }
}
