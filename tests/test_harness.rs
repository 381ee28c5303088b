// tests/test_harness.rs
//! Test harness for compiling the Huff fixtures under `test_scripts/`.
#![allow(dead_code)]

use huff::{CompiledProgram, CompilerOptions, HuffError, Unit};
use std::path::PathBuf;

/// Loads fixtures relative to the crate's `test_scripts` directory.
pub struct TestHarness {
    test_scripts_dir: PathBuf,
    options: CompilerOptions,
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHarness {
    pub fn new() -> Self {
        let test_scripts_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_scripts");
        Self {
            test_scripts_dir,
            options: CompilerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompilerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn path(&self, filename: &str) -> PathBuf {
        self.test_scripts_dir.join(filename)
    }

    /// Load and parse a fixture, panicking on failure.
    pub fn load(&self, filename: &str) -> Unit {
        match self.try_load(filename) {
            Ok(unit) => unit,
            Err(err) => panic!("failed to load {filename}: {}", render(&err)),
        }
    }

    pub fn try_load(&self, filename: &str) -> Result<Unit, HuffError> {
        Ok(Unit::open(self.path(filename))?.with_options(self.options))
    }

    /// Compile a fixture's `MAIN`, panicking on failure.
    pub fn compile(&self, filename: &str) -> TestResult {
        let unit = self.load(filename);
        let program = match unit.compile("MAIN") {
            Ok(program) => program,
            Err(err) => panic!("failed to compile {filename}: {}", render(&err)),
        };
        TestResult { unit, program }
    }

    /// Load and compile a fixture's `MAIN`, returning the first error.
    pub fn compile_err(&self, filename: &str) -> HuffError {
        match self.try_load(filename).and_then(|unit| unit.compile("MAIN")) {
            Ok(program) => panic!(
                "expected {filename} to fail, got {} bytes",
                program.len()
            ),
            Err(err) => err,
        }
    }
}

fn render(err: &HuffError) -> String {
    match err {
        HuffError::Parse(parse) => parse.display_with_source(),
        other => other.to_string(),
    }
}

/// A compiled fixture together with the unit it came from.
pub struct TestResult {
    pub unit: Unit,
    pub program: CompiledProgram,
}

impl TestResult {
    pub fn hex(&self) -> String {
        self.program.to_hex()
    }

    /// `file:line` of the byte at `offset`.
    pub fn origin(&self, offset: usize) -> String {
        let location = self
            .program
            .location_at(offset)
            .unwrap_or_else(|| panic!("no byte at offset {offset}"));
        self.unit.describe(location)
    }

    /// Check the patched bytecode: every `PUSH2` in the code section must
    /// point at a `JUMPDEST` or at the start of a linked table, and every
    /// table entry must point at a `JUMPDEST`.
    ///
    /// The fixtures push no two-byte literals, so each `PUSH2` in code is a
    /// label or table reference.
    pub fn assert_labels_land_on_jumpdest(&self) {
        let bytecode = &self.program.bytecode;
        let code_len = self.program.code_len();

        let mut pc = 0;
        while pc < code_len {
            let opcode = bytecode[pc];
            let width = push_width(opcode);
            if opcode == PUSH2 {
                let target = u16::from_be_bytes([bytecode[pc + 1], bytecode[pc + 2]]) as usize;
                assert_ne!(target, 0xffff, "unpatched placeholder at {pc}");
                if target >= code_len {
                    assert!(
                        self.program.tables.iter().any(|t| t.offset == target),
                        "push at {pc} targets {target}, which is no table start"
                    );
                } else {
                    assert_eq!(
                        bytecode[target], JUMPDEST,
                        "push at {pc} targets {target}, which is not a JUMPDEST"
                    );
                }
            }
            pc += 1 + width;
        }

        for table in &self.program.tables {
            let entry_size = if table.compressed { 2 } else { 32 };
            let data = &bytecode[table.offset..table.offset + table.size];
            for (entry, label) in data.chunks(entry_size).zip(&table.labels) {
                let target = u16::from_be_bytes([entry[entry_size - 2], entry[entry_size - 1]]);
                assert_eq!(
                    bytecode[target as usize], JUMPDEST,
                    "entry '{label}' of table '{}' targets {target}, which is not a JUMPDEST",
                    table.name
                );
            }
        }
    }
}

const PUSH1: u8 = 0x60;
const PUSH2: u8 = 0x61;
const PUSH32: u8 = 0x7f;
const JUMPDEST: u8 = 0x5b;

/// Immediate bytes following `opcode`.
fn push_width(opcode: u8) -> usize {
    match opcode {
        PUSH1..=PUSH32 => (opcode - PUSH1) as usize + 1,
        _ => 0,
    }
}
