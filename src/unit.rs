//! Compilation unit API.
//!
//! A [`Unit`] is one flattened, parsed Huff program: the normalized source of
//! the entry file and everything it includes, plus the closed registry of
//! macros and jump tables. Any macro in the unit can then be compiled as an
//! entry point.
//!
//! # Example
//!
//! ```
//! use huff::Unit;
//!
//! let unit = Unit::from_source(
//!     "main.huff",
//!     "#define macro MAIN = takes(0) returns(0) { 0x01 0x02 add }",
//! )?;
//! let program = unit.compile("MAIN")?;
//! assert_eq!(program.to_hex(), "6001600201");
//! # Ok::<(), huff::HuffError>(())
//! ```

use std::path::Path;

use tracing::debug;

use huff_compiler::{CompiledProgram, Compiler, CompilerOptions};
use huff_core::{HuffError, InputMap, SourceLocation};
use huff_parser::{FsLoader, MemoryLoader, Parser, SourceLoader, flatten};
use huff_registry::Registry;

/// A parsed program ready for compilation.
#[derive(Debug)]
pub struct Unit {
    input: InputMap,
    registry: Registry,
    options: CompilerOptions,
}

impl Unit {
    /// Flatten `entry` through `loader` and parse the result.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn load(entry: &str, loader: &impl SourceLoader) -> Result<Self, HuffError> {
        let input = flatten(entry, loader)?;
        let registry = Parser::parse(&input)?;
        debug!(
            entry,
            files = input.file_count(),
            macros = registry.macro_count(),
            tables = registry.tables().len(),
            "loaded unit"
        );
        Ok(Self {
            input,
            registry,
            options: CompilerOptions::default(),
        })
    }

    /// Load a file from disk. Includes resolve relative to its directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, HuffError> {
        let path = path.as_ref();
        let root = path.parent().unwrap_or_else(|| Path::new(""));
        let entry = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::load(&entry, &FsLoader::new(root))
    }

    /// Build a unit from a single in-memory file.
    pub fn from_source(name: &str, text: &str) -> Result<Self, HuffError> {
        Self::load(name, &MemoryLoader::new().with_file(name, text))
    }

    /// Replace the compiler limits used by [`compile`](Self::compile).
    pub fn with_options(mut self, options: CompilerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> CompilerOptions {
        self.options
    }

    pub fn input(&self) -> &InputMap {
        &self.input
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Compile `entry` with no template arguments.
    pub fn compile(&self, entry: &str) -> Result<CompiledProgram, HuffError> {
        self.compile_with(entry, &[])
    }

    /// Compile `entry` with template arguments.
    pub fn compile_with(
        &self,
        entry: &str,
        args: &[String],
    ) -> Result<CompiledProgram, HuffError> {
        let compiler = Compiler::with_options(&self.registry, &self.input, self.options);
        Ok(compiler.compile_with(entry, args)?)
    }

    /// Render a source location as `file:line`.
    pub fn describe(&self, location: SourceLocation) -> String {
        format!("{}:{}", self.input.file_name(location.file), location.line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use huff_core::{CompilationError, ParseErrorKind, SourceError};

    #[test]
    fn compiles_from_memory() {
        let unit = Unit::from_source(
            "main.huff",
            "#define macro MAIN = takes(0) returns(0) { 0x0001 }",
        )
        .unwrap();
        assert_eq!(unit.compile("MAIN").unwrap().to_hex(), "6001");
        assert_eq!(unit.registry().macro_count(), 1);
    }

    #[test]
    fn includes_are_flattened_first() {
        let loader = MemoryLoader::new()
            .with_file("lib.huff", "#define macro ONE = takes(0) returns(1) { 0x01 }\n")
            .with_file(
                "main.huff",
                "#include \"lib.huff\"\n#define macro MAIN = takes(0) returns(0) { ONE() }",
            );
        let unit = Unit::load("main.huff", &loader).unwrap();
        let program = unit.compile("MAIN").unwrap();

        assert_eq!(program.to_hex(), "6001");
        assert_eq!(unit.describe(program.source_map[0]), "lib.huff:1");
    }

    #[test]
    fn errors_keep_their_phase() {
        let missing = Unit::load("main.huff", &MemoryLoader::new()).unwrap_err();
        assert!(matches!(
            missing,
            HuffError::Source(SourceError::IncludeNotFound { .. })
        ));

        let bad = Unit::from_source("main.huff", "#define macro MAIN = takes(0) returns(0) { %% }")
            .unwrap_err();
        assert!(matches!(bad, HuffError::Parse(ref e) if e.kind == ParseErrorKind::UnparseableToken));

        let unit = Unit::from_source("main.huff", "").unwrap();
        assert!(matches!(
            unit.compile("MAIN"),
            Err(HuffError::Compilation(CompilationError::UnknownMacro { .. }))
        ));
    }

    #[test]
    fn options_apply_to_every_compile() {
        let unit = Unit::from_source(
            "main.huff",
            "#define macro MAIN = takes(0) returns(0) { 0x01 0x02 }",
        )
        .unwrap()
        .with_options(CompilerOptions::default().with_max_output_bytes(3));
        assert!(matches!(
            unit.compile("MAIN"),
            Err(HuffError::Compilation(CompilationError::OutputLimit { limit: 3, size: 4 }))
        ));
    }
}
