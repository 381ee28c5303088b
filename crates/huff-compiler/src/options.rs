//! Compiler limits.

/// Default maximum macro nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Default maximum number of macro expansions in one compile.
pub const DEFAULT_MAX_EXPANSIONS: usize = 1_000_000;

/// Default maximum bytecode size (1 MiB).
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 1 << 20;

/// Safety valves for expansion.
///
/// Macro calls are inlined, so a small source can describe an enormous
/// program. Each limit turns runaway growth into a compile error.
///
/// ```
/// use huff_compiler::CompilerOptions;
///
/// let options = CompilerOptions::default()
///     .with_max_depth(32)
///     .with_max_output_bytes(24 * 1024);
/// assert_eq!(options.max_depth, 32);
/// assert_eq!(options.max_expansions, 1_000_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Deepest allowed macro nesting, counting the entry macro as depth 1.
    pub max_depth: usize,
    /// Most macro expansions (calls, template macros and code-size
    /// measurements) in one compile.
    pub max_expansions: usize,
    /// Largest allowed bytecode, jump tables included.
    pub max_output_bytes: usize,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_expansions: DEFAULT_MAX_EXPANSIONS,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        }
    }
}

impl CompilerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = max_expansions;
        self
    }

    pub fn with_max_output_bytes(mut self, max_output_bytes: usize) -> Self {
        self.max_output_bytes = max_output_bytes;
        self
    }
}
