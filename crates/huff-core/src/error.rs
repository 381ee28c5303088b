//! Unified error types for the Huff toolchain.
//!
//! ## Error Hierarchy
//!
//! ```text
//! HuffError (top-level wrapper)
//! ├── SourceError       - Reading files, stripping comments, flattening includes
//! ├── ParseError        - Top-level and macro body parsing (with ParseErrorKind)
//! └── CompilationError  - Macro expansion and jump-table linking
//! ```
//!
//! Every error is fatal: compilation stops at the first one.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

// ============================================================================
// Locations
// ============================================================================

/// A printable source position: file name, line number and the line's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// File name as given to the input map.
    pub file: String,
    /// Line number (1-indexed).
    pub line: u32,
    /// Text of the offending line, trailing whitespace removed.
    pub text: String,
}

impl Location {
    pub fn new(file: impl Into<String>, line: u32, text: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            text: text.into(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

// ============================================================================
// Source Errors
// ============================================================================

/// Errors raised while loading and flattening source files.
#[derive(Debug, Error)]
pub enum SourceError {
    /// A file could not be read from disk.
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An included file is not known to the loader.
    #[error("cannot find included file '{path}' (included from '{from}')")]
    IncludeNotFound { path: String, from: String },

    /// A `/*` comment has no closing `*/`.
    #[error("unterminated block comment in '{file}' at line {line}")]
    UnterminatedComment { file: String, line: u32 },
}

// ============================================================================
// Literal Errors
// ============================================================================

/// Problems turning a numeric value into a push immediate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiteralError {
    /// The value needs more than 32 immediate bytes.
    #[error("value needs {bytes} bytes, a push carries at most 32")]
    TooWide { bytes: usize },

    /// Subtraction produced a negative value.
    #[error("arithmetic result is negative")]
    Negative,

    /// The text is not a hex literal, decimal literal or constant macro.
    #[error("not a literal")]
    NotALiteral,

    /// A macro used as an operand is not a single constant push.
    #[error("macro '{0}' is not a single constant push")]
    NotConstant(String),
}

// ============================================================================
// Parse Errors
// ============================================================================

/// Categories of parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// No macro body rule matches the remaining input.
    UnparseableToken,
    /// A jump label is defined twice within one macro body.
    DuplicateJumpLabel,
    /// A macro call names a macro that has not been defined.
    UnknownMacro,
    /// A table-size reference names an unregistered jump table.
    MissingJumpTable,
    /// A literal cannot be encoded.
    UnparseableLiteral,
    /// Top-level text is not a recognised declaration.
    InvalidDeclaration,
    /// A macro or jump table name is defined twice.
    DuplicateDefinition,
}

impl ParseErrorKind {
    /// Returns a human-readable name for this error kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseErrorKind::UnparseableToken => "unparseable token",
            ParseErrorKind::DuplicateJumpLabel => "duplicate jump label",
            ParseErrorKind::UnknownMacro => "unknown macro",
            ParseErrorKind::MissingJumpTable => "missing jump table",
            ParseErrorKind::UnparseableLiteral => "unparseable literal",
            ParseErrorKind::InvalidDeclaration => "invalid declaration",
            ParseErrorKind::DuplicateDefinition => "duplicate definition",
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A parse error with location and context.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at {location}: {message}")]
pub struct ParseError {
    /// The category of this error.
    pub kind: ParseErrorKind,
    /// Where the error occurred.
    pub location: Location,
    /// A detailed error message.
    pub message: String,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(kind: ParseErrorKind, location: Location, message: impl Into<String>) -> Self {
        Self {
            kind,
            location,
            message: message.into(),
        }
    }

    /// Format the error with the offending source line for display.
    pub fn display_with_source(&self) -> String {
        let mut output = format!(
            "Error at {}:{}: {}\n",
            self.location.file, self.location.line, self.kind
        );
        if !self.message.is_empty() {
            output.push_str(&format!("  {}\n", self.message));
        }
        if !self.location.text.is_empty() {
            output.push_str("  |\n");
            output.push_str(&format!("{:>3} | {}\n", self.location.line, self.location.text));
        }
        output
    }
}

// ============================================================================
// Registration Errors
// ============================================================================

/// Errors raised while populating the macro and jump-table registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// A macro with this name already exists.
    #[error("duplicate macro: {0}")]
    DuplicateMacro(String),

    /// A jump table with this name already exists.
    #[error("duplicate jump table: {0}")]
    DuplicateTable(String),
}

// ============================================================================
// Compilation Errors
// ============================================================================

/// A jump reference that no enclosing frame could resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedJump {
    /// Label that was referenced.
    pub label: String,
    /// Byte offset of the placeholder push within the compiled macro.
    pub offset: usize,
}

impl fmt::Display for UnresolvedJump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' at byte {}", self.label, self.offset)
    }
}

/// ` at file:line` when a location is known, otherwise nothing.
fn at(location: &Option<Location>) -> String {
    location
        .as_ref()
        .map(|location| format!(" at {location}"))
        .unwrap_or_default()
}

fn join_jumps(jumps: &[UnresolvedJump]) -> String {
    jumps
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors that occur during macro expansion and jump-table linking.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompilationError {
    /// A referenced macro is not registered. The location is the referencing
    /// operation; an unknown entry macro has none.
    #[error("unknown macro '{name}'{}", at(.location))]
    UnknownMacro {
        name: String,
        location: Option<Location>,
    },

    /// Supplied template arguments do not match the macro's parameters.
    #[error(
        "macro '{name}' takes {expected} template argument(s), {found} supplied{}",
        at(.location)
    )]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        location: Option<Location>,
    },

    /// A template reference names a parameter the macro does not declare.
    #[error("macro '{name}' has no template parameter '{param}' at {location}")]
    UnknownTemplateParameter {
        name: String,
        param: String,
        location: Location,
    },

    /// A template parameter name cannot be turned into a substitution pattern.
    #[error("template parameter '{param}' cannot be substituted: {reason}")]
    InvalidTemplateParameter { param: String, reason: String },

    /// A template literal expression could not be evaluated.
    #[error("cannot process literal '{literal}' at {location}: {reason}")]
    UnparseableLiteral {
        literal: String,
        reason: LiteralError,
        location: Location,
    },

    /// A table reference names an unregistered jump table.
    #[error("unknown jump table '{name}'")]
    MissingJumpTable { name: String },

    /// A placeholder slot no longer holds its sentinel at patch time.
    #[error("placeholder at byte {offset} was already overwritten (found {found:02x?})")]
    PlaceholderCorruption { offset: usize, found: [u8; 2] },

    /// Jump labels left unmatched after the outermost expansion.
    #[error("macro '{entry}' has unresolved jump labels: {}", join_jumps(.jumps))]
    UnresolvedJumpLabels {
        entry: String,
        jumps: Vec<UnresolvedJump>,
    },

    /// A jump table references a label that is never defined.
    #[error("jump table '{table}' references undefined label '{label}'")]
    MissingJumpTableLabel { table: String, label: String },

    /// A macro expands into itself.
    #[error("macro cycle detected: {}", .chain.join(" -> "))]
    MacroCycle { chain: Vec<String> },

    /// Macro nesting exceeded the configured depth.
    #[error("macro nesting deeper than {limit} while expanding '{name}'")]
    RecursionLimit { limit: usize, name: String },

    /// Too many macro expansions in one compile.
    #[error("more than {limit} macro expansions")]
    ExpansionLimit { limit: usize },

    /// The bytecode grew beyond the configured size.
    #[error("bytecode size {size} exceeds the limit of {limit} bytes")]
    OutputLimit { limit: usize, size: usize },

    /// An offset does not fit in a 2-byte slot.
    #[error("offset {offset} of {what} does not fit in 2 bytes")]
    OffsetOverflow { offset: usize, what: String },
}

// ============================================================================
// Top-level Error
// ============================================================================

/// Any error produced while turning source files into bytecode.
#[derive(Debug, Error)]
pub enum HuffError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Compilation(#[from] CompilationError),
}
