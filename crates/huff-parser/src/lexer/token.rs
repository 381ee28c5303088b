//! Token types for macro bodies.

use std::fmt;

/// The kind of a body token.
///
/// Variants borrow their payload from the normalized source; the macro
/// parser turns them into owned operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind<'src> {
    /// `NAME()` or `NAME<args>()`.
    MacroCall {
        name: &'src str,
        /// Raw text between the angle brackets, if present.
        args: Option<&'src str>,
    },
    /// `<param>`
    TemplateRef(&'src str),
    /// `__codesize(NAME)` or `__codesize(NAME<args>)`.
    CodeSize {
        name: &'src str,
        args: Option<&'src str>,
    },
    /// `__tablesize(TABLE)`
    TableSize(&'src str),
    /// `__tablestart(TABLE)`
    TableStart(&'src str),
    /// `label:`
    JumpLabel(&'src str),
    /// Decimal digits.
    Decimal(&'src str),
    /// Hex digits after a `0x` prefix.
    Hex(&'src str),
    /// Any other identifier: an opcode mnemonic or a jump label reference.
    Word(&'src str),
}

impl TokenKind<'_> {
    /// Short description used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::MacroCall { .. } => "macro call",
            TokenKind::TemplateRef(_) => "template reference",
            TokenKind::CodeSize { .. } => "__codesize",
            TokenKind::TableSize(_) => "__tablesize",
            TokenKind::TableStart(_) => "__tablestart",
            TokenKind::JumpLabel(_) => "jump label",
            TokenKind::Decimal(_) => "decimal literal",
            TokenKind::Hex(_) => "hex literal",
            TokenKind::Word(_) => "word",
        }
    }
}

/// A token with its position in the normalized source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind<'src>,
    /// The exact source text of the token.
    pub lexeme: &'src str,
    /// Absolute byte index of the token's first character.
    pub start: usize,
}

impl<'src> Token<'src> {
    #[inline]
    pub fn new(kind: TokenKind<'src>, lexeme: &'src str, start: usize) -> Self {
        Self {
            kind,
            lexeme,
            start,
        }
    }

    /// Absolute byte index one past the token's last character.
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.lexeme.len()
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind.describe(), self.lexeme)
    }
}
