//! Macro body lexer.
//!
//! The [`Lexer`] turns the text between a macro's braces into [`Token`]s.
//! Recognizers are tried in a fixed priority order at each position and the
//! first one that matches wins:
//!
//! 1. macro call `NAME()` / `NAME<args>()`
//! 2. template reference `<param>`
//! 3. `__codesize(NAME)` / `__codesize(NAME<args>)`
//! 4. `__tablesize(TABLE)`
//! 5. `__tablestart(TABLE)`
//! 6. jump label definition `label:`
//! 7. decimal literal
//! 8. hex literal `0x..`
//! 9. bare word
//!
//! Each recognizer runs on a scratch copy of the cursor and the lexer only
//! commits the copy when it matched, so a failed recognizer never consumes
//! input.

use super::cursor::{Cursor, is_ident_continue};
use super::token::{Token, TokenKind};

/// Input at `offset` that no recognizer accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnrecognizedInput {
    /// Absolute byte index of the offending text.
    pub offset: usize,
    /// The offending text, up to the next whitespace.
    pub snippet: String,
}

/// Lexer for a single macro body.
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    failed: bool,
}

impl<'src> Lexer<'src> {
    /// Create a lexer over `source[start..end]`.
    ///
    /// Token offsets are absolute indices into `source`.
    pub fn new(source: &'src str, start: usize, end: usize) -> Self {
        Self {
            cursor: Cursor::with_range(source, start, end),
            failed: false,
        }
    }

    /// Scan the next token, or `None` once only whitespace remains.
    pub fn next_token(&mut self) -> Result<Option<Token<'src>>, UnrecognizedInput> {
        self.cursor.skip_whitespace();
        if self.cursor.is_eof() {
            return Ok(None);
        }

        let start = self.cursor.offset();
        let recognizers: [fn(&mut Cursor<'src>) -> Option<TokenKind<'src>>; 9] = [
            scan_macro_call as fn(&mut Cursor<'src>) -> Option<TokenKind<'src>>,
            scan_template_ref as fn(&mut Cursor<'src>) -> Option<TokenKind<'src>>,
            scan_code_size as fn(&mut Cursor<'src>) -> Option<TokenKind<'src>>,
            scan_table_size as fn(&mut Cursor<'src>) -> Option<TokenKind<'src>>,
            scan_table_start as fn(&mut Cursor<'src>) -> Option<TokenKind<'src>>,
            scan_jump_label as fn(&mut Cursor<'src>) -> Option<TokenKind<'src>>,
            scan_decimal as fn(&mut Cursor<'src>) -> Option<TokenKind<'src>>,
            scan_hex as fn(&mut Cursor<'src>) -> Option<TokenKind<'src>>,
            scan_word as fn(&mut Cursor<'src>) -> Option<TokenKind<'src>>,
        ];

        for recognize in recognizers {
            let mut scratch = self.cursor.clone();
            if let Some(kind) = recognize(&mut scratch) {
                self.cursor = scratch;
                return Ok(Some(Token::new(kind, self.cursor.slice_from(start), start)));
            }
        }

        let snippet: String = self
            .cursor
            .rest()
            .chars()
            .take_while(|c| !c.is_whitespace())
            .take(32)
            .collect();
        Err(UnrecognizedInput {
            offset: start,
            snippet,
        })
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Result<Token<'src>, UnrecognizedInput>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let result = self.next_token().transpose();
        if matches!(result, Some(Err(_))) {
            self.failed = true;
        }
        result
    }
}

// =========================================
// Recognizers
// =========================================

/// `NAME()` or `NAME<args>()`.
fn scan_macro_call<'src>(c: &mut Cursor<'src>) -> Option<TokenKind<'src>> {
    let name = c.eat_ident()?;
    let args = scan_angle_args(c);
    c.skip_whitespace();
    if !c.eat('(') {
        return None;
    }
    c.skip_whitespace();
    if !c.eat(')') {
        return None;
    }
    Some(TokenKind::MacroCall { name, args })
}

/// `<param>`
fn scan_template_ref<'src>(c: &mut Cursor<'src>) -> Option<TokenKind<'src>> {
    if !c.eat('<') {
        return None;
    }
    c.skip_whitespace();
    let name = c.eat_ident()?;
    c.skip_whitespace();
    c.eat('>').then_some(TokenKind::TemplateRef(name))
}

/// `__codesize(NAME)` or `__codesize(NAME<args>)`.
fn scan_code_size<'src>(c: &mut Cursor<'src>) -> Option<TokenKind<'src>> {
    if !c.eat_str("__codesize(") {
        return None;
    }
    c.skip_whitespace();
    let name = c.eat_ident()?;
    let args = scan_angle_args(c);
    c.skip_whitespace();
    c.eat(')').then_some(TokenKind::CodeSize { name, args })
}

fn scan_table_size<'src>(c: &mut Cursor<'src>) -> Option<TokenKind<'src>> {
    scan_builtin(c, "__tablesize(").map(TokenKind::TableSize)
}

fn scan_table_start<'src>(c: &mut Cursor<'src>) -> Option<TokenKind<'src>> {
    scan_builtin(c, "__tablestart(").map(TokenKind::TableStart)
}

/// `label:`
fn scan_jump_label<'src>(c: &mut Cursor<'src>) -> Option<TokenKind<'src>> {
    let name = c.eat_ident()?;
    c.eat(':').then_some(TokenKind::JumpLabel(name))
}

fn scan_decimal<'src>(c: &mut Cursor<'src>) -> Option<TokenKind<'src>> {
    let digits = c.eat_while(|ch| ch.is_ascii_digit());
    if digits.is_empty() || c.check(is_ident_continue) {
        return None;
    }
    Some(TokenKind::Decimal(digits))
}

fn scan_hex<'src>(c: &mut Cursor<'src>) -> Option<TokenKind<'src>> {
    if !c.eat_str("0x") {
        return None;
    }
    let digits = c.eat_while(|ch| ch.is_ascii_hexdigit());
    if digits.is_empty() || c.check(is_ident_continue) {
        return None;
    }
    Some(TokenKind::Hex(digits))
}

fn scan_word<'src>(c: &mut Cursor<'src>) -> Option<TokenKind<'src>> {
    c.eat_ident().map(TokenKind::Word)
}

// =========================================
// Helpers
// =========================================

/// `prefix NAME )` for the single-argument table builtins.
fn scan_builtin<'src>(c: &mut Cursor<'src>, prefix: &str) -> Option<&'src str> {
    if !c.eat_str(prefix) {
        return None;
    }
    c.skip_whitespace();
    let name = c.eat_ident()?;
    c.skip_whitespace();
    c.eat(')').then_some(name)
}

/// Optional `<...>` argument list with balanced nested brackets.
///
/// Returns the raw text between the outer brackets. Leaves the cursor
/// untouched when there is no well-formed list.
fn scan_angle_args<'src>(c: &mut Cursor<'src>) -> Option<&'src str> {
    let mut scratch = c.clone();
    if !scratch.eat('<') {
        return None;
    }
    let inner_start = scratch.offset();
    let mut depth = 1usize;
    loop {
        match scratch.peek()? {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth == 0 {
                    let inner = scratch.slice_from(inner_start);
                    scratch.advance();
                    *c = scratch;
                    return Some(inner);
                }
            }
            '(' | ')' | '{' | '}' => return None,
            _ => {}
        }
        scratch.advance();
    }
}
