/// A cursor over a window of the normalized source text.
///
/// Provides low-level character access with peek/advance semantics.
/// Offsets are absolute byte indices into the full normalized text, so
/// tokens scanned from a macro body can be mapped straight back to files
/// and lines.
#[derive(Clone)]
pub struct Cursor<'src> {
    /// The full normalized text.
    source: &'src str,
    /// Current byte offset into `source`.
    offset: usize,
    /// End of the window being scanned.
    end: usize,
}

impl<'src> Cursor<'src> {
    /// Create a cursor over the whole source.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            offset: 0,
            end: source.len(),
        }
    }

    /// Create a cursor over `source[start..end]`.
    pub fn with_range(source: &'src str, start: usize, end: usize) -> Self {
        debug_assert!(start <= end && end <= source.len());
        Self {
            source,
            offset: start,
            end,
        }
    }

    /// Get the full source text.
    #[inline]
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Current byte offset into the full source.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Remaining text of the window.
    #[inline]
    pub fn rest(&self) -> &'src str {
        &self.source[self.offset..self.end]
    }

    /// Check if we've reached the end of the window.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.offset >= self.end
    }

    /// Peek at the current character without consuming it.
    #[inline]
    pub fn peek(&self) -> Option<char> {
        let bytes = self.rest().as_bytes();
        let first = *bytes.first()?;
        if first < 128 {
            Some(first as char)
        } else {
            self.rest().chars().next()
        }
    }

    /// Check if the current character satisfies a predicate.
    #[inline]
    pub fn check(&self, f: impl Fn(char) -> bool) -> bool {
        self.peek().is_some_and(f)
    }

    /// Check if the upcoming text matches the given string.
    #[inline]
    pub fn check_str(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    /// Consume the current character and advance.
    #[inline]
    pub fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.offset += ch.len_utf8();
        Some(ch)
    }

    /// Consume if the current character matches.
    #[inline]
    pub fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume `s` if the upcoming text matches it.
    pub fn eat_str(&mut self, s: &str) -> bool {
        if self.check_str(s) {
            self.offset += s.len();
            true
        } else {
            false
        }
    }

    /// Consume characters while the predicate matches.
    ///
    /// Returns the consumed slice.
    pub fn eat_while(&mut self, f: impl Fn(char) -> bool) -> &'src str {
        let start = self.offset;
        while self.check(&f) {
            self.advance();
        }
        &self.source[start..self.offset]
    }

    /// Skip whitespace (including newlines).
    pub fn skip_whitespace(&mut self) {
        self.eat_while(char::is_whitespace);
    }

    /// Consume an identifier, returning `None` (and consuming nothing) if
    /// the cursor is not at one.
    pub fn eat_ident(&mut self) -> Option<&'src str> {
        if !self.check(is_ident_continue) {
            return None;
        }
        Some(self.eat_while(is_ident_continue))
    }

    /// Get a slice of source from a starting offset to current position.
    #[inline]
    pub fn slice_from(&self, start: usize) -> &'src str {
        &self.source[start..self.offset]
    }
}

/// Check if a character can appear in a Huff identifier.
///
/// Huff identifiers (macro names, labels, mnemonics) may start with a digit,
/// which is why literals are matched before bare words.
#[inline]
pub fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Check if a whole string is a Huff identifier.
pub fn is_ident(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_ident_continue)
}
