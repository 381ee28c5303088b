//! Top-level parser.
//!
//! Scans the normalized source for declarations and builds the closed
//! [`Registry`]:
//!
//! ```text
//! template <p1, p2>
//! #define macro NAME = takes(N) returns(M) { body }
//! #define jumptable NAME { label label ... }
//! #define jumptable__packed NAME { label label ... }
//! ```
//!
//! Declarations are processed in source order and each macro body is parsed
//! as soon as its declaration is read, so a macro can only call macros that
//! were declared before it.

use bitflags::bitflags;
use tracing::debug;

use huff_core::{InputMap, JumpTable, Macro, ParseError, ParseErrorKind};
use huff_registry::Registry;

use crate::args::split_arguments;
use crate::lexer::{Cursor, is_ident, is_ident_continue};
use crate::macro_parser::MacroParser;

bitflags! {
    /// Declarations accepted at the current position.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Expect: u8 {
        /// A `template <...>` header.
        const TEMPLATE = 1 << 0;
        /// A `#define macro`.
        const MACRO = 1 << 1;
        /// A `#define jumptable` or `#define jumptable__packed`.
        const TABLE = 1 << 2;
        /// Anything, the state between declarations.
        const ANY = Self::TEMPLATE.bits() | Self::MACRO.bits() | Self::TABLE.bits();
    }
}

/// Top-level declaration parser.
pub struct Parser<'a> {
    input: &'a InputMap,
    cursor: Cursor<'a>,
    registry: Registry,
    expect: Expect,
    /// Parameters of a `template` header waiting for its macro.
    template_params: Vec<String>,
}

impl<'a> Parser<'a> {
    /// Parse every declaration in `input` into a registry.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse(input: &'a InputMap) -> Result<Registry, ParseError> {
        let mut parser = Self {
            input,
            cursor: Cursor::new(input.text()),
            registry: Registry::new(),
            expect: Expect::ANY,
            template_params: Vec::new(),
        };

        loop {
            parser.cursor.skip_whitespace();
            if parser.cursor.is_eof() {
                break;
            }
            parser.declaration()?;
        }

        if parser.expect != Expect::ANY {
            return Err(parser.error(
                ParseErrorKind::InvalidDeclaration,
                parser.cursor.offset(),
                "template header is not followed by a macro definition",
            ));
        }

        debug!(
            macros = parser.registry.macro_count(),
            tables = parser.registry.tables().len(),
            "parsed declarations"
        );
        Ok(parser.registry)
    }

    fn declaration(&mut self) -> Result<(), ParseError> {
        let start = self.cursor.offset();

        if keyword(&mut self.cursor, "template") {
            self.require(Expect::TEMPLATE, start, "a template header")?;
            return self.template();
        }

        if keyword(&mut self.cursor, "#define") {
            self.cursor.skip_whitespace();
            if keyword(&mut self.cursor, "macro") {
                self.require(Expect::MACRO, start, "a macro definition")?;
                return self.macro_definition(start);
            }
            if keyword(&mut self.cursor, "jumptable__packed") {
                self.require(Expect::TABLE, start, "a jump table")?;
                return self.table_definition(start, true);
            }
            if keyword(&mut self.cursor, "jumptable") {
                self.require(Expect::TABLE, start, "a jump table")?;
                return self.table_definition(start, false);
            }
        }

        Err(self.error(
            ParseErrorKind::InvalidDeclaration,
            start,
            "expected a macro, template or jump table definition",
        ))
    }

    // =========================================
    // Declarations
    // =========================================

    fn template(&mut self) -> Result<(), ParseError> {
        self.cursor.skip_whitespace();
        self.expect_char('<', "'<' after 'template'")?;
        let list_start = self.cursor.offset();
        let inner = self.cursor.eat_while(|c| c != '>' && c != '{' && c != '}');
        self.expect_char('>', "'>' closing the template parameter list")?;

        let params = split_arguments(inner);
        if let Some(bad) = params.iter().find(|p| !is_ident(p)) {
            return Err(self.error(
                ParseErrorKind::InvalidDeclaration,
                list_start,
                format!("'{bad}' is not a valid template parameter name"),
            ));
        }

        self.template_params = params;
        self.expect = Expect::MACRO;
        Ok(())
    }

    fn macro_definition(&mut self, start: usize) -> Result<(), ParseError> {
        let name = self.name("a macro name")?;
        self.cursor.skip_whitespace();
        self.expect_char('=', "'=' after the macro name")?;
        let takes = self.stack_count("takes")?;
        let returns = self.stack_count("returns")?;
        self.cursor.skip_whitespace();
        self.expect_char('{', "'{' opening the macro body")?;

        let body_start = self.cursor.offset();
        let body = self.cursor.eat_while(|c| c != '}');
        let body_end = self.cursor.offset();
        if !self.cursor.eat('}') {
            return Err(self.error(
                ParseErrorKind::InvalidDeclaration,
                start,
                format!("body of macro '{name}' is never closed"),
            ));
        }

        let ops = MacroParser::new(self.input, &self.registry).parse_body(body_start, body_end)?;
        let mac = Macro {
            name: name.to_string(),
            ops,
            template_params: std::mem::take(&mut self.template_params),
            body: body.to_string(),
            takes,
            returns,
            source: start,
        };
        debug!(
            name,
            ops = mac.ops.len(),
            params = mac.template_params.len(),
            "registered macro"
        );

        self.registry
            .register_macro(mac)
            .map_err(|err| self.error(ParseErrorKind::DuplicateDefinition, start, err.to_string()))?;
        self.expect = Expect::ANY;
        Ok(())
    }

    fn table_definition(&mut self, start: usize, compressed: bool) -> Result<(), ParseError> {
        let name = self.name("a jump table name")?;
        self.cursor.skip_whitespace();
        self.expect_char('{', "'{' opening the jump table")?;

        let mut labels = Vec::new();
        loop {
            self.cursor.skip_whitespace();
            if self.cursor.eat('}') {
                break;
            }
            match self.cursor.eat_ident() {
                Some(label) => labels.push(label.to_string()),
                None => {
                    return Err(self.error(
                        ParseErrorKind::InvalidDeclaration,
                        self.cursor.offset(),
                        format!("expected a jump label or '}}' in jump table '{name}'"),
                    ));
                }
            }
        }

        debug!(name, entries = labels.len(), compressed, "registered jump table");
        self.registry
            .register_table(JumpTable {
                name: name.to_string(),
                labels,
                compressed,
                source: start,
            })
            .map_err(|err| self.error(ParseErrorKind::DuplicateDefinition, start, err.to_string()))?;
        Ok(())
    }

    // =========================================
    // Helpers
    // =========================================

    fn require(&self, what: Expect, start: usize, found: &str) -> Result<(), ParseError> {
        if self.expect.contains(what) {
            return Ok(());
        }
        Err(self.error(
            ParseErrorKind::InvalidDeclaration,
            start,
            format!("found {found} where a macro definition must follow a template header"),
        ))
    }

    /// `takes(N)` or `returns(N)`.
    fn stack_count(&mut self, label: &str) -> Result<usize, ParseError> {
        self.cursor.skip_whitespace();
        if !keyword(&mut self.cursor, label) {
            return Err(self.expected(&format!("'{label}(..)'")));
        }
        self.cursor.skip_whitespace();
        self.expect_char('(', "'('")?;
        self.cursor.skip_whitespace();
        let digits_at = self.cursor.offset();
        let digits = self.cursor.eat_while(|c| c.is_ascii_digit());
        let count = digits.parse::<usize>().map_err(|_| {
            self.error(
                ParseErrorKind::InvalidDeclaration,
                digits_at,
                format!("'{label}' needs a decimal count"),
            )
        })?;
        self.cursor.skip_whitespace();
        self.expect_char(')', "')'")?;
        Ok(count)
    }

    fn name(&mut self, what: &str) -> Result<&'a str, ParseError> {
        self.cursor.skip_whitespace();
        self.cursor.eat_ident().ok_or_else(|| self.expected(what))
    }

    fn expect_char(&mut self, ch: char, what: &str) -> Result<(), ParseError> {
        if self.cursor.eat(ch) {
            Ok(())
        } else {
            Err(self.expected(what))
        }
    }

    fn expected(&self, what: &str) -> ParseError {
        self.error(
            ParseErrorKind::InvalidDeclaration,
            self.cursor.offset(),
            format!("expected {what}"),
        )
    }

    fn error(&self, kind: ParseErrorKind, offset: usize, message: impl Into<String>) -> ParseError {
        ParseError::new(kind, self.input.location(offset), message)
    }
}

/// Consume `word` if it is next and not just the prefix of a longer word.
fn keyword(cursor: &mut Cursor<'_>, word: &str) -> bool {
    let mut scratch = cursor.clone();
    if scratch.eat_str(word) && !scratch.check(is_ident_continue) {
        *cursor = scratch;
        true
    } else {
        false
    }
}
