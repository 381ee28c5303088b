//! Macro body parser.
//!
//! Turns the text between a macro's braces into its ordered [`Operation`]s.
//! References are validated against the registry as it stands when the macro
//! is declared: called macros and sized tables must already exist, while
//! `__codesize` targets and `__tablestart` tables are checked later by the
//! compiler.

use num_bigint::BigUint;
use rustc_hash::FxHashSet;

use huff_core::literal::{parse_decimal, parse_hex};
use huff_core::{InputMap, OpCode, Operation, OperationKind, ParseError, ParseErrorKind};
use huff_registry::Registry;

use crate::args::split_arguments;
use crate::lexer::{Lexer, Token, TokenKind};

/// Parser for one macro body at a time.
pub struct MacroParser<'a> {
    input: &'a InputMap,
    registry: &'a Registry,
}

impl<'a> MacroParser<'a> {
    pub fn new(input: &'a InputMap, registry: &'a Registry) -> Self {
        Self { input, registry }
    }

    /// Parse the body spanning `start..end` of the normalized text.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse_body(&self, start: usize, end: usize) -> Result<Vec<Operation>, ParseError> {
        let mut ops = Vec::new();
        let mut labels: FxHashSet<&str> = FxHashSet::default();

        for token in Lexer::new(self.input.text(), start, end) {
            let token = token.map_err(|err| {
                self.error(
                    ParseErrorKind::UnparseableToken,
                    err.offset,
                    format!("cannot parse '{}'", err.snippet),
                )
            })?;
            ops.push(self.operation(&token, &mut labels)?);
        }

        Ok(ops)
    }

    fn operation<'src>(
        &self,
        token: &Token<'src>,
        labels: &mut FxHashSet<&'src str>,
    ) -> Result<Operation, ParseError> {
        let source = token.start;
        let kind = match token.kind {
            TokenKind::MacroCall { name, args } => {
                if !self.registry.contains_macro(name) {
                    return Err(self.error(
                        ParseErrorKind::UnknownMacro,
                        source,
                        format!("call to undefined macro '{name}'"),
                    ));
                }
                OperationKind::MacroCall {
                    name: name.to_string(),
                    args: args.map(split_arguments).unwrap_or_default(),
                }
            }
            TokenKind::TemplateRef(name) => OperationKind::TemplateRef(name.to_string()),
            TokenKind::CodeSize { name, args } => OperationKind::CodeSize {
                name: name.to_string(),
                args: args.map(split_arguments).unwrap_or_default(),
            },
            TokenKind::TableSize(name) => {
                let Some(table) = self.registry.table(name) else {
                    return Err(self.error(
                        ParseErrorKind::MissingJumpTable,
                        source,
                        format!("__tablesize of undefined jump table '{name}'"),
                    ));
                };
                return self.push(BigUint::from(table.size()), token);
            }
            TokenKind::TableStart(name) => OperationKind::TableStartPosition(name.to_string()),
            TokenKind::JumpLabel(name) => {
                if !labels.insert(name) {
                    return Err(self.error(
                        ParseErrorKind::DuplicateJumpLabel,
                        source,
                        format!("jump label '{name}' is defined twice in this macro"),
                    ));
                }
                OperationKind::JumpDest(name.to_string())
            }
            TokenKind::Decimal(digits) => {
                let value = parse_decimal(digits).ok_or_else(|| self.bad_literal(token))?;
                return self.push(value, token);
            }
            TokenKind::Hex(digits) => {
                let value = parse_hex(digits).ok_or_else(|| self.bad_literal(token))?;
                return self.push(value, token);
            }
            TokenKind::Word(word) => match OpCode::from_mnemonic(word) {
                Some(opcode) => OperationKind::Opcode(opcode.byte()),
                None => OperationKind::PushJumpLabel(word.to_string()),
            },
        };
        Ok(Operation::new(kind, source))
    }

    fn push(&self, value: BigUint, token: &Token<'_>) -> Result<Operation, ParseError> {
        Operation::push(&value, token.start).map_err(|reason| {
            self.error(
                ParseErrorKind::UnparseableLiteral,
                token.start,
                format!("'{}': {reason}", token.lexeme),
            )
        })
    }

    fn bad_literal(&self, token: &Token<'_>) -> ParseError {
        self.error(
            ParseErrorKind::UnparseableLiteral,
            token.start,
            format!("'{}' is not a valid literal", token.lexeme),
        )
    }

    fn error(&self, kind: ParseErrorKind, offset: usize, message: String) -> ParseError {
        ParseError::new(kind, self.input.location(offset), message)
    }
}
