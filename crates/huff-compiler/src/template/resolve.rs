//! Template argument resolution.

use huff_core::{CompilationError, InputMap, LiteralError, OpCode, Operation};
use huff_parser::{is_literal_expression, parse_call_target, split_arguments};
use huff_parser::lexer::is_ident;
use huff_registry::Registry;

use super::LiteralEvaluator;

/// What a template argument stands for at one call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// A single operation emitted directly into the current frame.
    Inline(Operation),
    /// A registered macro to expand with the given arguments.
    Macro { name: String, args: Vec<String> },
}

/// Resolve the argument `arg` bound to a `<param>` reference at `source`.
///
/// Tried in order: literal expression, opcode mnemonic, registered macro
/// (`NAME` or `NAME<args>`), and finally a jump label. Errors are located
/// at the `<param>` reference through `input`.
pub fn resolve_template_argument(
    arg: &str,
    source: usize,
    registry: &Registry,
    input: &InputMap,
) -> Result<Resolved, CompilationError> {
    let arg = arg.trim();
    let unparseable = |reason| CompilationError::UnparseableLiteral {
        literal: arg.to_string(),
        reason,
        location: input.location(source),
    };

    if is_literal_expression(arg) {
        let value = LiteralEvaluator::new(registry)
            .evaluate(arg)
            .map_err(unparseable)?;
        let push = Operation::push(&value, source).map_err(unparseable)?;
        return Ok(Resolved::Inline(push));
    }

    if let Some(opcode) = OpCode::from_mnemonic(arg) {
        return Ok(Resolved::Inline(Operation::opcode(opcode.byte(), source)));
    }

    if let Some((name, args)) = parse_call_target(arg) {
        if registry.contains_macro(name) {
            return Ok(Resolved::Macro {
                name: name.to_string(),
                args: args.map(split_arguments).unwrap_or_default(),
            });
        }
        if args.is_some() {
            return Err(CompilationError::UnknownMacro {
                name: name.to_string(),
                location: Some(input.location(source)),
            });
        }
    }

    if is_ident(arg) {
        return Ok(Resolved::Inline(Operation::push_jump_label(arg, source)));
    }

    Err(unparseable(LiteralError::NotALiteral))
}

#[cfg(test)]
mod tests {
    use super::*;
    use huff_core::{Location, Macro, OperationKind};

    const SOURCE: &str = "ab\ncd\n<value>";

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .register_macro(Macro {
                name: "HELPER".into(),
                ops: vec![Operation::opcode(0x01, 0)],
                template_params: vec!["x".into()],
                body: String::new(),
                takes: 0,
                returns: 0,
                source: 0,
            })
            .unwrap();
        registry
    }

    fn resolve(arg: &str) -> Result<Resolved, CompilationError> {
        let input = InputMap::single("t.huff", SOURCE);
        resolve_template_argument(arg, 7, &registry(), &input)
    }

    #[test]
    fn literal_becomes_inline_push() {
        assert_eq!(
            resolve("0x10-0x04"),
            Ok(Resolved::Inline(Operation::new(
                OperationKind::Push {
                    opcode: 0x60,
                    immediate: vec![0x0c]
                },
                7
            )))
        );
    }

    #[test]
    fn opcode_becomes_inline_opcode() {
        assert_eq!(
            resolve("dup1"),
            Ok(Resolved::Inline(Operation::opcode(0x80, 7)))
        );
    }

    #[test]
    fn macro_with_and_without_arguments() {
        assert_eq!(
            resolve("HELPER<0x01>"),
            Ok(Resolved::Macro {
                name: "HELPER".into(),
                args: vec!["0x01".into()],
            })
        );
        assert_eq!(
            resolve("HELPER"),
            Ok(Resolved::Macro {
                name: "HELPER".into(),
                args: vec![],
            })
        );
    }

    #[test]
    fn unknown_word_is_jump_label() {
        assert_eq!(
            resolve("loop_start"),
            Ok(Resolved::Inline(Operation::push_jump_label("loop_start", 7)))
        );
    }

    #[test]
    fn unknown_macro_with_arguments() {
        assert_eq!(
            resolve("MISSING<1>"),
            Err(CompilationError::UnknownMacro {
                name: "MISSING".into(),
                location: Some(Location::new("t.huff", 3, "<value>")),
            })
        );
    }

    #[test]
    fn unresolvable_text() {
        assert_eq!(
            resolve("1-2"),
            Err(CompilationError::UnparseableLiteral {
                literal: "1-2".into(),
                reason: LiteralError::Negative,
                location: Location::new("t.huff", 3, "<value>"),
            })
        );
        assert!(matches!(
            resolve("a b"),
            Err(CompilationError::UnparseableLiteral {
                reason: LiteralError::NotALiteral,
                ..
            })
        ));
    }
}
