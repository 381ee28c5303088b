//! Template literal evaluation.
//!
//! Expressions are grouped by operator presence, not by precedence: an
//! expression containing `-` is split on every `-` and folded left with
//! subtraction, each part evaluated recursively; otherwise the same happens
//! with `+`, then with `*`. So `10-2+3` is `10 - (2+3)`, not `(10-2)+3`.
//! Existing Huff sources depend on this grouping.

use num_bigint::BigUint;

use huff_core::LiteralError;
use huff_core::literal::parse_literal;
use huff_registry::Registry;

const OPERATORS: [char; 3] = ['-', '+', '*'];

/// Evaluates literal expressions against a registry of constant macros.
#[derive(Debug, Clone, Copy)]
pub struct LiteralEvaluator<'r> {
    registry: &'r Registry,
}

impl<'r> LiteralEvaluator<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// Evaluate `expr` to a non-negative integer.
    pub fn evaluate(&self, expr: &str) -> Result<BigUint, LiteralError> {
        for op in OPERATORS {
            if expr.contains(op) {
                return self.fold(expr, op);
            }
        }
        self.operand(expr)
    }

    fn fold(&self, expr: &str, op: char) -> Result<BigUint, LiteralError> {
        let mut parts = expr.split(op);
        let mut acc = self.part(parts.next().unwrap_or_default())?;
        for part in parts {
            let value = self.part(part)?;
            acc = match op {
                '-' => {
                    if value > acc {
                        return Err(LiteralError::Negative);
                    }
                    acc - value
                }
                '+' => acc + value,
                _ => acc * value,
            };
        }
        Ok(acc)
    }

    fn part(&self, part: &str) -> Result<BigUint, LiteralError> {
        if part.contains(OPERATORS) {
            self.evaluate(part)
        } else {
            self.operand(part)
        }
    }

    /// A hex literal, a decimal literal, or the name of a constant macro.
    fn operand(&self, text: &str) -> Result<BigUint, LiteralError> {
        let text = text.trim();
        if let Some(value) = parse_literal(text) {
            return Ok(value);
        }
        match self.registry.get_macro(text) {
            Some(mac) => mac
                .constant_value()
                .ok_or_else(|| LiteralError::NotConstant(text.to_string())),
            None => Err(LiteralError::NotALiteral),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use huff_core::{Macro, Operation};

    fn constant(name: &str, value: u32) -> Macro {
        Macro {
            name: name.into(),
            ops: vec![Operation::push(&BigUint::from(value), 0).unwrap()],
            template_params: vec![],
            body: String::new(),
            takes: 0,
            returns: 1,
            source: 0,
        }
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register_macro(constant("WORD", 0x20)).unwrap();
        registry
            .register_macro(Macro {
                ops: vec![Operation::opcode(0x01, 0), Operation::opcode(0x02, 0)],
                ..constant("NOT_CONST", 0)
            })
            .unwrap();
        registry
    }

    fn eval(expr: &str) -> Result<u64, LiteralError> {
        let registry = registry();
        LiteralEvaluator::new(&registry)
            .evaluate(expr)
            .map(|v| v.try_into().unwrap())
    }

    #[test]
    fn plain_operands() {
        assert_eq!(eval("0x10"), Ok(16));
        assert_eq!(eval("42"), Ok(42));
        assert_eq!(eval(" WORD "), Ok(0x20));
    }

    #[test]
    fn hex_subtraction() {
        assert_eq!(eval("0x10-0x04"), Ok(12));
    }

    #[test]
    fn single_operator_chains_fold_left() {
        assert_eq!(eval("20-4-6"), Ok(10));
        assert_eq!(eval("1+2+3"), Ok(6));
        assert_eq!(eval("2*3*4"), Ok(24));
        assert_eq!(eval("WORD*2 + 0x01"), Ok(0x41));
    }

    // Grouping follows operator presence (`-`, then `+`, then `*`). These
    // pin the results that differ from conventional precedence.
    #[test]
    fn minus_splits_before_plus() {
        assert_eq!(eval("10-2+3"), Ok(5));
        assert_eq!(eval("3*4-2+1"), Ok(9));
    }

    #[test]
    fn plus_splits_before_times() {
        assert_eq!(eval("2+3*4"), Ok(14));
        assert_eq!(eval("2*3+4"), Ok(10));
        assert_eq!(eval("2*5-3"), Ok(7));
    }

    #[test]
    fn negative_results_are_rejected() {
        assert_eq!(eval("1-2"), Err(LiteralError::Negative));
        assert_eq!(eval("5-2+4"), Err(LiteralError::Negative));
    }

    #[test]
    fn bad_operands() {
        assert_eq!(eval("dup1"), Err(LiteralError::NotALiteral));
        assert_eq!(eval("-5"), Err(LiteralError::NotALiteral));
        assert_eq!(
            eval("NOT_CONST+1"),
            Err(LiteralError::NotConstant("NOT_CONST".into()))
        );
    }

    #[test]
    fn results_beyond_machine_words() {
        let registry = registry();
        let value = LiteralEvaluator::new(&registry)
            .evaluate("0xffffffffffffffffffff*0x100")
            .unwrap();
        assert_eq!(value.to_bytes_be().len(), 11);
    }
}
