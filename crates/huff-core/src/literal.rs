//! Literal values and their push encoding.
//!
//! Values are arbitrary-precision until they are encoded; an encoded value is
//! the minimal big-endian byte string (at least one byte) behind the matching
//! `PUSHn` opcode.

use num_bigint::BigUint;
use num_traits::Zero;

use crate::LiteralError;
use crate::opcodes::{PUSH_BASE, push_opcode};

/// Parse hexadecimal digits (without the `0x` prefix).
pub fn parse_hex(digits: &str) -> Option<BigUint> {
    if digits.is_empty() {
        return None;
    }
    BigUint::parse_bytes(digits.as_bytes(), 16)
}

/// Parse decimal digits.
pub fn parse_decimal(digits: &str) -> Option<BigUint> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    BigUint::parse_bytes(digits.as_bytes(), 10)
}

/// Parse a single literal token: `0x`-prefixed hex or plain decimal.
pub fn parse_literal(text: &str) -> Option<BigUint> {
    match text.strip_prefix("0x") {
        Some(hex) => parse_hex(hex),
        None => parse_decimal(text),
    }
}

/// Minimal big-endian bytes of `value`; zero encodes as a single `00` byte.
pub fn minimal_bytes(value: &BigUint) -> Vec<u8> {
    if value.is_zero() {
        return vec![0];
    }
    value.to_bytes_be()
}

/// Interpret a push immediate as an unsigned big-endian integer.
pub fn bytes_to_value(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_be(bytes)
}

/// Encode `value` as `(push opcode, immediate bytes)`.
pub fn encode_push(value: &BigUint) -> Result<(u8, Vec<u8>), LiteralError> {
    let bytes = minimal_bytes(value);
    match push_opcode(bytes.len()) {
        Some(opcode) => Ok((opcode, bytes)),
        None => Err(LiteralError::TooWide { bytes: bytes.len() }),
    }
}

/// Encode a byte offset or length as a push.
pub fn encode_push_usize(value: usize) -> (u8, Vec<u8>) {
    // A usize is at most 8 bytes wide, always within the push family.
    let bytes = minimal_bytes(&BigUint::from(value));
    (PUSH_BASE + bytes.len() as u8, bytes)
}

/// Lowercase hex rendering of a byte string.
pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
