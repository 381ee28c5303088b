//! Template argument text helpers.
//!
//! Template arguments are kept as raw text until expansion time, so both the
//! parser and the compiler need to split and classify them the same way.

use crate::lexer::is_ident;

/// Split an argument list on commas that are not nested inside `<...>`.
///
/// Arguments are trimmed; an empty or all-whitespace list yields no
/// arguments.
pub fn split_arguments(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, ch) in text.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                args.push(text[start..i].trim().to_string());
                start = i + 1;
            }
            _ => {}
        }
    }
    args.push(text[start..].trim().to_string());
    args
}

/// Whether `text` should be evaluated as a template literal: it contains an
/// arithmetic operator or is a hex or decimal literal on its own.
pub fn is_literal_expression(text: &str) -> bool {
    let text = text.trim();
    if text.contains(['+', '-', '*']) {
        return true;
    }
    match text.strip_prefix("0x") {
        Some(hex) => !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit()),
        None => !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()),
    }
}

/// Split `NAME` or `NAME<args>` into the name and the raw argument text.
///
/// Returns `None` when `text` is not of that shape.
pub fn parse_call_target(text: &str) -> Option<(&str, Option<&str>)> {
    let text = text.trim();
    match text.find('<') {
        None => is_ident(text).then_some((text, None)),
        Some(open) => {
            let name = text[..open].trim_end();
            let inner = text[open + 1..].strip_suffix('>')?;
            is_ident(name).then_some((name, Some(inner)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_flat_list() {
        assert_eq!(split_arguments("a, 0x10 ,dup1"), vec!["a", "0x10", "dup1"]);
        assert_eq!(split_arguments("  "), Vec::<String>::new());
        assert_eq!(split_arguments("single"), vec!["single"]);
    }

    #[test]
    fn split_respects_nesting() {
        assert_eq!(
            split_arguments("INNER<a, b>, c"),
            vec!["INNER<a, b>", "c"]
        );
        assert_eq!(
            split_arguments("X<Y<1,2>,3>,4"),
            vec!["X<Y<1,2>,3>", "4"]
        );
    }

    #[test]
    fn literal_classification() {
        assert!(is_literal_expression("0x10"));
        assert!(is_literal_expression("42"));
        assert!(is_literal_expression("0x10-0x04"));
        assert!(is_literal_expression("A+B"));
        assert!(!is_literal_expression("dup1"));
        assert!(!is_literal_expression("0x"));
        assert!(!is_literal_expression("FOO<1>"));
    }

    #[test]
    fn call_targets() {
        assert_eq!(parse_call_target("FOO"), Some(("FOO", None)));
        assert_eq!(parse_call_target("FOO<1, 2>"), Some(("FOO", Some("1, 2"))));
        assert_eq!(parse_call_target("FOO<"), None);
        assert_eq!(parse_call_target("a b"), None);
    }
}
