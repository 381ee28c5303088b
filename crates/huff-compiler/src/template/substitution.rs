//! Textual template substitution.
//!
//! Arguments of nested calls are rewritten by replacing each template
//! parameter name, matched on word boundaries, with the caller's argument
//! text. Parameters are applied in declaration order, each to the output of
//! the previous one. Substitution is not hygienic: any identifier spelled
//! like a parameter is replaced.

use regex::{NoExpand, Regex};

use huff_core::{CompilationError, Macro};

/// Compiled `\bparam\b` patterns for one macro's template parameters.
#[derive(Debug, Clone)]
pub struct ParameterPatterns {
    patterns: Vec<Regex>,
}

impl ParameterPatterns {
    /// Build the patterns for `mac`'s parameters.
    pub fn for_macro(mac: &Macro) -> Result<Self, CompilationError> {
        let patterns = mac
            .template_params
            .iter()
            .map(|param| {
                Regex::new(&format!(r"\b{}\b", regex::escape(param))).map_err(|err| {
                    CompilationError::InvalidTemplateParameter {
                        param: param.clone(),
                        reason: err.to_string(),
                    }
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { patterns })
    }

    /// Substitute `values` (one per parameter) into `text`.
    pub fn substitute(&self, text: &str, values: &[String]) -> String {
        let mut out = text.to_string();
        for (pattern, value) in self.patterns.iter().zip(values) {
            out = pattern
                .replace_all(&out, NoExpand(value.as_str()))
                .into_owned();
        }
        out
    }

    /// Substitute into every argument of a nested call.
    pub fn substitute_all(&self, args: &[String], values: &[String]) -> Vec<String> {
        args.iter().map(|arg| self.substitute(arg, values)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl ParameterPatterns {
        fn len(&self) -> usize {
            self.patterns.len()
        }
    }

    fn patterns(params: &[&str]) -> ParameterPatterns {
        let mac = Macro {
            name: "M".into(),
            ops: vec![],
            template_params: params.iter().map(|p| p.to_string()).collect(),
            body: String::new(),
            takes: 0,
            returns: 0,
            source: 0,
        };
        ParameterPatterns::for_macro(&mac).unwrap()
    }

    fn values(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn replaces_whole_words_only() {
        let p = patterns(&["a"]);
        assert_eq!(p.substitute("a+ab+a", &values(&["0x01"])), "0x01+ab+0x01");
        assert_eq!(p.substitute("INNER<a>", &values(&["dup1"])), "INNER<dup1>");
    }

    #[test]
    fn applies_parameters_in_order() {
        let p = patterns(&["x", "y"]);
        assert_eq!(p.len(), 2);
        // `x` becomes `y`, which the second pattern then rewrites.
        assert_eq!(p.substitute("x-y", &values(&["y", "3"])), "3-3");
    }

    #[test]
    fn dollar_in_value_is_literal() {
        let p = patterns(&["a"]);
        assert_eq!(p.substitute("a", &values(&["$1"])), "$1");
    }

    #[test]
    fn no_parameters_is_identity() {
        let p = patterns(&[]);
        assert_eq!(
            p.substitute_all(&values(&["a", "b"]), &[]),
            values(&["a", "b"])
        );
    }
}
