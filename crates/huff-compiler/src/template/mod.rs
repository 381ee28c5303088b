//! Template handling.
//!
//! ## Components
//!
//! - [`LiteralEvaluator`]: arithmetic over literals and constant macros
//! - [`ParameterPatterns`]: word-boundary substitution into nested call arguments
//! - [`resolve_template_argument`]: decides what a `<param>` reference emits

mod literal;
mod resolve;
mod substitution;

pub use literal::LiteralEvaluator;
pub use resolve::{Resolved, resolve_template_argument};
pub use substitution::ParameterPatterns;
