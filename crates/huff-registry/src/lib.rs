//! Huff Registry crate.
//!
//! Provides the [`Registry`] of macros and jump tables built by the top-level
//! parser. Once parsing finishes the registry is only ever borrowed
//! immutably, so expansion can never define new macros or tables.

mod call_graph;
mod registry;

pub use call_graph::CallGraph;
pub use registry::Registry;
