//! Registry - macro and jump-table storage.
//!
//! # Storage Model
//!
//! - **Macros**: stored as `Arc<Macro>` keyed by name, so expansion frames can
//!   hold on to a macro without borrowing the registry map.
//! - **Jump tables**: stored in declaration order; the linker lays tables out
//!   in exactly that order. A name index gives O(1) lookup.
//!
//! # Lifecycle
//!
//! The registry is populated single-threaded by the top-level parser and is
//! closed once parsing returns: the compiler only takes `&Registry`.
//!
//! # Example
//!
//! ```
//! use huff_core::{JumpTable, Macro};
//! use huff_registry::Registry;
//!
//! let mut registry = Registry::new();
//! registry
//!     .register_table(JumpTable {
//!         name: "SWITCH".into(),
//!         labels: vec!["a".into(), "b".into()],
//!         compressed: true,
//!         source: 0,
//!     })
//!     .unwrap();
//!
//! assert_eq!(registry.table("SWITCH").map(|t| t.size()), Some(4));
//! ```

use std::sync::Arc;

use rustc_hash::FxHashMap;

use huff_core::{JumpTable, Macro, RegistrationError};

use crate::CallGraph;

/// Macro and jump-table registry.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    /// Macros by name.
    macros: FxHashMap<String, Arc<Macro>>,

    /// Macro names in declaration order.
    macro_order: Vec<String>,

    /// Jump tables in declaration order.
    tables: Vec<JumpTable>,

    /// Table name -> index into `tables`.
    table_index: FxHashMap<String, usize>,
}

impl Registry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================================================
    // Macros
    // ==========================================================================

    /// Register a macro. Names must be unique.
    pub fn register_macro(&mut self, mac: Macro) -> Result<(), RegistrationError> {
        if self.macros.contains_key(&mac.name) {
            return Err(RegistrationError::DuplicateMacro(mac.name));
        }
        self.macro_order.push(mac.name.clone());
        self.macros.insert(mac.name.clone(), Arc::new(mac));
        Ok(())
    }

    /// Get a macro by name.
    pub fn get_macro(&self, name: &str) -> Option<&Arc<Macro>> {
        self.macros.get(name)
    }

    /// Check if a macro exists.
    pub fn contains_macro(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    /// Iterate over macros in declaration order.
    pub fn macros(&self) -> impl Iterator<Item = &Arc<Macro>> {
        self.macro_order
            .iter()
            .filter_map(|name| self.macros.get(name))
    }

    /// Number of registered macros.
    pub fn macro_count(&self) -> usize {
        self.macros.len()
    }

    // ==========================================================================
    // Jump tables
    // ==========================================================================

    /// Register a jump table. Names must be unique.
    pub fn register_table(&mut self, table: JumpTable) -> Result<(), RegistrationError> {
        if self.table_index.contains_key(&table.name) {
            return Err(RegistrationError::DuplicateTable(table.name));
        }
        self.table_index.insert(table.name.clone(), self.tables.len());
        self.tables.push(table);
        Ok(())
    }

    /// Get a jump table by name.
    pub fn table(&self, name: &str) -> Option<&JumpTable> {
        self.table_index.get(name).map(|&i| &self.tables[i])
    }

    /// Jump tables in declaration order.
    pub fn tables(&self) -> &[JumpTable] {
        &self.tables
    }

    // ==========================================================================
    // Analysis
    // ==========================================================================

    /// Static call graph over direct macro calls and code-size references.
    pub fn call_graph(&self) -> CallGraph<'_> {
        CallGraph::build(self)
    }
}
