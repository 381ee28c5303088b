//! Static macro call graph.
//!
//! Edges run from a macro to every macro it names in a call or a code-size
//! operation. Template arguments can still introduce calls the graph cannot
//! see, so the expander keeps its own runtime guard as well.

use std::collections::VecDeque;

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;
use petgraph::visit::Dfs;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::Registry;

/// Directed graph of direct macro references.
#[derive(Debug, Clone)]
pub struct CallGraph<'r> {
    graph: DiGraphMap<&'r str, ()>,
}

impl<'r> CallGraph<'r> {
    pub(crate) fn build(registry: &'r Registry) -> Self {
        let mut graph = DiGraphMap::new();
        for mac in registry.macros() {
            graph.add_node(mac.name.as_str());
            for callee in mac.callees() {
                graph.add_edge(mac.name.as_str(), callee, ());
            }
        }
        Self { graph }
    }

    fn node(&self, name: &str) -> Option<&'r str> {
        self.graph.nodes().find(|&n| n == name)
    }

    /// Whether `caller` references `callee` directly.
    pub fn calls(&self, caller: &str, callee: &str) -> bool {
        match (self.node(caller), self.node(callee)) {
            (Some(a), Some(b)) => self.graph.contains_edge(a, b),
            _ => false,
        }
    }

    /// Macros reachable from `entry` (including itself), in depth-first order.
    pub fn reachable_from(&self, entry: &str) -> Vec<&'r str> {
        let Some(entry) = self.node(entry) else {
            return Vec::new();
        };
        let mut order = Vec::new();
        let mut dfs = Dfs::new(&self.graph, entry);
        while let Some(node) = dfs.next(&self.graph) {
            order.push(node);
        }
        order
    }

    /// Find a call cycle reachable from `entry`.
    ///
    /// Returns the cycle as a chain that starts and ends with the same macro,
    /// e.g. `["A", "B", "A"]`.
    pub fn find_cycle(&self, entry: &str) -> Option<Vec<String>> {
        let order = self.reachable_from(entry);
        let reachable: FxHashSet<&str> = order.iter().copied().collect();

        for component in tarjan_scc(&self.graph) {
            let first = component[0];
            let cyclic = component.len() > 1 || self.graph.contains_edge(first, first);
            if !cyclic || !reachable.contains(first) {
                continue;
            }
            let members: FxHashSet<&str> = component.iter().copied().collect();
            let start = order
                .iter()
                .copied()
                .find(|n| members.contains(n))
                .unwrap_or(first);
            return Some(self.shortest_cycle(start, &members));
        }
        None
    }

    /// Breadth-first search from `start` back to itself inside one component.
    fn shortest_cycle(&self, start: &'r str, members: &FxHashSet<&str>) -> Vec<String> {
        let mut parent: FxHashMap<&'r str, &'r str> = FxHashMap::default();
        let mut queue = VecDeque::from([start]);

        while let Some(node) = queue.pop_front() {
            for next in self.graph.neighbors(node) {
                if !members.contains(next) {
                    continue;
                }
                if next == start {
                    let mut chain = vec![node];
                    let mut cur = node;
                    while cur != start {
                        cur = parent[cur];
                        chain.push(cur);
                    }
                    chain.reverse();
                    chain.push(start);
                    return chain.into_iter().map(String::from).collect();
                }
                if !parent.contains_key(next) {
                    parent.insert(next, node);
                    queue.push_back(next);
                }
            }
        }

        vec![start.to_string(), start.to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use huff_core::{Macro, Operation, OperationKind};

    fn mac(name: &str, calls: &[&str]) -> Macro {
        Macro {
            name: name.into(),
            ops: calls
                .iter()
                .map(|c| {
                    Operation::new(
                        OperationKind::MacroCall {
                            name: c.to_string(),
                            args: vec![],
                        },
                        0,
                    )
                })
                .collect(),
            template_params: vec![],
            body: String::new(),
            takes: 0,
            returns: 0,
            source: 0,
        }
    }

    fn registry(macros: &[(&str, &[&str])]) -> Registry {
        let mut registry = Registry::new();
        for (name, calls) in macros {
            registry.register_macro(mac(name, calls)).unwrap();
        }
        registry
    }

    #[test]
    fn acyclic_graph() {
        let registry = registry(&[("LEAF", &[]), ("MID", &["LEAF"]), ("MAIN", &["MID", "LEAF"])]);
        let graph = registry.call_graph();

        assert!(graph.calls("MAIN", "MID"));
        assert!(!graph.calls("LEAF", "MAIN"));
        assert_eq!(graph.reachable_from("MAIN").len(), 3);
        assert_eq!(graph.find_cycle("MAIN"), None);
    }

    #[test]
    fn self_loop() {
        let registry = registry(&[("A", &["A"])]);
        assert_eq!(
            registry.call_graph().find_cycle("A"),
            Some(vec!["A".to_string(), "A".to_string()])
        );
    }

    #[test]
    fn two_macro_cycle_starts_at_entry_side() {
        let registry = registry(&[("A", &["B"]), ("B", &["A"]), ("MAIN", &["A"])]);
        assert_eq!(
            registry.call_graph().find_cycle("MAIN"),
            Some(vec!["A".to_string(), "B".to_string(), "A".to_string()])
        );
    }

    #[test]
    fn unreachable_cycle_ignored() {
        let registry = registry(&[("A", &["B"]), ("B", &["A"]), ("MAIN", &[])]);
        assert_eq!(registry.call_graph().find_cycle("MAIN"), None);
    }

    #[test]
    fn unknown_entry() {
        let registry = registry(&[("A", &[])]);
        let graph = registry.call_graph();
        assert!(graph.reachable_from("NOPE").is_empty());
        assert_eq!(graph.find_cycle("NOPE"), None);
    }
}
