//! Dependencies between zmanim that refer to each other with `@key`.
//!
//! A publisher's zmanim form a directed graph: `@alos_hashachar - 72min` depends on the zman
//! `alos_hashachar`. The graph must be acyclic for the zmanim to be computable, and a formula may
//! refer to a key that has not been defined yet. Because references are found lexically, the
//! graph also covers formulas that the guided editor cannot represent.

use std::collections::HashMap;

use nonempty::NonEmpty;
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use thiserror::Error;

use crate::parser::scan_references;

fn join_keys(keys: &NonEmpty<String>) -> String {
    keys.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("zman {key} refers to itself")]
    SelfReference { key: String },

    #[error("zmanim refer to each other in a cycle: {}", join_keys(.keys))]
    Cycle { keys: NonEmpty<String> },
}

#[derive(Clone, Debug, Default)]
pub struct ReferenceGraph {
    keys: Vec<String>,
    index: HashMap<String, usize>,
    // Edges point from a dependency to the zmanim that use it.
    graph: DiGraphMap<usize, ()>,
    unresolved: Vec<(String, String)>,
}

impl ReferenceGraph {
    /// Build the graph from `(zman_key, formula_text)` pairs.
    pub fn from_formulas<I, K, T>(formulas: I) -> Self
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
        T: AsRef<str>,
    {
        let formulas: Vec<(String, T)> = formulas.into_iter().map(|(key, text)| (key.into(), text)).collect();
        let mut graph = ReferenceGraph::default();

        for (key, _) in &formulas {
            graph.node(key);
        }

        for (key, text) in &formulas {
            let dependent = graph.node(key);

            for reference in scan_references(text.as_ref()) {
                match graph.index.get(reference.as_str()) {
                    Some(&dependency) => {
                        graph.graph.add_edge(dependency, dependent, ());
                    }
                    None => graph.unresolved.push((key.clone(), reference.to_string())),
                }
            }
        }

        graph.unresolved.sort();
        graph.unresolved.dedup();
        graph
    }

    fn node(&mut self, key: &str) -> usize {
        if let Some(&node) = self.index.get(key) {
            return node;
        }

        let node = self.keys.len();
        self.keys.push(key.to_string());
        self.index.insert(key.to_string(), node);
        self.graph.add_node(node);

        node
    }

    /// Order in which the zmanim can be computed, dependencies first.
    pub fn check(&self) -> Result<Vec<&str>, ReferenceError> {
        if let Some(node) = self.graph.nodes().find(|&node| self.graph.contains_edge(node, node)) {
            return Err(ReferenceError::SelfReference {
                key: self.keys[node].clone(),
            });
        }

        match toposort(&self.graph, None) {
            Ok(order) => Ok(order.into_iter().map(|node| self.keys[node].as_str()).collect()),
            Err(cycle) => Err(self.cycle_through(cycle.node_id())),
        }
    }

    fn cycle_through(&self, node: usize) -> ReferenceError {
        let mut members: Vec<String> = tarjan_scc(&self.graph)
            .into_iter()
            .find(|component| component.contains(&node))
            .unwrap_or_else(|| vec![node])
            .into_iter()
            .map(|member| self.keys[member].clone())
            .collect();
        members.sort();

        let keys = NonEmpty::from_vec(members).unwrap_or_else(|| NonEmpty::new(self.keys[node].clone()));
        ReferenceError::Cycle { keys }
    }

    /// References to keys that are not part of the graph, as sorted `(from, to)` pairs.
    pub fn unresolved(&self) -> &[(String, String)] {
        &self.unresolved
    }

    /// Keys of the zmanim whose formulas refer directly to `key`, sorted.
    pub fn dependents(&self, key: &str) -> Vec<&str> {
        let Some(&node) = self.index.get(key) else {
            return Vec::new();
        };

        let mut dependents: Vec<&str> = self
            .graph
            .neighbors_directed(node, Direction::Outgoing)
            .map(|dependent| self.keys[dependent].as_str())
            .collect();
        dependents.sort_unstable();

        dependents
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use nonempty::NonEmpty;

    use super::{ReferenceError, ReferenceGraph};

    fn position(order: &[&str], key: &str) -> usize {
        order.iter().position(|k| *k == key).unwrap_or(usize::MAX)
    }

    #[test]
    fn dependencies_come_first() -> Result<(), Box<dyn Error>> {
        let graph = ReferenceGraph::from_formulas([
            ("misheyakir", "@alos_hashachar + 36min"),
            ("alos_hashachar", "solar(16.1, before_sunrise)"),
            ("sof_zman_shma", "shaos(3, custom(@alos_hashachar, @tzais))"),
            ("tzais", "solar(8.5, after_sunset)"),
        ]);

        let order = graph.check()?;

        assert_eq!(order.len(), 4);
        assert!(position(&order, "alos_hashachar") < position(&order, "misheyakir"));
        assert!(position(&order, "alos_hashachar") < position(&order, "sof_zman_shma"));
        assert!(position(&order, "tzais") < position(&order, "sof_zman_shma"));
        assert!(graph.unresolved().is_empty());
        assert_eq!(graph.dependents("alos_hashachar"), ["misheyakir", "sof_zman_shma"]);

        Ok(())
    }

    #[test]
    fn self_reference() {
        let graph = ReferenceGraph::from_formulas([("chatzos", "@chatzos + 0min")]);

        assert_eq!(
            graph.check(),
            Err(ReferenceError::SelfReference {
                key: "chatzos".to_string()
            })
        );
    }

    #[test]
    fn cycles_name_their_members() {
        let graph = ReferenceGraph::from_formulas([
            ("a", "@c - 5min"),
            ("b", "@a"),
            ("c", "@b + 5min"),
            ("d", "sunrise"),
        ]);

        let err = graph.check().unwrap_err();
        let expected = NonEmpty::from_vec(vec!["a".to_string(), "b".to_string(), "c".to_string()]);

        assert_eq!(Some(err.clone()), expected.map(|keys| ReferenceError::Cycle { keys }));
        assert_eq!(err.to_string(), "zmanim refer to each other in a cycle: a, b, c");
    }

    #[test]
    fn forward_references_are_reported() {
        let graph = ReferenceGraph::from_formulas([
            ("plag", "@mincha_ketana + 75min"),
            ("advanced", "if(@missing > @plag, @missing, sunset)"),
        ]);

        assert_eq!(
            graph.unresolved(),
            [
                ("advanced".to_string(), "missing".to_string()),
                ("plag".to_string(), "mincha_ketana".to_string()),
            ]
        );
        assert_eq!(graph.dependents("plag"), ["advanced"]);
        assert!(graph.dependents("unknown").is_empty());
    }
}
