//! Dependency graph between tokens.
//!
//! A token depends on every declared token its flattened value references.
//! The graph provides cycle detection and the order in which placeholders
//! must be substituted so nested references expand completely.

use petgraph::Direction;
use petgraph::graph::{DiGraph, Neighbors, NodeIndex};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use super::reference::{placeholder_candidates, references};
use crate::constants::MAX_TREE_DEPTH;
use crate::core::{Result, TokensJarError};

/// Color states for cycle detection using DFS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Node has not been visited.
    White,
    /// Node is currently being visited (in the DFS stack).
    Gray,
    /// Node has been fully visited.
    Black,
}

/// Dependency graph over declared token names.
///
/// Edges point from a token to every declared token whose placeholder appears
/// in its value, including placeholders nested in an unbalanced `$(`. References to
/// undeclared names are not edges; they are recorded per token so strict
/// resolution can report them.
pub struct TokenGraph {
    /// The underlying directed graph.
    graph: DiGraph<String, ()>,
    /// Map from token names to their graph indices.
    node_map: HashMap<String, NodeIndex>,
    /// Undeclared names referenced by each token, in order of appearance.
    undeclared: BTreeMap<String, Vec<String>>,
}

impl TokenGraph {
    /// Build the graph from flattened token values.
    pub fn from_tokens(tokens: &BTreeMap<String, String>) -> Self {
        let mut graph = DiGraph::with_capacity(tokens.len(), tokens.len());
        let mut node_map = HashMap::with_capacity(tokens.len());

        for name in tokens.keys() {
            let index = graph.add_node(name.clone());
            node_map.insert(name.clone(), index);
        }

        let mut undeclared: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in tokens {
            let from = node_map[name];
            for candidate in placeholder_candidates(value) {
                if let Some(&to) = node_map.get(candidate)
                    && !graph.contains_edge(from, to)
                {
                    graph.add_edge(from, to, ());
                }
            }
            for referenced in references(value) {
                if node_map.contains_key(referenced) {
                    continue;
                }
                let missing = undeclared.entry(name.clone()).or_default();
                if !missing.iter().any(|m| m == referenced) {
                    missing.push(referenced.to_string());
                }
            }
        }

        Self {
            graph,
            node_map,
            undeclared,
        }
    }

    /// Whether `name` is a node of the graph.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.node_map.contains_key(name)
    }

    /// Get the total number of tokens in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the total number of references between declared tokens.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Undeclared names referenced by `name`'s value.
    #[must_use]
    pub fn undeclared_references(&self, name: &str) -> &[String] {
        self.undeclared.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Declared tokens referenced directly by `name`, sorted.
    #[must_use]
    pub fn direct_dependencies(&self, name: &str) -> Vec<&str> {
        let Some(&index) = self.node_map.get(name) else {
            return Vec::new();
        };
        let mut deps: Vec<&str> =
            self.graph.neighbors(index).map(|idx| self.graph[idx].as_str()).collect();
        deps.sort_unstable();
        deps
    }

    /// Every declared token reachable from `roots`, the roots included.
    ///
    /// Roots that are not declared are ignored.
    pub fn reachable_from<'a, I>(&self, roots: I) -> BTreeSet<&str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::new();

        for root in roots {
            if let Some(&index) = self.node_map.get(root)
                && seen.insert(self.graph[index].as_str())
            {
                queue.push_back(index);
            }
        }

        while let Some(current) = queue.pop_front() {
            for neighbor in self.graph.neighbors(current) {
                if seen.insert(self.graph[neighbor].as_str()) {
                    queue.push_back(neighbor);
                }
            }
        }

        seen
    }

    /// Detect cycles using DFS with colors.
    ///
    /// Returns [`TokensJarError::CyclicDependency`] with the cycle path, first
    /// token repeated at the end. A token referencing itself is a cycle.
    pub fn detect_cycles(&self) -> Result<()> {
        let mut colors: HashMap<NodeIndex, Color> =
            self.graph.node_indices().map(|node| (node, Color::White)).collect();

        for node in self.graph.node_indices() {
            if matches!(colors.get(&node), Some(Color::White))
                && let Some(cycle) = self.dfs_visit(node, &mut colors)
            {
                return Err(TokensJarError::CyclicDependency {
                    cycle: cycle.into_iter().map(|idx| self.graph[idx].clone()).collect(),
                });
            }
        }

        Ok(())
    }

    /// DFS visit for cycle detection.
    ///
    /// Iterative, with an explicit stack of `(node, remaining neighbors)`, so
    /// reference chains of any length stay off the call stack. The stack is
    /// the current gray path.
    ///
    /// Returns `Some(cycle_path)` if a cycle is detected, None otherwise.
    fn dfs_visit(
        &self,
        root: NodeIndex,
        colors: &mut HashMap<NodeIndex, Color>,
    ) -> Option<Vec<NodeIndex>> {
        let mut stack: Vec<(NodeIndex, Neighbors<'_, ()>)> = Vec::new();
        colors.insert(root, Color::Gray);
        stack.push((root, self.graph.neighbors(root)));

        while let Some(top) = stack.last_mut() {
            let node = top.0;
            let Some(neighbor) = top.1.next() else {
                stack.pop();
                colors.insert(node, Color::Black);
                continue;
            };

            match colors.get(&neighbor) {
                Some(Color::Gray) => {
                    let start = stack.iter().position(|(n, _)| *n == neighbor).unwrap_or(0);
                    let mut cycle: Vec<NodeIndex> = stack[start..].iter().map(|(n, _)| *n).collect();
                    cycle.push(neighbor);
                    return Some(cycle);
                }
                Some(Color::White) => {
                    colors.insert(neighbor, Color::Gray);
                    stack.push((neighbor, self.graph.neighbors(neighbor)));
                }
                _ => {}
            }
        }

        None
    }

    /// Tokens ordered so every token comes after all tokens it references.
    ///
    /// Kahn's algorithm over remaining out-degrees; among tokens that are
    /// ready at the same time the smallest name goes first, so the order is
    /// deterministic.
    pub fn topological_order(&self) -> Result<Vec<&str>> {
        self.detect_cycles()?;

        let mut pending: HashMap<NodeIndex, usize> = self
            .graph
            .node_indices()
            .map(|idx| (idx, self.graph.neighbors(idx).count()))
            .collect();
        let mut ready: BTreeSet<(&str, NodeIndex)> = pending
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(&idx, _)| (self.graph[idx].as_str(), idx))
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some((name, index)) = ready.pop_first() {
            order.push(name);
            for dependent in self.graph.neighbors_directed(index, Direction::Incoming) {
                if let Some(count) = pending.get_mut(&dependent) {
                    *count -= 1;
                    if *count == 0 {
                        ready.insert((self.graph[dependent].as_str(), dependent));
                    }
                }
            }
        }

        if order.len() != self.graph.node_count() {
            // Unreachable after detect_cycles, kept so a bad order is never returned
            return Err(TokensJarError::Other {
                message: "Failed to determine token substitution order".to_string(),
            });
        }

        Ok(order)
    }

    /// Build a human-readable tree of the references below `root`.
    ///
    /// Branches deeper than [`MAX_TREE_DEPTH`] are elided with `...`.
    pub fn to_tree_string(&self, root: &str) -> String {
        let mut result = format!("{root}\n");
        let mut on_path = HashSet::from([root.to_string()]);
        let mut stack = vec![TreeFrame {
            node: root.to_string(),
            children: self.tree_children(root),
            next: 0,
            prefix: String::new(),
        }];

        while let Some(frame) = stack.last_mut() {
            let Some((child, declared)) = frame.children.get(frame.next).cloned() else {
                if let Some(done) = stack.pop() {
                    on_path.remove(&done.node);
                }
                continue;
            };
            frame.next += 1;

            let is_last = frame.next == frame.children.len();
            let connector = if is_last {
                "└── "
            } else {
                "├── "
            };
            let child_prefix = if is_last {
                format!("{}    ", frame.prefix)
            } else {
                format!("{}│   ", frame.prefix)
            };
            result.push_str(&format!("{}{connector}{child}", frame.prefix));

            if !declared {
                result.push_str(" (undeclared)\n");
                continue;
            }
            result.push('\n');

            if !on_path.insert(child.clone()) {
                result.push_str(&format!("{child_prefix}└── (circular reference)\n"));
                continue;
            }

            let children = self.tree_children(&child);
            if stack.len() >= MAX_TREE_DEPTH && !children.is_empty() {
                result.push_str(&format!("{child_prefix}└── ...\n"));
                on_path.remove(&child);
                continue;
            }

            stack.push(TreeFrame {
                node: child,
                children,
                next: 0,
                prefix: child_prefix,
            });
        }

        result
    }

    /// Declared dependencies (sorted) then undeclared references of `node`.
    fn tree_children(&self, node: &str) -> Vec<(String, bool)> {
        let mut children: Vec<(String, bool)> = self
            .direct_dependencies(node)
            .into_iter()
            .map(|dep| (dep.to_string(), true))
            .collect();
        children.extend(self.undeclared_references(node).iter().map(|m| (m.clone(), false)));
        children
    }
}

/// One level of the tree walk in [`TokenGraph::to_tree_string`].
struct TreeFrame {
    node: String,
    children: Vec<(String, bool)>,
    next: usize,
    prefix: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_simple_dependency_chain() {
        // A -> B -> C
        let graph = TokenGraph::from_tokens(&tokens(&[("A", "$(B)"), ("B", "$(C)"), ("C", "c")]));

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.topological_order().unwrap(), vec!["C", "B", "A"]);
    }

    #[test]
    fn test_diamond_dependency() {
        // A -> B, A -> C, B -> D, C -> D
        let graph = TokenGraph::from_tokens(&tokens(&[
            ("A", "$(B)$(C)"),
            ("B", "$(D)"),
            ("C", "$(D)"),
            ("D", "d"),
        ]));

        assert_eq!(graph.topological_order().unwrap(), vec!["D", "B", "C", "A"]);
    }

    #[test]
    fn test_independent_tokens_sorted_by_name() {
        let graph = TokenGraph::from_tokens(&tokens(&[("Z", "z"), ("M", "m"), ("A", "a")]));
        assert_eq!(graph.topological_order().unwrap(), vec!["A", "M", "Z"]);
    }

    #[test]
    fn test_circular_dependency_detection() {
        let graph = TokenGraph::from_tokens(&tokens(&[("A", "$(B)"), ("B", "$(A)")]));

        let err = graph.detect_cycles().unwrap_err();
        assert_eq!(
            err,
            TokensJarError::CyclicDependency {
                cycle: vec!["A".to_string(), "B".to_string(), "A".to_string()],
            }
        );
        assert!(graph.topological_order().is_err());
    }

    #[test]
    fn test_longer_cycle_reports_path() {
        let graph = TokenGraph::from_tokens(&tokens(&[
            ("A", "$(B)"),
            ("B", "$(C)"),
            ("C", "$(A)"),
            ("D", "$(A)"),
        ]));

        match graph.detect_cycles() {
            Err(TokensJarError::CyclicDependency {
                cycle,
            }) => {
                assert_eq!(cycle.first(), cycle.last());
                assert_eq!(cycle.len(), 4);
                assert!(!cycle.contains(&"D".to_string()));
            }
            other => panic!("expected a cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_self_reference_is_cycle() {
        let graph = TokenGraph::from_tokens(&tokens(&[("A", "x$(A)")]));
        assert!(matches!(graph.detect_cycles(), Err(TokensJarError::CyclicDependency { .. })));
    }

    #[test]
    fn test_undeclared_references_recorded() {
        let graph = TokenGraph::from_tokens(&tokens(&[("X", "$(TOKEN)_$(TOKEN)_$(Y)"), ("Y", "y")]));

        assert_eq!(graph.undeclared_references("X"), ["TOKEN"]);
        assert!(graph.undeclared_references("Y").is_empty());
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_duplicate_references_single_edge() {
        let graph = TokenGraph::from_tokens(&tokens(&[("A", "$(B)$(B)"), ("B", "b")]));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_reachable_from() {
        let graph = TokenGraph::from_tokens(&tokens(&[
            ("A", "$(B)"),
            ("B", "$(C)"),
            ("C", "c"),
            ("D", "d"),
        ]));

        let reachable = graph.reachable_from(["A", "UNKNOWN"]);
        assert_eq!(reachable.into_iter().collect::<Vec<_>>(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_empty_graph() {
        let graph = TokenGraph::from_tokens(&BTreeMap::new());
        assert_eq!(graph.node_count(), 0);
        assert!(graph.detect_cycles().is_ok());
        assert!(graph.topological_order().unwrap().is_empty());
    }

    #[test]
    fn test_tree_string() {
        let graph = TokenGraph::from_tokens(&tokens(&[
            ("SALUT", "$(TEST)/$(ADIOS)/$(MISSING)"),
            ("TEST", "TestValue"),
            ("ADIOS", "Adios"),
        ]));

        let tree = graph.to_tree_string("SALUT");
        assert_eq!(tree, "SALUT\n├── ADIOS\n├── TEST\n└── MISSING (undeclared)\n");
    }

    #[test]
    fn test_edge_to_token_inside_unbalanced_reference() {
        let graph = TokenGraph::from_tokens(&tokens(&[("T", "pre $(X and $(Y)"), ("Y", "y")]));

        assert_eq!(graph.direct_dependencies("T"), vec!["Y"]);
        assert_eq!(graph.undeclared_references("T"), ["X and $(Y"]);
        assert_eq!(graph.topological_order().unwrap(), vec!["Y", "T"]);
    }

    fn chain(length: usize) -> BTreeMap<String, String> {
        let mut tokens: BTreeMap<String, String> =
            (0..length).map(|i| (format!("T{i}"), format!("$(T{})", i + 1))).collect();
        tokens.insert(format!("T{length}"), "end".to_string());
        tokens
    }

    #[test]
    fn test_deep_chain_without_stack_overflow() {
        let graph = TokenGraph::from_tokens(&chain(100_000));

        assert!(graph.detect_cycles().is_ok());
        let order = graph.topological_order().unwrap();
        assert_eq!(order.first(), Some(&"T100000"));
        assert_eq!(order.last(), Some(&"T0"));
    }

    #[test]
    fn test_deep_cycle_detected() {
        let mut tokens = chain(100_000);
        tokens.insert("T100000".to_string(), "$(T0)".to_string());
        let graph = TokenGraph::from_tokens(&tokens);

        match graph.detect_cycles() {
            Err(TokensJarError::CyclicDependency {
                cycle,
            }) => {
                assert_eq!(cycle.len(), 100_002);
                assert_eq!(cycle.first(), cycle.last());
            }
            other => panic!("expected a cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_tree_string_depth_capped() {
        let graph = TokenGraph::from_tokens(&chain(1_000));

        let tree = graph.to_tree_string("T0");
        assert_eq!(tree.lines().count(), MAX_TREE_DEPTH + 2);
        assert!(tree.ends_with("└── ...\n"));
    }

    #[test]
    fn test_tree_string_marks_cycles() {
        let graph = TokenGraph::from_tokens(&tokens(&[("A", "$(B)"), ("B", "$(A)")]));

        let tree = graph.to_tree_string("A");
        assert!(tree.contains("(circular reference)"));
    }
}
