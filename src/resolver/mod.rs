//! Expression resolution
//!
//! The resolver expands `$(NAME)` placeholders in an expression using a set of
//! flattened token values. Token values may themselves reference other tokens,
//! so resolution works in three steps:
//!
//! 1. Build a [`TokenGraph`] where each token points at the tokens its value
//!    references, and reject cycles.
//! 2. Order the tokens so every token comes after the tokens it references,
//!    then walk that order backwards.
//! 3. Replace every `$(NAME)` in the expression with the token's value. A
//!    replacement can only introduce references to tokens that come later in
//!    the walk, so one pass expands everything.
//!
//! # Strictness
//!
//! In [`ResolveMode::Strict`] every reference in the expression, and in every
//! token value reachable from it, must name a declared token. In
//! [`ResolveMode::Relaxed`] unknown references are left in the output as-is.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::collections::BTreeMap;
//! use tokensjar::resolver::{ResolveMode, Resolver};
//!
//! let tokens = BTreeMap::from([
//!     ("TEST".to_string(), "TestValue".to_string()),
//!     ("ADIOS".to_string(), "Adios".to_string()),
//!     ("SALUT".to_string(), "$(TEST)/$(ADIOS)".to_string()),
//! ]);
//!
//! let resolver = Resolver::new(&tokens).unwrap();
//! assert_eq!(resolver.resolve("$(SALUT)", ResolveMode::Strict).unwrap(), "TestValue/Adios");
//! ```

pub mod dependency_graph;
pub mod reference;

use std::collections::BTreeMap;

use strsim::levenshtein;

pub use dependency_graph::TokenGraph;
pub use reference::{placeholder, references};

use crate::constants::{MAX_TOKEN_SUGGESTIONS, SIMILARITY_THRESHOLD_PERCENT};
use crate::core::{Result, TokensJarError};

/// How undeclared references are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResolveMode {
    /// Fail with [`TokensJarError::TokenNotDeclared`].
    #[default]
    Strict,
    /// Leave the `$(NAME)` text in the output.
    Relaxed,
}

/// Resolves expressions against a fixed set of flattened tokens.
///
/// Construction builds the dependency graph and the substitution order once,
/// so one resolver can expand many expressions.
pub struct Resolver<'a> {
    tokens: &'a BTreeMap<String, String>,
    graph: TokenGraph,
    /// Dependents before the tokens they reference.
    substitution_order: Vec<String>,
}

impl<'a> Resolver<'a> {
    /// Build a resolver over `tokens`.
    ///
    /// Fails with [`TokensJarError::CyclicDependency`] if token values
    /// reference each other in a loop. No expression can be resolved in that
    /// case.
    pub fn new(tokens: &'a BTreeMap<String, String>) -> Result<Self> {
        let graph = TokenGraph::from_tokens(tokens);
        let substitution_order: Vec<String> =
            graph.topological_order()?.into_iter().rev().map(str::to_string).collect();

        tracing::debug!(
            "Built token graph with {} token(s) and {} reference(s)",
            graph.node_count(),
            graph.edge_count()
        );
        tracing::trace!("Substitution order: {:?}", substitution_order);

        Ok(Self {
            tokens,
            graph,
            substitution_order,
        })
    }

    /// The dependency graph of the tokens.
    #[must_use]
    pub const fn graph(&self) -> &TokenGraph {
        &self.graph
    }

    /// Expand every `$(NAME)` placeholder in `expression`.
    pub fn resolve(&self, expression: &str, mode: ResolveMode) -> Result<String> {
        if mode == ResolveMode::Strict {
            self.check_declared(expression)?;
        }

        let mut resolved = expression.to_string();
        for name in &self.substitution_order {
            let needle = placeholder(name);
            if !resolved.contains(&needle) {
                continue;
            }
            tracing::trace!("Substituting {} in expression", needle);
            resolved = resolved.replace(&needle, &self.tokens[name]);
        }

        if mode == ResolveMode::Relaxed
            && let Some(name) = references(&resolved).next()
        {
            tracing::warn!("Leaving unresolved token reference '{}' in expression", name);
        }

        Ok(resolved)
    }

    /// Ensure every reference reachable from `expression` names a declared token.
    fn check_declared(&self, expression: &str) -> Result<()> {
        let mut roots = Vec::new();
        for name in references(expression) {
            if !self.graph.contains(name) {
                return Err(self.not_declared(name));
            }
            roots.push(name);
        }

        for token in self.graph.reachable_from(roots) {
            if let Some(missing) = self.graph.undeclared_references(token).first() {
                return Err(self.not_declared(missing));
            }
        }

        Ok(())
    }

    fn not_declared(&self, name: &str) -> TokensJarError {
        TokensJarError::TokenNotDeclared {
            name: name.to_string(),
            suggestions: find_similar_tokens(name, self.tokens.keys().map(String::as_str)),
        }
    }
}

/// Find declared token names similar to `target` using Levenshtein distance.
///
/// Returns at most [`MAX_TOKEN_SUGGESTIONS`] names, closest first.
pub fn find_similar_tokens<'a, I>(target: &str, available: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let max_distance = (target.chars().count() * SIMILARITY_THRESHOLD_PERCENT / 100).max(1);

    let mut scored: Vec<_> = available
        .into_iter()
        .map(|name| (name, levenshtein(target, name)))
        .filter(|(_, dist)| *dist <= max_distance)
        .collect();

    // Sort by distance, then name for stable output
    scored.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));

    scored.into_iter().take(MAX_TOKEN_SUGGESTIONS).map(|(name, _)| name.to_string()).collect()
}
