//! Token storage and merge strategies
//!
//! A [`TokenStore`] accumulates string contributions per token name under one
//! of three [`Strategy`] tags and collapses them into a single value per name
//! on demand.
//!
//! # Merge Model
//!
//! | Strategy  | Flattened value                                                |
//! |-----------|----------------------------------------------------------------|
//! | `Raw`     | the last contributed value                                     |
//! | `Prepend` | contributions newest first, then the initial value's segments  |
//! | `Append`  | the initial value's segments, then contributions oldest first  |
//!
//! Append and prepend results are joined with the configured
//! [`PathSeparator`], the same way `PATH`-like environment variables are.
//!
//! When a name carries contributions under several strategies, they are
//! flattened in the order raw, prepend, append and the last one wins.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::collections::BTreeMap;
//! use tokensjar::TokenStore;
//! use tokensjar::config::JarConfig;
//!
//! let init = BTreeMap::from([("PATH".to_string(), "/usr/bin".to_string())]);
//! let mut jar = TokenStore::with_init_tokens(init).with_config(JarConfig::default().with_separator(':'));
//! jar.add_prepend_value("PATH", "/opt/tool/bin");
//! jar.add_append_value("LIBS", "a");
//!
//! let tokens = jar.flattened_tokens();
//! assert_eq!(tokens["LIBS"], "a");
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, AddAssign};

use crate::config::JarConfig;
use crate::core::{Result, TokensJarError};
use crate::resolver::{ResolveMode, Resolver, TokenGraph};
use crate::utils::platform::PathSeparator;

/// How contributions to the same token combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Strategy {
    /// Later values replace earlier ones.
    Raw,
    /// Values are put in front of the existing value.
    Prepend,
    /// Values are put after the existing value.
    Append,
}

impl Strategy {
    /// All strategies in flattening order.
    pub const ALL: [Strategy; 3] = [Strategy::Raw, Strategy::Prepend, Strategy::Append];

    /// Lowercase tag for this strategy.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Strategy::Raw => "raw",
            Strategy::Prepend => "prepend",
            Strategy::Append => "append",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type Jar = BTreeMap<String, Vec<String>>;

/// Named string tokens contributed from multiple sources.
///
/// The store only accumulates: there is no way to remove a contribution.
/// Initial tokens are fixed at construction and only seed the append and
/// prepend strategies.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    init_tokens: BTreeMap<String, String>,
    jars: BTreeMap<Strategy, Jar>,
    config: JarConfig,
}

impl TokenStore {
    /// Create an empty store with no initial tokens.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with initial tokens.
    ///
    /// Each initial value may hold several segments joined by the path
    /// separator, as environment variables such as `PATH` do.
    pub fn with_init_tokens<I, K, V>(init_tokens: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            init_tokens: init_tokens.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            ..Self::default()
        }
    }

    /// Create a store from a dynamically-typed initial tokens value.
    ///
    /// The value must be a JSON object whose values are all strings. Anything
    /// else fails with [`TokensJarError::BadInitTokens`] and no store is built.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use serde_json::json;
    /// use tokensjar::TokenStore;
    ///
    /// assert!(TokenStore::from_init_value(json!({"PATH": "/usr/bin"})).is_ok());
    /// assert!(TokenStore::from_init_value(json!("pouet")).is_err());
    /// ```
    pub fn from_init_value(value: serde_json::Value) -> Result<Self> {
        let map = match value {
            serde_json::Value::Object(map) => map,
            other => {
                return Err(TokensJarError::BadInitTokens {
                    reason: format!("expected an object, got {}", json_type_name(&other)),
                });
            }
        };

        let mut init_tokens = BTreeMap::new();
        for (name, value) in map {
            match value {
                serde_json::Value::String(s) => {
                    init_tokens.insert(name, s);
                }
                other => {
                    return Err(TokensJarError::BadInitTokens {
                        reason: format!(
                            "value of '{name}' must be a string, got {}",
                            json_type_name(&other)
                        ),
                    });
                }
            }
        }

        Ok(Self::with_init_tokens(init_tokens))
    }

    /// Replace the store configuration.
    #[must_use]
    pub fn with_config(mut self, config: JarConfig) -> Self {
        self.config = config;
        self
    }

    /// The store configuration.
    #[must_use]
    pub const fn config(&self) -> &JarConfig {
        &self.config
    }

    /// The separator used for append and prepend tokens.
    #[must_use]
    pub const fn separator(&self) -> PathSeparator {
        self.config.separator
    }

    /// The initial tokens supplied at construction.
    #[must_use]
    pub const fn init_tokens(&self) -> &BTreeMap<String, String> {
        &self.init_tokens
    }

    /// Add a raw value for a token. The last raw value wins.
    pub fn add_raw_value(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.add_value(Strategy::Raw, name.into(), value.into());
    }

    /// Append a value to a token.
    ///
    /// On flattening all appended values follow the initial value, separated
    /// by the path separator.
    pub fn add_append_value(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.add_value(Strategy::Append, name.into(), value.into());
    }

    /// Prepend a value to a token.
    ///
    /// On flattening the most recent prepend comes first, followed by older
    /// ones and then the initial value, separated by the path separator.
    pub fn add_prepend_value(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.add_value(Strategy::Prepend, name.into(), value.into());
    }

    /// Add a value under an explicit strategy.
    pub fn add_value(&mut self, strategy: Strategy, name: String, value: String) {
        self.jars.entry(strategy).or_default().entry(name).or_default().push(value);
    }

    /// Contributions recorded for `name` under `strategy`, oldest first.
    #[must_use]
    pub fn values(&self, strategy: Strategy, name: &str) -> &[String] {
        self.jars
            .get(&strategy)
            .and_then(|jar| jar.get(name))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Merge another store into this one, consuming it.
    ///
    /// For every strategy and token name, `other`'s contributions are appended
    /// after this store's. The receiver keeps its own initial tokens and
    /// configuration. Returns the receiver, not a copy.
    pub fn merge(&mut self, other: TokenStore) -> &mut Self {
        tracing::debug!(
            "Merging token store with {} contribution list(s)",
            other.jars.values().map(BTreeMap::len).sum::<usize>()
        );
        for (strategy, jar) in other.jars {
            let target = self.jars.entry(strategy).or_default();
            for (name, values) in jar {
                target.entry(name).or_default().extend(values);
            }
        }
        self
    }

    /// Merge a borrowed store into this one. See [`TokenStore::merge`].
    pub fn merge_from(&mut self, other: &TokenStore) -> &mut Self {
        for (strategy, jar) in &other.jars {
            let target = self.jars.entry(*strategy).or_default();
            for (name, values) in jar {
                target.entry(name.clone()).or_default().extend(values.iter().cloned());
            }
        }
        self
    }

    /// Names of every declared token, sorted.
    #[must_use]
    pub fn token_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> =
            self.jars.values().flat_map(|jar| jar.keys().map(String::as_str)).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Whether any strategy has a contribution for `name`.
    #[must_use]
    pub fn contains_token(&self, name: &str) -> bool {
        self.jars.values().any(|jar| jar.contains_key(name))
    }

    /// Number of declared tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.token_names().len()
    }

    /// Whether no token has been declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jars.values().all(BTreeMap::is_empty)
    }

    /// Collapse every token's contributions into a single value.
    ///
    /// Strategies are applied in the order raw, prepend, append; a later
    /// strategy overwrites an earlier one for the same name.
    #[must_use]
    pub fn flattened_tokens(&self) -> BTreeMap<String, String> {
        let sep = self.config.separator;
        let mut tokens = BTreeMap::new();

        for strategy in Strategy::ALL {
            let Some(jar) = self.jars.get(&strategy) else {
                continue;
            };
            for (name, values) in jar {
                let value = match strategy {
                    Strategy::Raw => match values.last() {
                        Some(last) => last.clone(),
                        None => continue,
                    },
                    Strategy::Prepend => {
                        let mut segments: Vec<&str> =
                            values.iter().rev().map(String::as_str).collect();
                        if let Some(init) = self.init_tokens.get(name) {
                            segments.extend(sep.split(init));
                        }
                        sep.join(segments)
                    }
                    Strategy::Append => {
                        let mut segments: Vec<&str> = self
                            .init_tokens
                            .get(name)
                            .map(|init| sep.split(init))
                            .unwrap_or_default();
                        segments.extend(values.iter().map(String::as_str));
                        sep.join(segments)
                    }
                };
                tokens.insert(name.clone(), value);
            }
        }

        tokens
    }

    /// Expand every `$(NAME)` in `expression` using the configured mode.
    ///
    /// The default configuration is strict: undeclared references fail with
    /// [`TokensJarError::TokenNotDeclared`]. Cyclic token values fail with
    /// [`TokensJarError::CyclicDependency`] before anything is substituted.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use tokensjar::TokenStore;
    ///
    /// let mut jar = TokenStore::new();
    /// jar.add_raw_value("TEST", "TestValue");
    /// jar.add_raw_value("ADIOS", "Adios");
    /// jar.add_raw_value("SALUT", "$(TEST)/$(ADIOS)");
    ///
    /// assert_eq!(jar.interpret("$(SALUT)").unwrap(), "TestValue/Adios");
    /// ```
    pub fn interpret(&self, expression: &str) -> Result<String> {
        self.interpret_with(expression, self.config.resolve_mode())
    }

    /// Expand every `$(NAME)` in `expression` with an explicit mode.
    pub fn interpret_with(&self, expression: &str, mode: ResolveMode) -> Result<String> {
        let tokens = self.flattened_tokens();
        Resolver::new(&tokens)?.resolve(expression, mode)
    }

    /// Every declared token with its value fully expanded, in the configured mode.
    pub fn tokens_interpreted(&self) -> Result<BTreeMap<String, String>> {
        self.tokens_interpreted_with(self.config.resolve_mode())
    }

    /// Every declared token with its value fully expanded.
    pub fn tokens_interpreted_with(&self, mode: ResolveMode) -> Result<BTreeMap<String, String>> {
        let tokens = self.flattened_tokens();
        let resolver = Resolver::new(&tokens)?;

        tokens
            .iter()
            .map(|(name, value)| resolver.resolve(value, mode).map(|resolved| (name.clone(), resolved)))
            .collect()
    }

    /// Tree of the tokens referenced by `name`, for diagnostics.
    ///
    /// Returns `None` if `name` is not declared.
    #[must_use]
    pub fn dependency_tree(&self, name: &str) -> Option<String> {
        let tokens = self.flattened_tokens();
        let graph = TokenGraph::from_tokens(&tokens);
        graph.contains(name).then(|| graph.to_tree_string(name))
    }
}

impl TryFrom<serde_json::Value> for TokenStore {
    type Error = TokensJarError;

    fn try_from(value: serde_json::Value) -> Result<Self> {
        Self::from_init_value(value)
    }
}

impl AddAssign<TokenStore> for TokenStore {
    fn add_assign(&mut self, other: TokenStore) {
        self.merge(other);
    }
}

impl AddAssign<&TokenStore> for TokenStore {
    fn add_assign(&mut self, other: &TokenStore) {
        self.merge_from(other);
    }
}

impl Add<TokenStore> for TokenStore {
    type Output = TokenStore;

    fn add(mut self, other: TokenStore) -> TokenStore {
        self.merge(other);
        self
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
