//! tokensjar - Token Jar
//!
//! An in-memory engine that collects named string tokens from several sources
//! and expands `$(TOKEN)` references in expressions, much like a build tool
//! expands variables in command lines and environment settings.
//!
//! # Architecture Overview
//!
//! - A [`TokenStore`] accumulates contributions per token name under one of
//!   three strategies: raw (replace), append and prepend. Append and prepend
//!   behave like `PATH`-style lists joined by the platform separator.
//! - The [`resolver`] flattens the store, orders tokens by their references
//!   and substitutes placeholders until the expression is fully expanded.
//!
//! # Core Modules
//!
//! - [`store`] - Token storage, merge strategies and flattening
//! - [`resolver`] - Reference scanning, dependency graph and substitution
//! - [`config`] - Separator and strictness settings
//! - [`core`] - Error types and user-facing error reporting
//! - [`utils`] - Platform path-list separator handling
//!
//! # Example
//!
//! ```rust,no_run
//! use tokensjar::TokenStore;
//!
//! let mut jar = TokenStore::new();
//! jar.add_raw_value("TEST", "TestValue");
//! jar.add_raw_value("ADIOS", "Adios");
//! jar.add_raw_value("SALUT", "$(TEST)/$(ADIOS)");
//!
//! assert_eq!(jar.interpret("Coucou$(SALUT)Hello")?, "CoucouTestValue/AdiosHello");
//!
//! let mut overrides = TokenStore::new();
//! overrides.add_raw_value("TEST", "Override");
//! jar.merge(overrides);
//!
//! assert_eq!(jar.tokens_interpreted()?["SALUT"], "Override/Adios");
//! # Ok::<(), tokensjar::core::TokensJarError>(())
//! ```
//!
//! # Thread Safety
//!
//! Everything is synchronous and owned. A [`TokenStore`] can be moved between
//! threads, but concurrent mutation needs external locking.

pub mod config;
pub mod constants;
pub mod core;
pub mod resolver;
pub mod store;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use crate::config::JarConfig;
pub use crate::core::{Result, TokensJarError};
pub use crate::resolver::ResolveMode;
pub use crate::store::{Strategy, TokenStore};
