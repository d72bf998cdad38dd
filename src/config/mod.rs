//! Configuration for a token jar
//!
//! A [`JarConfig`] fixes the two knobs of the engine:
//!
//! - `separator` - the path-list separator used to split initial values and
//!   join append/prepend contributions (defaults to the host convention)
//! - `strict` - whether [`TokenStore::interpret`](crate::TokenStore::interpret)
//!   fails on undeclared references (defaults to `true`)
//!
//! Hosts that keep settings in TOML can hand the text to
//! [`JarConfig::from_toml_str`]; reading files is left to the caller.
//!
//! ```toml
//! separator = ";"
//! strict = false
//! ```

use serde::{Deserialize, Serialize};

use crate::core::{Result, TokensJarError};
use crate::resolver::ResolveMode;
use crate::utils::platform::PathSeparator;

/// Settings shared by every operation on a [`TokenStore`](crate::TokenStore).
///
/// # Examples
///
/// ```rust,no_run
/// use tokensjar::config::JarConfig;
///
/// let config = JarConfig::from_toml_str("separator = \";\"").unwrap();
/// assert_eq!(config.separator.as_char(), ';');
/// assert!(config.strict);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JarConfig {
    /// Separator for multi-valued tokens.
    #[serde(default)]
    pub separator: PathSeparator,

    /// Fail on undeclared references instead of leaving them in place.
    #[serde(default = "default_strict")]
    pub strict: bool,
}

const fn default_strict() -> bool {
    true
}

impl Default for JarConfig {
    fn default() -> Self {
        Self {
            separator: PathSeparator::platform(),
            strict: default_strict(),
        }
    }
}

impl JarConfig {
    /// Parse a configuration from TOML text.
    ///
    /// Missing keys take their defaults; unknown keys are rejected.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| TokensJarError::ConfigError {
            message: e.to_string(),
        })
    }

    /// Serialize the configuration to TOML text.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| TokensJarError::ConfigError {
            message: e.to_string(),
        })
    }

    /// Use `separator` for joining and splitting multi-valued tokens.
    #[must_use]
    pub const fn with_separator(mut self, separator: char) -> Self {
        self.separator = PathSeparator::new(separator);
        self
    }

    /// Set the default resolution mode.
    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// The resolution mode used when none is given explicitly.
    #[must_use]
    pub const fn resolve_mode(&self) -> ResolveMode {
        if self.strict {
            ResolveMode::Strict
        } else {
            ResolveMode::Relaxed
        }
    }
}
