//! Platform-specific helpers for path-list handling.
//!
//! Append and prepend tokens behave like `PATH`-style environment variables:
//! their segments are joined with the host's path-list separator (`:` on
//! unix-like systems, `;` on Windows). [`PathSeparator`] captures that choice
//! so it can be detected per host or pinned through configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{UNIX_PATH_SEPARATOR, WINDOWS_PATH_SEPARATOR};
use crate::core::TokensJarError;

/// Checks if the current platform is Windows.
#[must_use]
pub const fn is_windows() -> bool {
    cfg!(windows)
}

/// The character used to split and join multi-valued tokens.
///
/// # Examples
///
/// ```rust,no_run
/// use tokensjar::utils::platform::PathSeparator;
///
/// let sep = PathSeparator::new(':');
/// assert_eq!(sep.join(["a", "b"]), "a:b");
/// assert_eq!(sep.split("a:b"), vec!["a", "b"]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PathSeparator(char);

impl PathSeparator {
    /// Create a separator from an explicit character.
    #[must_use]
    pub const fn new(separator: char) -> Self {
        Self(separator)
    }

    /// The separator native to the host platform.
    #[must_use]
    pub const fn platform() -> Self {
        if is_windows() {
            Self(WINDOWS_PATH_SEPARATOR)
        } else {
            Self(UNIX_PATH_SEPARATOR)
        }
    }

    /// The separator character.
    #[must_use]
    pub const fn as_char(self) -> char {
        self.0
    }

    /// Split a path-list string into its segments.
    ///
    /// An empty input yields a single empty segment, so joining the result
    /// back gives the original string.
    pub fn split(self, value: &str) -> Vec<&str> {
        value.split(self.0).collect()
    }

    /// Join segments with this separator.
    pub fn join<I, S>(self, segments: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut joined = String::new();
        for (i, segment) in segments.into_iter().enumerate() {
            if i > 0 {
                joined.push(self.0);
            }
            joined.push_str(segment.as_ref());
        }
        joined
    }
}

impl Default for PathSeparator {
    fn default() -> Self {
        Self::platform()
    }
}

impl fmt::Display for PathSeparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for PathSeparator {
    type Error = TokensJarError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(Self(c)),
            _ => Err(TokensJarError::ConfigError {
                message: format!("separator must be exactly one character, got '{value}'"),
            }),
        }
    }
}

impl From<PathSeparator> for String {
    fn from(separator: PathSeparator) -> Self {
        separator.0.to_string()
    }
}
