//! Error handling for tokensjar
//!
//! This module provides the error type returned by every fallible operation of
//! the crate, plus a small reporting layer for hosts that surface these errors
//! to people.
//!
//! # Architecture
//!
//! - [`TokensJarError`] - Enumerated error kinds for construction, resolution
//!   and configuration failures
//! - [`ErrorContext`] - Wrapper that adds a suggestion and details to an error
//!
//! All errors are deterministic: the same store and expression always produce
//! the same failure, so nothing here is retried.
//!
//! # Examples
//!
//! ```rust,no_run
//! use tokensjar::TokenStore;
//! use tokensjar::core::{TokensJarError, user_friendly_error};
//!
//! let mut jar = TokenStore::new();
//! jar.add_raw_value("GREETING", "hello $(NAME)");
//!
//! match jar.interpret("$(GREETING)") {
//!     Ok(value) => println!("{value}"),
//!     Err(TokensJarError::TokenNotDeclared { name, .. }) => {
//!         eprintln!("declare '{name}' before interpreting");
//!     }
//!     Err(e) => user_friendly_error(e.into()).display(),
//! }
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for tokensjar operations
///
/// # Error Categories
///
/// - [`BadInitTokens`] - Initial tokens were not a name → string mapping
/// - [`TokenNotDeclared`] - Strict resolution met an undeclared `$(NAME)`
/// - [`CyclicDependency`] - Token values reference each other in a loop
/// - [`ConfigError`] - Configuration could not be parsed or is invalid
///
/// [`BadInitTokens`]: TokensJarError::BadInitTokens
/// [`TokenNotDeclared`]: TokensJarError::TokenNotDeclared
/// [`CyclicDependency`]: TokensJarError::CyclicDependency
/// [`ConfigError`]: TokensJarError::ConfigError
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokensJarError {
    /// Initial tokens were not a mapping of token names to string values
    ///
    /// Raised by the dynamically-typed constructors before anything is stored.
    #[error("Initial tokens must be a mapping of token names to strings: {reason}")]
    BadInitTokens {
        /// What was wrong with the supplied value
        reason: String,
    },

    /// A `$(NAME)` reference names a token that was never declared
    ///
    /// Only raised in strict mode. Relaxed resolution leaves the reference
    /// untouched instead.
    #[error("Token '{name}' is not declared")]
    TokenNotDeclared {
        /// The referenced token name
        name: String,
        /// Declared token names close to `name`, closest first
        suggestions: Vec<String>,
    },

    /// Token values reference each other in a loop
    ///
    /// The cycle path starts and ends with the same token, e.g. `A → B → A`.
    #[error("Cyclic dependency detected between tokens: {}", .cycle.join(" → "))]
    CyclicDependency {
        /// Token names along the cycle, first name repeated at the end
        cycle: Vec<String>,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// Other error with custom message
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TokensJarError>;

/// Error wrapper carrying a suggestion and details for display
///
/// # Examples
///
/// ```rust,no_run
/// use tokensjar::core::{ErrorContext, TokensJarError};
///
/// let context = ErrorContext::new(TokensJarError::CyclicDependency {
///     cycle: vec!["A".into(), "B".into(), "A".into()],
/// })
/// .with_suggestion("Break the loop by giving one of the tokens a literal value");
///
/// context.display();
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: TokensJarError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: TokensJarError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// - Error message: Red and bold
    /// - Details: Yellow
    /// - Suggestion: Green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with a tailored suggestion
///
/// Errors that are not a [`TokensJarError`] are wrapped in
/// [`TokensJarError::Other`] with their full cause chain.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(jar_error) = error.downcast_ref::<TokensJarError>() {
        return create_error_context(jar_error.clone());
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(TokensJarError::ConfigError {
            message: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax of the configuration. Verify quotes and key names");
    }

    let mut message = error.to_string();

    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(TokensJarError::Other {
        message,
    })
}

fn create_error_context(error: TokensJarError) -> ErrorContext {
    match &error {
        TokensJarError::BadInitTokens {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Pass an object whose values are all strings, e.g. {\"PATH\": \"/usr/bin\"}")
            .with_details("Initial tokens seed append and prepend lists and must be plain strings"),

        TokensJarError::TokenNotDeclared {
            suggestions,
            ..
        } => {
            let suggestion = if suggestions.is_empty() {
                "Declare the token with add_raw_value, add_append_value or add_prepend_value, \
                 or interpret in relaxed mode to keep the reference as-is"
                    .to_string()
            } else {
                format!("Did you mean: {}?", suggestions.join(", "))
            };
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        TokensJarError::CyclicDependency {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Break the loop by giving one of the tokens a value that does not reference the others")
            .with_details("Tokens are substituted in dependency order, which is undefined for a cycle"),

        TokensJarError::ConfigError {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check the configuration keys 'separator' and 'strict'"),

        TokensJarError::Other {
            ..
        } => ErrorContext::new(error),
    }
}
