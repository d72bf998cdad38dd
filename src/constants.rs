//! Global constants used throughout the tokensjar codebase.
//!
//! Reference syntax markers and diagnostic tuning values live here so the
//! scanner, the resolver and the error formatting agree on them.

/// Opening marker of a token reference, as in `$(NAME)`.
pub const REFERENCE_OPEN: &str = "$(";

/// Closing marker of a token reference.
pub const REFERENCE_CLOSE: char = ')';

/// Path-list separator used on unix-like targets.
pub const UNIX_PATH_SEPARATOR: char = ':';

/// Path-list separator used on Windows targets.
pub const WINDOWS_PATH_SEPARATOR: char = ';';

/// Maximum number of "did you mean" suggestions attached to an undeclared token error.
pub const MAX_TOKEN_SUGGESTIONS: usize = 3;

/// Maximum Levenshtein distance for a suggestion, as a percentage of the name length.
///
/// A value of 50 accepts names that differ in at most half of their characters.
pub const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Deepest level rendered by dependency trees before branches are elided.
pub const MAX_TREE_DEPTH: usize = 64;
