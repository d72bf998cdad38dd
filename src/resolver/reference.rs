//! Scanning of `$(NAME)` token references.
//!
//! A reference starts at a literal `$(` and ends at the next `)`. Whatever lies
//! in between is the token name, so names can never contain `)`, and nested
//! references are not recognised: in `$(A$(B))` the captured name is `A$(B`.
//! Empty references (`$()`) are skipped and an unterminated `$(` ends the scan.

use crate::constants::{REFERENCE_CLOSE, REFERENCE_OPEN};

/// Iterator over the token names referenced in a string, in order of appearance.
///
/// Names are yielded once per occurrence; duplicates are not removed.
#[derive(Debug, Clone)]
pub struct References<'a> {
    rest: &'a str,
}

impl<'a> Iterator for References<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        loop {
            let open = self.rest.find(REFERENCE_OPEN)?;
            let after_open = &self.rest[open + REFERENCE_OPEN.len()..];
            let Some(close) = after_open.find(REFERENCE_CLOSE) else {
                self.rest = "";
                return None;
            };

            if close == 0 {
                self.rest = after_open;
                continue;
            }

            self.rest = &after_open[close + REFERENCE_CLOSE.len_utf8()..];
            return Some(&after_open[..close]);
        }
    }
}

/// Scan `text` for token references.
///
/// # Examples
///
/// ```rust,no_run
/// use tokensjar::resolver::reference::references;
///
/// let names: Vec<_> = references("$(TEST)/$(ADIOS)").collect();
/// assert_eq!(names, vec!["TEST", "ADIOS"]);
/// ```
#[must_use]
pub fn references(text: &str) -> References<'_> {
    References {
        rest: text,
    }
}

/// Every non-empty substring enclosed by a `$(` and any later `)`.
///
/// A superset of [`references`]: it also yields names sitting inside an
/// unbalanced reference, such as `Y` in `$(X and $(Y)`, and names containing
/// `)`. Substitution replaces those placeholders too, so dependency edges are
/// derived from these candidates.
pub fn placeholder_candidates(text: &str) -> impl Iterator<Item = &str> {
    text.match_indices(REFERENCE_OPEN)
        .flat_map(move |(open, _)| {
            let start = open + REFERENCE_OPEN.len();
            text[start..]
                .match_indices(REFERENCE_CLOSE)
                .map(move |(close, _)| &text[start..start + close])
        })
        .filter(|name| !name.is_empty())
}

/// The placeholder text that refers to `name`, e.g. `$(NAME)`.
#[must_use]
pub fn placeholder(name: &str) -> String {
    format!("{REFERENCE_OPEN}{name}{REFERENCE_CLOSE}")
}
