//! Common fixtures for tokensjar integration tests

// Not every test file uses every helper
#![allow(dead_code)]

use tokensjar::TokenStore;
use tokensjar::test_utils::unix_config;

/// A jar using `:` as separator, seeded with `init` tokens.
pub fn jar_with_init(init: &[(&str, &str)]) -> TokenStore {
    TokenStore::with_init_tokens(init.iter().copied()).with_config(unix_config())
}

/// A jar using `:` as separator with the given raw tokens.
pub fn raw_jar(tokens: &[(&str, &str)]) -> TokenStore {
    let mut jar = jar_with_init(&[]);
    for (name, value) in tokens {
        jar.add_raw_value(*name, *value);
    }
    jar
}
