//! Test utilities for tokensjar
//!
//! Logging setup and ready-made jars shared by unit and integration tests.
//!
//! # Example
//!
//! ```rust,no_run
//! use tokensjar::test_utils::{init_test_logging, salut_jar};
//!
//! init_test_logging(None);
//! let jar = salut_jar();
//! assert_eq!(jar.interpret("$(SALUT)").unwrap(), "TestValue/Adios");
//! ```

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::config::JarConfig;
use crate::store::TokenStore;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` if given, otherwise the
/// `RUST_LOG` environment variable; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=tokensjar=trace cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}

/// Configuration with `:` as separator regardless of the host platform.
#[must_use]
pub fn unix_config() -> JarConfig {
    JarConfig::default().with_separator(':')
}

/// A jar with `TEST`, `ADIOS` and `SALUT = $(TEST)/$(ADIOS)` raw tokens.
#[must_use]
pub fn salut_jar() -> TokenStore {
    let mut jar = TokenStore::new().with_config(unix_config());
    jar.add_raw_value("TEST", "TestValue");
    jar.add_raw_value("ADIOS", "Adios");
    jar.add_raw_value("SALUT", "$(TEST)/$(ADIOS)");
    jar
}

/// A jar with one raw, one append and one prepend token.
#[must_use]
pub fn mixed_jar() -> TokenStore {
    let mut jar = TokenStore::new().with_config(unix_config());
    jar.add_raw_value("RAW", "MyRawValue");
    jar.add_append_value("APPEND", "MyAppendValue");
    jar.add_prepend_value("PREPEND", "MyPrependValue");
    jar
}
