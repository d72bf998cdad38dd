//! Core types shared by the store and the resolver.

pub mod error;

pub use error::{ErrorContext, Result, TokensJarError, user_friendly_error};
