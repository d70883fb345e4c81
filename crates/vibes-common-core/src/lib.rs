//! Shared core types for the vibes toolset.

pub mod error;

pub use error::{Error, ErrorCategory, ErrorCode, Result};
