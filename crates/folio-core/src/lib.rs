//! # folio-core
//!
//! Core types, traits, and abstractions for the folio document store.
//!
//! This crate provides the foundational data structures and trait definitions
//! that the storage engine and remote-client crates depend on.

pub mod defaults;
pub mod digest;
pub mod error;
pub mod file_safety;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use defaults::StoreLimits;
pub use digest::Digest;
pub use error::{Error, Result};
pub use file_safety::{detect_media_type, validate_file, ValidationResult};
pub use models::*;
pub use traits::*;
