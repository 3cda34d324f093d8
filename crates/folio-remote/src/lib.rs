//! # folio-remote
//!
//! HTTP client implementations of the collaborator seams defined in
//! `folio-core`:
//!
//! - [`HttpDurableStore`]: remote object storage for blob bytes
//! - [`HttpRemoteRegistry`]: reference-count queries against the hosted
//!   registry mirror
//! - [`HttpExtractor`]: bibliographic metadata extraction service
//!
//! All three share a [`RemoteConfig`] loaded from the environment.
//!
//! # Example
//!
//! ```rust,no_run
//! use folio_remote::{HttpDurableStore, HttpExtractor, HttpRemoteRegistry, RemoteConfig};
//!
//! let config = RemoteConfig::from_env();
//! let durable = HttpDurableStore::new(config.clone());
//! let registry = HttpRemoteRegistry::new(config.clone());
//! let extractor = HttpExtractor::new(config);
//! ```

pub mod config;
pub mod durable;
pub mod extractor;
pub mod registry;

// Re-export core types
pub use folio_core::*;

pub use config::RemoteConfig;
pub use durable::HttpDurableStore;
pub use extractor::HttpExtractor;
pub use registry::HttpRemoteRegistry;
