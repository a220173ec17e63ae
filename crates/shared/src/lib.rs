//! Shared support code for the `mal` command line client.
//!
//! - Configuration management
//! - Persisted credentials
//! - Logging infrastructure

pub mod config;
pub mod credentials;
pub mod logging;

// Re-export commonly used types
pub use config::Config;
pub use credentials::{CredentialStore, StoredCredentials};
pub use logging::LogConfig;

/// Common result type using anyhow::Error
pub type Result<T> = anyhow::Result<T>;
