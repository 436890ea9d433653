//! CareerLens Common Library
//!
//! Shared code for the CareerLens services including:
//! - Database models and repository
//! - Embedding provider abstraction
//! - Narrative generation provider abstraction
//! - Error types and handling
//! - Configuration management
//! - Authentication utilities
//! - Metrics registration

pub mod auth;
pub mod config;
pub mod db;
pub mod embeddings;
pub mod errors;
pub mod generation;
pub mod metrics;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::Repository;
pub use embeddings::Embedder;
pub use errors::{AppError, Result};
pub use generation::Generator;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default embedding model
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Embedding dimension used across the system
pub const EMBEDDING_DIMENSION: usize = 1536;
