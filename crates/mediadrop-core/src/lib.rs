//! Mediadrop Core Library
//!
//! This crate provides the error types, configuration and constants that are
//! shared across all Mediadrop components.

pub mod config;
pub mod constants;
pub mod error;
pub mod host_types;

// Re-export commonly used types
pub use config::{BaseConfig, Config, ServiceConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use host_types::MediaHostBackend;
