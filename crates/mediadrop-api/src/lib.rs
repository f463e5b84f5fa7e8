//! Mediadrop API Library
//!
//! HTTP handlers, application state and router setup for the media upload,
//! drawing and frame-extraction service.

mod api_doc;
pub mod constants;
mod handlers;
pub mod setup;
mod utils;

pub mod error;
pub mod state;

// Re-exports
pub use error::HttpAppError;
pub use mediadrop_infra::ErrorResponse;
