//! Mediadrop Storage Library
//!
//! The `MediaHost` abstraction and its backends. A media host takes a file that
//! has already been written to local disk and makes it reachable under a public
//! URL.
//!
//! - **Cloudinary**: signed REST upload; the URL is the `secure_url` Cloudinary returns.
//! - **Local**: the file is copied under `{LOCAL_STORAGE_PATH}/media/` and served by
//!   this service at `{LOCAL_STORAGE_BASE_URL}/media/{file}`.

#[cfg(feature = "host-cloudinary")]
pub mod cloudinary;
pub mod factory;
#[cfg(feature = "host-local")]
pub mod local;
pub mod traits;

// Re-export commonly used types
#[cfg(feature = "host-cloudinary")]
pub use cloudinary::CloudinaryHost;
pub use factory::create_media_host;
#[cfg(feature = "host-local")]
pub use local::LocalHost;
pub use mediadrop_core::MediaHostBackend;
pub use traits::{HostedMedia, MediaHost, StorageError, StorageResult};
