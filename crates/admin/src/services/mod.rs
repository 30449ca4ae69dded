//! Business logic services for admin.
//!
//! # Services
//!
//! - `images` - Resize, re-encode and upload product and logo images

pub mod images;

pub use images::{ImageError, UploadedFile, upload_images};
