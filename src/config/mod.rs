//! Configuration loading and management.
//!
//! - [`types`]: Config struct definitions and file loading
//! - [`validation`]: Startup checks that collect every problem at once

mod types;
mod validation;

pub use types::{Config, CorsConfig, UploadConfig};
pub use validation::{is_weak_password, validate};
