//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use axum::http::HeaderValue;
use std::path::Path;
use thiserror::Error;

/// Passwords shorter than this are accepted but logged as weak.
pub const MIN_RECOMMENDED_PASSWORD_LEN: usize = 8;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("admin.password must not be empty")]
    EmptyAdminPassword,
    #[error("cors.allowed_origins entry is not a valid http(s) origin: '{0}'")]
    InvalidOrigin(String),
    #[error("uploads.max_body_bytes must be greater than zero")]
    ZeroUploadLimit,
    #[error("database.path parent directory does not exist: {0}")]
    DatabasePathInvalid(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.admin.password.is_empty() {
        errors.push(ValidationError::EmptyAdminPassword);
    }

    for origin in &config.cors.allowed_origins {
        let scheme_ok = origin.starts_with("http://") || origin.starts_with("https://");
        if !scheme_ok || origin.ends_with('/') || HeaderValue::from_str(origin).is_err() {
            errors.push(ValidationError::InvalidOrigin(origin.clone()));
        }
    }

    if config.uploads.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroUploadLimit);
    }

    if config.database.path != ":memory:" {
        let db_path = Path::new(&config.database.path);
        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            errors.push(ValidationError::DatabasePathInvalid(
                config.database.path.clone(),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Whether the admin password is short enough to deserve a startup warning.
pub fn is_weak_password(password: &str) -> bool {
    password.chars().count() < MIN_RECOMMENDED_PASSWORD_LEN
}
