//! Password policy for new registrations.

use keyward_core::config::AuthConfig;
use keyward_core::error::AppError;

/// Enforces the configured minimum password length.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    min_length: usize,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
        }
    }

    /// The configured minimum length in characters.
    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Validate a candidate password.
    pub fn validate(&self, password: &str) -> Result<(), AppError> {
        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }
        Ok(())
    }
}
