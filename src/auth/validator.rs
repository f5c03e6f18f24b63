//! Authentication validator
//!
//! The server has a single account; only its username is checked.

use crate::config::ServerConfig;
use crate::error::AuthError;

/// Performs basic input sanitation on a username.
fn is_valid_input(input: &str) -> bool {
    !input.trim().is_empty() && !input.contains(['\r', '\n', '\0'])
}

/// Validates `username` against the configured account. Case-sensitive.
pub fn validate_user(username: &str, config: &ServerConfig) -> Result<(), AuthError> {
    if !is_valid_input(username) {
        return Err(AuthError::MalformedInput("Invalid username format".into()));
    }

    if username == config.username {
        Ok(())
    } else {
        Err(AuthError::UserNotFound(username.to_string()))
    }
}
