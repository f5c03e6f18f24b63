//! Authentication system
//!
//! Handles username validation for the single configured account.

pub mod validator;

pub use validator::validate_user;
