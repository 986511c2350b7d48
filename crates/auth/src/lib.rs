//! Credential material and its validation rules.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod password;
pub mod rules;

pub use password::{Password, PasswordError};
pub use rules::{validate_email, validate_password, validate_password_plaintext};
