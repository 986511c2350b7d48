//! Pure building blocks shared by every layer.
//!
//! This crate has no I/O: pagination arithmetic, list filters, and the
//! field-keyed validator used to report all input problems in one response.

pub mod pagination;
pub mod validator;

pub use pagination::{calculate_metadata, Filters, Metadata};
pub use validator::{Validator, EMAIL_RX};
