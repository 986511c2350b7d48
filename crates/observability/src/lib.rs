//! Structured logging shared by the server binary and the test suites.
//!
//! Everything logs through `tracing` macros; this crate only decides where
//! the events go.

mod subscriber;

pub use subscriber::{init, init_for_tests};
