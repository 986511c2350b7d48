//! HTTP API application wiring (Axum router).
//!
//! - `envelope.rs`: JSON response envelopes
//! - `json.rs`: strict request body decoding
//! - `query.rs`: query-string and path parameter helpers
//! - `errors.rs`: consistent error responses
//! - `routes/`: handlers, one file per resource

use axum::routing::{get, post};
use axum::{Extension, Router};

use crate::state::AppState;

pub mod dto;
pub mod envelope;
pub mod errors;
pub mod json;
pub mod query;
pub mod routes;

pub use envelope::{encode, write_json, Envelope};
pub use json::{decode, DecodeError, StrictJson, MAX_BODY_BYTES};

/// Build the full HTTP router.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route(
            "/v1/healthcheck",
            get(routes::system::healthcheck).fallback(routes::method_not_allowed),
        )
        .route(
            "/v1/users",
            post(routes::users::register)
                .get(routes::users::list)
                .fallback(routes::method_not_allowed),
        )
        .route(
            "/v1/users/:id",
            get(routes::users::show).fallback(routes::method_not_allowed),
        )
        .fallback(routes::not_found)
        .layer(Extension(state))
}
