//! Consistent JSON error responses: `{"error": ...}`.

use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use bedrock_core::Validator;

use crate::app::envelope::{write_json, Envelope};

/// Error envelope with `message` under the `error` key.
pub fn json_error(status: StatusCode, message: impl Serialize) -> Response {
    let mut envelope = Envelope::new();
    let written = envelope
        .insert_serialized("error", &message)
        .and_then(|()| write_json(status, &envelope, HeaderMap::new()));

    match written {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, "failed to encode error response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// 500; the detail is logged, never sent to the client.
pub fn server_error_response(err: impl std::fmt::Display) -> Response {
    tracing::error!(error = %err, "internal server error");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "the server encountered a problem and could not process your request",
    )
}

pub fn not_found_response() -> Response {
    json_error(
        StatusCode::NOT_FOUND,
        "the requested resource could not be found",
    )
}

pub fn method_not_allowed_response(method: &Method) -> Response {
    json_error(
        StatusCode::METHOD_NOT_ALLOWED,
        format!("the {method} method is not supported for this resource"),
    )
}

pub fn bad_request_response(err: impl std::fmt::Display) -> Response {
    json_error(StatusCode::BAD_REQUEST, err.to_string())
}

/// 422 with every recorded field error.
pub fn failed_validation_response(v: &Validator) -> Response {
    json_error(StatusCode::UNPROCESSABLE_ENTITY, v.errors())
}
