use axum::extract::Extension;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use serde_json::json;

use crate::app::envelope::{write_json, Envelope};
use crate::app::errors;
use crate::state::AppState;

pub async fn healthcheck(Extension(state): Extension<AppState>) -> Response {
    let body = Envelope::new().with("status", "available").with(
        "system_info",
        json!({
            "environment": state.env.as_str(),
            "version": env!("CARGO_PKG_VERSION"),
        }),
    );

    write_json(StatusCode::OK, &body, HeaderMap::new())
        .unwrap_or_else(|e| errors::server_error_response(e))
}
