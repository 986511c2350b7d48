use axum::http::Method;
use axum::response::Response;

use crate::app::errors;

pub mod system;
pub mod users;

pub async fn not_found() -> Response {
    errors::not_found_response()
}

pub async fn method_not_allowed(method: Method) -> Response {
    errors::method_not_allowed_response(&method)
}
