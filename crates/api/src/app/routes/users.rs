use axum::extract::{Extension, Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use serde::Serialize;
use serde_json::json;

use bedrock_auth::Password;
use bedrock_core::{Filters, Validator};
use bedrock_infra::MailMessage;

use crate::app::dto::RegisterUserRequest;
use crate::app::envelope::{write_json, Envelope};
use crate::app::errors;
use crate::app::json::StrictJson;
use crate::app::query::{read_id_param, read_int, read_string, QueryParams};
use crate::directory::{DuplicateEmail, SORT_SAFELIST};
use crate::state::AppState;

pub const WELCOME_TEMPLATE: &str = "user_welcome.tmpl";

fn respond(status: StatusCode, key: &str, value: &impl Serialize) -> Response {
    let mut body = Envelope::new();
    body.insert_serialized(key, value)
        .and_then(|()| write_json(status, &body, HeaderMap::new()))
        .unwrap_or_else(|e| errors::server_error_response(e))
}

/// `POST /v1/users`: store the user, queue the welcome email, reply 202.
pub async fn register(
    Extension(state): Extension<AppState>,
    StrictJson(input): StrictJson<RegisterUserRequest>,
) -> Response {
    let mut v = Validator::new();
    input.validate(&mut v);
    if !v.valid() {
        return errors::failed_validation_response(&v);
    }

    let RegisterUserRequest {
        name,
        email,
        password,
    } = input;
    let cost = state.password_cost;
    let hashed = tokio::task::spawn_blocking(move || match cost {
        Some(cost) => Password::set_with_cost(password, cost),
        None => Password::set(password),
    });
    let password = match hashed.await {
        Ok(Ok(password)) => password,
        Ok(Err(e)) => return errors::server_error_response(e),
        Err(e) => return errors::server_error_response(e),
    };

    let user = match state.users.insert(name, email, password) {
        Ok(user) => user,
        Err(DuplicateEmail) => {
            let mut v = Validator::new();
            v.add_error("email", DuplicateEmail.to_string());
            return errors::failed_validation_response(&v);
        }
    };
    tracing::info!(user_id = user.id, "user registered");

    let mailer = state.mailer.clone();
    let message = MailMessage::new(
        user.email.clone(),
        WELCOME_TEMPLATE,
        json!({ "userID": user.id }),
    );
    state.supervisor.submit("send welcome email", async move {
        mailer.send(&message).await?;
        anyhow::Ok(())
    });

    respond(StatusCode::ACCEPTED, "user", &user)
}

/// `GET /v1/users/:id`
pub async fn show(Extension(state): Extension<AppState>, Path(raw): Path<String>) -> Response {
    let Ok(id) = read_id_param(&raw) else {
        return errors::not_found_response();
    };

    match state.users.get(id) {
        Some(user) => respond(StatusCode::OK, "user", &user),
        None => errors::not_found_response(),
    }
}

/// `GET /v1/users?name=&page=&page_size=&sort=`
pub async fn list(
    Extension(state): Extension<AppState>,
    Query(qs): Query<QueryParams>,
) -> Response {
    let mut v = Validator::new();

    let name = read_string(&qs, "name", "");
    let filters = Filters {
        page: read_int(&qs, "page", 1, &mut v),
        page_size: read_int(&qs, "page_size", 20, &mut v),
        sort: read_string(&qs, "sort", "id"),
        sort_safelist: SORT_SAFELIST.iter().map(|s| s.to_string()).collect(),
    };
    filters.validate(&mut v);
    if !v.valid() {
        return errors::failed_validation_response(&v);
    }

    let (users, metadata) = state.users.list(&name, &filters);

    let mut body = Envelope::new();
    body.insert_serialized("users", &users)
        .and_then(|()| body.insert_serialized("metadata", &metadata))
        .and_then(|()| write_json(StatusCode::OK, &body, HeaderMap::new()))
        .unwrap_or_else(|e| errors::server_error_response(e))
}
