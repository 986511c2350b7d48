//! Strict JSON request bodies.
//!
//! Request DTOs are expected to carry `#[serde(deny_unknown_fields)]`; the
//! decoder then turns every serde failure into a [`DecodeError`] that tells
//! the client what to fix.

use axum::async_trait;
use axum::body::Body;
use axum::extract::{FromRequest, Request};
use axum::response::{IntoResponse, Response};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use serde::de::DeserializeOwned;
use serde_json::error::Category;
use thiserror::Error;

use crate::app::errors;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 1_048_576;

/// Why a request body could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("body contains badly-formed JSON{}", at_character(.offset))]
    MalformedSyntax { offset: Option<usize> },

    #[error("body contains badly-formed JSON")]
    UnexpectedTermination,

    #[error("{}", type_mismatch(.field, .offset))]
    TypeMismatch {
        field: Option<String>,
        offset: Option<usize>,
    },

    #[error("body must not be empty")]
    EmptyBody,

    #[error("body contains unknown key {field:?}")]
    UnknownField { field: String },

    #[error("body must not be larger than {limit} bytes")]
    TooLarge { limit: usize },

    #[error("body must contain a single JSON value")]
    TrailingContent,
}

fn at_character(offset: &Option<usize>) -> String {
    match offset {
        Some(n) => format!(" (at character {n})"),
        None => String::new(),
    }
}

fn type_mismatch(field: &Option<String>, offset: &Option<usize>) -> String {
    match field {
        Some(f) => format!("body contains incorrect JSON type for field {f:?}"),
        None => format!("body contains incorrect JSON type{}", at_character(offset)),
    }
}

impl IntoResponse for DecodeError {
    fn into_response(self) -> Response {
        errors::bad_request_response(self)
    }
}

/// Decode exactly one JSON value of type `T` from `body`.
pub fn decode<T: DeserializeOwned>(body: &[u8], limit: usize) -> Result<T, DecodeError> {
    if body.len() > limit {
        return Err(DecodeError::TooLarge { limit });
    }
    if body.iter().all(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r')) {
        return Err(DecodeError::EmptyBody);
    }

    let mut de = serde_json::Deserializer::from_slice(body);
    let value = serde_path_to_error::deserialize(&mut de).map_err(|e| classify(body, e))?;
    de.end().map_err(|_| DecodeError::TrailingContent)?;
    Ok(value)
}

fn classify(body: &[u8], err: serde_path_to_error::Error<serde_json::Error>) -> DecodeError {
    let path = err.path().to_string();
    let inner = err.into_inner();
    let offset = byte_offset(body, inner.line(), inner.column());

    match inner.classify() {
        Category::Eof => DecodeError::UnexpectedTermination,
        Category::Syntax => DecodeError::MalformedSyntax { offset },
        Category::Data => {
            let msg = inner.to_string();
            if let Some(field) = unknown_field_name(&msg) {
                return DecodeError::UnknownField { field };
            }
            let field = match missing_field_name(&msg) {
                Some(missing) if path == "." => Some(missing),
                Some(missing) => Some(format!("{path}.{missing}")),
                None if path == "." => None,
                None => Some(path),
            };
            DecodeError::TypeMismatch { field, offset }
        }
        Category::Io => unreachable!("decoding from an in-memory buffer cannot fail with I/O"),
    }
}

/// Key named by serde's "unknown field `...`, expected ..." message.
///
/// The key itself may contain backticks, so it ends at the last separator
/// serde writes after it.
fn unknown_field_name(msg: &str) -> Option<String> {
    let rest = msg.strip_prefix("unknown field `")?;
    let end = rest
        .rfind("`, expected ")
        .or_else(|| rest.rfind("`, there are no fields"))?;
    Some(rest[..end].to_owned())
}

/// Field named by serde's "missing field `...`" message.
fn missing_field_name(msg: &str) -> Option<String> {
    let rest = msg.strip_prefix("missing field `")?;
    let end = rest.rfind('`')?;
    Some(rest[..end].to_owned())
}

/// Convert serde_json's 1-based line/column into a byte count from the start.
fn byte_offset(body: &[u8], line: usize, column: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }
    let line_start = if line == 1 {
        0
    } else {
        body.iter()
            .enumerate()
            .filter(|(_, b)| **b == b'\n')
            .nth(line - 2)
            .map(|(i, _)| i + 1)?
    };
    Some(line_start + column)
}

/// Extractor that reads at most [`MAX_BODY_BYTES`] and decodes strictly.
///
/// ```ignore
/// async fn create(StrictJson(input): StrictJson<CreateInput>) -> Response { ... }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for StrictJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = DecodeError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let body = read_body(req.into_body(), MAX_BODY_BYTES).await?;
        decode(&body, MAX_BODY_BYTES).map(StrictJson)
    }
}

async fn read_body(body: Body, limit: usize) -> Result<axum::body::Bytes, DecodeError> {
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            Err(DecodeError::TooLarge { limit })
        }
        // The client went away or the stream broke mid-body.
        Err(e) => {
            tracing::debug!(error = %e, "failed to read request body");
            Err(DecodeError::UnexpectedTermination)
        }
    }
}
