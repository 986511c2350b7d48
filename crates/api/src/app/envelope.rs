//! Outbound JSON envelopes.

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use serde::Serialize;
use serde_json::{Map, Value};

/// Ordered top-level wrapper for a JSON response body.
///
/// Keys are written in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Envelope(Map<String, Value>);

impl Envelope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a field, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Add a field from any serializable value.
    pub fn insert_serialized<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<(), serde_json::Error> {
        self.0.insert(key.into(), serde_json::to_value(value)?);
        Ok(())
    }
}

/// Serialize `payload` as compact JSON followed by a newline.
pub fn encode<T: Serialize + ?Sized>(payload: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut body = serde_json::to_vec(payload)?;
    body.push(b'\n');
    Ok(body)
}

/// Build a JSON response with `status`, merging `headers` into the response.
///
/// `Content-Type: application/json` is always set last, so a caller-supplied
/// content type never wins.
pub fn write_json<T: Serialize + ?Sized>(
    status: StatusCode,
    payload: &T,
    headers: HeaderMap,
) -> Result<Response, serde_json::Error> {
    let body = encode(payload)?;

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response.headers_mut().extend(headers);
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn keys_keep_insertion_order_on_the_wire() {
        let env = Envelope::new()
            .with("status", "available")
            .with("count", 3)
            .with("again", true);

        let body = encode(&env).unwrap();
        assert_eq!(body, b"{\"status\":\"available\",\"count\":3,\"again\":true}\n");
    }

    #[test]
    fn permissive_decode_reads_back_every_field() {
        let mut env = Envelope::new().with("name", "bedrock").with("tags", vec!["a", "b"]);
        env.insert_serialized("meta", &BTreeMap::from([("page", 1)])).unwrap();

        let body = encode(&env).unwrap();
        let back: Map<String, Value> = serde_json::from_slice(&body).unwrap();

        assert_eq!(back.keys().collect::<Vec<_>>(), vec!["name", "tags", "meta"]);
        assert_eq!(Envelope(back), env);
    }

    #[tokio::test]
    async fn response_has_status_headers_and_content_type() {
        let mut extra = HeaderMap::new();
        extra.insert(header::LOCATION, HeaderValue::from_static("/v1/items/1"));
        extra.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        let env = Envelope::new().with("id", 1);
        let res = write_json(StatusCode::CREATED, &env, extra).unwrap();

        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(res.headers()[header::LOCATION], "/v1/items/1");
        assert_eq!(res.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(res.headers().get_all(header::CONTENT_TYPE).iter().count(), 1);

        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"{\"id\":1}\n");
    }

    #[test]
    fn unrepresentable_payload_is_an_error() {
        let bad: BTreeMap<Vec<u8>, i32> = BTreeMap::from([(vec![1, 2], 3)]);
        assert!(encode(&bad).is_err());
    }
}
