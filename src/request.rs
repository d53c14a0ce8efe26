//! Request normalization
//!
//! Bodies arrive as JSON (`application/json`), as JSON text (`text/plain`), or
//! as percent-encoded JSON text. All of them are reduced to one
//! [`BridgeRequest`] before any handler logic runs.

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde_json::{Map, Value};

use crate::error::BridgeError;

/// Raw body as received from the transport
#[derive(Debug, Clone)]
pub enum RawBody {
    /// Already-parsed mapping
    Structured(Map<String, Value>),
    /// JSON text, possibly percent-encoded
    Text(String),
    Empty,
}

/// Canonical request: field name to JSON value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BridgeRequest(Map<String, Value>);

/// Reduce a raw body to a [`BridgeRequest`]
pub fn normalize(body: RawBody) -> Result<BridgeRequest, BridgeError> {
    let text = match body {
        RawBody::Structured(map) => return Ok(BridgeRequest(map)),
        RawBody::Empty => return Ok(BridgeRequest::default()),
        RawBody::Text(text) => text,
    };

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(BridgeRequest::default());
    }

    let decoded = if trimmed.starts_with('%') {
        urlencoding::decode(trimmed)
            .map_err(|e| BridgeError::MalformedRequest(e.to_string()))?
            .into_owned()
    } else {
        trimmed.to_string()
    };

    match serde_json::from_str::<Value>(&decoded) {
        Ok(Value::Object(map)) => Ok(BridgeRequest(map)),
        Ok(other) => Err(BridgeError::MalformedRequest(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(BridgeError::MalformedRequest(e.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl BridgeRequest {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Field as text; `null`, `""` and structured values count as absent
    pub fn text(&self, field: &str) -> Option<String> {
        match self.0.get(field)? {
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(true) => Some("true".to_string()),
            _ => None,
        }
    }

    /// Field as text, failing with `MissingField` when absent
    pub fn require(&self, field: &'static str) -> Result<String, BridgeError> {
        self.text(field).ok_or(BridgeError::MissingField(field))
    }

    /// Positive result count from the `limit` field, or `default`
    pub fn limit(&self, default: usize) -> usize {
        self.0
            .get("limit")
            .and_then(integer_prefix)
            .and_then(|n| usize::try_from(n).ok())
            .filter(|n| *n > 0)
            .unwrap_or(default)
    }
}

/// Integer value of a JSON number or of the leading digits of a string
///
/// `3`, `3.9`, `"3"` and `"3 items"` all give 3.
pub fn integer_prefix(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => parse_integer_prefix(s),
        _ => None,
    }
}

/// Parse an optional sign followed by digits, ignoring leading whitespace and
/// anything after the digits
pub fn parse_integer_prefix(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude: i64 = digits[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Axum extractor producing a normalized request body
///
/// The content type is ignored so JSON and text bodies decode identically.
#[derive(Debug, Clone)]
pub struct NormalizedBody(pub BridgeRequest);

#[async_trait]
impl<S> FromRequest<S> for NormalizedBody
where
    S: Send + Sync,
{
    type Rejection = BridgeError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| BridgeError::MalformedRequest(e.body_text()))?;

        let raw = if bytes.is_empty() {
            RawBody::Empty
        } else {
            let text = String::from_utf8(bytes.to_vec())
                .map_err(|e| BridgeError::MalformedRequest(e.to_string()))?;
            RawBody::Text(text)
        };

        normalize(raw).map(NormalizedBody)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text(body: &str) -> Result<BridgeRequest, BridgeError> {
        normalize(RawBody::Text(body.to_string()))
    }

    #[test]
    fn test_structured_passes_through() {
        let map = json!({ "key": "ABCD2345", "nested": { "a": 1 } })
            .as_object()
            .cloned()
            .unwrap();
        let request = normalize(RawBody::Structured(map.clone())).unwrap();
        assert_eq!(request, BridgeRequest::new(map));
    }

    #[test]
    fn test_plain_and_percent_encoded_text_decode_identically() {
        let plain = text(r#"{"query":"neural nets","limit":3}"#).unwrap();
        let encoded = text("%7B%22query%22%3A%22neural%20nets%22%2C%22limit%22%3A3%7D").unwrap();

        assert_eq!(plain, encoded);
        assert_eq!(plain.text("query").as_deref(), Some("neural nets"));
    }

    #[test]
    fn test_empty_body_is_empty_mapping() {
        assert_eq!(normalize(RawBody::Empty).unwrap(), BridgeRequest::default());
        assert_eq!(text("  \n").unwrap(), BridgeRequest::default());
    }

    #[test]
    fn test_malformed_json_carries_parser_message() {
        match text("{\"key\": ") {
            Err(BridgeError::MalformedRequest(message)) => assert!(message.contains("EOF")),
            other => panic!("expected MalformedRequest, got {:?}", other),
        }
    }

    #[test]
    fn test_non_object_json_is_malformed() {
        assert!(matches!(text("[1, 2]"), Err(BridgeError::MalformedRequest(_))));
        assert!(matches!(text("null"), Err(BridgeError::MalformedRequest(_))));
    }

    #[test]
    fn test_text_field_coercion() {
        let request = text(r#"{"a":"x","b":"","c":7,"d":null,"e":{"f":1},"g":false}"#).unwrap();

        assert_eq!(request.text("a").as_deref(), Some("x"));
        assert_eq!(request.text("b"), None);
        assert_eq!(request.text("c").as_deref(), Some("7"));
        assert_eq!(request.text("d"), None);
        assert_eq!(request.text("e"), None);
        assert_eq!(request.text("g"), None);
        assert!(matches!(
            request.require("missing"),
            Err(BridgeError::MissingField("missing"))
        ));
    }

    #[test]
    fn test_limit_parsing() {
        let limit = |body: &str| text(body).unwrap().limit(25);

        assert_eq!(limit(r#"{}"#), 25);
        assert_eq!(limit(r#"{"limit":3}"#), 3);
        assert_eq!(limit(r#"{"limit":"7"}"#), 7);
        assert_eq!(limit(r#"{"limit":4.9}"#), 4);
        assert_eq!(limit(r#"{"limit":"12 items"}"#), 12);
        assert_eq!(limit(r#"{"limit":"many"}"#), 25);
        assert_eq!(limit(r#"{"limit":0}"#), 25);
        assert_eq!(limit(r#"{"limit":-5}"#), 25);
    }

    #[test]
    fn test_parse_integer_prefix() {
        assert_eq!(parse_integer_prefix("12"), Some(12));
        assert_eq!(parse_integer_prefix("  5a"), Some(5));
        assert_eq!(parse_integer_prefix("-3"), Some(-3));
        assert_eq!(parse_integer_prefix("iv"), None);
        assert_eq!(parse_integer_prefix(""), None);
        assert_eq!(parse_integer_prefix("-"), None);
    }
}
