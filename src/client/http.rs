//! Response normalization shared by every endpoint.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// A 2xx body as the backend sent it.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Empty,
    Json(Value),
    /// The body was not valid JSON.
    Text(String),
}

impl ResponseBody {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Decode into a typed payload, failing with [`ApiError::Decoding`].
    pub fn decode<T: DeserializeOwned>(self, route: &str) -> Result<T, ApiError> {
        match self {
            Self::Json(value) => serde_json::from_value(value).map_err(|e| {
                ApiError::Decoding(format!("unexpected payload from {route}: {e}"))
            }),
            Self::Empty => Err(ApiError::Decoding(format!(
                "empty body from {route} where JSON was expected"
            ))),
            Self::Text(text) => Err(ApiError::Decoding(format!(
                "non-JSON body from {route}: {}",
                truncate(&text, 120)
            ))),
        }
    }
}

/// Turn a status and body into a payload or a classified error.
pub fn normalize_response(status: u16, body: &str) -> Result<ResponseBody, ApiError> {
    if !(200..300).contains(&status) {
        return Err(ApiError::application(status, extract_error_message(body)));
    }
    if body.trim().is_empty() {
        return Ok(ResponseBody::Empty);
    }
    match serde_json::from_str::<Value>(body) {
        Ok(value) => Ok(ResponseBody::Json(value)),
        Err(_) => Ok(ResponseBody::Text(body.to_string())),
    }
}

/// Pick the message of a rejected request.
///
/// `detail` wins over `error`; without either the raw body is the message.
pub fn extract_error_message(body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for field in ["detail", "error"] {
            match map.get(field) {
                Some(Value::String(message)) => return message.clone(),
                Some(Value::Null) | None => {}
                // FastAPI validation errors put a list under `detail`.
                Some(other) => return other.to_string(),
            }
        }
    }
    body.to_string()
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_with_json_is_decoded() {
        let body = normalize_response(200, r#"{"ok": true}"#).unwrap();
        assert_eq!(body, ResponseBody::Json(json!({"ok": true})));
    }

    #[test]
    fn success_with_blank_body_is_empty() {
        assert!(normalize_response(204, "").unwrap().is_empty());
        assert!(normalize_response(200, "  \n").unwrap().is_empty());
    }

    #[test]
    fn success_with_malformed_body_keeps_text() {
        let body = normalize_response(201, "created!").unwrap();
        assert_eq!(body, ResponseBody::Text("created!".to_string()));
    }

    #[test]
    fn detail_takes_precedence_over_error() {
        let msg = extract_error_message(r#"{"error": "second", "detail": "first"}"#);
        assert_eq!(msg, "first");
    }

    #[test]
    fn error_field_is_used_without_detail() {
        let err = normalize_response(404, r#"{"error": "Criança não encontrada"}"#).unwrap_err();
        assert_eq!(err.message(), "Criança não encontrada");
        assert_eq!(err.status_code(), Some(404));
    }

    #[test]
    fn structured_detail_is_serialized() {
        let msg = extract_error_message(r#"{"detail": [{"loc": ["body", "ano"]}]}"#);
        assert!(msg.contains("ano"));
    }

    #[test]
    fn non_json_error_keeps_raw_body() {
        let err = normalize_response(502, "<html>Bad Gateway</html>").unwrap_err();
        assert_eq!(err.message(), "<html>Bad Gateway</html>");
    }

    #[test]
    fn json_without_known_fields_keeps_raw_body() {
        let raw = r#"{"message": "nope"}"#;
        assert_eq!(extract_error_message(raw), raw);
    }

    #[test]
    fn decode_rejects_text_and_empty_bodies() {
        let err = ResponseBody::Text("oops".into())
            .decode::<Value>("/health")
            .unwrap_err();
        assert!(matches!(err, ApiError::Decoding(m) if m.contains("/health")));
        assert!(ResponseBody::Empty.decode::<Value>("/health").is_err());
    }
}
