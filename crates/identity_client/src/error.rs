use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Non-2xx response from the identity API, already normalized into a
    /// single user-facing message.
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("Unable to reach the identity service: {0}")]
    Network(String),
    #[error("Failed to decode response: {0}")]
    Decode(String),
    /// Rejected client-side; no request was issued.
    #[error("{0}")]
    Validation(String),
    #[error("Not authenticated.")]
    Unauthenticated,
}

impl Error {
    /// HTTP status of an API error, if this is one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Collapse an identity API error body into one message.
///
/// The API answers with `{"detail": "..."}` for general failures, a map of
/// field name to message list for validation failures, occasionally a bare
/// JSON string, and sometimes no JSON at all. Field errors come out as
/// `"Field: msg1 msg2"` joined with `". "`; everything unrecognized falls
/// back to the HTTP status text.
#[must_use]
pub fn normalize_message(status: u16, status_text: &str, body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => {
            if let Some(detail) = map.get("detail").and_then(Value::as_str) {
                return detail.to_string();
            }
            let fields: Vec<String> = map
                .iter()
                .filter_map(|(field, messages)| {
                    let list = messages.as_array()?;
                    let joined = list
                        .iter()
                        .filter_map(Value::as_str)
                        .collect::<Vec<_>>()
                        .join(" ");
                    Some(format!("{}: {joined}", capitalize(field)))
                })
                .collect();
            if fields.is_empty() {
                fallback_message(status, status_text)
            } else {
                fields.join(". ")
            }
        }
        Ok(Value::String(message)) => message,
        _ => fallback_message(status, status_text),
    }
}

fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn fallback_message(status: u16, status_text: &str) -> String {
    if status_text.is_empty() {
        format!("Request failed with status {status}")
    } else {
        status_text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_field_wins() {
        let body = r#"{"detail": "No active account found with the given credentials"}"#;
        assert_eq!(
            normalize_message(401, "Unauthorized", body),
            "No active account found with the given credentials"
        );
    }

    #[test]
    fn field_errors_are_joined_per_field() {
        let body = r#"{"username": ["This field is required."], "email": ["Enter a valid email address.", "This field may not be blank."]}"#;
        // serde_json object iteration is key-ordered, so email comes first.
        assert_eq!(
            normalize_message(400, "Bad Request", body),
            "Email: Enter a valid email address. This field may not be blank.. Username: This field is required."
        );
    }

    #[test]
    fn non_array_fields_are_skipped() {
        let body = r#"{"code": 17, "username": ["Taken."]}"#;
        assert_eq!(normalize_message(400, "Bad Request", body), "Username: Taken.");
    }

    #[test]
    fn bare_string_body_is_the_message() {
        assert_eq!(
            normalize_message(429, "Too Many Requests", r#""Slow down.""#),
            "Slow down."
        );
    }

    #[test]
    fn non_json_falls_back_to_status_text() {
        assert_eq!(
            normalize_message(502, "Bad Gateway", "<html>upstream error</html>"),
            "Bad Gateway"
        );
        assert_eq!(
            normalize_message(502, "", "<html></html>"),
            "Request failed with status 502"
        );
    }

    #[test]
    fn object_without_usable_fields_falls_back() {
        assert_eq!(
            normalize_message(500, "Internal Server Error", r#"{"code": 99}"#),
            "Internal Server Error"
        );
    }
}
