pub mod health;
pub mod login;
pub mod logout;
pub mod profile;
pub mod register;
pub mod root;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use identity_client::Error;
use serde_json::json;
use tracing::error;

/// Map a client-layer error onto the gateway's response surface. API
/// rejections keep their status and normalized message; transport failures
/// collapse into a generic 502 so upstream details never reach the browser.
pub(crate) fn error_response(err: &Error) -> Response {
    let (status, message) = match err {
        Error::Api { status, message } => (
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
            message.clone(),
        ),
        Error::Validation(message) => (StatusCode::BAD_REQUEST, message.clone()),
        Error::Unauthenticated => (StatusCode::UNAUTHORIZED, "Not authenticated.".to_string()),
        Error::Network(_) | Error::Decode(_) => {
            error!("Identity API failure: {err}");
            (
                StatusCode::BAD_GATEWAY,
                "The identity service is unavailable. Please try again.".to_string(),
            )
        }
    };
    (status, Json(json!({ "detail": message }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_keep_their_status() {
        let err = Error::Api {
            status: 401,
            message: "No active account found with the given credentials".to_string(),
        };
        let response = error_response(&err);
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn transport_errors_become_bad_gateway() {
        let err = Error::Network("connection refused".to_string());
        let response = error_response(&err);
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
