use super::error_response;
use crate::api::{cookies, state::AppState};
use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use identity_client::Registration;
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterForm {
    username: String,
    email: String,
    password: String,
    password_confirm: String,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
}

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterForm,
    responses(
        (status = 201, description = "Account created; session cookies set"),
        (status = 400, description = "Validation failure, including mismatched password confirmation"),
        (status = 502, description = "Identity API unreachable"),
    ),
    tag = "auth"
)]
pub async fn register(
    Extension(state): Extension<Arc<AppState>>,
    Json(form): Json<RegisterForm>,
) -> impl IntoResponse {
    let registration = Registration {
        username: form.username,
        email: form.email,
        password: SecretString::from(form.password),
        password_confirm: SecretString::from(form.password_confirm),
        first_name: form.first_name,
        last_name: form.last_name,
    };

    // Fast-path rejection before any network call; the identity API still
    // validates on its side.
    if !registration.passwords_match() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": "Passwords do not match." })),
        )
            .into_response();
    }

    match state.api.register(&registration).await {
        Ok(payload) => {
            let mut headers = HeaderMap::new();
            cookies::set_token_pair(
                &mut headers,
                &payload.access,
                &payload.refresh,
                state.cookies.secure,
            );
            (StatusCode::CREATED, headers, Json(payload.user)).into_response()
        }
        Err(err) => error_response(&err),
    }
}
