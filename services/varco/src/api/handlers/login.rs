use super::error_response;
use crate::api::{cookies, state::AppState};
use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use identity_client::Credentials;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginForm {
    username: String,
    password: String,
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginForm,
    responses(
        (status = 200, description = "Login successful; session cookies set"),
        (status = 401, description = "Invalid credentials"),
        (status = 502, description = "Identity API unreachable"),
    ),
    tag = "auth"
)]
pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
    Json(form): Json<LoginForm>,
) -> impl IntoResponse {
    let credentials = Credentials::new(form.username, form.password);
    match state.api.login(&credentials).await {
        Ok(payload) => {
            let mut headers = HeaderMap::new();
            cookies::set_token_pair(
                &mut headers,
                &payload.access,
                &payload.refresh,
                state.cookies.secure,
            );
            (StatusCode::OK, headers, Json(payload.user)).into_response()
        }
        Err(err) => error_response(&err),
    }
}
