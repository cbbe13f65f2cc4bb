//! Profile routes: an authenticated fetch and a partial update. The guard
//! middleware resolves the access token (refreshing it when needed) before
//! these handlers run.

use super::error_response;
use crate::api::{cookies, guard::AccessToken, state::AppState};
use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use identity_client::{Error, ProfileUpdate};
use serde_json::json;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/auth/profile",
    responses(
        (status = 200, description = "Current user record"),
        (status = 401, description = "No usable access token"),
    ),
    tag = "profile"
)]
pub async fn show(
    Extension(state): Extension<Arc<AppState>>,
    access: Option<Extension<AccessToken>>,
    headers: HeaderMap,
) -> Response {
    let Some(token) = presented_token(access, &headers) else {
        return error_response(&Error::Unauthenticated);
    };
    match state.api.current_user(&token).await {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(err) => error_response(&err),
    }
}

#[utoipa::path(
    put,
    path = "/auth/profile",
    responses(
        (status = 200, description = "Profile updated, or nothing to update"),
        (status = 400, description = "Field validation failure"),
        (status = 401, description = "No usable access token"),
    ),
    tag = "profile"
)]
pub async fn update(
    Extension(state): Extension<Arc<AppState>>,
    access: Option<Extension<AccessToken>>,
    headers: HeaderMap,
    Json(update): Json<ProfileUpdate>,
) -> Response {
    let Some(token) = presented_token(access, &headers) else {
        return error_response(&Error::Unauthenticated);
    };

    // Omitted fields are not sent at all; an empty update never reaches the
    // identity API.
    if update.is_empty() {
        return (
            StatusCode::OK,
            Json(json!({ "detail": "No changes submitted." })),
        )
            .into_response();
    }

    match state.api.update_profile(&token, &update).await {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(err) => error_response(&err),
    }
}

/// The guard stores the effective token in an extension; fall back to the
/// raw cookie for requests that reached the handler some other way.
fn presented_token(access: Option<Extension<AccessToken>>, headers: &HeaderMap) -> Option<String> {
    match access {
        Some(Extension(AccessToken(token))) => token,
        None => cookies::cookie_value(headers, cookies::ACCESS_TOKEN_COOKIE),
    }
}
