use crate::api::guard::AccessToken;
use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct RootInfo {
    name: String,
    version: String,
    authenticated: bool,
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service banner", body = [RootInfo]),
    ),
    tag = "root"
)]
pub async fn root(access: Option<Extension<AccessToken>>) -> impl IntoResponse {
    let authenticated = access
        .map(|Extension(AccessToken(token))| token.is_some())
        .unwrap_or(false);
    Json(RootInfo {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        authenticated,
    })
}

/// Fallback for unrouted paths the guard allowed through.
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found." })))
}
