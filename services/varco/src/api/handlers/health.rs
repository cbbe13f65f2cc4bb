use crate::api::state::AppState;
use axum::{Json, extract::Extension, response::IntoResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    name: String,
    version: String,
    identity_api: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Gateway is up", body = [Health]),
    ),
    tag = "health"
)]
pub async fn health(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    Json(Health {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        identity_api: state.api.base_url().to_string(),
    })
}
