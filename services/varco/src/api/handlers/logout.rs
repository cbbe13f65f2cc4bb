use crate::api::{cookies, state::AppState};
use axum::{
    extract::Extension,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::warn;

#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 303, description = "Session cookies cleared; redirected home"),
    ),
    tag = "auth"
)]
pub async fn logout(Extension(state): Extension<Arc<AppState>>, headers: HeaderMap) -> Response {
    // Best-effort blacklisting of the refresh token; local cookies are
    // cleared no matter what the API says.
    if let Some(refresh) = cookies::cookie_value(&headers, cookies::REFRESH_TOKEN_COOKIE) {
        let access = cookies::cookie_value(&headers, cookies::ACCESS_TOKEN_COOKIE);
        if let Err(err) = state.api.logout(access.as_deref(), &refresh).await {
            warn!("Logout notification failed: {err}");
        }
    }

    let mut response = Redirect::to("/").into_response();
    cookies::clear_token_pair(response.headers_mut(), state.cookies.secure);
    response
}
