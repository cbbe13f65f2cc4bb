//! Route-guard middleware. Runs the deterministic guard decision on every
//! navigation, turns redirects into 303 responses, cookie mutations into
//! `Set-Cookie` headers, and hands the (possibly just refreshed) access
//! token to downstream handlers through a request extension.

use super::{cookies, state::AppState};
use axum::{
    extract::{Extension, Request},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use identity_client::RouteAction;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Access token resolved by the guard for the current request.
#[derive(Debug, Clone)]
pub struct AccessToken(pub Option<String>);

pub async fn route_guard(
    Extension(state): Extension<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if bypasses_guard(request.method(), &path) {
        return next.run(request).await;
    }

    let access = cookies::cookie_value(request.headers(), cookies::ACCESS_TOKEN_COOKIE);
    let refresh = cookies::cookie_value(request.headers(), cookies::REFRESH_TOKEN_COOKIE);
    let decision = state
        .guard
        .evaluate(access.as_deref(), refresh.as_deref(), &path, unix_now())
        .await;
    let effective = decision.effective_access(access.as_deref());

    match &decision.action {
        RouteAction::Allow => {
            request.extensions_mut().insert(AccessToken(effective));
            let mut response = next.run(request).await;
            cookies::apply_mutations(
                response.headers_mut(),
                &decision.mutations,
                state.cookies.secure,
            );
            response
        }
        RouteAction::Redirect(location) => {
            let mut response = Redirect::to(location).into_response();
            cookies::apply_mutations(
                response.headers_mut(),
                &decision.mutations,
                state.cookies.secure,
            );
            response
        }
    }
}

/// The auth actions themselves must stay reachable while logged out, and
/// health probes carry no session.
fn bypasses_guard(method: &Method, path: &str) -> bool {
    (method == Method::POST && path.starts_with("/auth/")) || path == "/health"
}

pub(crate) fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_actions_and_health_bypass_the_guard() {
        assert!(bypasses_guard(&Method::POST, "/auth/login"));
        assert!(bypasses_guard(&Method::POST, "/auth/logout"));
        assert!(bypasses_guard(&Method::GET, "/health"));
    }

    #[test]
    fn navigations_do_not_bypass_the_guard() {
        assert!(!bypasses_guard(&Method::GET, "/auth/profile"));
        assert!(!bypasses_guard(&Method::PUT, "/auth/profile"));
        assert!(!bypasses_guard(&Method::GET, "/auth/login"));
        assert!(!bypasses_guard(&Method::GET, "/"));
    }
}
