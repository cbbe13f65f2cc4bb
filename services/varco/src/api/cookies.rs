//! Session cookies. Both tokens are `HttpOnly` with `SameSite=Lax` on path
//! `/`; the access cookie lives for an hour, the refresh cookie for seven
//! days, and both are marked `Secure` on https deployments.

use axum::http::{
    HeaderMap, HeaderValue,
    header::{COOKIE, InvalidHeaderValue, SET_COOKIE},
};
use identity_client::TokenMutation;
use tracing::error;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

const ACCESS_TOKEN_MAX_AGE: i64 = 60 * 60;
const REFRESH_TOKEN_MAX_AGE: i64 = 60 * 60 * 24 * 7;

/// Read a cookie from request headers.
#[must_use]
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == name && !val.is_empty() {
            return Some(val.to_string());
        }
    }
    None
}

/// Set both session cookies, as after login or register.
pub fn set_token_pair(headers: &mut HeaderMap, access: &str, refresh: &str, secure: bool) {
    append_cookie(
        headers,
        build_cookie(ACCESS_TOKEN_COOKIE, access, ACCESS_TOKEN_MAX_AGE, secure),
    );
    append_cookie(
        headers,
        build_cookie(REFRESH_TOKEN_COOKIE, refresh, REFRESH_TOKEN_MAX_AGE, secure),
    );
}

/// Expire both session cookies, as after logout.
pub fn clear_token_pair(headers: &mut HeaderMap, secure: bool) {
    append_cookie(headers, build_cookie(ACCESS_TOKEN_COOKIE, "", 0, secure));
    append_cookie(headers, build_cookie(REFRESH_TOKEN_COOKIE, "", 0, secure));
}

/// Translate route-guard token mutations into `Set-Cookie` headers.
pub fn apply_mutations(headers: &mut HeaderMap, mutations: &[TokenMutation], secure: bool) {
    for mutation in mutations {
        match mutation {
            TokenMutation::StoreAccess(access) => {
                append_cookie(
                    headers,
                    build_cookie(ACCESS_TOKEN_COOKIE, access, ACCESS_TOKEN_MAX_AGE, secure),
                );
            }
            TokenMutation::ClearAccess => {
                append_cookie(headers, build_cookie(ACCESS_TOKEN_COOKIE, "", 0, secure));
            }
            TokenMutation::ClearAll => clear_token_pair(headers, secure),
        }
    }
}

fn build_cookie(
    name: &str,
    value: &str,
    max_age: i64,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn append_cookie(headers: &mut HeaderMap, cookie: Result<HeaderValue, InvalidHeaderValue>) {
    match cookie {
        Ok(value) => {
            headers.append(SET_COOKIE, value);
        }
        Err(err) => error!("Failed to build session cookie: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_cookies_out_of_a_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("access_token=abc; refresh_token=def"),
        );
        assert_eq!(
            cookie_value(&headers, ACCESS_TOKEN_COOKIE).as_deref(),
            Some("abc")
        );
        assert_eq!(
            cookie_value(&headers, REFRESH_TOKEN_COOKIE).as_deref(),
            Some("def")
        );
        assert!(cookie_value(&headers, "other").is_none());
    }

    #[test]
    fn empty_cookie_values_count_as_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("access_token="));
        assert!(cookie_value(&headers, ACCESS_TOKEN_COOKIE).is_none());
    }

    #[test]
    fn pair_cookies_carry_the_session_attributes() {
        let mut headers = HeaderMap::new();
        set_token_pair(&mut headers, "a-token", "r-token", false);

        let cookies: Vec<&str> = headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect();
        assert_eq!(cookies.len(), 2);
        assert_eq!(
            cookies[0],
            "access_token=a-token; Path=/; HttpOnly; SameSite=Lax; Max-Age=3600"
        );
        assert_eq!(
            cookies[1],
            "refresh_token=r-token; Path=/; HttpOnly; SameSite=Lax; Max-Age=604800"
        );
    }

    #[test]
    fn secure_deployments_append_the_secure_attribute() {
        let mut headers = HeaderMap::new();
        set_token_pair(&mut headers, "a", "r", true);
        for value in headers.get_all(SET_COOKIE) {
            assert!(value.to_str().expect("ascii cookie").ends_with("; Secure"));
        }
    }

    #[test]
    fn mutations_become_set_cookie_headers() {
        let mut headers = HeaderMap::new();
        apply_mutations(
            &mut headers,
            &[TokenMutation::StoreAccess("fresh".to_string())],
            false,
        );
        let cookie = headers
            .get(SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .expect("cookie set");
        assert!(cookie.starts_with("access_token=fresh;"));

        let mut headers = HeaderMap::new();
        apply_mutations(&mut headers, &[TokenMutation::ClearAll], false);
        let cookies: Vec<&str> = headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect();
        assert_eq!(cookies.len(), 2);
        assert!(cookies.iter().all(|cookie| cookie.contains("Max-Age=0")));
    }
}
