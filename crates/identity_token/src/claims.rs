use base64ct::{Base64Unpadded, Base64UrlUnpadded, Encoding};
use serde::Deserialize;
use thiserror::Error;

/// Claims carried in the payload segment of an access token.
///
/// The identity API signs its tokens, but this crate never verifies the
/// signature: the remote API is the sole authority on validity, and the
/// client only needs the expiry to decide when to ask for a fresh token.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AccessClaims {
    pub exp: i64,
    #[serde(default)]
    pub user_id: Option<serde_json::Value>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub jti: Option<String>,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid token format")]
    TokenFormat,
    #[error("invalid base64 encoding")]
    Base64,
    #[error("invalid json")]
    Json(#[from] serde_json::Error),
}

/// Decode the payload segment of a compact token without verifying it.
///
/// # Errors
///
/// Returns an error if the token has no second dot-separated segment, the
/// segment is not valid base64, or the payload is not a JSON claim set with
/// a numeric `exp`.
pub fn decode_claims(token: &str) -> Result<AccessClaims, Error> {
    let payload = token.split('.').nth(1).ok_or(Error::TokenFormat)?;
    let bytes = decode_segment(payload)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Expiry of an access token, in seconds since the epoch.
///
/// # Errors
///
/// Same failure modes as [`decode_claims`].
pub fn expires_at(token: &str) -> Result<i64, Error> {
    Ok(decode_claims(token)?.exp)
}

/// Whether the token is expired as of `now_unix_seconds`.
///
/// Fails closed: any malformed token is reported as expired.
#[must_use]
pub fn is_expired(token: &str, now_unix_seconds: i64) -> bool {
    match expires_at(token) {
        Ok(exp) => exp <= now_unix_seconds,
        Err(_) => true,
    }
}

/// Tokens in the wild mix URL-safe and standard alphabets, padded and not.
fn decode_segment(segment: &str) -> Result<Vec<u8>, Error> {
    let trimmed = segment.trim_end_matches('=');
    Base64UrlUnpadded::decode_vec(trimmed)
        .or_else(|_| Base64Unpadded::decode_vec(trimmed))
        .map_err(|_| Error::Base64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn token_with_payload(payload: &str) -> String {
        let header = Base64UrlUnpadded::encode_string(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = Base64UrlUnpadded::encode_string(payload.as_bytes());
        format!("{header}.{body}.signature")
    }

    #[test]
    fn decodes_simplejwt_style_claims() -> Result<(), Error> {
        let token = token_with_payload(
            r#"{"token_type":"access","exp":1700000120,"jti":"abc123","user_id":7}"#,
        );
        let claims = decode_claims(&token)?;
        assert_eq!(claims.exp, 1_700_000_120);
        assert_eq!(claims.token_type.as_deref(), Some("access"));
        assert_eq!(claims.jti.as_deref(), Some("abc123"));
        assert_eq!(claims.user_id, Some(serde_json::json!(7)));
        Ok(())
    }

    #[test]
    fn future_exp_is_valid_past_exp_is_expired() {
        let future = token_with_payload(r#"{"exp":1700000120}"#);
        assert!(!is_expired(&future, NOW));
        assert!(is_expired(&future, NOW + 120));

        let past = token_with_payload(r#"{"exp":1699999999}"#);
        assert!(is_expired(&past, NOW));
    }

    #[test]
    fn exp_equal_to_now_is_expired() {
        let token = token_with_payload(r#"{"exp":1700000000}"#);
        assert!(is_expired(&token, NOW));
    }

    #[test]
    fn missing_exp_is_expired() {
        let token = token_with_payload(r#"{"token_type":"access"}"#);
        assert!(matches!(decode_claims(&token), Err(Error::Json(_))));
        assert!(is_expired(&token, NOW));
    }

    #[test]
    fn malformed_tokens_are_expired() {
        // No payload segment at all.
        assert!(matches!(decode_claims("justonepart"), Err(Error::TokenFormat)));
        assert!(is_expired("justonepart", NOW));

        // Payload is not base64.
        assert!(is_expired("header.!!!.signature", NOW));

        // Payload decodes but is not JSON.
        let garbage = format!("h.{}.s", Base64UrlUnpadded::encode_string(b"not json"));
        assert!(is_expired(&garbage, NOW));

        // Empty string.
        assert!(is_expired("", NOW));
    }

    #[test]
    fn accepts_padded_and_standard_base64_payloads() {
        // Padded URL-safe, as produced by encoders that keep the '='.
        let body = Base64UrlUnpadded::encode_string(br#"{"exp":1700000120}"#);
        let padded = format!("h.{body}==.s");
        assert!(!is_expired(&padded, NOW));

        // Standard alphabet.
        let body = Base64Unpadded::encode_string(br#"{"exp":1700000120}"#);
        let standard = format!("h.{body}.s");
        assert!(!is_expired(&standard, NOW));
    }

    #[test]
    fn expires_at_reads_the_exp_claim() -> Result<(), Error> {
        let token = token_with_payload(r#"{"exp":1700000120}"#);
        assert_eq!(expires_at(&token)?, 1_700_000_120);
        Ok(())
    }
}
