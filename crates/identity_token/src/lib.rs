mod claims;

pub use claims::{AccessClaims, Error, decode_claims, expires_at, is_expired};
