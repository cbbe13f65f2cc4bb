//! Request and response payloads for the identity API. Password material is
//! wrapped in [`SecretString`] so debug output never leaks it.

use secrecy::{ExposeSecret, SecretString};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use utoipa::ToSchema;

/// Immutable snapshot of the authenticated user, superseded wholesale on
/// every successful fetch or update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub date_joined: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Login credentials. Serialized manually so the password only leaves the
/// secret wrapper at the request boundary.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

impl Serialize for Credentials {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Credentials", 2)?;
        state.serialize_field("username", &self.username)?;
        state.serialize_field("password", self.password.expose_secret())?;
        state.end()
    }
}

/// Registration payload. The optional name fields are omitted from the wire
/// format when absent, matching the API contract.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: SecretString,
    pub password_confirm: SecretString,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl Registration {
    /// The fast-path check run before any network call.
    #[must_use]
    pub fn passwords_match(&self) -> bool {
        self.password.expose_secret() == self.password_confirm.expose_secret()
    }
}

impl Serialize for Registration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields =
            4 + usize::from(self.first_name.is_some()) + usize::from(self.last_name.is_some());
        let mut state = serializer.serialize_struct("Registration", fields)?;
        state.serialize_field("username", &self.username)?;
        state.serialize_field("email", &self.email)?;
        state.serialize_field("password", self.password.expose_secret())?;
        state.serialize_field("password_confirm", self.password_confirm.expose_secret())?;
        if let Some(first_name) = &self.first_name {
            state.serialize_field("first_name", first_name)?;
        }
        if let Some(last_name) = &self.last_name {
            state.serialize_field("last_name", last_name)?;
        }
        state.end()
    }
}

/// Partial profile update. An absent field is not sent at all; an empty
/// string IS sent and means "clear this field".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl ProfileUpdate {
    /// True when no field was provided, which short-circuits the update.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.first_name.is_none() && self.last_name.is_none()
    }
}

/// Successful login/register response: a fresh token pair plus the user.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthPayload {
    pub access: String,
    pub refresh: String,
    pub user: UserRecord,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RefreshResponse {
    pub access: String,
}
