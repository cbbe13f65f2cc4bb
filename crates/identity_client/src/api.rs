//! HTTP client for the identity API. One method per endpoint, JSON in and
//! out, bearer header attachment for authenticated calls, and error bodies
//! normalized before they reach a caller.

use crate::error::{Error, normalize_message};
use crate::types::{AuthPayload, Credentials, ProfileUpdate, Registration, RefreshResponse, UserRecord};
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

/// Requests that outlive this are aborted so callers never hang on a dead
/// identity service.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct IdentityApi {
    base_url: Url,
    client: Client,
}

impl IdentityApi {
    /// Build a client for the identity API at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed or the underlying HTTP
    /// client cannot be constructed.
    pub fn new(base_url: &str) -> Result<Self, Error> {
        let base_url = Url::parse(base_url)
            .map_err(|err| Error::Validation(format!("Invalid identity API base URL: {err}")))?;
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|err| Error::Network(err.to_string()))?;
        Ok(Self { base_url, client })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// `POST /auth/login/`: exchange credentials for a token pair and user.
    ///
    /// # Errors
    ///
    /// Returns the normalized API message on rejection, or a transport error.
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthPayload, Error> {
        self.post_json("/auth/login/", credentials).await
    }

    /// `POST /auth/register/`: create an account; responds like login.
    ///
    /// # Errors
    ///
    /// Returns the normalized API message on rejection, or a transport error.
    pub async fn register(&self, registration: &Registration) -> Result<AuthPayload, Error> {
        self.post_json("/auth/register/", registration).await
    }

    /// `POST /auth/refresh/`: trade a refresh token for a new access token.
    ///
    /// Exactly one attempt; callers that fail here must discard both stored
    /// tokens. The refresh token itself is not rotated.
    ///
    /// # Errors
    ///
    /// Returns the normalized API message on rejection, or a transport error.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, Error> {
        let response: RefreshResponse = self
            .post_json("/auth/refresh/", &json!({ "refresh": refresh_token }))
            .await?;
        Ok(response.access)
    }

    /// `POST /auth/logout/`: ask the API to blacklist the refresh token.
    ///
    /// # Errors
    ///
    /// Returns the normalized API message on rejection, or a transport
    /// error. Callers treat this as best-effort.
    pub async fn logout(&self, access_token: Option<&str>, refresh_token: &str) -> Result<(), Error> {
        let mut request = self
            .client
            .post(self.endpoint("/auth/logout/"))
            .json(&json!({ "refresh": refresh_token }));
        if let Some(access) = access_token {
            request = request.bearer_auth(access);
        }
        let response = send(request).await?;
        expect_success(response).await
    }

    /// `GET /auth/user/`: the current user for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns the normalized API message on rejection (including expired or
    /// invalid tokens), or a transport error.
    pub async fn current_user(&self, access_token: &str) -> Result<UserRecord, Error> {
        let request = self
            .client
            .get(self.endpoint("/auth/user/"))
            .bearer_auth(access_token);
        let response = send(request).await?;
        decode_json(response).await
    }

    /// `PUT /auth/profile/`: partial profile update; only provided fields
    /// are sent, and an empty string clears a field.
    ///
    /// # Errors
    ///
    /// Returns the normalized API message on rejection, or a transport error.
    pub async fn update_profile(
        &self,
        access_token: &str,
        update: &ProfileUpdate,
    ) -> Result<UserRecord, Error> {
        let request = self
            .client
            .put(self.endpoint("/auth/profile/"))
            .bearer_auth(access_token)
            .json(update);
        let response = send(request).await?;
        decode_json(response).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.client.post(self.endpoint(path)).json(body);
        let response = send(request).await?;
        decode_json(response).await
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

async fn send(request: RequestBuilder) -> Result<Response, Error> {
    request
        .send()
        .await
        .map_err(|err| Error::Network(err.to_string()))
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, Error> {
    let status = response.status();
    if status.is_success() {
        response
            .json::<T>()
            .await
            .map_err(|err| Error::Decode(err.to_string()))
    } else {
        Err(api_error(response).await)
    }
}

async fn expect_success(response: Response) -> Result<(), Error> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(api_error(response).await)
    }
}

async fn api_error(response: Response) -> Error {
    let status = response.status();
    let reason = status.canonical_reason().unwrap_or_default();
    let body = response.text().await.unwrap_or_default();
    let message = normalize_message(status.as_u16(), reason, &body);
    debug!("Identity API error {status}: {message}");
    Error::Api {
        status: status.as_u16(),
        message,
    }
}
