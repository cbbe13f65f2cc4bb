//! Shared gateway state: the identity API client, the route guard driving
//! it, and the cookie policy derived from the deployment's base URL.

use identity_client::{GuardPolicy, IdentityApi, RouteGuard};

#[derive(Debug, Clone, Copy)]
pub struct CookieConfig {
    pub secure: bool,
}

impl CookieConfig {
    /// Only mark cookies secure when the gateway is served over HTTPS.
    #[must_use]
    pub fn from_base_url(base_url: &str) -> Self {
        Self {
            secure: base_url.starts_with("https://"),
        }
    }
}

#[derive(Debug)]
pub struct AppState {
    pub api: IdentityApi,
    pub guard: RouteGuard,
    pub cookies: CookieConfig,
}

impl AppState {
    #[must_use]
    pub fn new(api: IdentityApi, base_url: &str) -> Self {
        Self {
            guard: RouteGuard::new(api.clone(), GuardPolicy::default()),
            cookies: CookieConfig::from_base_url(base_url),
            api,
        }
    }
}
