//! Route-guard decision logic. Evaluated before a protected navigation is
//! served: allow passage, redirect, or refresh the access token first. The
//! decision is a pure function of the token pair, the target path, and the
//! clock, so every branch is testable without a network.

use crate::api::IdentityApi;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct GuardPolicy {
    login_path: String,
    home_path: String,
    auth_form_paths: Vec<String>,
    protected_prefixes: Vec<String>,
}

impl Default for GuardPolicy {
    fn default() -> Self {
        Self {
            login_path: "/auth/login".to_string(),
            home_path: "/".to_string(),
            auth_form_paths: vec!["/auth/login".to_string(), "/auth/register".to_string()],
            protected_prefixes: vec![
                "/auth/profile".to_string(),
                "/profile".to_string(),
                "/dashboard".to_string(),
            ],
        }
    }
}

impl GuardPolicy {
    #[must_use]
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    #[must_use]
    pub fn with_home_path(mut self, path: impl Into<String>) -> Self {
        self.home_path = path.into();
        self
    }

    #[must_use]
    pub fn with_protected_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.protected_prefixes = prefixes;
        self
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Login and register forms match with or without a trailing slash.
    fn is_auth_form(&self, path: &str) -> bool {
        let trimmed = path.strip_suffix('/').unwrap_or(path);
        self.auth_form_paths.iter().any(|form| trimmed == form)
    }

    fn is_protected(&self, path: &str) -> bool {
        self.protected_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAction {
    Allow,
    Redirect(String),
}

/// Storage change the caller must apply, whatever holds the tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenMutation {
    StoreAccess(String),
    ClearAccess,
    ClearAll,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub action: RouteAction,
    pub mutations: Vec<TokenMutation>,
}

impl Decision {
    fn allow(mutations: Vec<TokenMutation>) -> Self {
        Self {
            action: RouteAction::Allow,
            mutations,
        }
    }

    fn redirect(path: &str, mutations: Vec<TokenMutation>) -> Self {
        Self {
            action: RouteAction::Redirect(path.to_string()),
            mutations,
        }
    }

    /// The access token handlers should use after this decision.
    #[must_use]
    pub fn effective_access(&self, presented: Option<&str>) -> Option<String> {
        for mutation in &self.mutations {
            match mutation {
                TokenMutation::StoreAccess(access) => return Some(access.clone()),
                TokenMutation::ClearAccess | TokenMutation::ClearAll => return None,
            }
        }
        presented.map(ToString::to_string)
    }
}

/// First phase of the guard: either settled, or "refresh with this token".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardPlan {
    Settled(Decision),
    Refresh { refresh_token: String },
}

/// Decide what to do with a navigation, given the presented tokens and the
/// clock. An expired access token is treated as absent (fail closed) and
/// scheduled for removal when it cannot be replaced.
#[must_use]
pub fn plan(
    policy: &GuardPolicy,
    access: Option<&str>,
    refresh: Option<&str>,
    path: &str,
    now_unix_seconds: i64,
) -> GuardPlan {
    let access_is_live = access
        .map(|token| !identity_token::is_expired(token, now_unix_seconds))
        .unwrap_or(false);

    if access_is_live {
        // Signed-in users have no business on the auth forms.
        let decision = if policy.is_auth_form(path) {
            Decision::redirect(&policy.home_path, Vec::new())
        } else {
            Decision::allow(Vec::new())
        };
        return GuardPlan::Settled(decision);
    }

    if let Some(refresh_token) = refresh {
        return GuardPlan::Refresh {
            refresh_token: refresh_token.to_string(),
        };
    }

    // No refresh token. Drop a dead access token if one was presented.
    let mutations = if access.is_some() {
        vec![TokenMutation::ClearAccess]
    } else {
        Vec::new()
    };
    let decision = if policy.is_protected(path) {
        Decision::redirect(&policy.login_path, mutations)
    } else {
        Decision::allow(mutations)
    };
    GuardPlan::Settled(decision)
}

/// Second phase: fold the outcome of the single refresh attempt into a
/// settled decision.
#[must_use]
pub fn settle_refresh(policy: &GuardPolicy, new_access: Option<String>, path: &str) -> Decision {
    match new_access {
        Some(access) => {
            let mutations = vec![TokenMutation::StoreAccess(access)];
            if policy.is_auth_form(path) {
                Decision::redirect(&policy.home_path, mutations)
            } else {
                Decision::allow(mutations)
            }
        }
        None => Decision::redirect(&policy.login_path, vec![TokenMutation::ClearAll]),
    }
}

/// Guard driver that performs the refresh leg against the identity API.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    api: IdentityApi,
    policy: GuardPolicy,
}

impl RouteGuard {
    #[must_use]
    pub fn new(api: IdentityApi, policy: GuardPolicy) -> Self {
        Self { api, policy }
    }

    #[must_use]
    pub fn policy(&self) -> &GuardPolicy {
        &self.policy
    }

    /// Evaluate a navigation, refreshing at most once. Concurrent callers
    /// each run their own refresh; attempts are not coalesced.
    pub async fn evaluate(
        &self,
        access: Option<&str>,
        refresh: Option<&str>,
        path: &str,
        now_unix_seconds: i64,
    ) -> Decision {
        match plan(&self.policy, access, refresh, path, now_unix_seconds) {
            GuardPlan::Settled(decision) => decision,
            GuardPlan::Refresh { refresh_token } => {
                let new_access = match self.api.refresh(&refresh_token).await {
                    Ok(access) => Some(access),
                    Err(err) => {
                        warn!("Route guard refresh failed: {err}");
                        None
                    }
                };
                settle_refresh(&self.policy, new_access, path)
            }
        }
    }
}
