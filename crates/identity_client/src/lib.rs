//! # Identity API client
//!
//! Browser-facing authentication against a remote identity API that issues
//! short-lived access tokens and longer-lived refresh tokens. The crate
//! provides:
//!
//! - [`IdentityApi`]: typed requests for login, registration, token refresh,
//!   logout notification, and profile reads/updates, with error payloads
//!   normalized into a single user-facing message.
//! - [`TokenStore`]/[`MemoryStore`]: the single mutable token slot of a
//!   session, pluggable per deployment mode.
//! - [`SessionController`]: current-user state with observer notification
//!   and stale-response protection.
//! - [`guard`]: the deterministic route-guard decision used before serving
//!   a protected navigation, including the single transparent refresh
//!   attempt.
//!
//! Access tokens are never verified here; the remote API is the sole
//! authority on validity, and [`identity_token`] only reads the expiry
//! claim to decide when a refresh is due.

pub mod api;
pub mod error;
pub mod guard;
pub mod session;
pub mod store;
pub mod types;

pub use api::{APP_USER_AGENT, IdentityApi};
pub use error::Error;
pub use guard::{Decision, GuardPlan, GuardPolicy, RouteAction, RouteGuard, TokenMutation};
pub use session::{ProfileOutcome, SessionController};
pub use store::{MemoryStore, TokenStore};
pub use types::{AuthPayload, Credentials, ProfileUpdate, Registration, TokenPair, UserRecord};
