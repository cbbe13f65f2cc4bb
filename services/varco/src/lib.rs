//! # Varco (Authentication Gateway)
//!
//! `varco` is the server-mediated deployment of the browser-facing
//! authentication layer. The browser never sees a token: both the access
//! and refresh tokens live in `HttpOnly` cookies set by this gateway, and a
//! route guard runs on every navigation to decide whether to let the
//! request pass, refresh the access token transparently, or redirect to the
//! login page.
//!
//! ## Request Flow
//!
//! 1. The guard middleware reads the token cookies and evaluates the
//!    deterministic decision in [`identity_client::guard`].
//! 2. Auth actions (`POST /auth/login`, `/auth/register`, `/auth/logout`)
//!    bypass the guard, call the identity API, and translate the outcome
//!    into cookie mutations.
//! 3. Profile routes use the access token resolved by the guard (possibly
//!    refreshed during the same request).
//!
//! Every failure degrades to an unauthenticated, redirect-to-login state;
//! nothing in this service is fatal to the process.

pub mod api;
pub mod cli;
