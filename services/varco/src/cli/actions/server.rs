use crate::api::{self, state::AppState};
use anyhow::{Context, Result};
use identity_client::IdentityApi;
use std::sync::Arc;
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub api_url: String,
    pub base_url: String,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the identity API client cannot be built or the
/// server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let api = IdentityApi::new(&args.api_url).context("Failed to build identity API client")?;
    let state = AppState::new(api, &args.base_url);

    info!(
        port = args.port,
        api_url = %args.api_url,
        base_url = %args.base_url,
        secure_cookies = state.cookies.secure,
        "Startup configuration"
    );

    api::serve(args.port, Arc::new(state)).await
}
