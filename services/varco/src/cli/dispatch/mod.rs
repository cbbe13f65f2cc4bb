//! Command-line argument dispatch and server initialization.
//!
//! This module parses validated CLI arguments and maps them to the
//! appropriate action, such as starting the gateway with its full
//! configuration.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands;
use anyhow::{Context, Result};
use url::Url;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches
        .get_one::<u16>(commands::ARG_PORT)
        .copied()
        .unwrap_or(8080);

    let api_url = matches
        .get_one::<String>(commands::ARG_API_URL)
        .cloned()
        .context("missing required argument: --api-url")?;
    Url::parse(&api_url).with_context(|| format!("invalid VARCO_API_URL: {api_url}"))?;

    let base_url = matches
        .get_one::<String>(commands::ARG_BASE_URL)
        .cloned()
        .unwrap_or_else(|| "http://localhost:8080".to_string());

    Ok(Action::Server(Args {
        port,
        api_url,
        base_url,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_a_server_action() -> Result<()> {
        temp_env::with_vars([("VARCO_API_URL", None::<&str>)], || {
            let command = crate::cli::commands::new();
            let matches = command.get_matches_from(vec![
                "varco",
                "--port",
                "9090",
                "--api-url",
                "http://identity.localhost:8000",
            ]);
            let Action::Server(args) = handler(&matches)?;
            assert_eq!(args.port, 9090);
            assert_eq!(args.api_url, "http://identity.localhost:8000");
            assert_eq!(args.base_url, "http://localhost:8080");
            Ok(())
        })
    }

    #[test]
    fn rejects_an_unparseable_api_url() {
        temp_env::with_vars([("VARCO_API_URL", Some("not a url"))], || {
            let command = crate::cli::commands::new();
            let matches = command.get_matches_from(vec!["varco"]);
            let result = handler(&matches);
            assert!(result.is_err());
            if let Err(err) = result {
                assert!(err.to_string().contains("invalid VARCO_API_URL"));
            }
        });
    }
}
