//! Command-line argument dispatch and server initialization.
//!
//! This module parses validated CLI arguments and maps them to the appropriate
//! action, such as starting the API server with its full configuration state.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::gate;
use anyhow::{Context, Result};
use secrecy::SecretString;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;

    let db_password = matches
        .get_one::<String>("db-password")
        .filter(|v| !v.trim().is_empty())
        .map(|v| SecretString::from(v.clone()));

    let gate_opts = gate::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        db_password,
        frontend_base_url: gate_opts.frontend_base_url,
        rate_limit_max: gate_opts.rate_limit_max,
        rate_limit_refill_seconds: gate_opts.rate_limit_refill_seconds,
        on_unresolved_client: gate_opts.on_unresolved_client,
        session_cookie: gate_opts.session_cookie,
        reset_cookie: gate_opts.reset_cookie,
    }))
}
