use crate::{
    api,
    api::handlers::state::{GateConfig, GateState},
    ratelimit::{RequestRateLimiter, UnresolvedClientPolicy},
};
use anyhow::{Result, anyhow};
use secrecy::{ExposeSecret, SecretString};
use std::{sync::Arc, time::Duration};
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub db_password: Option<SecretString>,
    pub frontend_base_url: String,
    pub rate_limit_max: u32,
    pub rate_limit_refill_seconds: u64,
    pub on_unresolved_client: UnresolvedClientPolicy,
    pub session_cookie: String,
    pub reset_cookie: String,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the DSN is invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let mut dsn = Url::parse(&args.dsn)?;

    // Inject the password so operators can keep it out of the visible DSN
    if let Some(password) = &args.db_password {
        dsn.set_password(Some(password.expose_secret()))
            .map_err(|()| anyhow!("Error setting password"))?;
    }

    let limiter = RequestRateLimiter::new(
        args.rate_limit_max,
        Duration::from_secs(args.rate_limit_refill_seconds),
        args.on_unresolved_client,
    );

    let config = GateConfig::new(args.frontend_base_url)
        .with_session_cookie(args.session_cookie)
        .with_reset_cookie(args.reset_cookie);

    let state = Arc::new(GateState::new(config, Arc::new(limiter)));

    api::new(args.port, dsn.to_string(), state).await
}
