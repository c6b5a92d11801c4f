use crate::ratelimit::{DEFAULT_MAX_TOKENS, UnresolvedClientPolicy};
use clap::{Arg, ArgMatches, Command, builder::PossibleValuesParser};

pub const ARG_FRONTEND_BASE_URL: &str = "frontend-base-url";
pub const ARG_RATE_LIMIT_MAX: &str = "rate-limit-max";
pub const ARG_RATE_LIMIT_REFILL_SECONDS: &str = "rate-limit-refill-seconds";
pub const ARG_ON_UNRESOLVED_CLIENT: &str = "on-unresolved-client";
pub const ARG_SESSION_COOKIE: &str = "session-cookie";
pub const ARG_RESET_COOKIE: &str = "reset-cookie";

#[derive(Debug, Clone)]
pub struct Options {
    pub frontend_base_url: String,
    pub rate_limit_max: u32,
    pub rate_limit_refill_seconds: u64,
    pub on_unresolved_client: UnresolvedClientPolicy,
    pub session_cookie: String,
    pub reset_cookie: String,
}

impl Options {
    /// Parse gate arguments from matches.
    ///
    /// # Errors
    /// Returns an error if required arguments are missing.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        // Helper to filter empty strings which clap might pass through if env vars are set to ""
        let get_non_empty = |id: &str| {
            matches
                .get_one::<String>(id)
                .cloned()
                .filter(|v| !v.trim().is_empty())
        };

        let Some(frontend_base_url) = get_non_empty(ARG_FRONTEND_BASE_URL) else {
            anyhow::bail!("missing required argument: --{ARG_FRONTEND_BASE_URL}");
        };
        let Some(session_cookie) = get_non_empty(ARG_SESSION_COOKIE) else {
            anyhow::bail!("missing required argument: --{ARG_SESSION_COOKIE}");
        };
        let Some(reset_cookie) = get_non_empty(ARG_RESET_COOKIE) else {
            anyhow::bail!("missing required argument: --{ARG_RESET_COOKIE}");
        };

        let on_unresolved_client = match get_non_empty(ARG_ON_UNRESOLVED_CLIENT).as_deref() {
            Some("deny") => UnresolvedClientPolicy::Deny,
            _ => UnresolvedClientPolicy::Allow,
        };

        Ok(Self {
            frontend_base_url,
            rate_limit_max: matches
                .get_one::<u32>(ARG_RATE_LIMIT_MAX)
                .copied()
                .unwrap_or(DEFAULT_MAX_TOKENS),
            rate_limit_refill_seconds: matches
                .get_one::<u64>(ARG_RATE_LIMIT_REFILL_SECONDS)
                .copied()
                .unwrap_or(1),
            on_unresolved_client,
            session_cookie,
            reset_cookie,
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_FRONTEND_BASE_URL)
                .long(ARG_FRONTEND_BASE_URL)
                .help("Frontend base URL used for redirects and CORS")
                .env("PORTICO_FRONTEND_BASE_URL")
                .default_value("http://localhost:3000"),
        )
        .arg(
            Arg::new(ARG_RATE_LIMIT_MAX)
                .long(ARG_RATE_LIMIT_MAX)
                .help("Token bucket capacity per client IP")
                .env("PORTICO_RATE_LIMIT_MAX")
                .default_value("100")
                .value_parser(clap::value_parser!(u32).range(1..)),
        )
        .arg(
            Arg::new(ARG_RATE_LIMIT_REFILL_SECONDS)
                .long(ARG_RATE_LIMIT_REFILL_SECONDS)
                .help("Seconds per refilled token")
                .env("PORTICO_RATE_LIMIT_REFILL_SECONDS")
                .default_value("1")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_ON_UNRESOLVED_CLIENT)
                .long(ARG_ON_UNRESOLVED_CLIENT)
                .help("What to do when the client IP cannot be resolved")
                .long_help(
                    "What to do when the client IP cannot be resolved from proxy headers.\n\n'allow' skips rate limiting for that request, 'deny' rejects it with 429.",
                )
                .env("PORTICO_ON_UNRESOLVED_CLIENT")
                .default_value("allow")
                .value_parser(PossibleValuesParser::new(["allow", "deny"])),
        )
        .arg(
            Arg::new(ARG_SESSION_COOKIE)
                .long(ARG_SESSION_COOKIE)
                .help("Name of the login session cookie")
                .env("PORTICO_SESSION_COOKIE")
                .default_value("session"),
        )
        .arg(
            Arg::new(ARG_RESET_COOKIE)
                .long(ARG_RESET_COOKIE)
                .help("Name of the password reset session cookie")
                .env("PORTICO_RESET_COOKIE")
                .default_value("password_reset_session"),
        )
}
