//! # Portico (Listings Platform Session Gate)
//!
//! `portico` answers one question per request for the listings platform's
//! fronting proxies and apps: may this visitor see this page, and if not,
//! where do they go instead?
//!
//! ## Decisions
//!
//! Every guarded page ("surface") is an ordered list of checks evaluated
//! strictly in order: rate limit, session presence, email verification,
//! second-factor registration, second-factor verification. The first failing
//! check short-circuits into a redirect; passing every check renders the
//! page. The password-reset pages run the same machine over the reset
//! session's own flags.
//!
//! ## Rate limiting
//!
//! One refilling token bucket per client IP, shared by both cost tiers:
//! GET-class requests consume 1 token, POST-class 3. Requests without a
//! resolvable client IP are admitted or refused by the configured
//! `--on-unresolved-client` policy (default: allow).
//!
//! ## Read-only storage
//!
//! Sessions, users, and password-reset sessions live in Postgres and are
//! owned by the platform apps. Portico looks them up by hashed cookie token
//! and never creates, renews, or deletes them.

pub mod api;
pub mod cli;
pub mod gate;
pub mod ratelimit;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
