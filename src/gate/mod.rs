//! Ordered guard evaluation for authenticated pages.
//!
//! Every guarded page is a static list of [`GuardStep`]s walked strictly in
//! order. The first unsatisfied step decides a redirect and later steps are
//! never consulted; a fully satisfied list renders the page. The same engine
//! serves the account flow and the password-reset flow, which differ only in
//! where their flags come from and where an interrupted visitor resumes.

mod surfaces;

pub use surfaces::Surface;

/// The three booleans the guard machine reads.
///
/// For the account flow these come from the session and its user; for the
/// password-reset flow, `email_verified` and `two_factor_verified` belong to
/// the reset session itself while `two_factor_registered` stays with the
/// user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionFlags {
    pub email_verified: bool,
    pub two_factor_registered: bool,
    pub two_factor_verified: bool,
}

/// Outcome of evaluating a surface for one request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateDecision {
    /// Every check passed; render the page.
    Allow,
    /// A check failed; send the visitor here instead.
    RedirectTo(&'static str),
    /// The request lost at the rate limiter before any check ran.
    RateLimited,
}

/// A single ordered predicate over the visitor's flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Check {
    /// A session must be present.
    Session,
    /// No session may be present (entry pages like the login form).
    Anonymous,
    EmailVerified,
    /// The email must still be unverified (the verify page itself).
    EmailPending,
    TwoFactorRegistered,
    TwoFactorVerified,
    /// The second factor must still be unverified (the challenge page).
    TwoFactorPending,
    /// A registered second factor must already be verified; visitors
    /// without one pass.
    TwoFactorSettled,
}

impl Check {
    fn satisfied(self, flags: Option<&SessionFlags>) -> bool {
        match self {
            Self::Session => flags.is_some(),
            Self::Anonymous => flags.is_none(),
            Self::EmailVerified => flags.is_some_and(|f| f.email_verified),
            Self::EmailPending => flags.is_some_and(|f| !f.email_verified),
            Self::TwoFactorRegistered => flags.is_some_and(|f| f.two_factor_registered),
            Self::TwoFactorVerified => flags.is_some_and(|f| f.two_factor_verified),
            Self::TwoFactorPending => flags.is_some_and(|f| !f.two_factor_verified),
            Self::TwoFactorSettled => {
                flags.is_some_and(|f| !f.two_factor_registered || f.two_factor_verified)
            }
        }
    }
}

/// Where a failed check sends the visitor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    Path(&'static str),
    /// The flow's next pending step. Used by inverse guards that forward a
    /// visitor who already satisfied the page's purpose.
    Continue,
}

/// One stage of a surface's guard list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GuardStep {
    pub requires: Check,
    pub otherwise: Target,
}

/// Which session store feeds the flags, and where interrupted visitors go.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Account,
    PasswordReset,
}

impl Flow {
    /// Where a visitor lands when they have no session for this flow.
    #[must_use]
    pub const fn entry_point(self) -> &'static str {
        match self {
            Self::Account => "/login",
            Self::PasswordReset => "/forgot-password",
        }
    }

    /// The next pending step for a signed-in visitor, or the flow's terminal
    /// page when everything is already satisfied.
    #[must_use]
    pub fn continue_destination(self, flags: &SessionFlags) -> &'static str {
        match self {
            Self::Account => {
                if !flags.email_verified {
                    "/verify-email"
                } else if !flags.two_factor_registered {
                    "/2fa/setup"
                } else if !flags.two_factor_verified {
                    "/2fa"
                } else {
                    "/"
                }
            }
            Self::PasswordReset => {
                if !flags.email_verified {
                    "/reset-password/verify-email"
                } else if flags.two_factor_registered && !flags.two_factor_verified {
                    "/reset-password/2fa"
                } else {
                    "/reset-password"
                }
            }
        }
    }
}

/// Walk `steps` in order and decide.
///
/// The first unsatisfied step short-circuits into its redirect; no stage is
/// ever skipped and nothing after a failure runs. `flags` is `None` when the
/// flow has no live session.
#[must_use]
pub fn evaluate(flow: Flow, steps: &[GuardStep], flags: Option<&SessionFlags>) -> GateDecision {
    for step in steps {
        if step.requires.satisfied(flags) {
            continue;
        }
        let destination = match step.otherwise {
            Target::Path(path) => path,
            Target::Continue => match flags {
                Some(flags) => flow.continue_destination(flags),
                None => flow.entry_point(),
            },
        };
        return GateDecision::RedirectTo(destination);
    }
    GateDecision::Allow
}
