//! Guarded page surfaces and their ordered step tables.

use super::{Check, Flow, GateDecision, GuardStep, SessionFlags, Target, evaluate};

/// A guarded page of the platform, addressed by slug in the gate endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Surface {
    Dashboard,
    Login,
    VerifyEmail,
    TwoFactorSetup,
    TwoFactor,
    ForgotPassword,
    ResetPasswordVerifyEmail,
    ResetPasswordTwoFactor,
    ResetPassword,
}

const DASHBOARD: &[GuardStep] = &[
    GuardStep {
        requires: Check::Session,
        otherwise: Target::Path("/login"),
    },
    GuardStep {
        requires: Check::EmailVerified,
        otherwise: Target::Path("/verify-email"),
    },
    GuardStep {
        requires: Check::TwoFactorRegistered,
        otherwise: Target::Path("/2fa/setup"),
    },
    GuardStep {
        requires: Check::TwoFactorVerified,
        otherwise: Target::Path("/2fa"),
    },
];

const LOGIN: &[GuardStep] = &[GuardStep {
    requires: Check::Anonymous,
    otherwise: Target::Continue,
}];

const VERIFY_EMAIL: &[GuardStep] = &[
    GuardStep {
        requires: Check::Session,
        otherwise: Target::Path("/login"),
    },
    GuardStep {
        requires: Check::EmailPending,
        otherwise: Target::Continue,
    },
];

const TWO_FACTOR_SETUP: &[GuardStep] = &[
    GuardStep {
        requires: Check::Session,
        otherwise: Target::Path("/login"),
    },
    GuardStep {
        requires: Check::EmailVerified,
        otherwise: Target::Path("/verify-email"),
    },
    // Re-keying is allowed, but a registered factor must be confirmed first.
    GuardStep {
        requires: Check::TwoFactorSettled,
        otherwise: Target::Path("/2fa"),
    },
];

const TWO_FACTOR: &[GuardStep] = &[
    GuardStep {
        requires: Check::Session,
        otherwise: Target::Path("/login"),
    },
    GuardStep {
        requires: Check::EmailVerified,
        otherwise: Target::Path("/verify-email"),
    },
    GuardStep {
        requires: Check::TwoFactorRegistered,
        otherwise: Target::Path("/2fa/setup"),
    },
    // Already verified: the challenge page forwards the visitor away.
    GuardStep {
        requires: Check::TwoFactorPending,
        otherwise: Target::Continue,
    },
];

const FORGOT_PASSWORD: &[GuardStep] = &[];

const RESET_PASSWORD_VERIFY_EMAIL: &[GuardStep] = &[
    GuardStep {
        requires: Check::Session,
        otherwise: Target::Path("/forgot-password"),
    },
    GuardStep {
        requires: Check::EmailPending,
        otherwise: Target::Continue,
    },
];

const RESET_PASSWORD_TWO_FACTOR: &[GuardStep] = &[
    GuardStep {
        requires: Check::Session,
        otherwise: Target::Path("/forgot-password"),
    },
    GuardStep {
        requires: Check::EmailVerified,
        otherwise: Target::Path("/reset-password/verify-email"),
    },
    GuardStep {
        requires: Check::TwoFactorRegistered,
        otherwise: Target::Path("/reset-password"),
    },
    GuardStep {
        requires: Check::TwoFactorPending,
        otherwise: Target::Path("/reset-password"),
    },
];

const RESET_PASSWORD: &[GuardStep] = &[
    GuardStep {
        requires: Check::Session,
        otherwise: Target::Path("/forgot-password"),
    },
    GuardStep {
        requires: Check::EmailVerified,
        otherwise: Target::Path("/reset-password/verify-email"),
    },
    GuardStep {
        requires: Check::TwoFactorSettled,
        otherwise: Target::Path("/reset-password/2fa"),
    },
];

impl Surface {
    /// Resolve a gate-path slug. Unknown slugs are the caller's 404.
    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "dashboard" => Some(Self::Dashboard),
            "login" => Some(Self::Login),
            "verify-email" => Some(Self::VerifyEmail),
            "2fa-setup" => Some(Self::TwoFactorSetup),
            "2fa" => Some(Self::TwoFactor),
            "forgot-password" => Some(Self::ForgotPassword),
            "reset-password-verify-email" => Some(Self::ResetPasswordVerifyEmail),
            "reset-password-2fa" => Some(Self::ResetPasswordTwoFactor),
            "reset-password" => Some(Self::ResetPassword),
            _ => None,
        }
    }

    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Login => "login",
            Self::VerifyEmail => "verify-email",
            Self::TwoFactorSetup => "2fa-setup",
            Self::TwoFactor => "2fa",
            Self::ForgotPassword => "forgot-password",
            Self::ResetPasswordVerifyEmail => "reset-password-verify-email",
            Self::ResetPasswordTwoFactor => "reset-password-2fa",
            Self::ResetPassword => "reset-password",
        }
    }

    /// Which session store feeds this surface's flags.
    #[must_use]
    pub const fn flow(self) -> Flow {
        match self {
            Self::Dashboard
            | Self::Login
            | Self::VerifyEmail
            | Self::TwoFactorSetup
            | Self::TwoFactor => Flow::Account,
            Self::ForgotPassword
            | Self::ResetPasswordVerifyEmail
            | Self::ResetPasswordTwoFactor
            | Self::ResetPassword => Flow::PasswordReset,
        }
    }

    const fn steps(self) -> &'static [GuardStep] {
        match self {
            Self::Dashboard => DASHBOARD,
            Self::Login => LOGIN,
            Self::VerifyEmail => VERIFY_EMAIL,
            Self::TwoFactorSetup => TWO_FACTOR_SETUP,
            Self::TwoFactor => TWO_FACTOR,
            Self::ForgotPassword => FORGOT_PASSWORD,
            Self::ResetPasswordVerifyEmail => RESET_PASSWORD_VERIFY_EMAIL,
            Self::ResetPasswordTwoFactor => RESET_PASSWORD_TWO_FACTOR,
            Self::ResetPassword => RESET_PASSWORD,
        }
    }

    /// Evaluate this surface against the visitor's flags.
    #[must_use]
    pub fn decide(self, flags: Option<&SessionFlags>) -> GateDecision {
        evaluate(self.flow(), self.steps(), flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(email: bool, registered: bool, verified: bool) -> SessionFlags {
        SessionFlags {
            email_verified: email,
            two_factor_registered: registered,
            two_factor_verified: verified,
        }
    }

    #[test]
    fn slugs_round_trip() {
        let all = [
            Surface::Dashboard,
            Surface::Login,
            Surface::VerifyEmail,
            Surface::TwoFactorSetup,
            Surface::TwoFactor,
            Surface::ForgotPassword,
            Surface::ResetPasswordVerifyEmail,
            Surface::ResetPasswordTwoFactor,
            Surface::ResetPassword,
        ];
        for surface in all {
            assert_eq!(Surface::from_slug(surface.slug()), Some(surface));
        }
        assert_eq!(Surface::from_slug("profile"), None);
    }

    #[test]
    fn dashboard_runs_the_full_chain() {
        assert_eq!(
            Surface::Dashboard.decide(None),
            GateDecision::RedirectTo("/login")
        );
        assert_eq!(
            Surface::Dashboard.decide(Some(&flags(false, true, true))),
            GateDecision::RedirectTo("/verify-email")
        );
        assert_eq!(
            Surface::Dashboard.decide(Some(&flags(true, false, false))),
            GateDecision::RedirectTo("/2fa/setup")
        );
        assert_eq!(
            Surface::Dashboard.decide(Some(&flags(true, true, false))),
            GateDecision::RedirectTo("/2fa")
        );
        assert_eq!(
            Surface::Dashboard.decide(Some(&flags(true, true, true))),
            GateDecision::Allow
        );
    }

    #[test]
    fn login_renders_for_anonymous_and_forwards_signed_in() {
        assert_eq!(Surface::Login.decide(None), GateDecision::Allow);
        assert_eq!(
            Surface::Login.decide(Some(&flags(true, true, true))),
            GateDecision::RedirectTo("/")
        );
        assert_eq!(
            Surface::Login.decide(Some(&flags(true, true, false))),
            GateDecision::RedirectTo("/2fa")
        );
    }

    #[test]
    fn verify_email_is_inverse_guarded() {
        assert_eq!(
            Surface::VerifyEmail.decide(None),
            GateDecision::RedirectTo("/login")
        );
        assert_eq!(
            Surface::VerifyEmail.decide(Some(&flags(false, false, false))),
            GateDecision::Allow
        );
        // Already verified: forward to the next pending step.
        assert_eq!(
            Surface::VerifyEmail.decide(Some(&flags(true, false, false))),
            GateDecision::RedirectTo("/2fa/setup")
        );
    }

    #[test]
    fn two_factor_setup_requires_confirmed_factor() {
        assert_eq!(
            Surface::TwoFactorSetup.decide(Some(&flags(true, false, false))),
            GateDecision::Allow
        );
        assert_eq!(
            Surface::TwoFactorSetup.decide(Some(&flags(true, true, false))),
            GateDecision::RedirectTo("/2fa")
        );
        // Verified visitors may re-key.
        assert_eq!(
            Surface::TwoFactorSetup.decide(Some(&flags(true, true, true))),
            GateDecision::Allow
        );
    }

    #[test]
    fn two_factor_challenge_redirects_when_already_verified() {
        assert_eq!(
            Surface::TwoFactor.decide(Some(&flags(true, true, false))),
            GateDecision::Allow
        );
        assert_eq!(
            Surface::TwoFactor.decide(Some(&flags(true, true, true))),
            GateDecision::RedirectTo("/")
        );
        assert_eq!(
            Surface::TwoFactor.decide(Some(&flags(true, false, false))),
            GateDecision::RedirectTo("/2fa/setup")
        );
    }

    #[test]
    fn forgot_password_is_open() {
        assert_eq!(Surface::ForgotPassword.decide(None), GateDecision::Allow);
        assert_eq!(
            Surface::ForgotPassword.decide(Some(&flags(true, true, true))),
            GateDecision::Allow
        );
    }

    #[test]
    fn reset_password_walks_its_own_chain() {
        assert_eq!(
            Surface::ResetPassword.decide(None),
            GateDecision::RedirectTo("/forgot-password")
        );
        // Unverified reset email always decides the email step, even with a
        // registered and verified second factor.
        assert_eq!(
            Surface::ResetPassword.decide(Some(&flags(false, true, true))),
            GateDecision::RedirectTo("/reset-password/verify-email")
        );
        assert_eq!(
            Surface::ResetPassword.decide(Some(&flags(true, true, false))),
            GateDecision::RedirectTo("/reset-password/2fa")
        );
        assert_eq!(
            Surface::ResetPassword.decide(Some(&flags(true, false, false))),
            GateDecision::Allow
        );
        assert_eq!(
            Surface::ResetPassword.decide(Some(&flags(true, true, true))),
            GateDecision::Allow
        );
    }

    #[test]
    fn reset_verify_email_forwards_once_done() {
        assert_eq!(
            Surface::ResetPasswordVerifyEmail.decide(None),
            GateDecision::RedirectTo("/forgot-password")
        );
        assert_eq!(
            Surface::ResetPasswordVerifyEmail.decide(Some(&flags(false, false, false))),
            GateDecision::Allow
        );
        assert_eq!(
            Surface::ResetPasswordVerifyEmail.decide(Some(&flags(true, true, false))),
            GateDecision::RedirectTo("/reset-password/2fa")
        );
    }

    #[test]
    fn reset_two_factor_only_for_pending_registered_factor() {
        assert_eq!(
            Surface::ResetPasswordTwoFactor.decide(Some(&flags(true, true, false))),
            GateDecision::Allow
        );
        // No registered factor or already verified: straight to the reset form.
        assert_eq!(
            Surface::ResetPasswordTwoFactor.decide(Some(&flags(true, false, false))),
            GateDecision::RedirectTo("/reset-password")
        );
        assert_eq!(
            Surface::ResetPasswordTwoFactor.decide(Some(&flags(true, true, true))),
            GateDecision::RedirectTo("/reset-password")
        );
        assert_eq!(
            Surface::ResetPasswordTwoFactor.decide(Some(&flags(false, true, false))),
            GateDecision::RedirectTo("/reset-password/verify-email")
        );
    }

    #[test]
    fn flows_match_surface_family() {
        assert_eq!(Surface::Dashboard.flow(), Flow::Account);
        assert_eq!(Surface::Login.flow(), Flow::Account);
        assert_eq!(Surface::ResetPassword.flow(), Flow::PasswordReset);
        assert_eq!(Surface::ForgotPassword.flow(), Flow::PasswordReset);
    }
}
