//! API handlers and shared utilities for Portico.
//!
//! This module organizes the service's route handlers and provides common
//! helpers for client identity, cookie parsing, and session lookups.

pub mod gate;
pub mod health;
pub mod root;
pub mod session;
pub mod state;

pub(crate) mod storage;
pub(crate) mod utils;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DependencyStatus {
    /// Database is reachable and answered a ping.
    Ok,
    /// Database is unreachable or the ping failed.
    Error,
}

impl DependencyStatus {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
        }
    }

    const fn is_healthy(self) -> bool {
        matches!(self, Self::Ok)
    }
}
