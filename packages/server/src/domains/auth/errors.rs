use thiserror::Error;

use crate::common::ValidationError;

/// Which limit rejected an OTP request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitReason {
    /// A previous daily-cap violation put the phone on hold
    Blocked,
    /// Previous request was too recent
    Cooldown,
    /// Too many requests inside the rolling window
    Window,
    /// Daily cap reached; this rejection also sets the block
    Daily,
}

impl RateLimitReason {
    /// Client-facing message. Never includes counters or the block expiry.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Blocked => "Too many requests. Try later.",
            Self::Cooldown => "Please wait before requesting OTP again",
            Self::Window => "OTP limit reached. Please wait.",
            Self::Daily => "Daily OTP limit exceeded",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blocked => "blocked",
            Self::Cooldown => "cooldown",
            Self::Window => "window",
            Self::Daily => "daily",
        }
    }
}

/// Failures of the OTP issue/verify flow
#[derive(Debug, Error)]
pub enum OtpError {
    #[error("{}", .0.message())]
    RateLimited(RateLimitReason),

    /// Wrong code and expired code are deliberately indistinguishable
    #[error("Invalid or expired OTP")]
    InvalidOrExpired,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl OtpError {
    pub fn rate_limit_reason(&self) -> Option<RateLimitReason> {
        match self {
            Self::RateLimited(reason) => Some(*reason),
            _ => None,
        }
    }
}

/// Admin login failures
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}
