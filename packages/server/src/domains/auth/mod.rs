//! Auth domain - student sign-in via phone OTP, admin password login
//!
//! Responsibilities:
//! - OTP rate limiting, issuance and single-use verification (see `otp`)
//! - Session JWT creation for students and admins
//! - Admin credential checks and activity logging

pub mod actions;
pub mod errors;
pub mod jwt;
pub mod models;
pub mod otp;
pub mod password;

pub use errors::{AuthError, OtpError, RateLimitReason};
pub use jwt::{Claims, JwtService, Role};
