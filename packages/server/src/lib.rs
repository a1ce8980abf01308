// Coaching Portal - API Core
//
// Backend for the coaching institute portal: OTP-based student sign-in,
// cookie sessions and admin authentication.
//
// OTP rate limiting, issuance and verification live in domains/auth/otp.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
