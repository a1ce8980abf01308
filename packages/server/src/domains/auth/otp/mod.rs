//! OTP issuance and verification core
//!
//! ```text
//! send-otp   → RateLimiter::check_limit → OtpIssuer (hash, store atomically) → SMS gateway
//! verify-otp → OtpVerifier (expiry-aware lookup, constant-time compare, single-use delete)
//! ```
//!
//! Per-phone lifecycle: NONE → ISSUED → VERIFIED/EXPIRED → NONE. A new issue
//! replaces the previous code; expiry is checked at read time and the
//! scheduled sweep only reclaims rows.

pub mod code;
pub mod issuer;
pub mod policy;
pub mod rate_limiter;
pub mod verifier;

pub use code::{generate_code, OtpHasher};
pub use issuer::{IssuedOtp, OtpIssuer};
pub use policy::OtpPolicy;
pub use rate_limiter::RateLimiter;
pub use verifier::OtpVerifier;
