//! Test fixtures for creating test data.

use chrono::{DateTime, Duration, TimeZone, Utc};
use portal_core::domains::auth::models::OtpIssue;
use portal_core::domains::auth::otp::OtpPolicy;
use rand::Rng;

/// Random Indian mobile number, unique enough to isolate tests
pub fn unique_phone() -> String {
    let digits: u64 = rand::thread_rng().gen_range(1_000_000_000..10_000_000_000);
    format!("+91{}", digits)
}

pub fn unique_username(prefix: &str) -> String {
    format!("{}_{}", prefix, uuid::Uuid::new_v4().simple())
}

/// Fixed starting instant for store tests
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 10, 9, 0, 0).unwrap()
}

pub fn at(seconds: i64) -> DateTime<Utc> {
    t0() + Duration::seconds(seconds)
}

/// Issuance for `phone` at `now` under the default policy
pub fn issue(phone: &str, code_hash: &str, now: DateTime<Utc>) -> OtpIssue {
    OtpPolicy::default().issue_for(phone, code_hash.to_string(), Some("10.0.0.1"), now)
}
