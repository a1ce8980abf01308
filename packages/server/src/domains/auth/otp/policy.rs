use chrono::{DateTime, Duration, Utc};

use crate::domains::auth::models::{OtpIssue, OtpRequest};

/// Limits and lifetimes for OTP issuance
#[derive(Debug, Clone)]
pub struct OtpPolicy {
    /// Minimum spacing between two requests for the same phone
    pub cooldown: Duration,
    /// Rolling window for `max_per_window`
    pub window: Duration,
    pub max_per_window: i32,
    /// Length of a daily period for `max_per_day`
    pub daily_period: Duration,
    pub max_per_day: i32,
    /// How long a phone stays blocked after hitting the daily cap
    pub block_duration: Duration,
    pub code_ttl: Duration,
    pub code_length: u32,
}

impl Default for OtpPolicy {
    fn default() -> Self {
        Self {
            cooldown: Duration::seconds(60),
            window: Duration::minutes(10),
            max_per_window: 3,
            daily_period: Duration::hours(24),
            max_per_day: 10,
            block_duration: Duration::hours(24),
            code_ttl: Duration::minutes(5),
            code_length: 6,
        }
    }
}

impl OtpPolicy {
    pub fn is_blocked(&self, record: &OtpRequest, now: DateTime<Utc>) -> bool {
        record.blocked_until.is_some_and(|until| until > now)
    }

    pub fn in_cooldown(&self, record: &OtpRequest, now: DateTime<Utc>) -> bool {
        now - record.last_requested_at < self.cooldown
    }

    /// Requests counted against the window; zero once the window has passed
    pub fn requests_in_window(&self, record: &OtpRequest, now: DateTime<Utc>) -> i32 {
        if now - record.last_requested_at > self.window {
            0
        } else {
            record.request_count
        }
    }

    /// Requests counted against the daily cap; zero once the period has passed
    pub fn requests_today(&self, record: &OtpRequest, now: DateTime<Utc>) -> i32 {
        if now - record.daily_window_started_at >= self.daily_period {
            0
        } else {
            record.daily_count
        }
    }

    /// Build the write for an issuance at `now`
    pub fn issue_for(
        &self,
        phone: &str,
        code_hash: String,
        ip_address: Option<&str>,
        now: DateTime<Utc>,
    ) -> OtpIssue {
        OtpIssue {
            phone: phone.to_string(),
            code_hash,
            ip_address: ip_address.map(str::to_string),
            issued_at: now,
            expires_at: now + self.code_ttl,
            cooldown_cutoff: now - self.cooldown,
            window_cutoff: now - self.window,
            daily_cutoff: now - self.daily_period,
        }
    }
}
