// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Rate limiting, issuance and verification live in domains::auth::otp and
// only talk to storage and SMS through these seams.
//
// Naming convention: Base* for trait names (e.g., BaseOtpStore, BaseSmsGateway)

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domains::auth::models::{
    ActivityLog, ActivityLogFilter, Admin, NewActivityLog, NewAdmin, OtpCode, OtpIssue,
    OtpRequest, User,
};

// =============================================================================
// OTP Store Trait (Infrastructure - per-phone request records and codes)
// =============================================================================

#[async_trait]
pub trait BaseOtpStore: Send + Sync {
    /// Rate-limit record for a phone, if it has ever requested a code
    async fn find_request(&self, phone: &str) -> Result<Option<OtpRequest>>;

    /// Put the phone on hold until `until`
    async fn block_until(&self, phone: &str, until: DateTime<Utc>) -> Result<()>;

    /// Record an issuance and replace the phone's code as one unit.
    ///
    /// Returns `false` without writing anything when another issuance for the
    /// same phone landed inside the cooldown first.
    async fn record_issue(&self, issue: &OtpIssue) -> Result<bool>;

    /// Newest unexpired code for a phone
    async fn find_active_code(&self, phone: &str, now: DateTime<Utc>) -> Result<Option<OtpCode>>;

    /// Delete the code and reset the phone's window counter.
    ///
    /// Returns `false` if the code was already gone (consumed concurrently).
    async fn consume_code(&self, code: &OtpCode) -> Result<bool>;

    /// Delete codes that expired at or before `now`; returns the count
    async fn purge_expired_codes(&self, now: DateTime<Utc>) -> Result<u64>;

    /// Cheap liveness probe used by the health endpoint
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

// =============================================================================
// Account Store Trait (Infrastructure - users, admins, activity log)
// =============================================================================

#[async_trait]
pub trait BaseAccountStore: Send + Sync {
    async fn find_or_create_user(&self, phone: &str) -> Result<User>;

    async fn find_admin_by_username(&self, username: &str) -> Result<Option<Admin>>;

    /// Bump `total_visits` and set `last_login`; returns the updated admin
    async fn record_admin_login(&self, admin_id: Uuid, at: DateTime<Utc>) -> Result<Admin>;

    async fn create_admin(&self, admin: NewAdmin) -> Result<Admin>;

    async fn log_activity(&self, entry: NewActivityLog) -> Result<ActivityLog>;

    /// One page of matching entries, newest first, plus the total match count
    async fn list_activity(&self, filter: &ActivityLogFilter) -> Result<(Vec<ActivityLog>, i64)>;
}

// =============================================================================
// SMS Gateway Trait (Infrastructure - outbound text messages)
// =============================================================================

#[async_trait]
pub trait BaseSmsGateway: Send + Sync {
    /// Send `body` to `phone` (E.164)
    async fn send_sms(&self, phone: &str, body: &str) -> Result<()>;
}
