use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

/// Per-phone OTP request bookkeeping, one row per phone number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct OtpRequest {
    pub phone: String,
    /// Requests inside the current rolling window
    pub request_count: i32,
    /// Requests inside the current daily period
    pub daily_count: i32,
    pub daily_window_started_at: DateTime<Utc>,
    pub last_requested_at: DateTime<Utc>,
    pub blocked_until: Option<DateTime<Utc>>,
    /// Last originating address, informational only
    pub ip_address: Option<String>,
}

// =============================================================================
// SQL Queries
// =============================================================================

impl OtpRequest {
    pub async fn find_by_phone(phone: &str, pool: &PgPool) -> Result<Option<Self>> {
        let record = sqlx::query_as::<_, OtpRequest>("SELECT * FROM otp_requests WHERE phone = $1")
            .bind(phone)
            .fetch_optional(pool)
            .await?;
        Ok(record)
    }

    /// Put the phone on hold until `until`
    pub async fn block_until(phone: &str, until: DateTime<Utc>, pool: &PgPool) -> Result<()> {
        sqlx::query("UPDATE otp_requests SET blocked_until = $2 WHERE phone = $1")
            .bind(phone)
            .bind(until)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Clear the rolling-window counter after a successful verification
    pub async fn reset_window_count(phone: &str, conn: &mut PgConnection) -> Result<()> {
        sqlx::query("UPDATE otp_requests SET request_count = 0 WHERE phone = $1")
            .bind(phone)
            .execute(conn)
            .await?;
        Ok(())
    }
}
