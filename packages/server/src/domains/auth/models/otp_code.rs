use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

/// A hashed one-time code. At most one unexpired row exists per phone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct OtpCode {
    pub id: Uuid,
    pub phone: String,
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl OtpCode {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

// =============================================================================
// SQL Queries
// =============================================================================

impl OtpCode {
    /// Delete every code for the phone and insert a fresh one.
    ///
    /// Must run inside the issuing transaction.
    pub async fn replace_for_phone(
        phone: &str,
        code_hash: &str,
        expires_at: DateTime<Utc>,
        created_at: DateTime<Utc>,
        conn: &mut PgConnection,
    ) -> Result<Self> {
        sqlx::query("DELETE FROM otp_codes WHERE phone = $1")
            .bind(phone)
            .execute(&mut *conn)
            .await?;

        let code = sqlx::query_as::<_, OtpCode>(
            r#"
            INSERT INTO otp_codes (id, phone, code_hash, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(phone)
        .bind(code_hash)
        .bind(expires_at)
        .bind(created_at)
        .fetch_one(&mut *conn)
        .await?;

        Ok(code)
    }

    /// Most recent code for the phone that has not expired at `now`
    pub async fn find_active(
        phone: &str,
        now: DateTime<Utc>,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let code = sqlx::query_as::<_, OtpCode>(
            r#"
            SELECT * FROM otp_codes
            WHERE phone = $1 AND expires_at > $2
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(phone)
        .bind(now)
        .fetch_optional(pool)
        .await?;
        Ok(code)
    }

    /// Delete the code and reset the phone's window counter atomically.
    ///
    /// Returns false when the row was already gone (consumed concurrently).
    pub async fn consume(&self, pool: &PgPool) -> Result<bool> {
        let mut tx = pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM otp_codes WHERE id = $1")
            .bind(self.id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        super::OtpRequest::reset_window_count(&self.phone, &mut *tx).await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Remove expired rows. Expiry is enforced at read time, this only reclaims space.
    pub async fn delete_expired(now: DateTime<Utc>, pool: &PgPool) -> Result<u64> {
        let result = sqlx::query("DELETE FROM otp_codes WHERE expires_at <= $1")
            .bind(now)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn find_by_phone(phone: &str, pool: &PgPool) -> Result<Vec<Self>> {
        let codes = sqlx::query_as::<_, OtpCode>(
            "SELECT * FROM otp_codes WHERE phone = $1 ORDER BY created_at DESC",
        )
        .bind(phone)
        .fetch_all(pool)
        .await?;
        Ok(codes)
    }
}
