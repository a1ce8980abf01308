//! The write side of a successful OTP issuance.
//!
//! Recording the request and replacing the phone's code happen as one unit so
//! two concurrent issuances for the same phone cannot both leave a code behind.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{OtpCode, OtpRequest};

/// Everything needed to persist one issuance. Cutoffs are absolute instants
/// derived from the policy so the store never needs to know the durations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpIssue {
    pub phone: String,
    pub code_hash: String,
    pub ip_address: Option<String>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Previous request must be at or before this instant (cooldown guard)
    pub cooldown_cutoff: DateTime<Utc>,
    /// Previous request strictly before this instant starts a new window
    pub window_cutoff: DateTime<Utc>,
    /// Daily period started at or before this instant starts a new period
    pub daily_cutoff: DateTime<Utc>,
}

impl OtpIssue {
    /// Compute the request record after this issuance.
    ///
    /// Returns `None` when the existing record is still inside its cooldown,
    /// meaning a concurrent issuance won. Mirrors the upsert in `record`.
    pub fn apply_to(&self, existing: Option<&OtpRequest>) -> Option<OtpRequest> {
        let Some(current) = existing else {
            return Some(OtpRequest {
                phone: self.phone.clone(),
                request_count: 1,
                daily_count: 1,
                daily_window_started_at: self.issued_at,
                last_requested_at: self.issued_at,
                blocked_until: None,
                ip_address: self.ip_address.clone(),
            });
        };

        if current.last_requested_at > self.cooldown_cutoff {
            return None;
        }

        let window_expired = current.last_requested_at < self.window_cutoff;
        let day_expired = current.daily_window_started_at <= self.daily_cutoff;

        Some(OtpRequest {
            phone: current.phone.clone(),
            request_count: if window_expired {
                1
            } else {
                current.request_count + 1
            },
            daily_count: if day_expired {
                1
            } else {
                current.daily_count + 1
            },
            daily_window_started_at: if day_expired {
                self.issued_at
            } else {
                current.daily_window_started_at
            },
            last_requested_at: self.issued_at,
            blocked_until: current.blocked_until,
            ip_address: self
                .ip_address
                .clone()
                .or_else(|| current.ip_address.clone()),
        })
    }

    /// Upsert the request record and replace the phone's code in one transaction.
    ///
    /// Returns false (and writes nothing) when the cooldown guard rejects the upsert.
    pub async fn record(&self, pool: &PgPool) -> Result<bool> {
        let mut tx = pool.begin().await?;

        // The upsert takes the row lock for this phone; a concurrent issuance
        // waits here and then fails the cooldown guard.
        let recorded = sqlx::query_scalar::<_, String>(
            r#"
            INSERT INTO otp_requests
                (phone, request_count, daily_count, daily_window_started_at, last_requested_at, ip_address)
            VALUES ($1, 1, 1, $2, $2, $3)
            ON CONFLICT (phone) DO UPDATE SET
                request_count = CASE
                    WHEN otp_requests.last_requested_at < $4 THEN 1
                    ELSE otp_requests.request_count + 1
                END,
                daily_count = CASE
                    WHEN otp_requests.daily_window_started_at <= $5 THEN 1
                    ELSE otp_requests.daily_count + 1
                END,
                daily_window_started_at = CASE
                    WHEN otp_requests.daily_window_started_at <= $5 THEN $2
                    ELSE otp_requests.daily_window_started_at
                END,
                last_requested_at = $2,
                ip_address = COALESCE($3, otp_requests.ip_address)
            WHERE otp_requests.last_requested_at <= $6
            RETURNING phone
            "#,
        )
        .bind(&self.phone)
        .bind(self.issued_at)
        .bind(&self.ip_address)
        .bind(self.window_cutoff)
        .bind(self.daily_cutoff)
        .bind(self.cooldown_cutoff)
        .fetch_optional(&mut *tx)
        .await?;

        if recorded.is_none() {
            tx.rollback().await?;
            return Ok(false);
        }

        OtpCode::replace_for_phone(
            &self.phone,
            &self.code_hash,
            self.expires_at,
            self.issued_at,
            &mut *tx,
        )
        .await?;

        tx.commit().await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 10, 9, 0, 0).unwrap()
    }

    fn issue_at(now: DateTime<Utc>, ip: Option<&str>) -> OtpIssue {
        OtpIssue {
            phone: "+911234567890".to_string(),
            code_hash: "hash".to_string(),
            ip_address: ip.map(str::to_string),
            issued_at: now,
            expires_at: now + Duration::minutes(5),
            cooldown_cutoff: now - Duration::seconds(60),
            window_cutoff: now - Duration::minutes(10),
            daily_cutoff: now - Duration::hours(24),
        }
    }

    fn record(request_count: i32, daily_count: i32, last: DateTime<Utc>) -> OtpRequest {
        OtpRequest {
            phone: "+911234567890".to_string(),
            request_count,
            daily_count,
            daily_window_started_at: t0(),
            last_requested_at: last,
            blocked_until: None,
            ip_address: Some("10.0.0.1".to_string()),
        }
    }

    #[test]
    fn test_first_request_creates_record() {
        let created = issue_at(t0(), Some("10.0.0.9")).apply_to(None).unwrap();
        assert_eq!(created.request_count, 1);
        assert_eq!(created.daily_count, 1);
        assert_eq!(created.daily_window_started_at, t0());
        assert_eq!(created.last_requested_at, t0());
        assert_eq!(created.ip_address.as_deref(), Some("10.0.0.9"));
    }

    #[test]
    fn test_increments_inside_window() {
        let now = t0() + Duration::minutes(2);
        let updated = issue_at(now, None)
            .apply_to(Some(&record(1, 1, t0())))
            .unwrap();
        assert_eq!(updated.request_count, 2);
        assert_eq!(updated.daily_count, 2);
        assert_eq!(updated.last_requested_at, now);
        assert_eq!(updated.ip_address.as_deref(), Some("10.0.0.1"), "keeps old ip");
    }

    #[test]
    fn test_window_reset_is_persisted() {
        let now = t0() + Duration::minutes(11);
        let updated = issue_at(now, None)
            .apply_to(Some(&record(3, 3, t0())))
            .unwrap();
        assert_eq!(updated.request_count, 1, "window expired, count restarts");
        assert_eq!(updated.daily_count, 4, "daily count keeps going");
    }

    #[test]
    fn test_daily_period_rolls_over() {
        let now = t0() + Duration::hours(24);
        let updated = issue_at(now, None)
            .apply_to(Some(&record(1, 10, t0() + Duration::hours(1))))
            .unwrap();
        assert_eq!(updated.daily_count, 1);
        assert_eq!(updated.daily_window_started_at, now);
    }

    #[test]
    fn test_cooldown_guard_rejects() {
        let now = t0() + Duration::seconds(30);
        assert!(issue_at(now, None).apply_to(Some(&record(1, 1, t0()))).is_none());

        let exactly_cooldown = t0() + Duration::seconds(60);
        assert!(issue_at(exactly_cooldown, None)
            .apply_to(Some(&record(1, 1, t0())))
            .is_some());
    }
}
