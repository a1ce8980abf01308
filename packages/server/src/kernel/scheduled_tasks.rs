//! Scheduled background tasks using tokio-cron-scheduler.
//!
//! - Expired OTP code sweep, every 15 minutes
//!
//! Expiry is enforced when codes are read, so the sweep only reclaims rows.
//! A missed or failed run changes nothing observable.

use anyhow::Result;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};

use super::ServerDeps;

/// Every 15 minutes, on the minute
pub const EXPIRED_CODE_SWEEP_SCHEDULE: &str = "0 */15 * * * *";

/// Start all scheduled tasks. Keep the returned scheduler alive.
pub async fn start_scheduler(deps: Arc<ServerDeps>) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let sweep_deps = deps.clone();
    let sweep_job = Job::new_async(EXPIRED_CODE_SWEEP_SCHEDULE, move |_uuid, _lock| {
        let deps = sweep_deps.clone();
        Box::pin(async move {
            if let Err(e) = purge_expired_codes(&deps).await {
                tracing::error!("Expired OTP sweep failed: {}", e);
            }
        })
    })?;

    scheduler.add(sweep_job).await?;
    scheduler.start().await?;

    tracing::info!("Scheduled tasks started (expired OTP sweep every 15 minutes)");
    Ok(scheduler)
}

/// Delete every OTP code that has expired; returns how many were removed
pub async fn purge_expired_codes(deps: &ServerDeps) -> Result<u64> {
    let now = deps.clock.now();
    let removed = deps.otp_store.purge_expired_codes(now).await?;

    if removed > 0 {
        tracing::info!(removed, "Purged expired OTP codes");
    } else {
        tracing::debug!("No expired OTP codes to purge");
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::test_dependencies::TestDependencies;
    use chrono::Duration;

    #[tokio::test]
    async fn test_purge_removes_only_expired_codes() {
        let test_deps = TestDependencies::new();
        let deps = test_deps.server_deps();
        let issuer = deps.otp_issuer();

        issuer.issue("+911234567890", None).await.unwrap();
        test_deps.clock.advance(Duration::minutes(3));
        issuer.issue("+911234567891", None).await.unwrap();

        // First code is past its 5 minute TTL, second is not
        test_deps.clock.advance(Duration::minutes(3));
        let removed = purge_expired_codes(&deps).await.unwrap();

        assert_eq!(removed, 1);
        assert!(test_deps.otp_store.codes_for("+911234567890").await.is_empty());
        assert_eq!(test_deps.otp_store.codes_for("+911234567891").await.len(), 1);
    }

    #[tokio::test]
    async fn test_purge_with_nothing_expired() {
        let test_deps = TestDependencies::new();
        let deps = test_deps.server_deps();

        assert_eq!(purge_expired_codes(&deps).await.unwrap(), 0);
    }
}
