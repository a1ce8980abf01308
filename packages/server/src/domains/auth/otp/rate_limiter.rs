use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::OtpPolicy;
use crate::common::{mask_phone, Clock};
use crate::domains::auth::{OtpError, RateLimitReason};
use crate::kernel::BaseOtpStore;

/// Gates OTP issuance per phone number.
///
/// Checks run in priority order: block, cooldown, window, daily cap. Only the
/// daily-cap rejection writes (it sets the block); the success path leaves
/// recording to the issuer.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn BaseOtpStore>,
    clock: Arc<dyn Clock>,
    policy: OtpPolicy,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn BaseOtpStore>, clock: Arc<dyn Clock>, policy: OtpPolicy) -> Self {
        Self {
            store,
            clock,
            policy,
        }
    }

    pub async fn check_limit(&self, phone: &str, ip: Option<&str>) -> Result<(), OtpError> {
        self.check_limit_at(phone, ip, self.clock.now()).await
    }

    pub(crate) async fn check_limit_at(
        &self,
        phone: &str,
        ip: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), OtpError> {
        let Some(record) = self.store.find_request(phone).await? else {
            debug!(phone = %mask_phone(phone), "First OTP request for phone");
            return Ok(());
        };

        let reason = if self.policy.is_blocked(&record, now) {
            Some(RateLimitReason::Blocked)
        } else if self.policy.in_cooldown(&record, now) {
            Some(RateLimitReason::Cooldown)
        } else if self.policy.requests_in_window(&record, now) >= self.policy.max_per_window {
            Some(RateLimitReason::Window)
        } else if self.policy.requests_today(&record, now) >= self.policy.max_per_day {
            let until = now + self.policy.block_duration;
            self.store.block_until(phone, until).await?;
            Some(RateLimitReason::Daily)
        } else {
            None
        };

        match reason {
            Some(reason) => {
                warn!(
                    phone = %mask_phone(phone),
                    ip = ip.unwrap_or("unknown"),
                    reason = reason.as_str(),
                    "OTP request rate limited"
                );
                Err(OtpError::RateLimited(reason))
            }
            None => Ok(()),
        }
    }
}
