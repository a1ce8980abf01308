use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info};

use super::{generate_code, OtpHasher, OtpPolicy, RateLimiter};
use crate::common::{mask_phone, Clock};
use crate::domains::auth::{OtpError, RateLimitReason};
use crate::kernel::{BaseOtpStore, BaseSmsGateway};

/// Result of a successful issuance. Never carries the code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedOtp {
    pub phone: String,
    pub expires_at: DateTime<Utc>,
}

/// Rate-checks, generates, stores and delivers one-time codes
#[derive(Clone)]
pub struct OtpIssuer {
    limiter: RateLimiter,
    store: Arc<dyn BaseOtpStore>,
    sms: Arc<dyn BaseSmsGateway>,
    hasher: OtpHasher,
    clock: Arc<dyn Clock>,
    policy: OtpPolicy,
}

impl OtpIssuer {
    pub fn new(
        limiter: RateLimiter,
        store: Arc<dyn BaseOtpStore>,
        sms: Arc<dyn BaseSmsGateway>,
        hasher: OtpHasher,
        clock: Arc<dyn Clock>,
        policy: OtpPolicy,
    ) -> Self {
        Self {
            limiter,
            store,
            sms,
            hasher,
            clock,
            policy,
        }
    }

    /// Issue a fresh code to an already-normalized phone number.
    ///
    /// Delivery failures are logged and do not undo the issuance: the request
    /// still counts against the limits and the code stays verifiable.
    pub async fn issue(&self, phone: &str, ip: Option<&str>) -> Result<IssuedOtp, OtpError> {
        let now = self.clock.now();
        self.limiter.check_limit_at(phone, ip, now).await?;

        let code = generate_code(self.policy.code_length);
        let issue = self.policy.issue_for(
            phone,
            self.hasher.hash(phone, &code),
            ip,
            now,
        );

        // Lost the race to a concurrent request for the same phone
        if !self.store.record_issue(&issue).await? {
            info!(phone = %mask_phone(phone), "Concurrent OTP request rejected by cooldown guard");
            return Err(OtpError::RateLimited(RateLimitReason::Cooldown));
        }

        info!(
            phone = %mask_phone(phone),
            ip = ip.unwrap_or("unknown"),
            expires_at = %issue.expires_at,
            "OTP issued"
        );

        let body = sms_body(&code, &self.policy);
        if let Err(e) = self.sms.send_sms(phone, &body).await {
            error!(phone = %mask_phone(phone), error = %e, "Failed to deliver OTP");
        }

        Ok(IssuedOtp {
            phone: phone.to_string(),
            expires_at: issue.expires_at,
        })
    }
}

fn sms_body(code: &str, policy: &OtpPolicy) -> String {
    format!(
        "{} is your verification code. It expires in {} minutes.",
        code,
        policy.code_ttl.num_minutes()
    )
}
