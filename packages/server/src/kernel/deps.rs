//! Server dependencies for actions (using traits for testability)
//!
//! This module provides the central dependency container used by the auth
//! actions and HTTP handlers. Storage, SMS and time go through trait objects
//! so tests can swap in the in-memory versions from `test_dependencies`.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use twilio::{TwilioOptions, TwilioService};

use crate::common::{mask_phone, Clock, SystemClock};
use crate::config::{AppEnv, Config};
use crate::domains::auth::otp::{OtpHasher, OtpIssuer, OtpPolicy, OtpVerifier, RateLimiter};
use crate::domains::auth::JwtService;
use crate::kernel::{BaseAccountStore, BaseOtpStore, BaseSmsGateway, PgAccountStore, PgOtpStore};

// =============================================================================
// TwilioService Adapter (implements BaseSmsGateway trait)
// =============================================================================

/// Wrapper around TwilioService that implements BaseSmsGateway trait
pub struct TwilioAdapter(pub Arc<TwilioService>);

impl TwilioAdapter {
    pub fn new(service: Arc<TwilioService>) -> Self {
        Self(service)
    }
}

#[async_trait]
impl BaseSmsGateway for TwilioAdapter {
    async fn send_sms(&self, phone: &str, body: &str) -> Result<()> {
        self.0
            .send_sms(phone, body)
            .await
            .map(|_| ())
            .map_err(|e| anyhow::anyhow!("{}", e))
    }
}

// =============================================================================
// Log-only gateway (no Twilio credentials)
// =============================================================================

/// Stand-in used when Twilio is not configured. Nothing is delivered.
///
/// The message body (and so the code) is only logged in debug builds running
/// with `APP_ENV=development`.
pub struct LogOnlySmsGateway {
    log_codes: bool,
}

impl LogOnlySmsGateway {
    pub fn new(app_env: AppEnv) -> Self {
        Self {
            log_codes: cfg!(debug_assertions) && !app_env.is_production(),
        }
    }
}

#[async_trait]
impl BaseSmsGateway for LogOnlySmsGateway {
    async fn send_sms(&self, phone: &str, body: &str) -> Result<()> {
        if self.log_codes {
            tracing::debug!(phone = %phone, body = %body, "SMS (not sent, development)");
        } else {
            tracing::warn!(phone = %mask_phone(phone), "SMS gateway not configured, message dropped");
        }
        Ok(())
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Server dependencies accessible to actions (using traits for testability)
#[derive(Clone)]
pub struct ServerDeps {
    pub otp_store: Arc<dyn BaseOtpStore>,
    pub accounts: Arc<dyn BaseAccountStore>,
    pub sms: Arc<dyn BaseSmsGateway>,
    pub clock: Arc<dyn Clock>,
    pub otp_hasher: OtpHasher,
    pub otp_policy: OtpPolicy,
    /// JWT service for session tokens
    pub jwt_service: Arc<JwtService>,
}

impl ServerDeps {
    /// Create new ServerDeps with the given dependencies
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        otp_store: Arc<dyn BaseOtpStore>,
        accounts: Arc<dyn BaseAccountStore>,
        sms: Arc<dyn BaseSmsGateway>,
        clock: Arc<dyn Clock>,
        otp_hasher: OtpHasher,
        otp_policy: OtpPolicy,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        Self {
            otp_store,
            accounts,
            sms,
            clock,
            otp_hasher,
            otp_policy,
            jwt_service,
        }
    }

    /// Production wiring: Postgres stores, Twilio when configured, wall clock
    pub fn from_config(config: &Config, pool: PgPool) -> Self {
        let sms: Arc<dyn BaseSmsGateway> = match &config.twilio {
            Some(twilio) => {
                tracing::info!("SMS delivery via Twilio");
                Arc::new(TwilioAdapter::new(Arc::new(TwilioService::new(
                    TwilioOptions {
                        account_sid: twilio.account_sid.clone(),
                        auth_token: twilio.auth_token.clone(),
                        from_number: twilio.from_number.clone(),
                    },
                ))))
            }
            None => {
                tracing::warn!("Twilio not configured, OTP messages will not be delivered");
                Arc::new(LogOnlySmsGateway::new(config.app_env))
            }
        };

        Self::new(
            Arc::new(PgOtpStore::new(pool.clone())),
            Arc::new(PgAccountStore::new(pool)),
            sms,
            Arc::new(SystemClock),
            OtpHasher::new(&config.otp_hash_secret),
            OtpPolicy::default(),
            Arc::new(JwtService::new(
                &config.jwt_secret,
                config.jwt_issuer.clone(),
            )),
        )
    }

    pub fn otp_rate_limiter(&self) -> RateLimiter {
        RateLimiter::new(
            self.otp_store.clone(),
            self.clock.clone(),
            self.otp_policy.clone(),
        )
    }

    pub fn otp_issuer(&self) -> OtpIssuer {
        OtpIssuer::new(
            self.otp_rate_limiter(),
            self.otp_store.clone(),
            self.sms.clone(),
            self.otp_hasher.clone(),
            self.clock.clone(),
            self.otp_policy.clone(),
        )
    }

    pub fn otp_verifier(&self) -> OtpVerifier {
        OtpVerifier::new(
            self.otp_store.clone(),
            self.otp_hasher.clone(),
            self.clock.clone(),
        )
    }
}
