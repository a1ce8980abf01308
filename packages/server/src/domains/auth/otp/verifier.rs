use std::sync::Arc;

use tracing::{info, warn};

use super::OtpHasher;
use crate::common::{mask_phone, Clock};
use crate::domains::auth::OtpError;
use crate::kernel::BaseOtpStore;

/// Checks submitted codes and consumes them on success
#[derive(Clone)]
pub struct OtpVerifier {
    store: Arc<dyn BaseOtpStore>,
    hasher: OtpHasher,
    clock: Arc<dyn Clock>,
}

impl OtpVerifier {
    pub fn new(store: Arc<dyn BaseOtpStore>, hasher: OtpHasher, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            hasher,
            clock,
        }
    }

    /// Verify `code` for an already-normalized phone.
    ///
    /// Missing, expired, wrong and already-used codes all fail the same way.
    /// A wrong code leaves the stored code usable until it expires.
    pub async fn verify(&self, phone: &str, code: &str) -> Result<(), OtpError> {
        let now = self.clock.now();

        let Some(active) = self.store.find_active_code(phone, now).await? else {
            warn!(phone = %mask_phone(phone), "OTP verification failed: no active code");
            return Err(OtpError::InvalidOrExpired);
        };

        if !self.hasher.matches(phone, code, &active.code_hash) {
            warn!(phone = %mask_phone(phone), "OTP verification failed: code mismatch");
            return Err(OtpError::InvalidOrExpired);
        }

        if !self.store.consume_code(&active).await? {
            warn!(phone = %mask_phone(phone), "OTP verification failed: code already used");
            return Err(OtpError::InvalidOrExpired);
        }

        info!(phone = %mask_phone(phone), "OTP verified");
        Ok(())
    }
}
