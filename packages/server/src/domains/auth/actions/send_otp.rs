//! Send OTP action

use crate::common::normalize_phone;
use crate::domains::auth::otp::IssuedOtp;
use crate::domains::auth::OtpError;
use crate::kernel::ServerDeps;

/// Normalize the phone and issue a code to it.
///
/// `ip` is the caller's address, stored for auditing only.
pub async fn send_otp(
    phone: &str,
    ip: Option<&str>,
    deps: &ServerDeps,
) -> Result<IssuedOtp, OtpError> {
    let phone = normalize_phone(phone)?;
    deps.otp_issuer().issue(&phone, ip).await
}
