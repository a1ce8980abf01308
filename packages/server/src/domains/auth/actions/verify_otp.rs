//! Verify OTP action

use tracing::info;

use crate::common::{normalize_phone, validate_otp_code};
use crate::domains::auth::models::User;
use crate::domains::auth::{OtpError, Role};
use crate::kernel::ServerDeps;

/// A verified student and their signed session token
#[derive(Debug, Clone)]
pub struct VerifiedSession {
    pub user: User,
    pub token: String,
}

/// Verify the code, find or create the student and sign a session token.
pub async fn verify_otp(
    phone: &str,
    otp: &str,
    deps: &ServerDeps,
) -> Result<VerifiedSession, OtpError> {
    let phone = normalize_phone(phone)?;
    let otp = validate_otp_code(otp)?;

    deps.otp_verifier().verify(&phone, otp).await?;

    let user = deps.accounts.find_or_create_user(&phone).await?;
    let token = deps.jwt_service.create_token(user.id, Role::User, None)?;

    info!(user_id = %user.id, "Student signed in");
    Ok(VerifiedSession { user, token })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::auth::actions::send_otp;
    use crate::kernel::test_dependencies::TestDependencies;

    const PHONE: &str = "+911234567890";

    #[tokio::test]
    async fn test_verify_creates_user_and_token() {
        let test_deps = TestDependencies::new();
        let deps = test_deps.server_deps();
        send_otp(PHONE, None, &deps).await.unwrap();
        let code = test_deps.sms.last_code_for(PHONE).unwrap();

        let session = verify_otp("+91 123 456 7890", &code, &deps).await.unwrap();

        assert_eq!(session.user.phone, PHONE);
        let claims = deps.jwt_service.verify_token(&session.token).unwrap();
        assert_eq!(claims.sub, session.user.id.to_string());
        assert_eq!(claims.role, Role::User);
        assert!(claims.username.is_none());
    }

    #[tokio::test]
    async fn test_returning_student_keeps_account() {
        let test_deps = TestDependencies::new();
        let deps = test_deps.server_deps();

        send_otp(PHONE, None, &deps).await.unwrap();
        let code = test_deps.sms.last_code_for(PHONE).unwrap();
        let first = verify_otp(PHONE, &code, &deps).await.unwrap();

        test_deps.clock.advance(chrono::Duration::seconds(61));
        send_otp(PHONE, None, &deps).await.unwrap();
        let code = test_deps.sms.last_code_for(PHONE).unwrap();
        let second = verify_otp(PHONE, &code, &deps).await.unwrap();

        assert_eq!(first.user.id, second.user.id);
        assert_eq!(test_deps.accounts.users().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_code_is_validation_error() {
        let deps = TestDependencies::new().server_deps();

        let err = verify_otp(PHONE, "12a456", &deps).await.unwrap_err();
        assert!(matches!(err, OtpError::Validation(_)));
        assert_eq!(err.to_string(), "OTP must be a 6-digit code");
    }

    #[tokio::test]
    async fn test_failed_verify_creates_no_user() {
        let test_deps = TestDependencies::new();
        let deps = test_deps.server_deps();

        let err = verify_otp(PHONE, "123456", &deps).await.unwrap_err();

        assert!(matches!(err, OtpError::InvalidOrExpired));
        assert!(test_deps.accounts.users().is_empty());
    }
}
