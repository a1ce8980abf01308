//! Admin login action

use anyhow::Context;
use tracing::{info, warn};

use crate::common::ValidationError;
use crate::domains::auth::models::{ActivityAction, ActivityCategory, Admin, NewActivityLog};
use crate::domains::auth::password::verify_password;
use crate::domains::auth::AuthError;
use crate::kernel::ServerDeps;

/// A logged-in admin and their signed session token
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub admin: Admin,
    pub token: String,
}

/// Check credentials, record the visit and sign a session token.
///
/// Unknown usernames and wrong passwords fail identically.
pub async fn admin_login(
    username: &str,
    password: &str,
    deps: &ServerDeps,
) -> Result<AdminSession, AuthError> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(ValidationError::new("Username and password are required").into());
    }

    let Some(admin) = deps.accounts.find_admin_by_username(username).await? else {
        warn!(username = %username, "Admin login failed: unknown username");
        return Err(AuthError::InvalidCredentials);
    };

    // argon2 verification blocks, run it off the async workers
    let password = password.to_string();
    let password_hash = admin.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
        .await
        .context("Password verification task failed")??;

    if !valid {
        warn!(username = %username, "Admin login failed: wrong password");
        return Err(AuthError::InvalidCredentials);
    }

    let now = deps.clock.now();
    let admin = deps.accounts.record_admin_login(admin.id, now).await?;

    let entry = NewActivityLog {
        action: ActivityAction::Login,
        category: ActivityCategory::System,
        target_id: Some(admin.id.to_string()),
        target_title: Some(format!("{} logged in", admin.username)),
        admin_id: admin.id,
        admin_name: admin.username.clone(),
        created_at: now,
    };
    if let Err(e) = deps.accounts.log_activity(entry).await {
        warn!(admin_id = %admin.id, error = %e, "Failed to write login activity log");
    }

    let token = deps
        .jwt_service
        .create_token(admin.id, admin.role, Some(admin.username.clone()))?;

    info!(admin_id = %admin.id, role = admin.role.as_str(), "Admin logged in");
    Ok(AdminSession { admin, token })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Clock;
    use crate::domains::auth::Role;
    use crate::kernel::test_dependencies::{InMemoryAccountStore, TestDependencies};

    fn deps_with_admin() -> TestDependencies {
        TestDependencies::new().with_accounts(
            InMemoryAccountStore::new().with_admin("director", "s3cret-pass", Role::SuperAdmin),
        )
    }

    #[tokio::test]
    async fn test_login_records_visit_and_signs_token() {
        let test_deps = deps_with_admin();
        let deps = test_deps.server_deps();
        let now = test_deps.clock.now();

        let session = admin_login("director", "s3cret-pass", &deps).await.unwrap();

        assert_eq!(session.admin.total_visits, 1);
        assert_eq!(session.admin.last_login, Some(now));

        let claims = deps.jwt_service.verify_token(&session.token).unwrap();
        assert_eq!(claims.sub, session.admin.id.to_string());
        assert_eq!(claims.role, Role::SuperAdmin);
        assert_eq!(claims.username.as_deref(), Some("director"));

        let logs = test_deps.accounts.logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].action, "LOGIN");
        assert_eq!(logs[0].category, "SYSTEM");
        assert_eq!(logs[0].admin_name, "director");
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let test_deps = deps_with_admin();
        let deps = test_deps.server_deps();

        let err = admin_login("director", "nope", &deps).await.unwrap_err();

        assert!(matches!(err, AuthError::InvalidCredentials));
        assert_eq!(test_deps.accounts.admin("director").unwrap().total_visits, 0);
        assert!(test_deps.accounts.logs().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_username_looks_like_wrong_password() {
        let deps = deps_with_admin().server_deps();

        let err = admin_login("nobody", "s3cret-pass", &deps).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid credentials");
    }

    #[tokio::test]
    async fn test_missing_fields() {
        let deps = deps_with_admin().server_deps();

        let err = admin_login("  ", "", &deps).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn test_activity_log_failure_does_not_block_login() {
        let test_deps = deps_with_admin();
        test_deps.accounts.fail_log_writes(true);
        let deps = test_deps.server_deps();

        let session = admin_login("director", "s3cret-pass", &deps).await.unwrap();
        assert_eq!(session.admin.total_visits, 1);
    }
}
