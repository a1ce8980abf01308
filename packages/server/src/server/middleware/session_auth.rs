use crate::domains::auth::{JwtService, Role};
use crate::server::cookies::read_session_cookie;
use crate::server::ApiError;
use axum::{extract::Request, middleware::Next, response::Response};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Authenticated caller, decoded from the session cookie
#[derive(Clone, Debug)]
pub struct AuthUser {
    /// User id for students, admin id for admins
    pub subject: Uuid,
    pub role: Role,
    pub username: Option<String>,
}

/// Marks a request that carried a session cookie which failed to verify
#[derive(Clone, Copy, Debug)]
pub struct RejectedSession;

/// Session cookie middleware
///
/// Verifies the `session` cookie and adds AuthUser to request extensions.
/// Requests without a valid cookie continue anonymously; guards decide.
pub async fn session_auth_middleware(
    jwt_service: Arc<JwtService>,
    mut request: Request,
    next: Next,
) -> Response {
    let jar = CookieJar::from_headers(request.headers());
    if let Some(token) = read_session_cookie(&jar) {
        match extract_auth_user(&token, &jwt_service) {
            Some(user) => {
                debug!("Authenticated {} ({})", user.subject, user.role.as_str());
                request.extensions_mut().insert(user);
            }
            None => {
                debug!("Session cookie failed verification");
                request.extensions_mut().insert(RejectedSession);
            }
        }
    }

    next.run(request).await
}

fn extract_auth_user(token: &str, jwt_service: &JwtService) -> Option<AuthUser> {
    let claims = jwt_service.verify_token(token).ok()?;

    Some(AuthUser {
        subject: claims.sub.parse().ok()?,
        role: claims.role,
        username: claims.username,
    })
}

/// The authenticated caller, or the 401 that explains why there isn't one
pub fn current_user(request_extensions: &axum::http::Extensions) -> Result<AuthUser, ApiError> {
    if let Some(user) = request_extensions.get::<AuthUser>() {
        return Ok(user.clone());
    }
    if request_extensions.get::<RejectedSession>().is_some() {
        return Err(ApiError::InvalidSession);
    }
    Err(ApiError::Unauthorized)
}

/// Guard for admin-only routes. Runs after `session_auth_middleware`.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = current_user(request.extensions())?;
    if !user.role.is_admin() {
        return Err(ApiError::Forbidden);
    }
    Ok(next.run(request).await)
}
