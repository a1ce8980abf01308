//! Student sign-in routes under `/auth`

use axum::{
    extract::{rejection::JsonRejection, Extension, Request},
    response::IntoResponse,
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::SuccessResponse;
use crate::domains::auth::actions::{send_otp, verify_otp};
use crate::domains::auth::Role;
use crate::server::app::AppState;
use crate::server::middleware::{current_user, ClientIp};
use crate::server::ApiError;

#[derive(Debug, Deserialize)]
pub struct SendOtpRequest {
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub otp: String,
}

#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub phone: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyOtpResponse {
    pub success: bool,
    pub user: SessionUser,
}

#[derive(Debug, Serialize)]
pub struct MeUser {
    pub id: Uuid,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub success: bool,
    pub user: MeUser,
}

/// Malformed JSON is a 400 with a generic message
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value).map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected request body");
        ApiError::BadRequest("Invalid request body".to_string())
    })
}

/// POST /auth/send-otp
pub async fn send_otp_handler(
    Extension(state): Extension<AppState>,
    client_ip: Option<Extension<ClientIp>>,
    body: Result<Json<SendOtpRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let body = json_body(body)?;
    let ip = client_ip.map(|Extension(ClientIp(ip))| ip.to_string());

    send_otp(&body.phone, ip.as_deref(), &state.deps).await?;

    Ok(Json(SuccessResponse::ok()))
}

/// POST /auth/verify-otp
pub async fn verify_otp_handler(
    Extension(state): Extension<AppState>,
    jar: CookieJar,
    body: Result<Json<VerifyOtpRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let body = json_body(body)?;

    let session = verify_otp(&body.phone, &body.otp, &state.deps).await?;

    Ok((
        state.session_cookie.issue(jar, &session.token),
        Json(VerifyOtpResponse {
            success: true,
            user: SessionUser {
                id: session.user.id,
                phone: session.user.phone,
            },
        }),
    ))
}

/// POST /auth/logout and POST /admin/logout
pub async fn logout_handler(
    Extension(state): Extension<AppState>,
    jar: CookieJar,
) -> impl IntoResponse {
    (
        state.session_cookie.clear(jar),
        Json(SuccessResponse::ok()),
    )
}

/// GET /auth/me
pub async fn me_handler(request: Request) -> Result<Json<MeResponse>, ApiError> {
    let user = current_user(request.extensions())?;

    Ok(Json(MeResponse {
        success: true,
        user: MeUser {
            id: user.subject,
            role: user.role,
        },
    }))
}
