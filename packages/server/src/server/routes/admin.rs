//! Admin routes under `/admin`

use axum::{
    extract::{rejection::JsonRejection, Extension, Query},
    response::IntoResponse,
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::auth::json_body;
use crate::domains::auth::actions::{admin_login, list_activity, ActivityQuery};
use crate::domains::auth::models::ActivityLog;
use crate::domains::auth::Role;
use crate::server::app::AppState;
use crate::server::ApiError;

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AdminSummary {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct AdminLoginResponse {
    pub success: bool,
    pub admin: AdminSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: i64,
    pub pages: i64,
    pub current_page: i64,
}

#[derive(Debug, Serialize)]
pub struct ActivityLogsResponse {
    pub success: bool,
    pub logs: Vec<ActivityLog>,
    pub pagination: Pagination,
}

/// POST /admin/login
pub async fn admin_login_handler(
    Extension(state): Extension<AppState>,
    jar: CookieJar,
    body: Result<Json<AdminLoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let body = json_body(body)?;

    let session = admin_login(&body.username, &body.password, &state.deps).await?;

    Ok((
        state.session_cookie.issue(jar, &session.token),
        Json(AdminLoginResponse {
            success: true,
            admin: AdminSummary {
                id: session.admin.id,
                username: session.admin.username,
                role: session.admin.role,
            },
        }),
    ))
}

/// GET /admin/logs (behind `require_admin`)
pub async fn list_logs_handler(
    Extension(state): Extension<AppState>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<ActivityLogsResponse>, ApiError> {
    let page = list_activity(query, &state.deps).await?;

    Ok(Json(ActivityLogsResponse {
        success: true,
        logs: page.logs,
        pagination: Pagination {
            total: page.total,
            pages: page.pages,
            current_page: page.current_page,
        },
    }))
}
