//! Activity log listing action

use chrono::NaiveDate;
use serde::Deserialize;

use crate::common::ValidationError;
use crate::domains::auth::models::{ActivityAction, ActivityLog, ActivityLogFilter};
use crate::domains::auth::AuthError;
use crate::kernel::ServerDeps;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Raw query string for `GET /admin/logs`. Every field is optional text.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub action: Option<String>,
    pub category: Option<String>,
    /// Filters on the admin's name
    pub admin_id: Option<String>,
    pub date: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ActivityPage {
    pub logs: Vec<ActivityLog>,
    pub total: i64,
    pub pages: i64,
    pub current_page: i64,
}

impl ActivityQuery {
    /// Turn the raw query into a filter. `ALL` and blank values mean "any".
    pub fn into_filter(self) -> Result<ActivityLogFilter, ValidationError> {
        let action = match present(self.action) {
            Some(raw) => Some(
                raw.parse::<ActivityAction>()
                    .map_err(|_| ValidationError::new("Invalid action filter"))?,
            ),
            None => None,
        };

        // Unknown categories are ignored rather than rejected
        let category = present(self.category).and_then(|raw| raw.parse().ok());

        let date = match present(self.date) {
            Some(raw) => Some(
                NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                    .map_err(|_| ValidationError::new("Invalid date, expected YYYY-MM-DD"))?,
            ),
            None => None,
        };

        let search = self
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(ActivityLogFilter {
            action,
            category,
            admin_name: present(self.admin_id),
            date,
            search,
            page: positive(self.page).unwrap_or(1),
            limit: positive(self.limit)
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .min(MAX_PAGE_SIZE),
        })
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("ALL"))
}

fn positive(value: Option<String>) -> Option<i64> {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| *v >= 1)
}

/// One page of the admin activity log, newest first
pub async fn list_activity(
    query: ActivityQuery,
    deps: &ServerDeps,
) -> Result<ActivityPage, AuthError> {
    let filter = query.into_filter()?;
    let (logs, total) = deps.accounts.list_activity(&filter).await?;

    Ok(ActivityPage {
        logs,
        total,
        pages: (total + filter.limit - 1) / filter.limit,
        current_page: filter.page,
    })
}
