use anyhow::Result;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// What an admin did
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityAction {
    Create,
    Update,
    Delete,
    Login,
    Visit,
}

impl std::fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivityAction::Create => write!(f, "CREATE"),
            ActivityAction::Update => write!(f, "UPDATE"),
            ActivityAction::Delete => write!(f, "DELETE"),
            ActivityAction::Login => write!(f, "LOGIN"),
            ActivityAction::Visit => write!(f, "VISIT"),
        }
    }
}

impl std::str::FromStr for ActivityAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "CREATE" => Ok(ActivityAction::Create),
            "UPDATE" => Ok(ActivityAction::Update),
            "DELETE" => Ok(ActivityAction::Delete),
            "LOGIN" => Ok(ActivityAction::Login),
            "VISIT" => Ok(ActivityAction::Visit),
            _ => Err(anyhow::anyhow!("Invalid activity action: {}", s)),
        }
    }
}

/// Which area of the portal an activity touched
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityCategory {
    Asset,
    Video,
    Course,
    Batch,
    Faculty,
    Notification,
    System,
}

impl std::fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivityCategory::Asset => write!(f, "ASSET"),
            ActivityCategory::Video => write!(f, "VIDEO"),
            ActivityCategory::Course => write!(f, "COURSE"),
            ActivityCategory::Batch => write!(f, "BATCH"),
            ActivityCategory::Faculty => write!(f, "FACULTY"),
            ActivityCategory::Notification => write!(f, "NOTIFICATION"),
            ActivityCategory::System => write!(f, "SYSTEM"),
        }
    }
}

impl std::str::FromStr for ActivityCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ASSET" => Ok(ActivityCategory::Asset),
            "VIDEO" => Ok(ActivityCategory::Video),
            "COURSE" => Ok(ActivityCategory::Course),
            "BATCH" => Ok(ActivityCategory::Batch),
            "FACULTY" => Ok(ActivityCategory::Faculty),
            "NOTIFICATION" => Ok(ActivityCategory::Notification),
            "SYSTEM" => Ok(ActivityCategory::System),
            _ => Err(anyhow::anyhow!("Invalid activity category: {}", s)),
        }
    }
}

/// Audit trail entry for admin actions
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: Uuid,
    pub action: String,
    pub category: String,
    pub target_id: Option<String>,
    pub target_title: Option<String>,
    pub admin_id: Uuid,
    pub admin_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewActivityLog {
    pub action: ActivityAction,
    pub category: ActivityCategory,
    pub target_id: Option<String>,
    pub target_title: Option<String>,
    pub admin_id: Uuid,
    pub admin_name: String,
    pub created_at: DateTime<Utc>,
}

impl NewActivityLog {
    pub fn into_log(self) -> ActivityLog {
        ActivityLog {
            id: Uuid::now_v7(),
            action: self.action.to_string(),
            category: self.category.to_string(),
            target_id: self.target_id,
            target_title: self.target_title,
            admin_id: self.admin_id,
            admin_name: self.admin_name,
            created_at: self.created_at,
        }
    }
}

/// Listing filter; `None` means "don't filter on this field"
#[derive(Debug, Clone)]
pub struct ActivityLogFilter {
    pub action: Option<ActivityAction>,
    pub category: Option<ActivityCategory>,
    pub admin_name: Option<String>,
    /// Whole UTC day
    pub date: Option<NaiveDate>,
    /// Case-insensitive match on admin name or target title
    pub search: Option<String>,
    pub page: i64,
    pub limit: i64,
}

impl Default for ActivityLogFilter {
    fn default() -> Self {
        Self {
            action: None,
            category: None,
            admin_name: None,
            date: None,
            search: None,
            page: 1,
            limit: 10,
        }
    }
}

impl ActivityLogFilter {
    /// Rows to skip; saturates so an absurd page number yields an empty page
    pub fn offset(&self) -> i64 {
        (self.page - 1).max(0).saturating_mul(self.limit)
    }

    /// `[start of day, start of next day)` for the date filter
    pub fn day_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = self.date?.and_hms_opt(0, 0, 0)?.and_utc();
        Some((start, start + Duration::days(1)))
    }

    /// In-process equivalent of the SQL WHERE clause
    pub fn matches(&self, log: &ActivityLog) -> bool {
        if let Some(action) = self.action {
            if log.action != action.to_string() {
                return false;
            }
        }
        if let Some(category) = self.category {
            if log.category != category.to_string() {
                return false;
            }
        }
        if let Some(admin_name) = &self.admin_name {
            if &log.admin_name != admin_name {
                return false;
            }
        }
        if let Some((start, end)) = self.day_range() {
            if log.created_at < start || log.created_at >= end {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let in_name = log.admin_name.to_lowercase().contains(&needle);
            let in_title = log
                .target_title
                .as_deref()
                .is_some_and(|t| t.to_lowercase().contains(&needle));
            if !in_name && !in_title {
                return false;
            }
        }
        true
    }

    fn search_pattern(&self) -> Option<String> {
        self.search.as_ref().map(|s| {
            let escaped = s
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            format!("%{}%", escaped)
        })
    }
}

// =============================================================================
// SQL Queries
// =============================================================================

const FILTER_CLAUSE: &str = r#"
    WHERE ($1::text IS NULL OR action = $1)
      AND ($2::text IS NULL OR category = $2)
      AND ($3::text IS NULL OR admin_name = $3)
      AND ($4::timestamptz IS NULL OR (created_at >= $4 AND created_at < $5))
      AND ($6::text IS NULL OR admin_name ILIKE $6 OR target_title ILIKE $6)
"#;

impl ActivityLog {
    pub async fn create(new: NewActivityLog, pool: &PgPool) -> Result<Self> {
        let log = new.into_log();
        let log = sqlx::query_as::<_, ActivityLog>(
            r#"
            INSERT INTO activity_logs
                (id, action, category, target_id, target_title, admin_id, admin_name, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(log.id)
        .bind(&log.action)
        .bind(&log.category)
        .bind(&log.target_id)
        .bind(&log.target_title)
        .bind(log.admin_id)
        .bind(&log.admin_name)
        .bind(log.created_at)
        .fetch_one(pool)
        .await?;
        Ok(log)
    }

    /// Page of logs matching the filter, newest first, plus the total match count
    pub async fn list(filter: &ActivityLogFilter, pool: &PgPool) -> Result<(Vec<Self>, i64)> {
        let action = filter.action.map(|a| a.to_string());
        let category = filter.category.map(|c| c.to_string());
        let range = filter.day_range();
        let search = filter.search_pattern();

        let logs = sqlx::query_as::<_, ActivityLog>(&format!(
            "SELECT * FROM activity_logs {} ORDER BY created_at DESC LIMIT $7 OFFSET $8",
            FILTER_CLAUSE
        ))
        .bind(&action)
        .bind(&category)
        .bind(&filter.admin_name)
        .bind(range.map(|(start, _)| start))
        .bind(range.map(|(_, end)| end))
        .bind(&search)
        .bind(filter.limit)
        .bind(filter.offset())
        .fetch_all(pool)
        .await?;

        // Count query binds the same leading parameters; $7/$8 are unused there
        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM activity_logs {}",
            FILTER_CLAUSE
        ))
        .bind(&action)
        .bind(&category)
        .bind(&filter.admin_name)
        .bind(range.map(|(start, _)| start))
        .bind(range.map(|(_, end)| end))
        .bind(&search)
        .fetch_one(pool)
        .await?;

        Ok((logs, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn log(action: &str, category: &str, admin: &str, title: Option<&str>, at: DateTime<Utc>) -> ActivityLog {
        ActivityLog {
            id: Uuid::new_v4(),
            action: action.to_string(),
            category: category.to_string(),
            target_id: None,
            target_title: title.map(str::to_string),
            admin_id: Uuid::new_v4(),
            admin_name: admin.to_string(),
            created_at: at,
        }
    }

    #[test]
    fn test_enum_string_roundtrip() {
        for action in ["CREATE", "UPDATE", "DELETE", "LOGIN", "VISIT"] {
            let parsed: ActivityAction = action.parse().unwrap();
            assert_eq!(parsed.to_string(), action);
        }
        assert!("ALL".parse::<ActivityCategory>().is_err());
        assert_eq!(
            "NOTIFICATION".parse::<ActivityCategory>().unwrap(),
            ActivityCategory::Notification
        );
    }

    #[test]
    fn test_offset() {
        let filter = ActivityLogFilter {
            page: 3,
            limit: 20,
            ..Default::default()
        };
        assert_eq!(filter.offset(), 40);

        let filter = ActivityLogFilter {
            page: 0,
            ..Default::default()
        };
        assert_eq!(filter.offset(), 0);

        let filter = ActivityLogFilter {
            page: i64::MAX,
            limit: 100,
            ..Default::default()
        };
        assert_eq!(filter.offset(), i64::MAX);
    }

    #[test]
    fn test_matches_by_day() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let filter = ActivityLogFilter {
            date: Some(day),
            ..Default::default()
        };

        let inside = log("LOGIN", "SYSTEM", "admin1", None, Utc.with_ymd_and_hms(2026, 3, 14, 23, 59, 59).unwrap());
        let next_day = log("LOGIN", "SYSTEM", "admin1", None, Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap());
        assert!(filter.matches(&inside));
        assert!(!filter.matches(&next_day));
    }

    #[test]
    fn test_matches_search_on_name_or_title() {
        let at = Utc::now();
        let filter = ActivityLogFilter {
            search: Some("physics".to_string()),
            ..Default::default()
        };

        assert!(filter.matches(&log("CREATE", "COURSE", "admin1", Some("JEE Physics Batch"), at)));
        assert!(!filter.matches(&log("CREATE", "COURSE", "admin1", Some("Chemistry"), at)));
        assert!(!filter.matches(&log("LOGIN", "SYSTEM", "admin1", None, at)));

        let by_name = ActivityLogFilter {
            search: Some("ADMIN2".to_string()),
            ..Default::default()
        };
        assert!(by_name.matches(&log("LOGIN", "SYSTEM", "admin2", None, at)));
    }

    #[test]
    fn test_matches_action_and_category() {
        let at = Utc::now();
        let filter = ActivityLogFilter {
            action: Some(ActivityAction::Delete),
            category: Some(ActivityCategory::Faculty),
            ..Default::default()
        };

        assert!(filter.matches(&log("DELETE", "FACULTY", "admin1", None, at)));
        assert!(!filter.matches(&log("DELETE", "COURSE", "admin1", None, at)));
        assert!(!filter.matches(&log("CREATE", "FACULTY", "admin1", None, at)));
    }

    #[test]
    fn test_search_pattern_escapes_wildcards() {
        let filter = ActivityLogFilter {
            search: Some("50%_off".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.search_pattern().unwrap(), "%50\\%\\_off%");
    }
}
