use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A student account, identified by a verified phone number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// SQL Queries
// =============================================================================

impl User {
    /// Find the user for a phone or create it (single statement, safe under concurrency)
    pub async fn find_or_create(phone: &str, pool: &PgPool) -> Result<Self> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, phone)
            VALUES ($1, $2)
            ON CONFLICT (phone) DO UPDATE SET phone = EXCLUDED.phone
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(phone)
        .fetch_one(pool)
        .await?;
        Ok(user)
    }
}
