use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domains::auth::Role;

/// Back-office account with password login
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Admin {
    pub id: Uuid,
    pub username: String,
    pub phone: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub total_visits: i32,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an admin (password already hashed)
#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub username: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: Role,
}

// =============================================================================
// SQL Queries
// =============================================================================

impl Admin {
    pub async fn find_by_username(username: &str, pool: &PgPool) -> Result<Option<Self>> {
        let admin = sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE username = $1")
            .bind(username)
            .fetch_optional(pool)
            .await?;
        Ok(admin)
    }

    /// Bump the visit counter and stamp the login time
    pub async fn record_login(id: Uuid, at: DateTime<Utc>, pool: &PgPool) -> Result<Self> {
        let admin = sqlx::query_as::<_, Admin>(
            r#"
            UPDATE admins
            SET total_visits = total_visits + 1, last_login = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(at)
        .fetch_one(pool)
        .await?;
        Ok(admin)
    }

    pub async fn create(new: NewAdmin, pool: &PgPool) -> Result<Self> {
        let admin = sqlx::query_as::<_, Admin>(
            r#"
            INSERT INTO admins (id, username, phone, password_hash, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(new.username)
        .bind(new.phone)
        .bind(new.password_hash)
        .bind(new.role)
        .fetch_one(pool)
        .await?;
        Ok(admin)
    }
}
