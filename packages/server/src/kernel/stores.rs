//! Postgres-backed implementations of the storage traits.
//!
//! Thin adapters: the SQL lives on the models, these only carry the pool.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{BaseAccountStore, BaseOtpStore};
use crate::domains::auth::models::{
    ActivityLog, ActivityLogFilter, Admin, NewActivityLog, NewAdmin, OtpCode, OtpIssue,
    OtpRequest, User,
};

#[derive(Clone)]
pub struct PgOtpStore {
    pool: PgPool,
}

impl PgOtpStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseOtpStore for PgOtpStore {
    async fn find_request(&self, phone: &str) -> Result<Option<OtpRequest>> {
        OtpRequest::find_by_phone(phone, &self.pool).await
    }

    async fn block_until(&self, phone: &str, until: DateTime<Utc>) -> Result<()> {
        OtpRequest::block_until(phone, until, &self.pool).await
    }

    async fn record_issue(&self, issue: &OtpIssue) -> Result<bool> {
        issue.record(&self.pool).await
    }

    async fn find_active_code(&self, phone: &str, now: DateTime<Utc>) -> Result<Option<OtpCode>> {
        OtpCode::find_active(phone, now, &self.pool).await
    }

    async fn consume_code(&self, code: &OtpCode) -> Result<bool> {
        code.consume(&self.pool).await
    }

    async fn purge_expired_codes(&self, now: DateTime<Utc>) -> Result<u64> {
        OtpCode::delete_expired(now, &self.pool).await
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseAccountStore for PgAccountStore {
    async fn find_or_create_user(&self, phone: &str) -> Result<User> {
        User::find_or_create(phone, &self.pool).await
    }

    async fn find_admin_by_username(&self, username: &str) -> Result<Option<Admin>> {
        Admin::find_by_username(username, &self.pool).await
    }

    async fn record_admin_login(&self, admin_id: Uuid, at: DateTime<Utc>) -> Result<Admin> {
        Admin::record_login(admin_id, at, &self.pool).await
    }

    async fn create_admin(&self, admin: NewAdmin) -> Result<Admin> {
        Admin::create(admin, &self.pool).await
    }

    async fn log_activity(&self, entry: NewActivityLog) -> Result<ActivityLog> {
        ActivityLog::create(entry, &self.pool).await
    }

    async fn list_activity(&self, filter: &ActivityLogFilter) -> Result<(Vec<ActivityLog>, i64)> {
        ActivityLog::list(filter, &self.pool).await
    }
}
