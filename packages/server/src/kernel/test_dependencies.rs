// TestDependencies - in-memory implementations for testing
//
// Mirrors the Postgres stores closely enough that the OTP core and the HTTP
// layer can be exercised without a database.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use super::{BaseAccountStore, BaseOtpStore, BaseSmsGateway, ServerDeps};
use crate::common::Clock;
use crate::domains::auth::models::{
    ActivityLog, ActivityLogFilter, Admin, NewActivityLog, NewAdmin, OtpCode, OtpIssue,
    OtpRequest, User,
};
use crate::domains::auth::otp::{OtpHasher, OtpPolicy};
use crate::domains::auth::password::hash_password;
use crate::domains::auth::{JwtService, Role};

pub const TEST_JWT_SECRET: &str = "test_jwt_secret";
pub const TEST_JWT_ISSUER: &str = "test_issuer";
pub const TEST_OTP_SECRET: &str = "test_otp_secret";

// =============================================================================
// Mock Clock
// =============================================================================

/// Manually driven clock, starts at 2026-01-10 09:00:00 UTC
pub struct MockClock {
    now: Mutex<DateTime<Utc>>,
}

impl MockClock {
    pub fn new() -> Self {
        Self::at(Utc.with_ymd_and_hms(2026, 1, 10, 9, 0, 0).unwrap())
    }

    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

// =============================================================================
// In-memory OTP store
// =============================================================================

#[derive(Default)]
struct OtpTables {
    requests: HashMap<String, OtpRequest>,
    codes: Vec<OtpCode>,
}

/// Single mutex over both tables, standing in for the Postgres transaction
#[derive(Default)]
pub struct InMemoryOtpStore {
    tables: Mutex<OtpTables>,
    fail: AtomicBool,
}

impl InMemoryOtpStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with a storage error
    pub fn fail_requests(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub async fn request(&self, phone: &str) -> Option<OtpRequest> {
        self.tables.lock().unwrap().requests.get(phone).cloned()
    }

    pub async fn put_request(&self, record: OtpRequest) {
        self.tables
            .lock()
            .unwrap()
            .requests
            .insert(record.phone.clone(), record);
    }

    /// Every stored code for the phone, expired or not
    pub async fn codes_for(&self, phone: &str) -> Vec<OtpCode> {
        self.tables
            .lock()
            .unwrap()
            .codes
            .iter()
            .filter(|c| c.phone == phone)
            .cloned()
            .collect()
    }

    fn check(&self) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("in-memory store unavailable");
        }
        Ok(())
    }
}

#[async_trait]
impl BaseOtpStore for InMemoryOtpStore {
    async fn find_request(&self, phone: &str) -> Result<Option<OtpRequest>> {
        self.check()?;
        Ok(self.tables.lock().unwrap().requests.get(phone).cloned())
    }

    async fn block_until(&self, phone: &str, until: DateTime<Utc>) -> Result<()> {
        self.check()?;
        if let Some(record) = self.tables.lock().unwrap().requests.get_mut(phone) {
            record.blocked_until = Some(until);
        }
        Ok(())
    }

    async fn record_issue(&self, issue: &OtpIssue) -> Result<bool> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();

        let Some(updated) = issue.apply_to(tables.requests.get(&issue.phone)) else {
            return Ok(false);
        };
        tables.requests.insert(issue.phone.clone(), updated);

        tables.codes.retain(|c| c.phone != issue.phone);
        tables.codes.push(OtpCode {
            id: Uuid::now_v7(),
            phone: issue.phone.clone(),
            code_hash: issue.code_hash.clone(),
            expires_at: issue.expires_at,
            created_at: issue.issued_at,
        });
        Ok(true)
    }

    async fn find_active_code(&self, phone: &str, now: DateTime<Utc>) -> Result<Option<OtpCode>> {
        self.check()?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .codes
            .iter()
            .filter(|c| c.phone == phone && !c.is_expired(now))
            .max_by_key(|c| c.created_at)
            .cloned())
    }

    async fn consume_code(&self, code: &OtpCode) -> Result<bool> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();

        let before = tables.codes.len();
        tables.codes.retain(|c| c.id != code.id);
        if tables.codes.len() == before {
            return Ok(false);
        }

        if let Some(record) = tables.requests.get_mut(&code.phone) {
            record.request_count = 0;
        }
        Ok(true)
    }

    async fn purge_expired_codes(&self, now: DateTime<Utc>) -> Result<u64> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let before = tables.codes.len();
        tables.codes.retain(|c| !c.is_expired(now));
        Ok((before - tables.codes.len()) as u64)
    }

    async fn ping(&self) -> Result<()> {
        self.check()
    }
}

// =============================================================================
// In-memory account store
// =============================================================================

#[derive(Default)]
pub struct InMemoryAccountStore {
    users: Mutex<Vec<User>>,
    admins: Mutex<Vec<Admin>>,
    logs: Mutex<Vec<ActivityLog>>,
    fail_log_writes: AtomicBool,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an admin with a plaintext password (hashed here)
    pub fn with_admin(self, username: &str, password: &str, role: Role) -> Self {
        let admin = Admin {
            id: Uuid::new_v4(),
            username: username.to_string(),
            phone: None,
            password_hash: hash_password(password).unwrap(),
            role,
            total_visits: 0,
            last_login: None,
            created_at: Utc::now(),
        };
        self.admins.lock().unwrap().push(admin);
        self
    }

    pub fn with_log(self, entry: NewActivityLog) -> Self {
        self.logs.lock().unwrap().push(entry.into_log());
        self
    }

    /// Make activity log writes fail
    pub fn fail_log_writes(&self, fail: bool) {
        self.fail_log_writes.store(fail, Ordering::SeqCst);
    }

    pub fn users(&self) -> Vec<User> {
        self.users.lock().unwrap().clone()
    }

    pub fn admin(&self, username: &str) -> Option<Admin> {
        self.admins
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.username == username)
            .cloned()
    }

    pub fn logs(&self) -> Vec<ActivityLog> {
        self.logs.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseAccountStore for InMemoryAccountStore {
    async fn find_or_create_user(&self, phone: &str) -> Result<User> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter().find(|u| u.phone == phone) {
            return Ok(user.clone());
        }
        let user = User {
            id: Uuid::new_v4(),
            phone: phone.to_string(),
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_admin_by_username(&self, username: &str) -> Result<Option<Admin>> {
        Ok(self.admin(username))
    }

    async fn record_admin_login(&self, admin_id: Uuid, at: DateTime<Utc>) -> Result<Admin> {
        let mut admins = self.admins.lock().unwrap();
        let admin = admins
            .iter_mut()
            .find(|a| a.id == admin_id)
            .ok_or_else(|| anyhow::anyhow!("Admin not found: {}", admin_id))?;
        admin.total_visits += 1;
        admin.last_login = Some(at);
        Ok(admin.clone())
    }

    async fn create_admin(&self, new: NewAdmin) -> Result<Admin> {
        let admin = Admin {
            id: Uuid::new_v4(),
            username: new.username,
            phone: new.phone,
            password_hash: new.password_hash,
            role: new.role,
            total_visits: 0,
            last_login: None,
            created_at: Utc::now(),
        };
        self.admins.lock().unwrap().push(admin.clone());
        Ok(admin)
    }

    async fn log_activity(&self, entry: NewActivityLog) -> Result<ActivityLog> {
        if self.fail_log_writes.load(Ordering::SeqCst) {
            anyhow::bail!("activity log unavailable");
        }
        let log = entry.into_log();
        self.logs.lock().unwrap().push(log.clone());
        Ok(log)
    }

    async fn list_activity(&self, filter: &ActivityLogFilter) -> Result<(Vec<ActivityLog>, i64)> {
        let mut matching: Vec<ActivityLog> = self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|log| filter.matches(log))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.limit as usize)
            .collect();
        Ok((page, total))
    }
}

// =============================================================================
// Spy SMS gateway
// =============================================================================

#[derive(Debug, Clone)]
pub struct SentSms {
    pub phone: String,
    pub body: String,
}

/// Records every message; can be switched to fail delivery
#[derive(Default)]
pub struct SpySmsGateway {
    sent: Mutex<Vec<SentSms>>,
    failing: AtomicBool,
}

impl SpySmsGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentSms> {
        self.sent.lock().unwrap().clone()
    }

    /// Numeric code from the most recent message to `phone`
    pub fn last_code_for(&self, phone: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|m| m.phone == phone)
            .and_then(|m| m.body.split_whitespace().next().map(str::to_string))
    }
}

#[async_trait]
impl BaseSmsGateway for SpySmsGateway {
    async fn send_sms(&self, phone: &str, body: &str) -> Result<()> {
        self.sent.lock().unwrap().push(SentSms {
            phone: phone.to_string(),
            body: body.to_string(),
        });
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("SMS provider unavailable");
        }
        Ok(())
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// Bundle of in-memory dependencies with handles kept for assertions
pub struct TestDependencies {
    pub otp_store: Arc<InMemoryOtpStore>,
    pub accounts: Arc<InMemoryAccountStore>,
    pub sms: Arc<SpySmsGateway>,
    pub clock: Arc<MockClock>,
    pub policy: OtpPolicy,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            otp_store: Arc::new(InMemoryOtpStore::new()),
            accounts: Arc::new(InMemoryAccountStore::new()),
            sms: Arc::new(SpySmsGateway::new()),
            clock: Arc::new(MockClock::new()),
            policy: OtpPolicy::default(),
        }
    }

    pub fn with_accounts(mut self, accounts: InMemoryAccountStore) -> Self {
        self.accounts = Arc::new(accounts);
        self
    }

    pub fn with_policy(mut self, policy: OtpPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn jwt_service(&self) -> Arc<JwtService> {
        Arc::new(JwtService::new(TEST_JWT_SECRET, TEST_JWT_ISSUER.to_string()))
    }

    pub fn server_deps(&self) -> ServerDeps {
        ServerDeps::new(
            self.otp_store.clone(),
            self.accounts.clone(),
            self.sms.clone(),
            self.clock.clone(),
            OtpHasher::new(TEST_OTP_SECRET),
            self.policy.clone(),
            self.jwt_service(),
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
