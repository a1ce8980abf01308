//! Session cookie building and reading

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Duration;

use crate::config::AppEnv;

pub const SESSION_COOKIE: &str = "session";

/// Attributes for the `session` cookie
#[derive(Debug, Clone)]
pub struct SessionCookie {
    secure: bool,
    max_age: Duration,
}

impl SessionCookie {
    pub fn new(secure: bool, max_age: Duration) -> Self {
        Self { secure, max_age }
    }

    /// `Secure` only in production, lifetime matches the token TTL
    pub fn for_env(app_env: AppEnv, max_age: Duration) -> Self {
        Self::new(app_env.is_production(), max_age)
    }

    /// Adds the session token to the response jar
    pub fn issue(&self, jar: CookieJar, token: &str) -> CookieJar {
        jar.add(self.build(token.to_string(), self.max_age.num_seconds()))
    }

    /// Adds a removal cookie so the browser drops the session
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        let mut cookie = self.build(String::new(), 0);
        cookie.make_removal();
        jar.add(cookie)
    }

    fn build(&self, value: String, max_age_secs: i64) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, value))
            .http_only(true)
            .same_site(SameSite::Lax)
            .path("/")
            .secure(self.secure)
            .max_age(time::Duration::seconds(max_age_secs))
            .build()
    }
}

/// Session token from the request cookies, if any
pub fn read_session_cookie(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}
