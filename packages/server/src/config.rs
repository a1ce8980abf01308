use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use std::env;

/// Deployment environment, drives cookie security and dev-only OTP logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => bail!("APP_ENV must be 'development' or 'production', got '{}'", other),
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Twilio credentials for SMS delivery
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub app_env: AppEnv,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub otp_hash_secret: String,
    pub allowed_origins: Vec<String>,
    pub twilio: Option<TwilioConfig>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let app_env = match env::var("APP_ENV") {
            Ok(value) => AppEnv::parse(&value)?,
            Err(_) => AppEnv::Development,
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            app_env,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "coaching-portal".to_string()),
            otp_hash_secret: env::var("OTP_HASH_SECRET")
                .context("OTP_HASH_SECRET must be set")?,
            allowed_origins: parse_list(&env::var("ALLOWED_ORIGINS").unwrap_or_default()),
            twilio: twilio_from_env()?,
        })
    }
}

/// Twilio is optional; a partial configuration is an error.
fn twilio_from_env() -> Result<Option<TwilioConfig>> {
    let account_sid = env::var("TWILIO_ACCOUNT_SID").ok();
    let auth_token = env::var("TWILIO_AUTH_TOKEN").ok();
    let from_number = env::var("TWILIO_FROM_NUMBER").ok();

    match (account_sid, auth_token, from_number) {
        (Some(account_sid), Some(auth_token), Some(from_number)) => Ok(Some(TwilioConfig {
            account_sid,
            auth_token,
            from_number,
        })),
        (None, None, None) => Ok(None),
        _ => bail!(
            "TWILIO_ACCOUNT_SID, TWILIO_AUTH_TOKEN and TWILIO_FROM_NUMBER must be set together"
        ),
    }
}

/// Split a comma separated env value, dropping blanks
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_app_env() {
        assert_eq!(AppEnv::parse("production").unwrap(), AppEnv::Production);
        assert_eq!(AppEnv::parse(" Development ").unwrap(), AppEnv::Development);
        assert_eq!(AppEnv::parse("prod").unwrap(), AppEnv::Production);
        assert!(AppEnv::parse("staging").is_err());
    }

    #[test]
    fn test_parse_list_drops_blanks() {
        let origins = parse_list("http://localhost:3000, ,https://portal.example.com,");
        assert_eq!(
            origins,
            vec![
                "http://localhost:3000".to_string(),
                "https://portal.example.com".to_string()
            ]
        );
        assert!(parse_list("").is_empty());
    }
}
