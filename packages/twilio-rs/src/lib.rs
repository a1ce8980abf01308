// Minimal Twilio Programmable Messaging client used for OTP delivery.

use std::collections::HashMap;

pub mod models;
use reqwest::{header, Client};

use crate::models::{ApiErrorBody, MessageResponse};

#[derive(Debug, Clone)]
pub struct TwilioOptions {
    pub account_sid: String,
    pub auth_token: String,
    /// Sender number in E.164 format (or a messaging service SID)
    pub from_number: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TwilioError {
    #[error("request to Twilio failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Twilio returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("message to {to} was rejected with status {status}")]
    Rejected { to: String, status: String },
}

#[derive(Debug, Clone)]
pub struct TwilioService {
    options: TwilioOptions,
    client: Client,
    base_url: String,
}

impl TwilioService {
    pub fn new(options: TwilioOptions) -> Self {
        Self::with_base_url(options, "https://api.twilio.com")
    }

    /// Point the client at a different API host (used against local fakes).
    pub fn with_base_url(options: TwilioOptions, base_url: impl Into<String>) -> Self {
        Self {
            options,
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn messages_url(&self) -> String {
        format!(
            "{base}/2010-04-01/Accounts/{sid}/Messages.json",
            base = self.base_url.trim_end_matches('/'),
            sid = self.options.account_sid
        )
    }

    /// Send a plain SMS to `recipient`.
    pub async fn send_sms(&self, recipient: &str, body: &str) -> Result<MessageResponse, TwilioError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/x-www-form-urlencoded"),
        );

        let mut form_body: HashMap<&str, &str> = HashMap::new();
        form_body.insert("To", recipient);
        form_body.insert("From", &self.options.from_number);
        form_body.insert("Body", body);

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.options.account_sid, Some(&self.options.auth_token))
            .headers(headers)
            .form(&form_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ApiErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(TwilioError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let message = response.json::<MessageResponse>().await?;
        if matches!(message.status.as_str(), "failed" | "undelivered") {
            return Err(TwilioError::Rejected {
                to: message.to,
                status: message.status,
            });
        }

        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> TwilioOptions {
        TwilioOptions {
            account_sid: "AC_test".to_string(),
            auth_token: "token".to_string(),
            from_number: "+15005550006".to_string(),
        }
    }

    #[test]
    fn builds_messages_url_for_account() {
        let service = TwilioService::new(options());
        assert_eq!(
            service.messages_url(),
            "https://api.twilio.com/2010-04-01/Accounts/AC_test/Messages.json"
        );
    }

    #[test]
    fn custom_base_url_drops_trailing_slash() {
        let service = TwilioService::with_base_url(options(), "http://localhost:9999/");
        assert_eq!(
            service.messages_url(),
            "http://localhost:9999/2010-04-01/Accounts/AC_test/Messages.json"
        );
    }
}
