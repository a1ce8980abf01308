use serde::Deserialize;

/// Subset of the Programmable Messaging `Message` resource we care about.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub sid: String,
    pub status: String,
    pub to: String,
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Error body returned by the Twilio REST API on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_queued_message() {
        let body = r#"{
            "sid": "SM123",
            "status": "queued",
            "to": "+911234567890",
            "error_code": null,
            "error_message": null,
            "num_segments": "1"
        }"#;

        let message: MessageResponse = serde_json::from_str(body).unwrap();
        assert_eq!(message.sid, "SM123");
        assert_eq!(message.status, "queued");
        assert!(message.error_code.is_none());
    }

    #[test]
    fn parses_error_body_with_missing_fields() {
        let body = r#"{ "code": 21211, "message": "Invalid 'To' Phone Number" }"#;
        let error: ApiErrorBody = serde_json::from_str(body).unwrap();
        assert_eq!(error.code, Some(21211));
        assert!(error.status.is_none());
    }
}
