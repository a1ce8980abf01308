pub mod activity_log;
pub mod admin;
pub mod otp_code;
pub mod otp_issue;
pub mod otp_request;
pub mod user;

pub use activity_log::{
    ActivityAction, ActivityCategory, ActivityLog, ActivityLogFilter, NewActivityLog,
};
pub use admin::{Admin, NewAdmin};
pub use otp_code::OtpCode;
pub use otp_issue::OtpIssue;
pub use otp_request::OtpRequest;
pub use user::User;
