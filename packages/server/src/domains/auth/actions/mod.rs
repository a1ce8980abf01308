//! Auth domain actions - business logic functions
//!
//! Actions are async functions called directly from the HTTP handlers. They
//! take raw request input, validate it and drive the OTP core and stores
//! through `ServerDeps`.

mod admin_login;
mod list_activity;
mod send_otp;
mod verify_otp;

pub use admin_login::{admin_login, AdminSession};
pub use list_activity::{list_activity, ActivityPage, ActivityQuery, MAX_PAGE_SIZE};
pub use send_otp::send_otp;
pub use verify_otp::{verify_otp, VerifiedSession};
