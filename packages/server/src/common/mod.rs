// Common types and utilities shared across the application

pub mod clock;
pub mod validation;

pub use clock::{Clock, SystemClock};
pub use validation::{mask_phone, normalize_phone, validate_otp_code, ValidationError};
