//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod scheduled_tasks;
pub mod stores;
pub mod test_dependencies;
pub mod traits;

pub use deps::{LogOnlySmsGateway, ServerDeps, TwilioAdapter};
pub use scheduled_tasks::{purge_expired_codes, start_scheduler};
pub use stores::{PgAccountStore, PgOtpStore};
pub use test_dependencies::TestDependencies;
pub use traits::*;
