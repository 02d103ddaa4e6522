pub mod config;
pub mod error;
pub mod issues;
pub mod types;

pub use config::AppConfig;
pub use error::{AuditError, AuditResult};
pub use issues::IssueCode;
