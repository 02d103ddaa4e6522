use thiserror::Error;

pub type AuditResult<T> = Result<T, AuditError>;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Fetch error for dashboard {dashboard_id}: {message}")]
    Fetch { dashboard_id: i64, message: String },

    #[error("Fetch for dashboard {dashboard_id} timed out after {elapsed_ms}ms")]
    Timeout { dashboard_id: i64, elapsed_ms: u64 },

    #[error("Bulk validation cancelled")]
    Cancelled,

    #[error("Payload decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
