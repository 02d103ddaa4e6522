//! Bulk validation: fan the audit pipeline out across every dashboard the
//! operator manages, concurrently and with per-dashboard failure isolation.

pub mod orchestrator;
pub mod report;

pub use orchestrator::{BulkValidator, CancelHandle, CancelToken};
pub use report::{BulkReport, DashboardAudit, DashboardOutcome, DashboardReport};
