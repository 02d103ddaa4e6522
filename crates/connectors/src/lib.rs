//! Fetch boundary and wire payload decoding for dashboard audits.
//!
//! The engine itself never performs I/O; everything that can fail over the
//! network lives behind [`DashboardFetcher`].

pub mod fetcher;
pub mod payload;

pub use fetcher::{DashboardFetcher, FetchedDashboard, FileFetcher, StaticFetcher};
pub use payload::{DashboardPayload, PlatformPayload};
