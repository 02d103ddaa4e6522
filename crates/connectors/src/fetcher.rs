//! Dashboard fetch boundary: the only part of the system that can fail.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use utm_core::types::{AdsConfigsResult, Dashboard, Session};
use utm_core::{AuditError, AuditResult};

use crate::payload::DashboardPayload;

/// Everything fetched for one dashboard in a single round trip.
#[derive(Debug, Clone, Default)]
pub struct FetchedDashboard {
    pub configs: AdsConfigsResult,
    /// Recommended template carried by later payload revisions.
    pub recommended_utms: Option<String>,
}

/// Retrieves dashboard lists and per-platform creative payloads on behalf of
/// an authenticated session. Implementations own all network or disk I/O.
#[async_trait]
pub trait DashboardFetcher: Send + Sync {
    async fn list_dashboards(&self, session: &Session) -> AuditResult<Vec<Dashboard>>;

    async fn fetch_creatives(
        &self,
        session: &Session,
        dashboard_id: i64,
    ) -> AuditResult<FetchedDashboard>;
}

fn ensure_session(session: &Session) -> AuditResult<()> {
    if session.token.trim().is_empty() {
        return Err(AuditError::Session("missing session token".to_string()));
    }
    Ok(())
}

// ─── File-backed fetcher ────────────────────────────────────────────────────

/// Reads dashboard documents from a directory:
/// `dashboards.json` for the listing and `<dashboard_id>.json` per dashboard.
pub struct FileFetcher {
    root: PathBuf,
}

impl FileFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl DashboardFetcher for FileFetcher {
    async fn list_dashboards(&self, session: &Session) -> AuditResult<Vec<Dashboard>> {
        ensure_session(session)?;
        let path = self.root.join("dashboards.json");
        let raw = tokio::fs::read(&path).await?;
        let dashboards: Vec<Dashboard> = serde_json::from_slice(&raw)?;

        debug!(
            count = dashboards.len(),
            path = %path.display(),
            "listed dashboards"
        );
        Ok(dashboards)
    }

    async fn fetch_creatives(
        &self,
        session: &Session,
        dashboard_id: i64,
    ) -> AuditResult<FetchedDashboard> {
        ensure_session(session)?;
        let path = self.root.join(format!("{dashboard_id}.json"));
        let raw = tokio::fs::read(&path)
            .await
            .map_err(|e| AuditError::Fetch {
                dashboard_id,
                message: format!("{}: {e}", path.display()),
            })?;
        let payload: DashboardPayload = serde_json::from_slice(&raw)?;
        let (configs, recommended_utms) = payload.normalize();

        debug!(
            dashboard_id,
            ads = configs.total_ads(),
            "fetched dashboard payload"
        );
        Ok(FetchedDashboard {
            configs,
            recommended_utms,
        })
    }
}

// ─── In-memory fetcher ──────────────────────────────────────────────────────

/// Fixture fetcher with configurable per-dashboard payloads, failures, and
/// artificial latency. Used by tests and demos.
#[derive(Default)]
pub struct StaticFetcher {
    dashboards: Vec<Dashboard>,
    payloads: HashMap<i64, FetchedDashboard>,
    failures: HashMap<i64, String>,
    delays: HashMap<i64, Duration>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dashboard(mut self, dashboard: Dashboard, configs: AdsConfigsResult) -> Self {
        self.payloads.insert(
            dashboard.id,
            FetchedDashboard {
                configs,
                recommended_utms: None,
            },
        );
        self.dashboards.push(dashboard);
        self
    }

    /// Register a dashboard whose fetch always fails with `message`.
    pub fn with_failure(mut self, dashboard: Dashboard, message: impl Into<String>) -> Self {
        self.failures.insert(dashboard.id, message.into());
        self.dashboards.push(dashboard);
        self
    }

    /// Delay fetches for `dashboard_id` by `delay`, for timeout tests.
    pub fn with_delay(mut self, dashboard_id: i64, delay: Duration) -> Self {
        self.delays.insert(dashboard_id, delay);
        self
    }
}

#[async_trait]
impl DashboardFetcher for StaticFetcher {
    async fn list_dashboards(&self, session: &Session) -> AuditResult<Vec<Dashboard>> {
        ensure_session(session)?;
        Ok(self.dashboards.clone())
    }

    async fn fetch_creatives(
        &self,
        session: &Session,
        dashboard_id: i64,
    ) -> AuditResult<FetchedDashboard> {
        ensure_session(session)?;
        if let Some(delay) = self.delays.get(&dashboard_id) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(message) = self.failures.get(&dashboard_id) {
            return Err(AuditError::Fetch {
                dashboard_id,
                message: message.clone(),
            });
        }
        self.payloads
            .get(&dashboard_id)
            .cloned()
            .ok_or_else(|| AuditError::Fetch {
                dashboard_id,
                message: "unknown dashboard".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dashboard(id: i64) -> Dashboard {
        Dashboard {
            id,
            account_id: 77,
            name: format!("Dashboard {id}"),
            integrations: vec!["facebook".to_string()],
        }
    }

    #[tokio::test]
    async fn test_static_fetcher_round_trip() {
        let fetcher =
            StaticFetcher::new().with_dashboard(dashboard(1), AdsConfigsResult::default());
        let session = Session::new("token", "acct");

        let dashboards = fetcher.list_dashboards(&session).await.unwrap();
        assert_eq!(dashboards.len(), 1);

        let fetched = fetcher.fetch_creatives(&session, 1).await.unwrap();
        assert!(fetched.configs.is_empty());
    }

    #[tokio::test]
    async fn test_missing_token_is_a_session_error() {
        let fetcher = StaticFetcher::new();
        let session = Session::new("", "acct");

        let err = fetcher.list_dashboards(&session).await.unwrap_err();
        assert!(matches!(err, AuditError::Session(_)));
    }

    #[tokio::test]
    async fn test_injected_failure_surfaces_as_fetch_error() {
        let fetcher = StaticFetcher::new().with_failure(dashboard(2), "boom");
        let session = Session::new("token", "acct");

        let err = fetcher.fetch_creatives(&session, 2).await.unwrap_err();
        match err {
            AuditError::Fetch {
                dashboard_id,
                message,
            } => {
                assert_eq!(dashboard_id, 2);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
