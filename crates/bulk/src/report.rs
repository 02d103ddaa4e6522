//! Per-dashboard and combined bulk report structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utm_core::types::{AdsConfigsResult, CampaignGroup, Dashboard, ErrorCountPolicy};
use utm_engine::filter::FilterOptions;
use utm_engine::summary::AuditSummary;
use utm_engine::{aggregate, apply_filters, summarize};
use uuid::Uuid;

/// A completed audit of a single dashboard.
///
/// Owns the full per-platform creative lists; `groups` holds the filtered
/// view the operator sees, which is also what exports derive from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardAudit {
    pub configs: AdsConfigsResult,
    pub groups: Vec<CampaignGroup>,
    pub summary: AuditSummary,
    pub recommended_utms: Option<String>,
}

impl DashboardAudit {
    /// Run the full engine pipeline over one dashboard's fetched payload.
    /// The summary covers every ad checked; `groups` reflects the filters.
    pub fn build(
        configs: AdsConfigsResult,
        recommended_utms: Option<String>,
        options: &FilterOptions,
        policy: ErrorCountPolicy,
    ) -> Self {
        let summary = summarize(&configs, policy);

        let mut all_groups = Vec::new();
        for (platform, creatives) in configs.platform_lists() {
            all_groups.extend(aggregate(creatives, platform, policy));
        }
        let groups = apply_filters(&all_groups, options);

        Self {
            configs,
            groups,
            summary,
            recommended_utms,
        }
    }
}

/// How one dashboard's slice of a bulk run ended. Failures never leak out of
/// their dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DashboardOutcome {
    Completed(DashboardAudit),
    Failed { error: String },
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
    pub dashboard: Dashboard,
    pub outcome: DashboardOutcome,
}

impl DashboardReport {
    pub fn audit(&self) -> Option<&DashboardAudit> {
        match &self.outcome {
            DashboardOutcome::Completed(audit) => Some(audit),
            _ => None,
        }
    }
}

/// All per-dashboard reports of one bulk run, in the order the dashboards
/// were requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkReport {
    pub run_id: Uuid,
    pub reports: Vec<DashboardReport>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BulkReport {
    pub fn completed_count(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, DashboardOutcome::Completed(_)))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, DashboardOutcome::Failed { .. }))
            .count()
    }

    pub fn cancelled_count(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, DashboardOutcome::Cancelled))
            .count()
    }
}
