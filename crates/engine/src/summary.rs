//! Dashboard-level audit summary: the totals behind the overview cards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utm_core::types::{AdsConfigsResult, ErrorCountPolicy, Platform};

use crate::classifier::{classify, counts_as_error};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformBreakdown {
    pub platform: Platform,
    pub ads_checked: usize,
    pub error_count: usize,
}

/// Totals for one audited dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditSummary {
    pub total_ads_checked: usize,
    pub valid_ads: usize,
    pub error_count: usize,
    pub warning_count: usize,
    /// Share of audited ads carrying at least one issue, 0–100.
    pub error_rate_percent: f64,
    pub platforms: Vec<PlatformBreakdown>,
    pub generated_at: DateTime<Utc>,
}

impl AuditSummary {
    pub fn is_valid(&self) -> bool {
        self.error_count == 0 && self.warning_count == 0
    }
}

/// Compute summary totals across all platform lists of one dashboard.
pub fn summarize(configs: &AdsConfigsResult, policy: ErrorCountPolicy) -> AuditSummary {
    let mut valid_ads = 0;
    let mut error_count = 0;
    let mut warning_count = 0;
    let mut platforms = Vec::with_capacity(Platform::ALL.len());

    for (platform, creatives) in configs.platform_lists() {
        let mut platform_errors = 0;
        for creative in creatives {
            let verdict = classify(creative);
            if verdict.is_valid {
                valid_ads += 1;
            } else if verdict.is_warning {
                warning_count += 1;
            }
            if counts_as_error(creative, verdict, policy) {
                error_count += 1;
                platform_errors += 1;
            }
        }
        platforms.push(PlatformBreakdown {
            platform,
            ads_checked: creatives.len(),
            error_count: platform_errors,
        });
    }

    let total_ads_checked = configs.total_ads();
    let invalid_ads = total_ads_checked - valid_ads;
    let error_rate_percent = if total_ads_checked > 0 {
        invalid_ads as f64 / total_ads_checked as f64 * 100.0
    } else {
        0.0
    };

    AuditSummary {
        total_ads_checked,
        valid_ads,
        error_count,
        warning_count,
        error_rate_percent,
        platforms,
        generated_at: Utc::now(),
    }
}
