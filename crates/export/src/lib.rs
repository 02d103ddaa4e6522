//! Flat report export: one row per creative, CSV/JSON serialization, and
//! the campaign-list clipboard text.
//!
//! Rows derive from already-filtered campaign groups so exports always match
//! what the operator sees on screen.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utm_core::types::{CampaignGroup, Platform};

/// One exported table row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRow {
    pub platform: String,
    pub campaign_name: String,
    pub campaign_id: String,
    pub adset_name: String,
    pub adset_id: String,
    pub ad_name: String,
    pub ad_id: String,
    pub destination_url: String,
    pub utm_parameters: String,
    pub status: String,
    pub spend: Option<f64>,
    pub active: bool,
}

const CSV_HEADER: [&str; 12] = [
    "Platform",
    "Campaign Name",
    "Campaign ID",
    "Ad Set Name",
    "Ad Set ID",
    "Ad Name",
    "Ad ID",
    "Destination URL",
    "UTM Parameters",
    "Status",
    "Spend",
    "Active",
];

/// Flatten filtered campaign groups into export rows.
pub fn build_rows(groups: &[CampaignGroup]) -> Vec<ExportRow> {
    let mut rows = Vec::new();
    for group in groups {
        for ad in &group.ads {
            let creative = &ad.creative;
            rows.push(ExportRow {
                platform: group.platform.display_name().to_string(),
                campaign_name: creative.campaign.name.clone(),
                campaign_id: creative.campaign.id.clone(),
                adset_name: creative.medium.name.clone(),
                adset_id: creative.medium.id.clone(),
                ad_name: creative.ad.name.clone(),
                ad_id: creative.ad.id.clone(),
                destination_url: creative.link.clone(),
                utm_parameters: ad
                    .effective
                    .value
                    .clone()
                    .unwrap_or_else(|| "N/A".to_string()),
                status: if ad.verdict.is_valid {
                    "Valid".to_string()
                } else {
                    "Invalid".to_string()
                },
                spend: creative.spend,
                active: creative.is_active,
            });
        }
    }
    rows
}

/// Serialize rows as CSV with quoted string cells.
pub fn to_csv(rows: &[ExportRow]) -> String {
    let mut csv = CSV_HEADER.join(",");
    csv.push('\n');

    for row in rows {
        let cells = [
            quote(&row.platform),
            quote(&row.campaign_name),
            quote(&row.campaign_id),
            quote(&row.adset_name),
            quote(&row.adset_id),
            quote(&row.ad_name),
            quote(&row.ad_id),
            quote(&row.destination_url),
            quote(&row.utm_parameters),
            quote(&row.status),
            row.spend.map(|s| s.to_string()).unwrap_or_default(),
            if row.active { "Yes" } else { "No" }.to_string(),
        ];
        csv.push_str(&cells.join(","));
        csv.push('\n');
    }

    csv
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Serialize rows as pretty JSON.
pub fn to_json(rows: &[ExportRow]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(rows)
}

/// File name stem for a downloaded report.
pub fn file_stem(dashboard_name: Option<&str>, date: NaiveDate) -> String {
    format!(
        "utm_report_{}_{}",
        dashboard_name.unwrap_or("export"),
        date.format("%Y-%m-%d")
    )
}

/// Campaign names and ids grouped per platform, one block per platform,
/// ready for the clipboard.
pub fn campaign_list_text(groups: &[CampaignGroup]) -> String {
    let mut blocks = Vec::new();
    for platform in Platform::ALL {
        let campaigns: Vec<String> = groups
            .iter()
            .filter(|group| group.platform == platform)
            .map(|group| format!("{} ({})", group.campaign_name, group.campaign_id))
            .collect();
        if campaigns.is_empty() {
            continue;
        }
        blocks.push(format!(
            "{}:\n{}",
            platform.display_name(),
            campaigns.join("\n")
        ));
    }
    blocks.join("\n\n")
}
