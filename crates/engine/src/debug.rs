//! UTM string debugging: parameter parsing, found-vs-expected comparison,
//! and per-creative fault records for the reporting layer.

use serde::{Deserialize, Serialize};
use utm_core::config::DEFAULT_REQUIRED_PATTERN;
use utm_core::types::{CampaignGroup, Platform};
use utm_core::IssueCode;

/// The five standard UTM keys, in display order.
pub const UTM_KEYS: [&str; 5] = [
    "utm_source",
    "utm_campaign",
    "utm_medium",
    "utm_content",
    "utm_term",
];

/// A UTM string decomposed into its standard keys. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtmParams {
    pub source: String,
    pub campaign: String,
    pub medium: String,
    pub content: String,
    pub term: String,
}

impl UtmParams {
    pub fn get(&self, key: &str) -> &str {
        match key {
            "utm_source" => &self.source,
            "utm_campaign" => &self.campaign,
            "utm_medium" => &self.medium,
            "utm_content" => &self.content,
            "utm_term" => &self.term,
            _ => "",
        }
    }
}

/// Parse a query-string-like UTM value. A leading `?` is tolerated.
pub fn parse_utm_string(raw: &str) -> UtmParams {
    let trimmed = raw.trim().trim_start_matches('?');
    let mut params = UtmParams::default();

    for (key, value) in url::form_urlencoded::parse(trimmed.as_bytes()) {
        match key.as_ref() {
            "utm_source" => params.source = value.into_owned(),
            "utm_campaign" => params.campaign = value.into_owned(),
            "utm_medium" => params.medium = value.into_owned(),
            "utm_content" => params.content = value.into_owned(),
            "utm_term" => params.term = value.into_owned(),
            _ => {}
        }
    }

    params
}

/// One row of a found-vs-expected comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamComparison {
    pub key: String,
    pub found: String,
    pub expected: String,
    pub is_match: bool,
}

/// Compare a found UTM string against the expected pattern, key by key.
/// Keys absent on both sides are skipped.
pub fn compare(found: &str, expected: &str) -> Vec<ParamComparison> {
    let found_params = parse_utm_string(found);
    let expected_params = parse_utm_string(expected);

    UTM_KEYS
        .iter()
        .filter_map(|key| {
            let found_value = found_params.get(key);
            let expected_value = expected_params.get(key);
            if found_value.is_empty() && expected_value.is_empty() {
                return None;
            }
            Some(ParamComparison {
                key: key.to_string(),
                found: found_value.to_string(),
                expected: expected_value.to_string(),
                is_match: found_value == expected_value,
            })
        })
        .collect()
}

/// Exact-match test used by the interactive tester.
pub fn matches_pattern(candidate: &str, pattern: &str) -> bool {
    candidate.trim() == pattern
}

/// A reportable fault derived from one invalid creative and one of its
/// issue codes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreativeFault {
    pub id: String,
    pub name: String,
    pub error_type: IssueCode,
    pub details: String,
    pub platform: Platform,
    pub campaign_name: Option<String>,
    pub adset_name: Option<String>,
    pub found_utms: Option<String>,
    pub expected_utms: Option<String>,
}

/// Flatten invalid creatives into fault records, one per issue code.
///
/// For [`IssueCode::UtmInLinkUrl`] the "found" value is the destination URL
/// itself, since that is where the stray parameters live.
pub fn collect_faults(groups: &[CampaignGroup], required_pattern: &str) -> Vec<CreativeFault> {
    let mut faults = Vec::new();

    for group in groups {
        for ad in &group.ads {
            if ad.verdict.is_valid {
                continue;
            }
            for code in &ad.creative.messages {
                let found_utms = match code {
                    IssueCode::UtmInLinkUrl => Some(ad.creative.link.clone()),
                    _ => ad.effective.value.clone(),
                };
                faults.push(CreativeFault {
                    id: ad.creative.ad.id.clone(),
                    name: ad.creative.ad.name.clone(),
                    error_type: code.clone(),
                    details: code.description().to_string(),
                    platform: group.platform,
                    campaign_name: Some(group.campaign_name.clone()),
                    adset_name: Some(ad.creative.medium.name.clone()),
                    found_utms,
                    expected_utms: Some(required_pattern.to_string()),
                });
            }
        }
    }

    faults
}

/// Recover the expected pattern from fault records when the caller has none,
/// defaulting to the documented standard pattern.
pub fn infer_pattern(faults: &[CreativeFault]) -> &str {
    faults
        .iter()
        .find_map(|fault| fault.expected_utms.as_deref())
        .unwrap_or(DEFAULT_REQUIRED_PATTERN)
}
