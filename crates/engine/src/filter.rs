//! Report filter pipeline over aggregated campaign groups.

use serde::{Deserialize, Serialize};
use tracing::debug;
use utm_core::types::{AuditedCreative, CampaignGroup};

use crate::aggregate::rebuild_stats;

/// Independent display filters, AND-composed per creative.
///
/// The default view is error/warning-focused: disabled, non-spending, and
/// valid creatives are hidden until the operator opts them back in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterOptions {
    /// Keep creatives with `is_active == false`.
    pub show_disabled: bool,
    /// Keep creatives with zero or unknown spend.
    pub show_non_spend: bool,
    /// Keep only creatives where no level carries a tracking string.
    pub show_no_utms_only: bool,
    /// Keep valid creatives alongside errors and warnings.
    pub show_valid_too: bool,
    /// Case-insensitive substring match over campaign, ad, and ad-set
    /// names and ids. Empty means no search restriction.
    pub search_query: String,
}

impl FilterOptions {
    /// The most permissive setting: filtering with these options returns
    /// exactly the unfiltered aggregate.
    pub fn permissive() -> Self {
        Self {
            show_disabled: true,
            show_non_spend: true,
            show_no_utms_only: false,
            show_valid_too: true,
            search_query: String::new(),
        }
    }
}

/// Filter each group's creatives, drop groups left empty, recompute stats
/// over the survivors, and sort for display. The source groups are never
/// mutated.
pub fn apply_filters(groups: &[CampaignGroup], options: &FilterOptions) -> Vec<CampaignGroup> {
    let query = options.search_query.trim().to_lowercase();

    let mut filtered: Vec<CampaignGroup> = Vec::with_capacity(groups.len());
    for group in groups {
        let ads: Vec<AuditedCreative> = group
            .ads
            .iter()
            .filter(|ad| retain_creative(ad, options, &query))
            .cloned()
            .collect();

        // campaigns must not appear empty in reports
        if ads.is_empty() {
            continue;
        }

        let mut group = CampaignGroup {
            ads,
            ..group.clone()
        };
        rebuild_stats(&mut group);
        sort_ads(&mut group.ads);
        filtered.push(group);
    }

    sort_groups(&mut filtered);
    debug!(
        total = groups.len(),
        shown = filtered.len(),
        "filter pipeline applied"
    );
    filtered
}

fn retain_creative(ad: &AuditedCreative, options: &FilterOptions, query: &str) -> bool {
    if !options.show_disabled && !ad.creative.is_active {
        return false;
    }
    if !options.show_non_spend && ad.creative.spend.unwrap_or(0.0) == 0.0 {
        return false;
    }
    if options.show_no_utms_only && ad.creative.has_any_level_params() {
        return false;
    }
    if !options.show_valid_too && ad.verdict.is_valid {
        return false;
    }
    if !query.is_empty() && !matches_search(ad, query) {
        return false;
    }
    true
}

fn matches_search(ad: &AuditedCreative, query: &str) -> bool {
    let creative = &ad.creative;
    [
        creative.campaign.name.as_str(),
        creative.campaign.id.as_str(),
        creative.ad.name.as_str(),
        creative.ad.id.as_str(),
        creative.medium.name.as_str(),
        creative.medium.id.as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(query))
}

/// Display order for campaigns: active first, then most errors, then most
/// spend, then name. Stable, so equal campaigns keep their aggregate order.
pub fn sort_groups(groups: &mut [CampaignGroup]) {
    groups.sort_by(|a, b| {
        b.is_campaign_active
            .cmp(&a.is_campaign_active)
            .then_with(|| b.error_count.cmp(&a.error_count))
            .then_with(|| b.total_spend.total_cmp(&a.total_spend))
            .then_with(|| a.campaign_name.cmp(&b.campaign_name))
    });
}

/// Display order for creatives within a campaign: active first, then
/// errors, then warnings, then issue count.
pub fn sort_ads(ads: &mut [AuditedCreative]) {
    ads.sort_by(|a, b| {
        b.creative
            .is_active
            .cmp(&a.creative.is_active)
            .then_with(|| b.verdict.is_error.cmp(&a.verdict.is_error))
            .then_with(|| b.verdict.is_warning.cmp(&a.verdict.is_warning))
            .then_with(|| b.creative.issue_count().cmp(&a.creative.issue_count()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use utm_core::types::{Creative, ErrorCountPolicy, LevelRef, Platform};
    use utm_core::IssueCode;

    fn creative(
        campaign_id: &str,
        ad_id: &str,
        spend: Option<f64>,
        is_active: bool,
        issues: Vec<IssueCode>,
    ) -> Creative {
        Creative {
            campaign: LevelRef {
                id: campaign_id.to_string(),
                name: format!("Campaign {campaign_id}"),
                ..LevelRef::default()
            },
            medium: LevelRef {
                id: format!("m-{ad_id}"),
                name: "Lookalike Audience".to_string(),
                ..LevelRef::default()
            },
            ad: LevelRef {
                id: ad_id.to_string(),
                name: format!("Ad {ad_id}"),
                track_params: Some("utm_source=x".to_string()),
                ..LevelRef::default()
            },
            spend,
            is_active,
            messages: issues,
            ..Creative::default()
        }
    }

    fn fixture_groups() -> Vec<CampaignGroup> {
        let creatives = vec![
            // campaign c1: one spending error, one valid spender, one inactive warning
            creative("c1", "a1", Some(10.0), true, vec![IssueCode::MissingUtmField]),
            creative("c1", "a2", Some(5.0), true, vec![]),
            creative("c1", "a3", None, false, vec![IssueCode::IncorrectUtmFormat]),
            // campaign c2: all valid, no spend
            creative("c2", "a4", Some(0.0), true, vec![]),
        ];
        aggregate(&creatives, Platform::Facebook, ErrorCountPolicy::default())
    }

    // 1. Predicates -------------------------------------------------------

    #[test]
    fn test_default_view_is_error_focused() {
        let groups = fixture_groups();
        let shown = apply_filters(&groups, &FilterOptions::default());

        // only c1's spending error survives; c2 is dropped entirely
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].campaign_id, "c1");
        assert_eq!(shown[0].ad_count, 1);
        assert_eq!(shown[0].ads[0].creative.ad.id, "a1");
    }

    #[test]
    fn test_show_valid_too_adds_valid_spenders() {
        let groups = fixture_groups();
        let options = FilterOptions {
            show_valid_too: true,
            ..FilterOptions::default()
        };
        let shown = apply_filters(&groups, &options);

        assert_eq!(shown[0].ad_count, 2);
    }

    #[test]
    fn test_show_disabled_and_non_spend_add_the_warning_back() {
        let groups = fixture_groups();
        let options = FilterOptions {
            show_disabled: true,
            show_non_spend: true,
            ..FilterOptions::default()
        };
        let shown = apply_filters(&groups, &options);

        let ids: Vec<&str> = shown[0]
            .ads
            .iter()
            .map(|ad| ad.creative.ad.id.as_str())
            .collect();
        assert!(ids.contains(&"a3"));
    }

    #[test]
    fn test_no_utms_only_keeps_unconfigured_creatives() {
        let mut bare = creative("c3", "a9", Some(50.0), true, vec![IssueCode::MissingUtmField]);
        bare.ad.track_params = None;
        let creatives = vec![
            bare,
            creative("c1", "a1", Some(10.0), true, vec![IssueCode::MissingUtmField]),
        ];
        let groups = aggregate(&creatives, Platform::Google, ErrorCountPolicy::default());

        let options = FilterOptions {
            show_no_utms_only: true,
            ..FilterOptions::default()
        };
        let shown = apply_filters(&groups, &options);

        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].campaign_id, "c3");
    }

    #[test]
    fn test_search_matches_medium_fields_case_insensitive() {
        let groups = fixture_groups();
        let options = FilterOptions {
            show_valid_too: true,
            search_query: "LOOKALIKE".to_string(),
            ..FilterOptions::default()
        };
        let shown = apply_filters(&groups, &options);
        assert!(!shown.is_empty());

        let options = FilterOptions {
            show_valid_too: true,
            search_query: "no such campaign".to_string(),
            ..FilterOptions::default()
        };
        assert!(apply_filters(&groups, &options).is_empty());
    }

    // 2. Invariants -------------------------------------------------------

    #[test]
    fn test_permissive_round_trip_returns_unfiltered_aggregate() {
        let groups = fixture_groups();
        let shown = apply_filters(&groups, &FilterOptions::permissive());

        let mut expected = groups.clone();
        for group in &mut expected {
            sort_ads(&mut group.ads);
        }
        sort_groups(&mut expected);

        assert_eq!(shown.len(), expected.len());
        for (s, e) in shown.iter().zip(&expected) {
            assert_eq!(s.campaign_id, e.campaign_id);
            assert_eq!(s.ad_count, e.ad_count);
            assert_eq!(s.error_count, e.error_count);
            assert!((s.total_spend - e.total_spend).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_enabling_flags_is_monotonic() {
        let groups = fixture_groups();
        let narrow = apply_filters(&groups, &FilterOptions::default());
        let wide = apply_filters(
            &groups,
            &FilterOptions {
                show_disabled: true,
                show_non_spend: true,
                ..FilterOptions::default()
            },
        );

        let shown_ids = |result: &[CampaignGroup]| -> Vec<String> {
            result
                .iter()
                .flat_map(|g| g.ads.iter().map(|ad| ad.creative.ad.id.clone()))
                .collect()
        };
        let narrow_ids = shown_ids(&narrow);
        let wide_ids = shown_ids(&wide);
        assert!(narrow_ids.iter().all(|id| wide_ids.contains(id)));
        assert!(wide_ids.len() >= narrow_ids.len());
    }

    #[test]
    fn test_stats_recomputed_over_survivors_without_mutating_source() {
        let groups = fixture_groups();
        let before = groups[0].clone();

        let shown = apply_filters(&groups, &FilterOptions::default());

        // source untouched
        assert_eq!(groups[0].ad_count, before.ad_count);
        assert!((groups[0].total_spend - before.total_spend).abs() < f64::EPSILON);
        // filtered stats reflect only the surviving error ad
        assert_eq!(shown[0].ad_count, 1);
        assert!((shown[0].total_spend - 10.0).abs() < f64::EPSILON);
        assert_eq!(shown[0].error_count, 1);
    }

    // 3. Ordering contract ------------------------------------------------

    #[test]
    fn test_campaign_and_creative_ordering() {
        let creatives = vec![
            // inactive campaign, high spend
            creative("sleepy", "s1", Some(500.0), false, vec![IssueCode::MissingUtmField]),
            // active, no errors, low spend, name "Beta"
            creative("beta", "b1", Some(10.0), true, vec![]),
            // active, one error, lower spend
            creative("errors", "e1", Some(5.0), true, vec![IssueCode::MissingUtmField]),
            // active, no errors, same spend as beta, name sorts first
            creative("alpha", "x1", Some(10.0), true, vec![]),
        ];
        let groups = aggregate(&creatives, Platform::Facebook, ErrorCountPolicy::default());

        let shown = apply_filters(&groups, &FilterOptions::permissive());
        let order: Vec<&str> = shown.iter().map(|g| g.campaign_id.as_str()).collect();
        assert_eq!(order, vec!["errors", "alpha", "beta", "sleepy"]);

        // within a campaign: active errors before active warnings before valid
        let creatives = vec![
            creative("c", "valid", Some(1.0), true, vec![]),
            creative(
                "c",
                "warn",
                None,
                true,
                vec![IssueCode::IncorrectUtmFormat],
            ),
            creative(
                "c",
                "err",
                Some(2.0),
                true,
                vec![IssueCode::MissingUtmField, IssueCode::UtmInLinkUrl],
            ),
            creative("c", "off", Some(3.0), false, vec![IssueCode::MissingUtmField]),
        ];
        let groups = aggregate(&creatives, Platform::Google, ErrorCountPolicy::default());
        let shown = apply_filters(&groups, &FilterOptions::permissive());
        let order: Vec<&str> = shown[0]
            .ads
            .iter()
            .map(|ad| ad.creative.ad.id.as_str())
            .collect();
        assert_eq!(order, vec!["err", "warn", "valid", "off"]);
    }
}
