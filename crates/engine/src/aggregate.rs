//! Roll-up of creatives into per-campaign groups.

use std::collections::{HashMap, HashSet};

use tracing::warn;
use utm_core::types::{
    AuditedCreative, CampaignGroup, Creative, ErrorCountPolicy, Platform,
};

use crate::classifier::{classify, counts_as_error};
use crate::resolver::resolve;

/// Enrich a single creative with its derived effective parameters, verdict,
/// and authoritative error flag.
pub fn audit(creative: &Creative, policy: ErrorCountPolicy) -> AuditedCreative {
    let effective = resolve(creative);
    let verdict = classify(creative);
    AuditedCreative {
        counts_as_error: counts_as_error(creative, verdict, policy),
        creative: creative.clone(),
        effective,
        verdict,
    }
}

/// Partition creatives by campaign id and compute per-campaign stats.
///
/// Campaigns appear in first-seen order. Within a campaign, creatives sharing
/// an ad id are merged by keeping the first occurrence; duplicates indicate a
/// data bug upstream and must not double-count spend. A campaign with zero
/// creatives cannot exist, since partitions derive from the creatives
/// themselves.
pub fn aggregate(
    creatives: &[Creative],
    platform: Platform,
    policy: ErrorCountPolicy,
) -> Vec<CampaignGroup> {
    let mut groups: Vec<CampaignGroup> = Vec::new();
    let mut index_by_campaign: HashMap<String, usize> = HashMap::new();
    let mut seen_ads: HashSet<(String, String)> = HashSet::new();

    for creative in creatives {
        let key = (creative.campaign.id.clone(), creative.ad.id.clone());
        if !seen_ads.insert(key) {
            warn!(
                platform = platform.display_name(),
                campaign_id = %creative.campaign.id,
                ad_id = %creative.ad.id,
                "duplicate ad id in source list, keeping first occurrence"
            );
            continue;
        }

        let index = *index_by_campaign
            .entry(creative.campaign.id.clone())
            .or_insert_with(|| {
                groups.push(CampaignGroup {
                    platform,
                    campaign_id: creative.campaign.id.clone(),
                    campaign_name: creative.campaign.name.clone(),
                    ads: Vec::new(),
                    ad_count: 0,
                    error_count: 0,
                    total_spend: 0.0,
                    is_campaign_active: false,
                });
                groups.len() - 1
            });

        groups[index].ads.push(audit(creative, policy));
    }

    for group in &mut groups {
        rebuild_stats(group);
    }

    groups
}

/// Recompute a group's derived stats from its current creative set.
pub fn rebuild_stats(group: &mut CampaignGroup) {
    group.ad_count = group.ads.len();
    group.error_count = group.ads.iter().filter(|ad| ad.counts_as_error).count();
    group.total_spend = group
        .ads
        .iter()
        .map(|ad| ad.creative.spend.unwrap_or(0.0))
        .sum();
    group.is_campaign_active = group.ads.iter().any(|ad| ad.creative.is_active);
}
