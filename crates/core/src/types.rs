use serde::{Deserialize, Serialize};

use crate::issues::IssueCode;

/// Advertising platform a creative belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Facebook,
    Google,
    Tiktok,
    Pinterest,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Facebook,
        Platform::Google,
        Platform::Tiktok,
        Platform::Pinterest,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Facebook => "Facebook",
            Platform::Google => "Google",
            Platform::Tiktok => "TikTok",
            Platform::Pinterest => "Pinterest",
        }
    }

    /// Lenient parse from display strings: "Meta Ads" and "FACEBOOK" both
    /// normalize to [`Platform::Facebook`].
    pub fn parse(name: &str) -> Option<Platform> {
        let normalized = name.to_lowercase();
        if normalized.contains("meta") || normalized.contains("facebook") {
            Some(Platform::Facebook)
        } else if normalized.contains("google") {
            Some(Platform::Google)
        } else if normalized.contains("tiktok") {
            Some(Platform::Tiktok)
        } else if normalized.contains("pinterest") {
            Some(Platform::Pinterest)
        } else {
            None
        }
    }
}

/// Account-level tracking configuration. The account carries no id or name
/// on the wire, only its tracking template.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRef {
    #[serde(default)]
    pub track_params: Option<String>,
    #[serde(default)]
    pub suffix: Option<String>,
}

/// One nesting level of a creative: campaign, medium (ad-set/ad-group), or ad.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelRef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub track_params: Option<String>,
    #[serde(default)]
    pub suffix: Option<String>,
}

/// A single advertising creative with its level associations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creative {
    #[serde(default)]
    pub account: AccountRef,
    pub campaign: LevelRef,
    pub medium: LevelRef,
    pub ad: LevelRef,
    #[serde(default)]
    pub link: String,
    #[serde(default, rename = "preview_link")]
    pub preview_link: Option<String>,
    /// `None` means no known spend, distinct from a reported 0.0.
    #[serde(default)]
    pub spend: Option<f64>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub messages: Vec<IssueCode>,
    /// Flat fallback used only when no level-specific string resolves.
    #[serde(default)]
    pub track_params: Option<String>,
}

/// An absent or empty tracking string is never treated as "set".
pub fn param_is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.trim().is_empty())
}

impl Creative {
    /// True when any of the four level-specific tracking fields carries
    /// a non-empty value.
    pub fn has_any_level_params(&self) -> bool {
        param_is_set(&self.ad.track_params)
            || param_is_set(&self.medium.track_params)
            || param_is_set(&self.campaign.track_params)
            || param_is_set(&self.account.track_params)
    }

    pub fn issue_count(&self) -> usize {
        self.messages.len()
    }
}

/// The nesting level a tracking string was resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamLevel {
    Ad,
    Medium,
    Campaign,
    Account,
    /// No level-specific source: either the flat fallback or nothing at all.
    None,
}

impl ParamLevel {
    pub fn display_name(&self) -> &'static str {
        match self {
            ParamLevel::Ad => "Ad",
            ParamLevel::Medium => "Ad Set",
            ParamLevel::Campaign => "Campaign",
            ParamLevel::Account => "Account",
            ParamLevel::None => "None",
        }
    }
}

/// The single tracking-parameter string actually in effect for a creative,
/// together with the level that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveParams {
    pub value: Option<String>,
    pub level: ParamLevel,
}

impl EffectiveParams {
    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }
}

/// Validity classification of a single creative. Exactly one of the three
/// flags holds for any creative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub is_valid: bool,
    pub is_error: bool,
    pub is_warning: bool,
}

/// Which invalid creatives count toward a campaign's authoritative
/// `error_count`.
///
/// `SpendAndActive` additionally requires the ad to be active: an inactive
/// erroring ad costs nothing and is not actionable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCountPolicy {
    SpendOnly,
    #[default]
    SpendAndActive,
}

/// A creative enriched with its derived effective parameters and verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditedCreative {
    #[serde(flatten)]
    pub creative: Creative,
    pub effective: EffectiveParams,
    pub verdict: Verdict,
    /// Whether this creative counts toward the authoritative campaign
    /// `error_count`, per the [`ErrorCountPolicy`] applied at aggregation.
    pub counts_as_error: bool,
}

/// All creatives of one campaign within one platform, with derived stats.
///
/// Groups are recomputed fresh from their creatives whenever the creative
/// set changes; they hold no identity beyond `(platform, campaign_id)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignGroup {
    pub platform: Platform,
    pub campaign_id: String,
    pub campaign_name: String,
    pub ads: Vec<AuditedCreative>,
    pub ad_count: usize,
    pub error_count: usize,
    pub total_spend: f64,
    pub is_campaign_active: bool,
}

/// Per-platform creative lists for one dashboard, as returned by the fetch
/// boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdsConfigsResult {
    #[serde(default)]
    pub facebook: Vec<Creative>,
    #[serde(default)]
    pub google: Vec<Creative>,
    #[serde(default)]
    pub tiktok: Vec<Creative>,
    #[serde(default)]
    pub pinterest: Vec<Creative>,
}

impl AdsConfigsResult {
    /// Platform lists in fixed display order.
    pub fn platform_lists(&self) -> [(Platform, &[Creative]); 4] {
        [
            (Platform::Facebook, self.facebook.as_slice()),
            (Platform::Google, self.google.as_slice()),
            (Platform::Tiktok, self.tiktok.as_slice()),
            (Platform::Pinterest, self.pinterest.as_slice()),
        ]
    }

    pub fn total_ads(&self) -> usize {
        self.facebook.len() + self.google.len() + self.tiktok.len() + self.pinterest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_ads() == 0
    }
}

/// A dashboard/account reference the operator can audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub id: i64,
    pub account_id: i64,
    pub name: String,
    #[serde(default)]
    pub integrations: Vec<String>,
}

/// Explicit session context passed to the fetch boundary. Replaces any
/// ambient global token storage; the engine itself stays stateless.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub account_id: String,
}

impl Session {
    pub fn new(token: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            account_id: account_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_lenient_parse() {
        assert_eq!(Platform::parse("Meta Ads"), Some(Platform::Facebook));
        assert_eq!(Platform::parse("FACEBOOK"), Some(Platform::Facebook));
        assert_eq!(Platform::parse("TikTok"), Some(Platform::Tiktok));
        assert_eq!(Platform::parse("linkedin"), None);
    }

    #[test]
    fn test_empty_param_is_not_set() {
        assert!(!param_is_set(&None));
        assert!(!param_is_set(&Some(String::new())));
        assert!(!param_is_set(&Some("   ".to_string())));
        assert!(param_is_set(&Some("utm_source=x".to_string())));
    }

    #[test]
    fn test_creative_decodes_wire_shape() {
        let json = r#"{
            "account": {"trackParams": "utm_source=acct", "suffix": ""},
            "campaign": {"id": "c1", "name": "Summer Sale", "trackParams": null, "suffix": ""},
            "medium": {"id": "m1", "name": "Mobile 18-35"},
            "ad": {"id": "a1", "name": "Video Ad"},
            "link": "https://example.com/landing",
            "preview_link": "https://example.com/preview",
            "spend": 12.5,
            "isActive": true,
            "messages": ["INCORRECT_UTM_FORMAT"]
        }"#;
        let creative: Creative = serde_json::from_str(json).unwrap();
        assert_eq!(creative.campaign.id, "c1");
        assert_eq!(creative.ad.name, "Video Ad");
        assert_eq!(creative.spend, Some(12.5));
        assert!(creative.is_active);
        assert!(creative.has_any_level_params());
        assert_eq!(creative.messages, vec![crate::IssueCode::IncorrectUtmFormat]);
    }
}
