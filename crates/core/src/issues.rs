//! Closed taxonomy of UTM configuration issues reported against a creative.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single validation issue code carried in a creative's `messages` list.
///
/// The set is closed, but payloads from newer platform revisions may carry
/// codes this build does not know about; those are preserved verbatim in
/// [`IssueCode::Other`] so decoding never fails.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IssueCode {
    /// The dedicated tracking field is absent or empty at every level.
    MissingUtmField,
    /// A tracking string is present but does not match the required pattern.
    IncorrectUtmFormat,
    /// Tracking parameters are embedded in the destination URL instead of
    /// the dedicated field.
    UtmInLinkUrl,
    /// Tracking set at campaign level, higher than recommended.
    CampaignWithTrackingParams,
    /// Tracking set at ad-group level, higher than recommended.
    AdgroupWithTrackingParams,
    Other(String),
}

impl IssueCode {
    /// Wire representation of the code.
    pub fn code(&self) -> &str {
        match self {
            IssueCode::MissingUtmField => "MISSING_UTM_FIELD",
            IssueCode::IncorrectUtmFormat => "INCORRECT_UTM_FORMAT",
            IssueCode::UtmInLinkUrl => "UTM_IN_LINK_URL",
            IssueCode::CampaignWithTrackingParams => "CAMPAIGN_WITH_TRACKING_PARAMS",
            IssueCode::AdgroupWithTrackingParams => "ADGROUP_WITH_TRACKING_PARAMS",
            IssueCode::Other(code) => code,
        }
    }

    /// Short human-readable title for reports.
    pub fn title(&self) -> &str {
        match self {
            IssueCode::MissingUtmField => "Missing UTM Field",
            IssueCode::IncorrectUtmFormat => "Incorrect UTM Format",
            IssueCode::UtmInLinkUrl => "UTM in Link URL",
            IssueCode::CampaignWithTrackingParams => "Campaign-Level Tracking Params",
            IssueCode::AdgroupWithTrackingParams => "Ad-Group-Level Tracking Params",
            IssueCode::Other(_) => "Unknown Issue",
        }
    }

    /// One-line description shown next to the title.
    pub fn description(&self) -> &str {
        match self {
            IssueCode::MissingUtmField => "The url_tags field is absent or empty",
            IssueCode::IncorrectUtmFormat => "UTM parameters do not match the required pattern",
            IssueCode::UtmInLinkUrl => {
                "UTM parameters found in destination URL (should be in url_tags)"
            }
            IssueCode::CampaignWithTrackingParams => {
                "Tracking parameters configured at campaign level instead of account level"
            }
            IssueCode::AdgroupWithTrackingParams => {
                "Tracking parameters configured at ad-group level instead of account level"
            }
            IssueCode::Other(_) => "Unrecognized validation issue",
        }
    }

    /// Advisory codes flag tracking configured at a higher level than
    /// recommended. They still count toward invalidity when present.
    pub fn is_advisory(&self) -> bool {
        matches!(
            self,
            IssueCode::CampaignWithTrackingParams | IssueCode::AdgroupWithTrackingParams
        )
    }
}

impl From<String> for IssueCode {
    fn from(code: String) -> Self {
        match code.as_str() {
            "MISSING_UTM_FIELD" => IssueCode::MissingUtmField,
            "INCORRECT_UTM_FORMAT" => IssueCode::IncorrectUtmFormat,
            "UTM_IN_LINK_URL" => IssueCode::UtmInLinkUrl,
            "CAMPAIGN_WITH_TRACKING_PARAMS" => IssueCode::CampaignWithTrackingParams,
            "ADGROUP_WITH_TRACKING_PARAMS" => IssueCode::AdgroupWithTrackingParams,
            _ => IssueCode::Other(code),
        }
    }
}

impl From<IssueCode> for String {
    fn from(code: IssueCode) -> Self {
        code.code().to_string()
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
