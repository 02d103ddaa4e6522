//! Validity classification of individual creatives.

use serde::{Deserialize, Serialize};
use utm_core::types::{Creative, EffectiveParams, ErrorCountPolicy, ParamLevel, Verdict};

/// Classify a creative from its reported issue list and spend.
///
/// An empty issue list is authoritative: the creative is valid regardless of
/// whether any level carries a parameter. An invalid creative is an error
/// when it has known spend greater than zero, and a warning otherwise.
/// Exactly one of the three flags holds.
pub fn classify(creative: &Creative) -> Verdict {
    let is_valid = creative.messages.is_empty();
    let is_error = !is_valid && creative.spend.unwrap_or(0.0) > 0.0;
    let is_warning = !is_valid && !is_error;

    Verdict {
        is_valid,
        is_error,
        is_warning,
    }
}

/// Whether a creative counts toward the authoritative campaign `error_count`.
///
/// Active/inactive status never affects the [`Verdict`] itself, only this
/// roll-up check, per the configured policy.
pub fn counts_as_error(creative: &Creative, verdict: Verdict, policy: ErrorCountPolicy) -> bool {
    match policy {
        ErrorCountPolicy::SpendOnly => verdict.is_error,
        ErrorCountPolicy::SpendAndActive => verdict.is_error && creative.is_active,
    }
}

/// Advisory note recommending the tracking template be moved to account
/// level. Not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelAdvisory {
    pub level: ParamLevel,
    pub message: String,
}

/// Surface a recommendation when a valid creative resolves its tracking
/// string anywhere other than account level.
pub fn level_recommendation(
    effective: &EffectiveParams,
    verdict: Verdict,
) -> Option<LevelAdvisory> {
    if !verdict.is_valid || effective.level == ParamLevel::Account {
        return None;
    }

    Some(LevelAdvisory {
        level: effective.level,
        message: format!(
            "Tracking parameters resolve at {} level; set the template at Account level for consistency",
            effective.level.display_name()
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::resolve;
    use utm_core::IssueCode;

    fn invalid_creative(spend: Option<f64>, is_active: bool) -> Creative {
        Creative {
            messages: vec![IssueCode::MissingUtmField],
            spend,
            is_active,
            ..Creative::default()
        }
    }

    // 1. Verdict rules ----------------------------------------------------

    #[test]
    fn test_no_issues_is_valid_even_without_params() {
        let verdict = classify(&Creative::default());
        assert!(verdict.is_valid);
        assert!(!verdict.is_error);
        assert!(!verdict.is_warning);
    }

    #[test]
    fn test_invalid_with_spend_is_error() {
        let verdict = classify(&invalid_creative(Some(50.0), true));
        assert!(!verdict.is_valid);
        assert!(verdict.is_error);
        assert!(!verdict.is_warning);
    }

    #[test]
    fn test_invalid_without_spend_is_warning() {
        for spend in [None, Some(0.0)] {
            let verdict = classify(&invalid_creative(spend, true));
            assert!(!verdict.is_valid);
            assert!(!verdict.is_error);
            assert!(verdict.is_warning);
        }
    }

    #[test]
    fn test_exactly_one_flag_holds() {
        let cases = [
            Creative::default(),
            invalid_creative(Some(10.0), true),
            invalid_creative(None, false),
        ];
        for creative in cases {
            let v = classify(&creative);
            let set = [v.is_valid, v.is_error, v.is_warning]
                .iter()
                .filter(|flag| **flag)
                .count();
            assert_eq!(set, 1);
        }
    }

    // 2. Roll-up policy ---------------------------------------------------

    #[test]
    fn test_inactive_error_excluded_under_spend_and_active() {
        let creative = invalid_creative(Some(25.0), false);
        let verdict = classify(&creative);
        assert!(verdict.is_error);

        assert!(counts_as_error(
            &creative,
            verdict,
            ErrorCountPolicy::SpendOnly
        ));
        assert!(!counts_as_error(
            &creative,
            verdict,
            ErrorCountPolicy::SpendAndActive
        ));
    }

    // 3. Level advisory ---------------------------------------------------

    #[test]
    fn test_advisory_for_valid_ad_level_params() {
        let mut creative = Creative::default();
        creative.ad.track_params = Some("utm_source=x".to_string());
        let effective = resolve(&creative);
        let verdict = classify(&creative);

        let advisory = level_recommendation(&effective, verdict).unwrap();
        assert_eq!(advisory.level, ParamLevel::Ad);
    }

    #[test]
    fn test_no_advisory_at_account_level_or_when_invalid() {
        let mut creative = Creative::default();
        creative.account.track_params = Some("utm_source=x".to_string());
        let effective = resolve(&creative);
        assert_eq!(level_recommendation(&effective, classify(&creative)), None);

        let invalid = invalid_creative(Some(1.0), true);
        let effective = resolve(&invalid);
        assert_eq!(level_recommendation(&effective, classify(&invalid)), None);
    }
}
