//! Level-priority resolution of the effective tracking-parameter string.

use utm_core::types::{param_is_set, Creative, EffectiveParams, ParamLevel};

/// Resolve which tracking-parameter string is in effect for a creative.
///
/// The four level-specific fields are examined in strict priority order:
/// ad first, then medium, campaign, and account; the first non-empty one
/// wins. Values at lower-priority levels stay on the creative for display
/// but never contribute. When no level carries a string, the flat
/// `trackParams` fallback is used with level [`ParamLevel::None`], since its
/// source level is ambiguous. Absence is a valid output, not a failure.
pub fn resolve(creative: &Creative) -> EffectiveParams {
    let candidates = [
        (ParamLevel::Ad, &creative.ad.track_params),
        (ParamLevel::Medium, &creative.medium.track_params),
        (ParamLevel::Campaign, &creative.campaign.track_params),
        (ParamLevel::Account, &creative.account.track_params),
        (ParamLevel::None, &creative.track_params),
    ];

    for (level, value) in candidates {
        if param_is_set(value) {
            return EffectiveParams {
                value: value.clone(),
                level,
            };
        }
    }

    EffectiveParams {
        value: None,
        level: ParamLevel::None,
    }
}
