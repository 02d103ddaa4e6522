//! Wire payload decoding for per-platform creative lists.

use serde::Deserialize;
use utm_core::types::{AdsConfigsResult, Creative};

/// One platform's slice of a dashboard document.
///
/// Early payload revisions ship a bare creative list; later revisions wrap
/// it in an object that also carries the dashboard's recommended template.
/// Both forms must be accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PlatformPayload {
    Wrapped {
        #[serde(rename = "recommendedUtms")]
        recommended_utms: String,
        configs: Vec<Creative>,
    },
    List(Vec<Creative>),
}

impl PlatformPayload {
    pub fn recommended_utms(&self) -> Option<&str> {
        match self {
            PlatformPayload::Wrapped {
                recommended_utms, ..
            } if !recommended_utms.trim().is_empty() => Some(recommended_utms),
            _ => None,
        }
    }

    pub fn into_configs(self) -> Vec<Creative> {
        match self {
            PlatformPayload::Wrapped { configs, .. } => configs,
            PlatformPayload::List(configs) => configs,
        }
    }
}

/// A full dashboard document as fetched from the validation endpoint.
/// Missing platforms decode as absent rather than failing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardPayload {
    #[serde(default)]
    pub facebook: Option<PlatformPayload>,
    #[serde(default)]
    pub google: Option<PlatformPayload>,
    #[serde(default)]
    pub tiktok: Option<PlatformPayload>,
    #[serde(default)]
    pub pinterest: Option<PlatformPayload>,
}

impl DashboardPayload {
    /// Normalize both wire shapes into plain per-platform lists, surfacing
    /// the first recommended template any platform carries.
    pub fn normalize(self) -> (AdsConfigsResult, Option<String>) {
        let recommended = [
            self.facebook.as_ref(),
            self.google.as_ref(),
            self.tiktok.as_ref(),
            self.pinterest.as_ref(),
        ]
        .into_iter()
        .flatten()
        .find_map(|payload| payload.recommended_utms().map(str::to_string));

        let configs = AdsConfigsResult {
            facebook: self.facebook.map(PlatformPayload::into_configs).unwrap_or_default(),
            google: self.google.map(PlatformPayload::into_configs).unwrap_or_default(),
            tiktok: self.tiktok.map(PlatformPayload::into_configs).unwrap_or_default(),
            pinterest: self.pinterest.map(PlatformPayload::into_configs).unwrap_or_default(),
        };

        (configs, recommended)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CREATIVE: &str = r#"{
        "campaign": {"id": "c1", "name": "Summer"},
        "medium": {"id": "m1", "name": "Mobile"},
        "ad": {"id": "a1", "name": "Video", "trackParams": "utm_source=x"},
        "link": "https://example.com",
        "isActive": true,
        "messages": []
    }"#;

    #[test]
    fn test_bare_list_shape_decodes() {
        let json = format!(r#"{{"facebook": [{CREATIVE}], "google": []}}"#);
        let payload: DashboardPayload = serde_json::from_str(&json).unwrap();
        let (configs, recommended) = payload.normalize();

        assert_eq!(configs.facebook.len(), 1);
        assert_eq!(configs.facebook[0].ad.id, "a1");
        assert!(configs.google.is_empty());
        assert!(configs.tiktok.is_empty());
        assert_eq!(recommended, None);
    }

    #[test]
    fn test_wrapped_shape_decodes_with_recommended_utms() {
        let json = format!(
            r#"{{"facebook": {{"recommendedUtms": "utm_source=facebook", "configs": [{CREATIVE}]}}}}"#
        );
        let payload: DashboardPayload = serde_json::from_str(&json).unwrap();
        let (configs, recommended) = payload.normalize();

        assert_eq!(configs.facebook.len(), 1);
        assert_eq!(recommended.as_deref(), Some("utm_source=facebook"));
    }

    #[test]
    fn test_mixed_shapes_across_platforms() {
        let json = format!(
            r#"{{
                "facebook": [{CREATIVE}],
                "tiktok": {{"recommendedUtms": "utm_source=tiktok", "configs": []}}
            }}"#
        );
        let payload: DashboardPayload = serde_json::from_str(&json).unwrap();
        let (configs, recommended) = payload.normalize();

        assert_eq!(configs.facebook.len(), 1);
        assert!(configs.tiktok.is_empty());
        assert_eq!(recommended.as_deref(), Some("utm_source=tiktok"));
    }

    #[test]
    fn test_empty_recommended_utms_is_ignored() {
        let json = r#"{"google": {"recommendedUtms": "  ", "configs": []}}"#;
        let payload: DashboardPayload = serde_json::from_str(json).unwrap();
        let (_, recommended) = payload.normalize();
        assert_eq!(recommended, None);
    }
}
