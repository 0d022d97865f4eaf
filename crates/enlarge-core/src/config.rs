//! Controller configuration.
//!
//! Every field has a default matching the stock markup (`#image-track`,
//! `.image`), so an empty JSON object is a valid configuration. Keys are
//! camelCase on the wire; unknown keys are ignored so frontends can add their
//! own options next to these.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_TRACK_ID: &str = "image-track";
pub const DEFAULT_IMAGE_CLASS: &str = "image";
pub const DEFAULT_OVERLAY_ID: &str = "enlarge-overlay";
pub const DEFAULT_ENLARGED_CLASS: &str = "is-enlarged";
pub const DEFAULT_BACKDROP: &str = "rgba(0,0,0,0.6)";
pub const DEFAULT_Z_INDEX: i32 = 14_000;
pub const DEFAULT_CURSOR: &str = "zoom-out";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnlargeConfig {
    /// Id of the container whose images can be enlarged.
    pub track_id: String,
    /// Marker class of enlargeable images inside the track.
    pub image_class: String,
    /// Id given to the overlay element.
    pub overlay_id: String,
    /// Class added to the clone shown in the overlay.
    pub enlarged_class: String,
    /// CSS background of the overlay.
    pub backdrop: String,
    pub z_index: i32,
    pub cursor: String,
    /// DOM `KeyboardEvent.key` values that close the overlay.
    pub close_keys: Vec<String>,
    /// Flip the overlay's `aria-hidden` between `"false"` (open) and `"true"`
    /// (closed). Off by default: the overlay stays `aria-hidden="true"`.
    pub sync_aria_hidden: bool,
}

impl Default for EnlargeConfig {
    fn default() -> Self {
        Self {
            track_id: DEFAULT_TRACK_ID.to_string(),
            image_class: DEFAULT_IMAGE_CLASS.to_string(),
            overlay_id: DEFAULT_OVERLAY_ID.to_string(),
            enlarged_class: DEFAULT_ENLARGED_CLASS.to_string(),
            backdrop: DEFAULT_BACKDROP.to_string(),
            z_index: DEFAULT_Z_INDEX,
            cursor: DEFAULT_CURSOR.to_string(),
            close_keys: vec!["Escape".to_string(), "Esc".to_string()],
            sync_aria_hidden: false,
        }
    }
}

impl EnlargeConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that ids and classes are usable in selectors and that at least
    /// one close key exists.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("track_id", &self.track_id),
            ("image_class", &self.image_class),
            ("overlay_id", &self.overlay_id),
            ("enlarged_class", &self.enlarged_class),
        ] {
            if !is_css_identifier(value) {
                return Err(ConfigError::InvalidIdentifier {
                    field,
                    value: value.clone(),
                });
            }
        }
        if self.close_keys.iter().all(|key| key.is_empty()) {
            return Err(ConfigError::NoCloseKeys);
        }
        Ok(())
    }

    /// Whether a `KeyboardEvent.key` value should close the overlay.
    #[must_use]
    pub fn is_close_key(&self, key: &str) -> bool {
        !key.is_empty() && self.close_keys.iter().any(|k| k == key)
    }

    /// Inline style applied to the overlay at creation, in application order.
    #[must_use]
    pub fn overlay_style(&self) -> [(&'static str, String); 6] {
        [
            ("position", "fixed".to_string()),
            ("inset", "0".to_string()),
            ("background", self.backdrop.clone()),
            ("display", "none".to_string()),
            ("z-index", self.z_index.to_string()),
            ("cursor", self.cursor.clone()),
        ]
    }
}

/// `[A-Za-z_-][A-Za-z0-9_-]*`, the subset that never needs selector escaping.
fn is_css_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_' || first == '-') {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
