//! Options accepted by `EnlargeViewer.mount`.
//!
//! The JS object is the controller configuration plus a frontend-only
//! `logLevel`, e.g. `{ trackId: "gallery", logLevel: "debug" }`.

use enlarge_core::{ConfigError, EnlargeConfig};
use serde::Deserialize;

/// Console verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MountOptions {
    #[serde(default)]
    pub log_level: LogLevel,
    #[serde(flatten)]
    pub config: EnlargeConfig,
}

impl MountOptions {
    /// Parse the stringified options object; `None` means all defaults.
    pub fn from_json(json: Option<&str>) -> Result<Self, ConfigError> {
        let options = match json.map(str::trim) {
            None | Some("") | Some("null") | Some("undefined") => Self::default(),
            Some(json) => {
                serde_json::from_str(json).map_err(|err| ConfigError::Parse(err.to_string()))?
            }
        };
        options.config.validate()?;
        Ok(options)
    }
}
