//! Error types for the enlarge controller.

use core::fmt;

/// A host DOM call failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomError {
    /// The DOM operation that failed (`"create_element"`, `"append_child"`, ...).
    pub op: &'static str,
    /// Host-provided detail, usually the stringified JS exception.
    pub detail: String,
}

impl DomError {
    #[must_use]
    pub fn new(op: &'static str, detail: impl Into<String>) -> Self {
        Self {
            op,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.detail.is_empty() {
            write!(f, "dom {} failed", self.op)
        } else {
            write!(f, "dom {} failed: {}", self.op, self.detail)
        }
    }
}

impl std::error::Error for DomError {}

/// Configuration could not be parsed or failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The JSON payload did not parse.
    Parse(String),
    /// An id or class name is not a plain CSS identifier.
    InvalidIdentifier { field: &'static str, value: String },
    /// No key would ever close the overlay.
    NoCloseKeys,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "invalid config: {msg}"),
            Self::InvalidIdentifier { field, value } => {
                write!(f, "invalid {field}: {value:?} is not a css identifier")
            }
            Self::NoCloseKeys => write!(f, "close_keys must not be empty"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Top-level controller error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnlargeError {
    Dom(DomError),
    Config(ConfigError),
}

impl fmt::Display for EnlargeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dom(err) => err.fmt(f),
            Self::Config(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for EnlargeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Dom(err) => Some(err),
            Self::Config(err) => Some(err),
        }
    }
}

impl From<DomError> for EnlargeError {
    fn from(err: DomError) -> Self {
        Self::Dom(err)
    }
}

impl From<ConfigError> for EnlargeError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}
