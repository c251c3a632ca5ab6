//! Server prefix and the resource names derived from it.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use unifictl_shared::constants::naming;
use unifictl_shared::errors::{ControllerError, ControllerResult};

static PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(naming::SERVER_PREFIX_PATTERN).expect("server prefix pattern is valid")
});

// ============================================================================
// SERVER PREFIX
// ============================================================================

/// Naming root for every resource unifictl manages.
///
/// Validated on construction, so any `ServerPrefix` in hand produces valid
/// container and volume names.
///
/// ```
/// use unifictl::ServerPrefix;
///
/// let prefix = ServerPrefix::new("test").unwrap();
/// assert_eq!(prefix.names().container, "test-server");
/// assert!(ServerPrefix::new("-bad").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServerPrefix(String);

impl ServerPrefix {
    pub fn new(prefix: impl Into<String>) -> ControllerResult<Self> {
        let prefix = prefix.into();
        if !PREFIX_RE.is_match(&prefix) {
            return Err(ControllerError::InvalidArgument(format!(
                "invalid --server-prefix of [{}], expecting {}",
                prefix,
                naming::SERVER_PREFIX_PATTERN
            )));
        }
        Ok(Self(prefix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Container and volume names for this prefix.
    pub fn names(&self) -> ResourceNames {
        ResourceNames::from(self)
    }
}

impl Default for ServerPrefix {
    fn default() -> Self {
        Self(naming::SERVER_PREFIX_DEFAULT.to_string())
    }
}

impl FromStr for ServerPrefix {
    type Err = ControllerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ServerPrefix {
    type Error = ControllerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ServerPrefix> for String {
    fn from(prefix: ServerPrefix) -> Self {
        prefix.0
    }
}

impl fmt::Display for ServerPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// RESOURCE NAMES
// ============================================================================

/// Platform resource names owned by one server prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceNames {
    /// Controller container (`<prefix>-server`)
    pub container: String,
    /// Data volume (`<prefix>-data`)
    pub data_volume: String,
    /// Log volume (`<prefix>-log`)
    pub log_volume: String,
}

impl From<&ServerPrefix> for ResourceNames {
    fn from(prefix: &ServerPrefix) -> Self {
        Self {
            container: format!("{}{}", prefix, naming::CONTAINER_SUFFIX),
            data_volume: format!("{}{}", prefix, naming::DATA_VOLUME_SUFFIX),
            log_volume: format!("{}{}", prefix, naming::LOG_VOLUME_SUFFIX),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prefix() {
        let prefix = ServerPrefix::default();
        assert_eq!(prefix.as_str(), "unifi-network-controller");
        assert_eq!(prefix.names().container, "unifi-network-controller-server");
    }

    #[test]
    fn test_names_derive_from_prefix() {
        let names = ServerPrefix::new("test").unwrap().names();
        assert_eq!(
            names,
            ResourceNames {
                container: "test-server".into(),
                data_volume: "test-data".into(),
                log_volume: "test-log".into(),
            }
        );
    }

    #[test]
    fn test_valid_prefixes() {
        for prefix in ["abc", "a_b", "lab-01", "Site2", "x-y_z9"] {
            assert!(ServerPrefix::new(prefix).is_ok(), "{prefix} should be valid");
        }
    }

    #[test]
    fn test_invalid_prefixes() {
        // Two characters is below the minimum the pattern allows
        for prefix in ["", "ab", "-abc", "abc-", "_abc", "a b", "a/b", "ctl.1"] {
            let err = ServerPrefix::new(prefix).unwrap_err();
            assert!(
                err.to_string().contains("invalid --server-prefix"),
                "{prefix}: {err}"
            );
        }
    }

    #[test]
    fn test_from_str() {
        let prefix: ServerPrefix = "office".parse().unwrap();
        assert_eq!(prefix.to_string(), "office");
    }
}
