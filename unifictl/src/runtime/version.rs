//! Version pins for the controller image.
//!
//! The repository `version` file is the single place the controller and
//! database versions are fixed. The Dockerfile receives both as build args;
//! the CLI uses the controller version as its default image tag.

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

use unifictl_shared::errors::{ControllerError, ControllerResult};

/// `version` file contents at build time.
const EMBEDDED: &str = include_str!("../../../version");

static PIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^([A-Z][A-Z0-9_]*)="([^"]+)""#).expect("version pin pattern is valid")
});

const UNIFI_KEY: &str = "UNIFI_VERSION";
const MONGODB_KEY: &str = "MONGODB_VERSION";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionPins {
    /// Controller version, also the controller image tag
    pub unifi: String,
    /// Database version baked into the image
    pub mongodb: Option<String>,
}

impl VersionPins {
    /// Pins compiled into this binary.
    pub fn embedded() -> ControllerResult<Self> {
        Self::parse(EMBEDDED)
    }

    /// Read pins from a version file on disk.
    pub fn load(path: &Path) -> ControllerResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ControllerError::Config(format!(
                "unable to open version file at [{}]: {}",
                path.display(),
                e
            ))
        })?;

        Self::parse(&content).map_err(|e| match e {
            ControllerError::Config(msg) => {
                ControllerError::Config(format!("{} in [{}]", msg, path.display()))
            }
            other => other,
        })
    }

    /// Parse `KEY="value"` lines. Later definitions override earlier ones;
    /// unknown keys and other lines are ignored.
    pub fn parse(content: &str) -> ControllerResult<Self> {
        let mut unifi = None;
        let mut mongodb = None;

        for line in content.lines() {
            let Some(caps) = PIN_RE.captures(line.trim_end()) else {
                continue;
            };
            let value = caps[2].to_string();
            match &caps[1] {
                UNIFI_KEY => unifi = Some(value),
                MONGODB_KEY => mongodb = Some(value),
                _ => {}
            }
        }

        let unifi = unifi.ok_or_else(|| {
            ControllerError::Config(format!("unable to determine image version ({UNIFI_KEY})"))
        })?;

        Ok(Self { unifi, mongodb })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_embedded_pins_parse() {
        let pins = VersionPins::embedded().unwrap();
        assert!(!pins.unifi.is_empty());
        assert!(pins.mongodb.is_some());
    }

    #[test]
    fn test_last_definition_wins() {
        let pins = VersionPins::parse(
            "UNIFI_VERSION=\"7.5.176\"\n# bump\nUNIFI_VERSION=\"8.0.24\"\nMONGODB_VERSION=\"3.6.23\"\n",
        )
        .unwrap();
        assert_eq!(pins.unifi, "8.0.24");
        assert_eq!(pins.mongodb.as_deref(), Some("3.6.23"));
    }

    #[test]
    fn test_ignores_unrelated_lines() {
        let pins = VersionPins::parse("  UNIFI_VERSION=\"1.0\"\nFOO=\"bar\"\nUNIFI_VERSION=\"2.0\"\n")
            .unwrap();
        // Indented definitions are not pins
        assert_eq!(pins.unifi, "2.0");
        assert_eq!(pins.mongodb, None);
    }

    #[test]
    fn test_missing_controller_version() {
        let err = VersionPins::parse("MONGODB_VERSION=\"4.4.29\"\n").unwrap_err();
        assert!(err.to_string().contains("unable to determine image version"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "UNIFI_VERSION=\"9.0.114\"").unwrap();

        let pins = VersionPins::load(file.path()).unwrap();
        assert_eq!(pins.unifi, "9.0.114");
    }

    #[test]
    fn test_load_missing_file() {
        let err = VersionPins::load(Path::new("/nonexistent/unifictl/version")).unwrap_err();
        assert!(err.to_string().contains("unable to open version file"));
    }
}
