//! Configuration for unifictl.

use serde::{Deserialize, Serialize};

use crate::runtime::version::VersionPins;
use unifictl_shared::constants::{controller, helper};

/// Options shared by every orchestration operation.
///
/// Nothing here is tied to a server prefix; the prefix is passed to each
/// operation so one set of options can manage several installations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerOptions {
    /// Controller image repository.
    #[serde(default = "default_image_repository")]
    pub image_repository: String,

    /// Controller image tag. Tracks the pinned controller version.
    pub image_tag: String,

    /// Helper image repository used for backup/restore containers.
    #[serde(default = "default_helper_repository")]
    pub helper_repository: String,

    /// Helper image tag.
    #[serde(default = "default_helper_tag")]
    pub helper_tag: String,

    /// Data volume mount point inside the controller container.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Log volume mount point inside the controller container.
    #[serde(default = "default_logs_dir")]
    pub logs_dir: String,

    /// Ports published when host networking is disabled.
    #[serde(default = "default_ports")]
    pub ports: Vec<u16>,
}

impl ControllerOptions {
    /// Options for the controller version in `pins`.
    pub fn from_pins(pins: &VersionPins) -> Self {
        Self {
            image_repository: default_image_repository(),
            image_tag: pins.unifi.clone(),
            helper_repository: default_helper_repository(),
            helper_tag: default_helper_tag(),
            data_dir: default_data_dir(),
            logs_dir: default_logs_dir(),
            ports: default_ports(),
        }
    }

    /// `repository:tag` of the controller image.
    pub fn image_reference(&self) -> String {
        format!("{}:{}", self.image_repository, self.image_tag)
    }

    /// `repository:tag` of the helper image.
    pub fn helper_reference(&self) -> String {
        format!("{}:{}", self.helper_repository, self.helper_tag)
    }
}

fn default_image_repository() -> String {
    controller::IMAGE_REPOSITORY.to_string()
}

fn default_helper_repository() -> String {
    helper::IMAGE_REPOSITORY.to_string()
}

fn default_helper_tag() -> String {
    helper::IMAGE_TAG.to_string()
}

fn default_data_dir() -> String {
    controller::DATA_DIR.to_string()
}

fn default_logs_dir() -> String {
    controller::LOGS_DIR.to_string()
}

fn default_ports() -> Vec<u16> {
    vec![controller::PORT_COMMS, controller::PORT_GUI]
}
