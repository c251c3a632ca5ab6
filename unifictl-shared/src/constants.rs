//! Fixed names, paths and ports.
//!
//! The controller image expects these exact paths and ports; changing them
//! here without rebuilding the image breaks running installations.

/// Controller image and runtime layout
pub mod controller {
    /// Image repository the controller is published under
    pub const IMAGE_REPOSITORY: &str = "magnetikonline/unifi-network-controller";

    /// Data volume mount point (database, configuration, firmware)
    pub const DATA_DIR: &str = "/usr/lib/unifi/data";

    /// Log volume mount point
    pub const LOGS_DIR: &str = "/usr/lib/unifi/logs";

    /// Device inform / controller communication port
    pub const PORT_COMMS: u16 = 8080;

    /// Management web interface port
    pub const PORT_GUI: u16 = 8443;
}

/// Server prefix and derived resource names
pub mod naming {
    /// Prefix used when none is given
    pub const SERVER_PREFIX_DEFAULT: &str = "unifi-network-controller";

    /// Allowed prefix pattern
    pub const SERVER_PREFIX_PATTERN: &str = r"^[a-zA-Z0-9][a-zA-Z0-9_-]+[a-zA-Z0-9]$";

    pub const CONTAINER_SUFFIX: &str = "-server";
    pub const DATA_VOLUME_SUFFIX: &str = "-data";
    pub const LOG_VOLUME_SUFFIX: &str = "-log";
}

/// Helper container used for backup and restore
pub mod helper {
    pub const IMAGE_REPOSITORY: &str = "alpine";
    pub const IMAGE_TAG: &str = "latest";

    /// Host archive directory bind mount point
    pub const BACKUP_PATH: &str = "/backup";

    /// Data volume mount point
    pub const VOLUME_PATH: &str = "/data";
}

/// Files every controller data backup contains
pub const BACKUP_KEY_FILES: &[&str] = &[
    "./db/version",
    "./db/WiredTiger",
    "./firmware.json",
    "./system.properties",
];

/// Environment variables read by the CLI
pub mod envs {
    pub const DOCKER_BIN: &str = "UNIFICTL_DOCKER";
    pub const VERSION_FILE: &str = "UNIFICTL_VERSION_FILE";
    pub const SERVER_PREFIX: &str = "UNIFICTL_SERVER_PREFIX";
}
