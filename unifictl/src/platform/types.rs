//! Platform resource types.

use serde::Deserialize;
use std::path::PathBuf;

use crate::archive::ArchiveCompression;

// ============================================================================
// QUERY RESULTS
// ============================================================================

/// Locally available image.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ImageInfo {
    #[serde(rename = "Repository")]
    pub repository: String,
    #[serde(rename = "Tag")]
    pub tag: String,
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(rename = "Size", default)]
    pub size: String,
}

impl ImageInfo {
    pub fn reference(&self) -> String {
        format!("{}:{}", self.repository, self.tag)
    }
}

/// Container known to the platform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerInfo {
    pub id: String,
    pub name: String,
    pub image: String,
    /// Platform status text, e.g. `Up 3 hours` or `Exited (0) 2 days ago`.
    pub status: String,
    pub running: bool,
    /// Process exit code for exited containers.
    pub exit_code: Option<i32>,
}

impl ContainerInfo {
    pub fn new(id: String, name: String, image: String, status: String) -> Self {
        let running = status.starts_with("Up ");
        let exit_code = parse_exit_code(&status);
        Self {
            id,
            name,
            image,
            status,
            running,
            exit_code,
        }
    }
}

fn parse_exit_code(status: &str) -> Option<i32> {
    let rest = status.strip_prefix("Exited (")?;
    let end = rest.find(')')?;
    rest[..end].parse().ok()
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct VolumeInfo {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Mountpoint", default)]
    pub mount_point: String,
}

// ============================================================================
// RUN SPECIFICATIONS
// ============================================================================

/// Storage attached to a container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mount {
    /// Named platform volume.
    Volume { source: String, target: String },
    /// Host directory.
    Bind { source: PathBuf, target: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PortMapping {
    pub host: u16,
    pub container: u16,
}

impl PortMapping {
    /// Publish `port` on the same host port.
    pub fn same(port: u16) -> Self {
        Self {
            host: port,
            container: port,
        }
    }
}

/// How the container reaches the network.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NetworkMode {
    /// Share the host network namespace; nothing needs publishing.
    Host,
    /// Private network with the given TCP ports published.
    Published(Vec<PortMapping>),
}

/// Long-running container to start detached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSpec {
    /// `repository:tag`
    pub image: String,
    pub name: String,
    pub mounts: Vec<Mount>,
    pub network: NetworkMode,
    /// Remove the container once it stops.
    pub auto_remove: bool,
}

/// Transfer performed by a helper container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HelperTask {
    /// Write a gzip tar of the whole volume to `file_name` in the host
    /// directory, then hand it to `owner` (uid, gid).
    CreateArchive {
        file_name: String,
        owner: Option<(u32, u32)>,
    },
    /// Unpack `file_name` from the host directory into the volume root.
    ExtractArchive {
        file_name: String,
        compression: ArchiveCompression,
    },
}

/// Short-lived container mounting one volume and one host directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HelperSpec {
    /// `repository:tag`
    pub image: String,
    pub volume: String,
    pub host_dir: PathBuf,
    pub task: HelperTask,
}
