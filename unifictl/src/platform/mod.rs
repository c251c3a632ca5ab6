//! Container platform abstraction.
//!
//! Orchestration code only talks to [`Platform`]. [`DockerCli`] drives the
//! real Docker CLI; tests substitute an in-memory implementation.

mod docker;
pub mod types;

pub use docker::DockerCli;
pub use types::{
    ContainerInfo, HelperSpec, HelperTask, ImageInfo, Mount, NetworkMode, PortMapping, RunSpec,
    VolumeInfo,
};

use async_trait::async_trait;
use unifictl_shared::errors::ControllerResult;

/// Narrow interface over the container platform.
///
/// Every method blocks (asynchronously) until the platform command has
/// finished. Implementations report failures as
/// [`ControllerError::Platform`](unifictl_shared::ControllerError::Platform)
/// carrying the platform's own message.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Images available locally.
    async fn list_images(&self) -> ControllerResult<Vec<ImageInfo>>;

    async fn pull_image(&self, repository: &str, tag: &str) -> ControllerResult<()>;

    /// All containers, running or not.
    async fn list_containers(&self) -> ControllerResult<Vec<ContainerInfo>>;

    async fn list_volumes(&self) -> ControllerResult<Vec<VolumeInfo>>;

    async fn create_volume(&self, name: &str) -> ControllerResult<()>;

    async fn remove_volume(&self, name: &str) -> ControllerResult<()>;

    /// Start a detached container, returning its id.
    async fn run_container(&self, spec: &RunSpec) -> ControllerResult<String>;

    /// Stop a container. Containers started with `auto_remove` are removed
    /// by the platform once stopped.
    async fn stop_container(&self, name: &str) -> ControllerResult<()>;

    /// Run a helper task in a short-lived container and wait for it to
    /// exit. The container is removed whether the task succeeds or fails.
    async fn run_ephemeral_container(&self, spec: &HelperSpec) -> ControllerResult<()>;

    /// Look up a container by exact name.
    async fn find_container(&self, name: &str) -> ControllerResult<Option<ContainerInfo>> {
        Ok(self
            .list_containers()
            .await?
            .into_iter()
            .find(|c| c.name == name))
    }

    async fn volume_exists(&self, name: &str) -> ControllerResult<bool> {
        Ok(self.list_volumes().await?.iter().any(|v| v.name == name))
    }

    async fn image_exists(&self, repository: &str, tag: &str) -> ControllerResult<bool> {
        Ok(self
            .list_images()
            .await?
            .iter()
            .any(|i| i.repository == repository && i.tag == tag))
    }
}
