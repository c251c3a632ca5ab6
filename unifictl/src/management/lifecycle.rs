//! Start and stop of the controller container.

use super::ControllerManager;
use crate::platform::{Mount, NetworkMode, Platform, PortMapping, RunSpec};
use crate::runtime::types::ServerPrefix;
use unifictl_shared::errors::{ControllerError, ControllerResult};

/// Result of a successful `start`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StartReport {
    pub container: String,
    /// Platform-assigned container id.
    pub container_id: String,
    /// `repository:tag` the container runs.
    pub image: String,
    /// Volumes that did not exist before this start.
    pub created_volumes: Vec<String>,
    /// Set when the controller image had to be pulled.
    pub pulled_image: Option<String>,
}

/// Result of `stop`. Both variants are successes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped { container: String },
    /// Nothing was running under the prefix.
    NotRunning { container: String },
}

impl<P: Platform> ControllerManager<P> {
    /// Launch the controller for `prefix`.
    ///
    /// Creates the data and log volumes if needed, then runs the controller
    /// image detached and auto-removed. With `host_network` the container
    /// joins the host network namespace; otherwise the controller ports are
    /// published.
    ///
    /// Fails before any volume or container is created if a container with
    /// the controller name already exists.
    pub async fn start(
        &self,
        prefix: &ServerPrefix,
        host_network: bool,
    ) -> ControllerResult<StartReport> {
        let names = prefix.names();
        let image = self.options.image_reference();

        if let Some(existing) = self.platform.find_container(&names.container).await? {
            return Err(if existing.running {
                ControllerError::AlreadyRunning(names.container)
            } else {
                ControllerError::AlreadyExists(names.container)
            });
        }

        let pulled_image = self
            .ensure_image(&self.options.image_repository, &self.options.image_tag)
            .await?;

        let existing = self.volume_names().await?;
        let mut created_volumes = Vec::new();
        for volume in [&names.data_volume, &names.log_volume] {
            if self.ensure_volume(volume, &existing).await? {
                created_volumes.push(volume.clone());
            }
        }

        let network = if host_network {
            NetworkMode::Host
        } else {
            NetworkMode::Published(
                self.options
                    .ports
                    .iter()
                    .copied()
                    .map(PortMapping::same)
                    .collect(),
            )
        };

        let spec = RunSpec {
            image: image.clone(),
            name: names.container.clone(),
            mounts: vec![
                Mount::Volume {
                    source: names.data_volume.clone(),
                    target: self.options.data_dir.clone(),
                },
                Mount::Volume {
                    source: names.log_volume.clone(),
                    target: self.options.logs_dir.clone(),
                },
            ],
            network,
            auto_remove: true,
        };

        tracing::info!(container = %names.container, %image, host_network, "Starting controller");
        let container_id = self.platform.run_container(&spec).await?;
        tracing::info!(container = %names.container, %container_id, "Controller started");

        Ok(StartReport {
            container: names.container,
            container_id,
            image,
            created_volumes,
            pulled_image,
        })
    }

    /// Stop (and thereby remove) the controller for `prefix`.
    ///
    /// Volumes are left in place. Stopping when nothing is running is not
    /// an error.
    ///
    /// Removal happens in the platform after the container exits and is not
    /// awaited here, so a `start` issued immediately afterwards can still find
    /// the exiting container and fail with
    /// [`ControllerError::AlreadyExists`].
    pub async fn stop(&self, prefix: &ServerPrefix) -> ControllerResult<StopOutcome> {
        let container = prefix.names().container;

        match self.platform.find_container(&container).await? {
            Some(info) if info.running => {}
            _ => {
                tracing::info!(%container, "Controller not running, nothing to stop");
                return Ok(StopOutcome::NotRunning { container });
            }
        }

        tracing::info!(%container, "Stopping controller");
        self.platform.stop_container(&container).await?;
        Ok(StopOutcome::Stopped { container })
    }
}
