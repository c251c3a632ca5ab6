//! Lifecycle and backup orchestration.
//!
//! [`ControllerManager`] sequences platform calls for the four operator
//! commands. It holds no per-installation state: each operation takes the
//! server prefix it acts on.

mod backup;
mod lifecycle;
mod paths;

pub use backup::{BackupReport, RestoreReport};
pub use lifecycle::{StartReport, StopOutcome};
pub use paths::ArchivePath;

use crate::platform::Platform;
use crate::runtime::options::ControllerOptions;
use unifictl_shared::errors::{ControllerError, ControllerResult};

/// Orchestrates the controller container and its volumes on a platform.
pub struct ControllerManager<P: Platform> {
    platform: P,
    options: ControllerOptions,
}

impl<P: Platform> ControllerManager<P> {
    pub fn new(platform: P, options: ControllerOptions) -> Self {
        Self { platform, options }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    /// Pull `repository:tag` unless it is already local.
    ///
    /// Returns the reference when a pull happened.
    async fn ensure_image(&self, repository: &str, tag: &str) -> ControllerResult<Option<String>> {
        if self.platform.image_exists(repository, tag).await? {
            return Ok(None);
        }

        let reference = format!("{}:{}", repository, tag);
        tracing::info!(image = %reference, "Image not available locally, pulling");
        self.platform.pull_image(repository, tag).await?;
        Ok(Some(reference))
    }

    /// Create `name` unless it is in `existing`. Returns true if created.
    async fn ensure_volume(&self, name: &str, existing: &[String]) -> ControllerResult<bool> {
        if existing.iter().any(|v| v == name) {
            return Ok(false);
        }

        self.platform.create_volume(name).await?;
        tracing::info!(volume = name, "Created volume");
        Ok(true)
    }

    async fn volume_names(&self) -> ControllerResult<Vec<String>> {
        Ok(self
            .platform
            .list_volumes()
            .await?
            .into_iter()
            .map(|v| v.name)
            .collect())
    }
}

/// Wrap a failure that happened after the previous data volume was removed.
fn restore_incomplete(volume: &str, err: ControllerError) -> ControllerError {
    ControllerError::RestoreIncomplete {
        volume: volume.to_string(),
        reason: err.to_string(),
    }
}
