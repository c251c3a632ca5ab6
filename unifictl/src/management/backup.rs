//! Backup and restore of the controller data volume.
//!
//! Both directions run a helper container that mounts the data volume and
//! the archive's host directory. Backups of a running controller are live
//! filesystem snapshots; no attempt is made to quiesce the database.

use nix::unistd::{getgid, getuid};
use std::path::{Path, PathBuf};

use super::paths::ArchivePath;
use super::{ControllerManager, restore_incomplete};
use crate::archive::verify_backup_archive;
use crate::platform::{HelperSpec, HelperTask, Platform};
use crate::runtime::types::ServerPrefix;
use unifictl_shared::errors::{ControllerError, ControllerResult};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackupReport {
    pub volume: String,
    pub archive: PathBuf,
    pub pulled_image: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RestoreReport {
    pub volume: String,
    pub archive: PathBuf,
    /// An existing data volume was deleted before restoring.
    pub removed_previous: bool,
    pub pulled_image: Option<String>,
}

impl<P: Platform> ControllerManager<P> {
    /// Write a gzip tar of the data volume for `prefix` to `destination`.
    ///
    /// The archive is chowned to the invoking user. An existing file at
    /// `destination` is overwritten.
    pub async fn backup(
        &self,
        prefix: &ServerPrefix,
        destination: &Path,
    ) -> ControllerResult<BackupReport> {
        let archive = ArchivePath::resolve(destination)?;
        let volume = prefix.names().data_volume;

        if !self.platform.volume_exists(&volume).await? {
            return Err(ControllerError::VolumeNotFound(volume));
        }

        let pulled_image = self
            .ensure_image(&self.options.helper_repository, &self.options.helper_tag)
            .await?;

        let spec = HelperSpec {
            image: self.options.helper_reference(),
            volume: volume.clone(),
            host_dir: archive.dir.clone(),
            task: HelperTask::CreateArchive {
                file_name: archive.file_name.clone(),
                owner: Some((getuid().as_raw(), getgid().as_raw())),
            },
        };

        tracing::info!(%volume, archive = %archive.full_path().display(), "Backing up data volume");
        self.platform.run_ephemeral_container(&spec).await?;

        Ok(BackupReport {
            volume,
            archive: archive.full_path(),
            pulled_image,
        })
    }

    /// Replace the data volume for `prefix` with the contents of `source`.
    ///
    /// The archive is verified on the host first; if it is missing or not a
    /// controller backup nothing is touched. The controller must not be
    /// running. Once the previous volume has been removed any failure is
    /// reported as [`ControllerError::RestoreIncomplete`].
    pub async fn restore(
        &self,
        prefix: &ServerPrefix,
        source: &Path,
    ) -> ControllerResult<RestoreReport> {
        let archive = ArchivePath::resolve(source)?;
        let summary = verify_backup_archive(&archive.full_path())?;
        tracing::debug!(
            archive = %archive.full_path().display(),
            entries = summary.entries,
            compression = ?summary.compression,
            "Backup archive verified"
        );
        let names = prefix.names();

        if let Some(container) = self.platform.find_container(&names.container).await?
            && container.running
        {
            return Err(ControllerError::ContainerRunning(names.container));
        }

        // Pull before anything is deleted so a registry failure costs nothing
        let pulled_image = self
            .ensure_image(&self.options.helper_repository, &self.options.helper_tag)
            .await?;

        let volume = names.data_volume;
        let removed_previous = self.platform.volume_exists(&volume).await?;
        if removed_previous {
            tracing::warn!(%volume, "Removing existing data volume for restore");
            self.platform.remove_volume(&volume).await?;
        }

        let restore = async {
            self.platform.create_volume(&volume).await?;
            tracing::info!(%volume, "Created volume");

            let spec = HelperSpec {
                image: self.options.helper_reference(),
                volume: volume.clone(),
                host_dir: archive.dir.clone(),
                task: HelperTask::ExtractArchive {
                    file_name: archive.file_name.clone(),
                    compression: summary.compression,
                },
            };

            tracing::info!(
                %volume,
                archive = %archive.full_path().display(),
                "Restoring data volume"
            );
            self.platform.run_ephemeral_container(&spec).await
        };

        if let Err(e) = restore.await {
            if removed_previous {
                return Err(restore_incomplete(&volume, e));
            }
            return Err(e);
        }

        Ok(RestoreReport {
            volume,
            archive: archive.full_path(),
            removed_previous,
            pulled_image,
        })
    }
}
