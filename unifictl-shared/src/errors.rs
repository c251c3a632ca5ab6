//! Error types shared by the orchestration library and the CLI.
//!
//! Errors are grouped by how an operator recovers from them:
//! - platform failures: the container platform rejected a command
//! - precondition failures: nothing was changed, fix the situation and rerun
//! - archive failures: the backup file is unusable
//! - [`ControllerError::RestoreIncomplete`]: a restore destroyed the previous
//!   data volume and then failed, so the volume needs manual attention

use thiserror::Error;

/// Result alias used throughout unifictl.
pub type ControllerResult<T> = Result<T, ControllerError>;

#[derive(Debug, Error)]
pub enum ControllerError {
    /// The container platform CLI could not be located or executed.
    #[error("unable to find Docker CLI: {0}")]
    PlatformUnavailable(String),

    /// A platform command exited unsuccessfully. `message` is the
    /// platform's own stderr output.
    #[error("unable to {operation}: {message}")]
    Platform { operation: String, message: String },

    /// `start` found the controller container already running.
    #[error("container [{0}] already running")]
    AlreadyRunning(String),

    /// `start` found a stopped container holding the controller name.
    #[error(
        "container [{0}] already exists (not running), remove it before starting \
         (a just-stopped controller may still be being removed, retry shortly)"
    )]
    AlreadyExists(String),

    /// `restore` requires the data volume to be out of use.
    #[error(
        "container [{0}] currently running, associated data volume must not be in use for restore"
    )]
    ContainerRunning(String),

    /// A volume required by the operation does not exist.
    #[error("data volume [{0}] does not exist")]
    VolumeNotFound(String),

    /// The backup archive is unreadable, not a tar file, or not a
    /// controller data backup.
    #[error("{0}")]
    Archive(String),

    /// Restore failed after the previous data volume was deleted.
    #[error(
        "restore of data volume [{volume}] failed after the previous volume was removed; \
         the volume may be empty or partially restored and previous contents are lost: {reason}"
    )]
    RestoreIncomplete { volume: String, reason: String },

    /// Bad user input (server prefix, file paths).
    #[error("{0}")]
    InvalidArgument(String),

    /// Version pins or options could not be loaded.
    #[error("config: {0}")]
    Config(String),
}

impl ControllerError {
    /// Build a [`ControllerError::Platform`] from an operation label and
    /// the platform's error output.
    pub fn platform(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Platform {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// True for failures detected before any mutating platform call.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::AlreadyRunning(_)
                | Self::AlreadyExists(_)
                | Self::ContainerRunning(_)
                | Self::VolumeNotFound(_)
                | Self::InvalidArgument(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_message_is_verbatim() {
        let err = ControllerError::platform("create volume [x-data]", "permission denied");
        assert_eq!(
            err.to_string(),
            "unable to create volume [x-data]: permission denied"
        );
    }

    #[test]
    fn test_restore_incomplete_mentions_lost_contents() {
        let err = ControllerError::RestoreIncomplete {
            volume: "test-data".into(),
            reason: "tar: short read".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("test-data"));
        assert!(msg.contains("previous contents are lost"));
        assert!(msg.contains("tar: short read"));
    }

    #[test]
    fn test_already_exists_hints_at_pending_removal() {
        let msg = ControllerError::AlreadyExists("test-server".into()).to_string();
        assert!(msg.contains("container [test-server] already exists"));
        assert!(msg.contains("retry shortly"));
    }

    #[test]
    fn test_precondition_classification() {
        assert!(ControllerError::AlreadyRunning("a-server".into()).is_precondition());
        assert!(ControllerError::VolumeNotFound("a-data".into()).is_precondition());
        assert!(!ControllerError::Archive("bad".into()).is_precondition());
        assert!(!ControllerError::platform("stop", "boom").is_precondition());
    }
}
