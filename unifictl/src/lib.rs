//! unifictl - orchestration glue for the UniFi Network Controller image.
//!
//! The controller and its database run inside a container built from the
//! repository `Dockerfile`. This crate drives the container platform to
//! start and stop that container and to move the controller's data volume
//! in and out of backup archives.
//!
//! All platform access goes through [`platform::Platform`], so the
//! orchestrators in [`management`] can run against [`platform::DockerCli`]
//! or an in-memory fake.

pub mod archive;
pub mod management;
pub mod platform;
pub mod runtime;

pub use management::{
    BackupReport, ControllerManager, RestoreReport, StartReport, StopOutcome,
};
pub use platform::{DockerCli, Platform};
pub use runtime::options::ControllerOptions;
pub use runtime::types::{ResourceNames, ServerPrefix};
pub use runtime::version::VersionPins;
pub use unifictl_shared::constants;
pub use unifictl_shared::errors::{ControllerError, ControllerResult};
