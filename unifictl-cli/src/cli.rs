use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use unifictl::constants::{envs, naming};
use unifictl::runtime::types::ServerPrefix;
use unifictl::{ControllerManager, ControllerOptions, DockerCli, VersionPins};

use crate::commands::{backup, restore, start, stop};

/// Execution and management for the UniFi Network Controller Docker image
#[derive(Parser, Debug)]
#[command(name = "unifictl", author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalFlags,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the controller container, creating its volumes if needed
    Start(start::StartArgs),

    /// Stop and remove the controller container (volumes are kept)
    Stop(stop::StopArgs),

    /// Archive the controller data volume to a file
    Backup(backup::BackupArgs),

    /// Replace the controller data volume with an archive's contents
    Restore(restore::RestoreArgs),
}

#[derive(Args, Debug, Clone)]
pub struct GlobalFlags {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Docker CLI binary (default: `docker` from PATH)
    #[arg(long, global = true, env = envs::DOCKER_BIN, value_name = "PATH")]
    pub docker_bin: Option<PathBuf>,

    /// Version pins file (default: pins compiled into this binary)
    #[arg(long, global = true, env = envs::VERSION_FILE, value_name = "PATH")]
    pub version_file: Option<PathBuf>,
}

/// `--server-prefix`, shared by every command.
#[derive(Args, Debug, Clone)]
pub struct PrefixArgs {
    /// Prefix for controller container and associated mounted volumes
    #[arg(
        long,
        env = envs::SERVER_PREFIX,
        value_name = "NAME",
        default_value = naming::SERVER_PREFIX_DEFAULT,
        value_parser = parse_prefix,
    )]
    pub server_prefix: ServerPrefix,
}

fn parse_prefix(value: &str) -> Result<ServerPrefix, String> {
    ServerPrefix::new(value).map_err(|e| e.to_string())
}

impl GlobalFlags {
    pub fn load_options(&self) -> anyhow::Result<ControllerOptions> {
        let pins = match &self.version_file {
            Some(path) => VersionPins::load(path)?,
            None => VersionPins::embedded()?,
        };
        tracing::debug!(unifi = %pins.unifi, mongodb = ?pins.mongodb, "Loaded version pins");
        Ok(ControllerOptions::from_pins(&pins))
    }

    pub fn create_manager(&self) -> anyhow::Result<ControllerManager<DockerCli>> {
        let docker = DockerCli::locate(self.docker_bin.clone())?;
        Ok(ControllerManager::new(docker, self.load_options()?))
    }
}
