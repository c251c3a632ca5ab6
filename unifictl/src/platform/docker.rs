//! [`Platform`] implementation driving the Docker CLI.
//!
//! Every operation is one `docker` invocation. Listings use
//! `--format={{json .}}`, which prints one JSON object per line.

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use super::types::{
    ContainerInfo, HelperSpec, HelperTask, ImageInfo, Mount, NetworkMode, RunSpec, VolumeInfo,
};
use super::Platform;
use crate::archive::ArchiveCompression;
use unifictl_shared::constants::helper;
use unifictl_shared::errors::{ControllerError, ControllerResult};

const FORMAT_JSON: &str = "--format={{json .}}";
const DOCKER_BINARY: &str = "docker";

/// Docker CLI backed platform.
#[derive(Clone, Debug)]
pub struct DockerCli {
    binary: PathBuf,
}

impl DockerCli {
    /// Use an explicit Docker CLI binary.
    pub fn new(binary: impl Into<PathBuf>) -> ControllerResult<Self> {
        let binary = binary.into();
        if !binary.is_file() {
            return Err(ControllerError::PlatformUnavailable(format!(
                "[{}] is not a file",
                binary.display()
            )));
        }
        Ok(Self { binary })
    }

    /// Use `explicit` if given, otherwise search `PATH` for `docker`.
    pub fn locate(explicit: Option<PathBuf>) -> ControllerResult<Self> {
        if let Some(binary) = explicit {
            return Self::new(binary);
        }

        let path = std::env::var_os("PATH").unwrap_or_default();
        let candidates: Vec<PathBuf> = std::env::split_paths(&path)
            .map(|dir| dir.join(DOCKER_BINARY))
            .collect();

        for candidate in &candidates {
            tracing::trace!(candidate = %candidate.display(), "Looking for Docker CLI");
            if candidate.is_file() {
                tracing::debug!(binary = %candidate.display(), "Found Docker CLI");
                return Ok(Self {
                    binary: candidate.clone(),
                });
            }
        }

        Err(ControllerError::PlatformUnavailable(format!(
            "'{}' not found in PATH",
            DOCKER_BINARY
        )))
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Run one docker command, returning stdout on success.
    async fn exec(&self, operation: &str, args: &[String]) -> ControllerResult<String> {
        tracing::debug!(binary = %self.binary.display(), ?args, "Running docker command");

        let output = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ControllerError::platform(operation, e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                output.status.to_string()
            } else {
                stderr
            };
            tracing::debug!(operation, %message, "Docker command failed");
            return Err(ControllerError::platform(operation, message));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl Platform for DockerCli {
    async fn list_images(&self) -> ControllerResult<Vec<ImageInfo>> {
        let stdout = self
            .exec("list images", &args(["images", FORMAT_JSON]))
            .await?;
        parse_json_lines("list images", &stdout)
    }

    async fn pull_image(&self, repository: &str, tag: &str) -> ControllerResult<()> {
        let reference = format!("{}:{}", repository, tag);
        self.exec(
            &format!("pull image [{}]", reference),
            &args(["pull", "--quiet", reference.as_str()]),
        )
        .await?;
        Ok(())
    }

    async fn list_containers(&self) -> ControllerResult<Vec<ContainerInfo>> {
        let stdout = self
            .exec("list containers", &args(["ps", "--all", FORMAT_JSON]))
            .await?;
        let rows: Vec<ContainerRow> = parse_json_lines("list containers", &stdout)?;
        Ok(rows.into_iter().map(ContainerInfo::from).collect())
    }

    async fn list_volumes(&self) -> ControllerResult<Vec<VolumeInfo>> {
        let stdout = self
            .exec("list volumes", &args(["volume", "ls", FORMAT_JSON]))
            .await?;
        parse_json_lines("list volumes", &stdout)
    }

    async fn create_volume(&self, name: &str) -> ControllerResult<()> {
        self.exec(
            &format!("create volume [{}]", name),
            &args(["volume", "create", name]),
        )
        .await?;
        Ok(())
    }

    async fn remove_volume(&self, name: &str) -> ControllerResult<()> {
        self.exec(
            &format!("remove volume [{}]", name),
            &args(["volume", "rm", name]),
        )
        .await?;
        Ok(())
    }

    async fn run_container(&self, spec: &RunSpec) -> ControllerResult<String> {
        let stdout = self
            .exec(
                &format!("run container [{}]", spec.name),
                &run_args(spec),
            )
            .await?;
        Ok(stdout.trim().to_string())
    }

    async fn stop_container(&self, name: &str) -> ControllerResult<()> {
        self.exec(&format!("stop container [{}]", name), &args(["stop", name]))
            .await?;
        Ok(())
    }

    async fn run_ephemeral_container(&self, spec: &HelperSpec) -> ControllerResult<()> {
        self.exec(
            &format!("run helper container for volume [{}]", spec.volume),
            &helper_args(spec),
        )
        .await?;
        Ok(())
    }
}

// ============================================================================
// ARGUMENT RENDERING
// ============================================================================

fn args<const N: usize>(items: [&str; N]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn mount_arg(mount: &Mount) -> String {
    match mount {
        Mount::Volume { source, target } => format!("type=volume,src={},dst={}", source, target),
        Mount::Bind { source, target } => {
            format!("type=bind,src={},dst={}", source.display(), target)
        }
    }
}

/// `docker run` arguments for a detached controller container.
pub(crate) fn run_args(spec: &RunSpec) -> Vec<String> {
    let mut out = args(["run", "--detach"]);

    for mount in &spec.mounts {
        out.push("--mount".into());
        out.push(mount_arg(mount));
    }

    out.push("--name".into());
    out.push(spec.name.clone());

    match &spec.network {
        // Published ports are ignored under host networking, so none are passed
        NetworkMode::Host => {
            out.push("--network".into());
            out.push("host".into());
        }
        NetworkMode::Published(ports) => {
            for port in ports {
                out.push("--publish".into());
                out.push(format!("{}:{}/tcp", port.host, port.container));
            }
        }
    }

    if spec.auto_remove {
        out.push("--rm".into());
    }

    out.push(spec.image.clone());
    out
}

/// `docker run` arguments for a helper container.
pub(crate) fn helper_args(spec: &HelperSpec) -> Vec<String> {
    let mut out = args(["run", "--rm"]);

    out.push("--mount".into());
    out.push(mount_arg(&Mount::Bind {
        source: spec.host_dir.clone(),
        target: helper::BACKUP_PATH.to_string(),
    }));
    out.push("--mount".into());
    out.push(mount_arg(&Mount::Volume {
        source: spec.volume.clone(),
        target: helper::VOLUME_PATH.to_string(),
    }));

    out.push(spec.image.clone());
    out.push("/bin/sh".into());
    out.push("-c".into());
    out.push(helper_command(&spec.task));
    out
}

/// Shell command executed inside the helper container.
pub(crate) fn helper_command(task: &HelperTask) -> String {
    match task {
        HelperTask::CreateArchive { file_name, owner } => {
            let archive = shell_quote(&format!("{}/{}", helper::BACKUP_PATH, file_name));
            let mut cmd = format!(
                "tar c -zf {} -C {} .",
                archive,
                shell_quote(helper::VOLUME_PATH)
            );
            if let Some((uid, gid)) = owner {
                cmd.push_str(&format!(" && chown {}:{} {}", uid, gid, archive));
            }
            cmd
        }
        HelperTask::ExtractArchive {
            file_name,
            compression,
        } => {
            let archive = shell_quote(&format!("{}/{}", helper::BACKUP_PATH, file_name));
            let flags = match compression {
                ArchiveCompression::Gzip => "x -zf",
                ArchiveCompression::None => "x -f",
            };
            format!(
                "cd {} && tar {} {}",
                shell_quote(helper::VOLUME_PATH),
                flags,
                archive
            )
        }
    }
}

/// Single-quote `value` for `/bin/sh`.
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

// ============================================================================
// OUTPUT PARSING
// ============================================================================

#[derive(Debug, Deserialize)]
struct ContainerRow {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Names")]
    names: String,
    #[serde(rename = "Image", default)]
    image: String,
    #[serde(rename = "Status", default)]
    status: String,
}

impl From<ContainerRow> for ContainerInfo {
    fn from(row: ContainerRow) -> Self {
        ContainerInfo::new(row.id, row.names, row.image, row.status)
    }
}

fn parse_json_lines<T: DeserializeOwned>(
    operation: &str,
    stdout: &str,
) -> ControllerResult<Vec<T>> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            serde_json::from_str(line).map_err(|e| {
                ControllerError::platform(operation, format!("unexpected output [{}]: {}", line, e))
            })
        })
        .collect()
}
