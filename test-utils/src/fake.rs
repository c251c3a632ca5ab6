use async_trait::async_trait;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use unifictl::archive::ArchiveCompression;
use unifictl::platform::{
    ContainerInfo, HelperSpec, HelperTask, ImageInfo, Mount, Platform, RunSpec, VolumeInfo,
};
use unifictl_shared::errors::{ControllerError, ControllerResult};

/// Platform call as recorded by [`FakePlatform`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    ListImages,
    PullImage(String),
    ListContainers,
    ListVolumes,
    CreateVolume(String),
    RemoveVolume(String),
    RunContainer(RunSpec),
    StopContainer(String),
    RunEphemeral(HelperSpec),
}

impl Call {
    /// True for calls that change platform state.
    pub fn is_mutating(&self) -> bool {
        !matches!(
            self,
            Call::ListImages | Call::ListContainers | Call::ListVolumes
        )
    }
}

/// Operation that can be made to fail with [`FakePlatform::fail_on`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailPoint {
    PullImage,
    CreateVolume,
    RemoveVolume,
    RunContainer,
    StopContainer,
    RunEphemeral,
}

struct FakeContainer {
    info: ContainerInfo,
    auto_remove: bool,
    volumes: Vec<String>,
}

#[derive(Default)]
struct State {
    images: Vec<ImageInfo>,
    containers: Vec<FakeContainer>,
    volumes: BTreeMap<String, PathBuf>,
    calls: Vec<Call>,
    failures: HashMap<FailPoint, String>,
    next_id: u64,
}

/// In-memory container platform.
pub struct FakePlatform {
    root: TempDir,
    state: Mutex<State>,
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            root: TempDir::new().expect("create fake platform root"),
            state: Mutex::new(State::default()),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Seeding
    // ─────────────────────────────────────────────────────────────────────

    pub fn add_image(&self, repository: &str, tag: &str) {
        self.state.lock().images.push(ImageInfo {
            repository: repository.to_string(),
            tag: tag.to_string(),
            id: format!("sha256:{}{}", repository.len(), tag.len()),
            size: "1MB".to_string(),
        });
    }

    /// Create a volume holding `files` (relative path, contents).
    pub fn add_volume<D: AsRef<[u8]>>(&self, name: &str, files: &[(&str, D)]) -> PathBuf {
        let dir = self.volume_dir(name);
        fs::create_dir_all(&dir).unwrap();
        for (rel, data) in files {
            let path = dir.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, data).unwrap();
        }
        self.state.lock().volumes.insert(name.to_string(), dir.clone());
        dir
    }

    pub fn add_running_container(&self, name: &str) {
        self.insert_container(name, "Up 2 hours", true, Vec::new());
    }

    pub fn add_stopped_container(&self, name: &str) {
        self.insert_container(name, "Exited (143) 3 minutes ago", false, Vec::new());
    }

    /// Make every later call of `point` fail with `message`.
    pub fn fail_on(&self, point: FailPoint, message: &str) {
        self.state.lock().failures.insert(point, message.to_string());
    }

    // ─────────────────────────────────────────────────────────────────────
    // Inspection
    // ─────────────────────────────────────────────────────────────────────

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn mutating_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutating).collect()
    }

    pub fn volume_names(&self) -> Vec<String> {
        self.state.lock().volumes.keys().cloned().collect()
    }

    pub fn has_volume(&self, name: &str) -> bool {
        self.state.lock().volumes.contains_key(name)
    }

    /// Directory backing `name`, if the volume exists.
    pub fn volume_path(&self, name: &str) -> Option<PathBuf> {
        self.state.lock().volumes.get(name).cloned()
    }

    pub fn container(&self, name: &str) -> Option<ContainerInfo> {
        self.state
            .lock()
            .containers
            .iter()
            .find(|c| c.info.name == name)
            .map(|c| c.info.clone())
    }

    pub fn container_count(&self) -> usize {
        self.state.lock().containers.len()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────

    fn volume_dir(&self, name: &str) -> PathBuf {
        self.root.path().join("volumes").join(name)
    }

    fn insert_container(
        &self,
        name: &str,
        status: &str,
        auto_remove: bool,
        volumes: Vec<String>,
    ) -> String {
        let mut state = self.state.lock();
        state.next_id += 1;
        let id = format!("{:012x}", state.next_id);
        state.containers.push(FakeContainer {
            info: ContainerInfo::new(
                id.clone(),
                name.to_string(),
                "fake:latest".to_string(),
                status.to_string(),
            ),
            auto_remove,
            volumes,
        });
        id
    }

    /// Record `call` and return the injected failure for `point`, if any.
    fn record(&self, call: Call, point: Option<(FailPoint, &str)>) -> ControllerResult<()> {
        let mut state = self.state.lock();
        state.calls.push(call);
        if let Some((point, operation)) = point
            && let Some(message) = state.failures.get(&point)
        {
            return Err(ControllerError::platform(operation, message.clone()));
        }
        Ok(())
    }

    fn ensure_volume_dir(&self, name: &str) -> PathBuf {
        let dir = self.volume_dir(name);
        fs::create_dir_all(&dir).unwrap();
        self.state
            .lock()
            .volumes
            .entry(name.to_string())
            .or_insert_with(|| dir.clone());
        dir
    }
}

#[async_trait]
impl Platform for FakePlatform {
    async fn list_images(&self) -> ControllerResult<Vec<ImageInfo>> {
        self.record(Call::ListImages, None)?;
        Ok(self.state.lock().images.clone())
    }

    async fn pull_image(&self, repository: &str, tag: &str) -> ControllerResult<()> {
        let reference = format!("{}:{}", repository, tag);
        self.record(
            Call::PullImage(reference.clone()),
            Some((FailPoint::PullImage, &format!("pull image [{}]", reference))),
        )?;
        self.add_image(repository, tag);
        Ok(())
    }

    async fn list_containers(&self) -> ControllerResult<Vec<ContainerInfo>> {
        self.record(Call::ListContainers, None)?;
        Ok(self
            .state
            .lock()
            .containers
            .iter()
            .map(|c| c.info.clone())
            .collect())
    }

    async fn list_volumes(&self) -> ControllerResult<Vec<VolumeInfo>> {
        self.record(Call::ListVolumes, None)?;
        Ok(self
            .state
            .lock()
            .volumes
            .iter()
            .map(|(name, dir)| VolumeInfo {
                name: name.clone(),
                mount_point: dir.display().to_string(),
            })
            .collect())
    }

    async fn create_volume(&self, name: &str) -> ControllerResult<()> {
        self.record(
            Call::CreateVolume(name.to_string()),
            Some((FailPoint::CreateVolume, &format!("create volume [{}]", name))),
        )?;
        self.ensure_volume_dir(name);
        Ok(())
    }

    async fn remove_volume(&self, name: &str) -> ControllerResult<()> {
        let operation = format!("remove volume [{}]", name);
        self.record(
            Call::RemoveVolume(name.to_string()),
            Some((FailPoint::RemoveVolume, &operation)),
        )?;

        let mut state = self.state.lock();
        let in_use = state
            .containers
            .iter()
            .any(|c| c.volumes.iter().any(|v| v == name));
        if in_use {
            return Err(ControllerError::platform(operation, "volume is in use"));
        }
        let dir = state
            .volumes
            .remove(name)
            .ok_or_else(|| ControllerError::platform(&operation, "no such volume"))?;
        drop(state);

        fs::remove_dir_all(dir)
            .map_err(|e| ControllerError::platform(operation, e.to_string()))?;
        Ok(())
    }

    async fn run_container(&self, spec: &RunSpec) -> ControllerResult<String> {
        let operation = format!("run container [{}]", spec.name);
        self.record(
            Call::RunContainer(spec.clone()),
            Some((FailPoint::RunContainer, &operation)),
        )?;

        if self.container(&spec.name).is_some() {
            return Err(ControllerError::platform(
                operation,
                format!("Conflict. The container name \"/{}\" is already in use", spec.name),
            ));
        }

        // Named volumes are created on first use, as Docker does
        let mut volumes = Vec::new();
        for mount in &spec.mounts {
            if let Mount::Volume { source, .. } = mount {
                self.ensure_volume_dir(source);
                volumes.push(source.clone());
            }
        }

        Ok(self.insert_container(
            &spec.name,
            "Up Less than a second",
            spec.auto_remove,
            volumes,
        ))
    }

    async fn stop_container(&self, name: &str) -> ControllerResult<()> {
        let operation = format!("stop container [{}]", name);
        self.record(
            Call::StopContainer(name.to_string()),
            Some((FailPoint::StopContainer, &operation)),
        )?;

        let mut state = self.state.lock();
        let index = state
            .containers
            .iter()
            .position(|c| c.info.name == name)
            .ok_or_else(|| ControllerError::platform(&operation, "No such container"))?;

        if state.containers[index].auto_remove {
            state.containers.remove(index);
        } else {
            let c = &mut state.containers[index];
            c.info = ContainerInfo::new(
                c.info.id.clone(),
                c.info.name.clone(),
                c.info.image.clone(),
                "Exited (143) Less than a second ago".to_string(),
            );
        }
        Ok(())
    }

    async fn run_ephemeral_container(&self, spec: &HelperSpec) -> ControllerResult<()> {
        let operation = format!("run helper container for volume [{}]", spec.volume);
        self.record(
            Call::RunEphemeral(spec.clone()),
            Some((FailPoint::RunEphemeral, &operation)),
        )?;

        let volume_dir = self.ensure_volume_dir(&spec.volume);
        let result = match &spec.task {
            HelperTask::CreateArchive { file_name, .. } => {
                create_archive(&volume_dir, &spec.host_dir.join(file_name))
            }
            HelperTask::ExtractArchive {
                file_name,
                compression,
            } => extract_archive(&spec.host_dir.join(file_name), *compression, &volume_dir),
        };

        result.map_err(|e| ControllerError::platform(operation, format!("tar: {}", e)))
    }
}

fn create_archive(src: &Path, archive: &Path) -> std::io::Result<()> {
    let out = File::create(archive)?;
    let mut builder = tar::Builder::new(GzEncoder::new(out, Compression::default()));
    builder.follow_symlinks(false);
    builder.append_dir_all(".", src)?;
    builder.into_inner()?.finish()?;
    Ok(())
}

fn extract_archive(
    archive: &Path,
    compression: ArchiveCompression,
    dest: &Path,
) -> std::io::Result<()> {
    let file = BufReader::new(File::open(archive)?);
    let reader: Box<dyn Read> = match compression {
        ArchiveCompression::Gzip => Box::new(GzDecoder::new(file)),
        ArchiveCompression::None => Box::new(file),
    };
    tar::Archive::new(reader).unpack(dest)
}
