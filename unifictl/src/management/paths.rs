//! Host-side archive locations.

use std::path::{Path, PathBuf};

use unifictl_shared::errors::{ControllerError, ControllerResult};

/// Archive file split into the directory bind-mounted into the helper
/// container and the file name inside it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchivePath {
    /// Canonical, existing directory.
    pub dir: PathBuf,
    pub file_name: String,
}

impl ArchivePath {
    /// Resolve `path` against the current directory.
    ///
    /// An existing file is resolved through any symlinks to the real file,
    /// since only its directory is visible to the helper container. A file
    /// that does not exist yet (a new backup) only needs an existing
    /// directory.
    pub fn resolve(path: &Path) -> ControllerResult<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| no_file_name(path))?;

        match path.canonicalize() {
            Ok(real) => Self::from_existing(path, &real),
            // Dangling symlinks would be followed inside the container
            Err(_) if path.symlink_metadata().is_ok() => Err(ControllerError::InvalidArgument(
                format!("file path [{}] is a broken symlink", path.display()),
            )),
            Err(_) => {
                let parent = match path.parent() {
                    Some(p) if !p.as_os_str().is_empty() => p,
                    _ => Path::new("."),
                };

                let dir = parent.canonicalize().map_err(|_| invalid_dir(path))?;
                if !dir.is_dir() {
                    return Err(invalid_dir(path));
                }

                Ok(Self {
                    dir,
                    file_name: file_name.to_string(),
                })
            }
        }
    }

    fn from_existing(path: &Path, real: &Path) -> ControllerResult<Self> {
        if real.is_dir() {
            return Err(ControllerError::InvalidArgument(format!(
                "file path [{}] is a directory",
                path.display()
            )));
        }

        let file_name = real
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| no_file_name(path))?
            .to_string();
        let dir = real.parent().ok_or_else(|| invalid_dir(path))?.to_path_buf();

        if real != path {
            tracing::debug!(
                path = %path.display(),
                real = %real.display(),
                "Resolved archive path"
            );
        }
        Ok(Self { dir, file_name })
    }

    /// Full host path of the archive.
    pub fn full_path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

fn invalid_dir(path: &Path) -> ControllerError {
    ControllerError::InvalidArgument(format!(
        "file path [{}] not a valid directory",
        path.display()
    ))
}

fn no_file_name(path: &Path) -> ControllerError {
    ControllerError::InvalidArgument(format!(
        "file path [{}] has no valid file name",
        path.display()
    ))
}
