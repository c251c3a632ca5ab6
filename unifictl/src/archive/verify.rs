//! Host-side validation of controller backup archives.

use flate2::read::GzDecoder;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tar::Archive;
use tracing::debug;

use unifictl_shared::constants::BACKUP_KEY_FILES;
use unifictl_shared::errors::{ControllerError, ControllerResult};

/// Compression applied to a tar archive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArchiveCompression {
    Gzip,
    None,
}

/// What verification learned about an archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub compression: ArchiveCompression,
    /// Number of tar entries read.
    pub entries: usize,
}

/// Detect gzip by its magic number (`1f 8b`).
pub fn detect_compression(path: &Path) -> ControllerResult<ArchiveCompression> {
    let file = open(path)?;
    let mut header = Vec::with_capacity(2);
    file.take(2)
        .read_to_end(&mut header)
        .map_err(|e| unreadable(path, e))?;

    Ok(if header == [0x1f, 0x8b] {
        ArchiveCompression::Gzip
    } else {
        ArchiveCompression::None
    })
}

/// Confirm `path` is a readable tar archive holding controller data.
///
/// Every entry in [`BACKUP_KEY_FILES`] must be present. Names are compared
/// relative to the volume root, with or without a leading `./`.
pub fn verify_backup_archive(path: &Path) -> ControllerResult<ArchiveSummary> {
    let compression = detect_compression(path)?;
    debug!(archive = %path.display(), ?compression, "Verifying backup archive");

    let file = open(path)?;
    let reader: Box<dyn Read> = match compression {
        ArchiveCompression::Gzip => Box::new(GzDecoder::new(BufReader::new(file))),
        ArchiveCompression::None => Box::new(BufReader::new(file)),
    };

    let not_tar =
        || ControllerError::Archive(format!("it appears [{}] is not a tar file", path.display()));

    let mut archive = Archive::new(reader);
    let mut found: HashSet<&'static str> = HashSet::new();
    let mut entries = 0;

    for entry in archive.entries().map_err(|_| not_tar())? {
        let entry = entry.map_err(|_| not_tar())?;
        entries += 1;

        let name = entry.path_bytes();
        if let Some(key) = BACKUP_KEY_FILES
            .iter()
            .find(|key| strip_cur_dir(key.as_bytes()) == strip_cur_dir(&name))
        {
            found.insert(*key);
        }
    }

    // An empty stream parses as a tar with no entries
    if entries == 0 {
        return Err(not_tar());
    }

    if found.len() < BACKUP_KEY_FILES.len() {
        let missing: Vec<&str> = BACKUP_KEY_FILES
            .iter()
            .copied()
            .filter(|key| !found.contains(key))
            .collect();
        debug!(?missing, "Backup archive lacks controller files");
        return Err(ControllerError::Archive(format!(
            "archive [{}] doesn't appear to be a controller data backup (missing {})",
            path.display(),
            missing.join(", ")
        )));
    }

    Ok(ArchiveSummary {
        compression,
        entries,
    })
}

fn strip_cur_dir(mut name: &[u8]) -> &[u8] {
    while let Some(rest) = name.strip_prefix(b"./") {
        name = rest;
    }
    name
}

fn open(path: &Path) -> ControllerResult<File> {
    File::open(path).map_err(|e| unreadable(path, e))
}

fn unreadable(path: &Path, e: std::io::Error) -> ControllerError {
    ControllerError::Archive(format!("unable to open archive [{}]: {}", path.display(), e))
}
