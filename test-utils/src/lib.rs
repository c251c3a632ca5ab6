//! Test support for unifictl.
//!
//! [`FakePlatform`] stands in for the container platform. Volumes are plain
//! directories under a temp dir and helper tasks are executed natively with
//! the `tar` crate, so backup/restore can be exercised end to end without
//! Docker.

mod fake;

pub use fake::{Call, FailPoint, FakePlatform};

use std::collections::BTreeMap;
use std::path::Path;
use walkdir::WalkDir;

/// Relative path → contents for every regular file under `root`.
pub fn snapshot_dir(root: &Path) -> BTreeMap<String, Vec<u8>> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e
                .path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .into_owned();
            let data = std::fs::read(e.path()).unwrap();
            (rel, data)
        })
        .collect()
}

/// Files a controller data volume needs for a restore to accept its backup.
pub fn controller_data_files() -> Vec<(&'static str, Vec<u8>)> {
    vec![
        ("db/version", b"4.4.29\n".to_vec()),
        ("db/WiredTiger", b"WiredTiger\nWiredTiger 10.0.2\n".to_vec()),
        ("db/collection-0-123.wt", (0u8..=255).cycle().take(4096).collect()),
        ("firmware.json", br#"{"cached":[]}"#.to_vec()),
        ("system.properties", b"unifi.http.port=8080\nunifi.https.port=8443\n".to_vec()),
        ("sites/default/config.gateway.json", b"{}".to_vec()),
    ]
}
