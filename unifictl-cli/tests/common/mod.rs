#![allow(dead_code)]

use assert_cmd::Command;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, OnceLock};
use std::time::Duration;
use tempfile::TempDir;

pub const CONTROLLER_IMAGE: &str = "magnetikonline/unifi-network-controller:8.6.9";

// Writing the fake docker script while another test forks can fail with
// ETXTBSY, so tests in one binary run one at a time
static TEST_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Stand-in `docker` binary. Listings are served from JSON-lines files in
/// its directory, every invocation is appended to `calls.log`, and a
/// `fail-<subcommand>` file makes that subcommand exit 1 with the file's
/// contents on stderr.
const FAKE_DOCKER: &str = r#"#!/bin/sh
state="$(dirname "$0")"
printf '%s\n' "$*" >> "$state/calls.log"
if [ -f "$state/fail-$1" ]; then
    cat "$state/fail-$1" >&2
    exit 1
fi
case "$1" in
    images) cat "$state/images.jsonl" 2>/dev/null ;;
    ps) cat "$state/containers.jsonl" 2>/dev/null ;;
    volume)
        case "$2" in
            ls) cat "$state/volumes.jsonl" 2>/dev/null ;;
            *) echo "$3" ;;
        esac
        ;;
    run)
        case " $* " in
            *" --detach "*) echo "4f1c2a9d8e7b" ;;
        esac
        ;;
    stop) echo "$2" ;;
esac
exit 0
"#;

pub struct TestContext {
    pub dir: TempDir,
    pub docker: PathBuf,
    pub version_file: PathBuf,
    // Hold the lock until the test is done
    pub _guard: MutexGuard<'static, ()>,
}

impl TestContext {
    /// `unifictl` wired to the fake docker and a fixed version file.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_unifictl"));
        cmd.timeout(Duration::from_secs(30));
        cmd.env_remove("UNIFICTL_DOCKER")
            .env_remove("UNIFICTL_VERSION_FILE")
            .env_remove("UNIFICTL_SERVER_PREFIX")
            .env_remove("RUST_LOG");
        cmd.arg("--docker-bin").arg(&self.docker);
        cmd.arg("--version-file").arg(&self.version_file);
        cmd
    }

    pub fn with_image(&self, reference: &str) -> &Self {
        let (repository, tag) = reference.rsplit_once(':').unwrap();
        self.append(
            "images.jsonl",
            &format!(
                r#"{{"ID":"sha256:0a1b","Repository":"{}","Size":"512MB","Tag":"{}"}}"#,
                repository, tag
            ),
        );
        self
    }

    pub fn with_container(&self, name: &str, status: &str) -> &Self {
        self.append(
            "containers.jsonl",
            &format!(
                r#"{{"ID":"9e8d7c","Image":"{}","Names":"{}","Status":"{}"}}"#,
                CONTROLLER_IMAGE, name, status
            ),
        );
        self
    }

    pub fn with_volume(&self, name: &str) -> &Self {
        self.append(
            "volumes.jsonl",
            &format!(
                r#"{{"Driver":"local","Mountpoint":"/var/lib/docker/volumes/{0}/_data","Name":"{0}"}}"#,
                name
            ),
        );
        self
    }

    /// Make `docker <subcommand>` fail with `stderr`.
    pub fn fail(&self, subcommand: &str, stderr: &str) -> &Self {
        fs::write(self.dir.path().join(format!("fail-{}", subcommand)), stderr).unwrap();
        self
    }

    /// Arguments of every docker invocation so far, one string per call.
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.dir.path().join("calls.log"))
            .map(|s| s.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn called(&self, prefix: &str) -> bool {
        self.calls().iter().any(|c| c.starts_with(prefix))
    }

    /// Directory for archives, kept apart from the fake docker state.
    pub fn archive_dir(&self) -> PathBuf {
        let dir = self.dir.path().join("archives");
        fs::create_dir_all(&dir).unwrap();
        dir.canonicalize().unwrap()
    }

    fn append(&self, file: &str, line: &str) {
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.dir.path().join(file))
            .unwrap();
        writeln!(f, "{}", line).unwrap();
    }
}

pub fn unifictl() -> TestContext {
    let lock = TEST_LOCK.get_or_init(|| Mutex::new(()));
    let guard = lock.lock().unwrap_or_else(|e| e.into_inner());

    let dir = TempDir::new().expect("Failed to create test dir");

    let docker = dir.path().join("docker");
    {
        let mut f = File::create(&docker).unwrap();
        f.write_all(FAKE_DOCKER.as_bytes()).unwrap();
    }
    fs::set_permissions(&docker, fs::Permissions::from_mode(0o755)).unwrap();

    let version_file = dir.path().join("version");
    fs::write(
        &version_file,
        "UNIFI_VERSION=\"8.6.9\"\nMONGODB_VERSION=\"4.4.29\"\n",
    )
    .unwrap();

    TestContext {
        dir,
        docker,
        version_file,
        _guard: guard,
    }
}

/// Write a gzip tar that passes restore verification.
pub fn write_backup_archive(path: &Path) {
    let out = File::create(path).unwrap();
    let mut builder = tar::Builder::new(GzEncoder::new(out, Compression::default()));
    for (name, data) in [
        ("db/version", "4.4.29\n"),
        ("db/WiredTiger", "WiredTiger\n"),
        ("firmware.json", "{}"),
        ("system.properties", "unifi.https.port=8443\n"),
    ] {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, data.as_bytes())
            .unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap();
}
