//! Backup archive inspection.
//!
//! Restore checks the archive on the host before touching the data volume,
//! so a missing or bogus file never costs the operator their current data.

mod verify;

pub use verify::{ArchiveCompression, ArchiveSummary, detect_compression, verify_backup_archive};
