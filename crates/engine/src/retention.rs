// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retention sweep: deletes artifacts in a service's backup directory
//! older than its retention window. Only ever touches local or direct
//! artifacts; remote-method backups have nothing on local disk to age out.

use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::warn;
use warden_core::BackupError;

/// Deletes files in `dir` whose modification time is older than
/// `retention_days`. Returns the count of successful deletions;
/// per-file errors (permission denied, concurrent removal) are logged
/// and skipped rather than aborting the sweep. `dry_run` lists
/// candidates but deletes nothing and always returns 0.
pub fn apply(dir: &Path, retention_days: i64, dry_run: bool) -> Result<usize, BackupError> {
    let cutoff = SystemTime::now()
        .checked_sub(Duration::from_secs(retention_days.max(0) as u64 * 86_400))
        .unwrap_or(SystemTime::UNIX_EPOCH);

    let entries = std::fs::read_dir(dir).map_err(|e| BackupError::RetentionListing {
        service: dir.display().to_string(),
        reason: e.to_string(),
    })?;

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| BackupError::RetentionListing { service: dir.display().to_string(), reason: e.to_string() })?;
        let Ok(metadata) = entry.metadata() else { continue };
        if !metadata.is_file() {
            continue;
        }
        let Ok(modified) = metadata.modified() else { continue };
        if modified < cutoff {
            candidates.push(entry.path());
        }
    }
    candidates.sort();

    if dry_run {
        return Ok(0);
    }

    let mut deleted = 0;
    for path in candidates {
        match std::fs::remove_file(&path) {
            Ok(()) => deleted += 1,
            Err(e) => warn!(path = %path.display(), error = %e, "retention: failed to delete expired artifact, skipping"),
        }
    }
    Ok(deleted)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration as StdDuration;

    fn touch_with_age(path: &Path, age: StdDuration) {
        fs::write(path, b"x").unwrap();
        let old_time = SystemTime::now() - age;
        let file = fs::File::open(path).unwrap();
        file.set_modified(old_time).unwrap();
    }

    #[test]
    fn deletes_only_expired_files() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("old.tar.gz");
        let fresh = dir.path().join("fresh.tar.gz");
        touch_with_age(&old, StdDuration::from_secs(40 * 86_400));
        touch_with_age(&fresh, StdDuration::from_secs(1 * 86_400));

        let deleted = apply(dir.path(), 30, false).unwrap();
        assert_eq!(deleted, 1);
        assert!(!old.exists());
        assert!(fresh.exists());
    }

    #[test]
    fn dry_run_deletes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("old.tar.gz");
        touch_with_age(&old, StdDuration::from_secs(40 * 86_400));

        let deleted = apply(dir.path(), 30, true).unwrap();
        assert_eq!(deleted, 0);
        assert!(old.exists());
    }

    #[test]
    fn missing_directory_is_a_listing_error() {
        let err = apply(Path::new("/nonexistent/backup/dir"), 30, false).unwrap_err();
        assert!(matches!(err, BackupError::RetentionListing { .. }));
    }
}
