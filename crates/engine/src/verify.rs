// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Post-backup artifact verification: existence, readability, size
//! thresholds, and a structural probe for known archive extensions.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::warn;

pub const DEFAULT_MIN_SIZE_BYTES: u64 = 1024;

/// Verifies a local artifact at `path`. A `None` path (the remote-method
/// case, where no local file is produced) is always successful.
pub fn verify(path: Option<&str>, min_size_bytes: u64) -> bool {
    let Some(path) = path else {
        return true;
    };
    let path = Path::new(path);

    let metadata = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "verification failed: artifact does not exist");
            return false;
        }
    };
    if !metadata.is_file() {
        warn!(path = %path.display(), "verification failed: artifact is not a regular file");
        return false;
    }
    if File::open(path).is_err() {
        warn!(path = %path.display(), "verification failed: artifact is not readable");
        return false;
    }
    let size = metadata.len();
    if size == 0 {
        warn!(path = %path.display(), "verification failed: artifact is empty");
        return false;
    }
    if size < min_size_bytes {
        warn!(path = %path.display(), size, min_size_bytes, "verification failed: artifact below minimum size threshold");
        return false;
    }

    structural_check(path)
}

fn structural_check(path: &Path) -> bool {
    let name = path.to_string_lossy();
    if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        return tar_entries_readable(path, true);
    }
    if name.ends_with(".tar") {
        return tar_entries_readable(path, false);
    }
    if name.ends_with(".gz") {
        return gzip_decompresses(path);
    }
    true
}

fn tar_entries_readable(path: &Path, gzipped: bool) -> bool {
    let Ok(file) = File::open(path) else { return false };
    let result = if gzipped {
        let decoder = flate2::read::GzDecoder::new(file);
        tar::Archive::new(decoder).entries().and_then(|entries| entries.collect::<std::io::Result<Vec<_>>>())
    } else {
        tar::Archive::new(file).entries().and_then(|entries| entries.collect::<std::io::Result<Vec<_>>>())
    };
    match result {
        Ok(_) => true,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "verification failed: archive structure is unreadable");
            false
        }
    }
}

fn gzip_decompresses(path: &Path) -> bool {
    let Ok(file) = File::open(path) else { return false };
    let mut decoder = flate2::read::GzDecoder::new(file);
    let mut sink = Vec::new();
    match decoder.read_to_end(&mut sink) {
        Ok(_) => true,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "verification failed: gzip stream is unreadable");
            false
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn remote_method_with_no_path_verifies_successfully() {
        assert!(verify(None, DEFAULT_MIN_SIZE_BYTES));
    }

    #[test]
    fn missing_file_fails() {
        assert!(!verify(Some("/nonexistent/path/to/archive.tar.gz"), DEFAULT_MIN_SIZE_BYTES));
    }

    #[test]
    fn file_below_threshold_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.tar.gz");
        std::fs::write(&path, b"too small").unwrap();
        assert!(!verify(Some(path.to_str().unwrap()), DEFAULT_MIN_SIZE_BYTES));
    }

    #[test]
    fn non_archive_extension_skips_structural_check() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.bin");
        std::fs::write(&path, vec![0u8; 2048]).unwrap();
        assert!(verify(Some(path.to_str().unwrap()), DEFAULT_MIN_SIZE_BYTES));
    }

    #[test]
    fn well_formed_tar_gz_passes_structural_check() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.tar.gz");
        {
            let file = File::create(&path).unwrap();
            let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
            let mut builder = tar::Builder::new(encoder);
            let mut header = tar::Header::new_gnu();
            let contents = vec![0u8; 2048];
            header.set_size(contents.len() as u64);
            header.set_cksum();
            builder.append_data(&mut header, "manifest.json", contents.as_slice()).unwrap();
            builder.into_inner().unwrap().finish().unwrap();
        }
        assert!(verify(Some(path.to_str().unwrap()), DEFAULT_MIN_SIZE_BYTES));
    }

    #[test]
    fn corrupt_tar_gz_fails_structural_check() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.tar.gz");
        let mut file = File::create(&path).unwrap();
        file.write_all(&vec![1u8; 2048]).unwrap();
        assert!(!verify(Some(path.to_str().unwrap()), DEFAULT_MIN_SIZE_BYTES));
    }
}
