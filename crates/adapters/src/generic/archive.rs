// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Staging-directory-then-archive-then-cleanup helpers shared by the
//! docker, systemd, and generic backup paths.

use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Creates a fresh, empty staging directory beside `destination_path`.
pub fn create_staging_dir(destination_path: &Path) -> io::Result<PathBuf> {
    let parent = destination_path.parent().unwrap_or_else(|| Path::new("."));
    let stem = destination_path.file_stem().and_then(|s| s.to_str()).unwrap_or("staging");
    let staging = parent.join(format!(".{stem}.staging"));
    if staging.exists() {
        fs::remove_dir_all(&staging)?;
    }
    fs::create_dir_all(&staging)?;
    Ok(staging)
}

/// Recursively copies `src` into `dst`, preserving symlinks rather than
/// following them.
pub fn copy_recursive(src: &Path, dst: &Path) -> io::Result<()> {
    if src.is_symlink() {
        let target = fs::read_link(src)?;
        #[cfg(unix)]
        std::os::unix::fs::symlink(target, dst)?;
        #[cfg(not(unix))]
        fs::copy(src, dst)?;
        return Ok(());
    }
    if src.is_dir() {
        fs::create_dir_all(dst)?;
        for entry in fs::read_dir(src)? {
            let entry = entry?;
            copy_recursive(&entry.path(), &dst.join(entry.file_name()))?;
        }
    } else {
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(src, dst)?;
    }
    Ok(())
}

/// Archives the contents of `staging_dir` into a gzipped tarball at
/// `destination_path`, with the staging directory's basename as the
/// archive's top-level directory.
pub fn archive(staging_dir: &Path, destination_path: &Path) -> io::Result<()> {
    if let Some(parent) = destination_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::File::create(destination_path)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.append_dir_all(".", staging_dir)?;
    builder.into_inner()?.finish()?;
    Ok(())
}

/// Removes the staging directory unconditionally, logging but not
/// failing on error — cleanup never aborts an otherwise successful
/// backup.
pub fn cleanup(staging_dir: &Path) {
    if let Err(e) = fs::remove_dir_all(staging_dir) {
        tracing::warn!(dir = %staging_dir.display(), error = %e, "failed to remove staging directory");
    }
}
