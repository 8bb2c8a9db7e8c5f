//! Recursive tree copy that preserves permission bits and skips symlinks.
//!
//! The copy fails fast: the first I/O error aborts the whole operation and
//! nothing already written is cleaned up. Callers that see an error must treat
//! the destination as partial.
//!
//! Copying onto an existing destination merges into it. Files present on both
//! sides are replaced by the source version, everything else is unioned. The
//! assembler depends on this to lay branch files over shared files.

use super::io_error;
use crate::error::{Result, WorkshopError};
use std::fs::{self, File, Metadata};
use std::io::{self, ErrorKind};
use std::path::Path;

/// Recursively copy the directory `src` to `dst`.
///
/// # Arguments
///
/// * `src` - Source directory; must exist and be a directory
/// * `dst` - Destination directory; created if missing, merged into otherwise
///
/// # Returns
///
/// * `Ok(())` - Every regular file and directory was copied
/// * `Err(WorkshopError::IoError)` - On the first failure
pub fn copy_tree<P: AsRef<Path>, Q: AsRef<Path>>(src: P, dst: Q) -> Result<()> {
    let src = src.as_ref();
    let dst = dst.as_ref();

    let meta = fs::metadata(src).map_err(|e| io_error("read source directory", src, e))?;
    if !meta.is_dir() {
        return Err(WorkshopError::IoError(format!(
            "source '{}' is not a directory",
            src.display()
        )));
    }

    copy_dir(src, dst, &meta)
}

fn copy_dir(src: &Path, dst: &Path, src_meta: &Metadata) -> Result<()> {
    let created = match fs::symlink_metadata(dst) {
        Ok(existing) if existing.is_dir() => false,
        Ok(_) => {
            return Err(WorkshopError::IoError(format!(
                "destination '{}' exists and is not a directory",
                dst.display()
            )));
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            fs::create_dir_all(dst).map_err(|e| io_error("create directory", dst, e))?;
            true
        }
        Err(e) => return Err(io_error("inspect destination", dst, e)),
    };

    let entries = fs::read_dir(src).map_err(|e| io_error("read directory", src, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_error("read directory entry in", src, e))?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        let file_type = entry
            .file_type()
            .map_err(|e| io_error("stat", &src_path, e))?;

        if file_type.is_symlink() {
            continue;
        }

        if file_type.is_dir() {
            let meta = entry.metadata().map_err(|e| io_error("stat", &src_path, e))?;
            copy_dir(&src_path, &dst_path, &meta)?;
        } else if file_type.is_file() {
            copy_file(&src_path, &dst_path)?;
        }
    }

    // Applied last so a read-only source directory does not block its own contents.
    if created {
        fs::set_permissions(dst, src_meta.permissions())
            .map_err(|e| io_error("set permissions on", dst, e))?;
    }

    Ok(())
}

/// Copy a single regular file, replacing any existing file at `dst`.
///
/// Content is synced to disk before the source permission bits are applied.
/// Returns the number of bytes copied.
pub fn copy_file<P: AsRef<Path>, Q: AsRef<Path>>(src: P, dst: Q) -> Result<u64> {
    let src = src.as_ref();
    let dst = dst.as_ref();

    let mut input = File::open(src).map_err(|e| io_error("open", src, e))?;

    // Unlink first: an earlier read-only copy would otherwise refuse the write.
    match fs::symlink_metadata(dst) {
        Ok(existing) if existing.is_dir() => {
            return Err(WorkshopError::IoError(format!(
                "cannot copy '{}': destination '{}' is a directory",
                src.display(),
                dst.display()
            )));
        }
        Ok(_) => fs::remove_file(dst).map_err(|e| io_error("replace", dst, e))?,
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(io_error("inspect destination", dst, e)),
    }

    let mut output = File::create(dst).map_err(|e| io_error("create", dst, e))?;
    let bytes = io::copy(&mut input, &mut output).map_err(|e| io_error("write", dst, e))?;
    output.sync_all().map_err(|e| io_error("sync", dst, e))?;

    let perms = fs::metadata(src)
        .map_err(|e| io_error("stat", src, e))?
        .permissions();
    fs::set_permissions(dst, perms).map_err(|e| io_error("set permissions on", dst, e))?;

    Ok(bytes)
}
