//! Small filesystem helpers shared by the stores.

use std::io::{ErrorKind, Write};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StorageError;

/// Read and parse a JSON file. `Ok(None)` when the file does not exist.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StorageError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| StorageError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// Replace `path` with the pretty-printed JSON of `value`.
///
/// The content goes to a temporary file in the same directory which is then
/// renamed over `path`, so readers never observe a partial file. When `path`
/// already exists its permissions (and, on unix, its owner) carry over to the
/// replacement.
pub(crate) fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let mut content = serde_json::to_vec_pretty(value)?;
    content.push(b'\n');

    let write_err = |source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(write_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(&content).map_err(write_err)?;
    if let Some(existing) = existing_metadata(path).map_err(write_err)? {
        tmp.as_file()
            .set_permissions(existing.permissions())
            .map_err(write_err)?;
        keep_owner(tmp.as_file(), &existing, path);
    }
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|err| write_err(err.error))?;
    Ok(())
}

fn existing_metadata(path: &Path) -> std::io::Result<Option<std::fs::Metadata>> {
    match std::fs::metadata(path) {
        Ok(metadata) => Ok(Some(metadata)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

#[cfg(unix)]
fn keep_owner(file: &std::fs::File, existing: &std::fs::Metadata, path: &Path) {
    use std::os::unix::fs::MetadataExt;

    let current = file.metadata().ok();
    let unchanged = current
        .as_ref()
        .is_some_and(|m| m.uid() == existing.uid() && m.gid() == existing.gid());
    if unchanged {
        return;
    }
    if let Err(err) = std::os::unix::fs::fchown(file, Some(existing.uid()), Some(existing.gid())) {
        tracing::warn!(
            path = %path.display(),
            uid = existing.uid(),
            gid = existing.gid(),
            error = %err,
            "could not restore file owner"
        );
    }
}

#[cfg(not(unix))]
fn keep_owner(_file: &std::fs::File, _existing: &std::fs::Metadata, _path: &Path) {}
