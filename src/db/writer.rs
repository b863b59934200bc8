use std::{
    fs, io,
    io::Write,
    path::Path,
};

use log::info;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::UpdateError;

/// Serialize `data` as pretty json (2 space indent), to be written at `path`.
pub fn to_json_bytes<T: Serialize + ?Sized>(data: &T, path: &Path) -> Result<Vec<u8>, UpdateError> {
    let mut bytes = serde_json::to_vec_pretty(data)
        .map_err(|e| UpdateError::persistence(path, io::Error::from(e)))?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Replace the file at `path` with `bytes`.  The content goes to a temporary
/// file in the same directory first, a failed write leaves the old file as is.
pub fn write_atomic(bytes: &[u8], path: &Path) -> Result<(), UpdateError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| UpdateError::persistence(dir, e))?;
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| UpdateError::persistence(path, e))?;
    tmp.write_all(bytes)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| UpdateError::persistence(path, e))?;
    // temp files are created owner-only
    #[cfg(unix)]
    tmp.as_file()
        .set_permissions(target_permissions(path))
        .map_err(|e| UpdateError::persistence(path, e))?;
    tmp.persist(path)
        .map_err(|e| UpdateError::persistence(path, e.error))?;
    info!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Keep the mode of the file being replaced, 0644 for a new file.
#[cfg(unix)]
fn target_permissions(path: &Path) -> fs::Permissions {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|m| m.permissions())
        .unwrap_or_else(|_| fs::Permissions::from_mode(0o644))
}

pub fn write_json<T: Serialize + ?Sized>(data: &T, path: &Path) -> Result<(), UpdateError> {
    write_atomic(&to_json_bytes(data, path)?, path)
}

/// Delete the file if it exists.  Returns `true` if a file was removed.
pub fn remove_file_if_exists(path: &Path) -> Result<bool, UpdateError> {
    match fs::remove_file(path) {
        Ok(()) => {
            info!("Removed {}", path.display());
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(UpdateError::persistence(path, e)),
    }
}
