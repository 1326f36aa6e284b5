use crate::error::{Result, RewriteError};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read a whole report into memory.
pub fn read_report(path: &Path) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            debug!("Read {} bytes from {}", content.len(), path.display());
            Ok(content)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Err(RewriteError::NotFound {
            path: path.to_path_buf(),
        }),
        Err(source) => Err(RewriteError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Write `contents` to `path`, replacing what is there.
///
/// With `atomic`, the data goes to a sibling temp file that is then renamed over
/// the report, so an interrupted write never leaves a truncated report behind.
/// Symlinks are followed so the link target is what gets replaced, and an
/// existing report keeps its permission bits. A read-only report is refused.
pub fn write_report(path: &Path, contents: &str, atomic: bool) -> Result<()> {
    let write_err = |source: std::io::Error| RewriteError::Write {
        path: path.to_path_buf(),
        source,
    };

    if !atomic {
        std::fs::write(path, contents).map_err(write_err)?;
        debug!("Wrote {} bytes to {}", contents.len(), path.display());
        return Ok(());
    }

    let target = match std::fs::canonicalize(path) {
        Ok(resolved) => resolved,
        Err(e) if e.kind() == ErrorKind::NotFound => path.to_path_buf(),
        Err(e) => return Err(write_err(e)),
    };
    let permissions = match std::fs::metadata(&target) {
        Ok(meta) => Some(meta.permissions()),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => return Err(write_err(e)),
    };
    if permissions.as_ref().is_some_and(|p| p.readonly()) {
        return Err(write_err(std::io::Error::new(
            ErrorKind::PermissionDenied,
            "report is read-only",
        )));
    }

    let tmp_path = temp_path_for(&target);
    let staged = write_and_sync(&tmp_path, contents).and_then(|()| match permissions {
        Some(p) => std::fs::set_permissions(&tmp_path, p),
        None => Ok(()),
    });
    if let Err(e) = staged.and_then(|()| std::fs::rename(&tmp_path, &target)) {
        std::fs::remove_file(&tmp_path).ok();
        return Err(write_err(e));
    }
    debug!(
        "Wrote {} bytes to {} via {}",
        contents.len(),
        target.display(),
        tmp_path.display()
    );
    Ok(())
}

/// Temp file next to `path` (same directory, so rename stays on one filesystem):
/// `.{file_name}.{uuid}.tmp`
fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "lcov".to_string());
    let tmp_name = format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4());
    match path.parent() {
        Some(parent) => parent.join(tmp_name),
        None => PathBuf::from(tmp_name),
    }
}

fn write_and_sync(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()
}
