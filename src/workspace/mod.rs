//! Scratch files: one private, uniquely named file per execution.
//!
//! A [`ScratchUnit`] is created by [`acquire`] and removed either by an
//! explicit [`ScratchUnit::release`] or, on any other exit path (early
//! return, panic, a dropped future), by its `Drop` impl. Removal failures
//! are logged and never reach the caller.

use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::errors::ExecError;

const MAX_STEM_LEN: usize = 64;

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Caller-owned input for one execution.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionRequest<'a> {
    pub source_text: &'a str,
    /// Only used to name the scratch file.
    pub execution_id: &'a str,
}

#[derive(Debug)]
pub struct ScratchUnit {
    path: PathBuf,
    created_at: DateTime<Utc>,
    released: bool,
}

impl ScratchUnit {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Directory the interpreter runs in.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    pub fn release(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("removed scratch file {}", self.path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("scratch file {} already gone", self.path.display())
            }
            Err(e) => warn!(
                "failed to remove scratch file {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

impl Drop for ScratchUnit {
    fn drop(&mut self) {
        self.remove();
    }
}

/// Materialize `request.source_text` under `root` as a fresh file.
pub fn acquire(
    root: &Path,
    extension: &str,
    request: &ExecutionRequest<'_>,
) -> Result<ScratchUnit, ExecError> {
    fs::create_dir_all(root).map_err(|e| ExecError::storage(root, e))?;
    // Absolute, since the interpreter runs with the root as its working directory
    let root = fs::canonicalize(root).map_err(|e| ExecError::storage(root, e))?;

    let created_at = Utc::now();
    let path = root.join(scratch_name(request.execution_id, created_at, extension));

    // create_new: a name clash is reported, never silently overwritten
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .map_err(|e| ExecError::storage(&path, e))?;

    // From here on the unit owns the file, so a failed write still removes it
    let unit = ScratchUnit {
        path,
        created_at,
        released: false,
    };
    file.write_all(request.source_text.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|e| ExecError::storage(&unit.path, e))?;

    debug!("created scratch file {}", unit.path.display());
    Ok(unit)
}

fn scratch_name(id: &str, at: DateTime<Utc>, extension: &str) -> String {
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let stem = sanitize(id);
    if extension.is_empty() {
        format!("{}-{}-{}", stem, at.timestamp_millis(), seq)
    } else {
        format!("{}-{}-{}.{}", stem, at.timestamp_millis(), seq, extension)
    }
}

fn sanitize(id: &str) -> String {
    let stem: String = id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_STEM_LEN)
        .collect();
    if stem.is_empty() {
        "script".into()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request<'a>(id: &'a str, source: &'a str) -> ExecutionRequest<'a> {
        ExecutionRequest {
            source_text: source,
            execution_id: id,
        }
    }

    #[test]
    fn acquire_writes_source_under_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("scratch");
        let unit = acquire(&root, "py", &request("hello", "print('hi')\n")).unwrap();
        let root = fs::canonicalize(&root).unwrap();

        assert!(unit.path().starts_with(&root));
        assert_eq!(unit.dir(), root.as_path());
        assert_eq!(unit.path().extension().unwrap(), "py");
        assert_eq!(fs::read_to_string(unit.path()).unwrap(), "print('hi')\n");
        unit.release();
        assert_eq!(fs::read_dir(&root).unwrap().count(), 0);
    }

    #[test]
    fn same_id_never_collides() {
        let dir = tempfile::tempdir().unwrap();
        let a = acquire(dir.path(), "py", &request("same", "1")).unwrap();
        let b = acquire(dir.path(), "py", &request("same", "2")).unwrap();
        assert_ne!(a.path(), b.path());
        assert_eq!(fs::read_to_string(a.path()).unwrap(), "1");
        assert_eq!(fs::read_to_string(b.path()).unwrap(), "2");
    }

    #[test]
    fn drop_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = {
            let unit = acquire(dir.path(), "sh", &request("x", "exit 0")).unwrap();
            unit.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn release_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let unit = acquire(dir.path(), "py", &request("gone", "")).unwrap();
        fs::remove_file(unit.path()).unwrap();
        unit.release();
    }

    #[test]
    fn unwritable_root_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "not a dir").unwrap();
        let err = acquire(&blocker.join("scratch"), "py", &request("a", "")).unwrap_err();
        assert!(matches!(err, ExecError::Storage { .. }));
    }

    #[test]
    fn ids_are_sanitized() {
        assert_eq!(sanitize("../etc/passwd"), "___etc_passwd");
        assert_eq!(sanitize(""), "script");
        assert_eq!(sanitize(&"a".repeat(200)).len(), MAX_STEM_LEN);
        let name = scratch_name("job 1", Utc::now(), "");
        assert!(name.starts_with("job_1-"));
        assert!(!name.contains('.'));
    }
}
