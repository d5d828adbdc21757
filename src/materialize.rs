//! Directory materializer and listing helpers.
//!
//! `make_dir` never treats an existing directory as success. Callers that
//! want idempotent creation must say so explicitly via [`ensure_dir`].

use log::{debug, trace, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::entities::{DirEntry, Perm};
use crate::error::{Result, SiteError};

fn entry_path(parent: &Path, entry: &DirEntry) -> PathBuf {
    if entry.name.is_empty() {
        parent.to_path_buf()
    } else {
        parent.join(&entry.name)
    }
}

/// Create `parent/entry.name` and apply `entry.perm`.
///
/// Fails with [`SiteError::AlreadyExists`] when the directory is present.
pub fn make_dir(parent: &Path, entry: &DirEntry) -> Result<PathBuf> {
    let path = entry_path(parent, entry);
    fs::create_dir(&path).map_err(|e| SiteError::io(&path, e))?;
    set_perm(&path, entry.perm)?;
    debug!("Created {} ({})", path.display(), entry.perm);
    Ok(path)
}

/// Materialize a whole manifest in order. Stops at the first failure and
/// leaves already created directories in place.
pub fn make_dirs(parent: &Path, entries: &[DirEntry]) -> Result<()> {
    for entry in entries {
        make_dir(parent, entry)?;
    }
    Ok(())
}

/// Like [`make_dir`] but an existing directory is left untouched.
///
/// Returns `true` when the directory was created.
pub fn ensure_dir(parent: &Path, entry: &DirEntry) -> Result<bool> {
    let path = entry_path(parent, entry);
    if path.is_dir() {
        trace!("Exists, skipping {}", path.display());
        return Ok(false);
    }
    make_dir(parent, entry)?;
    Ok(true)
}

#[cfg(unix)]
fn set_perm(path: &Path, perm: Perm) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(perm.mode()))
        .map_err(|e| SiteError::Io {
            path: path.to_path_buf(),
            source: e,
        })
}

// No mode bits on Windows: open group-writable dirs to everyone and let
// setgid dirs pass the grant down to children.
#[cfg(windows)]
fn set_perm(path: &Path, perm: Perm) -> Result<()> {
    use std::process::Command;

    if !perm.group_writable() {
        return Ok(());
    }
    let grant = if perm.inherits() {
        "everyone:(CI)(OI)(F)"
    } else {
        "everyone:(F)"
    };
    let program = PathBuf::from("icacls");
    let output = Command::new(&program)
        .arg(path)
        .arg("/grant")
        .arg(grant)
        .output()
        .map_err(|e| SiteError::Launch {
            program: program.clone(),
            source: e,
        })?;
    if !output.status.success() {
        return Err(SiteError::ProcessFailed {
            program,
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }
    Ok(())
}

#[cfg(not(any(unix, windows)))]
fn set_perm(_path: &Path, _perm: Perm) -> Result<()> {
    Ok(())
}

fn list_entries(dir: &Path, want_dirs: bool) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Err(SiteError::not_found("Directory", dir));
    }
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| SiteError::io(dir, e))? {
        let entry = entry.map_err(|e| SiteError::io(dir, e))?;
        // file_type() does not follow symlinks
        let ft = entry.file_type().map_err(|e| SiteError::io(entry.path(), e))?;
        let keep = if want_dirs { ft.is_dir() } else { ft.is_file() };
        if !keep {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => warn!("Skipping non UTF-8 entry {:?} in {}", raw, dir.display()),
        }
    }
    Ok(names)
}

/// Immediate subdirectory names, in filesystem order
pub fn list_dirs(dir: &Path) -> Result<Vec<String>> {
    list_entries(dir, true)
}

/// Immediate regular file names, in filesystem order
pub fn list_files(dir: &Path) -> Result<Vec<String>> {
    list_entries(dir, false)
}
