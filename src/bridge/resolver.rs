// src/bridge/resolver.rs

//! Turn a configured interpreter identifier into an absolute executable path.

use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{BridgeError, Result};
use crate::fs::FileSystem;

/// Resolve `identifier` to an existing executable file.
///
/// Order:
/// 1. blank identifier fails;
/// 2. an absolute/rooted path succeeds iff the file exists;
/// 3. a path relative to `cwd` succeeds if that file exists;
/// 4. each directory of `path_var` is searched in order, with the platform
///    executable suffix appended when missing;
/// 5. otherwise the lookup fails.
///
/// The only side effects are the existence checks made through `fs`.
pub fn resolve_executable(
    fs: &dyn FileSystem,
    identifier: &str,
    cwd: &Path,
    path_var: Option<&OsStr>,
) -> Result<PathBuf> {
    let identifier = identifier.trim();
    if identifier.is_empty() {
        return Err(BridgeError::ExecutableNotFound(
            "interpreter is not configured".to_string(),
        ));
    }

    let candidate = Path::new(identifier);
    if candidate.is_absolute() || candidate.has_root() {
        if fs.is_file(candidate) {
            return Ok(candidate.to_path_buf());
        }
        return Err(BridgeError::ExecutableNotFound(format!(
            "{} does not exist",
            candidate.display()
        )));
    }

    let relative = cwd.join(candidate);
    if fs.is_file(&relative) {
        debug!(path = %relative.display(), "resolved interpreter relative to cwd");
        return Ok(relative);
    }

    let file_name = with_exe_suffix(identifier, env::consts::EXE_SUFFIX);
    if let Some(path_var) = path_var {
        for dir in env::split_paths(path_var) {
            if dir.as_os_str().is_empty() {
                continue;
            }
            let full = dir.join(&file_name);
            if fs.is_file(&full) {
                debug!(path = %full.display(), "resolved interpreter on PATH");
                return Ok(full);
            }
        }
    }

    Err(BridgeError::ExecutableNotFound(format!(
        "'{}' was not found in the working directory or on PATH",
        identifier
    )))
}

/// Append `suffix` (e.g. `.exe`) unless the name already ends with it.
fn with_exe_suffix(name: &str, suffix: &str) -> String {
    if suffix.is_empty() || name.to_ascii_lowercase().ends_with(&suffix.to_ascii_lowercase()) {
        name.to_string()
    } else {
        format!("{name}{suffix}")
    }
}

