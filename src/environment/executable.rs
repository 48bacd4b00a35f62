//! Executable Lookup
//!
//! Resolves a program name to an absolute path using the `PATH` of an
//! explicit [`Environment`], never the live process environment.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use super::vars::Environment;
use crate::error::{GalaxyError, Result};

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Finds the absolute path of `name`.
///
/// Absolute names are only checked for being executable. Other names are
/// searched in the `PATH` directories of `env`, first match wins.
pub fn find_executable(name: &str, env: &Environment) -> Result<PathBuf> {
    let not_found = || GalaxyError::ExecutableNotFound {
        name: name.to_string(),
        search_path: env.get("PATH").unwrap_or_default().to_string(),
    };

    let candidate = Path::new(name);
    if candidate.is_absolute() {
        return if is_executable(candidate) {
            Ok(candidate.to_path_buf())
        } else {
            Err(not_found())
        };
    }

    let found = env
        .path_entries()
        .into_iter()
        .map(|dir| dir.join(name))
        .find(|p| is_executable(p))
        .ok_or_else(not_found)?;

    debug!("Found tool: {}", found.display());
    Ok(found)
}
