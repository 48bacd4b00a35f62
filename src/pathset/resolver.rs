//! Path Resolution
//!
//! Turns the raw strings users type into fully qualified [`UriRef`]s.
//!
//! In [`ResolveMode::Default`] a path without a scheme is placed on the
//! default filesystem, which is discovered the first time it is needed by
//! listing the filesystem root. In [`ResolveMode::Local`] everything is forced
//! onto `file://` and the filesystem is never contacted.

use std::path::{Path, PathBuf};

use log::debug;
use once_cell::unsync::OnceCell;

use super::uri::{absolutize, split_uri, UriRef, FILE_SCHEME};
use crate::error::{GalaxyError, Result};
use crate::filesystem::FileSystem;

/// How raw paths without a scheme are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    /// Relative to the default (usually distributed) filesystem.
    Default,
    /// Forced onto the local filesystem.
    Local,
}

/// Resolves raw path strings against a filesystem.
pub struct PathResolver<'a> {
    fs: &'a dyn FileSystem,
    local_dir: PathBuf,
    default_fs: OnceCell<UriRef>,
}

impl<'a> PathResolver<'a> {
    /// `local_dir` is the directory relative local paths are resolved
    /// against, normally the process working directory.
    pub fn new(fs: &'a dyn FileSystem, local_dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            local_dir: local_dir.into(),
            default_fs: OnceCell::new(),
        }
    }

    /// Resolves `raw` under `mode`.
    ///
    /// # Example
    ///
    /// ```
    /// use hadoop_galaxy::filesystem::{LocalFs, RoutingFs};
    /// use hadoop_galaxy::pathset::{PathResolver, ResolveMode};
    ///
    /// let fs = RoutingFs::local_only(LocalFs::new("/"));
    /// let resolver = PathResolver::new(&fs, "/home/galaxy");
    ///
    /// let uri = resolver.resolve(ResolveMode::Local, "data/reads").unwrap();
    /// assert_eq!(uri.to_string(), "file:///home/galaxy/data/reads");
    /// ```
    pub fn resolve(&self, mode: ResolveMode, raw: &str) -> Result<UriRef> {
        let parts = split_uri(raw.trim());
        if parts.path.is_empty() {
            return Err(GalaxyError::invalid_path(raw, "blank path"));
        }

        match mode {
            ResolveMode::Default => {
                if !parts.scheme.is_empty() {
                    return UriRef::new(parts.scheme, parts.host, parts.path);
                }
                // rejects a host without a scheme
                UriRef::new("", parts.host, parts.path.as_str())?;

                let default_fs = self.default_fs()?;
                let working_dir = self.fs.working_dir()?;
                let absolute = absolutize(Path::new(&parts.path), Path::new(&working_dir));
                let qualified = format!(
                    "{}://{}{}",
                    default_fs.scheme().unwrap_or(FILE_SCHEME),
                    default_fs.host().unwrap_or(""),
                    absolute.display()
                );
                debug!("Resolved {} to {}", raw, qualified);
                UriRef::parse(&qualified)
            }
            ResolveMode::Local => {
                if !parts.scheme.is_empty() && parts.scheme != FILE_SCHEME {
                    return Err(GalaxyError::invalid_path(
                        raw,
                        format!("{} URIs cannot be used with a local path", parts.scheme),
                    ));
                }
                let validated = UriRef::new(parts.scheme, parts.host, parts.path)?;
                UriRef::local(absolutize(Path::new(validated.path()), &self.local_dir))
            }
        }
    }

    /// Scheme and host of the default filesystem, taken from the first entry
    /// of the root listing.
    fn default_fs(&self) -> Result<&UriRef> {
        self.default_fs.get_or_try_init(|| {
            let entries = self.fs.root_entries()?;
            let first = entries.into_iter().next().ok_or_else(|| {
                GalaxyError::Configuration(
                    "Cannot determine the default filesystem: the root listing is empty".to_string(),
                )
            })?;
            debug!("Default filesystem: {}://{}", first.scheme().unwrap_or(""), first.host().unwrap_or(""));
            Ok(first)
        })
    }
}
