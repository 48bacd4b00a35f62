//! Scheme-Based Routing
//!
//! [`RoutingFs`] sends `file://` URIs to the native local implementation and
//! everything else to the distributed filesystem, when one is configured.

use std::io::{self, Write};

use super::{FileSystem, LocalFs};
use crate::error::{GalaxyError, Result};
use crate::pathset::UriRef;

/// Dispatches filesystem calls by URI scheme.
pub struct RoutingFs {
    local: LocalFs,
    distributed: Option<Box<dyn FileSystem>>,
}

impl RoutingFs {
    /// A router that can only reach local files.
    pub fn local_only(local: LocalFs) -> Self {
        Self {
            local,
            distributed: None,
        }
    }

    /// A router with a distributed filesystem as the default.
    pub fn new(local: LocalFs, distributed: Box<dyn FileSystem>) -> Self {
        Self {
            local,
            distributed: Some(distributed),
        }
    }

    fn default_fs(&self) -> &dyn FileSystem {
        match &self.distributed {
            Some(fs) => fs.as_ref(),
            None => &self.local,
        }
    }

    fn route(&self, uri: &UriRef) -> Result<&dyn FileSystem> {
        if uri.is_local() {
            return Ok(&self.local);
        }
        if uri.scheme().is_none() {
            return Ok(self.default_fs());
        }
        self.distributed
            .as_deref()
            .ok_or_else(|| {
                GalaxyError::Configuration(format!(
                    "No distributed filesystem is available to access {}",
                    uri
                ))
            })
    }

    /// True if `uri` is served by the local implementation.
    fn is_local_route(&self, uri: &UriRef) -> bool {
        uri.is_local() || (uri.scheme().is_none() && self.distributed.is_none())
    }

    fn route_io(&self, uri: &UriRef) -> io::Result<&dyn FileSystem> {
        self.route(uri)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
    }
}

impl FileSystem for RoutingFs {
    fn exists(&self, uri: &UriRef) -> Result<bool> {
        self.route(uri)?.exists(uri)
    }

    fn is_dir(&self, uri: &UriRef) -> Result<bool> {
        self.route(uri)?.is_dir(uri)
    }

    fn list(&self, pattern: &UriRef) -> Result<Vec<UriRef>> {
        self.route(pattern)?.list(pattern)
    }

    fn list_dir(&self, dir: &UriRef) -> Result<Vec<UriRef>> {
        self.route(dir)?.list_dir(dir)
    }

    fn root_entries(&self) -> Result<Vec<UriRef>> {
        self.default_fs().root_entries()
    }

    fn working_dir(&self) -> Result<String> {
        self.default_fs().working_dir()
    }

    fn remove_all(&self, uri: &UriRef) -> io::Result<()> {
        self.route_io(uri)?.remove_all(uri)
    }

    fn create_dir_all(&self, uri: &UriRef) -> io::Result<()> {
        self.route_io(uri)?.create_dir_all(uri)
    }

    fn read_into(&self, uri: &UriRef, sink: &mut dyn Write) -> io::Result<u64> {
        self.route_io(uri)?.read_into(uri, sink)
    }

    /// Copies between two local locations natively; anything involving a
    /// remote side goes through the distributed filesystem, which can reach
    /// both.
    fn copy_into(&self, src: &UriRef, dest_dir: &UriRef) -> io::Result<()> {
        if self.is_local_route(src) && self.is_local_route(dest_dir) {
            return self.local.copy_into(src, dest_dir);
        }
        match &self.distributed {
            Some(fs) => fs.copy_into(src, dest_dir),
            None => Err(io::Error::new(
                io::ErrorKind::Other,
                format!("No distributed filesystem is available to copy {} to {}", src, dest_dir),
            )),
        }
    }
}
