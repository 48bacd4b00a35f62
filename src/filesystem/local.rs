//! Local Filesystem
//!
//! Native implementation of [`FileSystem`] for `file://` URIs. Glob patterns
//! are matched one path component at a time with `globset`, so listings
//! never need to scrape command output.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use log::debug;

use super::{has_glob, FileSystem};
use crate::error::{GalaxyError, Result};
use crate::pathset::uri::absolutize;
use crate::pathset::UriRef;

/// Access to locally mounted filesystems.
#[derive(Debug, Clone)]
pub struct LocalFs {
    working_dir: PathBuf,
}

impl LocalFs {
    /// Creates a local filesystem that resolves relative paths against
    /// `working_dir`.
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    fn local_path(&self, uri: &UriRef) -> PathBuf {
        absolutize(Path::new(uri.path()), &self.working_dir)
    }

    fn to_uri(&self, template: &UriRef, path: &Path) -> Result<UriRef> {
        let text = path.to_str().ok_or_else(|| {
            GalaxyError::invalid_path(path.display().to_string(), "path is not valid UTF-8")
        })?;
        template.with_path(text)
    }
}

/// Directory entries sorted by name.
fn sorted_children(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut children: Vec<PathBuf> = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<_>>()?;
    children.sort();
    Ok(children)
}

/// Copies a file, or a directory tree, to `dest`.
fn copy_recursive(src: &Path, dest: &Path) -> io::Result<()> {
    if src.is_dir() {
        fs::create_dir_all(dest)?;
        for child in sorted_children(src)? {
            if let Some(name) = child.file_name() {
                copy_recursive(&child, &dest.join(name))?;
            }
        }
        Ok(())
    } else {
        fs::copy(src, dest).map(|_| ())
    }
}

fn component_matcher(component: &str) -> Result<GlobMatcher> {
    GlobBuilder::new(component)
        .literal_separator(true)
        .build()
        .map(|g| g.compile_matcher())
        .map_err(|e| GalaxyError::invalid_path(component, format!("bad glob pattern: {}", e)))
}

fn listing_failed(pattern: &UriRef, reason: impl ToString) -> GalaxyError {
    GalaxyError::ListingFailed {
        path: pattern.to_string(),
        reason: reason.to_string(),
    }
}

impl FileSystem for LocalFs {
    fn exists(&self, uri: &UriRef) -> Result<bool> {
        Ok(fs::symlink_metadata(self.local_path(uri)).is_ok())
    }

    fn is_dir(&self, uri: &UriRef) -> Result<bool> {
        Ok(self.local_path(uri).is_dir())
    }

    fn list(&self, pattern: &UriRef) -> Result<Vec<UriRef>> {
        let full = self.local_path(pattern);
        let mut current = vec![PathBuf::from("/")];

        for component in full.iter().skip(1) {
            let component = component.to_str().ok_or_else(|| {
                listing_failed(pattern, "path is not valid UTF-8")
            })?;

            let mut next = Vec::new();
            if has_glob(component) {
                let matcher = component_matcher(component)?;
                for dir in current.iter().filter(|d| d.is_dir()) {
                    let children = sorted_children(dir).map_err(|e| listing_failed(pattern, e))?;
                    next.extend(children.into_iter().filter(|child| {
                        child
                            .file_name()
                            .map(|name| matcher.is_match(name))
                            .unwrap_or(false)
                    }));
                }
            } else {
                next.extend(
                    current
                        .iter()
                        .map(|dir| dir.join(component))
                        .filter(|candidate| fs::symlink_metadata(candidate).is_ok()),
                );
            }
            current = next;

            if current.is_empty() {
                break;
            }
        }

        if current.is_empty() {
            return Err(listing_failed(pattern, "No such file or directory"));
        }

        debug!("Listed {} local paths for {}", current.len(), pattern);
        current.iter().map(|p| self.to_uri(pattern, p)).collect()
    }

    fn list_dir(&self, dir: &UriRef) -> Result<Vec<UriRef>> {
        let children = sorted_children(&self.local_path(dir)).map_err(|e| listing_failed(dir, e))?;
        children.iter().map(|p| self.to_uri(dir, p)).collect()
    }

    fn root_entries(&self) -> Result<Vec<UriRef>> {
        self.list_dir(&UriRef::local("/")?)
    }

    fn working_dir(&self) -> Result<String> {
        Ok(self.working_dir.display().to_string())
    }

    fn remove_all(&self, uri: &UriRef) -> io::Result<()> {
        let path = self.local_path(uri);
        let metadata = fs::symlink_metadata(&path)?;
        if metadata.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        }
    }

    fn create_dir_all(&self, uri: &UriRef) -> io::Result<()> {
        fs::create_dir_all(self.local_path(uri))
    }

    fn read_into(&self, uri: &UriRef, sink: &mut dyn Write) -> io::Result<u64> {
        let mut file = fs::File::open(self.local_path(uri))?;
        io::copy(&mut file, sink)
    }

    fn copy_into(&self, src: &UriRef, dest_dir: &UriRef) -> io::Result<()> {
        let src = self.local_path(src);
        let name = src.file_name().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, format!("{} has no base name", src.display()))
        })?;
        copy_recursive(&src, &self.local_path(dest_dir).join(name))
    }
}
