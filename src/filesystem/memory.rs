//! In-memory [`FileSystem`] used by unit tests.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Write};

use globset::GlobBuilder;

use super::{has_glob, FileSystem};
use crate::error::{GalaxyError, Result};
use crate::pathset::UriRef;

pub struct MemoryFs {
    root: UriRef,
    files: RefCell<BTreeSet<String>>,
    dirs: RefCell<BTreeSet<String>>,
    contents: RefCell<BTreeMap<String, Vec<u8>>>,
    removal_error: Option<io::ErrorKind>,
    pub removed: RefCell<Vec<String>>,
    pub created: RefCell<Vec<String>>,
}

impl MemoryFs {
    /// `location` is `scheme://host` of the simulated filesystem.
    pub fn new(location: &str) -> Self {
        Self {
            root: UriRef::parse(&format!("{}/", location)).unwrap(),
            files: RefCell::new(BTreeSet::new()),
            dirs: RefCell::new(BTreeSet::new()),
            contents: RefCell::new(BTreeMap::new()),
            removal_error: None,
            removed: RefCell::new(Vec::new()),
            created: RefCell::new(Vec::new()),
        }
    }

    pub fn with_object(self, path: &str) -> Self {
        self.add_parents(path);
        self.files.borrow_mut().insert(path.to_string());
        self
    }

    pub fn with_file(self, path: &str, data: &str) -> Self {
        self.contents.borrow_mut().insert(path.to_string(), data.as_bytes().to_vec());
        self.with_object(path)
    }

    pub fn with_dir(self, path: &str) -> Self {
        self.add_parents(path);
        self.dirs.borrow_mut().insert(path.to_string());
        self
    }

    pub fn with_removal_error(mut self, kind: io::ErrorKind) -> Self {
        self.removal_error = Some(kind);
        self
    }

    fn add_parents(&self, path: &str) {
        let mut current = path;
        while let Some(idx) = current.rfind('/') {
            current = &current[..idx];
            if current.is_empty() {
                break;
            }
            self.dirs.borrow_mut().insert(current.to_string());
        }
    }

    fn contains(&self, path: &str) -> bool {
        self.files.borrow().contains(path) || self.dirs.borrow().contains(path)
    }

    fn all_paths(&self) -> Vec<String> {
        let mut all: Vec<String> = self
            .files
            .borrow()
            .iter()
            .chain(self.dirs.borrow().iter())
            .cloned()
            .collect();
        all.sort();
        all
    }

    fn children(&self, dir: &str) -> Vec<String> {
        let prefix = if dir.ends_with('/') { dir.to_string() } else { format!("{}/", dir) };
        self.all_paths()
            .into_iter()
            .filter(|p| p.starts_with(&prefix) && !p[prefix.len()..].contains('/'))
            .collect()
    }
}

impl FileSystem for MemoryFs {
    fn exists(&self, uri: &UriRef) -> Result<bool> {
        Ok(self.contains(uri.path()))
    }

    fn is_dir(&self, uri: &UriRef) -> Result<bool> {
        Ok(self.dirs.borrow().contains(uri.path()))
    }

    fn list(&self, pattern: &UriRef) -> Result<Vec<UriRef>> {
        let matches: Vec<String> = if has_glob(pattern.path()) {
            let matcher = GlobBuilder::new(pattern.path())
                .literal_separator(true)
                .build()
                .unwrap()
                .compile_matcher();
            self.all_paths().into_iter().filter(|p| matcher.is_match(p)).collect()
        } else if self.dirs.borrow().contains(pattern.path()) {
            self.children(pattern.path())
        } else if self.contains(pattern.path()) {
            vec![pattern.path().to_string()]
        } else {
            Vec::new()
        };

        if matches.is_empty() {
            return Err(GalaxyError::ListingFailed {
                path: pattern.to_string(),
                reason: "No such file or directory".to_string(),
            });
        }
        matches.into_iter().map(|p| pattern.with_path(p)).collect()
    }

    fn list_dir(&self, dir: &UriRef) -> Result<Vec<UriRef>> {
        self.children(dir.path())
            .into_iter()
            .map(|p| dir.with_path(p))
            .collect()
    }

    fn root_entries(&self) -> Result<Vec<UriRef>> {
        self.list_dir(&self.root)
    }

    fn working_dir(&self) -> Result<String> {
        Ok("/user/galaxy".to_string())
    }

    fn remove_all(&self, uri: &UriRef) -> io::Result<()> {
        if let Some(kind) = self.removal_error {
            return Err(io::Error::new(kind, "simulated removal failure"));
        }
        let path = uri.path().to_string();
        if !self.contains(&path) {
            return Err(io::Error::new(io::ErrorKind::NotFound, "No such file or directory"));
        }
        let prefix = format!("{}/", path);
        self.files.borrow_mut().retain(|p| *p != path && !p.starts_with(&prefix));
        self.dirs.borrow_mut().retain(|p| *p != path && !p.starts_with(&prefix));
        self.removed.borrow_mut().push(uri.to_string());
        Ok(())
    }

    fn create_dir_all(&self, uri: &UriRef) -> io::Result<()> {
        self.add_parents(uri.path());
        self.dirs.borrow_mut().insert(uri.path().to_string());
        self.created.borrow_mut().push(uri.to_string());
        Ok(())
    }

    fn read_into(&self, uri: &UriRef, sink: &mut dyn Write) -> io::Result<u64> {
        if !self.files.borrow().contains(uri.path()) {
            return Err(io::Error::new(io::ErrorKind::NotFound, "No such file"));
        }
        let contents = self.contents.borrow();
        let data = contents.get(uri.path()).map(Vec::as_slice).unwrap_or_default();
        sink.write_all(data)?;
        Ok(data.len() as u64)
    }

    fn copy_into(&self, src: &UriRef, dest_dir: &UriRef) -> io::Result<()> {
        let dest = format!("{}/{}", dest_dir.path().trim_end_matches('/'), src.base_name());
        self.add_parents(&dest);
        self.files.borrow_mut().insert(dest);
        Ok(())
    }
}
