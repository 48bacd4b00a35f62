//! Pathset Data Model
//!
//! A pathset is an ordered list of URIs pointing at the real data of a
//! dataset, plus an optional data type tag (e.g. `fastq`) that only
//! downstream tools interpret.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use hadoop_galaxy::pathset::Pathset;
//!
//! let mut pathset = Pathset::new().with_datatype("fastq");
//! pathset.append("hdfs://nn/reads/lane1", Path::new("/")).unwrap();
//! pathset.append("/scratch/lane2", Path::new("/")).unwrap();
//!
//! assert_eq!(pathset.len(), 2);
//! assert_eq!(pathset.entries()[1].to_string(), "file:///scratch/lane2");
//! ```

use std::path::Path;

use super::uri::UriRef;
use crate::error::{GalaxyError, Result};

/// An ordered collection of data URIs.
///
/// Entry order is significant: it is the order in which paths are handed to
/// the wrapped tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pathset {
    entries: Vec<UriRef>,
    datatype: Option<String>,
    comment: String,
}

impl Pathset {
    /// Creates an empty pathset with no data type.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pathset from already validated URIs.
    pub fn from_entries(entries: Vec<UriRef>) -> Self {
        Self {
            entries,
            ..Self::default()
        }
    }

    /// Sets the data type tag.
    pub fn with_datatype(mut self, datatype: impl Into<String>) -> Self {
        self.datatype = Some(datatype.into());
        self
    }

    pub fn set_datatype(&mut self, datatype: Option<String>) {
        self.datatype = datatype.filter(|d| !d.is_empty());
    }

    pub fn datatype(&self) -> Option<&str> {
        self.datatype.as_deref()
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = comment.into();
    }

    /// Appends a raw path, sanitizing it into a full URI first.
    ///
    /// Paths without a scheme are assumed to be local and are made absolute
    /// against `base_dir`.
    pub fn append(&mut self, raw: &str, base_dir: &Path) -> Result<&mut Self> {
        self.entries.push(UriRef::sanitize(raw, base_dir)?);
        Ok(self)
    }

    /// Appends an already validated URI.
    pub fn push(&mut self, uri: UriRef) {
        self.entries.push(uri);
    }

    pub fn entries(&self) -> &[UriRef] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UriRef> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the one entry of a singleton pathset.
    ///
    /// Fails with [`GalaxyError::Cardinality`] for empty pathsets and for
    /// pathsets holding more than one entry.
    pub fn single(&self) -> Result<&UriRef> {
        match self.entries.as_slice() {
            [only] => Ok(only),
            other => Err(GalaxyError::Cardinality(other.len())),
        }
    }
}

impl<'a> IntoIterator for &'a Pathset {
    type Item = &'a UriRef;
    type IntoIter = std::slice::Iter<'a, UriRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
