//! Filesystem Capability
//!
//! Everything the crate needs from a filesystem goes through the
//! [`FileSystem`] trait, so listing logic can be swapped and tested without a
//! cluster.
//!
//! - [`local`]: native access to mounted filesystems (`file://`)
//! - [`hadoop`]: `hadoop dfs` command line, with a text parser for `-ls`
//! - [`routing`]: dispatches by URI scheme between the two

pub mod hadoop;
pub mod local;
pub mod routing;

#[cfg(test)]
pub(crate) mod memory;

use std::io::{self, Write};

use crate::error::Result;
use crate::pathset::UriRef;

pub use hadoop::{parse_ls_output, HadoopCliFs};
pub use local::LocalFs;
pub use routing::RoutingFs;

/// Operations on a (possibly remote) filesystem.
///
/// All calls block until the underlying operation completes. Nothing is
/// retried.
pub trait FileSystem {
    /// True if `uri` names an existing object exactly (no pattern matching).
    fn exists(&self, uri: &UriRef) -> Result<bool>;

    /// True if `uri` names an existing directory.
    fn is_dir(&self, uri: &UriRef) -> Result<bool>;

    /// Lists the objects matching the shell glob in `pattern`'s path, in the
    /// order the filesystem reports them.
    ///
    /// Fails with `ListingFailed` if the listing cannot be performed.
    fn list(&self, pattern: &UriRef) -> Result<Vec<UriRef>>;

    /// Lists the children of a directory.
    fn list_dir(&self, dir: &UriRef) -> Result<Vec<UriRef>>;

    /// Fully qualified entries directly under the filesystem root.
    fn root_entries(&self) -> Result<Vec<UriRef>>;

    /// Directory against which relative paths are resolved.
    fn working_dir(&self) -> Result<String>;

    /// Recursively removes an object. A missing object is reported with
    /// [`io::ErrorKind::NotFound`].
    fn remove_all(&self, uri: &UriRef) -> io::Result<()>;

    /// Creates a directory and any missing parents.
    fn create_dir_all(&self, uri: &UriRef) -> io::Result<()>;

    /// Writes the contents of the file `uri` to `sink` and returns the
    /// number of bytes copied.
    fn read_into(&self, uri: &UriRef, sink: &mut dyn Write) -> io::Result<u64>;

    /// Copies the file or directory `src` into the directory `dest_dir`,
    /// keeping its base name.
    fn copy_into(&self, src: &UriRef, dest_dir: &UriRef) -> io::Result<()>;
}

/// Returns true if `text` contains shell glob metacharacters.
pub fn has_glob(text: &str) -> bool {
    text.contains(['*', '?', '[', '{'])
}

/// Backslash-escapes glob metacharacters so that a pattern-matching command
/// treats `text` as a literal name.
pub fn escape_glob(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '{' | '}' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
