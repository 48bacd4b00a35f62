//! URI References
//!
//! A [`UriRef`] is a validated (scheme, host, path) triple naming a local or
//! remote filesystem object, e.g. `hdfs://namenode:9000/user/data` or
//! `file:///tmp/reads.fastq`. Construction never touches the network or disk.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{GalaxyError, Result};

/// Scheme used for objects on a locally mounted filesystem.
pub const FILE_SCHEME: &str = "file";

/// Matches a leading URI scheme (`hdfs:`, `file:`, `s3a:`...).
static SCHEME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9+.\-]*):").expect("valid scheme regex"));

/// Provisional components of a raw URI string, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UriParts {
    pub scheme: String,
    pub host: String,
    pub path: String,
}

/// Splits a raw string into scheme, host and path without validating them.
///
/// Both `scheme://host/path` and `scheme:/path` are understood; a string with
/// no scheme is taken to be a bare path.
pub fn split_uri(raw: &str) -> UriParts {
    let Some(caps) = SCHEME_RE.captures(raw) else {
        return UriParts {
            path: raw.to_string(),
            ..UriParts::default()
        };
    };

    let scheme = caps[1].to_string();
    let rest = &raw[caps[0].len()..];

    match rest.strip_prefix("//") {
        Some(authority_and_path) => {
            let (host, path) = match authority_and_path.find('/') {
                Some(idx) => authority_and_path.split_at(idx),
                None => (authority_and_path, ""),
            };
            UriParts {
                scheme,
                host: host.to_string(),
                path: path.to_string(),
            }
        }
        None => UriParts {
            scheme,
            host: String::new(),
            path: rest.to_string(),
        },
    }
}

/// A validated reference to a filesystem object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UriRef {
    scheme: String,
    host: String,
    path: String,
}

impl UriRef {
    /// Creates a URI from its components, enforcing the invariants:
    ///
    /// - `file` URIs have no host and an absolute path
    /// - a host requires a scheme
    /// - the path is never empty
    ///
    /// # Example
    ///
    /// ```
    /// use hadoop_galaxy::pathset::UriRef;
    ///
    /// let uri = UriRef::new("hdfs", "nn:9000", "/user/data").unwrap();
    /// assert_eq!(uri.to_string(), "hdfs://nn:9000/user/data");
    ///
    /// assert!(UriRef::new("file", "", "relative/path").is_err());
    /// ```
    pub fn new(
        scheme: impl Into<String>,
        host: impl Into<String>,
        path: impl Into<String>,
    ) -> Result<Self> {
        let uri = Self {
            scheme: scheme.into(),
            host: host.into(),
            path: path.into(),
        };
        uri.validate()?;
        Ok(uri)
    }

    /// Parses and validates a URI string.
    pub fn parse(raw: &str) -> Result<Self> {
        let parts = split_uri(raw);
        Self::new(parts.scheme, parts.host, parts.path)
    }

    /// Creates a `file` URI for an absolute local path.
    pub fn local(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = path
            .to_str()
            .ok_or_else(|| GalaxyError::invalid_uri(path.display().to_string(), "path is not valid UTF-8"))?;
        Self::new(FILE_SCHEME, "", text)
    }

    /// Turns a raw path into a full URI.
    ///
    /// Strings that already carry a scheme are kept as they are. Anything else
    /// is taken to be on the local filesystem and made absolute against
    /// `base_dir`.
    pub fn sanitize(raw: &str, base_dir: &Path) -> Result<Self> {
        let parts = split_uri(raw);
        if !parts.scheme.is_empty() {
            return Self::new(parts.scheme, parts.host, parts.path);
        }
        if parts.path.is_empty() {
            return Err(GalaxyError::invalid_path(raw, "blank path"));
        }
        Self::local(absolutize(Path::new(&parts.path), base_dir))
    }

    /// Copies this URI's scheme and host onto a different path.
    pub fn with_path(&self, path: impl Into<String>) -> Result<Self> {
        Self::new(self.scheme.clone(), self.host.clone(), path)
    }

    fn validate(&self) -> Result<()> {
        if self.scheme == FILE_SCHEME {
            if !self.host.is_empty() {
                return Err(GalaxyError::invalid_uri(
                    self.to_string(),
                    "can't specify a host with the file: scheme",
                ));
            }
            if !self.path.starts_with('/') {
                return Err(GalaxyError::invalid_uri(
                    self.to_string(),
                    format!("must use absolute paths with the file: scheme (found {})", self.path),
                ));
            }
        }
        if !self.host.is_empty() && self.scheme.is_empty() {
            return Err(GalaxyError::invalid_uri(
                self.to_string(),
                "can't specify a host without an access scheme",
            ));
        }
        if self.path.is_empty() {
            return Err(GalaxyError::invalid_uri(self.to_string(), "blank path"));
        }
        Ok(())
    }

    pub fn scheme(&self) -> Option<&str> {
        Some(self.scheme.as_str()).filter(|s| !s.is_empty())
    }

    pub fn host(&self) -> Option<&str> {
        Some(self.host.as_str()).filter(|h| !h.is_empty())
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// True for `file` URIs.
    pub fn is_local(&self) -> bool {
        self.scheme == FILE_SCHEME
    }

    /// Last component of the path, ignoring trailing slashes.
    pub fn base_name(&self) -> &str {
        let trimmed = self.path.trim_end_matches('/');
        trimmed.rsplit('/').next().unwrap_or(trimmed)
    }

    /// The URI of the containing directory, or `None` at the root.
    pub fn parent(&self) -> Option<UriRef> {
        let trimmed = self.path.trim_end_matches('/');
        let idx = trimmed.rfind('/')?;
        let parent_path = if idx == 0 { "/" } else { &trimmed[..idx] };
        if parent_path == self.path {
            return None;
        }
        self.with_path(parent_path).ok()
    }

    /// Joins a relative child name onto this URI's path.
    pub fn join(&self, name: &str) -> Result<UriRef> {
        self.with_path(join_path(&self.path, name))
    }
}

impl fmt::Display for UriRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scheme.is_empty() {
            write!(f, "{}", self.path)
        } else {
            write!(f, "{}://{}{}", self.scheme, self.host, self.path)
        }
    }
}

impl FromStr for UriRef {
    type Err = GalaxyError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Joins two path strings the way a POSIX shell would: an absolute `tail`
/// replaces `head`, otherwise exactly one `/` separates them.
pub fn join_path(head: &str, tail: &str) -> String {
    if tail.starts_with('/') || head.is_empty() {
        tail.to_string()
    } else if head.ends_with('/') {
        format!("{}{}", head, tail)
    } else {
        format!("{}/{}", head, tail)
    }
}

/// Makes `path` absolute against `base_dir` and removes `.`/`..` components
/// lexically. Nothing on disk is consulted.
pub fn absolutize(path: &Path, base_dir: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    };

    let mut normalized = PathBuf::from("/");
    for component in joined.components() {
        match component {
            Component::ParentDir => {
                normalized.pop();
            }
            Component::Normal(part) => normalized.push(part),
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_full_uri() {
        let parts = split_uri("hdfs://nn:9000/user/me/data");
        assert_eq!(parts.scheme, "hdfs");
        assert_eq!(parts.host, "nn:9000");
        assert_eq!(parts.path, "/user/me/data");
    }

    #[test]
    fn test_split_bare_path() {
        let parts = split_uri("reads/sample_1.fastq");
        assert!(parts.scheme.is_empty());
        assert!(parts.host.is_empty());
        assert_eq!(parts.path, "reads/sample_1.fastq");
    }

    #[test]
    fn test_split_single_slash_form() {
        let parts = split_uri("file:/tmp/x");
        assert_eq!(parts.scheme, "file");
        assert!(parts.host.is_empty());
        assert_eq!(parts.path, "/tmp/x");
    }

    #[test]
    fn test_split_host_only() {
        let parts = split_uri("hdfs://nn");
        assert_eq!(parts.host, "nn");
        assert!(parts.path.is_empty());
    }

    #[test]
    fn test_file_scheme_relative_path_rejected() {
        let result = UriRef::new("file", "", "tmp/x");
        assert!(matches!(result, Err(GalaxyError::InvalidUri { .. })));
    }

    #[test]
    fn test_file_scheme_with_host_rejected() {
        let result = UriRef::new("file", "somehost", "/tmp/x");
        assert!(matches!(result, Err(GalaxyError::InvalidUri { .. })));
    }

    #[test]
    fn test_host_without_scheme_rejected() {
        let result = UriRef::new("", "nn", "/data");
        assert!(matches!(result, Err(GalaxyError::InvalidUri { .. })));
    }

    #[test]
    fn test_empty_path_rejected() {
        assert!(UriRef::new("hdfs", "nn", "").is_err());
        assert!(UriRef::parse("").is_err());
    }

    #[test]
    fn test_canonical_form() {
        let uri = UriRef::new("file", "", "/galaxy/data").unwrap();
        assert_eq!(uri.to_string(), "file:///galaxy/data");

        let bare = UriRef::new("", "", "relative/data").unwrap();
        assert_eq!(bare.to_string(), "relative/data");
        assert_eq!(bare.scheme(), None);
        assert_eq!(bare.host(), None);
    }

    #[test]
    fn test_parse_display_identity() {
        for raw in ["hdfs://nn/a.txt", "file:///tmp/x", "/plain/path", "s3a://bucket/key/*.gz"] {
            assert_eq!(UriRef::parse(raw).unwrap().to_string(), raw);
        }
    }

    #[test]
    fn test_with_path_keeps_location() {
        let uri = UriRef::parse("hdfs://nn:9000/data/*.txt").unwrap();
        let child = uri.with_path("/data/a.txt").unwrap();
        assert_eq!(child.scheme(), Some("hdfs"));
        assert_eq!(child.host(), Some("nn:9000"));
        assert_eq!(child.to_string(), "hdfs://nn:9000/data/a.txt");
    }

    #[test]
    fn test_sanitize() {
        let base = Path::new("/home/galaxy");
        assert_eq!(UriRef::sanitize("/tmp", base).unwrap().to_string(), "file:///tmp");
        assert_eq!(
            UriRef::sanitize("tmp", base).unwrap().to_string(),
            "file:///home/galaxy/tmp"
        );
        assert_eq!(
            UriRef::sanitize("hdfs://localhost:9000/user/myname", base)
                .unwrap()
                .to_string(),
            "hdfs://localhost:9000/user/myname"
        );
    }

    #[test]
    fn test_parent_and_base_name() {
        let uri = UriRef::parse("hdfs://nn/galaxy/hadoop_output/job7.dataset").unwrap();
        assert_eq!(uri.base_name(), "job7.dataset");
        assert_eq!(
            uri.parent().unwrap().to_string(),
            "hdfs://nn/galaxy/hadoop_output"
        );

        let top = UriRef::parse("file:///job").unwrap();
        assert_eq!(top.parent().unwrap().to_string(), "file:///");
        assert!(top.parent().unwrap().parent().is_none());
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("/galaxy/data", "hadoop_output"), "/galaxy/data/hadoop_output");
        assert_eq!(join_path("/galaxy/data/", "x"), "/galaxy/data/x");
        assert_eq!(join_path("", "x"), "x");
        assert_eq!(join_path("/a", "/b"), "/b");
    }

    #[test]
    fn test_absolutize() {
        let base = Path::new("/work/dir");
        assert_eq!(absolutize(Path::new("a/../b/./c"), base), PathBuf::from("/work/dir/b/c"));
        assert_eq!(absolutize(Path::new("/x/y/.."), base), PathBuf::from("/x"));
        assert_eq!(absolutize(Path::new("../../.."), base), PathBuf::from("/"));
    }
}
