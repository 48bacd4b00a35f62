//! Error Types
//!
//! Every fallible operation in the crate returns [`GalaxyError`]. The binaries
//! translate it into a process exit code and a one-line diagnostic.

use std::io;

use thiserror::Error;

/// Errors raised while building pathsets or running a wrapped tool.
#[derive(Error, Debug)]
pub enum GalaxyError {
    /// A (scheme, host, path) triple violates the URI invariants.
    #[error("Invalid URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },

    /// A raw path could not be turned into a URI.
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// Missing or inconsistent settings.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A pathset that must hold exactly one path holds some other number.
    #[error("Expecting a pathset containing one path, but got {0}")]
    Cardinality(usize),

    #[error("The tool {name} either isn't in the PATH or isn't executable (PATH: {search_path})")]
    ExecutableNotFound { name: String, search_path: String },

    #[error("Could not list path {path}. Please check whether it exists ({reason})")]
    ListingFailed { path: String, reason: String },

    /// The external process could not be started at all.
    #[error("Failed to launch '{command}': {source}")]
    ToolLaunchFailed {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The external process ran but did not exit cleanly.
    #[error("{}", describe_exit(.tool, .exit_code, .signaled))]
    ToolExecutionFailed {
        tool: String,
        exit_code: i32,
        signaled: bool,
    },

    /// Data could not be copied or concatenated to its destination.
    #[error("Failed to copy data to {dest}: {reason}")]
    CopyFailed { dest: String, reason: String },

    #[error("Unrecognized pathset file format: {0}")]
    PathsetFormat(String),

    /// I/O failure on a specific filesystem object.
    #[error("Filesystem error on {path}: {source}")]
    Filesystem {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Error parsing configuration file: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for crate operations.
pub type Result<T> = std::result::Result<T, GalaxyError>;

fn describe_exit(tool: &str, exit_code: &i32, signaled: &bool) -> String {
    if *signaled {
        format!("{} was terminated by signal {}", tool, exit_code)
    } else {
        format!("{} exit code: {}", tool, exit_code)
    }
}

impl GalaxyError {
    pub(crate) fn invalid_uri(uri: impl Into<String>, reason: impl Into<String>) -> Self {
        GalaxyError::InvalidUri {
            uri: uri.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        GalaxyError::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn filesystem(path: impl Into<String>, source: io::Error) -> Self {
        GalaxyError::Filesystem {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_message() {
        let err = GalaxyError::ToolExecutionFailed {
            tool: "/usr/bin/seal".to_string(),
            exit_code: 3,
            signaled: false,
        };
        assert_eq!(err.to_string(), "/usr/bin/seal exit code: 3");
    }

    #[test]
    fn test_signal_message() {
        let err = GalaxyError::ToolExecutionFailed {
            tool: "seal".to_string(),
            exit_code: 9,
            signaled: true,
        };
        assert_eq!(err.to_string(), "seal was terminated by signal 9");
    }

    #[test]
    fn test_cardinality_message() {
        let err = GalaxyError::Cardinality(2);
        assert!(err.to_string().contains("got 2"));
    }

    #[test]
    fn test_io_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let err: GalaxyError = io_err.into();
        assert!(matches!(err, GalaxyError::Io(_)));
    }
}
