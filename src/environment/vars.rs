//! Environment Snapshots
//!
//! Tools are launched with an explicit [`Environment`] value instead of the
//! live process environment. The snapshot is taken once, at startup, and
//! passed to every component that needs a variable.

use std::collections::BTreeMap;
use std::env;
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

/// An ordered set of environment variables.
///
/// Variables that are not valid Unicode cannot be read through [`get`](Self::get),
/// but they are carried along so that launched tools still receive them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
    opaque: BTreeMap<OsString, OsString>,
}

impl Environment {
    /// Creates an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshots the current process environment.
    pub fn inherited() -> Self {
        let mut env = Self::new();
        for (key, value) in env::vars_os() {
            env.set_os(key, value);
        }
        env
    }

    /// Builds an environment from key/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            opaque: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Like [`get`](Self::get), but treats an empty value as unset.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.opaque.remove(OsStr::new(&key));
        self.vars.insert(key, value.into());
    }

    /// Sets a variable that may not be valid Unicode.
    pub fn set_os(&mut self, key: OsString, value: OsString) {
        match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => self.set(key, value),
            (key, value) => {
                let key = key.map(OsString::from).unwrap_or_else(|k| k);
                let value = value.map(OsString::from).unwrap_or_else(|v| v);
                if let Some(text) = key.to_str() {
                    self.vars.remove(text);
                }
                self.opaque.insert(key, value);
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.opaque.remove(OsStr::new(key));
        self.vars.remove(key)
    }

    /// Copies every variable of `other` over this environment.
    pub fn merge_from(&mut self, other: &Environment) {
        for (k, v) in other.iter() {
            self.set(k, v);
        }
        for (k, v) in other.opaque_iter() {
            self.set_os(k.to_os_string(), v.to_os_string());
        }
    }

    /// Unicode variables, ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Variables whose name or value is not valid Unicode.
    pub fn opaque_iter(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.opaque.iter().map(|(k, v)| (k.as_os_str(), v.as_os_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len() + self.opaque.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty() && self.opaque.is_empty()
    }

    /// Directories listed in `PATH`, in search order.
    pub fn path_entries(&self) -> Vec<PathBuf> {
        self.get("PATH")
            .map(|p| env::split_paths(p).collect())
            .unwrap_or_default()
    }

    /// Appends `dir` to a colon-separated list variable such as `PYTHONPATH`.
    pub fn append_to_list(&mut self, key: &str, dir: &str) {
        let value = match self.get_non_empty(key) {
            Some(existing) => format!("{}:{}", existing, dir),
            None => dir.to_string(),
        };
        self.set(key, value);
    }
}
