//! Configuration File and Environment Layers
//!
//! The optional YAML configuration file recognizes these keys:
//!
//! ```yaml
//! HADOOP_HOME: /opt/hadoop
//! HADOOP_CONF_DIR: /etc/hadoop/conf
//! tool_env:
//!   JAVA_HOME: /usr/lib/jvm/default
//!   SEAL_THREADS: 8
//! ```
//!
//! The tool's environment is built by merging an explicit list of
//! [`ConfigLayer`]s, lowest precedence first.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::{debug, info};
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_yaml::Value;

use super::vars::Environment;
use crate::error::{GalaxyError, Result};

/// Environment variable naming the configuration file, used when no
/// `--conf` flag is given.
pub const CONF_PATH_ENV: &str = "HADOOP_GALAXY_CONF";

/// Settings loaded from the configuration file.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct GalaxyConfig {
    #[serde(rename = "HADOOP_HOME", default)]
    pub hadoop_home: Option<String>,

    #[serde(rename = "HADOOP_CONF_DIR", default)]
    pub hadoop_conf_dir: Option<String>,

    /// Variables forced into the tool's environment
    #[serde(deserialize_with = "scalar_map", default)]
    pub tool_env: BTreeMap<String, String>,
}

/// Deserializes a mapping of YAML scalars into strings, so `THREADS: 8` and
/// `THREADS: "8"` mean the same thing.
fn scalar_map<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let val = Value::deserialize(deserializer)?;
    match val {
        Value::Null => Ok(BTreeMap::new()),
        Value::Mapping(map) => map
            .into_iter()
            .map(|(k, v)| {
                Ok((
                    scalar_to_string::<D::Error>(k)?,
                    scalar_to_string::<D::Error>(v)?,
                ))
            })
            .collect(),
        _ => Err(de::Error::custom("tool_env must be a mapping")),
    }
}

fn scalar_to_string<E: de::Error>(value: Value) -> std::result::Result<String, E> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        _ => Err(E::custom("expected a scalar value in tool_env")),
    }
}

/// Loads the configuration file.
///
/// An empty file yields the default (empty) configuration.
pub fn load_config(path: impl AsRef<Path>) -> Result<GalaxyConfig> {
    let path = path.as_ref();
    debug!("Loading config from {}", path.display());

    let content = fs::read_to_string(path).map_err(|e| {
        GalaxyError::Configuration(format!(
            "Couldn't read the specified configuration from {}: {}",
            path.display(),
            e
        ))
    })?;

    if content.trim().is_empty() {
        return Ok(GalaxyConfig::default());
    }

    let config: GalaxyConfig = serde_yaml::from_str(&content)?;
    debug!("Loaded conf: {:?}", config);
    Ok(config)
}

/// Picks the configuration file: the explicit flag wins over the environment.
pub fn config_path<'a>(flag: Option<&'a Path>, env: &'a Environment) -> Option<&'a Path> {
    flag.or_else(|| env.get_non_empty(CONF_PATH_ENV).map(Path::new))
}

/// One source of environment variables for the wrapped tool.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigLayer {
    /// The environment this process was started with.
    Inherited(Environment),
    /// Hadoop location settings from the configuration file.
    HadoopSettings {
        home: Option<String>,
        conf_dir: Option<String>,
    },
    /// Explicit per-variable overrides.
    ToolEnv(BTreeMap<String, String>),
    /// A directory appended to `PYTHONPATH`.
    PythonPath(String),
}

impl ConfigLayer {
    fn apply(&self, env: &mut Environment) {
        match self {
            ConfigLayer::Inherited(base) => env.merge_from(base),
            ConfigLayer::HadoopSettings { home, conf_dir } => {
                if let Some(home) = home {
                    env.set("HADOOP_HOME", home.as_str());
                }
                if let Some(conf_dir) = conf_dir {
                    env.set("HADOOP_CONF_DIR", conf_dir.as_str());
                }
            }
            ConfigLayer::ToolEnv(vars) => {
                debug!("Overriding environment variables from configuration");
                for (k, v) in vars {
                    debug!("env[{}] = {}", k, v);
                    env.set(k.as_str(), v.as_str());
                }
            }
            ConfigLayer::PythonPath(dir) => env.append_to_list("PYTHONPATH", dir),
        }
    }
}

/// Builds the standard layer stack: inherited environment, then Hadoop
/// settings, then `tool_env`. Missing sources contribute nothing.
pub fn standard_layers(inherited: Environment, config: Option<&GalaxyConfig>) -> Vec<ConfigLayer> {
    let mut layers = vec![ConfigLayer::Inherited(inherited)];
    if let Some(config) = config {
        layers.push(ConfigLayer::HadoopSettings {
            home: config.hadoop_home.clone(),
            conf_dir: config.hadoop_conf_dir.clone(),
        });
        if !config.tool_env.is_empty() {
            layers.push(ConfigLayer::ToolEnv(config.tool_env.clone()));
        }
    }
    layers
}

/// Merges layers in order; later layers override earlier ones key by key.
pub fn merge_layers(layers: &[ConfigLayer]) -> Environment {
    let mut env = Environment::new();
    for layer in layers {
        layer.apply(&mut env);
    }

    info!("Hadoop settings:");
    for (k, v) in env.iter().filter(|(k, _)| k.starts_with("HADOOP")) {
        info!("  {} = {}", k, v);
    }

    env
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn inherited() -> Environment {
        Environment::from_pairs([
            ("PATH", "/usr/bin"),
            ("HADOOP_HOME", "/from/process"),
            ("JAVA_HOME", "/jvm/process"),
        ])
    }

    #[test]
    fn test_no_config_keeps_inherited() {
        let merged = merge_layers(&standard_layers(inherited(), None));
        assert_eq!(merged, inherited());
    }

    #[test]
    fn test_precedence() {
        let mut tool_env = BTreeMap::new();
        tool_env.insert("HADOOP_HOME".to_string(), "/from/tool_env".to_string());
        tool_env.insert("EXTRA".to_string(), "1".to_string());

        let config = GalaxyConfig {
            hadoop_home: Some("/from/config".to_string()),
            hadoop_conf_dir: Some("/etc/hadoop".to_string()),
            tool_env,
        };

        let merged = merge_layers(&standard_layers(inherited(), Some(&config)));
        assert_eq!(merged.get("HADOOP_HOME"), Some("/from/tool_env"));
        assert_eq!(merged.get("HADOOP_CONF_DIR"), Some("/etc/hadoop"));
        assert_eq!(merged.get("EXTRA"), Some("1"));
        assert_eq!(merged.get("JAVA_HOME"), Some("/jvm/process"));
    }

    #[test]
    fn test_config_keys_override_inherited() {
        let config = GalaxyConfig {
            hadoop_home: Some("/from/config".to_string()),
            ..GalaxyConfig::default()
        };
        let merged = merge_layers(&standard_layers(inherited(), Some(&config)));
        assert_eq!(merged.get("HADOOP_HOME"), Some("/from/config"));
        assert_eq!(merged.get("HADOOP_CONF_DIR"), None);
    }

    #[test]
    fn test_python_path_layer() {
        let layers = vec![
            ConfigLayer::Inherited(Environment::from_pairs([("PYTHONPATH", "/a")])),
            ConfigLayer::PythonPath("/b".to_string()),
        ];
        assert_eq!(merge_layers(&layers).get("PYTHONPATH"), Some("/a:/b"));
    }

    #[test]
    fn test_load_config() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("galaxy.yaml");
        fs::write(
            &path,
            "HADOOP_HOME: /opt/hadoop\ntool_env:\n  THREADS: 8\n  DEBUG: true\n  NAME: seal\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.hadoop_home.as_deref(), Some("/opt/hadoop"));
        assert_eq!(config.hadoop_conf_dir, None);
        assert_eq!(config.tool_env.get("THREADS").map(String::as_str), Some("8"));
        assert_eq!(config.tool_env.get("DEBUG").map(String::as_str), Some("true"));
        assert_eq!(config.tool_env.get("NAME").map(String::as_str), Some("seal"));
    }

    #[test]
    fn test_load_empty_config() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("empty.yaml");
        fs::write(&path, "").unwrap();
        assert_eq!(load_config(&path).unwrap(), GalaxyConfig::default());
    }

    #[test]
    fn test_load_invalid_config() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("bad.yaml");
        fs::write(&path, "tool_env: [1, 2\n").unwrap();
        assert!(matches!(load_config(&path), Err(GalaxyError::Config(_))));
    }

    #[test]
    fn test_load_missing_config() {
        let result = load_config("/nonexistent/galaxy.yaml");
        assert!(matches!(result, Err(GalaxyError::Configuration(_))));
    }

    #[test]
    fn test_config_path_precedence() {
        let env = Environment::from_pairs([(CONF_PATH_ENV, "/from/env.yaml")]);
        let flag = Path::new("/from/flag.yaml");

        assert_eq!(config_path(Some(flag), &env), Some(flag));
        assert_eq!(config_path(None, &env), Some(Path::new("/from/env.yaml")));
        assert_eq!(config_path(None, &Environment::new()), None);
    }
}
