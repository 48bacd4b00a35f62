//! Environment Management Module
//!
//! Builds the environment the wrapped tool runs in, from the process
//! environment and the optional configuration file.
//!
//! - [`vars`]: explicit environment snapshots
//! - [`config`]: YAML configuration and layered merging
//! - [`executable`]: `PATH` lookup

pub mod config;
pub mod executable;
pub mod vars;

pub use config::{
    config_path, load_config, merge_layers, standard_layers, ConfigLayer, GalaxyConfig,
    CONF_PATH_ENV,
};
pub use executable::find_executable;
pub use vars::Environment;
