//! Hadoop-Galaxy - Pathset Indirection for Hadoop Tools
//!
//! Galaxy expects every tool to read and write single files, while Hadoop
//! programs work on whole directories, usually on a distributed filesystem.
//! This crate puts small "pathset" files in between: Galaxy sees the
//! pathsets, the Hadoop tool sees the URIs listed inside them.
//!
//! # Architecture
//!
//! The library is organized into these modules:
//!
//! - [`pathset`]: URIs, the pathset model and file format, resolution,
//!   wildcard expansion and splitting
//! - [`filesystem`]: the [`FileSystem`](filesystem::FileSystem) capability
//!   with local and Hadoop command line implementations
//! - [`environment`]: environment snapshots, YAML configuration and
//!   executable lookup
//! - [`execution`]: running the wrapped tool and orchestrating a job
//! - [`transfer`]: concatenating or copying the data behind a pathset
//! - [`logging`]: logger setup shared by the binaries
//!
//! # Example
//!
//! ```rust,no_run
//! use hadoop_galaxy::environment::Environment;
//! use hadoop_galaxy::execution::{JobOptions, Orchestrator, SystemRunner};
//! use hadoop_galaxy::filesystem::{LocalFs, RoutingFs};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = JobOptions {
//!         input: "/galaxy/data/job6.dataset".into(),
//!         output: "/galaxy/data/job7.dataset".into(),
//!         executable: "seal_bwa".to_string(),
//!         ..JobOptions::default()
//!     };
//!
//!     let orchestrator = Orchestrator::new(options, std::env::current_dir()?);
//!     let env = orchestrator.configure(Environment::inherited())?;
//!     let fs = RoutingFs::local_only(LocalFs::new(std::env::current_dir()?));
//!
//!     orchestrator.run(&env, &fs, &SystemRunner)?;
//!     Ok(())
//! }
//! ```

pub mod environment;
pub mod error;
pub mod execution;
pub mod filesystem;
pub mod logging;
pub mod pathset;
pub mod transfer;

// Re-export commonly used types
pub use error::{GalaxyError, Result};
pub use execution::{JobOptions, Orchestrator, ToolAdapter};
pub use pathset::{load_pathset, save_pathset, Pathset, UriRef};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "Hadoop-Galaxy";
