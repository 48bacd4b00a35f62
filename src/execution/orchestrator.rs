//! Job Orchestration
//!
//! Ties a Galaxy job together: reads the input pathset Galaxy hands over,
//! decides where the Hadoop job writes its data, runs the tool and finally
//! records that location in the output pathset Galaxy expects.
//!
//! # Output data location
//!
//! By default the job data goes next to the output pathset:
//!
//! ```text
//! dirname(output)/hadoop_output/basename(output)
//! ```
//!
//! The base directory can be overridden with `--output-data-dir` or, with
//! lower precedence, the `HADOOP_GALAXY_DATA_DIR` environment variable.

use std::path::PathBuf;

use log::{debug, info, warn};

use super::process::CommandRunner;
use super::tool::ToolAdapter;
use crate::environment::{config_path, load_config, merge_layers, standard_layers, ConfigLayer, Environment};
use crate::error::Result;
use crate::filesystem::FileSystem;
use crate::pathset::uri::join_path;
use crate::pathset::{load_pathset, save_pathset, Pathset};

/// Environment variable overriding the output data base directory.
pub const OUTPUT_DATA_DIR_ENV: &str = "HADOOP_GALAXY_DATA_DIR";

/// Directory created next to the output pathset when nothing else is set.
pub const HADOOP_OUTPUT_DIR_NAME: &str = "hadoop_output";

/// Everything the command line says about one job.
#[derive(Debug, Clone, Default)]
pub struct JobOptions {
    /// Input pathset provided by Galaxy.
    pub input: PathBuf,
    /// Where Galaxy expects the output pathset.
    pub output: PathBuf,
    pub input_format: Option<String>,
    pub output_format: Option<String>,
    pub output_data_dir: Option<String>,
    pub conf: Option<PathBuf>,
    pub append_python_path: Option<String>,
    pub executable: String,
    /// Passed through to the tool ahead of the input paths.
    pub remaining_args: Vec<String>,
}

/// Computes where the job writes its data.
///
/// `name` replaces the last component, which otherwise is the file name of
/// the output pathset.
///
/// # Example
///
/// ```
/// use hadoop_galaxy::environment::Environment;
/// use hadoop_galaxy::execution::{compute_output_dir, JobOptions};
///
/// let options = JobOptions {
///     output: "/galaxy/data/job7.dataset".into(),
///     ..JobOptions::default()
/// };
/// let dir = compute_output_dir(&options, &Environment::new(), None);
/// assert_eq!(dir, "/galaxy/data/hadoop_output/job7.dataset");
/// ```
pub fn compute_output_dir(options: &JobOptions, env: &Environment, name: Option<&str>) -> String {
    let suffix = match name {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => options
            .output
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };

    let base = match options.output_data_dir.as_deref().filter(|d| !d.is_empty()) {
        Some(dir) => dir.to_string(),
        None => match env.get_non_empty(OUTPUT_DATA_DIR_ENV) {
            Some(dir) => dir.to_string(),
            None => {
                let parent = options
                    .output
                    .parent()
                    .map(|p| p.to_string_lossy().into_owned())
                    .unwrap_or_default();
                join_path(&parent, HADOOP_OUTPUT_DIR_NAME)
            }
        },
    };

    let path = join_path(&base, &suffix);
    info!("Hadoop job data output path {}", path);
    path
}

/// Runs one wrapped Hadoop job on behalf of Galaxy.
pub struct Orchestrator {
    options: JobOptions,
    working_dir: PathBuf,
}

impl Orchestrator {
    /// `working_dir` is used to make local paths absolute.
    pub fn new(options: JobOptions, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            options,
            working_dir: working_dir.into(),
        }
    }

    pub fn options(&self) -> &JobOptions {
        &self.options
    }

    /// Builds the tool environment from the inherited one, the optional
    /// configuration file and `--append-python-path`.
    pub fn configure(&self, inherited: Environment) -> Result<Environment> {
        let config = match config_path(self.options.conf.as_deref(), &inherited) {
            Some(path) => Some(load_config(path)?),
            None => None,
        };

        let mut layers = standard_layers(inherited, config.as_ref());
        if let Some(dir) = self.options.append_python_path.as_deref() {
            layers.push(ConfigLayer::PythonPath(dir.to_string()));
        }
        Ok(merge_layers(&layers))
    }

    /// The single-entry pathset naming the job's data directory.
    pub fn output_pathset(&self, env: &Environment) -> Result<Pathset> {
        let data_dir = compute_output_dir(&self.options, env, None);
        let mut pathset = Pathset::new();
        pathset.append(&data_dir, &self.working_dir)?;
        pathset.set_datatype(self.options.output_format.clone());
        Ok(pathset)
    }

    /// Loads the input, runs the tool and writes the output pathset.
    ///
    /// The output pathset file is only written once the tool has succeeded;
    /// on any failure it is left as it was.
    pub fn run(&self, env: &Environment, fs: &dyn FileSystem, runner: &dyn CommandRunner) -> Result<Pathset> {
        debug!("Options: {:?}", self.options);

        let input = load_pathset(&self.options.input)?;
        debug!("Read input pathset with {} paths", input.len());
        self.check_input_format(&input);

        let output = self.output_pathset(env)?;

        let mut adapter = ToolAdapter::new(self.options.executable.as_str());
        adapter.set_options(self.options.remaining_args.clone());
        adapter.set_input(&input);
        adapter.set_output(&output)?;
        debug!("Executing: {}", adapter);

        adapter.execute(env, fs, runner)?;

        save_pathset(&output, &self.options.output)?;
        Ok(output)
    }

    fn check_input_format(&self, input: &Pathset) {
        let (Some(expected), Some(found)) = (self.options.input_format.as_deref(), input.datatype()) else {
            return;
        };
        if expected != found {
            warn!(
                "Input format {} does not match the data type {} recorded in {}",
                expected,
                found,
                self.options.input.display()
            );
        }
    }
}
