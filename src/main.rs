//! Hadoop-Galaxy CLI Entry Point
//!
//! Runs a Hadoop-based tool on behalf of Galaxy, translating between the
//! pathset files Galaxy manages and the data URIs the tool works on.
//!
//! # Usage
//!
//! ```bash
//! # Run a tool, forwarding extra options to it
//! hadoop-galaxy --input job6.dataset --output job7.dataset \
//!     --executable seal_bwa -- --num-reducers 8
//!
//! # Send the Hadoop output somewhere else
//! hadoop-galaxy --input in.dataset --output out.dataset \
//!     --output-data-dir hdfs://nn:9000/galaxy --executable seal_prq
//! ```

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{debug, info};

use hadoop_galaxy::environment::Environment;
use hadoop_galaxy::execution::{JobOptions, Orchestrator, SystemRunner};
use hadoop_galaxy::filesystem::{HadoopCliFs, LocalFs, RoutingFs};
use hadoop_galaxy::logging::{level_arg, setup_logging};
use hadoop_galaxy::{APP_NAME, VERSION};

/// Wrap Hadoop-based tools to run within Galaxy.
#[derive(Parser, Debug)]
#[command(name = "hadoop-galaxy", version, about)]
struct Args {
    /// Path to input pathset provided by Galaxy
    #[arg(long, value_name = "InputPath")]
    input: PathBuf,

    /// Output path provided by Galaxy
    #[arg(long, value_name = "OutputPath")]
    output: PathBuf,

    /// Input format provided by Galaxy
    #[arg(long, value_name = "InputFormat")]
    input_format: Option<String>,

    /// Data type recorded in the output pathset
    #[arg(long, value_name = "OutputFormat")]
    output_format: Option<String>,

    /// URI of a directory where the Hadoop job will write its output.
    /// Can also be set through HADOOP_GALAXY_DATA_DIR (default: Galaxy data dir)
    #[arg(long, value_name = "PATH")]
    output_data_dir: Option<String>,

    /// Hadoop+Galaxy configuration file
    #[arg(long, value_name = "conf_file")]
    conf: Option<PathBuf>,

    /// Path to append to the PYTHONPATH before calling the executable
    #[arg(long, value_name = "PATH")]
    append_python_path: Option<String>,

    /// The Hadoop program to run
    #[arg(long, value_name = "Program")]
    executable: String,

    /// Log level (default: HADOOP_GALAXY_LOG_LEVEL or info)
    #[arg(long, value_parser = level_arg)]
    log_level: Option<String>,

    /// Arguments passed through to the program
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    remaining_args: Vec<String>,
}

impl Args {
    fn into_job_options(self) -> JobOptions {
        JobOptions {
            input: self.input,
            output: self.output,
            input_format: self.input_format,
            output_format: self.output_format,
            output_data_dir: self.output_data_dir,
            conf: self.conf,
            append_python_path: self.append_python_path,
            executable: self.executable,
            remaining_args: self.remaining_args,
        }
    }
}

/// Filesystem access for the job: local files natively, anything else
/// through the `hadoop` command line when it can be found.
fn job_filesystem(env: &Environment, working_dir: PathBuf) -> RoutingFs {
    let local = LocalFs::new(working_dir);
    match HadoopCliFs::from_env(env) {
        Ok(hadoop) => RoutingFs::new(local, Box::new(hadoop)),
        Err(e) => {
            debug!("Hadoop command line unavailable ({}); only local paths are reachable", e);
            RoutingFs::local_only(local)
        }
    }
}

/// Main application entry point.
fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let inherited = Environment::inherited();
    setup_logging(args.log_level.as_deref(), &inherited);
    debug!("{} v{}", APP_NAME, VERSION);

    let working_dir = env::current_dir()?;
    let orchestrator = Orchestrator::new(args.into_job_options(), &working_dir);

    let job_env = orchestrator.configure(inherited)?;
    let fs = job_filesystem(&job_env, working_dir);

    let output = orchestrator.run(&job_env, &fs, &SystemRunner)?;
    info!(
        "Job finished; data in {}",
        output.iter().map(|uri| uri.to_string()).collect::<Vec<_>>().join(" ")
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
