//! cat-paths: concatenate the data referenced by a pathset into one file.
//!
//! The output is always a local file, typically the dataset Galaxy gave the
//! tool. A single local source file is hard linked rather than copied.

use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::debug;

use hadoop_galaxy::environment::Environment;
use hadoop_galaxy::filesystem::{HadoopCliFs, LocalFs, RoutingFs};
use hadoop_galaxy::logging::{level_arg, setup_logging};
use hadoop_galaxy::pathset::{load_pathset, UriRef};
use hadoop_galaxy::transfer::concat_pathset;
use hadoop_galaxy::GalaxyError;

/// Simply concatenate the data referenced by a pathset into a single file.
#[derive(Parser, Debug)]
#[command(name = "cat-paths", version, about)]
struct Args {
    /// Input pathset
    input_pathset: PathBuf,

    /// Output file to be written
    output_file: String,

    /// Delete the data referenced by the source pathset after it has been
    /// concatenated into the destination file
    #[arg(long)]
    delete_source: bool,

    /// Log level (default: HADOOP_GALAXY_LOG_LEVEL or info)
    #[arg(long, value_parser = level_arg)]
    log_level: Option<String>,
}

/// Turns the output argument into a local path. Paths without a scheme are
/// taken relative to `working_dir`.
fn local_output(raw: &str, working_dir: &Path) -> Result<PathBuf, GalaxyError> {
    let uri = UriRef::sanitize(raw, working_dir)?;
    if !uri.is_local() {
        return Err(GalaxyError::InvalidUri {
            uri: raw.to_string(),
            reason: "cat-paths can only write to the local filesystem".to_string(),
        });
    }
    Ok(PathBuf::from(uri.path()))
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let inherited = Environment::inherited();
    let working_dir = env::current_dir()?;
    let output = local_output(&args.output_file, &working_dir)?;

    let pathset = load_pathset(&args.input_pathset)?;
    let local = LocalFs::new(&working_dir);
    let fs = if pathset.iter().all(|uri| uri.is_local()) {
        RoutingFs::local_only(local)
    } else {
        RoutingFs::new(local, Box::new(HadoopCliFs::from_env(&inherited)?))
    };

    concat_pathset(&fs, &pathset, &output, args.delete_source)?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    setup_logging(args.log_level.as_deref(), &Environment::inherited());
    debug!("{:?}", args);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
