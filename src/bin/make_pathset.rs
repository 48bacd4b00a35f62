//! make-pathset: write a pathset file from one or more paths.
//!
//! Paths come from the command line or, when none are given, from stdin one
//! per line. Paths without a scheme are placed on the default filesystem,
//! or on the local one with `--force-local`. Wildcards are expanded.
//!
//! Exit codes: 0 success, 2 the Hadoop command line is unusable, 3 a path
//! could not be listed, 1 anything else.

use std::env;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::{debug, info};

use hadoop_galaxy::environment::Environment;
use hadoop_galaxy::filesystem::{FileSystem, HadoopCliFs, LocalFs, RoutingFs};
use hadoop_galaxy::logging::{level_arg, setup_logging};
use hadoop_galaxy::pathset::{expand_all, save_pathset, PathResolver, Pathset, ResolveMode};
use hadoop_galaxy::GalaxyError;

const EXIT_HADOOP_UNAVAILABLE: u8 = 2;
const EXIT_LISTING_FAILED: u8 = 3;

/// Make a pathset file from one or more paths.
#[derive(Parser, Debug)]
#[command(name = "make-pathset", version, about)]
struct Args {
    /// Force paths to be local (i.e., URIs starting with file://)
    #[arg(long)]
    force_local: bool,

    /// Set the type of the pathset contents to this data type (e.g. 'fastq')
    #[arg(long)]
    data_format: Option<String>,

    /// Log level (default: HADOOP_GALAXY_LOG_LEVEL or info)
    #[arg(long, value_parser = level_arg)]
    log_level: Option<String>,

    /// Pathset file to write
    output_path: PathBuf,

    /// Paths to be written to the pathset. Alternatively, provide them on stdin, one per line
    paths: Vec<String>,
}

/// A failure tagged with the exit code it maps to.
struct Failure {
    code: u8,
    error: GalaxyError,
}

impl From<GalaxyError> for Failure {
    fn from(error: GalaxyError) -> Self {
        let code = match error {
            GalaxyError::ListingFailed { .. } => EXIT_LISTING_FAILED,
            _ => 1,
        };
        Self { code, error }
    }
}

/// Checks the Hadoop command line before any other work is done.
fn hadoop_filesystem(env: &Environment) -> Result<HadoopCliFs, Failure> {
    let unavailable = |error| Failure {
        code: EXIT_HADOOP_UNAVAILABLE,
        error,
    };
    let hadoop = HadoopCliFs::from_env(env).map_err(unavailable)?;
    hadoop.probe().map_err(unavailable)?;
    Ok(hadoop)
}

fn read_stdin_paths() -> Result<Vec<String>, Failure> {
    info!("Reading paths from stdin");
    let mut paths = Vec::new();
    for line in io::stdin().lock().lines() {
        let line = line.map_err(GalaxyError::from)?;
        let line = line.trim_end();
        if !line.is_empty() {
            paths.push(line.to_string());
        }
    }
    Ok(paths)
}

/// Resolves and expands `raw_paths` into a pathset.
fn build_pathset(
    fs: &dyn FileSystem,
    working_dir: &Path,
    mode: ResolveMode,
    raw_paths: &[String],
    data_format: Option<String>,
) -> Result<Pathset, GalaxyError> {
    let resolver = PathResolver::new(fs, working_dir);
    let uris = raw_paths
        .iter()
        .map(|raw| resolver.resolve(mode, raw))
        .collect::<Result<Vec<_>, _>>()?;

    let mut pathset = Pathset::from_entries(expand_all(fs, &uris)?);
    pathset.set_datatype(data_format);
    Ok(pathset)
}

fn run(args: Args) -> Result<(), Failure> {
    let inherited = Environment::inherited();
    setup_logging(args.log_level.as_deref(), &inherited);

    let working_dir = env::current_dir().map_err(GalaxyError::from)?;
    let local = LocalFs::new(&working_dir);

    let (mode, fs) = if args.force_local {
        (ResolveMode::Local, RoutingFs::local_only(local))
    } else {
        let hadoop = hadoop_filesystem(&inherited)?;
        (ResolveMode::Default, RoutingFs::new(local, Box::new(hadoop)))
    };
    debug!("Resolution mode: {:?}", mode);

    let raw_paths = if args.paths.is_empty() {
        read_stdin_paths()?
    } else {
        args.paths
    };
    info!("Read {} paths", raw_paths.len());

    let pathset = build_pathset(&fs, &working_dir, mode, &raw_paths, args.data_format)?;
    save_pathset(&pathset, &args.output_path)?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            eprintln!("Error: {}", failure.error);
            ExitCode::from(failure.code)
        }
    }
}
