//! put-dataset: copy the data referenced by a pathset into an HDFS workspace.
//!
//! The data lands in `<workspace>/<name of the output dataset>` and the
//! output dataset becomes a pathset pointing there. The workspace comes from
//! `--hadoop-workspace` or `HADOOP_GALAXY_PUT_DIR`.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{debug, info};

use hadoop_galaxy::environment::Environment;
use hadoop_galaxy::filesystem::{HadoopCliFs, LocalFs, RoutingFs};
use hadoop_galaxy::logging::{level_arg, setup_logging};
use hadoop_galaxy::pathset::uri::split_uri;
use hadoop_galaxy::pathset::{load_pathset, save_pathset, PathResolver, ResolveMode};
use hadoop_galaxy::transfer::{put_pathset, workspace_setting, CopyMethod};

/// Copy data referenced by a pathset to HDFS.
#[derive(Parser, Debug)]
#[command(name = "put-dataset", version, about)]
struct Args {
    /// Source pathset
    #[arg(value_name = "SRC_PATHSET")]
    src_pathset: PathBuf,

    /// Output dataset provided by Galaxy
    #[arg(value_name = "DEST_PATHSET")]
    output_dataset: PathBuf,

    /// URI to a directory on the destination file system where the dataset(s)
    /// will be copied (default: value of HADOOP_GALAXY_PUT_DIR)
    #[arg(long, value_name = "URI")]
    hadoop_workspace: Option<String>,

    /// Use Hadoop distcp to perform the copy
    #[arg(long)]
    distcp: bool,

    /// Log level (default: HADOOP_GALAXY_LOG_LEVEL or info)
    #[arg(long, value_parser = level_arg)]
    log_level: Option<String>,
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let inherited = Environment::inherited();
    setup_logging(args.log_level.as_deref(), &inherited);
    debug!("{:?}", args);

    let raw_workspace = workspace_setting(args.hadoop_workspace.as_deref(), &inherited)?;
    let working_dir = env::current_dir()?;

    let hadoop = HadoopCliFs::from_env(&inherited)?;
    let fs = RoutingFs::new(LocalFs::new(&working_dir), Box::new(hadoop.clone()));

    let workspace = PathResolver::new(&fs, &working_dir).resolve(ResolveMode::Default, &raw_workspace)?;
    if split_uri(&raw_workspace).scheme.is_empty() {
        info!("Implicit workspace scheme set to {}", workspace.scheme().unwrap_or("none"));
    }

    let source = load_pathset(&args.src_pathset)?;
    let method = if args.distcp {
        CopyMethod::Distcp(&hadoop)
    } else {
        CopyMethod::Simple
    };

    let output = put_pathset(&fs, method, &source, &workspace, &args.output_dataset)?;
    save_pathset(&output, &args.output_dataset)?;
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
