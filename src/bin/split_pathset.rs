//! split-pathset: split a pathset in two using a regular expression.
//!
//! Paths matching the expression (from their start, and optionally to their
//! end) go to the "true" pathset, the rest to the "false" pathset. With
//! `--expand-levels N` the tool first descends up to N directory levels and
//! tests each resulting path on its own.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{debug, info};
use regex::Regex;

use hadoop_galaxy::environment::Environment;
use hadoop_galaxy::filesystem::{HadoopCliFs, LocalFs, RoutingFs};
use hadoop_galaxy::logging::{level_arg, setup_logging};
use hadoop_galaxy::pathset::{compile_test, load_pathset, save_pathset, split_pathset};

const EXIT_BAD_EXPRESSION: u8 = 2;

/// Split a pathset by regular expression.
#[derive(Parser, Debug)]
#[command(name = "split-pathset", version, about)]
struct Args {
    /// The regular expression must match at the end of the path (like appending '$')
    #[arg(short, long)]
    anchor_end: bool,

    /// Number of levels to descend into each path
    #[arg(short, long, value_name = "N", default_value_t = 0)]
    expand_levels: usize,

    /// Log level (default: HADOOP_GALAXY_LOG_LEVEL or info)
    #[arg(long, value_parser = level_arg)]
    log_level: Option<String>,

    /// Regular expression to apply as a test
    expression: String,

    /// Input pathset file
    input_pathset: PathBuf,

    /// Output pathset for paths matching the expression
    output_true: PathBuf,

    /// Output pathset for paths not matching the expression
    output_false: PathBuf,
}

fn run(args: Args, test: &Regex) -> Result<(), Box<dyn std::error::Error>> {
    let working_dir = env::current_dir()?;
    let source = load_pathset(&args.input_pathset)?;

    let local = LocalFs::new(working_dir);
    let fs = if args.expand_levels > 0 && source.iter().any(|uri| !uri.is_local()) {
        let hadoop = HadoopCliFs::from_env(&Environment::inherited())?;
        RoutingFs::new(local, Box::new(hadoop))
    } else {
        RoutingFs::local_only(local)
    };

    let result = split_pathset(&fs, &source, test, args.expand_levels)?;
    info!(
        "{} path(s) matched, {} did not",
        result.matched.len(),
        result.unmatched.len()
    );

    save_pathset(&result.matched, &args.output_true)?;
    save_pathset(&result.unmatched, &args.output_false)?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    setup_logging(args.log_level.as_deref(), &Environment::inherited());
    debug!("{:?}", args);

    let test = match compile_test(&args.expression, args.anchor_end) {
        Ok(test) => test,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_BAD_EXPRESSION);
        }
    };

    match run(args, &test) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
