//! Job Execution Module
//!
//! Runs the wrapped Hadoop tool on behalf of Galaxy.
//!
//! # Architecture
//!
//! - [`process`]: the [`CommandRunner`] seam over `std::process`
//! - [`tool`]: command line construction and execution for one tool
//! - [`orchestrator`]: output location, environment merge and job sequencing

pub mod orchestrator;
pub mod process;
pub mod tool;

pub use orchestrator::{
    compute_output_dir, JobOptions, Orchestrator, HADOOP_OUTPUT_DIR_NAME, OUTPUT_DATA_DIR_ENV,
};
pub use process::{CommandOutput, CommandRunner, ExitOutcome, SystemRunner};
pub use tool::ToolAdapter;
