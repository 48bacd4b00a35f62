//! Tool Adapter
//!
//! Wraps one Hadoop-based executable. The adapter is given the input and
//! output pathsets, turns them into a command line of the form
//!
//! ```text
//! <executable> [options...] <input paths...> <output path>
//! ```
//!
//! and runs it after clearing the output location.

use std::fmt;
use std::io;

use log::{debug, error, info, warn};

use super::process::{CommandRunner, ExitOutcome};
use crate::environment::{find_executable, Environment};
use crate::error::{GalaxyError, Result};
use crate::filesystem::FileSystem;
use crate::pathset::{Pathset, UriRef};

/// Runs a single executable over pathset inputs.
#[derive(Debug, Clone)]
pub struct ToolAdapter {
    executable: String,
    /// Literal input paths; wildcards are left for the tool to expand.
    inputs: Option<Vec<String>>,
    output: Option<UriRef>,
    options: Vec<String>,
}

impl ToolAdapter {
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            inputs: None,
            output: None,
            options: Vec::new(),
        }
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    /// Takes every path of `pathset`, in order, as an input argument.
    pub fn set_input(&mut self, pathset: &Pathset) {
        self.inputs = Some(pathset.iter().map(|uri| uri.to_string()).collect());
    }

    /// Takes the output path from a pathset holding exactly one entry.
    pub fn set_output(&mut self, pathset: &Pathset) -> Result<()> {
        self.output = Some(pathset.single()?.clone());
        Ok(())
    }

    /// Options placed between the executable and the input paths.
    pub fn set_options(&mut self, options: Vec<String>) {
        self.options = options;
    }

    pub fn output(&self) -> Option<&UriRef> {
        self.output.as_ref()
    }

    /// Builds the argument vector, looking the executable up in the `PATH`
    /// of `env`.
    pub fn build_command(&self, env: &Environment) -> Result<Vec<String>> {
        if self.executable.is_empty() {
            return Err(GalaxyError::Configuration("executable not set".to_string()));
        }
        let inputs = self
            .inputs
            .as_ref()
            .ok_or_else(|| GalaxyError::Configuration("input paths not set".to_string()))?;
        let output = self
            .output
            .as_ref()
            .ok_or_else(|| GalaxyError::Configuration("output path not set".to_string()))?;

        let full_path = find_executable(&self.executable, env)?;

        let mut argv = Vec::with_capacity(2 + self.options.len() + inputs.len());
        argv.push(full_path.display().to_string());
        argv.extend(self.options.iter().cloned());
        argv.extend(inputs.iter().cloned());
        argv.push(output.to_string());
        Ok(argv)
    }

    /// Clears the output location, makes sure its parent exists and runs the
    /// tool to completion.
    pub fn execute(
        &self,
        env: &Environment,
        fs: &dyn FileSystem,
        runner: &dyn CommandRunner,
    ) -> Result<()> {
        let argv = self.build_command(env)?;
        let output = self
            .output
            .as_ref()
            .ok_or_else(|| GalaxyError::Configuration("output path not set".to_string()))?;

        debug!("Attempting to remove output path {}", output);
        match fs.remove_all(output) {
            Ok(()) => debug!("Removed existing output {}", output),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Could not remove {}: {}", output, e),
        }

        if let Some(parent) = output.parent() {
            if !fs.exists(&parent)? {
                fs.create_dir_all(&parent)
                    .map_err(|e| GalaxyError::filesystem(parent.to_string(), e))?;
                debug!("Created parent of output directory: {}", parent);
            }
        }

        let command_line = argv.join(" ");
        info!("Executing command: {}", command_line);
        debug!("PATH: {}", env.get("PATH").unwrap_or(""));

        let outcome = runner.run(&argv, env).map_err(|source| {
            error!("Command execution failed: {}", command_line);
            GalaxyError::ToolLaunchFailed {
                command: command_line.clone(),
                source,
            }
        })?;

        let (exit_code, signaled) = match outcome {
            ExitOutcome::Code(0) => return Ok(()),
            ExitOutcome::Code(code) => (code, false),
            ExitOutcome::Signal(signal) => (signal, true),
        };

        let err = GalaxyError::ToolExecutionFailed {
            tool: self.executable.clone(),
            exit_code,
            signaled,
        };
        error!("{} ({})", err, command_line);
        Err(err)
    }
}

impl fmt::Display for ToolAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "executable: {}", self.executable)?;
        write!(f, "; input: {:?}", self.inputs)?;
        match &self.output {
            Some(output) => write!(f, "; output: {}", output)?,
            None => write!(f, "; output: None")?,
        }
        write!(f, "; opts: {:?}", self.options)
    }
}
