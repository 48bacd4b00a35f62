//! External Process Execution
//!
//! Processes are started through the [`CommandRunner`] trait so that the
//! Hadoop command line and the wrapped tool can be replaced in tests.

use std::io::{self, Write};
use std::process::{Command, ExitStatus, Stdio};

use log::debug;

use crate::environment::Environment;

/// How a finished process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Normal exit with a status code.
    Code(i32),
    /// Killed by a signal.
    Signal(i32),
}

impl ExitOutcome {
    pub fn success(&self) -> bool {
        matches!(self, ExitOutcome::Code(0))
    }
}

impl From<ExitStatus> for ExitOutcome {
    fn from(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ExitOutcome::Code(code);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ExitOutcome::Signal(signal);
            }
        }

        ExitOutcome::Code(-1)
    }
}

/// Exit outcome plus captured output.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub outcome: ExitOutcome,
    pub stdout: String,
    pub stderr: String,
}

/// Runs external commands with an explicit environment.
pub trait CommandRunner {
    /// Runs `argv` with inherited stdio, blocking until it exits.
    fn run(&self, argv: &[String], env: &Environment) -> io::Result<ExitOutcome>;

    /// Runs `argv` and captures stdout and stderr.
    fn capture(&self, argv: &[String], env: &Environment) -> io::Result<CommandOutput>;

    /// Runs `argv`, copying its stdout into `sink` as it is produced.
    /// Stderr is inherited.
    fn stream(&self, argv: &[String], env: &Environment, sink: &mut dyn Write)
        -> io::Result<ExitOutcome>;
}

/// [`CommandRunner`] backed by `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    fn command(argv: &[String], env: &Environment) -> io::Result<Command> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command line"))?;

        let mut cmd = Command::new(program);
        cmd.args(args)
            .env_clear()
            .envs(env.iter())
            .envs(env.opaque_iter());
        Ok(cmd)
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, argv: &[String], env: &Environment) -> io::Result<ExitOutcome> {
        debug!("Running: {}", argv.join(" "));
        let status = Self::command(argv, env)?.status()?;
        Ok(status.into())
    }

    fn capture(&self, argv: &[String], env: &Environment) -> io::Result<CommandOutput> {
        debug!("Running (captured): {}", argv.join(" "));
        let output = Self::command(argv, env)?
            .stdin(Stdio::null())
            .output()?;

        Ok(CommandOutput {
            outcome: output.status.into(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn stream(
        &self,
        argv: &[String],
        env: &Environment,
        sink: &mut dyn Write,
    ) -> io::Result<ExitOutcome> {
        debug!("Running (streamed): {}", argv.join(" "));
        let mut child = Self::command(argv, env)?
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .spawn()?;

        let copied = match child.stdout.take() {
            Some(mut stdout) => io::copy(&mut stdout, sink),
            None => Ok(0),
        };
        if copied.is_err() {
            let _ = child.kill();
        }

        let status = child.wait()?;
        copied?;
        Ok(status.into())
    }
}
