//! Hadoop Command-Line Filesystem
//!
//! Implements [`FileSystem`] by running `hadoop dfs` subcommands. There is no
//! structured listing API on the command line, so `-ls` output is parsed as
//! text by [`parse_ls_output`]. A typical listing looks like:
//!
//! ```text
//! Found 2 items
//! -rw-r--r--   3 galaxy supergroup   1048576 2014-03-02 10:15 /user/galaxy/reads/a.fastq
//! drwxr-xr-x   - galaxy supergroup         0 2014-03-02 10:16 /user/galaxy/reads/lane2
//! ```
//!
//! The exact layout depends on the Hadoop release, so the parser only relies
//! on entry lines starting with a permission string and ending with the path.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use super::{escape_glob, FileSystem};
use crate::environment::{find_executable, Environment};
use crate::error::{GalaxyError, Result};
use crate::execution::process::{CommandRunner, ExitOutcome, SystemRunner};
use crate::pathset::uri::split_uri;
use crate::pathset::UriRef;
use crate::transfer::DistCopy;

/// Entry lines start with a permission string such as `drwxr-xr-x`.
static LS_ENTRY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[dl\-][rwxsStT\-]{9}[+@.]?\s").expect("valid ls entry regex"));

/// Parses the text printed by `hadoop dfs -ls <pattern>`.
///
/// Summary lines (`Found N items`) and any other non-entry lines are dropped.
/// The trailing whitespace-delimited token of each entry is taken as the
/// path and rebuilt on `pattern`'s scheme and host. Output order follows the
/// listing.
pub fn parse_ls_output(text: &str, pattern: &UriRef) -> Result<Vec<UriRef>> {
    let mut uris = Vec::new();

    for line in text.lines() {
        if !LS_ENTRY_RE.is_match(line) {
            if !line.trim().is_empty() {
                debug!("Skipping non-entry listing line: {}", line);
            }
            continue;
        }

        let Some(token) = line.split_whitespace().last() else {
            continue;
        };
        let path = split_uri(token).path;
        uris.push(pattern.with_path(path)?);
    }

    Ok(uris)
}

/// Renders `uri` so that `hadoop dfs` takes it as a literal name. The shell
/// globs the arguments of every subcommand, `-test` and `-rm` included.
fn literal(uri: &UriRef) -> String {
    uri.with_path(escape_glob(uri.path()))
        .map(|escaped| escaped.to_string())
        .unwrap_or_else(|_| uri.to_string())
}

/// Counts the bytes passing through to the inner writer.
struct Counting<'a> {
    inner: &'a mut dyn Write,
    count: u64,
}

impl Write for Counting<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.count += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// A filesystem reached through the `hadoop` command line.
#[derive(Clone)]
pub struct HadoopCliFs<R: CommandRunner = SystemRunner> {
    hadoop_exec: PathBuf,
    env: Environment,
    runner: R,
}

impl HadoopCliFs<SystemRunner> {
    /// Locates the `hadoop` launcher in the given environment.
    ///
    /// `$HADOOP_HOME/bin/hadoop` is preferred; otherwise `hadoop` is looked
    /// up in `PATH`.
    pub fn from_env(env: &Environment) -> Result<Self> {
        let hadoop_exec = match env.get_non_empty("HADOOP_HOME") {
            Some(home) => Path::new(home).join("bin").join("hadoop"),
            None => find_executable("hadoop", env)?,
        };
        debug!("Using hadoop launcher {}", hadoop_exec.display());
        Ok(Self::with_runner(hadoop_exec, env.clone(), SystemRunner))
    }
}

impl<R: CommandRunner> HadoopCliFs<R> {
    pub fn with_runner(hadoop_exec: impl Into<PathBuf>, env: Environment, runner: R) -> Self {
        Self {
            hadoop_exec: hadoop_exec.into(),
            env,
            runner,
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Path of the `hdfs` launcher, assumed to sit next to `hadoop`.
    fn hdfs_exec(&self) -> PathBuf {
        self.hadoop_exec.with_file_name("hdfs")
    }

    fn dfs_argv(&self, args: &[&str]) -> Vec<String> {
        let mut argv = vec![self.hadoop_exec.display().to_string(), "dfs".to_string()];
        argv.extend(args.iter().map(|a| a.to_string()));
        argv
    }

    /// Runs a `-test` flag; any non-zero exit means "no".
    fn test(&self, flag: &str, uri: &UriRef) -> Result<bool> {
        let target = literal(uri);
        let argv = self.dfs_argv(&["-test", flag, &target]);
        let outcome = self
            .runner
            .run(&argv, &self.env)
            .map_err(|e| GalaxyError::filesystem(&target, e))?;
        Ok(outcome.success())
    }

    /// Checks that the Hadoop command line works at all.
    pub fn probe(&self) -> Result<()> {
        let argv = self.dfs_argv(&["-stat", "file:///"]);
        let failure = |reason: String| {
            GalaxyError::Configuration(format!(
                "Error running hadoop program. Please check your environment (tried {}): {}",
                argv.join(" "),
                reason
            ))
        };

        match self.runner.capture(&argv, &self.env) {
            Ok(output) if output.outcome.success() => Ok(()),
            Ok(output) => Err(failure(format!("{:?} {}", output.outcome, output.stderr.trim()))),
            Err(e) => Err(failure(e.to_string())),
        }
    }

    /// URI of the root of the default filesystem, from `fs.defaultFS`.
    fn default_root(&self) -> Result<UriRef> {
        let argv = vec![
            self.hdfs_exec().display().to_string(),
            "getconf".to_string(),
            "-confKey".to_string(),
            "fs.defaultFS".to_string(),
        ];
        let output = self
            .runner
            .capture(&argv, &self.env)
            .map_err(|e| GalaxyError::Configuration(format!("Could not run {}: {}", argv[0], e)))?;

        if !output.outcome.success() {
            return Err(GalaxyError::Configuration(format!(
                "Could not read fs.defaultFS: {}",
                output.stderr.trim()
            )));
        }

        let parts = split_uri(output.stdout.trim());
        UriRef::new(parts.scheme, parts.host, "/")
    }

    fn command_error(output_stderr: &str) -> io::Error {
        let message = output_stderr.trim().to_string();
        if message.contains("No such file or directory") {
            io::Error::new(io::ErrorKind::NotFound, message)
        } else {
            io::Error::new(io::ErrorKind::Other, message)
        }
    }

    fn run_modifying(&self, args: &[&str]) -> io::Result<()> {
        let argv = self.dfs_argv(args);
        let output = self.runner.capture(&argv, &self.env)?;
        match output.outcome {
            ExitOutcome::Code(0) => Ok(()),
            _ => Err(Self::command_error(&output.stderr)),
        }
    }

    /// Runs `-ls` on `target` and rebuilds entries on `base`'s location.
    fn ls(&self, target: &str, base: &UriRef) -> Result<Vec<UriRef>> {
        let argv = self.dfs_argv(&["-ls", target]);
        let listing_failed = |reason: String| GalaxyError::ListingFailed {
            path: base.to_string(),
            reason,
        };

        let output = self
            .runner
            .capture(&argv, &self.env)
            .map_err(|e| listing_failed(e.to_string()))?;

        if !output.outcome.success() {
            warn!("Listing {} failed: {}", base, output.stderr.trim());
            return Err(listing_failed(format!(
                "{:?} {}",
                output.outcome,
                output.stderr.trim()
            )));
        }

        parse_ls_output(&output.stdout, base)
    }
}

impl<R: CommandRunner> DistCopy for HadoopCliFs<R> {
    /// Runs `hadoop distcp2 -atomic`. Its exit code is not trusted: a killed
    /// job still exits 0, so success also requires `dest_dir` to exist.
    fn distcp(&self, sources: &[UriRef], dest_dir: &UriRef) -> Result<()> {
        let mut argv = vec![
            self.hadoop_exec.display().to_string(),
            "distcp2".to_string(),
            "-atomic".to_string(),
        ];
        argv.extend(sources.iter().map(|uri| uri.to_string()));
        argv.push(dest_dir.to_string());
        debug!("{}", argv.join(" "));

        let outcome = self
            .runner
            .run(&argv, &self.env)
            .map_err(|e| GalaxyError::ToolLaunchFailed {
                command: argv.join(" "),
                source: e,
            })?;

        if !outcome.success() {
            return Err(GalaxyError::CopyFailed {
                dest: dest_dir.to_string(),
                reason: format!("distcp2 ended with {:?}", outcome),
            });
        }
        if !self.exists(dest_dir)? {
            return Err(GalaxyError::CopyFailed {
                dest: dest_dir.to_string(),
                reason: "distcp2 did not create the destination".to_string(),
            });
        }
        info!("Successfully ran distcp");
        Ok(())
    }
}

impl<R: CommandRunner> FileSystem for HadoopCliFs<R> {
    fn exists(&self, uri: &UriRef) -> Result<bool> {
        self.test("-e", uri)
    }

    fn is_dir(&self, uri: &UriRef) -> Result<bool> {
        self.test("-d", uri)
    }

    fn list(&self, pattern: &UriRef) -> Result<Vec<UriRef>> {
        self.ls(&pattern.to_string(), pattern)
    }

    fn list_dir(&self, dir: &UriRef) -> Result<Vec<UriRef>> {
        self.ls(&literal(dir), dir)
    }

    fn root_entries(&self) -> Result<Vec<UriRef>> {
        let root = self.default_root()?;
        self.list(&root)
    }

    fn working_dir(&self) -> Result<String> {
        self.env
            .get_non_empty("USER")
            .or_else(|| self.env.get_non_empty("LOGNAME"))
            .map(|user| format!("/user/{}", user))
            .ok_or_else(|| {
                GalaxyError::Configuration("Cannot determine the Hadoop user: USER is not set".to_string())
            })
    }

    fn remove_all(&self, uri: &UriRef) -> io::Result<()> {
        let target = literal(uri);
        self.run_modifying(&["-rm", "-r", "-skipTrash", &target])
    }

    fn create_dir_all(&self, uri: &UriRef) -> io::Result<()> {
        let target = literal(uri);
        self.run_modifying(&["-mkdir", "-p", &target])
    }

    fn read_into(&self, uri: &UriRef, sink: &mut dyn Write) -> io::Result<u64> {
        let target = literal(uri);
        let argv = self.dfs_argv(&["-cat", &target]);

        let mut counting = Counting { inner: sink, count: 0 };
        let outcome = self.runner.stream(&argv, &self.env, &mut counting)?;
        if !outcome.success() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("reading {} failed ({:?})", uri, outcome),
            ));
        }
        Ok(counting.count)
    }

    fn copy_into(&self, src: &UriRef, dest_dir: &UriRef) -> io::Result<()> {
        let source = literal(src);
        let target = literal(dest_dir);
        self.run_modifying(&["-cp", &source, &target])
    }
}
