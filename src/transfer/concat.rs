//! Pathset Concatenation
//!
//! Writes the data referenced by a pathset into a single local file. Each
//! entry is appended in pathset order; directories are walked recursively in
//! name order, skipping names that start with `_` (Hadoop's `_SUCCESS` and
//! `_logs`). A pathset made of one local file is hard linked instead of
//! copied whenever the filesystem allows it.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use log::{debug, info, warn};
use tempfile::NamedTempFile;

use crate::error::{GalaxyError, Result};
use crate::filesystem::FileSystem;
use crate::pathset::{Pathset, UriRef};

const MB: f64 = (1u64 << 20) as f64;

/// What a concatenation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConcatReport {
    /// Bytes written to the output (0 when linked).
    pub bytes: u64,
    /// True if the output is a hard link to the single source file.
    pub linked: bool,
}

/// Concatenates the data of `pathset` into the local file `output`.
///
/// The output is assembled in a temporary file next to `output` and only
/// renamed into place once every entry has been copied, so a failure leaves
/// no partial file behind. With `delete_source` the source data is removed
/// after a successful copy; failures to remove are logged and ignored.
pub fn concat_pathset(
    fs: &dyn FileSystem,
    pathset: &Pathset,
    output: &Path,
    delete_source: bool,
) -> Result<ConcatReport> {
    info!("Concatenating {} paths to {}", pathset.len(), output.display());

    if let Some(report) = try_link_single(pathset, output, delete_source) {
        return Ok(report);
    }

    let copy_failed = |reason: String| GalaxyError::CopyFailed {
        dest: output.display().to_string(),
        reason,
    };

    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let temp = NamedTempFile::new_in(dir).map_err(|e| GalaxyError::filesystem(dir.display().to_string(), e))?;

    let start = Instant::now();
    let mut bytes = 0;
    {
        let mut writer = BufWriter::new(temp.as_file());
        for (idx, uri) in pathset.iter().enumerate() {
            debug!("Appending {}", uri);
            bytes += append(fs, uri, &mut writer)?;
            if idx % 5 == 0 {
                log_progress(idx + 1, pathset.len(), bytes);
            }
        }
        writer.flush().map_err(|e| copy_failed(e.to_string()))?;
    }
    log_progress(pathset.len(), pathset.len(), bytes);

    temp.persist(output).map_err(|e| copy_failed(e.error.to_string()))?;

    let seconds = start.elapsed().as_secs_f64();
    let mb = bytes as f64 / MB;
    info!(
        "Concatenation finished. Wrote {:.1} MB in {:.0} seconds ({:.1} MB/s)",
        mb,
        seconds,
        mb / seconds.max(0.1)
    );

    if delete_source {
        info!("Deleting source data");
        for uri in pathset {
            if let Err(e) = fs.remove_all(uri) {
                warn!("Unable to delete source path {}: {}", uri, e);
            }
        }
    }

    Ok(ConcatReport { bytes, linked: false })
}

/// Hard links a pathset holding one local file to a local output. Returns
/// `None` when the pathset does not qualify or linking fails.
fn try_link_single(pathset: &Pathset, output: &Path, delete_source: bool) -> Option<ConcatReport> {
    let [only] = pathset.entries() else {
        return None;
    };
    let source = Path::new(only.path());
    if !only.is_local() || !source.is_file() {
        return None;
    }

    debug!("Pathset contains a single local file. Trying to hard link");
    if output.exists() {
        let _ = fs::remove_file(output);
    }
    if let Err(e) = fs::hard_link(source, output) {
        info!("Failed to hard link {} ({}). Will copy.", source.display(), e);
        return None;
    }
    info!("Hard linked {} to {} instead of copying", source.display(), output.display());

    if delete_source {
        info!("As requested, removing source file {}", source.display());
        if let Err(e) = fs::remove_file(source) {
            warn!("Failed to remove source file {}: {}", source.display(), e);
        }
    }
    Some(ConcatReport { bytes: 0, linked: true })
}

fn append(fs: &dyn FileSystem, uri: &UriRef, sink: &mut dyn Write) -> Result<u64> {
    if fs.is_dir(uri)? {
        return append_dir(fs, uri, sink);
    }
    fs.read_into(uri, sink)
        .map_err(|e| GalaxyError::filesystem(uri.to_string(), e))
}

/// Appends every file under `dir`, in name order.
fn append_dir(fs: &dyn FileSystem, dir: &UriRef, sink: &mut dyn Write) -> Result<u64> {
    let mut children: Vec<UriRef> = fs
        .list_dir(dir)?
        .into_iter()
        .filter(|child| !child.base_name().starts_with('_'))
        .collect();
    children.sort_by(|a, b| a.path().cmp(b.path()));
    debug!("Appending {} items from directory {}", children.len(), dir);

    let mut bytes = 0;
    for child in &children {
        bytes += append(fs, child, sink)?;
    }
    Ok(bytes)
}

fn log_progress(done: usize, total: usize, bytes: u64) {
    let percent = if total == 0 { 100.0 } else { 100.0 * done as f64 / total as f64 };
    info!(
        "Processed {} of {} ({:.1} %). Copied {:.1} MB",
        done,
        total,
        percent,
        bytes as f64 / MB
    );
}
