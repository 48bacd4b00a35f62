//! Copying Pathset Data to a Workspace
//!
//! Copies everything a pathset names into a fresh directory under a
//! workspace on the distributed filesystem, then describes the copy with a
//! one-entry pathset. The fresh directory is named after the Galaxy output
//! dataset, so every run gets its own.
//!
//! Sources keep their directory structure below the destination, because
//! base names alone are not guaranteed to be unique:
//!
//! ```text
//! /tmp/dirA/file1 /tmp/dirA/file2  ->  <dest>/tmp/dirA/
//! /tmp/dirB/file1                  ->  <dest>/tmp/dirB/
//! ```
//!
//! One copy operation runs per destination directory.

use std::path::Path;

use log::{debug, info, warn};

use crate::environment::Environment;
use crate::error::{GalaxyError, Result};
use crate::filesystem::FileSystem;
use crate::pathset::{expand_all, Pathset, UriRef};

/// Environment variable naming the default workspace.
pub const PUT_DIR_ENV: &str = "HADOOP_GALAXY_PUT_DIR";

/// Bulk copy between clusters, e.g. `hadoop distcp`.
pub trait DistCopy {
    /// Copies `sources` into the directory `dest_dir`, which must not exist
    /// beforehand and exists afterwards only if every source was copied.
    fn distcp(&self, sources: &[UriRef], dest_dir: &UriRef) -> Result<()>;
}

/// How the data is moved.
pub enum CopyMethod<'a> {
    /// One filesystem copy per source.
    Simple,
    /// One bulk job per destination directory.
    Distcp(&'a dyn DistCopy),
}

/// Picks the raw workspace: the explicit flag, then [`PUT_DIR_ENV`].
pub fn workspace_setting(flag: Option<&str>, env: &Environment) -> Result<String> {
    flag.filter(|w| !w.is_empty())
        .or_else(|| env.get_non_empty(PUT_DIR_ENV))
        .map(str::to_string)
        .ok_or_else(|| {
            GalaxyError::Configuration(format!(
                "You need to specify a workspace URI, either via the --hadoop-workspace option or the {} environment variable",
                PUT_DIR_ENV
            ))
        })
}

/// The per-run directory: `<workspace>/<base name of output_dataset>`.
pub fn destination_path(workspace: &UriRef, output_dataset: &Path) -> Result<UriRef> {
    let name = output_dataset
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            GalaxyError::invalid_path(output_dataset.display().to_string(), "no usable base name")
        })?;
    workspace.join(name)
}

/// Groups sources by the directory they are copied into, in order of first
/// appearance.
pub fn copy_groups(dest: &UriRef, sources: &[UriRef]) -> Result<Vec<(UriRef, Vec<UriRef>)>> {
    let mut groups: Vec<(UriRef, Vec<UriRef>)> = Vec::new();

    for src in sources {
        let parent = src
            .path()
            .trim_end_matches('/')
            .rsplit_once('/')
            .map(|(dir, _)| dir.trim_start_matches('/'))
            .unwrap_or("");
        let dest_dir = if parent.is_empty() { dest.clone() } else { dest.join(parent)? };

        match groups.iter_mut().find(|(dir, _)| *dir == dest_dir) {
            Some((_, members)) => members.push(src.clone()),
            None => groups.push((dest_dir, vec![src.clone()])),
        }
    }

    Ok(groups)
}

/// Copies the data of `source` below `workspace` and returns the pathset
/// describing the copy.
///
/// The workspace is created if missing. The per-run destination must not
/// exist yet. If any copy fails the destination is removed again and the
/// error returned.
pub fn put_pathset(
    fs: &dyn FileSystem,
    method: CopyMethod<'_>,
    source: &Pathset,
    workspace: &UriRef,
    output_dataset: &Path,
) -> Result<Pathset> {
    info!("Workspace set to {}", workspace);
    if fs.exists(workspace)? {
        if !fs.is_dir(workspace)? {
            return Err(GalaxyError::Configuration(format!(
                "Workspace path {} exists and it's not a directory!",
                workspace
            )));
        }
    } else {
        info!("Workspace directory {} doesn't exist. Creating it.", workspace);
        fs.create_dir_all(workspace)
            .map_err(|e| GalaxyError::filesystem(workspace.to_string(), e))?;
    }

    let dest = destination_path(workspace, output_dataset)?;
    info!("Destination path: {}", dest);
    if fs.exists(&dest)? {
        return Err(GalaxyError::Configuration(format!(
            "Destination path {} already exists. Did you provide a valid Galaxy output dataset argument?",
            dest
        )));
    }

    let sources = expand_all(fs, source)?;
    let groups = copy_groups(&dest, &sources)?;
    debug!("{} source path(s) in {} copy group(s)", sources.len(), groups.len());

    if let Err(e) = copy_all(fs, &method, &groups) {
        warn!("Failed to copy data to {}: {}", dest, e);
        info!("Cleaning up {}, if it exists", dest);
        if let Err(cleanup) = fs.remove_all(&dest) {
            debug!("Failed to clean up {}: {}", dest, cleanup);
        }
        return Err(e);
    }

    let mut output = Pathset::from_entries(vec![dest]);
    output.set_datatype(source.datatype().map(str::to_string));
    let copied_from: Vec<String> = source.iter().map(|uri| uri.to_string()).collect();
    output.set_comment(format!("Copied from\n{}", copied_from.join("\n")));
    Ok(output)
}

fn copy_all(fs: &dyn FileSystem, method: &CopyMethod<'_>, groups: &[(UriRef, Vec<UriRef>)]) -> Result<()> {
    for (dest_dir, sources) in groups {
        match method {
            CopyMethod::Distcp(bulk) => bulk.distcp(sources, dest_dir)?,
            CopyMethod::Simple => {
                fs.create_dir_all(dest_dir)
                    .map_err(|e| GalaxyError::filesystem(dest_dir.to_string(), e))?;
                for src in sources {
                    debug!("Copying {} into {}", src, dest_dir);
                    fs.copy_into(src, dest_dir).map_err(|e| GalaxyError::CopyFailed {
                        dest: dest_dir.to_string(),
                        reason: format!("{}: {}", src, e),
                    })?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::memory::MemoryFs;

    fn uri(raw: &str) -> UriRef {
        UriRef::parse(raw).unwrap()
    }

    fn source_pathset() -> Pathset {
        Pathset::from_entries(vec![uri("hdfs://nn/data/dirA/*"), uri("hdfs://nn/data/dirB/f1")])
            .with_datatype("fastq")
    }

    fn cluster() -> MemoryFs {
        MemoryFs::new("hdfs://nn")
            .with_object("/data/dirA/f1")
            .with_object("/data/dirA/f2")
            .with_object("/data/dirB/f1")
            .with_dir("/ws")
    }

    struct FailingDistcp<'a>(&'a MemoryFs);

    impl DistCopy for FailingDistcp<'_> {
        fn distcp(&self, _sources: &[UriRef], dest_dir: &UriRef) -> Result<()> {
            self.0.create_dir_all(dest_dir).unwrap();
            Err(GalaxyError::CopyFailed {
                dest: dest_dir.to_string(),
                reason: "job killed".to_string(),
            })
        }
    }

    #[test]
    fn test_workspace_setting() {
        let env = Environment::from_pairs([(PUT_DIR_ENV, "hdfs://nn/env_ws")]);
        assert_eq!(workspace_setting(Some("hdfs://nn/flag_ws"), &env).unwrap(), "hdfs://nn/flag_ws");
        assert_eq!(workspace_setting(None, &env).unwrap(), "hdfs://nn/env_ws");
        assert!(matches!(
            workspace_setting(None, &Environment::new()),
            Err(GalaxyError::Configuration(_))
        ));
    }

    #[test]
    fn test_destination_named_after_dataset() {
        let dest = destination_path(&uri("hdfs://nn/ws"), Path::new("/galaxy/files/dataset_7.dat")).unwrap();
        assert_eq!(dest.to_string(), "hdfs://nn/ws/dataset_7.dat");
    }

    #[test]
    fn test_copy_groups_keep_source_directories() {
        let dest = uri("hdfs://nn/ws/job7");
        let sources = vec![
            uri("file:///tmp/dirA/file1"),
            uri("file:///tmp/dirB/file1"),
            uri("file:///tmp/dirA/file2"),
        ];

        let groups = copy_groups(&dest, &sources).unwrap();
        let rendered: Vec<(String, usize)> =
            groups.iter().map(|(dir, members)| (dir.to_string(), members.len())).collect();
        assert_eq!(
            rendered,
            vec![
                ("hdfs://nn/ws/job7/tmp/dirA".to_string(), 2),
                ("hdfs://nn/ws/job7/tmp/dirB".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_simple_copy() {
        let fs = cluster();
        let output = put_pathset(
            &fs,
            CopyMethod::Simple,
            &source_pathset(),
            &uri("hdfs://nn/ws"),
            Path::new("/galaxy/files/dataset_7.dat"),
        )
        .unwrap();

        assert_eq!(output.single().unwrap().to_string(), "hdfs://nn/ws/dataset_7.dat");
        assert_eq!(output.datatype(), Some("fastq"));
        assert_eq!(
            output.comment(),
            "Copied from\nhdfs://nn/data/dirA/*\nhdfs://nn/data/dirB/f1"
        );
        for copied in ["/ws/dataset_7.dat/data/dirA/f1", "/ws/dataset_7.dat/data/dirA/f2", "/ws/dataset_7.dat/data/dirB/f1"] {
            assert!(fs.exists(&uri(&format!("hdfs://nn{}", copied))).unwrap(), "{}", copied);
        }
    }

    #[test]
    fn test_missing_workspace_is_created() {
        let fs = MemoryFs::new("hdfs://nn").with_object("/data/x");
        let source = Pathset::from_entries(vec![uri("hdfs://nn/data/x")]);

        put_pathset(&fs, CopyMethod::Simple, &source, &uri("hdfs://nn/new_ws"), Path::new("out.dat")).unwrap();
        assert_eq!(fs.created.borrow()[0], "hdfs://nn/new_ws");
    }

    #[test]
    fn test_workspace_must_be_directory() {
        let fs = cluster().with_object("/plain_file");
        let result = put_pathset(
            &fs,
            CopyMethod::Simple,
            &source_pathset(),
            &uri("hdfs://nn/plain_file"),
            Path::new("out.dat"),
        );
        assert!(matches!(result, Err(GalaxyError::Configuration(_))));
    }

    #[test]
    fn test_existing_destination_rejected() {
        let fs = cluster().with_dir("/ws/dataset_7.dat");
        let result = put_pathset(
            &fs,
            CopyMethod::Simple,
            &source_pathset(),
            &uri("hdfs://nn/ws"),
            Path::new("dataset_7.dat"),
        );
        assert!(matches!(result, Err(GalaxyError::Configuration(_))));
        assert!(fs.removed.borrow().is_empty());
    }

    #[test]
    fn test_failed_distcp_cleans_up() {
        let fs = cluster();
        let bulk = FailingDistcp(&fs);
        let result = put_pathset(
            &fs,
            CopyMethod::Distcp(&bulk),
            &source_pathset(),
            &uri("hdfs://nn/ws"),
            Path::new("dataset_7.dat"),
        );

        assert!(matches!(result, Err(GalaxyError::CopyFailed { .. })));
        assert_eq!(*fs.removed.borrow(), vec!["hdfs://nn/ws/dataset_7.dat".to_string()]);
    }
}
