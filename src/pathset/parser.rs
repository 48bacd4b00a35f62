//! Pathset File Format
//!
//! Pathsets are stored as UTF-8 text, one URI per line:
//!
//! ```text
//! #datatype: fastq
//! # optional comment lines
//! hdfs://nn:9000/user/galaxy/reads/lane1
//! hdfs://nn:9000/user/galaxy/reads/lane2
//! ```
//!
//! The `#datatype:` line is only recognized as the first line. Blank lines
//! and other `#` lines never become entries. Files written by older releases
//! start with a tab-separated `# Pathset` header, which is still accepted.

use std::fmt::Write as _;
use std::fs;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use log::{debug, info};
use tempfile::NamedTempFile;

use super::model::Pathset;
use super::uri::UriRef;
use crate::error::{GalaxyError, Result};

/// Prefix of the metadata line carrying the data type.
pub const DATATYPE_PREFIX: &str = "#datatype:";

const LEGACY_MAGIC: &str = "# Pathset";
const LEGACY_VERSION: &str = "0.0";
const LEGACY_UNKNOWN_TYPE: &str = "Unknown";

/// Reads a pathset from any buffered reader.
pub fn read_pathset<R: BufRead>(reader: R) -> Result<Pathset> {
    let mut pathset = Pathset::new();
    let mut comments = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;

        if index == 0 {
            if let Some(tag) = line.strip_prefix(DATATYPE_PREFIX) {
                pathset.set_datatype(Some(tag.trim().to_string()));
                continue;
            }
            if is_legacy_header(&line) {
                pathset.set_datatype(parse_legacy_header(&line)?);
                continue;
            }
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(comment) = line.strip_prefix('#') {
            // one space after '#' belongs to the format, not the comment
            comments.push(comment.strip_prefix(' ').unwrap_or(comment).to_string());
            continue;
        }

        pathset.push(UriRef::parse(trimmed)?);
    }

    pathset.set_comment(comments.join("\n"));
    Ok(pathset)
}

/// The legacy header is the magic alone or the magic followed by tab
/// separated fields; a comment that merely starts with "Pathset" is not one.
fn is_legacy_header(line: &str) -> bool {
    match line.strip_prefix(LEGACY_MAGIC) {
        Some(rest) => rest.is_empty() || rest.starts_with('\t'),
        None => false,
    }
}

/// Parses `# Pathset<TAB>Version:0.0<TAB>DataType:<tag>`.
fn parse_legacy_header(header: &str) -> Result<Option<String>> {
    let mut datatype = None;

    for field in header.split('\t').skip(1) {
        let Some((key, value)) = field.split_once(':') else {
            return Err(GalaxyError::PathsetFormat(format!(
                "malformed header field '{}'",
                field
            )));
        };
        match key {
            "Version" if value != LEGACY_VERSION => {
                return Err(GalaxyError::PathsetFormat(format!(
                    "incompatible version (found {} but expected {})",
                    value, LEGACY_VERSION
                )));
            }
            "DataType" if value != LEGACY_UNKNOWN_TYPE => {
                datatype = Some(value.to_string());
            }
            _ => {}
        }
    }

    Ok(datatype)
}

/// Renders a pathset in its file format.
pub fn format_pathset(pathset: &Pathset) -> String {
    let mut out = String::new();

    if let Some(datatype) = pathset.datatype() {
        let _ = writeln!(out, "{} {}", DATATYPE_PREFIX, datatype);
    }

    if !pathset.comment().is_empty() {
        for line in pathset.comment().split('\n') {
            let _ = writeln!(out, "# {}", line);
        }
    }

    for uri in pathset {
        let _ = writeln!(out, "{}", uri);
    }

    out
}

/// Loads a pathset file from disk.
///
/// # Example
///
/// ```rust,no_run
/// use hadoop_galaxy::pathset::load_pathset;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pathset = load_pathset("input.pathset")?;
///     println!("{} paths", pathset.len());
///     Ok(())
/// }
/// ```
pub fn load_pathset(path: impl AsRef<Path>) -> Result<Pathset> {
    let path = path.as_ref();
    debug!("Reading pathset from {}", path.display());

    let file = fs::File::open(path).map_err(|e| GalaxyError::filesystem(path.display().to_string(), e))?;
    let pathset = read_pathset(BufReader::new(file))?;

    debug!(
        "Read pathset with {} paths (datatype: {})",
        pathset.len(),
        pathset.datatype().unwrap_or("none")
    );
    Ok(pathset)
}

/// Writes a pathset file, replacing whatever was there.
///
/// The text goes to a temporary file in the same directory, which is then
/// renamed over `path`. A failed write leaves any previous file intact.
pub fn save_pathset(pathset: &Pathset, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    write_atomically(path, format_pathset(pathset).as_bytes())
        .map_err(|e| GalaxyError::filesystem(path.display().to_string(), e))?;
    info!("Wrote pathset with {} paths to {}", pathset.len(), path.display());
    Ok(())
}

fn write_atomically(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.as_file().set_permissions(fs::Permissions::from_mode(0o644))?;
    }

    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read_str(text: &str) -> Result<Pathset> {
        read_pathset(Cursor::new(text))
    }

    fn sample() -> Pathset {
        let mut pathset = Pathset::from_entries(vec![
            UriRef::parse("file:///etc").unwrap(),
            UriRef::parse("hdfs://nn:9000/lib").unwrap(),
            UriRef::parse("file:///bin").unwrap(),
        ])
        .with_datatype("text/plain");
        pathset.set_comment("A test pathset");
        pathset
    }

    #[test]
    fn test_round_trip() {
        let original = sample();
        let restored = read_str(&format_pathset(&original)).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_round_trip_empty() {
        let restored = read_str(&format_pathset(&Pathset::new())).unwrap();
        assert!(restored.is_empty());
        assert_eq!(restored.datatype(), None);
    }

    #[test]
    fn test_round_trip_without_tag() {
        let original = Pathset::from_entries(vec![
            UriRef::parse("hdfs://nn/b.txt").unwrap(),
            UriRef::parse("hdfs://nn/a.txt").unwrap(),
        ]);
        let text = format_pathset(&original);
        assert_eq!(text, "hdfs://nn/b.txt\nhdfs://nn/a.txt\n");
        assert_eq!(read_str(&text).unwrap(), original);
    }

    #[test]
    fn test_multiline_comment_round_trip() {
        let mut original = Pathset::from_entries(vec![UriRef::parse("/x").unwrap()]);
        original.set_comment("Copied from\nhdfs://nn/a\nhdfs://nn/b");
        assert_eq!(read_str(&format_pathset(&original)).unwrap(), original);
    }

    #[test]
    fn test_format_layout() {
        let text = format_pathset(&sample());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "#datatype: text/plain");
        assert_eq!(lines[1], "# A test pathset");
        assert_eq!(lines[2], "file:///etc");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_blank_and_comment_lines_skipped() {
        let pathset = read_str("\nhdfs://nn/a\n\n#no space comment\n   \nhdfs://nn/b\n").unwrap();
        assert_eq!(pathset.len(), 2);
        assert_eq!(pathset.comment(), "no space comment");
    }

    #[test]
    fn test_datatype_only_on_first_line() {
        let pathset = read_str("hdfs://nn/a\n#datatype: fastq\n").unwrap();
        assert_eq!(pathset.datatype(), None);
        assert_eq!(pathset.len(), 1);
    }

    #[test]
    fn test_legacy_header() {
        let pathset = read_str("# Pathset\tVersion:0.0\tDataType:fastq\nhdfs://nn/a\n").unwrap();
        assert_eq!(pathset.datatype(), Some("fastq"));
        assert_eq!(pathset.len(), 1);

        let unknown = read_str("# Pathset\tVersion:0.0\tDataType:Unknown\n").unwrap();
        assert_eq!(unknown.datatype(), None);
    }

    #[test]
    fn test_comment_starting_with_magic_round_trip() {
        let mut original = Pathset::from_entries(vec![UriRef::parse("hdfs://nn/lane1").unwrap()]);
        original.set_comment("Pathset of lane 1");

        let text = format_pathset(&original);
        assert!(text.starts_with("# Pathset of lane 1\n"));
        assert_eq!(read_str(&text).unwrap(), original);
    }

    #[test]
    fn test_bare_legacy_magic() {
        let pathset = read_str("# Pathset\nhdfs://nn/a\n").unwrap();
        assert_eq!(pathset.datatype(), None);
        assert_eq!(pathset.comment(), "");
        assert_eq!(pathset.len(), 1);
    }

    #[test]
    fn test_legacy_header_bad_version() {
        let result = read_str("# Pathset\tVersion:9.9\tDataType:fastq\n");
        assert!(matches!(result, Err(GalaxyError::PathsetFormat(_))));
    }

    #[test]
    fn test_invalid_entry_fails() {
        let result = read_str("file:relative/path\n");
        assert!(matches!(result, Err(GalaxyError::InvalidUri { .. })));
    }

    #[test]
    fn test_save_and_load() {
        use tempfile::tempdir;

        let temp_dir = tempdir().unwrap();
        let file = temp_dir.path().join("data.pathset");

        let original = sample();
        save_pathset(&original, &file).unwrap();
        assert_eq!(load_pathset(&file).unwrap(), original);
    }

    #[test]
    fn test_save_replaces_without_leftovers() {
        use tempfile::tempdir;

        let temp_dir = tempdir().unwrap();
        let file = temp_dir.path().join("out.dataset");
        fs::write(&file, "stale contents\n").unwrap();

        let pathset = Pathset::from_entries(vec![UriRef::parse("hdfs://nn/out").unwrap()]);
        save_pathset(&pathset, &file).unwrap();

        assert_eq!(fs::read_to_string(&file).unwrap(), "hdfs://nn/out\n");
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        use tempfile::tempdir;

        let temp_dir = tempdir().unwrap();
        let file = temp_dir.path().join("missing").join("out.dataset");

        let result = save_pathset(&Pathset::new(), &file);
        assert!(matches!(result, Err(GalaxyError::Filesystem { .. })));
        assert!(!file.exists());
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_pathset("/nonexistent/input.pathset");
        assert!(matches!(result, Err(GalaxyError::Filesystem { .. })));
    }
}
