//! Splitting Pathsets by Regular Expression
//!
//! Each path in a pathset is tested against a regular expression anchored at
//! the start of the URI (and optionally at the end). Matching paths go into
//! one pathset, the rest into another. Directories can be descended into a
//! fixed number of levels first, so that their contents are tested one by
//! one.

use log::{debug, warn};
use regex::Regex;

use super::model::Pathset;
use super::uri::UriRef;
use crate::error::{GalaxyError, Result};
use crate::filesystem::FileSystem;

/// The two halves of a split.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitResult {
    pub matched: Pathset,
    pub unmatched: Pathset,
}

/// Compiles `expression` so that it must match from the start of a path, and
/// also at its end when `anchor_end` is set.
pub fn compile_test(expression: &str, anchor_end: bool) -> Result<Regex> {
    let anchored = if anchor_end {
        format!("^(?:{})$", expression)
    } else {
        format!("^(?:{})", expression)
    };
    Regex::new(&anchored).map_err(|e| {
        GalaxyError::Configuration(format!("Error compiling regular expression '{}': {}", expression, e))
    })
}

/// Walks down from `root` at most `max_levels` directory levels and returns
/// the leaves reached.
///
/// Children whose names start with `.` or `_` are skipped. A root that does
/// not exist is skipped with a warning.
pub fn expand_levels(fs: &dyn FileSystem, root: &UriRef, max_levels: usize) -> Result<Vec<UriRef>> {
    if max_levels == 0 {
        return Ok(vec![root.clone()]);
    }

    if !fs.is_dir(root)? {
        if fs.exists(root)? {
            return Ok(vec![root.clone()]);
        }
        warn!("Skipping {}: not a file or directory", root);
        return Ok(Vec::new());
    }

    let mut leaves = Vec::new();
    for child in fs.list_dir(root)? {
        if child.base_name().starts_with(['.', '_']) {
            debug!("Skipping hidden path {}", child);
            continue;
        }
        if max_levels == 1 || !fs.is_dir(&child)? {
            leaves.push(child);
        } else {
            leaves.extend(expand_levels(fs, &child, max_levels - 1)?);
        }
    }
    Ok(leaves)
}

/// Splits `source` by `test`. Both halves keep the source's data type.
pub fn split_pathset(
    fs: &dyn FileSystem,
    source: &Pathset,
    test: &Regex,
    max_levels: usize,
) -> Result<SplitResult> {
    let mut matched = Pathset::new();
    let mut unmatched = Pathset::new();
    matched.set_datatype(source.datatype().map(str::to_string));
    unmatched.set_datatype(source.datatype().map(str::to_string));

    for path in source {
        for leaf in expand_levels(fs, path, max_levels)? {
            if test.is_match(&leaf.to_string()) {
                matched.push(leaf);
            } else {
                unmatched.push(leaf);
            }
        }
    }

    debug!(
        "Split {} path(s): {} matched, {} did not",
        source.len(),
        matched.len(),
        unmatched.len()
    );
    Ok(SplitResult { matched, unmatched })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::memory::MemoryFs;

    fn uri(raw: &str) -> UriRef {
        UriRef::parse(raw).unwrap()
    }

    #[test]
    fn test_compile_test_anchors() {
        let start_only = compile_test("hdfs://nn/a", false).unwrap();
        assert!(start_only.is_match("hdfs://nn/abc"));
        assert!(!start_only.is_match("x-hdfs://nn/a"));

        let both = compile_test("hdfs://nn/a", true).unwrap();
        assert!(both.is_match("hdfs://nn/a"));
        assert!(!both.is_match("hdfs://nn/abc"));
    }

    #[test]
    fn test_compile_test_bad_expression() {
        assert!(matches!(compile_test("(unclosed", false), Err(GalaxyError::Configuration(_))));
    }

    #[test]
    fn test_split_without_expansion() {
        let fs = MemoryFs::new("hdfs://nn");
        let source = Pathset::from_entries(vec![uri("hdfs://nn/r1.fq"), uri("hdfs://nn/r1.bam")])
            .with_datatype("mixed");

        let test = compile_test(r".*\.fq", true).unwrap();
        let result = split_pathset(&fs, &source, &test, 0).unwrap();

        assert_eq!(result.matched.entries(), &[uri("hdfs://nn/r1.fq")]);
        assert_eq!(result.unmatched.entries(), &[uri("hdfs://nn/r1.bam")]);
        assert_eq!(result.matched.datatype(), Some("mixed"));
        assert_eq!(result.unmatched.datatype(), Some("mixed"));
    }

    #[test]
    fn test_expand_levels_skips_hidden() {
        let fs = MemoryFs::new("hdfs://nn")
            .with_object("/run/lane1/r.fq")
            .with_object("/run/lane2/r.fq")
            .with_object("/run/_SUCCESS")
            .with_object("/run/.crc")
            .with_object("/run/summary.txt");

        let one = expand_levels(&fs, &uri("hdfs://nn/run"), 1).unwrap();
        let names: Vec<String> = one.iter().map(|u| u.path().to_string()).collect();
        assert_eq!(names, vec!["/run/lane1", "/run/lane2", "/run/summary.txt"]);

        let two = expand_levels(&fs, &uri("hdfs://nn/run"), 2).unwrap();
        let names: Vec<String> = two.iter().map(|u| u.path().to_string()).collect();
        assert_eq!(names, vec!["/run/lane1/r.fq", "/run/lane2/r.fq", "/run/summary.txt"]);
    }

    #[test]
    fn test_expand_levels_missing_root_is_skipped() {
        let fs = MemoryFs::new("hdfs://nn");
        assert!(expand_levels(&fs, &uri("hdfs://nn/none"), 2).unwrap().is_empty());
    }
}
