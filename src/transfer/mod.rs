//! Data Transfer Module
//!
//! Moves the data behind a pathset, as opposed to the pathset file itself.
//!
//! - [`concat`]: join everything a pathset names into one local file
//! - [`put`]: copy a pathset's data into a workspace on the distributed
//!   filesystem and describe the copy with a new pathset

pub mod concat;
pub mod put;

pub use concat::{concat_pathset, ConcatReport};
pub use put::{copy_groups, destination_path, put_pathset, workspace_setting, CopyMethod, DistCopy, PUT_DIR_ENV};
