//! Pathset Module
//!
//! Pathsets are the small descriptor files that stand in for whole datasets
//! inside Galaxy.
//!
//! # Structure
//!
//! - [`uri`]: validated URI references
//! - [`model`]: the [`Pathset`] collection
//! - [`parser`]: reading and writing the text format
//! - [`resolver`]: raw path strings to URIs
//! - [`wildcards`]: glob expansion through a filesystem
//! - [`split`]: regular expression splitting

pub mod model;
pub mod parser;
pub mod resolver;
pub mod split;
pub mod uri;
pub mod wildcards;

pub use model::Pathset;
pub use parser::{format_pathset, load_pathset, read_pathset, save_pathset};
pub use resolver::{PathResolver, ResolveMode};
pub use split::{compile_test, expand_levels, split_pathset, SplitResult};
pub use uri::{UriRef, FILE_SCHEME};
pub use wildcards::{expand, expand_all};
