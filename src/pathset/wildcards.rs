//! Wildcard Expansion
//!
//! Expands a URI whose path may contain shell glob characters into the
//! concrete objects it names. An object that exists under its literal name is
//! never treated as a pattern, so paths that happen to contain `*` or `[`
//! survive untouched.

use log::debug;

use super::uri::UriRef;
use crate::error::Result;
use crate::filesystem::FileSystem;

/// Expands one URI into the objects it matches, in listing order.
///
/// Fails with `ListingFailed` if the pattern cannot be listed; nothing is
/// returned in that case.
pub fn expand(fs: &dyn FileSystem, uri: &UriRef) -> Result<Vec<UriRef>> {
    if fs.exists(uri)? {
        return Ok(vec![uri.clone()]);
    }

    let matches = fs.list(uri)?;
    debug!("{} expanded to {} path(s)", uri, matches.len());
    Ok(matches)
}

/// Expands every URI in order and concatenates the results.
pub fn expand_all<'u, I>(fs: &dyn FileSystem, uris: I) -> Result<Vec<UriRef>>
where
    I: IntoIterator<Item = &'u UriRef>,
{
    let mut expanded = Vec::new();
    for uri in uris {
        expanded.extend(expand(fs, uri)?);
    }
    Ok(expanded)
}
