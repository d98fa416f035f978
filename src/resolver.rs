//! Replica set resolution via mergerfs control attributes
//!
//! mergerfs exposes two attributes the audit relies on:
//!
//! - `user.mergerfs.fullpath`: present on every entry under a mergerfs
//!   mount; used purely as an existence probe for the precondition check
//! - `user.mergerfs.allpaths`: a NUL-joined list of the physical paths
//!   backing a pooled file, one per underlying drive holding a copy

use crate::error::XattrError;
use crate::xattr;
use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

/// Identity marker attribute present on entries managed by mergerfs
pub const POOL_MARKER_XATTR: &str = "user.mergerfs.fullpath";

/// NUL-joined list of physical replica paths for a pooled file
pub const REPLICA_LIST_XATTR: &str = "user.mergerfs.allpaths";

/// Check whether `path` is managed by mergerfs
///
/// True iff the identity marker attribute is present. Performed once
/// against the audit root before any walk begins.
///
/// # Errors
///
/// Faults other than attribute absence propagate: if the marker cannot be
/// read at all, the mount cannot be audited and the caller must not
/// proceed.
pub fn is_pooled_mount(path: &Path) -> Result<bool, XattrError> {
    Ok(xattr::get(path, POOL_MARKER_XATTR)?.is_some())
}

/// Resolve the physical replica paths backing `path`
///
/// Returns an empty vector when the file is not pooled, has no replica
/// attribute, or has at most one physical location; a single-location
/// file cannot diverge from itself, so the caller skips it either way.
/// Replica order is preserved as reported by the filesystem.
///
/// # Errors
///
/// Propagates [`XattrError`] when the replica attribute exists but cannot
/// be read.
pub fn resolve_replicas(path: &Path) -> Result<Vec<PathBuf>, XattrError> {
    let Some(raw) = xattr::get(path, REPLICA_LIST_XATTR)? else {
        return Ok(Vec::new());
    };

    let replicas = split_replica_list(&raw);
    if replicas.len() <= 1 {
        return Ok(Vec::new());
    }
    Ok(replicas)
}

/// Split a raw NUL-joined attribute value into paths
///
/// Empty elements are discarded: a trailing NUL terminator produces one,
/// and it must not be mistaken for a zero-length path. Paths are rebuilt
/// from the raw bytes without any text decoding.
fn split_replica_list(raw: &[u8]) -> Vec<PathBuf> {
    raw.split(|&b| b == 0)
        .filter(|part| !part.is_empty())
        .map(|part| PathBuf::from(OsStr::from_bytes(part)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_nul_joined_paths_with_trailing_terminator() {
        let raw = b"/disk1/a.txt\0/disk2/a.txt\0/disk3/a.txt\0";
        let paths = split_replica_list(raw);
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/disk1/a.txt"),
                PathBuf::from("/disk2/a.txt"),
                PathBuf::from("/disk3/a.txt"),
            ]
        );
    }

    #[test]
    fn splits_without_trailing_terminator() {
        let raw = b"/disk1/a.txt\0/disk2/a.txt";
        assert_eq!(split_replica_list(raw).len(), 2);
    }

    #[test]
    fn empty_value_yields_no_paths() {
        assert!(split_replica_list(b"").is_empty());
        assert!(split_replica_list(b"\0").is_empty());
    }

    #[test]
    fn consecutive_nuls_do_not_produce_empty_paths() {
        let paths = split_replica_list(b"/disk1/a\0\0/disk2/a\0");
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| !p.as_os_str().is_empty()));
    }

    #[test]
    fn non_utf8_path_bytes_survive_splitting() {
        let raw = b"/disk1/\xff\xfe\0/disk2/\xff\xfe\0";
        let paths = split_replica_list(raw);
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].as_os_str().as_bytes(), b"/disk1/\xff\xfe");
    }
}
