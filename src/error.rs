//! Error types for the audit pipeline
//!
//! Attribute *absence* is deliberately not represented here: the accessor
//! reports it as `Ok(None)` so callers can treat "nothing to do" separately
//! from a genuine fault.

use std::path::PathBuf;
use thiserror::Error;

/// Unexpected failure reading an extended attribute
///
/// Covers permission denied, stale handles, I/O faults and malformed
/// inputs. Carries the path and attribute name so the diagnostic names
/// exactly what could not be read; the numeric error code is available
/// through the wrapped `std::io::Error`.
#[derive(Debug, Error)]
pub enum XattrError {
    /// The underlying `lgetxattr` call failed with an unexpected errno
    #[error("lgetxattr {name} on {path}: {source}", path = .path.display())]
    Query {
        /// Path the query was issued against
        path: PathBuf,
        /// Attribute name that was requested
        name: String,
        /// Captured OS error (errno preserved via `raw_os_error`)
        #[source]
        source: std::io::Error,
    },

    /// The path contains an interior NUL byte and cannot be passed to libc
    #[error("path contains an interior NUL byte: {path}", path = .path.display())]
    InvalidPath {
        /// Offending path
        path: PathBuf,
    },

    /// The attribute name contains an interior NUL byte
    #[error("attribute name contains an interior NUL byte: {name}")]
    InvalidName {
        /// Offending attribute name
        name: String,
    },
}

/// The external byte-comparison tool could not be run
///
/// Distinct from a divergent result: a missing or broken tool must never
/// masquerade as "all replicas identical" or as corruption.
#[derive(Debug, Error)]
pub enum CompareError {
    /// Spawning or waiting on the comparison tool failed
    #[error("failed to run comparison tool {tool}: {source}", tool = .tool.display())]
    Spawn {
        /// Tool that was invoked
        tool: PathBuf,
        /// Underlying spawn/wait error
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_error_names_path_attribute_and_cause() {
        let err = XattrError::Query {
            path: PathBuf::from("/mnt/pool/file"),
            name: "user.mergerfs.allpaths".to_string(),
            source: std::io::Error::from_raw_os_error(libc::EACCES),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("/mnt/pool/file"));
        assert!(rendered.contains("user.mergerfs.allpaths"));
        assert!(rendered.contains("lgetxattr"));
    }

    #[test]
    fn spawn_error_names_the_tool() {
        let err = CompareError::Spawn {
            tool: PathBuf::from("diff"),
            source: std::io::Error::from_raw_os_error(libc::ENOENT),
        };
        assert!(err.to_string().contains("diff"));
    }
}
