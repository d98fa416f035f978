//! Replica comparison and per-replica metadata capture
//!
//! Byte-level equality is delegated to an external all-way comparison tool
//! behind the [`ByteComparator`] trait, so the engine can later be swapped
//! for an in-process hash or byte comparison without touching the auditor
//! or resolver. Only the tool's exit status matters: 0 means all replicas
//! are identical, anything else means at least one differs. The tool is
//! not required to say *which* replica is the outlier.

use crate::error::CompareError;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::warn;

/// Metadata captured for one replica of a divergent set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatSnapshot {
    /// User ID of owner
    pub uid: u32,
    /// Group ID of owner
    pub gid: u32,
    /// File mode (type + permission bits)
    pub mode: u32,
    /// File size in bytes
    pub size: u64,
    /// Modification time, seconds since the epoch
    pub mtime: i64,
}

/// A replica's metadata, or a marker that it could not be captured
///
/// A replica can vanish between comparison and stat; the audit is
/// read-only and tolerates that race by downgrading the single entry
/// instead of aborting the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplicaStat {
    /// Metadata was captured successfully
    Available(StatSnapshot),
    /// The replica could not be stat'ed (vanished mid-audit)
    Unavailable,
}

/// Classification of one replica set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparison {
    /// Every replica is byte-identical
    Consistent,
    /// At least one replica differs; carries one stat record per replica,
    /// parallel to the input set
    Divergent(Vec<ReplicaStat>),
}

/// Byte-level equality engine for a replica set
pub trait ByteComparator {
    /// Whether every listed replica has identical content
    ///
    /// # Errors
    ///
    /// Returns [`CompareError`] when the comparison could not be carried
    /// out at all: a tooling problem, distinct from a divergent result.
    fn all_identical(&self, replicas: &[PathBuf]) -> Result<bool, CompareError>;
}

/// [`ByteComparator`] backed by an external `diff -q` invocation
///
/// The tool is handed the full list of replica paths in one invocation;
/// its stdout and stderr are discarded, only the exit status is read.
#[derive(Debug, Clone)]
pub struct DiffTool {
    /// Program to invoke; `diff` from PATH by default
    program: PathBuf,
}

impl DiffTool {
    /// Comparator using `diff` resolved from PATH
    #[must_use]
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("diff"),
        }
    }

    /// Comparator using a specific program (mainly for tests)
    #[must_use]
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for DiffTool {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteComparator for DiffTool {
    fn all_identical(&self, replicas: &[PathBuf]) -> Result<bool, CompareError> {
        let status = Command::new(&self.program)
            .arg("-q")
            .args(replicas)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|source| CompareError::Spawn {
                tool: self.program.clone(),
                source,
            })?;
        Ok(status.success())
    }
}

/// Capture metadata for one replica without following symlinks
fn snapshot(path: &Path) -> ReplicaStat {
    match std::fs::symlink_metadata(path) {
        Ok(meta) => ReplicaStat::Available(StatSnapshot {
            uid: meta.uid(),
            gid: meta.gid(),
            mode: meta.mode(),
            size: meta.size(),
            mtime: meta.mtime(),
        }),
        Err(err) => {
            warn!(
                path = %path.display(),
                error = %err,
                "replica unavailable for metadata capture"
            );
            ReplicaStat::Unavailable
        }
    }
}

/// Compare all replicas in a set and, on divergence, capture metadata for
/// every replica for the report
///
/// Callers only invoke this for sets with at least two members; smaller
/// sets are filtered out by the resolver.
///
/// # Errors
///
/// Propagates [`CompareError`] when the engine itself failed; the result
/// is then uncertain, neither consistent nor divergent.
pub fn compare<C: ByteComparator>(
    engine: &C,
    replicas: &[PathBuf],
) -> Result<Comparison, CompareError> {
    debug_assert!(replicas.len() >= 2, "comparison needs at least two replicas");

    if engine.all_identical(replicas)? {
        return Ok(Comparison::Consistent);
    }
    Ok(Comparison::Divergent(
        replicas.iter().map(|path| snapshot(path)).collect(),
    ))
}
