//! Tree audit: walk the mount, resolve and compare every regular file
//!
//! The auditor moves through four phases: the caller validates the root
//! (Initializing), the walk visits every entry (Walking), the partial or
//! complete tally is rendered (Finalizing), and the pass ends (Done).
//! Walking can stop early for two expected, non-error reasons (an
//! interrupt signal, or the report consumer closing the output stream)
//! and both still finalize with whatever was tallied.

use crate::compare::{self, ByteComparator, Comparison};
use crate::error::XattrError;
use crate::report;
use crate::resolver;
use crate::tally::{AuditTally, DivergentSet};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Why the walk stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCause {
    /// Every entry under the root was visited
    Completed,
    /// An interrupt signal arrived; the tally covers the files fully
    /// processed before it
    Interrupted,
    /// The report consumer closed the output stream; not an audit failure
    OutputClosed,
}

/// Result of one audit pass: the tally plus how the walk ended
#[derive(Debug)]
pub struct AuditOutcome {
    /// Accumulated counters and divergent sets
    pub tally: AuditTally,
    /// Why the walk stopped
    pub stop_cause: StopCause,
}

/// Walks a pooled mount and folds per-file comparison results into an
/// [`AuditTally`]
///
/// The caller is responsible for validating the root as a pooled mount
/// before constructing the auditor (the precondition check in `main`);
/// the auditor itself assumes a pooled root. Read-only: no file is ever
/// modified.
pub struct Auditor<C> {
    root: PathBuf,
    engine: C,
    verbose: bool,
    interrupted: Arc<AtomicBool>,
}

impl<C: ByteComparator> Auditor<C> {
    /// Build an auditor over `root` using `engine` for byte comparison
    ///
    /// `interrupted` is polled between files; a signal handler sets it to
    /// request early finalization.
    pub fn new(root: PathBuf, engine: C, verbose: bool, interrupted: Arc<AtomicBool>) -> Self {
        Self {
            root,
            engine,
            verbose,
            interrupted,
        }
    }

    /// Walk the tree, audit every regular file, then emit the summary
    ///
    /// Always finalizes: interruption and a closed output stream stop the
    /// walk early but the tally accumulated so far is still reported (a
    /// closed stream suppresses the report itself, there is nobody left
    /// to read it).
    ///
    /// # Errors
    ///
    /// Only genuine output failures propagate; `BrokenPipe` is absorbed
    /// as [`StopCause::OutputClosed`].
    pub fn run(&self, out: &mut dyn Write) -> std::io::Result<AuditOutcome> {
        let mut tally = AuditTally::new();
        let stop_cause = self.walk(out, &mut tally);

        match report::write_summary(out, &tally, self.verbose) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::BrokenPipe => {}
            Err(err) => return Err(err),
        }

        Ok(AuditOutcome { tally, stop_cause })
    }

    /// Visit every entry under the root in directory-enumeration order
    ///
    /// Only regular files are audited; directories are enumerated but not
    /// themselves checked for replicas. Failures local to one entry are
    /// logged and skipped, never fatal to the walk.
    fn walk(&self, out: &mut dyn Write, tally: &mut AuditTally) -> StopCause {
        for entry in WalkDir::new(&self.root).follow_links(false) {
            if self.interrupted.load(Ordering::Relaxed) {
                debug!("interrupt requested, stopping traversal");
                return StopCause::Interrupted;
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            match self.audit_file(entry.path(), out, tally) {
                Ok(()) => {}
                Err(err) if err.kind() == ErrorKind::BrokenPipe => {
                    debug!("output stream closed, stopping traversal");
                    return StopCause::OutputClosed;
                }
                Err(err) => {
                    // Output is gone for some other reason; nothing useful
                    // can be reported downstream either
                    warn!(error = %err, "report output failed, stopping traversal");
                    return StopCause::OutputClosed;
                }
            }
        }
        StopCause::Completed
    }

    /// Resolve and, when the set qualifies, compare one regular file
    ///
    /// The returned error is exclusively a writer error; resolver and
    /// comparator failures are absorbed here per the propagation policy
    /// (log, skip the file, keep walking).
    fn audit_file(
        &self,
        path: &Path,
        out: &mut dyn Write,
        tally: &mut AuditTally,
    ) -> std::io::Result<()> {
        let replicas = match resolver::resolve_replicas(path) {
            Ok(replicas) => replicas,
            Err(err @ XattrError::Query { .. }) => {
                warn!(
                    path = %report::display_path(path),
                    error = %err,
                    "skipping file: replica attribute unreadable"
                );
                return Ok(());
            }
            Err(err) => {
                warn!(
                    path = %report::display_path(path),
                    error = %err,
                    "skipping file: invalid path for attribute query"
                );
                return Ok(());
            }
        };
        if replicas.len() < 2 {
            return Ok(());
        }

        tally.record_checked();
        if self.verbose {
            // Flushed per line so narration keeps pace with the walk and a
            // closed pipe is noticed promptly
            writeln!(out, "{}", report::display_path(path))?;
            out.flush()?;
        }

        match compare::compare(&self.engine, &replicas) {
            Ok(Comparison::Consistent) => {}
            Ok(Comparison::Divergent(stats)) => {
                tally.record_divergent(DivergentSet { replicas, stats });
            }
            Err(err) => {
                // Tooling problem, not a verdict; surfaced so it cannot
                // hide as a clean file
                warn!(
                    path = %report::display_path(path),
                    error = %err,
                    "comparison tool failed, result uncertain"
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::compare::DiffTool;
    use crate::error::CompareError;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Engine that records every set it is asked about
    struct RecordingEngine {
        calls: Mutex<Vec<Vec<PathBuf>>>,
    }

    impl RecordingEngine {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl ByteComparator for RecordingEngine {
        fn all_identical(&self, replicas: &[PathBuf]) -> Result<bool, CompareError> {
            self.calls.lock().unwrap().push(replicas.to_vec());
            Ok(true)
        }
    }

    #[test]
    fn unpooled_files_never_reach_the_comparator() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("one.txt"), "a").unwrap();
        std::fs::write(temp_dir.path().join("two.txt"), "b").unwrap();

        let engine = RecordingEngine::new();
        let auditor = Auditor::new(
            temp_dir.path().to_path_buf(),
            engine,
            false,
            Arc::new(AtomicBool::new(false)),
        );
        let mut out = Vec::new();
        let outcome = auditor.run(&mut out).unwrap();

        assert_eq!(outcome.stop_cause, StopCause::Completed);
        assert_eq!(outcome.tally.files_checked(), 0);
        assert!(auditor.engine.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn preset_interrupt_finalizes_with_empty_tally() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("one.txt"), "a").unwrap();

        let auditor = Auditor::new(
            temp_dir.path().to_path_buf(),
            DiffTool::new(),
            false,
            Arc::new(AtomicBool::new(true)),
        );
        let mut out = Vec::new();
        let outcome = auditor.run(&mut out).unwrap();

        assert_eq!(outcome.stop_cause, StopCause::Interrupted);
        assert_eq!(outcome.tally.files_checked(), 0);
        // The partial tally is still reported
        let rendered = String::from_utf8(out).unwrap();
        assert!(rendered.contains("Checked count: 0"));
        assert!(rendered.contains("Different count: 0"));
    }

    /// Writer that fails with `BrokenPipe` on every write
    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::BrokenPipe))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::from(ErrorKind::BrokenPipe))
        }
    }

    #[test]
    fn broken_pipe_during_summary_is_not_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let auditor = Auditor::new(
            temp_dir.path().to_path_buf(),
            DiffTool::new(),
            false,
            Arc::new(AtomicBool::new(false)),
        );
        let outcome = auditor.run(&mut ClosedPipe).unwrap();
        assert_eq!(outcome.stop_cause, StopCause::Completed);
    }
}
