//! Audit accumulator
//!
//! One [`AuditTally`] is owned by the tree auditor for the lifetime of a
//! pass: initialized to zero at audit start, mutated only as results
//! arrive, read once to produce the final report. It is never persisted
//! and there is no module-level state.

use crate::compare::ReplicaStat;
use std::path::PathBuf;

/// One divergent replica set, in the form the report needs
#[derive(Debug, Clone)]
pub struct DivergentSet {
    /// Physical replica paths, in the order the filesystem reported them
    pub replicas: Vec<PathBuf>,
    /// Per-replica metadata, parallel to `replicas`
    pub stats: Vec<ReplicaStat>,
}

/// Running counters for one audit pass
#[derive(Debug, Default)]
pub struct AuditTally {
    files_checked: u64,
    files_divergent: u64,
    divergent: Vec<DivergentSet>,
}

impl AuditTally {
    /// Fresh tally with all counters at zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of files that had a qualifying multi-replica set
    #[must_use]
    pub fn files_checked(&self) -> u64 {
        self.files_checked
    }

    /// Number of divergent comparison results
    #[must_use]
    pub fn files_divergent(&self) -> u64 {
        self.files_divergent
    }

    /// Divergent sets in discovery order
    #[must_use]
    pub fn divergent_sets(&self) -> &[DivergentSet] {
        &self.divergent
    }

    /// Record that a file qualified for comparison
    pub fn record_checked(&mut self) {
        self.files_checked += 1;
    }

    /// Record a divergent comparison result
    pub fn record_divergent(&mut self, set: DivergentSet) {
        self.files_divergent += 1;
        self.divergent.push(set);
    }
}
