//! # poolcheck
//!
//! Cross-replica consistency auditor for mergerfs/union filesystem pools.
//!
//! mergerfs spreads files across multiple underlying drives and can keep
//! several physical copies of one logical file. Those copies are supposed
//! to stay byte-identical; a divergence is the signature of silent disk
//! corruption, a failed mirror write, or a stale copy. `poolcheck` walks a
//! mergerfs mount, resolves every file's physical replica set through the
//! `user.mergerfs.allpaths` extended attribute, compares the replicas
//! byte-for-byte, and reports every set that diverges.
//!
//! Pipeline, leaf-first:
//!
//! - [`xattr`]: `lgetxattr` wrapper with dynamic buffer growth
//! - [`resolver`]: pooled-mount probe and replica set resolution
//! - [`compare`]: external byte comparison plus per-replica stat capture
//! - [`audit`]: the tree walk that folds results into an [`AuditTally`]
//! - [`report`]: summary rendering with lossy path display
//!
//! The audit is read-only and best-effort: failures local to one file are
//! logged and skipped, and an interrupt or a closed output pipe finalizes
//! with the partial tally instead of failing.

pub mod audit;
pub mod cli;
pub mod compare;
pub mod error;
pub mod report;
pub mod resolver;
pub mod tally;
pub mod xattr;

pub use audit::{AuditOutcome, Auditor, StopCause};
pub use compare::{ByteComparator, Comparison, DiffTool, ReplicaStat, StatSnapshot};
pub use error::{CompareError, XattrError};
pub use tally::{AuditTally, DivergentSet};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
