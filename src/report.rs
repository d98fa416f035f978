//! Report rendering
//!
//! Filenames are raw byte sequences and may not be valid UTF-8; rendering
//! substitutes un-decodable bytes rather than failing the audit. All
//! output here goes to the report stream (stdout); diagnostics go through
//! `tracing` to stderr.

use crate::compare::ReplicaStat;
use crate::tally::{AuditTally, DivergentSet};
use std::borrow::Cow;
use std::io::Write;
use std::path::Path;

/// Render a path for display, substituting un-decodable bytes
#[must_use]
pub fn display_path(path: &Path) -> Cow<'_, str> {
    path.to_string_lossy()
}

/// Write the final summary: counts, then one line per divergent set, and
/// when verbose a per-replica metadata block
///
/// # Errors
///
/// Propagates I/O errors from the writer; the caller treats `BrokenPipe`
/// as clean early termination, not an audit failure.
pub fn write_summary(
    out: &mut dyn Write,
    tally: &AuditTally,
    verbose: bool,
) -> std::io::Result<()> {
    writeln!(out, "Checked count: {}", tally.files_checked())?;
    writeln!(out, "Different count: {}", tally.files_divergent())?;
    for set in tally.divergent_sets() {
        write_divergent_set(out, set, verbose)?;
    }
    out.flush()
}

/// One line listing the set's paths; with `verbose`, an indented metadata
/// block per replica
fn write_divergent_set(
    out: &mut dyn Write,
    set: &DivergentSet,
    verbose: bool,
) -> std::io::Result<()> {
    let paths = set
        .replicas
        .iter()
        .map(|path| display_path(path))
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(out, "{paths}")?;

    if verbose {
        for (index, (path, stat)) in set.replicas.iter().zip(&set.stats).enumerate() {
            writeln!(out, "  {index}: {}", display_path(path))?;
            match stat {
                ReplicaStat::Available(snap) => writeln!(
                    out,
                    "   - uid: {:5}; gid: {:5}; mode: {:6o}; size: {:10}; mtime: {}",
                    snap.uid, snap.gid, snap.mode, snap.size, snap.mtime
                )?,
                ReplicaStat::Unavailable => writeln!(out, "   - stat unavailable")?,
            }
        }
    }
    Ok(())
}
