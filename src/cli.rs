//! Command-line interface definitions

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

/// Audit a mergerfs mount for replica inconsistencies
///
/// Walks the tree under DIR, finds every file backed by more than one
/// physical drive, and verifies all copies are byte-identical.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Starting directory (must be a mergerfs mount)
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Print each audited file and per-replica details of divergent sets
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Resolve the starting directory to an absolute, symlink-free path
    ///
    /// # Errors
    ///
    /// Returns an error if the directory does not exist, cannot be
    /// canonicalized, or is not a directory.
    pub fn resolved_root(&self) -> Result<PathBuf> {
        let root = std::fs::canonicalize(&self.dir).with_context(|| {
            format!("cannot resolve starting directory {}", self.dir.display())
        })?;
        if !root.is_dir() {
            anyhow::bail!("starting path is not a directory: {}", root.display());
        }
        Ok(root)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parses_directory_and_verbose_flag() {
        let args = Args::try_parse_from(["poolcheck", "-v", "/mnt/pool"]).unwrap();
        assert_eq!(args.dir, PathBuf::from("/mnt/pool"));
        assert!(args.verbose);
    }

    #[test]
    fn verbose_defaults_off() {
        let args = Args::try_parse_from(["poolcheck", "/mnt/pool"]).unwrap();
        assert!(!args.verbose);
    }

    #[test]
    fn directory_argument_is_required() {
        assert!(Args::try_parse_from(["poolcheck"]).is_err());
    }

    #[test]
    fn resolved_root_rejects_missing_directory() {
        let args = Args::try_parse_from(["poolcheck", "/nonexistent/poolcheck/root"]).unwrap();
        assert!(args.resolved_root().is_err());
    }

    #[test]
    fn resolved_root_canonicalizes_existing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let args =
            Args::try_parse_from(["poolcheck", temp_dir.path().to_str().unwrap()]).unwrap();
        let root = args.resolved_root().unwrap();
        assert!(root.is_absolute());
        assert!(root.is_dir());
    }

    #[test]
    fn resolved_root_rejects_plain_files() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("file.txt");
        std::fs::write(&file_path, "x").unwrap();
        let args = Args::try_parse_from(["poolcheck", file_path.to_str().unwrap()]).unwrap();
        assert!(args.resolved_root().is_err());
    }
}
