//! poolcheck binary entry point
//!
//! Exit codes: 0 on completion (including interrupted or pipe-closed early
//! completion), 1 when the starting directory is not a mergerfs mount or
//! cannot be audited at all.

use anyhow::Result;
use clap::Parser;
use poolcheck::audit::Auditor;
use poolcheck::cli::Args;
use poolcheck::compare::DiffTool;
use poolcheck::resolver;
use std::io::Write;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("poolcheck: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    // Diagnostics go to stderr so the report stream stays clean
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let root = args.resolved_root()?;

    // Precondition: the resolved root must expose the mergerfs identity
    // attribute, otherwise there is nothing meaningful to audit
    if !resolver::is_pooled_mount(&root)? {
        eprintln!("{} is not a mergerfs mount", root.display());
        return Ok(ExitCode::FAILURE);
    }

    let interrupted = Arc::new(AtomicBool::new(false));
    for signal in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(&interrupted))?;
    }

    let auditor = Auditor::new(root, DiffTool::new(), args.verbose, interrupted);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    auditor.run(&mut out)?;
    // A closed pipe here is the consumer's choice, not a failure
    let _ = out.flush();

    Ok(ExitCode::SUCCESS)
}
