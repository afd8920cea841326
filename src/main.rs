//! sdk-classify
//!
//! Scans an installed OCI Python SDK and classifies every client method as
//! list, destructive or other.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use cloudmcp::classifier::{self, render_deny_list, render_report, ReportMeta, SdkScan};
use cloudmcp::config::Config;
use cloudmcp::logging;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Where a virtualenv installs the SDK, relative to the working directory
const DEFAULT_SDK_GLOB: &str = ".venv/lib/python*/site-packages/oci";

#[derive(Parser)]
#[command(name = "sdk-classify")]
#[command(about = "Classify OCI SDK client methods as list, destructive or other", long_about = None)]
struct Cli {
    /// SDK package directory (defaults to the project virtualenv)
    #[arg(long, env = "CLOUDMCP_SDK_ROOT")]
    sdk_root: Option<PathBuf>,

    /// Report file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write a policy deny list of destructive methods
    #[arg(long)]
    deny_list: Option<PathBuf>,

    /// Verbose mode
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    logging::init(&config.logging.level, cli.verbose);

    let sdk_root = match cli.sdk_root.or(config.classifier.sdk_root.clone()) {
        Some(root) => root,
        None => find_default_sdk_root().unwrap_or_else(|| PathBuf::from(DEFAULT_SDK_GLOB)),
    };
    if !sdk_root.is_dir() {
        println!("Can't find OCI SDK base at {}", sdk_root.display());
        return Ok(());
    }

    info!(root = %sdk_root.display(), "scanning SDK");
    let scan = SdkScan::scan(&sdk_root);
    let records = classifier::classify_scan(&scan);
    debug!(
        clients = scan.clients.len(),
        methods = scan.method_count(),
        "classification complete"
    );

    let meta = ReportMeta {
        sdk_root: sdk_root.clone(),
        generated_at: Utc::now(),
        files_scanned: scan.files_scanned,
        skipped: scan.skipped.len(),
    };
    let output = cli.output.unwrap_or_else(|| config.classifier.output_path());
    write_file(&output, &render_report(&records, &meta))?;

    if let Some(deny_path) = &cli.deny_list {
        write_file(deny_path, &render_deny_list(&records)?)?;
        println!("Deny list written to {}", deny_path.display());
    }

    println!(
        "Classified {} methods across {} clients ({} entries skipped)",
        records.len(),
        scan.clients.len(),
        scan.skipped.len()
    );
    println!("Report written to {}", output.display());
    Ok(())
}

/// First directory matching the virtualenv SDK location
fn find_default_sdk_root() -> Option<PathBuf> {
    let mut matches: Vec<PathBuf> = glob::glob(DEFAULT_SDK_GLOB)
        .ok()?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_dir())
        .collect();
    matches.sort();
    matches.into_iter().next()
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}
