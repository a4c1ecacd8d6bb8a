// src/cli.rs
use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;

use crate::config::consts::DEFAULT_CONFIG_FILE;
use crate::config::options::{FileConfig, Mode, RunOptions};
use crate::progress::Progress;
use crate::runner::{self, RunSummary};

/// Reconcile hyperlinks found in HTML contact pages into the contacts store.
#[derive(Debug, Parser)]
#[command(name = "contact_links", version, about)]
pub struct Cli {
    /// Config file (TOML). Missing is fine unless given explicitly.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Store file (`const contacts = [...];`).
    #[arg(long, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Directory holding the `.html` contact pages.
    #[arg(long, value_name = "DIR")]
    pub html_dir: Option<PathBuf>,

    /// merge | backfill | all
    #[arg(long, value_name = "MODE")]
    pub mode: Option<Mode>,

    /// HTML file name to skip (repeatable). Replaces the configured list.
    #[arg(long = "exclude", value_name = "NAME")]
    pub exclude: Vec<String>,

    /// Prefix for derived slugs.
    #[arg(long, value_name = "PREFIX")]
    pub slug_prefix: Option<String>,

    /// Write a per-file CSV report here.
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Do everything except writing the store.
    #[arg(long)]
    pub dry_run: bool,

    /// Append logs to this file instead of stderr.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// More logging (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Errors only.
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Defaults, then config file, then flags.
    pub fn resolve(&self) -> crate::Result<RunOptions> {
        let (path, required) = match &self.config {
            Some(p) => (p.clone(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        let mut options = RunOptions::default();
        options.apply_file(FileConfig::load(&path, required)?);

        if let Some(v) = &self.store { options.store = v.clone(); }
        if let Some(v) = &self.html_dir { options.html_dir = v.clone(); }
        if let Some(v) = self.mode { options.mode = v; }
        if !self.exclude.is_empty() { options.exclude = self.exclude.clone(); }
        if let Some(v) = &self.slug_prefix { options.matching.slug_prefix = v.clone(); }
        if let Some(v) = &self.report { options.report = Some(v.clone()); }
        if let Some(v) = &self.log_file { options.log_file = Some(v.clone()); }
        options.dry_run |= self.dry_run;
        Ok(options)
    }
}

/// Logs each processed file at debug level.
struct LogProgress;

impl Progress for LogProgress {
    fn begin(&mut self, total: usize) { info!(total, "processing HTML files"); }
    fn log(&mut self, msg: &str) { info!("{msg}"); }
    fn item_done(&mut self, name: &str) { tracing::debug!(file = name, "done"); }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let options = cli.resolve().wrap_err("invalid configuration")?;

    crate::log::init(crate::log::level_for(cli.verbose, cli.quiet), options.log_file.as_deref())?;

    let summary = runner::run(&options, Some(&mut LogProgress))
        .wrap_err_with(|| format!("reconciling {}", options.store.display()))?;
    print_summary(&summary, options.dry_run);
    Ok(())
}

fn print_summary(s: &RunSummary, dry_run: bool) {
    println!(
        "Scanned {} files: {} links added, {} labels fixed, {} labels backfilled",
        s.files_scanned, s.links_added, s.labels_fixed, s.labels_backfilled
    );
    if !s.unmatched.is_empty() {
        println!("Unmatched ({}): {}", s.unmatched.len(), s.unmatched.join(", "));
    }
    match (&s.written, dry_run) {
        (Some(path), _) => println!("Wrote {}", path.display()),
        (None, true) => println!("Dry run: store not written"),
        (None, false) => println!("Store unchanged"),
    }
    if let Some(path) = &s.report {
        println!("Report: {}", path.display());
    }
}
