// src/config/options.rs
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use super::consts::*;
use crate::error::{Error, Result};

/// Which halves of the reconciliation a run performs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Match each HTML file to an entry and merge its links.
    #[default]
    Merge,
    /// Only fill missing labels from anchors anywhere in the corpus.
    Backfill,
    /// Merge, then backfill.
    All,
}

impl Mode {
    pub fn merges(self) -> bool { matches!(self, Mode::Merge | Mode::All) }
    pub fn backfills(self) -> bool { matches!(self, Mode::Backfill | Mode::All) }
}

impl FromStr for Mode {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "merge" => Ok(Mode::Merge),
            "backfill" => Ok(Mode::Backfill),
            "all" => Ok(Mode::All),
            other => Err(format!("unknown mode `{other}` (expected merge, backfill or all)")),
        }
    }
}

/// Knobs of the entry matcher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchOptions {
    /// Prepended to derived slugs (`"contact-"`).
    pub slug_prefix: String,
    /// Leading title word ignored by the fuzzy title rule (`"contact"`).
    pub title_prefix: String,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self { slug_prefix: s!(SLUG_PREFIX), title_prefix: s!(TITLE_PREFIX_WORD) }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOptions {
    pub store: PathBuf,
    pub html_dir: PathBuf,
    /// File names (with extension) skipped in the HTML directory.
    pub exclude: Vec<String>,
    pub mode: Mode,
    pub matching: MatchOptions,
    /// Backfill treats `<url><marker>...` as the same link as `<url>`.
    pub query_marker: char,
    pub report: Option<PathBuf>,
    pub dry_run: bool,
    pub log_file: Option<PathBuf>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            store: PathBuf::from(DEFAULT_STORE_PATH),
            html_dir: PathBuf::from(DEFAULT_HTML_DIR),
            exclude: EXCLUDED_FILES.iter().map(|s| s!(*s)).collect(),
            mode: Mode::default(),
            matching: MatchOptions::default(),
            query_marker: QUERY_MARKER,
            report: None,
            dry_run: false,
            log_file: None,
        }
    }
}

impl RunOptions {
    /// Overlay every value the config file sets.
    pub fn apply_file(&mut self, cfg: FileConfig) {
        if let Some(v) = cfg.store { self.store = v; }
        if let Some(v) = cfg.html_dir { self.html_dir = v; }
        if let Some(v) = cfg.exclude { self.exclude = v; }
        if let Some(v) = cfg.mode { self.mode = v; }
        if let Some(v) = cfg.slug_prefix { self.matching.slug_prefix = v; }
        if let Some(v) = cfg.title_prefix { self.matching.title_prefix = v.to_lowercase(); }
        if let Some(v) = cfg.query_marker { self.query_marker = v; }
        if let Some(v) = cfg.report { self.report = Some(v); }
        if let Some(v) = cfg.log_file { self.log_file = Some(v); }
    }

    /// Whether `file_name` is on the exclusion list (case-insensitive).
    pub fn is_excluded(&self, file_name: &str) -> bool {
        self.exclude.iter().any(|x| x.eq_ignore_ascii_case(file_name))
    }
}

/// On-disk config (`contact_links.toml`). Every key is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub store: Option<PathBuf>,
    pub html_dir: Option<PathBuf>,
    pub exclude: Option<Vec<String>>,
    pub mode: Option<Mode>,
    pub slug_prefix: Option<String>,
    pub title_prefix: Option<String>,
    pub query_marker: Option<char>,
    pub report: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

impl FileConfig {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a config file. A missing file gives defaults unless `required`.
    pub fn load(path: &Path, required: bool) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(&text),
            Err(e) if e.kind() == ErrorKind::NotFound && !required => Ok(Self::default()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(Error::Config(format!("config file {} does not exist", path.display())))
            }
            Err(e) => Err(Error::io(path, e)),
        }
    }
}
