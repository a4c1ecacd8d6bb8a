// src/corpus.rs
//! The HTML side of a run: every page in one directory, reduced to its
//! extracted links.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::consts::HTML_EXT;
use crate::core::{extract_links, ExtractedLink};
use crate::error::{Error, Result};

/// One HTML page, already reduced to its links.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    /// File stem, used as the matching key (`BenefitsSection`).
    pub name: String,
    pub links: Vec<ExtractedLink>,
}

impl Document {
    pub fn from_html(name: impl Into<String>, html: &str) -> Self {
        Self { name: name.into(), links: extract_links(html) }
    }
}

/// `.html` files directly inside `dir`, minus excluded names, sorted by
/// file name so every platform processes them in the same order.
pub fn list_html_files(dir: &Path, is_excluded: impl Fn(&str) -> bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let path = entry.map_err(|e| Error::io(dir, e))?.path();
        if !path.is_file() { continue; }

        let is_html = path.extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(HTML_EXT));
        if !is_html { continue; }

        let Some(file_name) = path.file_name().and_then(|s| s.to_str()) else { continue };
        if is_excluded(file_name) {
            debug!(file = file_name, "excluded");
            continue;
        }
        files.push(path);
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Read one file. Unreadable or non-UTF-8 files give a document with no
/// links rather than failing the run.
pub fn read_document(path: &Path) -> Document {
    let name = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    match fs::read(path) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(html) => Document::from_html(name, &html),
            Err(e) => {
                warn!(file = %path.display(), error = %e, "not valid UTF-8; treating as empty");
                Document { name, links: Vec::new() }
            }
        },
        Err(e) => {
            warn!(file = %path.display(), error = %e, "unreadable; treating as empty");
            Document { name, links: Vec::new() }
        }
    }
}

/// Load the whole corpus up front; backfill needs every page at once.
pub fn load(dir: &Path, is_excluded: impl Fn(&str) -> bool) -> Result<Vec<Document>> {
    let files = list_html_files(dir, is_excluded)?;
    Ok(files.iter().map(|p| read_document(p)).collect())
}
