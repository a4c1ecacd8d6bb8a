// src/merge.rs
//! Folding extracted links into entries.
//!
//! Extracted data is supplementary: a URL already on the entry is never
//! duplicated, and a label that is already set is never replaced. The only
//! changes are appending unseen URLs and filling null/empty labels.

use std::collections::HashMap;
use std::ops::AddAssign;

use tracing::debug;

use crate::core::ExtractedLink;
use crate::corpus::Document;
use crate::store::{Entry, LinkRef};

/// Counts produced by one merge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub added: usize,
    pub labels_fixed: usize,
}

impl MergeStats {
    pub fn changed(&self) -> bool {
        self.added > 0 || self.labels_fixed > 0
    }
}

impl AddAssign for MergeStats {
    fn add_assign(&mut self, rhs: Self) {
        self.added += rhs.added;
        self.labels_fixed += rhs.labels_fixed;
    }
}

/// Merge `links` into `entry` in order.
pub fn merge_links(entry: &mut Entry, links: &[ExtractedLink]) -> MergeStats {
    let mut stats = MergeStats::default();
    for link in links {
        match entry.link_position(&link.url) {
            None => {
                entry.push_link(&LinkRef { label: link.label.clone(), url: link.url.clone() });
                stats.added += 1;
            }
            Some(pos) => {
                if let Some(label) = &link.label {
                    if fill_label(entry, pos, label) {
                        stats.labels_fixed += 1;
                    }
                }
            }
        }
    }
    stats
}

/// Set the label at `pos` only if it is currently missing.
fn fill_label(entry: &mut Entry, pos: usize, label: &str) -> bool {
    let missing = entry.link_at(pos).is_some_and(|l| !l.has_label());
    if missing && !label.trim().is_empty() {
        entry.set_link_label(pos, label);
        true
    } else {
        false
    }
}

/// True when `href` is `target`, or `target` followed by the query marker
/// and anything after it.
pub fn href_matches(href: &str, target: &str, marker: char) -> bool {
    match href.strip_prefix(target) {
        Some(rest) => rest.is_empty() || rest.starts_with(marker),
        None => false,
    }
}

/// First non-empty label for `url` anywhere in the corpus, in corpus order.
pub fn find_label<'a>(url: &str, corpus: &'a [Document], marker: char) -> Option<&'a str> {
    corpus.iter()
        .flat_map(|doc| doc.links.iter())
        .filter(|link| href_matches(&link.url, url, marker))
        .find_map(|link| link.label.as_deref().filter(|l| !l.trim().is_empty()))
}

/// Fill every missing label in `entries` from the corpus. Never appends
/// links. Returns the number of labels filled.
pub fn backfill_labels(entries: &mut [Entry], corpus: &[Document], marker: char) -> usize {
    let mut found: HashMap<String, Option<String>> = HashMap::new();
    let mut fixed = 0;

    for entry in entries.iter_mut() {
        for (pos, link) in entry.links().into_iter().enumerate() {
            if link.has_label() {
                continue;
            }
            let label = found
                .entry(link.url.clone())
                .or_insert_with(|| find_label(&link.url, corpus, marker).map(str::to_string));
            if let Some(label) = label.as_deref() {
                entry.set_link_label(pos, label);
                debug!(url = %link.url, label, "backfilled label");
                fixed += 1;
            }
        }
    }
    fixed
}
