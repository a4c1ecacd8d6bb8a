// src/runner.rs
//! One reconciliation run: load the store, load the corpus, match and merge
//! every page, optionally backfill labels, write the store once.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::config::options::RunOptions;
use crate::corpus::{self, Document};
use crate::error::Result;
use crate::file;
use crate::matcher::{match_entry, MatchCandidate, MatchIndex};
use crate::merge::{backfill_labels, merge_links, MergeStats};
use crate::progress::Progress;
use crate::report;
use crate::store::Store;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileStatus {
    /// No eligible anchors; not matched at all.
    Empty,
    /// Had anchors but no rule found an entry.
    Unmatched,
    Matched(MatchCandidate),
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Empty => "empty",
            FileStatus::Unmatched => "unmatched",
            FileStatus::Matched(_) => "matched",
        }
    }
}

/// What happened to one HTML file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileOutcome {
    pub name: String,
    pub status: FileStatus,
    /// Slug (or title) of the matched entry.
    pub entry: Option<String>,
    pub stats: MergeStats,
}

/// In-memory result of [`reconcile`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub files_scanned: usize,
    pub files: Vec<FileOutcome>,
    pub merged: MergeStats,
    pub backfilled: usize,
}

impl Reconciliation {
    pub fn unmatched(&self) -> Vec<String> {
        self.files.iter()
            .filter(|f| f.status == FileStatus::Unmatched)
            .map(|f| f.name.clone())
            .collect()
    }
}

/// Match and merge every document into `store`, then backfill if the mode
/// asks for it. No I/O.
pub fn reconcile(
    store: &mut Store,
    corpus: &[Document],
    options: &RunOptions,
    mut progress: Option<&mut dyn Progress>,
) -> Reconciliation {
    let mut out = Reconciliation { files_scanned: corpus.len(), ..Default::default() };

    if let Some(p) = progress.as_deref_mut() {
        p.begin(corpus.len());
    }

    if options.mode.merges() {
        let index = MatchIndex::build(store.entries(), &options.matching);
        for doc in corpus {
            let outcome = merge_document(store, &index, doc);
            out.merged += outcome.stats;
            if let Some(p) = progress.as_deref_mut() {
                p.item_done(&doc.name);
            }
            out.files.push(outcome);
        }
    }

    if options.mode.backfills() {
        if let Some(p) = progress.as_deref_mut() {
            p.log("Backfilling missing labels…");
        }
        out.backfilled = backfill_labels(store.entries_mut(), corpus, options.query_marker);
    }

    if let Some(p) = progress.as_deref_mut() {
        p.finish();
    }
    out
}

fn merge_document(store: &mut Store, index: &MatchIndex, doc: &Document) -> FileOutcome {
    let mut outcome = FileOutcome {
        name: doc.name.clone(),
        status: FileStatus::Empty,
        entry: None,
        stats: MergeStats::default(),
    };
    if doc.links.is_empty() {
        debug!(file = %doc.name, "no eligible anchors");
        return outcome;
    }

    let Some(candidate) = match_entry(&doc.name, index) else {
        warn!(file = %doc.name, links = doc.links.len(), "no entry matches");
        outcome.status = FileStatus::Unmatched;
        return outcome;
    };
    outcome.status = FileStatus::Matched(candidate);

    if let Some(entry) = store.get_mut(candidate.index) {
        outcome.entry = entry.slug().or(entry.title()).map(str::to_string);
        outcome.stats = merge_links(entry, &doc.links);
        debug!(
            file = %doc.name,
            added = outcome.stats.added,
            labels_fixed = outcome.stats.labels_fixed,
            "merged"
        );
    }
    outcome
}

/// Totals reported at the end of a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub files_scanned: usize,
    pub links_added: usize,
    pub labels_fixed: usize,
    pub labels_backfilled: usize,
    pub unmatched: Vec<String>,
    /// Store path if it was rewritten.
    pub written: Option<PathBuf>,
    pub report: Option<PathBuf>,
}

/// Full pipeline with file I/O. A store that cannot be decoded aborts the
/// run before anything is changed or written.
pub fn run(options: &RunOptions, progress: Option<&mut dyn Progress>) -> Result<RunSummary> {
    let text = file::read_text(&options.store)?;
    let mut store = Store::parse(&text)?;
    info!(store = %options.store.display(), entries = store.len(), "store loaded");

    let docs = corpus::load(&options.html_dir, |name| options.is_excluded(name))?;
    info!(dir = %options.html_dir.display(), files = docs.len(), "corpus loaded");

    let rec = reconcile(&mut store, &docs, options, progress);

    let new_text = store.to_text();
    let written = if options.dry_run {
        info!("dry run; store not written");
        None
    } else if new_text == text {
        info!("store unchanged");
        None
    } else {
        file::write_atomic(&options.store, &new_text)?;
        info!(store = %options.store.display(), "store written");
        Some(options.store.clone())
    };

    let report = match &options.report {
        Some(path) => {
            file::write_atomic(path, &report::to_report_string(&rec.files))?;
            Some(path.clone())
        }
        None => None,
    };

    Ok(RunSummary {
        files_scanned: rec.files_scanned,
        links_added: rec.merged.added,
        labels_fixed: rec.merged.labels_fixed,
        labels_backfilled: rec.backfilled,
        unmatched: rec.unmatched(),
        written,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::options::Mode;
    use crate::progress::{NullProgress, Progress};
    use crate::store::LinkRef;

    const STORE: &str = r#"const contacts = [
  { slug: "contact-benefits-section", title: "Contact Benefits Section", links: [] },
  { slug: "contact-parking", title: "Contact Parking", links: [{ label: null, url: "https://example.org/permits" }] },
];
"#;

    fn corpus() -> Vec<Document> {
        vec![
            Document::from_html("BenefitsSection", r#"<a href="https://example.org/apply">Apply Now</a>"#),
            Document::from_html("Other", r#"<a href="https://example.org/permits?x=1">Permits</a>"#),
            Document::from_html("Xyzzy123", r#"<a href="mailto:foo@example.org">mail</a>"#),
        ]
    }

    #[derive(Default)]
    struct Recorder { begun: usize, done: Vec<String>, finished: bool }
    impl Progress for Recorder {
        fn begin(&mut self, total: usize) { self.begun = total; }
        fn item_done(&mut self, name: &str) { self.done.push(s!(name)); }
        fn finish(&mut self) { self.finished = true; }
    }

    #[test]
    fn merge_mode_outcomes() {
        let mut store = Store::parse(STORE).unwrap();
        let mut rec = Recorder::default();
        let r = reconcile(&mut store, &corpus(), &RunOptions::default(), Some(&mut rec));

        assert_eq!(r.merged, MergeStats { added: 1, labels_fixed: 0 });
        assert_eq!(r.backfilled, 0);
        assert_eq!(r.unmatched(), vec!["Other"]);
        assert_eq!(r.files[2].status, FileStatus::Empty);
        assert_eq!(r.files[0].entry.as_deref(), Some("contact-benefits-section"));
        assert_eq!(store.entries()[0].links(), vec![LinkRef::new(Some("Apply Now"), "https://example.org/apply")]);
        assert_eq!(rec.begun, 3);
        assert_eq!(rec.done, vec!["BenefitsSection", "Other", "Xyzzy123"]);
        assert!(rec.finished);
    }

    #[test]
    fn all_mode_backfills_after_merge() {
        let mut store = Store::parse(STORE).unwrap();
        let options = RunOptions { mode: Mode::All, ..Default::default() };
        let r = reconcile(&mut store, &corpus(), &options, None);
        assert_eq!(r.backfilled, 1);
        assert_eq!(store.entries()[1].links(), vec![LinkRef::new(Some("Permits"), "https://example.org/permits")]);
    }

    #[test]
    fn backfill_mode_does_not_merge() {
        let mut store = Store::parse(STORE).unwrap();
        let options = RunOptions { mode: Mode::Backfill, ..Default::default() };
        let r = reconcile(&mut store, &corpus(), &options, Some(&mut NullProgress));
        assert!(r.files.is_empty());
        assert_eq!(r.files_scanned, 3);
        assert_eq!(r.backfilled, 1);
        assert!(store.entries()[0].links().is_empty());
    }

    /// Collects formatted log lines for assertions.
    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> { Ok(()) }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for Captured {
        type Writer = Captured;
        fn make_writer(&'a self) -> Self::Writer { self.clone() }
    }

    #[test]
    fn run_logs_each_milestone_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("contacts.js");
        std::fs::write(&store, STORE).unwrap();
        std::fs::write(dir.path().join("BenefitsSection.html"), r#"<a href="/x">X</a>"#).unwrap();
        let options = RunOptions { store, html_dir: dir.path().to_path_buf(), ..Default::default() };

        let logs = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || run(&options, None).unwrap());

        let text = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert_eq!(text.matches("corpus loaded").count(), 1);
        assert_eq!(text.matches("store loaded").count(), 1);
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let options = RunOptions { mode: Mode::All, ..Default::default() };
        let mut store = Store::parse(STORE).unwrap();
        reconcile(&mut store, &corpus(), &options, None);
        let first = store.to_text();

        let mut again = Store::parse(&first).unwrap();
        let r = reconcile(&mut again, &corpus(), &options, None);
        assert_eq!(r.merged, MergeStats::default());
        assert_eq!(r.backfilled, 0);
        assert_eq!(again.to_text(), first);
    }
}
