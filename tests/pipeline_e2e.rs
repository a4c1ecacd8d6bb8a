// tests/pipeline_e2e.rs
//
// Full runs against a store file and an HTML directory on disk.
//
use std::fs;
use std::path::{Path, PathBuf};

use contact_links::config::options::{Mode, RunOptions};
use contact_links::runner;
use contact_links::store::{LinkRef, Store};
use contact_links::Error;

const STORE: &str = r#"// Contact directory
export const contacts = [
  {
    slug: "contact-benefits-section",
    title: "Contact Benefits Section",
    address: [{ addressLine01: 'Town Hall', postcode: "AB1 2CD" }],
    links: [],
  },
  {
    slug: 'contact-parking',
    title: 'Contact Parking Services',
    telephone: [{ label: "0300 123 4567", telephone: "0300 123 4567", extension: null }],
    links: [{ label: null, url: "https://example.org/permits" }],
  },
  {
    title: "Road Safety Team",
    "entry-tags": ["roads"],
  },
];
"#;

struct Fixture {
    _dir: tempfile::TempDir,
    store: PathBuf,
    html: PathBuf,
}

fn fixture(pages: &[(&str, &str)]) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("contacts.js");
    let html = dir.path().join("pages");
    fs::create_dir_all(&html).unwrap();
    fs::write(&store, STORE).unwrap();
    for (name, body) in pages {
        fs::write(html.join(name), body).unwrap();
    }
    Fixture { _dir: dir, store, html }
}

fn options(f: &Fixture, mode: Mode) -> RunOptions {
    RunOptions { store: f.store.clone(), html_dir: f.html.clone(), mode, ..Default::default() }
}

fn load(path: &Path) -> Store {
    Store::parse(&fs::read_to_string(path).unwrap()).unwrap()
}

fn pages() -> Vec<(&'static str, &'static str)> {
    vec![
        ("BenefitsSection.html", r#"<p>Apply: <a href="https://example.org/apply">Apply Now</a></p>"#),
        ("Permits.html", "<a href='https://example.org/permits?from=page'>\n  <b>Parking</b> permits\n</a>"),
        ("RoadSafety.html", r#"<a href="/roads/report">Report a problem</a> <a href="mailto:roads@example.org">Email</a>"#),
        ("Xyzzy123.html", r#"<a href="mailto:foo@example.org">foo</a>"#),
        ("Nowhere.html", r#"<a href="/lost">Lost</a>"#),
        ("test.html", r#"<a href="/sample">Sample</a>"#),
    ]
}

#[test]
fn merge_run_updates_matched_entries_only() {
    let f = fixture(&pages());
    let summary = runner::run(&options(&f, Mode::Merge), None).unwrap();

    assert_eq!(summary.files_scanned, 5); // test.html excluded
    assert_eq!(summary.links_added, 2);
    assert_eq!(summary.labels_fixed, 0);
    assert_eq!(summary.labels_backfilled, 0);
    assert_eq!(summary.unmatched, vec!["Nowhere", "Permits"]);
    assert_eq!(summary.written.as_deref(), Some(f.store.as_path()));

    let store = load(&f.store);
    let e = store.entries();
    assert_eq!(e[0].links(), vec![LinkRef::new(Some("Apply Now"), "https://example.org/apply")]);
    assert_eq!(e[1].links(), vec![LinkRef::new(None, "https://example.org/permits")]);
    assert_eq!(e[2].links(), vec![LinkRef::new(Some("Report a problem"), "/roads/report")]);

    // Opaque fields survive untouched.
    let before = Store::parse(STORE).unwrap();
    assert_eq!(e[0].fields()["address"], before.entries()[0].fields()["address"]);
    assert_eq!(e[1].fields()["telephone"], before.entries()[1].fields()["telephone"]);
    assert_eq!(e[2].fields()["entry-tags"], before.entries()[2].fields()["entry-tags"]);

    let text = fs::read_to_string(&f.store).unwrap();
    assert!(text.starts_with("// Contact directory\nexport const contacts = [\n"));
    assert!(text.ends_with("];\n"));
}

#[test]
fn backfill_fills_label_from_query_variant() {
    let f = fixture(&pages());
    let summary = runner::run(&options(&f, Mode::Backfill), None).unwrap();
    assert_eq!(summary.labels_backfilled, 1);
    assert_eq!(summary.links_added, 0);

    let store = load(&f.store);
    assert_eq!(
        store.entries()[1].links(),
        vec![LinkRef::new(Some("Parking permits"), "https://example.org/permits")]
    );
}

#[test]
fn rerun_is_idempotent_and_byte_identical() {
    let f = fixture(&pages());
    runner::run(&options(&f, Mode::All), None).unwrap();
    let first = fs::read_to_string(&f.store).unwrap();

    let again = runner::run(&options(&f, Mode::All), None).unwrap();
    assert_eq!(again.links_added, 0);
    assert_eq!(again.labels_fixed, 0);
    assert_eq!(again.labels_backfilled, 0);
    assert_eq!(again.written, None);
    assert_eq!(fs::read_to_string(&f.store).unwrap(), first);
}

#[test]
fn dry_run_leaves_store_alone() {
    let f = fixture(&pages());
    let mut o = options(&f, Mode::All);
    o.dry_run = true;
    let summary = runner::run(&o, None).unwrap();
    assert_eq!(summary.links_added, 2);
    assert_eq!(summary.written, None);
    assert_eq!(fs::read_to_string(&f.store).unwrap(), STORE);
}

#[test]
fn undecodable_store_aborts_before_writing() {
    let f = fixture(&pages());
    let broken = "const contacts = [ { slug: 'x', ];";
    fs::write(&f.store, broken).unwrap();
    let err = runner::run(&options(&f, Mode::All), None).unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
    assert_eq!(fs::read_to_string(&f.store).unwrap(), broken);
}

#[test]
fn report_lists_every_file() {
    let f = fixture(&pages());
    let mut o = options(&f, Mode::Merge);
    let report = f.html.parent().unwrap().join("out/report.csv");
    o.report = Some(report.clone());
    runner::run(&o, None).unwrap();

    let csv = fs::read_to_string(&report).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "file,status,strategy,entry,added,labels_fixed");
    assert!(lines.contains(&"BenefitsSection,matched,slug-exact,contact-benefits-section,1,0"));
    assert!(lines.contains(&"RoadSafety,matched,title-fuzzy,Road Safety Team,1,0"));
    assert!(lines.contains(&"Xyzzy123,empty,,,0,0"));
    assert!(lines.contains(&"Nowhere,unmatched,,,0,0"));
    assert_eq!(lines.len(), 6);
}

#[test]
fn missing_html_dir_is_fatal() {
    let f = fixture(&[]);
    let mut o = options(&f, Mode::Merge);
    o.html_dir = f.html.join("missing");
    assert!(matches!(runner::run(&o, None), Err(Error::Io { .. })));
}
