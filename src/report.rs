// src/report.rs
//! CSV run report: one row per HTML file.

use std::io::{self, Write};

use crate::runner::{FileOutcome, FileStatus};

pub const REPORT_HEADERS: [&str; 6] = ["file", "status", "strategy", "entry", "added", "labels_fixed"];

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single CSV row to any writer.
pub fn write_row<W: Write, S: AsRef<str>>(mut w: W, row: &[S]) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        let cell = cell.as_ref();
        if !first { write!(w, ",")?; } else { first = false; }
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}

fn outcome_row(o: &FileOutcome) -> [String; 6] {
    let strategy = match o.status {
        FileStatus::Matched(c) => s!(c.strategy.as_str()),
        _ => s!(),
    };
    [
        o.name.clone(),
        s!(o.status.as_str()),
        strategy,
        o.entry.clone().unwrap_or_default(),
        o.stats.added.to_string(),
        o.stats.labels_fixed.to_string(),
    ]
}

/// Header row plus one row per outcome, in processing order.
pub fn to_report_string(outcomes: &[FileOutcome]) -> String {
    let mut buf: Vec<u8> = Vec::new();
    let _ = write_row(&mut buf, &REPORT_HEADERS);
    for o in outcomes {
        let _ = write_row(&mut buf, &outcome_row(o));
    }
    match String::from_utf8(buf) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(&e.into_bytes()).into_owned(),
    }
}
