// src/lib.rs
//! Reconcile hyperlinks from a directory of HTML contact pages into a
//! contacts store written as a `const contacts = [...];` literal.
//!
//! Pipeline: [`store::Store::parse`] → [`corpus::load`] (anchor extraction) →
//! [`matcher::match_entry`] per page → [`merge::merge_links`] /
//! [`merge::backfill_labels`] → [`store::Store::to_text`].

#[macro_use]
pub mod macros;

pub mod config;
pub mod core;
pub mod error;
pub mod log;

pub mod corpus;
pub mod file;
pub mod matcher;
pub mod merge;
pub mod progress;
pub mod report;
pub mod runner;
pub mod store;

#[cfg(feature = "cli")]
pub mod cli;

pub use error::{Error, Result};
