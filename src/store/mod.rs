// src/store/mod.rs
//! In-memory contact store.
//!
//! Each [`Entry`] keeps its decoded record map as-is, so fields the
//! reconciler never looks at (addresses, phones, free text, key order) go
//! back out exactly as they came in. Only `links` is ever mutated, and only
//! through the methods below.

pub mod literal;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::consts::{
    DEFAULT_STORE_PREFIX, DEFAULT_STORE_SUFFIX, LABEL_KEY, LINKS_KEY, SLUG_KEY, TITLE_KEY, URL_KEY,
};
use crate::error::{Error, Result};

/// One `(label, url)` pair attached to an entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRef {
    pub label: Option<String>,
    pub url: String,
}

impl LinkRef {
    pub fn new(label: Option<&str>, url: impl Into<String>) -> Self {
        Self { label: label.map(str::to_string), url: url.into() }
    }

    /// Null, empty and whitespace-only labels all count as missing.
    pub fn has_label(&self) -> bool {
        self.label.as_deref().is_some_and(|l| !l.trim().is_empty())
    }

    fn to_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert(s!(LABEL_KEY), self.label.clone().map_or(Value::Null, Value::String));
        obj.insert(s!(URL_KEY), Value::String(self.url.clone()));
        Value::Object(obj)
    }
}

/// One contact record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Entry {
    fields: Map<String, Value>,
}

impl Entry {
    /// Wrap a record map. Fails if `links` is present but not a list of
    /// `{ label?, url }` objects.
    pub fn from_fields(fields: Map<String, Value>) -> std::result::Result<Self, String> {
        match fields.get(LINKS_KEY) {
            None | Some(Value::Null) => {}
            Some(Value::Array(items)) => {
                for (i, item) in items.iter().enumerate() {
                    serde_json::from_value::<LinkRef>(item.clone())
                        .map_err(|e| format!("`{LINKS_KEY}[{i}]` is not a link: {e}"))?;
                }
            }
            Some(_) => return Err(format!("`{LINKS_KEY}` must be a list")),
        }
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn slug(&self) -> Option<&str> {
        self.fields.get(SLUG_KEY).and_then(Value::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.fields.get(TITLE_KEY).and_then(Value::as_str)
    }

    /// Typed snapshot of the entry's links, in stored order.
    pub fn links(&self) -> Vec<LinkRef> {
        self.links_array()
            .map(|items| {
                items.iter()
                    .filter_map(|v| serde_json::from_value(v.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Position of the link whose url is exactly `url`.
    /// Scans the current list every call, so links appended earlier in the
    /// same merge are seen.
    pub fn link_position(&self, url: &str) -> Option<usize> {
        self.links_array()?
            .iter()
            .position(|v| v.get(URL_KEY).and_then(Value::as_str) == Some(url))
    }

    pub fn link_at(&self, idx: usize) -> Option<LinkRef> {
        let v = self.links_array()?.get(idx)?;
        serde_json::from_value(v.clone()).ok()
    }

    /// Append a link at the end, creating `links` if the record had none.
    pub fn push_link(&mut self, link: &LinkRef) {
        self.links_array_mut().push(link.to_value());
    }

    /// Overwrite the label of the link at `idx`. Other keys of that link
    /// object keep their values and order.
    pub fn set_link_label(&mut self, idx: usize, label: &str) {
        if let Some(Value::Object(obj)) = self.links_array_mut().get_mut(idx) {
            obj.insert(s!(LABEL_KEY), Value::String(s!(label)));
        }
    }

    fn links_array(&self) -> Option<&Vec<Value>> {
        self.fields.get(LINKS_KEY).and_then(Value::as_array)
    }

    fn links_array_mut(&mut self) -> &mut Vec<Value> {
        let slot = self.fields.entry(LINKS_KEY).or_insert(Value::Null);
        if !slot.is_array() {
            // `from_fields` only lets `links` be absent, null, or a list.
            *slot = Value::Array(Vec::new());
        }
        match slot {
            Value::Array(items) => items,
            _ => unreachable!("links slot was just made an array"),
        }
    }
}

/// The whole store: ordered entries plus the assignment text around them.
#[derive(Clone, Debug, PartialEq)]
pub struct Store {
    prefix: String,
    entries: Vec<Entry>,
    suffix: String,
}

impl Store {
    /// Store with the default `const contacts = [...];` framing.
    pub fn from_entries(entries: Vec<Entry>) -> Self {
        Self { prefix: s!(DEFAULT_STORE_PREFIX), entries, suffix: s!(DEFAULT_STORE_SUFFIX) }
    }

    /// Decode store text. Any failure here is fatal for a run.
    pub fn parse(text: &str) -> Result<Self> {
        let decoded = literal::decode(text)?;
        let mut entries = Vec::with_capacity(decoded.records.len());
        for (i, rec) in decoded.records.into_iter().enumerate() {
            let (line, column) = (rec.line, rec.column);
            let entry = Entry::from_fields(rec.fields).map_err(|message| Error::Decode {
                line,
                column,
                message: format!("record {i}: {message}"),
            })?;
            entries.push(entry);
        }
        Ok(Self { prefix: decoded.prefix, entries, suffix: decoded.suffix })
    }

    /// Encode back to text with the original prefix and suffix.
    pub fn to_text(&self) -> String {
        literal::encode(&self.prefix, self.entries.iter().map(Entry::fields), &self.suffix)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [Entry] {
        &mut self.entries
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut Entry> {
        self.entries.get_mut(idx)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
