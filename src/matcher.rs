// src/matcher.rs
//! Resolve an HTML file name to a store entry.
//!
//! There is no shared key between the two sides, so matching is an ordered
//! list of rules, most specific first. The first rule that hits wins; later
//! rules are never consulted, even if they would pick a different entry.
//!
//! | # | Rule              | Looks up                                         |
//! |---|-------------------|--------------------------------------------------|
//! | 1 | `SlugExact`       | derived slug (`BenefitsSection` → `contact-benefits-section`) |
//! | 2 | `SlugAlt`         | prefix + lowercased name (`contact-benefitssection`) |
//! | 3 | `FilenameDirect`  | lowercased name as a slug (`benefitssection`)     |
//! | 4 | `TitleFuzzy`      | title equal to / containing the name as a phrase  |

use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::{debug, warn};

use crate::config::options::MatchOptions;
use crate::core::sanitize::{derive_slug, strip_prefix_word, title_phrase};
use crate::store::Entry;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    SlugExact,
    SlugAlt,
    FilenameDirect,
    TitleFuzzy,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::SlugExact => "slug-exact",
            Strategy::SlugAlt => "slug-alt",
            Strategy::FilenameDirect => "filename-direct",
            Strategy::TitleFuzzy => "title-fuzzy",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry position in the store plus the rule that found it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchCandidate {
    pub index: usize,
    pub strategy: Strategy,
}

/// Lookup tables built once per run from the loaded entries.
#[derive(Clone, Debug)]
pub struct MatchIndex {
    slugs: HashMap<String, usize>,
    /// Lowercased, trimmed titles in store order; first occurrence only.
    titles: Vec<(String, usize)>,
    options: MatchOptions,
}

impl MatchIndex {
    pub fn build(entries: &[Entry], options: &MatchOptions) -> Self {
        let mut slugs = HashMap::with_capacity(entries.len());
        let mut titles: Vec<(String, usize)> = Vec::with_capacity(entries.len());
        let mut seen_titles: HashSet<String> = HashSet::with_capacity(entries.len());

        for (i, entry) in entries.iter().enumerate() {
            if let Some(slug) = entry.slug().map(str::trim).filter(|s| !s.is_empty()) {
                if let Some(first) = slugs.get(slug) {
                    warn!(slug, first, duplicate = i, "duplicate slug; keeping the first entry");
                } else {
                    slugs.insert(s!(slug), i);
                }
            }
            if let Some(title) = entry.title() {
                let t = title.trim().to_lowercase();
                if !t.is_empty() && seen_titles.insert(t.clone()) {
                    titles.push((t, i));
                }
            }
        }

        let options = MatchOptions {
            slug_prefix: options.slug_prefix.clone(),
            title_prefix: options.title_prefix.trim().to_lowercase(),
        };
        Self { slugs, titles, options }
    }

    pub fn slug(&self, slug: &str) -> Option<usize> {
        self.slugs.get(slug).copied()
    }
}

/// A single matching rule.
pub type Rule = fn(&str, &MatchIndex) -> Option<usize>;

/// Rules in precedence order.
pub const RULES: [(Strategy, Rule); 4] = [
    (Strategy::SlugExact, slug_exact),
    (Strategy::SlugAlt, slug_alt),
    (Strategy::FilenameDirect, filename_direct),
    (Strategy::TitleFuzzy, title_fuzzy),
];

pub fn slug_exact(name: &str, index: &MatchIndex) -> Option<usize> {
    index.slug(&derive_slug(name, &index.options.slug_prefix))
}

pub fn slug_alt(name: &str, index: &MatchIndex) -> Option<usize> {
    index.slug(&join!(&index.options.slug_prefix, &name.to_lowercase()))
}

pub fn filename_direct(name: &str, index: &MatchIndex) -> Option<usize> {
    index.slug(&name.to_lowercase())
}

/// First title (store order) that equals the name phrase once the prefix
/// word is dropped, or that contains the phrase anywhere.
pub fn title_fuzzy(name: &str, index: &MatchIndex) -> Option<usize> {
    let phrase = title_phrase(name);
    if phrase.is_empty() {
        return None;
    }
    index.titles.iter().find_map(|(title, i)| {
        let stripped = strip_prefix_word(title, &index.options.title_prefix);
        (stripped == phrase || title.contains(&phrase)).then_some(*i)
    })
}

/// Run the rules in order; `None` means unmatched.
pub fn match_entry(name: &str, index: &MatchIndex) -> Option<MatchCandidate> {
    RULES.iter().find_map(|(strategy, rule)| {
        rule(name, index).map(|i| {
            debug!(name, entry = i, strategy = %strategy, "matched");
            MatchCandidate { index: i, strategy: *strategy }
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn entries(vals: Vec<Value>) -> Vec<Entry> {
        vals.into_iter()
            .map(|v| match v {
                Value::Object(m) => Entry::from_fields(m).unwrap(),
                _ => panic!("not an object"),
            })
            .collect()
    }

    fn index(vals: Vec<Value>) -> MatchIndex {
        MatchIndex::build(&entries(vals), &MatchOptions::default())
    }

    #[test]
    fn derived_slug_rule() {
        let idx = index(vec![
            json!({"slug": "contact-other", "title": "Other"}),
            json!({"slug": "contact-benefits-section", "title": "Contact Benefits Section"}),
        ]);
        assert_eq!(slug_exact("BenefitsSection", &idx), Some(1));
        assert_eq!(slug_exact("Benefits Section", &idx), Some(1));
        assert_eq!(slug_exact("Nope", &idx), None);
    }

    #[test]
    fn raw_lowercase_with_prefix_rule() {
        let idx = index(vec![json!({"slug": "contact-hrteam"})]);
        assert_eq!(slug_exact("HRTeam", &idx), Some(0));
        let idx = index(vec![json!({"slug": "contact-payrollteam"})]);
        assert_eq!(slug_exact("PayrollTeam", &idx), None);
        assert_eq!(slug_alt("PayrollTeam", &idx), Some(0));
    }

    #[test]
    fn bare_lowercase_rule() {
        let idx = index(vec![json!({"slug": "libraries"})]);
        assert_eq!(slug_alt("Libraries", &idx), None);
        assert_eq!(filename_direct("Libraries", &idx), Some(0));
    }

    #[test]
    fn title_rule_equal_after_prefix_or_substring() {
        let idx = index(vec![
            json!({"title": "Registrars Office"}),
            json!({"title": "  Contact Road Safety  "}),
            json!({"title": "Adult Social Care Team"}),
        ]);
        assert_eq!(title_fuzzy("RoadSafety", &idx), Some(1));
        assert_eq!(title_fuzzy("Adult-SocialCare", &idx), Some(2));
        assert_eq!(title_fuzzy("Parks", &idx), None);
        assert_eq!(title_fuzzy("---", &idx), None);
    }

    #[test]
    fn title_ties_go_to_store_order() {
        let idx = index(vec![
            json!({"title": "Waste Collection North"}),
            json!({"title": "Contact Waste Collection"}),
        ]);
        // Both satisfy the rule; the earlier entry wins even though the
        // second is an exact match after stripping the prefix word.
        assert_eq!(title_fuzzy("WasteCollection", &idx), Some(0));
    }

    #[test]
    fn exact_slug_beats_fuzzy_title() {
        let idx = index(vec![
            json!({"slug": "contact-misc", "title": "Benefits Section Enquiries"}),
            json!({"slug": "contact-benefits-section", "title": "Benefits"}),
        ]);
        assert_eq!(title_fuzzy("BenefitsSection", &idx), Some(0));
        assert_eq!(
            match_entry("BenefitsSection", &idx),
            Some(MatchCandidate { index: 1, strategy: Strategy::SlugExact })
        );
    }

    #[test]
    fn duplicate_titles_keep_first() {
        let idx = index(vec![
            json!({"title": "Parks Team"}),
            json!({"title": "  PARKS TEAM "}),
            json!({"title": "Parks Team North"}),
        ]);
        assert_eq!(idx.titles, vec![(s!("parks team"), 0), (s!("parks team north"), 2)]);
        assert_eq!(title_fuzzy("ParksTeam", &idx), Some(0));
    }

    #[test]
    fn duplicate_slugs_keep_first() {
        let idx = index(vec![json!({"slug": "a"}), json!({"slug": "a"})]);
        assert_eq!(idx.slug("a"), Some(0));
    }

    #[test]
    fn unmatched_is_none() {
        let idx = index(vec![json!({"slug": "contact-a", "title": "A"})]);
        assert_eq!(match_entry("Xyzzy123", &idx), None);
    }

    #[test]
    fn strategy_names() {
        let names: Vec<_> = RULES.iter().map(|(s, _)| s.to_string()).collect();
        assert_eq!(names, vec!["slug-exact", "slug-alt", "filename-direct", "title-fuzzy"]);
    }
}
