// src/core/sanitize.rs

/// Minimal HTML entity decoding: `&nbsp;` and `&amp;` only.
pub fn normalize_entities(s: &str) -> String {
    s.replace("&nbsp;", " ").replace("&amp;", "&")
}

/// Collapse runs of whitespace into one space and trim.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/// Insert a space at every lowercase→uppercase boundary.
/// `"BenefitsSection"` → `"Benefits Section"`. Acronym runs stay together.
pub fn split_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for ch in name.chars() {
        if prev_lower && ch.is_uppercase() { out.push(' '); }
        out.push(ch);
        prev_lower = ch.is_lowercase();
    }
    out
}

fn is_word_break(ch: char) -> bool {
    ch.is_whitespace() || ch == '-' || ch == '_'
}

/// File stem → store slug: camel split, word breaks to a single `-`,
/// lowercased, then prefixed.
/// `derive_slug("BenefitsSection", "contact-")` → `"contact-benefits-section"`.
pub fn derive_slug(name: &str, prefix: &str) -> String {
    let split = split_camel(name);
    let mut body = String::with_capacity(split.len());
    let mut pending_break = false;
    for ch in split.chars() {
        if is_word_break(ch) {
            pending_break = !body.is_empty();
            continue;
        }
        if pending_break { body.push('-'); pending_break = false; }
        body.extend(ch.to_lowercase());
    }
    join!(prefix, &body)
}

/// File stem → lowercase space-separated phrase used against titles.
/// `"Adult-SocialCare"` → `"adult social care"`.
pub fn title_phrase(name: &str) -> String {
    let spaced: String = split_camel(name)
        .chars()
        .map(|c| if is_word_break(c) { ' ' } else { c })
        .collect();
    normalize_ws(&spaced).to_lowercase()
}

/// Drop a leading whole `word` (already lowercase) from a lowercase title.
/// `"contact benefits"` → `"benefits"`; `"contacts team"` is left alone.
pub fn strip_prefix_word<'a>(title: &'a str, word: &str) -> &'a str {
    match title.strip_prefix(word) {
        Some(rest) if word.is_empty() => rest.trim(),
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest.trim(),
        _ => title,
    }
}
