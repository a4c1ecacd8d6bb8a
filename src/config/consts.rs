// src/config/consts.rs

// Inputs
pub const DEFAULT_STORE_PATH: &str = "contacts.js";
pub const DEFAULT_HTML_DIR: &str = ".";
pub const HTML_EXT: &str = "html";
pub const EXCLUDED_FILES: &[&str] = &["test.html"];
pub const DEFAULT_CONFIG_FILE: &str = "contact_links.toml";

// Matching
pub const SLUG_PREFIX: &str = "contact-";
pub const TITLE_PREFIX_WORD: &str = "contact";
pub const QUERY_MARKER: char = '?';

// Store framing for stores built in memory
pub const DEFAULT_STORE_PREFIX: &str = "const contacts = ";
pub const DEFAULT_STORE_SUFFIX: &str = ";\n";

// Record field names
pub const SLUG_KEY: &str = "slug";
pub const TITLE_KEY: &str = "title";
pub const LINKS_KEY: &str = "links";
pub const LABEL_KEY: &str = "label";
pub const URL_KEY: &str = "url";
