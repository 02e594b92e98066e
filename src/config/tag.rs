//! Field tag mini-language: `key=value` / bare `key` tokens separated by commas, or `-` to skip.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Option keys every field understands. Anything else is passed through for custom fields.
pub const KNOWN_KEYS: &[&str] = &["field", "label", "list", "search", "default", "width"];

/// Parsed tag: either the field is excluded, or a set of options.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagOptions {
    pub skip: bool,
    values: BTreeMap<String, String>,
}

impl TagOptions {
    pub fn new() -> Self {
        TagOptions::default()
    }

    /// Options for an excluded field.
    pub fn skipped() -> Self {
        TagOptions {
            skip: true,
            values: BTreeMap::new(),
        }
    }

    /// Set a key. Bare flags use an empty value.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Bare flag or `key=true`; `key=false` turns it off.
    pub fn flag(&self, key: &str) -> bool {
        match self.get(key) {
            Some(v) => !v.eq_ignore_ascii_case("false"),
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Keys that are not in [`KNOWN_KEYS`].
    pub fn unknown_keys(&self) -> Vec<&str> {
        self.values
            .keys()
            .map(String::as_str)
            .filter(|k| !KNOWN_KEYS.contains(k))
            .collect()
    }
}

/// Parse a tag string. The error is the reason only; callers attach model/field context.
pub fn parse_tag(tag: &str) -> Result<TagOptions, String> {
    let tag = tag.trim();
    if tag == "-" {
        return Ok(TagOptions::skipped());
    }
    let mut options = TagOptions::new();
    if tag.is_empty() {
        return Ok(options);
    }
    for token in tag.split(',') {
        let token = token.trim();
        if token.is_empty() {
            return Err("empty option".into());
        }
        let (key, value) = match token.split_once('=') {
            Some((k, v)) => (k.trim(), v.trim()),
            None => (token, ""),
        };
        if key.is_empty() {
            return Err(format!("missing key in '{}'", token));
        }
        if !key_pattern().is_match(key) {
            return Err(format!("invalid key '{}'", key));
        }
        if options.contains(key) {
            return Err(format!("duplicate key '{}'", key));
        }
        options.values.insert(key.to_string(), value.to_string());
    }
    Ok(options)
}

fn key_pattern() -> &'static Regex {
    static KEY: OnceLock<Regex> = OnceLock::new();
    KEY.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static pattern"))
}
