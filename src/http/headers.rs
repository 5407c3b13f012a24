//! Case-insensitive multi-value header storage.
//!
//! # Responsibilities
//! - Split the platform's flat `name -> comma-joined value` map into an
//!   ordered multi-value store and join it back
//! - Resolve any casing of a name (including the upper-cased forms some
//!   platform versions deliver) to one canonical entry
//!
//! # Design Decisions
//! - Single ordered list scanned by case-folded name; header counts are
//!   small so O(n) lookup beats a second index that must be kept in sync
//! - Splitting on `,` is lossy for values that legitimately contain a
//!   literal comma (e.g. RFC 1123 dates); callers must not rely on such
//!   values round-tripping exactly

use std::collections::HashMap;

use crate::http::media::MediaType;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_LENGTH: &str = "Content-Length";
pub const COOKIE: &str = "Cookie";
pub const SET_COOKIE: &str = "Set-Cookie";
pub const HOST: &str = "Host";
pub const LOCATION: &str = "Location";

/// Well-known header names in their canonical mixed-case form. Any casing
/// of these (including `CONTENT_TYPE`-style platform delivery) maps to the
/// canonical form; unrecognized names pass through unchanged.
const CANONICAL_NAMES: &[&str] = &[
    "Accept",
    "Accept-Charset",
    "Accept-Encoding",
    "Accept-Language",
    "Authorization",
    "Cache-Control",
    "Connection",
    "Content-Disposition",
    "Content-Encoding",
    "Content-Length",
    "Content-Type",
    "Cookie",
    "Date",
    "ETag",
    "Expires",
    "Host",
    "If-Modified-Since",
    "If-None-Match",
    "Last-Modified",
    "Location",
    "Origin",
    "Referer",
    "Set-Cookie",
    "Transfer-Encoding",
    "User-Agent",
    "X-Forwarded-For",
    "X-Forwarded-Proto",
    "X-Request-Id",
];

/// Case-fold a header name for comparison: lowercase, `_` treated as `-`.
fn fold(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '_' => '-',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

/// Map a name to its canonical mixed-case form when it is a well-known
/// header, otherwise return it as given.
fn canonical(name: &str) -> String {
    let folded = fold(name);
    for known in CANONICAL_NAMES {
        if fold(known) == folded {
            return (*known).to_string();
        }
    }
    name.to_string()
}

/// Ordered, case-insensitive, multi-value header store.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    entries: Vec<(String, Vec<String>)>,
}

impl Headers {
    /// An empty header store.
    pub fn new() -> Headers {
        Headers::default()
    }

    /// Build from the platform's flat map, splitting each value on `,` and
    /// trimming whitespace.
    ///
    /// A value whose only legitimate content contains a literal comma is
    /// indistinguishable from two separate values; this is documented
    /// platform behavior, not corrected here.
    pub fn from_flat(flat: &HashMap<String, String>) -> Headers {
        let mut headers = Headers::new();
        // Sort for determinism; HashMap iteration order is arbitrary and
        // the platform map carries no ordering of its own.
        let mut pairs: Vec<(&String, &String)> = flat.iter().collect();
        pairs.sort_by(|a, b| a.0.cmp(b.0));
        for (name, joined) in pairs {
            for value in joined.split(',') {
                let value = value.trim();
                if !value.is_empty() {
                    headers.add(name, value);
                }
            }
        }
        headers
    }

    /// Rejoin each entry's values with `,` into a flat map.
    pub fn to_flat(&self) -> HashMap<String, String> {
        self.entries
            .iter()
            .map(|(name, values)| (name.clone(), values.join(",")))
            .collect()
    }

    fn position(&self, name: &str) -> Option<usize> {
        let folded = fold(name);
        self.entries.iter().position(|(n, _)| fold(n) == folded)
    }

    /// First value for the name, any casing.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name)
            .and_then(|i| self.entries[i].1.first())
            .map(String::as_str)
    }

    /// All values for the name, in insertion order.
    pub fn get_all(&self, name: &str) -> &[String] {
        match self.position(name) {
            Some(i) => &self.entries[i].1,
            None => &[],
        }
    }

    /// True if at least one value exists for the name.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Append a value, creating the entry under its canonical name when
    /// absent.
    pub fn add(&mut self, name: &str, value: impl Into<String>) {
        match self.position(name) {
            Some(i) => self.entries[i].1.push(value.into()),
            None => self.entries.push((canonical(name), vec![value.into()])),
        }
    }

    /// Replace all values for the name with a single value.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        match self.position(name) {
            Some(i) => self.entries[i].1 = vec![value.into()],
            None => self.entries.push((canonical(name), vec![value.into()])),
        }
    }

    /// Remove the entry, if present.
    pub fn remove(&mut self, name: &str) {
        if let Some(i) = self.position(name) {
            self.entries.remove(i);
        }
    }

    /// Entry names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Iterate entries as `(name, values)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    /// Parsed `Content-Type`, if present and well-formed.
    pub fn content_type(&self) -> Option<MediaType> {
        self.get(CONTENT_TYPE).and_then(MediaType::parse)
    }

    /// Number of distinct header names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no headers are present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let headers = Headers::from_flat(&flat(&[("content-type", "application/json")]));
        assert_eq!(headers.get("Content-Type"), Some("application/json"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("application/json"));
        assert_eq!(headers.get("CONTENT_TYPE"), Some("application/json"));
    }

    #[test]
    fn test_comma_joined_values_split() {
        let headers = Headers::from_flat(&flat(&[("Accept", "text/html, application/json")]));
        assert_eq!(
            headers.get_all("accept"),
            &["text/html".to_string(), "application/json".to_string()]
        );
    }

    #[test]
    fn test_canonical_names_from_upper_case() {
        let headers = Headers::from_flat(&flat(&[("CONTENT_TYPE", "text/plain")]));
        assert_eq!(headers.names().collect::<Vec<_>>(), vec!["Content-Type"]);
    }

    #[test]
    fn test_unknown_names_pass_through() {
        let headers = Headers::from_flat(&flat(&[("X-Custom-Thing", "v")]));
        assert_eq!(headers.names().collect::<Vec<_>>(), vec!["X-Custom-Thing"]);
    }

    #[test]
    fn test_flat_round_trip_without_commas() {
        let original = flat(&[("Accept", "text/html,application/json"), ("Host", "example.com")]);
        let round = Headers::from_flat(&original).to_flat();
        assert_eq!(round, original);
    }

    #[test]
    fn test_mutation() {
        let mut headers = Headers::new();
        headers.add("x-one", "a");
        headers.add("X-One", "b");
        assert_eq!(headers.get_all("x-one").len(), 2);
        headers.set("x-one", "c");
        assert_eq!(headers.get_all("x-one"), &["c".to_string()]);
        headers.remove("X-ONE");
        assert!(headers.is_empty());
    }

    #[test]
    fn content_type_parsing() {
        let headers = Headers::from_flat(&flat(&[("content-type", "application/json; charset=utf-8")]));
        let mt = headers.content_type().unwrap();
        assert_eq!(mt.essence(), "application/json");
        assert_eq!(mt.charset(), Some("utf-8"));
    }
}
