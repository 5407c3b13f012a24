//! Query and form parameter resolution.
//!
//! # Responsibilities
//! - Expose the platform's flat query map as a multi-value view, splitting
//!   comma-joined values the same way headers are split
//! - Merge URL-encoded form-body pairs into the same namespace when the
//!   content type is a form submission
//!
//! # Design Decisions
//! - Body-derived values never override query-derived values of the same
//!   name; both are retained as a multi-value union
//! - A malformed body contributes zero parameters rather than an error

use std::collections::HashMap;
use std::str::FromStr;

use crate::http::media::MediaType;

/// Multi-value view over query-string and form-body parameters. Keys are
/// case-sensitive, unlike header names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    entries: Vec<(String, Vec<String>)>,
}

impl Parameters {
    /// Build the parameter view for one request.
    ///
    /// The query map is always decoded; the body contributes pairs only for
    /// `application/x-www-form-urlencoded` submissions. Multipart payloads
    /// count as form submissions for body routing but are left to
    /// application codecs, so they add nothing here.
    pub fn resolve(
        query: &HashMap<String, String>,
        body: Option<&[u8]>,
        content_type: Option<&MediaType>,
    ) -> Parameters {
        let mut params = Parameters::default();

        let mut pairs: Vec<(&String, &String)> = query.iter().collect();
        pairs.sort_by(|a, b| a.0.cmp(b.0));
        for (name, joined) in pairs {
            for value in joined.split(',') {
                let value = value.trim();
                if !value.is_empty() {
                    params.push(name, value);
                }
            }
        }

        let is_urlencoded = content_type
            .map(|mt| mt.matches_essence(crate::http::media::FORM_URLENCODED))
            .unwrap_or(false);
        if is_urlencoded {
            if let Some(body) = body {
                // form_urlencoded decodes lossily; malformed percent
                // escapes degrade to replacement characters instead of
                // failing the whole view.
                for (name, value) in url::form_urlencoded::parse(body) {
                    params.push(&name, &value);
                }
            }
        }

        params
    }

    fn push(&mut self, name: &str, value: &str) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, values)) => values.push(value.to_string()),
            None => self
                .entries
                .push((name.to_string(), vec![value.to_string()])),
        }
    }

    /// First value for a name.
    pub fn get_first(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, values)| values.first())
            .map(String::as_str)
    }

    /// All values for a name, query-derived first.
    pub fn get_all(&self, name: &str) -> &[String] {
        match self.entries.iter().find(|(n, _)| n == name) {
            Some((_, values)) => values,
            None => &[],
        }
    }

    /// Convert the first value for a name.
    pub fn get_as<T: FromStr>(&self, name: &str) -> Option<T> {
        self.get_first(name).and_then(|v| v.parse().ok())
    }

    /// Parameter names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Iterate entries as `(name, values)`.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn form_type() -> MediaType {
        MediaType::parse(crate::http::media::FORM_URLENCODED).unwrap()
    }

    #[test]
    fn test_query_only() {
        let params = Parameters::resolve(&query(&[("name", "Fred"), ("age", "30")]), None, None);
        assert_eq!(params.get_first("name"), Some("Fred"));
        assert_eq!(params.get_as::<u32>("age"), Some(30));
    }

    #[test]
    fn test_comma_joined_query_values_split() {
        let params = Parameters::resolve(&query(&[("tag", "a, b,c")]), None, None);
        assert_eq!(
            params.get_all("tag"),
            &["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn test_form_body_merged() {
        let params = Parameters::resolve(
            &query(&[("q", "search")]),
            Some(b"a=1&b=2"),
            Some(&form_type()),
        );
        assert_eq!(params.get_all("a"), &["1".to_string()]);
        assert_eq!(params.get_all("b"), &["2".to_string()]);
        assert_eq!(params.get_first("q"), Some("search"));
    }

    #[test]
    fn test_body_values_do_not_override_query() {
        let params = Parameters::resolve(
            &query(&[("name", "from-query")]),
            Some(b"name=from-body"),
            Some(&form_type()),
        );
        assert_eq!(
            params.get_all("name"),
            &["from-query".to_string(), "from-body".to_string()]
        );
        assert_eq!(params.get_first("name"), Some("from-query"));
    }

    #[test]
    fn test_body_ignored_without_form_content_type() {
        let json = MediaType::parse("application/json").unwrap();
        let params = Parameters::resolve(&query(&[]), Some(b"a=1&b=2"), Some(&json));
        assert!(params.is_empty());
    }

    #[test]
    fn test_percent_decoding() {
        let params = Parameters::resolve(
            &query(&[]),
            Some(b"greeting=hello%20world&plus=a+b"),
            Some(&form_type()),
        );
        assert_eq!(params.get_first("greeting"), Some("hello world"));
        assert_eq!(params.get_first("plus"), Some("a b"));
    }

    #[test]
    fn test_malformed_body_degrades_silently() {
        let params = Parameters::resolve(&query(&[]), Some(b"%ZZ=%"), Some(&form_type()));
        // Whatever the lossy decode produced, resolution itself succeeded.
        assert!(params.len() <= 1);
    }
}
