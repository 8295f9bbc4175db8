//! Header mapping with canonical (title-cased) names.

use serde::Serialize;
use std::collections::hash_map;
use std::collections::HashMap;

/// Canonicalize a header name: the first letter of every alphabetic run is
/// upper-cased, every other letter lower-cased.
///
/// `x-requested-with` becomes `X-Requested-With`, `CONTENT-type` becomes
/// `Content-Type` and `x-csrf-token` becomes `X-Csrf-Token`.
pub fn canonical_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_alpha = false;
    for c in name.trim().chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Header mapping keyed by canonical name.
///
/// Every insert and lookup goes through [`canonical_name`], so lookups are
/// case-insensitive. A repeated header replaces the earlier value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Headers(HashMap<String, String>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a header value by name, in any case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&canonical_name(name)).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(&canonical_name(name))
    }

    /// Insert or overwrite a header, returning the previous value.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) -> Option<String> {
        self.0.insert(canonical_name(name), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.remove(&canonical_name(name))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, String> {
        self.0.iter()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name.as_ref(), value);
        }
        headers
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a String, &'a String);
    type IntoIter = hash_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_name() {
        assert_eq!(canonical_name("content-type"), "Content-Type");
        assert_eq!(canonical_name("X-REQUESTED-WITH"), "X-Requested-With");
        assert_eq!(canonical_name("x-csrf-token"), "X-Csrf-Token");
        assert_eq!(canonical_name("  host "), "Host");
        assert_eq!(canonical_name("x-b3-traceid"), "X-B3-Traceid");
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let headers: Headers = [("content-length", "42")].into_iter().collect();

        assert_eq!(headers.get("Content-Length"), Some("42"));
        assert_eq!(headers.get("CONTENT-LENGTH"), Some("42"));
        assert!(headers.contains("content-LENGTH"));
        assert_eq!(headers.get("Content-Type"), None);
    }

    #[test]
    fn test_duplicate_header_overwrites() {
        let headers: Headers = [("Set-Cookie", "a=1"), ("set-cookie", "b=2")]
            .into_iter()
            .collect();

        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("Set-Cookie"), Some("b=2"));
    }

    #[test]
    fn test_clone_is_independent() {
        let original: Headers = [("Accept", "*/*")].into_iter().collect();
        let mut copy = original.clone();
        copy.insert("accept", "text/html");
        copy.remove("Accept");

        assert_eq!(original.get("Accept"), Some("*/*"));
        assert!(copy.is_empty());
    }
}
