//! Ordered header collection

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::header::Header;
use crate::transform::{self, Key, ToKey, ToRaw};

/// An ordered collection of headers.
///
/// Insertion order is kept by every operation. Lookups by key return the
/// first matching header, even if later headers share the key.
///
/// Transform overrides set on the collection are pushed down into every
/// member right away, and headers added later inherit them.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderCollection {
    headers: Vec<Header>,
    #[serde(skip)]
    to_key: Option<ToKey>,
    #[serde(skip)]
    to_raw: Option<ToRaw>,
}

impl HeaderCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap already ordered headers
    pub fn from_headers(headers: Vec<Header>) -> Self {
        Self {
            headers,
            ..Self::default()
        }
    }

    /// Parse one header per line.
    ///
    /// Blank lines are skipped, and so are lines without a separator, so
    /// this never fails. `to_key` is used to compute keys during this call
    /// only; it is not stored on the collection or its headers.
    pub fn parse(text: &str, to_key: Option<&ToKey>) -> Self {
        let mut headers = Vec::new();
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            match Header::parse(line, to_key) {
                Ok(header) => headers.push(header),
                Err(e) => tracing::debug!(error = %e, "Skipping non-header line"),
            }
        }
        Self::from_headers(headers)
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Header> {
        self.headers.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Header> {
        self.headers.iter_mut()
    }

    /// Keys in order, duplicates included
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.headers.iter().map(|h| &h.key)
    }

    /// First header with the given key
    pub fn get(&self, key: &str) -> Option<&Header> {
        self.headers.iter().find(|h| h.key.as_str() == key)
    }

    /// First header with the given key, mutably
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Header> {
        self.headers.iter_mut().find(|h| h.key.as_str() == key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Update the value of the header with `key`, or append a new header
    /// whose raw name is computed from the key.
    pub fn set(&mut self, key: impl Into<Key>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.get_mut(key.as_str()) {
            Some(header) => header.value = value,
            None => {
                self.add(key, value, None);
            }
        }
    }

    /// Append a new header, even if one with `key` already exists.
    ///
    /// The raw name is `raw` when given, otherwise it is computed from the
    /// key with the collection's key-to-raw transform.
    pub fn add(
        &mut self,
        key: impl Into<Key>,
        value: impl Into<String>,
        raw: Option<&str>,
    ) -> &mut Header {
        let key = key.into();
        let raw = match raw {
            Some(raw) => raw.to_string(),
            None => self.to_raw().apply(&key),
        };
        self.push(Header::new(key, raw, value));
        let last = self.headers.len() - 1;
        &mut self.headers[last]
    }

    /// Append a header as is. It inherits the collection's overrides.
    pub fn push(&mut self, mut header: Header) {
        self.inherit(&mut header);
        self.headers.push(header);
    }

    /// Remove the first header with `key` and return it
    pub fn remove(&mut self, key: &str) -> Option<Header> {
        let index = self.position(key)?;
        Some(self.headers.remove(index))
    }

    /// The raw-to-key transform in effect for the collection
    pub fn to_key(&self) -> &ToKey {
        transform::resolve(&[self.to_key.as_ref()], &transform::defaults().to_key)
    }

    /// The key-to-raw transform in effect for the collection
    pub fn to_raw(&self) -> &ToRaw {
        transform::resolve(&[self.to_raw.as_ref()], &transform::defaults().to_raw)
    }

    pub fn to_key_override(&self) -> Option<&ToKey> {
        self.to_key.as_ref()
    }

    pub fn to_raw_override(&self) -> Option<&ToRaw> {
        self.to_raw.as_ref()
    }

    /// Set or clear the raw-to-key override, for the collection and every
    /// current member.
    pub fn set_to_key(&mut self, to_key: Option<ToKey>) {
        for header in &mut self.headers {
            header.set_to_key(to_key.clone());
        }
        self.to_key = to_key;
    }

    /// Set or clear the key-to-raw override, for the collection and every
    /// current member.
    pub fn set_to_raw(&mut self, to_raw: Option<ToRaw>) {
        for header in &mut self.headers {
            header.set_to_raw(to_raw.clone());
        }
        self.to_raw = to_raw;
    }

    /// Render each header on its own line using its stored raw name
    pub fn to_text(&self) -> String {
        self.render(Header::to_text)
    }

    /// Render each header on its own line.
    ///
    /// A header whose key is in `overrides` is written with that raw name.
    /// Others use `fallback` applied to their key, or their stored raw name
    /// when no fallback is given. Nothing is stored on the headers.
    pub fn to_text_with(&self, overrides: &HashMap<Key, String>, fallback: Option<&ToRaw>) -> String {
        self.render(|h| match overrides.get(&h.key) {
            Some(raw) => h.to_text_with(Some(raw), None),
            None => h.to_text_with(None, fallback),
        })
    }

    /// Render each header with its raw name recomputed from its key, using
    /// `fallback` when given. The fallback is not stored.
    pub fn to_text_dynamic(&self, fallback: Option<&ToRaw>) -> String {
        self.render(|h| h.to_text_dynamic_with(None, fallback))
    }

    /// True if every header is reversible with its current transforms
    pub fn is_reversible(&self) -> bool {
        self.headers.iter().all(Header::is_reversible)
    }

    /// Key to value, in order. For duplicate keys the first header wins.
    pub fn to_map(&self) -> IndexMap<Key, String> {
        let mut map = IndexMap::with_capacity(self.headers.len());
        for header in &self.headers {
            map.entry(header.key.clone())
                .or_insert_with(|| header.value.clone());
        }
        map
    }

    pub fn into_headers(self) -> Vec<Header> {
        self.headers
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.key.as_str() == key)
    }

    fn inherit(&self, header: &mut Header) {
        if let Some(to_key) = &self.to_key {
            header.set_to_key(Some(to_key.clone()));
        }
        if let Some(to_raw) = &self.to_raw {
            header.set_to_raw(Some(to_raw.clone()));
        }
    }

    fn render(&self, line: impl Fn(&Header) -> String) -> String {
        self.headers.iter().map(line).collect::<Vec<_>>().join("\n")
    }

    fn contains_all(&self, other: &Self) -> bool {
        self.headers.iter().all(|h| other.headers.contains(h))
    }
}

/// Order-independent: each side has an equal header for every header of
/// the other side.
impl PartialEq for HeaderCollection {
    fn eq(&self, other: &Self) -> bool {
        self.contains_all(other) && other.contains_all(self)
    }
}

impl Eq for HeaderCollection {}

impl fmt::Debug for HeaderCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(&self.headers).finish()
    }
}

impl fmt::Display for HeaderCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl FromIterator<Header> for HeaderCollection {
    fn from_iter<I: IntoIterator<Item = Header>>(iter: I) -> Self {
        Self::from_headers(iter.into_iter().collect())
    }
}

impl Extend<Header> for HeaderCollection {
    fn extend<I: IntoIterator<Item = Header>>(&mut self, iter: I) {
        for header in iter {
            self.push(header);
        }
    }
}

impl IntoIterator for HeaderCollection {
    type Item = Header;
    type IntoIter = std::vec::IntoIter<Header>;

    fn into_iter(self) -> Self::IntoIter {
        self.headers.into_iter()
    }
}

impl<'a> IntoIterator for &'a HeaderCollection {
    type Item = &'a Header;
    type IntoIter = std::slice::Iter<'a, Header>;

    fn into_iter(self) -> Self::IntoIter {
        self.headers.iter()
    }
}

impl<'a> IntoIterator for &'a mut HeaderCollection {
    type Item = &'a mut Header;
    type IntoIter = std::slice::IterMut<'a, Header>;

    fn into_iter(self) -> Self::IntoIter {
        self.headers.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> HeaderCollection {
        ["a", "b", "c"]
            .into_iter()
            .map(|e| Header::new(e, format!("header_{e}"), format!("value_{e}")))
            .collect()
    }

    #[test]
    fn parse_skips_blank_and_malformed_lines() {
        let set = HeaderCollection::parse("A-Header: one\n\nnot a header\nB-Header: two", None);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get("a_header").unwrap().value, "one");
        assert_eq!(set.get("b_header").unwrap().value, "two");
    }

    #[test]
    fn parse_empty_text_is_empty() {
        assert!(HeaderCollection::parse("", None).is_empty());
    }

    #[test]
    fn get_returns_first_match() {
        let mut set = abc();
        set.add("a", "second", Some("Other"));
        assert_eq!(set.get("a").unwrap().value, "value_a");
        assert!(set.get("missing").is_none());
    }

    #[test]
    fn set_updates_in_place_or_appends() {
        let mut set = abc();
        set.set("a", "new value");
        assert_eq!(set.get("a").unwrap().value, "new value");
        assert_eq!(set.len(), 3);

        set.set("brand_new_key", "fresh");
        let added = set.get("brand_new_key").unwrap();
        assert_eq!(added.raw, "Brand-New-Key");
        assert_eq!(added.value, "fresh");
        assert_eq!(set.keys().last().unwrap(), "brand_new_key");
    }

    #[test]
    fn add_uses_explicit_raw_name() {
        let mut set = abc();
        let added = set.add("foo", "bar", Some("BAZ!"));
        assert_eq!(added.raw, "BAZ!");
        assert_eq!(set.get("foo").unwrap().key, "foo");
    }

    #[test]
    fn remove_returns_removed_header_and_keeps_order() {
        let mut set = abc();
        let removed = set.remove("b").unwrap();
        assert_eq!(removed.value, "value_b");
        assert!(set.remove("b").is_none());
        let keys: Vec<&str> = set.keys().map(Key::as_str).collect();
        assert_eq!(keys, ["a", "c"]);
    }

    #[test]
    fn overrides_are_pushed_down_and_inherited() {
        let mut set = abc();
        set.set_to_raw(Some(ToRaw::new(|key| key.as_str().to_uppercase())));
        assert!(set.iter().all(|h| h.to_raw_override().is_some()));

        set.set("late", "v");
        assert_eq!(set.get("late").unwrap().raw, "LATE");
        assert!(set.get("late").unwrap().to_raw_override().is_some());

        set.set_to_raw(None);
        assert!(set.iter().all(|h| h.to_raw_override().is_none()));
    }

    #[test]
    fn to_map_keeps_order_and_first_value() {
        let mut set = abc();
        set.add("a", "dup", None);
        let map = set.to_map();
        let keys: Vec<&str> = map.keys().map(Key::as_str).collect();
        assert_eq!(keys, ["a", "b", "c"]);
        assert_eq!(map["a"], "value_a");
    }

    #[test]
    fn equality_is_symmetric() {
        let small: HeaderCollection = abc().into_iter().take(2).collect();
        assert_ne!(small, abc());
        assert_ne!(abc(), small);
        assert_eq!(abc(), abc());
    }
}
