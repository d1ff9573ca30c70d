//! A single `name: value` header

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::transform::{self, Key, ToKey, ToRaw};

/// Character separating a raw header name from its value
pub const SEPARATOR: char = ':';

/// The separator together with any whitespace around it
static SEPARATOR_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*:\s*").unwrap());

/// True if `line` can be split into a raw name and a value
pub(crate) fn is_header_line(line: &str) -> bool {
    SEPARATOR_PATTERN.is_match(line)
}

/// One header entry.
///
/// `key` and `raw` can be changed freely; nothing is re-parsed when they
/// are. Equality only looks at `raw` and `value`.
#[derive(Clone, Serialize, Deserialize)]
pub struct Header {
    /// Normalized name used for lookups
    pub key: Key,
    /// Name as written in text
    pub raw: String,
    pub value: String,
    #[serde(skip)]
    to_key: Option<ToKey>,
    #[serde(skip)]
    to_raw: Option<ToRaw>,
}

impl Header {
    pub fn new(key: impl Into<Key>, raw: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            raw: raw.into(),
            value: value.into(),
            to_key: None,
            to_raw: None,
        }
    }

    /// Parse a single header line.
    ///
    /// Only the first `:` splits the line; whitespace around it is dropped
    /// and the value is otherwise kept as is, later colons included. The
    /// key comes from `to_key` if given, else the process default. The
    /// given transform is used for this call only and is not stored.
    ///
    /// # Errors
    ///
    /// Returns `MalformedHeaderLine` if the line has no separator.
    ///
    /// # Examples
    ///
    /// ```
    /// use redhead::Header;
    ///
    /// let header = Header::parse("Created-At : 20:30", None).unwrap();
    /// assert_eq!(header.key, "created_at");
    /// assert_eq!(header.raw, "Created-At");
    /// assert_eq!(header.value, "20:30");
    /// ```
    pub fn parse(line: &str, to_key: Option<&ToKey>) -> Result<Self> {
        let sep = SEPARATOR_PATTERN
            .find(line)
            .ok_or_else(|| Error::malformed(line))?;

        let raw = &line[..sep.start()];
        let value = &line[sep.end()..];
        let to_key = to_key.unwrap_or(&transform::defaults().to_key);

        Ok(Self::new(to_key.apply(raw), raw, value))
    }

    /// The raw-to-key transform in effect for this header
    pub fn to_key(&self) -> &ToKey {
        transform::resolve(&[self.to_key.as_ref()], &transform::defaults().to_key)
    }

    /// The key-to-raw transform in effect for this header
    pub fn to_raw(&self) -> &ToRaw {
        self.resolve_to_raw(None)
    }

    /// This header's own raw-to-key override, if any
    pub fn to_key_override(&self) -> Option<&ToKey> {
        self.to_key.as_ref()
    }

    /// This header's own key-to-raw override, if any
    pub fn to_raw_override(&self) -> Option<&ToRaw> {
        self.to_raw.as_ref()
    }

    /// Set or clear this header's raw-to-key override
    pub fn set_to_key(&mut self, to_key: Option<ToKey>) {
        self.to_key = to_key;
    }

    /// Set or clear this header's key-to-raw override
    pub fn set_to_raw(&mut self, to_raw: Option<ToRaw>) {
        self.to_raw = to_raw;
    }

    /// Key computed from the stored raw name. Does not change `key`.
    pub fn key_from_raw(&self) -> Key {
        self.to_key().apply(&self.raw)
    }

    /// Raw name computed from the stored key. Does not change `raw`.
    pub fn raw_from_key(&self) -> String {
        self.to_raw().apply(&self.key)
    }

    /// True if converting the stored raw name to a key and back yields the
    /// same raw name.
    pub fn is_reversible(&self) -> bool {
        self.to_raw().apply(&self.key_from_raw()) == self.raw
    }

    /// Render as `<raw>: <value>` using the stored raw name
    pub fn to_text(&self) -> String {
        self.render(&self.raw)
    }

    /// Render with an explicit raw name, or with a one-off transform applied
    /// to the key. The stored raw name is used when neither is given.
    pub fn to_text_with(&self, raw_name: Option<&str>, to_raw: Option<&ToRaw>) -> String {
        match (raw_name, to_raw) {
            (Some(raw), _) => self.render(raw),
            (None, Some(to_raw)) => self.render(&to_raw.apply(&self.key)),
            (None, None) => self.render(&self.raw),
        }
    }

    /// Render with the raw name recomputed from the key
    pub fn to_text_dynamic(&self) -> String {
        self.to_text_dynamic_with(None, None)
    }

    /// Like [`Header::to_text_with`], but without an explicit raw name the
    /// raw name is always recomputed from the key, using `to_raw` if given
    /// and the resolved transform otherwise.
    pub fn to_text_dynamic_with(&self, raw_name: Option<&str>, to_raw: Option<&ToRaw>) -> String {
        match raw_name {
            Some(raw) => self.render(raw),
            None => self.render(&self.resolve_to_raw(to_raw).apply(&self.key)),
        }
    }

    fn render(&self, raw: &str) -> String {
        format!("{raw}{SEPARATOR} {}", self.value)
    }

    fn resolve_to_raw<'a>(&'a self, call: Option<&'a ToRaw>) -> &'a ToRaw {
        transform::resolve(&[call, self.to_raw.as_ref()], &transform::defaults().to_raw)
    }
}

impl PartialEq for Header {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw && self.value == other.value
    }
}

impl Eq for Header {}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl fmt::Debug for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ {} => {:?} }}", self.key, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Header {
        Header::new("a_header_name", "A-Header-Name", "some value")
    }

    #[test]
    fn parse_splits_raw_name_and_value() {
        let parsed = Header::parse("A-Header-Name: some value", None).unwrap();
        assert_eq!(parsed.key, "a_header_name");
        assert_eq!(parsed.raw, "A-Header-Name");
        assert_eq!(parsed.value, "some value");
    }

    #[test]
    fn parse_drops_whitespace_around_separator() {
        for (before, after) in [("", ""), ("   ", ""), ("", "    "), ("\t", " ")] {
            let line = format!("A-Header-Name{before}:{after}some value");
            let parsed = Header::parse(&line, None).unwrap();
            assert_eq!(parsed.raw, "A-Header-Name");
            assert_eq!(parsed.value, "some value");
        }
    }

    #[test]
    fn parse_keeps_later_colons_in_value() {
        let parsed = Header::parse("created: 20:30", None).unwrap();
        assert_eq!(parsed.key, "created");
        assert_eq!(parsed.value, "20:30");
    }

    #[test]
    fn parse_with_transform_does_not_store_it() {
        let to_key = ToKey::new(|_| Key::from("foo"));
        let parsed = Header::parse("A-Header-Name: v", Some(&to_key)).unwrap();
        assert_eq!(parsed.key, "foo");
        assert!(parsed.to_key_override().is_none());
        assert_eq!(parsed.key_from_raw(), "a_header_name");
    }

    #[test]
    fn parse_rejects_line_without_separator() {
        let err = Header::parse("no separator here", None).unwrap_err();
        assert!(matches!(err, Error::MalformedHeaderLine { .. }));
    }

    #[test]
    fn to_text_explicit_raw_wins_over_transform() {
        let h = header();
        let to_raw = ToRaw::new(|_| "foo".to_string());
        assert_eq!(h.to_text_with(Some("test"), Some(&to_raw)), "test: some value");
        assert_eq!(h.to_text_with(None, Some(&to_raw)), "foo: some value");
        assert_eq!(h.to_text(), "A-Header-Name: some value");
    }

    #[test]
    fn to_text_dynamic_recomputes_raw_name() {
        let h = Header::new("a_header_name", "An original HEADER name", "something here");
        assert_eq!(h.to_text(), "An original HEADER name: something here");
        assert_eq!(h.to_text_dynamic(), "A-Header-Name: something here");
        assert_eq!(h.raw, "An original HEADER name");
    }

    #[test]
    fn to_text_dynamic_with_one_off_transform_is_not_kept() {
        let h = header();
        let to_raw = ToRaw::new(|_| "testing".to_string());
        assert_eq!(h.to_text_dynamic_with(None, Some(&to_raw)), "testing: some value");
        assert!(h.to_raw_override().is_none());
        assert_eq!(h.to_text_dynamic(), "A-Header-Name: some value");
    }

    #[test]
    fn key_from_raw_uses_override_without_mutating() {
        let mut h = header();
        h.set_to_key(Some(ToKey::new(|_| Key::from("test"))));
        assert_eq!(h.key_from_raw(), "test");
        assert_eq!(h.key, "a_header_name");
    }

    #[test]
    fn raw_from_key_uses_override_without_mutating() {
        let mut h = header();
        h.set_to_raw(Some(ToRaw::new(|key| key.as_str().to_uppercase())));
        assert_eq!(h.raw_from_key(), "A_HEADER_NAME");
        assert_eq!(h.raw, "A-Header-Name");
    }

    #[test]
    fn reversibility_follows_current_transforms() {
        let mut h = header();
        assert!(h.is_reversible());

        h.set_to_raw(Some(ToRaw::new(|key| format!("1{key}"))));
        h.set_to_key(Some(ToKey::new(|raw| Key::new(format!("2{raw}")))));
        assert!(!h.is_reversible());

        h.set_to_raw(Some(ToRaw::new(|key| key.as_str().chars().rev().collect())));
        h.set_to_key(Some(ToKey::new(|raw| Key::new(raw.chars().rev().collect::<String>()))));
        assert!(h.is_reversible());
    }

    #[test]
    fn equality_ignores_key() {
        assert_eq!(
            Header::new("one", "A-Header-Name", "a"),
            Header::new("two", "A-Header-Name", "a")
        );
        assert_ne!(
            Header::new("a", "A-Header-Name", "a"),
            Header::new("a", "A-Header-Name", "aaaaaaa")
        );
        assert_ne!(
            Header::new("a", "A-Header-Name", "a"),
            Header::new("a", "A-Header-Nameeeeeeee", "a")
        );
    }

    #[test]
    fn debug_shows_key_and_value() {
        assert_eq!(format!("{:?}", header()), r#"{ a_header_name => "some value" }"#);
    }
}
