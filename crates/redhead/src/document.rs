//! Body content paired with its header block

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::header::is_header_line;
use crate::header_set::HeaderCollection;
use crate::transform::{Key, ToKey};

/// Blank line between the header block and the body, `\r\n` tolerant
static BLOCK_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\r?\n\r?\n").unwrap());

/// Written between headers and body when recombining a document
const BLOCK_SEPARATOR_TEXT: &str = "\n\n";

/// How a text breaks down into headers and body
#[derive(Debug, PartialEq, Eq)]
enum Split<'a> {
    /// No header block, the whole text is body
    Body,
    /// The trimmed text is nothing but header lines
    HeaderOnly(&'a str),
    /// Header lines, a blank line, then the body
    Block { head: &'a str, body: &'a str },
}

fn split(text: &str) -> Split<'_> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Split::Body;
    }

    if trimmed.lines().all(is_header_line) {
        return Split::HeaderOnly(trimmed);
    }

    let Some(sep) = BLOCK_SEPARATOR.find(text) else {
        return Split::Body;
    };

    let head = &text[..sep.start()];
    if head.lines().all(is_header_line) {
        Split::Block {
            head,
            body: &text[sep.end()..],
        }
    } else {
        Split::Body
    }
}

/// True if `text` starts with a header block.
///
/// That is the case when the trimmed text consists only of header lines,
/// or when every line before the first blank line is a header line.
///
/// # Examples
///
/// ```
/// use redhead::has_header_block;
///
/// assert!(has_header_block("foo: bar\n\ncontent"));
/// assert!(has_header_block("foo: bar"));
/// assert!(!has_header_block("some content\n\nhere"));
/// assert!(!has_header_block(""));
/// ```
pub fn has_header_block(text: &str) -> bool {
    split(text) != Split::Body
}

/// Changes applied to a header by [`Document::update_headers`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderPatch {
    pub raw: Option<String>,
    pub key: Option<Key>,
}

impl HeaderPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    pub fn with_key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }
}

/// Body text plus the headers parsed from the front of it.
///
/// The body and the headers are independent: changing one never touches
/// the other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    content: String,
    headers: HeaderCollection,
}

impl Document {
    pub fn new(content: impl Into<String>, headers: HeaderCollection) -> Self {
        Self {
            content: content.into(),
            headers,
        }
    }

    /// Split `text` into headers and body using the default transforms
    pub fn parse(text: &str) -> Self {
        Self::parse_with(text, None)
    }

    /// Split `text` into headers and body.
    ///
    /// Without a header block the whole text becomes the body. A text made
    /// only of header lines gives an empty body. Otherwise the body is
    /// everything after the first blank line. `to_key` is only used while
    /// parsing and is not stored.
    ///
    /// # Examples
    ///
    /// ```
    /// use redhead::Document;
    ///
    /// let doc = Document::parse("Title: Hello\nAuthor: me\n\nBody text.");
    /// assert_eq!(doc.content(), "Body text.");
    /// assert_eq!(doc.headers().get("author").unwrap().value, "me");
    /// ```
    pub fn parse_with(text: &str, to_key: Option<&ToKey>) -> Self {
        let (head, body) = match split(text) {
            Split::Body => {
                tracing::trace!("No header block, treating input as body");
                return Self::new(text, HeaderCollection::new());
            }
            Split::HeaderOnly(head) => {
                tracing::trace!("Input is a header block without body");
                (head, "")
            }
            Split::Block { head, body } => (head, body),
        };

        let headers = HeaderCollection::parse(head, to_key);
        tracing::debug!(
            headers = headers.len(),
            body_len = body.len(),
            "Parsed header block"
        );
        Self::new(body, headers)
    }

    /// Same as the free function [`has_header_block`]
    pub fn has_header_block(text: &str) -> bool {
        has_header_block(text)
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut String {
        &mut self.content
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn headers(&self) -> &HeaderCollection {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderCollection {
        &mut self.headers
    }

    pub fn into_parts(self) -> (String, HeaderCollection) {
        (self.content, self.headers)
    }

    /// The body alone, without headers
    pub fn to_text(&self) -> &str {
        &self.content
    }

    /// Headers, a blank line and the body, as one text
    pub fn to_text_with_headers(&self) -> String {
        match (self.headers.is_empty(), self.content.is_empty()) {
            (true, _) => self.content.clone(),
            (false, true) => self.headers.to_text(),
            (false, false) => format!(
                "{}{BLOCK_SEPARATOR_TEXT}{}",
                self.headers.to_text(),
                self.content
            ),
        }
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn push_str(&mut self, text: &str) {
        self.content.push_str(text);
    }

    /// Replace the body with `f` applied to it
    pub fn map_content(&mut self, f: impl FnOnce(&str) -> String) {
        self.content = f(&self.content);
    }

    pub fn make_uppercase(&mut self) {
        self.map_content(str::to_uppercase);
    }

    pub fn make_lowercase(&mut self) {
        self.map_content(str::to_lowercase);
    }

    /// Reverse the body character by character
    pub fn reverse(&mut self) {
        self.map_content(|s| s.chars().rev().collect());
    }

    /// Patch the raw name and key of headers, matched by their current key.
    ///
    /// The headers are changed in place. Returns a collection with copies
    /// of the changed headers, in document order. Patch keys that match no
    /// header are ignored.
    pub fn update_headers(&mut self, patch: &HashMap<Key, HeaderPatch>) -> HeaderCollection {
        let mut changed = Vec::new();
        for header in self.headers.iter_mut() {
            let Some(p) = patch.get(&header.key) else {
                continue;
            };
            if let Some(raw) = &p.raw {
                header.raw = raw.clone();
            }
            if let Some(key) = &p.key {
                header.key = key.clone();
            }
            changed.push(header.clone());
        }
        tracing::debug!(changed = changed.len(), "Updated headers");
        HeaderCollection::from_headers(changed)
    }
}

impl AsRef<str> for Document {
    fn as_ref(&self) -> &str {
        &self.content
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content)
    }
}
