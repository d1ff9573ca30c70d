//! Key and raw header name transforms
//!
//! A header has two names: the raw name as written in text
//! (`A-Header-Name`) and a normalized key used for lookups
//! (`a_header_name`). A [`ToKey`] maps raw names to keys and a [`ToRaw`]
//! maps keys back to raw names.
//!
//! Transforms are resolved per direction, first match wins:
//!
//! 1. a transform passed to the call itself
//! 2. the header's own override
//! 3. the owning collection's override (pushed down into each header)
//! 4. the process-wide defaults, see [`defaults`]

use std::borrow::Borrow;
use std::fmt;
use std::sync::{Arc, LazyLock, OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Runs of characters that cannot appear in a default key
static NON_KEY_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)[^a-z_]+").unwrap());

static DEFAULTS: OnceLock<Transforms> = OnceLock::new();

/// Normalized identifier for a header
///
/// Keys are case-sensitive: `Foo` and `foo` are different keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(String);

impl Key {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Key {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for Key {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&Key> for Key {
    fn from(key: &Key) -> Self {
        key.clone()
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Key {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Key {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

type ToKeyFn = dyn Fn(&str) -> Key + Send + Sync;
type ToRawFn = dyn Fn(&Key) -> String + Send + Sync;

/// Converts a raw header name into a key
#[derive(Clone)]
pub struct ToKey(Arc<ToKeyFn>);

impl ToKey {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> Key + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn apply(&self, raw: &str) -> Key {
        (self.0)(raw)
    }

    /// Lowercase segments joined by `_` (the built-in default)
    pub fn snake() -> Self {
        Self::new(default_to_key)
    }

    /// Uses the raw name as the key unchanged
    pub fn verbatim() -> Self {
        Self::new(|raw| Key::new(raw))
    }

    /// True if both handles point at the same function
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ToKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ToKey(..)")
    }
}

/// Converts a key into a raw header name
#[derive(Clone)]
pub struct ToRaw(Arc<ToRawFn>);

impl ToRaw {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Key) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn apply(&self, key: &Key) -> String {
        (self.0)(key)
    }

    /// Capitalized segments joined by `-` (the built-in default)
    pub fn train() -> Self {
        Self::new(default_to_raw)
    }

    /// Uses the key as the raw name unchanged
    pub fn verbatim() -> Self {
        Self::new(|key| key.to_string())
    }

    /// True if both handles point at the same function
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ToRaw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ToRaw(..)")
    }
}

/// A raw-to-key and key-to-raw pair
#[derive(Debug, Clone)]
pub struct Transforms {
    pub to_key: ToKey,
    pub to_raw: ToRaw,
}

impl Transforms {
    pub fn new(to_key: ToKey, to_raw: ToRaw) -> Self {
        Self { to_key, to_raw }
    }
}

impl Default for Transforms {
    fn default() -> Self {
        Self::new(ToKey::snake(), ToRaw::train())
    }
}

/// Install the process-wide default transforms.
///
/// Must happen once, at startup, before anything reads the defaults. Fails
/// with [`Error::DefaultsAlreadyInstalled`] if defaults were installed or
/// already read.
pub fn install_defaults(transforms: Transforms) -> Result<()> {
    DEFAULTS
        .set(transforms)
        .map_err(|_| Error::DefaultsAlreadyInstalled)?;
    tracing::debug!("Installed process-wide default transforms");
    Ok(())
}

/// The process-wide default transforms.
///
/// These are [`Transforms::default`] unless [`install_defaults`] ran first.
pub fn defaults() -> &'static Transforms {
    DEFAULTS.get_or_init(Transforms::default)
}

/// First transform present in `chain`, else `fallback`
pub(crate) fn resolve<'a, T>(chain: &[Option<&'a T>], fallback: &'a T) -> &'a T {
    chain.iter().find_map(|t| *t).unwrap_or(fallback)
}

/// Default raw-to-key conversion: `A Header!!  Name` becomes `a_header_name`
pub fn default_to_key(raw: &str) -> Key {
    let mut segments: Vec<&str> = NON_KEY_CHARS.split(raw).collect();
    drop_trailing_empty(&mut segments);
    Key(segments.join("_").to_lowercase())
}

/// Default key-to-raw conversion: `a_header_name` becomes `A-Header-Name`
pub fn default_to_raw(key: &Key) -> String {
    let mut segments: Vec<&str> = key.as_str().split('_').collect();
    drop_trailing_empty(&mut segments);
    segments
        .into_iter()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join("-")
}

fn drop_trailing_empty(segments: &mut Vec<&str>) {
    while segments.last().is_some_and(|s| s.is_empty()) {
        segments.pop();
    }
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
