//! Transform configuration
//!
//! Hosts pick their transforms in TOML, e.g.
//!
//! ```toml
//! key_style = "snake"
//! raw_style = "verbatim"
//! ```
//!
//! and hand [`Config::transforms`] to
//! [`install_defaults`](crate::transform::install_defaults) or to a
//! collection.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::transform::{ToKey, ToRaw, Transforms};

/// How raw header names become keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStyle {
    /// `A Header!!  Name` -> `a_header_name`
    #[default]
    Snake,
    /// Raw name used as the key unchanged
    Verbatim,
}

/// How keys become raw header names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawStyle {
    /// `a_header_name` -> `A-Header-Name`
    #[default]
    Train,
    /// Key used as the raw name unchanged
    Verbatim,
}

/// Transform selection, every field optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub key_style: KeyStyle,
    pub raw_style: RawStyle,
}

impl Config {
    /// Parse a TOML configuration
    pub fn from_toml(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn transforms(&self) -> Transforms {
        let to_key = match self.key_style {
            KeyStyle::Snake => ToKey::snake(),
            KeyStyle::Verbatim => ToKey::verbatim(),
        };
        let to_raw = match self.raw_style {
            RawStyle::Train => ToRaw::train(),
            RawStyle::Verbatim => ToRaw::verbatim(),
        };
        Transforms::new(to_key, to_raw)
    }
}
