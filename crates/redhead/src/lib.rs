//! Header blocks for plain text documents
//!
//! Parses a leading block of `Name: value` lines off the front of a text,
//! keeps the headers as an ordered, editable collection next to the body,
//! and writes them back out. Header names map to normalized keys and back
//! through configurable transforms.

pub mod config;
pub mod document;
pub mod error;
pub mod header;
pub mod header_set;
pub mod transform;

pub use config::{Config, KeyStyle, RawStyle};
pub use document::{Document, HeaderPatch, has_header_block};
pub use error::{Error, Result};
pub use header::{Header, SEPARATOR};
pub use header_set::HeaderCollection;
pub use transform::{Key, ToKey, ToRaw, Transforms, defaults, install_defaults};
