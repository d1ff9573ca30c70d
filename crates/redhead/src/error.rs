//! Error types for redhead

/// Result type for redhead operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in redhead operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Malformed header line (no `:` separator): {line:?}")]
    MalformedHeaderLine { line: String },

    #[error("Default transforms have already been installed")]
    DefaultsAlreadyInstalled,

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl Error {
    pub fn malformed(line: impl Into<String>) -> Self {
        Self::MalformedHeaderLine { line: line.into() }
    }
}
