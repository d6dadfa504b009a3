use std::path::PathBuf;

use thiserror::Error;

/// A token tree that cannot be turned into a render tree.
///
/// Any build error fails the whole document; the caller shows the fallback
/// node instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("{kind} token is missing `{field}`")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown style slot `{0}`")]
    UnknownSlot(String),
}

/// Failure reported by the host's "open URL" capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpenError {
    #[error("no handler for {0}")]
    Unsupported(String),

    #[error("failed to open {url}: {reason}")]
    Failed { url: String, reason: String },
}
