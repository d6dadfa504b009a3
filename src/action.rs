use serde::Serialize;

use crate::error::OpenError;

/// The host's "open URL" capability.
pub trait UrlOpener {
    fn open_url(&self, url: &str) -> Result<(), OpenError>;
}

/// Interaction bound to a render node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    OpenUrl { url: String },
}

impl Action {
    /// Run the action against the host capabilities.
    pub fn dispatch(&self, opener: &dyn UrlOpener) -> Result<(), OpenError> {
        match self {
            Action::OpenUrl { url } => {
                tracing::debug!(%url, "opening link");
                opener.open_url(url)
            }
        }
    }
}
