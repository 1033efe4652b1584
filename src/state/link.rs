use crate::LinkstatError;
use serde::{Deserialize, Serialize};

/// A single URL of a task and whether it was reachable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub url: String,
    pub available: bool,
}

impl LinkRecord {
    /// Creates a not-yet-probed record
    ///
    /// Empty or whitespace-only URLs are rejected, so every record that reaches
    /// the engine carries something to probe.
    pub fn new(url: impl Into<String>) -> Result<Self, LinkstatError> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(LinkstatError::Validation(
                "link URL cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            url,
            available: false,
        })
    }

    /// Builds records for a batch of URLs, failing on the first empty one
    pub fn from_urls<I, S>(urls: I) -> Result<Vec<Self>, LinkstatError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        urls.into_iter().map(Self::new).collect()
    }

    /// Human-readable availability label used in reports
    pub fn status_label(&self) -> &'static str {
        if self.available {
            "Available"
        } else {
            "Not Available"
        }
    }
}
