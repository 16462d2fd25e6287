use reqwest::StatusCode;

use crate::model::MediaKind;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("failed to follow redirect for {url}: {source}")]
    RedirectFailure {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("video id not found in {url}")]
    ResolutionNotFound { url: String },
    #[error("upstream API request failed with status {status}")]
    UpstreamBadStatus { status: StatusCode },
    #[error("upstream API returned invalid JSON: {source}")]
    UpstreamInvalidJson {
        /// Leading part of the raw body, kept for diagnostics.
        snippet: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{kind} URL not found in upstream API response")]
    UpstreamFieldMissing { kind: MediaKind },
    #[error("{kind} download failed with status {status}")]
    MediaFetchBadStatus { kind: MediaKind, status: StatusCode },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    ProgressTemplate(#[from] indicatif::style::TemplateError),
}

impl Error {
    #[must_use]
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::InvalidArguments(message.into())
    }

    #[must_use]
    pub fn is_invalid_arguments(&self) -> bool {
        matches!(self, Self::InvalidArguments(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
