use std::{fmt, path::PathBuf, str::FromStr};

use serde::Serialize;
use url::Url;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Video,
    Audio,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Video => "mp4",
            Self::Audio => "mp3",
        }
    }

    /// Field of the upstream response that lists direct URLs for this kind.
    pub fn api_field(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "music",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "video" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            other => Err(Error::invalid_arguments(format!(
                "unknown media kind `{other}`, expected `video` or `audio`"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub source_url: Url,
    pub kind: MediaKind,
}

impl DownloadRequest {
    pub fn new(source_url: Url, kind: MediaKind) -> Self {
        Self { source_url, kind }
    }

    /// Validates raw command-line input. Performs no network activity.
    pub fn parse(url: &str, kind: Option<&str>) -> Result<Self> {
        if !url.starts_with("http") {
            return Err(Error::invalid_arguments(format!("invalid URL: {url}")));
        }
        let source_url = Url::parse(url)
            .map_err(|e| Error::invalid_arguments(format!("invalid URL {url}: {e}")))?;
        if !matches!(source_url.scheme(), "http" | "https") {
            return Err(Error::invalid_arguments(format!("invalid URL: {url}")));
        }
        let kind = kind
            .map(str::parse::<MediaKind>)
            .transpose()?
            .unwrap_or_default();

        Ok(Self::new(source_url, kind))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoId(String);

impl VideoId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The single line reported on stdout after a successful save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResult {
    pub file_path: PathBuf,
    #[serde(rename = "type")]
    pub kind: MediaKind,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub error: String,
}

impl From<&Error> for ErrorReport {
    fn from(err: &Error) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}
