use std::time::Duration;

use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::{debug, error, info};
use url::Url;

use crate::{
    config::ApiCredentials,
    error::{Error, Result},
    model::MediaKind,
};

const SNIPPET_CHARS: usize = 500;

/// Untrusted upstream payload; every field is optional and loosely typed.
#[derive(Debug, Clone, Default)]
pub struct ApiResponse {
    video: Option<Value>,
    music: Option<Value>,
}

impl ApiResponse {
    pub fn from_value(value: &Value) -> Self {
        Self {
            video: value.get("video").cloned(),
            music: value.get("music").cloned(),
        }
    }

    pub fn direct_url(&self, kind: MediaKind) -> Option<&str> {
        let field = match kind {
            MediaKind::Video => self.video.as_ref(),
            MediaKind::Audio => self.music.as_ref(),
        };
        field?
            .as_array()?
            .first()?
            .as_str()
            .filter(|url| !url.is_empty())
    }
}

fn snippet(body: &str) -> String {
    body.chars().take(SNIPPET_CHARS).collect()
}

pub async fn locate(
    client: &Client,
    endpoint: &str,
    credentials: &ApiCredentials,
    source: &Url,
    kind: MediaKind,
    timeout: Duration,
) -> Result<String> {
    info!(%source, %kind, "requesting direct media URL");

    let response = client
        .get(endpoint)
        .query(&[("url", source.as_str())])
        .header("x-rapidapi-key", credentials.key.expose_secret())
        .header("x-rapidapi-host", &credentials.host)
        .timeout(timeout)
        .send()
        .await?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(Error::UpstreamBadStatus { status });
    }

    let body = response.text().await?;
    let json: Value = serde_json::from_str(&body).map_err(|source| {
        let snippet = snippet(&body);
        error!(raw = %snippet, "upstream response is not JSON");
        Error::UpstreamInvalidJson { snippet, source }
    })?;
    debug!("upstream response received");

    let direct = ApiResponse::from_value(&json)
        .direct_url(kind)
        .ok_or(Error::UpstreamFieldMissing { kind })?
        .to_string();
    info!(field = kind.api_field(), url = %direct, "direct URL found");

    Ok(direct)
}
