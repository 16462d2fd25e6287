pub mod config;
pub mod error;
pub mod fetcher;
pub mod locator;
pub mod model;
pub mod resolver;

use std::time::Instant;

use reqwest::Client;
use tracing::{info, warn};
use url::Url;

pub use crate::{
    config::{ApiCredentials, Config},
    error::{Error, Result},
    fetcher::{MediaDownload, MediaStream},
    locator::ApiResponse,
    model::{DownloadRequest, DownloadResult, ErrorReport, MediaKind, VideoId},
};

pub struct TikTokDownloader {
    client: Client,
    config: Config,
}

impl TikTokDownloader {
    pub fn new(config: Config) -> Result<Self> {
        // `timeout` bounds idle reads here; resolver and locator calls also
        // apply it as a whole-request deadline.
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Follows redirects when `url` is a shortened link.
    pub async fn expand(&self, url: &Url) -> Result<Url> {
        resolver::expand(
            &self.client,
            url,
            &self.config.short_link_hosts,
            self.config.timeout,
        )
        .await
    }

    pub async fn resolve(&self, url: &Url) -> Result<VideoId> {
        resolver::resolve(
            &self.client,
            url,
            &self.config.short_link_hosts,
            self.config.timeout,
        )
        .await
    }

    pub async fn locate(&self, url: &Url, kind: MediaKind) -> Result<String> {
        locator::locate(
            &self.client,
            &self.config.endpoint,
            &self.config.credentials,
            url,
            kind,
            self.config.timeout,
        )
        .await
    }

    pub async fn stream_media(&self, direct_url: &str, kind: MediaKind) -> Result<MediaDownload> {
        fetcher::stream_media(&self.client, direct_url, kind).await
    }

    pub async fn fetch_and_save(&self, direct_url: &str, kind: MediaKind) -> Result<DownloadResult> {
        fetcher::fetch_and_save(
            &self.client,
            direct_url,
            kind,
            &self.config.output_dir,
            self.config.show_progress,
        )
        .await
    }

    /// Runs the whole pipeline: expand the link, locate the direct URL for
    /// `request.kind`, then save it. The expanded link, not the video id, is
    /// what the upstream API receives.
    pub async fn download(&self, request: &DownloadRequest) -> Result<DownloadResult> {
        let start_time = Instant::now();
        info!(url = %request.source_url, kind = %request.kind, "starting download");

        let url = self.expand(&request.source_url).await?;
        match resolver::extract_video_id(&url) {
            Some(id) => info!(video_id = %id, "video id resolved"),
            None if self.config.strict_resolution => {
                return Err(Error::ResolutionNotFound {
                    url: url.to_string(),
                })
            }
            None => warn!(%url, "video id not found in link, continuing"),
        }

        let direct_url = self.locate(&url, request.kind).await?;
        let result = self.fetch_and_save(&direct_url, request.kind).await?;

        info!(total = ?start_time.elapsed(), "download complete");
        Ok(result)
    }
}
