use std::{path::PathBuf, time::Duration};

use secrecy::Secret;

pub const DEFAULT_API_ENDPOINT: &str =
    "https://tiktok-downloader-download-tiktok-videos-without-watermark.p.rapidapi.com/index";
pub const DEFAULT_API_HOST: &str =
    "tiktok-downloader-download-tiktok-videos-without-watermark.p.rapidapi.com";
pub const DEFAULT_OUTPUT_DIR: &str = "downloads";
pub const DEFAULT_USER_AGENT: &str = concat!("rustytok/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Hosts serving shortened links that redirect to the full video page.
pub const SHORT_LINK_HOSTS: &[&str] = &["vm.tiktok.com", "vt.tiktok.com"];

/// Static credentials for the upstream aggregation API.
#[derive(Debug)]
pub struct ApiCredentials {
    pub key: Secret<String>,
    pub host: String,
}

impl ApiCredentials {
    pub fn new(key: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            key: Secret::new(key.into()),
            host: host.into(),
        }
    }
}

#[derive(Debug)]
pub struct Config {
    pub endpoint: String,
    pub credentials: ApiCredentials,
    pub output_dir: PathBuf,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
    pub short_link_hosts: Vec<String>,
    /// Abort the download when no video id can be extracted from the link.
    pub strict_resolution: bool,
    pub show_progress: bool,
}

impl Config {
    pub fn new(credentials: ApiCredentials) -> Self {
        Self {
            endpoint: DEFAULT_API_ENDPOINT.to_string(),
            credentials,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            short_link_hosts: SHORT_LINK_HOSTS.iter().map(|h| h.to_string()).collect(),
            strict_resolution: false,
            show_progress: true,
        }
    }
}
