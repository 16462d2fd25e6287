use std::{sync::LazyLock, time::Duration};

use regex::Regex;
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use crate::{
    error::{Error, Result},
    model::VideoId,
};

const PLATFORM_DOMAIN: &str = "tiktok.com";

static VIDEO_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/video/(\d+)").expect("video path pattern is valid"));

pub fn is_short_link(url: &Url, short_link_hosts: &[String]) -> bool {
    url.host_str().is_some_and(|host| {
        short_link_hosts
            .iter()
            .any(|short| short.eq_ignore_ascii_case(host))
    })
}

fn is_platform_host(url: &Url) -> bool {
    url.host_str().is_some_and(|host| {
        let host = host.to_ascii_lowercase();
        host == PLATFORM_DOMAIN || host.ends_with(&format!(".{PLATFORM_DOMAIN}"))
    })
}

/// Follows redirects for shortened links. Other links are returned untouched
/// without any network activity.
pub async fn expand(
    client: &Client,
    url: &Url,
    short_link_hosts: &[String],
    timeout: Duration,
) -> Result<Url> {
    if !is_short_link(url, short_link_hosts) {
        return Ok(url.clone());
    }

    debug!(%url, "following short link");
    let response = client
        .head(url.clone())
        .timeout(timeout)
        .send()
        .await
        .map_err(|source| Error::RedirectFailure {
            url: url.to_string(),
            source,
        })?;

    let resolved = response.url().clone();
    info!(%resolved, "short link resolved");
    Ok(resolved)
}

pub fn extract_video_id(url: &Url) -> Option<VideoId> {
    if let Some(caps) = VIDEO_PATH.captures(url.as_str()) {
        return Some(VideoId::new(&caps[1]));
    }

    if is_platform_host(url) {
        let segments: Vec<&str> = url.path().split('/').collect();
        let after_video = segments
            .windows(2)
            .find(|pair| pair[0] == "video" && !pair[1].is_empty())
            .map(|pair| pair[1]);
        if let Some(id) = after_video {
            return Some(VideoId::new(id));
        }
    }

    url.query_pairs()
        .find(|(key, value)| key == "item_id" && !value.is_empty())
        .map(|(_, value)| VideoId::new(value.into_owned()))
}

pub async fn resolve(
    client: &Client,
    url: &Url,
    short_link_hosts: &[String],
    timeout: Duration,
) -> Result<VideoId> {
    let url = expand(client, url, short_link_hosts, timeout).await?;
    extract_video_id(&url).ok_or_else(|| Error::ResolutionNotFound {
        url: url.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn id_of(url: &str) -> Option<String> {
        extract_video_id(&Url::parse(url).unwrap()).map(|id| id.as_str().to_string())
    }

    fn default_hosts() -> Vec<String> {
        crate::config::SHORT_LINK_HOSTS
            .iter()
            .map(|h| h.to_string())
            .collect()
    }

    #[test]
    fn digits_after_video_segment() {
        assert_eq!(
            id_of("https://www.tiktok.com/@scout2015/video/6718335390845095173?lang=en"),
            Some("6718335390845095173".into())
        );
    }

    #[test]
    fn digit_pattern_wins_regardless_of_host_and_query() {
        assert_eq!(
            id_of("https://example.com/share/video/42/extra?item_id=7"),
            Some("42".into())
        );
    }

    #[test]
    fn segment_scan_only_on_platform_hosts() {
        assert_eq!(id_of("https://www.tiktok.com/@user/video/abc"), Some("abc".into()));
        assert_eq!(id_of("https://example.com/@user/video/abc"), None);
    }

    #[test]
    fn item_id_query_parameter() {
        assert_eq!(
            id_of("https://m.tiktok.com/v/share?x=1&item_id=7234&item_id=9"),
            Some("7234".into())
        );
        assert_eq!(id_of("https://m.tiktok.com/v/share?item_id="), None);
    }

    #[test]
    fn nothing_to_extract() {
        assert_eq!(id_of("https://www.tiktok.com/@user"), None);
    }

    #[test]
    fn short_link_detection() {
        let hosts = default_hosts();
        assert!(is_short_link(&Url::parse("https://vm.tiktok.com/ZMabc/").unwrap(), &hosts));
        assert!(is_short_link(&Url::parse("https://VT.tiktok.com/ZSxyz/").unwrap(), &hosts));
        assert!(!is_short_link(
            &Url::parse("https://www.tiktok.com/@u/video/1").unwrap(),
            &hosts
        ));
    }

    #[tokio::test]
    async fn full_links_are_not_requested() {
        let client = Client::new();
        let url = Url::parse("https://www.tiktok.com/@u/video/1").unwrap();
        let expanded = expand(&client, &url, &default_hosts(), TIMEOUT).await.unwrap();
        assert_eq!(expanded, url);
    }

    #[tokio::test]
    async fn short_link_is_expanded_before_extraction() {
        let mut server = mockito::Server::new_async().await;
        let redirect = server
            .mock("HEAD", "/ZMabc/")
            .with_status(301)
            .with_header("location", "/@user/video/7312345")
            .expect(1)
            .create_async()
            .await;
        let target = server
            .mock("HEAD", "/@user/video/7312345")
            .with_status(200)
            .create_async()
            .await;

        let client = Client::new();
        let url = Url::parse(&format!("{}/ZMabc/", server.url())).unwrap();
        let hosts = vec!["127.0.0.1".to_string()];

        let id = resolve(&client, &url, &hosts, TIMEOUT).await.unwrap();
        assert_eq!(id.as_str(), "7312345");
        redirect.assert_async().await;
        target.assert_async().await;
    }

    #[tokio::test]
    async fn redirect_failure_yields_no_id() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let client = Client::new();
        let url = Url::parse(&format!("http://127.0.0.1:{port}/video/123")).unwrap();
        let hosts = vec!["127.0.0.1".to_string()];

        let err = resolve(&client, &url, &hosts, TIMEOUT).await.unwrap_err();
        assert!(matches!(err, Error::RedirectFailure { .. }));
    }

    #[tokio::test]
    async fn unresolvable_link_reports_not_found() {
        let client = Client::new();
        let url = Url::parse("https://www.tiktok.com/@user").unwrap();
        let err = resolve(&client, &url, &default_hosts(), TIMEOUT).await.unwrap_err();
        assert!(matches!(err, Error::ResolutionNotFound { .. }));
    }
}
