use std::{
    path::{Path, PathBuf},
    pin::Pin,
};

use bytes::Bytes;
use chrono::Utc;
use futures_util::{stream::StreamExt, Stream};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{Client, StatusCode};
use tokio::{
    fs::{create_dir_all, remove_file, rename, File},
    io::AsyncWriteExt,
};
use tracing::{info, warn};

use crate::{
    error::{Error, Result},
    model::{DownloadResult, MediaKind},
};

pub type MediaStream = Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>;

pub struct MediaDownload {
    pub total_size: Option<u64>,
    pub stream: MediaStream,
}

pub async fn ensure_output_dir(dir: &Path) -> Result<()> {
    create_dir_all(dir).await?;
    Ok(())
}

/// `tiktok_<unix-seconds>.<ext>`; two saves of the same kind within one
/// second share a name and the later one wins.
pub fn destination_path(dir: &Path, kind: MediaKind, timestamp: i64) -> PathBuf {
    dir.join(format!("tiktok_{timestamp}.{}", kind.extension()))
}

fn partial_path(path: &Path, kind: MediaKind) -> PathBuf {
    path.with_extension(format!("{}.part", kind.extension()))
}

fn progress_bar(total_size: Option<u64>, show_progress: bool) -> Result<ProgressBar> {
    if !show_progress {
        return Ok(ProgressBar::hidden());
    }

    let pb = ProgressBar::new(total_size.unwrap_or(0));
    pb.set_style(
        ProgressStyle::with_template(
            "{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})"
        )?
        .progress_chars("#>-")
    );
    Ok(pb)
}

pub async fn stream_media(client: &Client, direct_url: &str, kind: MediaKind) -> Result<MediaDownload> {
    let response = client.get(direct_url).send().await?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(Error::MediaFetchBadStatus { kind, status });
    }

    Ok(MediaDownload {
        total_size: response.content_length(),
        stream: Box::pin(response.bytes_stream()),
    })
}

async fn write_stream(mut stream: MediaStream, path: &Path, pb: &ProgressBar) -> Result<u64> {
    let mut file = File::create(path).await?;
    let mut downloaded = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        downloaded += chunk.len() as u64;
        pb.set_position(downloaded);
        file.write_all(&chunk).await?;
    }
    file.flush().await?;

    Ok(downloaded)
}

async fn save(media: MediaDownload, path: &Path, part: &Path, pb: &ProgressBar) -> Result<u64> {
    let written = write_stream(media.stream, part, pb).await?;
    rename(part, path).await?;
    Ok(written)
}

pub async fn fetch_and_save(
    client: &Client,
    direct_url: &str,
    kind: MediaKind,
    output_dir: &Path,
    show_progress: bool,
) -> Result<DownloadResult> {
    ensure_output_dir(output_dir).await?;
    let path = destination_path(output_dir, kind, Utc::now().timestamp());

    info!(url = direct_url, %kind, "downloading media");
    let media = stream_media(client, direct_url, kind).await?;

    let pb = progress_bar(media.total_size, show_progress)?;
    pb.set_message(format!("Downloading {kind}..."));

    let part = partial_path(&path, kind);
    let written = match save(media, &path, &part, &pb).await {
        Ok(written) => written,
        Err(err) => {
            pb.abandon();
            if let Err(rm) = remove_file(&part).await {
                warn!(path = %part.display(), error = %rm, "could not remove partial file");
            }
            return Err(err);
        }
    };
    pb.finish_and_clear();

    info!(path = %path.display(), bytes = written, "{kind} saved");
    Ok(DownloadResult {
        file_path: path,
        kind,
    })
}
