use std::{io::IsTerminal, path::PathBuf, process::ExitCode, time::Duration};

use clap::{error::ErrorKind, Parser};
use rustytok::{
    config::{
        DEFAULT_API_ENDPOINT, DEFAULT_API_HOST, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_OUTPUT_DIR,
        DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
    },
    ApiCredentials, Config, DownloadRequest, Error, ErrorReport, Result, TikTokDownloader,
};
use tracing::{debug, error};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Download a TikTok video, or only its audio track, into a local folder.
#[derive(Parser, Debug)]
#[command(name = "rustytok", version, about, long_about = None)]
struct Cli {
    /// Link to the video (full or shortened)
    url: Option<String>,

    /// What to save: `video` or `audio`
    kind: Option<String>,

    /// Upstream API key
    #[arg(long, env = "RAPIDAPI_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Upstream API host header
    #[arg(long, env = "RAPIDAPI_HOST", default_value = DEFAULT_API_HOST)]
    api_host: String,

    /// Upstream API endpoint
    #[arg(long, env = "RUSTYTOK_ENDPOINT", default_value = DEFAULT_API_ENDPOINT)]
    endpoint: String,

    /// Folder the media is saved into
    #[arg(long, env = "RUSTYTOK_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Idle read timeout in seconds, also the deadline for API calls
    #[arg(long, env = "RUSTYTOK_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Connect timeout in seconds
    #[arg(long, default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS)]
    connect_timeout: u64,

    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Fail when no video id can be extracted from the link
    #[arg(long)]
    strict: bool,

    /// Hide the download progress bar
    #[arg(long)]
    no_progress: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit log records as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_ansi(std::io::stderr().is_terminal()),
            )
            .init();
    }
}

fn request_from(cli: &Cli) -> Result<DownloadRequest> {
    let url = cli
        .url
        .as_deref()
        .ok_or_else(|| Error::invalid_arguments("missing URL argument"))?;
    DownloadRequest::parse(url, cli.kind.as_deref())
}

fn config_from(cli: &Cli) -> Result<Config> {
    let api_key = cli
        .api_key
        .clone()
        .filter(|key| !key.is_empty())
        .ok_or_else(|| Error::invalid_arguments("missing API key (set RAPIDAPI_KEY)"))?;

    let mut config = Config::new(ApiCredentials::new(api_key, cli.api_host.clone()));
    config.endpoint = cli.endpoint.clone();
    config.output_dir = std::env::current_dir()?.join(&cli.output_dir);
    config.timeout = Duration::from_secs(cli.timeout);
    config.connect_timeout = Duration::from_secs(cli.connect_timeout);
    config.user_agent = cli.user_agent.clone();
    config.strict_resolution = cli.strict;
    config.show_progress = !cli.no_progress;
    Ok(config)
}

async fn run(cli: &Cli) -> Result<()> {
    let request = request_from(cli)?;
    let config = config_from(cli)?;
    debug!(?config, "configuration loaded");

    let downloader = TikTokDownloader::new(config)?;
    let result = downloader.download(&request).await?;

    println!("{}", serde_json::to_string(&result).map_err(std::io::Error::from)?);
    Ok(())
}

fn report(err: &Error) -> ExitCode {
    error!(error = %err, "download failed");
    let line = serde_json::to_string(&ErrorReport::from(err))
        .unwrap_or_else(|_| String::from(r#"{"error":"unknown error"}"#));
    eprintln!("{line}");
    ExitCode::FAILURE
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let rendered = e.render().to_string();
            let message = rendered
                .lines()
                .next()
                .unwrap_or_default()
                .trim_start_matches("error: ");
            return report(&Error::invalid_arguments(message));
        }
    };
    init_telemetry(&cli);

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}
