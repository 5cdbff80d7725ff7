use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

mod config;
mod error;
mod http;
mod models;
#[cfg(test)]
mod testing;
mod tiktok;
mod utils;

use config::{Config, FetchStrategy};
use tiktok::{DownloadOptions, DownloadReport, TikTokScraper};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the config file
    #[arg(short, long)]
    config: Option<String>,

    /// Netscape-format cookie file sent with page requests
    #[arg(long)]
    cookies: Option<PathBuf>,

    /// How page state is fetched
    #[arg(long, value_enum)]
    strategy: Option<FetchStrategy>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Metadata of a single video
    Video { link: String },
    /// Profile of an account
    User { username: String },
    /// Every video posted by an account
    Videos { username: String },
    /// Music track used by a video
    Music { link: String },
    /// Videos listed on a hashtag page
    Hashtag { tag: String },
    /// Download every video posted by an account
    Download {
        username: String,
        /// Target directory, replaced if it exists
        #[arg(long)]
        path: Option<PathBuf>,
        /// Download the watermark-free files
        #[arg(long)]
        no_watermark: bool,
    },
    /// Resolve the watermark-free media URL of a video
    Nowatermark { link: String },
}

fn get_config_path(args: &Args) -> Option<String> {
    if let Some(path) = &args.config {
        return Some(path.clone());
    }

    if let Ok(path) = std::env::var("CONFIG_FILE") {
        return Some(path);
    }

    if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
        let config_path = format!("{}/tokscrape/config.toml", xdg_config_home);
        if std::path::Path::new(&config_path).exists() {
            return Some(config_path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        let config_path = format!("{}/.config/tokscrape/config.toml", home.display());
        if std::path::Path::new(&config_path).exists() {
            return Some(config_path);
        }
    }

    None
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match get_config_path(args) {
        Some(path) => Config::from_file(&path)
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => Config::default(),
    };

    if let Some(cookies) = &args.cookies {
        config.http.cookie_file = Some(cookies.clone());
    }
    if let Some(strategy) = args.strategy {
        config.strategy = strategy;
    }

    Ok(config)
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    if config.get_logging_format() == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}

async fn download(
    scraper: &TikTokScraper,
    username: &str,
    options: &DownloadOptions,
) -> Result<DownloadReport> {
    scraper
        .download_all_videos_from_user(username, options)
        .await
        .with_context(|| format!("Failed to download videos of {}", username))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;
    init_logging(&config);

    info!("Starting tokscrape...");
    let scraper = TikTokScraper::new(&config).context("Failed to initialize scraper")?;

    match &args.command {
        Command::Video { link } => match scraper.video(link).await? {
            Some(video) => print_json(&video, args.pretty)?,
            None => info!("No video found at {}", link),
        },
        Command::User { username } => print_json(&scraper.user(username).await?, args.pretty)?,
        Command::Videos { username } => {
            print_json(&scraper.all_videos_from_user(username).await?, args.pretty)?
        }
        Command::Music { link } => print_json(&scraper.music(link).await?, args.pretty)?,
        Command::Hashtag { tag } => print_json(&scraper.hashtag(tag).await?, args.pretty)?,
        Command::Download {
            username,
            path,
            no_watermark,
        } => {
            let options = DownloadOptions {
                path: path.clone(),
                no_watermark: *no_watermark,
            };
            let report = download(&scraper, username, &options).await?;
            print_json(&report, args.pretty)?
        }
        Command::Nowatermark { link } => {
            println!("{}", scraper.no_watermark(link).await?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_download_args() {
        let args = Args::parse_from([
            "tokscrape",
            "--strategy",
            "rendered",
            "download",
            "jane",
            "--path",
            "/tmp/jane",
            "--no-watermark",
        ]);

        assert_eq!(args.strategy, Some(FetchStrategy::Rendered));
        match args.command {
            Command::Download {
                username,
                path,
                no_watermark,
            } => {
                assert_eq!(username, "jane");
                assert_eq!(path, Some(PathBuf::from("/tmp/jane")));
                assert!(no_watermark);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_overrides_config() {
        let args = Args::parse_from([
            "tokscrape",
            "--config",
            "/definitely/missing.toml",
            "user",
            "jane",
        ]);
        assert!(load_config(&args).is_err());

        let args = Args::parse_from([
            "tokscrape",
            "--cookies",
            "/tmp/cookies.txt",
            "--strategy",
            "direct",
            "hashtag",
            "cats",
        ]);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"strategy = \"rendered\"\n").unwrap();
        let mut args = args;
        args.config = Some(file.path().display().to_string());

        let config = load_config(&args).unwrap();
        assert_eq!(config.strategy, FetchStrategy::Direct);
        assert_eq!(
            config.http.cookie_file,
            Some(PathBuf::from("/tmp/cookies.txt"))
        );
    }
}
