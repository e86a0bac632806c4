mod download;
mod info;
mod config;
mod batch;
mod interactive;

pub use download::download_command;
pub use info::info_command;
pub use config::config_command;
pub use batch::{batch_download_command, read_url_file};
pub use interactive::{interactive_command, prompt_options, SessionSummary};

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::options::{DownloadOptions, MediaFormat, Quality, TrimRange};
use crate::Config;

#[derive(Parser, Debug)]
#[command(name = "media-dl")]
#[command(version)]
#[command(about = "Media downloader (using yt-dlp)")]
pub struct Cli {
    /// Log debug output (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by single and batch downloads.
#[derive(Args, Debug, Clone, Default)]
pub struct MediaArgs {
    /// Output format [default: from config, mp4]
    #[arg(short, long, value_enum)]
    pub format: Option<MediaFormat>,

    /// Quality tier [default: from config, high]
    #[arg(short, long, value_enum)]
    pub quality: Option<Quality>,

    /// Output directory [default: from config, else current directory]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Download the whole playlist instead of a single item
    #[arg(long)]
    pub playlist: bool,

    /// Download subtitles (if available)
    #[arg(long)]
    pub subtitles: bool,

    /// Subtitle languages, comma separated [default: from config, en]
    #[arg(long, value_name = "LANGS")]
    pub sub_langs: Option<String>,

    /// Do not open the destination folder afterwards
    #[arg(long)]
    pub no_open: bool,
}

impl MediaArgs {
    /// Fills unset options from the configuration.
    pub fn to_options(&self, url: &str, config: &Config) -> DownloadOptions {
        DownloadOptions {
            url: url.trim().to_string(),
            format: self.format.unwrap_or(config.default_format),
            quality: self.quality.unwrap_or(config.default_quality),
            output_dir: self.output.clone(),
            filename: config.filename_template.clone(),
            playlist: self.playlist,
            subtitles: self.subtitles,
            subtitle_langs: self
                .sub_langs
                .clone()
                .unwrap_or_else(|| config.subtitle_langs.clone()),
            trim: None,
            open_folder: config.open_folder && !self.no_open,
        }
    }
}

fn parse_trim(value: &str) -> Result<TrimRange, String> {
    value.parse().map_err(|e: crate::Error| e.to_string())
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download a single URL
    Download {
        /// Media URL
        url: String,

        #[command(flatten)]
        media: MediaArgs,

        /// Output filename template (yt-dlp syntax)
        #[arg(short = 'n', long, value_name = "TEMPLATE")]
        filename: Option<String>,

        /// Only download this section, e.g. 00:10-01:30
        #[arg(long, value_name = "START-END", value_parser = parse_trim)]
        trim: Option<TrimRange>,
    },
    /// Download every URL from a file and/or the command line, one after another
    Batch {
        /// File with URLs, one per line
        #[arg(short = 'F', long)]
        file: Option<PathBuf>,

        /// Additional URLs
        #[arg(short, long)]
        url: Vec<String>,

        #[command(flatten)]
        media: MediaArgs,
    },
    /// Show title and available formats without downloading
    Info {
        /// Media URL
        url: String,
    },
    /// Prompt for all options
    #[command(visible_alias = "i")]
    Interactive,
    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    Set {
        #[arg(short, long)]
        key: String,
        #[arg(long)]
        value: String,
    },
    Get {
        #[arg(short, long)]
        key: Option<String>,
    },
    Reset,
    /// Print the config file location
    Path,
}
