mod error;
pub mod config;
pub mod options;
pub mod tool;
pub mod downloader;
pub mod commands;
pub mod utils;

pub use config::Config;
pub use error::{Error, ErrorExt, Result};
pub use options::{DownloadOptions, MediaFormat, Quality, TrimRange};
pub use tool::{MediaInfo, MediaTool, YtDlp};
pub use downloader::Downloader;
