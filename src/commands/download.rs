use console::style;

use super::MediaArgs;
use crate::options::TrimRange;
use crate::tool::template::sanitize_template;
use crate::{Downloader, Result};

/// Handles the download command execution
pub async fn download_command(
    downloader: &Downloader,
    url: String,
    media: MediaArgs,
    filename: Option<String>,
    trim: Option<TrimRange>,
) -> Result<()> {
    let mut options = media.to_options(&url, downloader.config());
    if let Some(filename) = filename {
        options.filename = sanitize_template(&filename)?;
    }
    options.trim = trim;

    let title = downloader.lookup_title(&options.url, options.playlist).await?;
    println!("{}", style(format!("Title: {}", title)).green());

    downloader.download(&options).await?;
    Ok(())
}
