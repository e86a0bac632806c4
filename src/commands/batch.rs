use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use console::style;

use super::MediaArgs;
use crate::utils::open_folder::open_folder;
use crate::{Downloader, Error, ErrorExt, Result};

/// Reads URLs from a file, one per line. Blank lines and `#` comments are skipped.
pub fn read_url_file(path: &Path) -> Result<Vec<String>> {
    let context = || format!("Failed to read URL file {}", path.display());

    let file = File::open(path).map_err(|e| Error::from(e).context(context()))?;
    let mut urls = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| Error::from(e).context(context()))?;
        let trimmed = line.trim();
        if !trimmed.is_empty() && !trimmed.starts_with('#') {
            urls.push(trimmed.to_string());
        }
    }
    Ok(urls)
}

/// Handles batch download command execution
pub async fn batch_download_command(
    downloader: &Downloader,
    urls: Vec<String>,
    file_path: Option<PathBuf>,
    media: MediaArgs,
) -> Result<()> {
    let mut all_urls = urls;
    if let Some(path) = file_path {
        all_urls.extend(read_url_file(&path)?);
    }

    if all_urls.is_empty() {
        return Err(Error::InvalidArgument("No URLs provided for download".into()));
    }

    let total = all_urls.len();
    println!("Starting batch download of {} items", total);

    let mut success_count = 0;
    let mut failure_count = 0;
    let mut last_dir = None;

    for (i, url) in all_urls.iter().enumerate() {
        println!("\n[{}/{}] {}", i + 1, total, url);

        let title = match downloader.lookup_title(url, media.playlist).await {
            Ok(title) => title,
            Err(e) => {
                println!("{}", style(format!("✗ Skipped: {}", e)).red());
                failure_count += 1;
                continue;
            }
        };
        println!("{}", style(format!("Title: {}", title)).green());

        let mut options = media.to_options(url, downloader.config());
        // the folder is opened once, after the last item
        options.open_folder = false;

        match downloader.download(&options).await {
            Ok(dir) => {
                success_count += 1;
                last_dir = Some(dir);
            }
            Err(_) => failure_count += 1,
        }
    }

    println!(
        "\nBatch download complete: {} successful, {} failed",
        success_count, failure_count
    );

    if let Some(dir) = last_dir.filter(|_| downloader.config().open_folder && !media.no_open) {
        if let Err(e) = open_folder(&dir) {
            log::warn!("could not open {}: {}", dir.display(), e);
        }
    }

    if failure_count > 0 {
        return Err(Error::BatchFailed {
            failed: failure_count,
            total,
        });
    }
    Ok(())
}
