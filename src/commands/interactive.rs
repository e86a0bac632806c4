use std::io::{BufRead, Write};
use std::path::PathBuf;

use console::style;

use crate::options::{DownloadOptions, MediaFormat, Quality, TrimRange};
use crate::utils::input::Prompter;
use crate::{Downloader, Result};

/// Prompts for every option of one download.
///
/// Returns `Ok(None)` when the user leaves the URL empty.
pub async fn prompt_options<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    downloader: &Downloader,
) -> Result<Option<DownloadOptions>> {
    let config = downloader.config();

    let url = prompter.ask("Enter URL:")?;
    if url.is_empty() {
        prompter.say(style("No URL provided. Exiting.").red())?;
        return Ok(None);
    }

    let title = downloader.lookup_title(&url, false).await?;
    prompter.say(style(format!("Title: {}", title)).green())?;

    let mut options = DownloadOptions::new(url);
    options.subtitle_langs = config.subtitle_langs.clone();
    options.open_folder = config.open_folder;

    options.playlist = prompter.confirm("Download playlist (if applicable)?")?;

    options.format = match prompter.choose("Select format:", &["Video (MP4)", "Audio (MP3)"])? {
        Some(2) => MediaFormat::Mp3,
        _ => MediaFormat::Mp4,
    };

    options.quality = match prompter.choose("Select quality:", &["High", "Medium", "Low"])? {
        Some(1) => Quality::High,
        Some(2) => Quality::Medium,
        _ => Quality::Low,
    };

    options.subtitles = prompter.confirm("Download subtitles (if available)?")?;

    if prompter.confirm("Trim media?")? {
        options.trim = prompt_trim(prompter)?;
    }

    let default_dir = downloader.resolve_output_dir(&options)?;
    prompter.say(style("\nSpecify download location:").cyan())?;
    prompter.say(format!("Default: {}", default_dir.display()))?;
    let path = prompter.ask("Custom path (or Enter for default):")?;
    options.output_dir = Some(if path.is_empty() {
        default_dir
    } else {
        PathBuf::from(path)
    });

    options.filename = prompter.ask_with_default(
        &format!(
            "Custom filename (or Enter for default '{}'):",
            config.filename_template
        ),
        &config.filename_template,
    )?;

    Ok(Some(options))
}

/// Asks for start and end until they form a valid range.
/// An empty start skips trimming.
fn prompt_trim<R: BufRead, W: Write>(prompter: &mut Prompter<R, W>) -> Result<Option<TrimRange>> {
    loop {
        let start = prompter.ask("Start time (e.g., 00:10):")?;
        if start.is_empty() {
            return Ok(None);
        }
        let end = prompter.ask("End time (e.g., 01:30):")?;
        match TrimRange::new(&start, &end) {
            Ok(trim) => return Ok(Some(trim)),
            Err(e) => prompter.say(style(e).red())?,
        }
    }
}

/// Counts of an interactive session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub rounds: usize,
    pub failed: usize,
}

/// Runs interactive rounds until the user declines another download.
pub async fn interactive_command<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    downloader: &Downloader,
) -> Result<SessionSummary> {
    prompter.say(style("=== Interactive Media Downloader ===").cyan())?;
    let mut summary = SessionSummary::default();

    loop {
        let outcome = match prompt_options(prompter, downloader).await {
            Ok(None) => return Ok(summary),
            Ok(Some(options)) => {
                prompter.say(style("\nStarting download...").cyan())?;
                downloader.download(&options).await.map(|_| ())
            }
            Err(e) => Err(e),
        };

        summary.rounds += 1;
        match outcome {
            Ok(()) => prompter.say(style("Download complete!").green())?,
            Err(e) => {
                summary.failed += 1;
                log::debug!("interactive round failed: {}", e);
                prompter.say(style(format!("Download failed: {}", e)).red())?;
            }
        }

        if !prompter.confirm("Download another?")? {
            return Ok(summary);
        }
    }
}
