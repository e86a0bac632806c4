use console::style;

use crate::tool::format_duration;
use crate::{Downloader, Result};

/// Handles the info command execution
pub async fn info_command(downloader: &Downloader, url: String) -> Result<()> {
    println!("Fetching media information...");
    let info = downloader.get_info(url.trim()).await?;

    println!("\n{}", style(format!("Title: {}", info.title())).green());
    if let Some(uploader) = &info.uploader {
        println!("Uploader: {}", uploader);
    }
    if let Some(duration) = info.duration {
        println!("Duration: {}", format_duration(duration));
    }
    if let Some(extractor) = &info.extractor_key {
        println!("Site: {}", extractor);
    }
    if let Some(count) = info.entry_count() {
        println!("Playlist: {} entries (use --playlist to download all)", count);
    }

    let languages = info.subtitle_languages();
    if !languages.is_empty() {
        println!("Subtitles: {}", languages.join(", "));
    }

    let heights = info.mp4_heights();
    if !heights.is_empty() {
        let tiers: Vec<String> = heights.iter().map(|h| format!("{}p", h)).collect();
        println!("MP4 video: {}", tiers.join(", "));
    }
    if info.has_audio_only_stream() {
        println!("Audio-only stream available (MP3 extraction is fast)");
    }

    println!("\nTo download:");
    println!("  media-dl download {} [-f mp4|mp3] [-q high|medium|low]", url.trim());

    Ok(())
}
