//! Argument lists for yt-dlp invocations.

use std::path::Path;

use super::template::file_name_start;
use crate::options::{DownloadOptions, MediaFormat, Quality};

/// Prefix added to the output template when a whole playlist is fetched,
/// so files keep their playlist order.
pub const PLAYLIST_PREFIX: &str = "%(playlist_index)s - ";

/// Format-selection expression for an mp4 download at the given tier.
pub fn video_format_selector(quality: Quality) -> &'static str {
    match quality {
        Quality::High => "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best",
        Quality::Medium => {
            "bestvideo[height<=720][ext=mp4]+bestaudio[ext=m4a]/best[height<=720][ext=mp4]/best"
        }
        Quality::Low => {
            "bestvideo[height<=480][ext=mp4]+bestaudio[ext=m4a]/best[height<=480][ext=mp4]/best"
        }
    }
}

/// VBR level for `--audio-quality` (0 is best, 9 is worst).
pub fn audio_quality_level(quality: Quality) -> &'static str {
    match quality {
        Quality::High => "0",
        Quality::Medium => "5",
        Quality::Low => "7",
    }
}

/// Output template for the download. Playlist downloads get the index
/// prefix on the file name, below any subdirectories of the template.
pub fn output_template(options: &DownloadOptions, output_dir: &Path) -> String {
    let filename = if options.playlist {
        let (dirs, name) = options.filename.split_at(file_name_start(&options.filename));
        format!("{}{}{}", dirs, PLAYLIST_PREFIX, name)
    } else {
        options.filename.clone()
    };
    output_dir.join(filename).to_string_lossy().into_owned()
}

/// Builds the full argument list for a download. The URL is always last.
pub fn build_download_args(options: &DownloadOptions, output_dir: &Path) -> Vec<String> {
    let mut args: Vec<String> = vec!["--newline".into()];

    if !options.playlist {
        args.push("--no-playlist".into());
    }

    match options.format {
        MediaFormat::Mp4 => {
            args.push("-f".into());
            args.push(video_format_selector(options.quality).into());
        }
        MediaFormat::Mp3 => {
            args.extend(
                [
                    "-x",
                    "--audio-format",
                    "mp3",
                    "--audio-quality",
                    audio_quality_level(options.quality),
                ]
                .map(String::from),
            );
        }
    }

    if options.subtitles {
        args.push("--write-subs".into());
        args.push("--sub-langs".into());
        args.push(options.subtitle_langs.clone());
    }

    if let Some(trim) = &options.trim {
        args.push("--download-sections".into());
        args.push(trim.to_section());
    }

    args.push("-o".into());
    args.push(output_template(options, output_dir));
    args.push(options.url.clone());
    args
}

/// Arguments for a title-only lookup. Unless the whole playlist is wanted,
/// a URL naming both a video and a playlist resolves to the video alone.
pub fn title_args(url: &str, playlist: bool) -> Vec<String> {
    let mut args: Vec<String> = ["--skip-download", "--print", "title"]
        .map(String::from)
        .to_vec();
    if !playlist {
        args.push("--no-playlist".into());
    }
    args.push(url.into());
    args
}

/// Arguments for a metadata lookup. Playlists are listed flat so
/// the lookup does not resolve every entry.
pub fn info_args(url: &str) -> Vec<String> {
    ["--dump-single-json", "--flat-playlist", "--skip-download", url]
        .map(String::from)
        .to_vec()
}
