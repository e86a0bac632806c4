use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::watch;

use crate::Result;

pub mod command;
pub mod output;
pub mod template;
pub mod ytdlp;

pub use ytdlp::YtDlp;

/// Latest known state of a running download.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DownloadProgress {
    /// Percent of the current item, 0.0..=100.0
    pub percent: f64,
    /// `(index, count)` while a playlist is being downloaded
    pub item: Option<(u32, u32)>,
}

pub type ProgressSender = Arc<watch::Sender<DownloadProgress>>;

/// The external downloader this crate drives.
///
/// Kept as a trait object so the orchestration layer can be exercised
/// without spawning real processes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaTool: Send + Sync {
    /// Display name of the tool (e.g. "yt-dlp")
    fn name(&self) -> &'static str;

    /// Returns the tool's version string, failing if it cannot be run
    async fn version(&self) -> Result<String>;

    /// Attempts to install the tool
    async fn install(&self) -> Result<()>;

    /// Looks up the title(s) behind a URL without downloading.
    /// Playlists yield one title per entry; with `playlist` unset a URL
    /// pointing at a video inside a playlist yields just that video.
    async fn fetch_titles(&self, url: &str, playlist: bool) -> Result<Vec<String>>;

    /// Fetches the metadata document for a URL
    async fn fetch_info(&self, url: &str) -> Result<MediaInfo>;

    /// Runs a download with the given argument list, blocking until the
    /// child exits.
    async fn download(&self, args: Vec<String>, progress_tx: ProgressSender) -> Result<()>;
}

/// The part of yt-dlp's JSON metadata that gets shown to users.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub webpage_url: Option<String>,
    #[serde(default)]
    pub extractor_key: Option<String>,
    #[serde(rename = "_type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub playlist_count: Option<u64>,
    #[serde(default)]
    pub entries: Vec<serde_json::Value>,
    #[serde(default)]
    pub subtitles: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub formats: Vec<FormatEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormatEntry {
    #[serde(default)]
    pub format_id: String,
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub vcodec: Option<String>,
    #[serde(default)]
    pub acodec: Option<String>,
}

impl MediaInfo {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("Unknown Title")
    }

    pub fn is_playlist(&self) -> bool {
        self.kind.as_deref() == Some("playlist")
    }

    /// Number of playlist entries, if this is a playlist
    pub fn entry_count(&self) -> Option<u64> {
        if !self.is_playlist() {
            return None;
        }
        self.playlist_count.or(Some(self.entries.len() as u64))
    }

    /// Distinct heights of mp4 video streams, highest first
    pub fn mp4_heights(&self) -> Vec<u32> {
        let mut heights: Vec<u32> = self
            .formats
            .iter()
            .filter(|f| f.ext.as_deref() == Some("mp4"))
            .filter(|f| f.vcodec.as_deref().map_or(true, |v| v != "none"))
            .filter_map(|f| f.height)
            .collect();
        heights.sort_unstable_by(|a, b| b.cmp(a));
        heights.dedup();
        heights
    }

    pub fn has_audio_only_stream(&self) -> bool {
        self.formats.iter().any(|f| {
            f.vcodec.as_deref() == Some("none") && f.acodec.as_deref().map_or(false, |a| a != "none")
        })
    }

    pub fn subtitle_languages(&self) -> Vec<&str> {
        self.subtitles.keys().map(String::as_str).collect()
    }
}

/// Formats seconds as `HH:MM:SS`.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIDEO_JSON: &str = r#"{
        "id": "abc123",
        "title": "A Video",
        "uploader": "Someone",
        "duration": 3725.4,
        "extractor_key": "Youtube",
        "subtitles": {"en": [], "de": []},
        "formats": [
            {"format_id": "140", "ext": "m4a", "vcodec": "none", "acodec": "mp4a.40.2"},
            {"format_id": "136", "ext": "mp4", "height": 720, "vcodec": "avc1", "acodec": "none"},
            {"format_id": "137", "ext": "mp4", "height": 1080, "vcodec": "avc1", "acodec": "none"},
            {"format_id": "248", "ext": "webm", "height": 1080, "vcodec": "vp9"},
            {"format_id": "18", "ext": "mp4", "height": 360},
            {"format_id": "22", "ext": "mp4", "height": 720}
        ]
    }"#;

    #[test]
    fn test_media_info_from_video_json() {
        let info: MediaInfo = serde_json::from_str(VIDEO_JSON).unwrap();
        assert_eq!(info.title(), "A Video");
        assert!(!info.is_playlist());
        assert_eq!(info.entry_count(), None);
        assert_eq!(info.mp4_heights(), vec![1080, 720, 360]);
        assert!(info.has_audio_only_stream());
        assert_eq!(info.subtitle_languages(), vec!["de", "en"]);
    }

    #[test]
    fn test_media_info_from_flat_playlist() {
        let json = r#"{
            "_type": "playlist",
            "title": "Mix",
            "entries": [{"id": "a"}, {"id": "b"}, null]
        }"#;
        let info: MediaInfo = serde_json::from_str(json).unwrap();
        assert!(info.is_playlist());
        assert_eq!(info.entry_count(), Some(3));
        assert!(info.mp4_heights().is_empty());
    }

    #[test]
    fn test_media_info_missing_title() {
        let info: MediaInfo = serde_json::from_str("{}").unwrap();
        assert_eq!(info.title(), "Unknown Title");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(3725.4), "01:02:05");
        assert_eq!(format_duration(59.6), "00:01:00");
        assert_eq!(format_duration(-3.0), "00:00:00");
    }
}
