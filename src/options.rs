use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default yt-dlp output template.
pub const DEFAULT_FILENAME_TEMPLATE: &str = "%(title)s.%(ext)s";

/// Default subtitle languages passed to `--sub-langs`.
pub const DEFAULT_SUBTITLE_LANGS: &str = "en";

/// Container the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MediaFormat {
    /// Video (MP4)
    #[default]
    Mp4,
    /// Audio only (MP3)
    Mp3,
}

impl MediaFormat {
    pub fn is_audio(&self) -> bool {
        matches!(self, MediaFormat::Mp3)
    }
}

impl fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaFormat::Mp4 => write!(f, "mp4"),
            MediaFormat::Mp3 => write!(f, "mp3"),
        }
    }
}

impl FromStr for MediaFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mp4" => Ok(MediaFormat::Mp4),
            "mp3" => Ok(MediaFormat::Mp3),
            _ => Err(Error::InvalidFormat(s.to_string())),
        }
    }
}

/// Resolution/bitrate tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    #[default]
    High,
    Medium,
    Low,
}

impl Quality {
    /// Title-cased label used in user-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            Quality::High => "High",
            Quality::Medium => "Medium",
            Quality::Low => "Low",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quality::High => write!(f, "high"),
            Quality::Medium => write!(f, "medium"),
            Quality::Low => write!(f, "low"),
        }
    }
}

impl FromStr for Quality {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Quality::High),
            "medium" => Ok(Quality::Medium),
            "low" => Ok(Quality::Low),
            _ => Err(Error::InvalidQuality(s.to_string())),
        }
    }
}

/// A `START-END` section of the media to download.
///
/// Both ends are kept as the user typed them, so `01:30` reaches yt-dlp as
/// `01:30`. They are validated as `[[HH:]MM:]SS[.frac]` on construction and
/// `start` must come before `end`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrimRange {
    start: String,
    end: String,
}

impl TrimRange {
    pub fn new(start: &str, end: &str) -> Result<Self> {
        let start = start.trim();
        let end = end.trim();
        let start_secs = parse_timestamp(start)?;
        let end_secs = parse_timestamp(end)?;

        if start_secs >= end_secs {
            return Err(Error::InvalidTrimRange(format!(
                "start {} is not before end {}",
                start, end
            )));
        }

        Ok(Self {
            start: start.to_string(),
            end: end.to_string(),
        })
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }

    /// Section expression for `--download-sections`.
    pub fn to_section(&self) -> String {
        format!("*{}-{}", self.start, self.end)
    }
}

impl fmt::Display for TrimRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl FromStr for TrimRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().trim_start_matches('*');
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| Error::InvalidTrimRange(format!("expected START-END, got '{}'", s)))?;
        Self::new(start, end)
    }
}

/// Parses `[[HH:]MM:]SS[.frac]` into seconds.
pub fn parse_timestamp(value: &str) -> Result<f64> {
    let invalid = || Error::InvalidTrimRange(format!("'{}' is not a timestamp", value));

    if value.is_empty() {
        return Err(invalid());
    }

    let parts: Vec<&str> = value.split(':').collect();
    if parts.len() > 3 {
        return Err(invalid());
    }

    let mut seconds = 0.0;
    let last = parts.len() - 1;
    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() || part.starts_with('.') || part.ends_with('.') {
            return Err(invalid());
        }
        let fractional_allowed = i == last;
        if !part
            .chars()
            .all(|c| c.is_ascii_digit() || (fractional_allowed && c == '.'))
        {
            return Err(invalid());
        }
        let n: f64 = part.parse().map_err(|_| invalid())?;
        // minutes and seconds past the first field must stay below 60
        if i > 0 && n >= 60.0 {
            return Err(invalid());
        }
        seconds = seconds * 60.0 + n;
    }

    Ok(seconds)
}

/// Everything needed to build a single yt-dlp download invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadOptions {
    pub url: String,
    pub format: MediaFormat,
    pub quality: Quality,
    /// Destination directory; falls back to the configured one, then the cwd.
    pub output_dir: Option<PathBuf>,
    /// yt-dlp output template for the file name.
    pub filename: String,
    pub playlist: bool,
    pub subtitles: bool,
    pub subtitle_langs: String,
    pub trim: Option<TrimRange>,
    pub open_folder: bool,
}

impl DownloadOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            format: MediaFormat::default(),
            quality: Quality::default(),
            output_dir: None,
            filename: DEFAULT_FILENAME_TEMPLATE.to_string(),
            playlist: false,
            subtitles: false,
            subtitle_langs: DEFAULT_SUBTITLE_LANGS.to_string(),
            trim: None,
            open_folder: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_and_quality_parse_case_insensitive() {
        assert_eq!("MP3".parse::<MediaFormat>().unwrap(), MediaFormat::Mp3);
        assert_eq!(" mp4 ".parse::<MediaFormat>().unwrap(), MediaFormat::Mp4);
        assert!(matches!(
            "webm".parse::<MediaFormat>(),
            Err(Error::InvalidFormat(_))
        ));

        assert_eq!("Medium".parse::<Quality>().unwrap(), Quality::Medium);
        assert!(matches!(
            "best".parse::<Quality>(),
            Err(Error::InvalidQuality(_))
        ));
        assert_eq!(Quality::Low.label(), "Low");
    }

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("10").unwrap(), 10.0);
        assert_eq!(parse_timestamp("00:10").unwrap(), 10.0);
        assert_eq!(parse_timestamp("01:30").unwrap(), 90.0);
        assert_eq!(parse_timestamp("1:02:03").unwrap(), 3723.0);
        assert_eq!(parse_timestamp("90").unwrap(), 90.0);
        assert_eq!(parse_timestamp("00:01.5").unwrap(), 1.5);

        for bad in ["", "1:2:3:4", "aa:10", "01:75", "1.5:10", "::", "10.", "-5"] {
            assert!(parse_timestamp(bad).is_err(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn test_trim_range() {
        let trim: TrimRange = "00:10-01:30".parse().unwrap();
        assert_eq!(trim.start(), "00:10");
        assert_eq!(trim.end(), "01:30");
        assert_eq!(trim.to_section(), "*00:10-01:30");
        assert_eq!(trim.to_string(), "00:10-01:30");

        // yt-dlp's own section syntax is accepted as input too
        let starred: TrimRange = "*00:10-01:30".parse().unwrap();
        assert_eq!(starred, trim);

        assert!("01:30-00:10".parse::<TrimRange>().is_err());
        assert!("00:10-00:10".parse::<TrimRange>().is_err());
        assert!("00:10".parse::<TrimRange>().is_err());
        assert!(TrimRange::new(" 5 ", "7").is_ok());
    }

    #[test]
    fn test_download_options_defaults() {
        let options = DownloadOptions::new("https://example.com/v");
        assert_eq!(options.format, MediaFormat::Mp4);
        assert_eq!(options.quality, Quality::High);
        assert_eq!(options.filename, "%(title)s.%(ext)s");
        assert_eq!(options.subtitle_langs, "en");
        assert!(!options.playlist);
        assert!(options.trim.is_none());
    }
}
