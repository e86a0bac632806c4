use std::path::PathBuf;
use std::sync::Arc;

use console::style;
use url::Url;

use crate::options::DownloadOptions;
use crate::tool::command::build_download_args;
use crate::tool::template::sanitize_template;
use crate::tool::{MediaInfo, MediaTool, YtDlp};
use crate::utils::error_log::ErrorLog;
use crate::utils::open_folder::open_folder;
use crate::utils::progress::ProgressTracker;
use crate::{Config, Error, Result};

pub struct Downloader {
    tool: Arc<dyn MediaTool>,
    config: Config,
    error_log: ErrorLog,
}

impl Downloader {
    /// Create a new downloader driving yt-dlp as configured
    pub fn with_config(config: Config) -> Self {
        let tool = Arc::new(YtDlp::from_path(config.ytdlp_path.as_deref()));
        Self::with_tool(tool, config)
    }

    /// Create a downloader around any tool implementation
    pub fn with_tool(tool: Arc<dyn MediaTool>, config: Config) -> Self {
        let error_log = ErrorLog::new(config.log_file.clone());
        Self {
            tool,
            config,
            error_log,
        }
    }

    /// Get the current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tool(&self) -> &dyn MediaTool {
        self.tool.as_ref()
    }

    pub fn error_log(&self) -> &ErrorLog {
        &self.error_log
    }

    /// Looks up the title behind `url`. For playlists this is the first entry's.
    pub async fn lookup_title(&self, url: &str, playlist: bool) -> Result<String> {
        let result = self.first_title(url, playlist).await;
        if let Err(e) = &result {
            self.error_log.record(&format!("Error retrieving info for {}: {}", url, e));
        }
        result
    }

    async fn first_title(&self, url: &str, playlist: bool) -> Result<String> {
        validate_url(url)?;
        let titles = self.tool.fetch_titles(url, playlist).await?;
        if titles.len() > 1 {
            log::info!("{} entries behind {}", titles.len(), url);
        }
        titles.into_iter().next().ok_or_else(|| Error::InfoLookup {
            url: url.to_string(),
            reason: "no title returned".to_string(),
        })
    }

    pub async fn get_info(&self, url: &str) -> Result<MediaInfo> {
        validate_url(url)?;
        self.tool.fetch_info(url).await.map_err(|e| {
            self.error_log.record(&format!("Error retrieving info for {}: {}", url, e));
            e
        })
    }

    /// Destination directory: explicit option, then config, then cwd.
    pub fn resolve_output_dir(&self, options: &DownloadOptions) -> Result<PathBuf> {
        match options.output_dir.as_ref().or(self.config.download_dir.as_ref()) {
            Some(dir) => Ok(dir.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }

    /// Runs one download and returns the directory the files went to.
    pub async fn download(&self, options: &DownloadOptions) -> Result<PathBuf> {
        match self.run_download(options).await {
            Ok(dir) => {
                println!(
                    "{}",
                    style(format!("Download complete! File saved to {}", dir.display())).green()
                );
                if options.open_folder {
                    if let Err(e) = open_folder(&dir) {
                        log::warn!("could not open {}: {}", dir.display(), e);
                    }
                }
                Ok(dir)
            }
            Err(e) => {
                println!("{}", style(format!("Error during download: {}", e)).red());
                self.error_log
                    .record(&format!("Download failed for {}: {}", options.url, e));
                Err(e)
            }
        }
    }

    async fn run_download(&self, options: &DownloadOptions) -> Result<PathBuf> {
        validate_url(&options.url)?;

        let output_dir = self.resolve_output_dir(options)?;
        std::fs::create_dir_all(&output_dir)?;

        let mut options = options.clone();
        options.filename = sanitize_template(&options.filename)?;
        let args = build_download_args(&options, &output_dir);

        println!(
            "{}",
            style(format!(
                "Format: {}, Quality: {}",
                options.format.to_string().to_uppercase(),
                options.quality.label()
            ))
            .yellow()
        );

        let result = if self.config.show_progress {
            let tracker = ProgressTracker::new();
            let result = self.tool.download(args, tracker.get_sender()).await;
            tracker.finish();
            result
        } else {
            let (tx, _rx) = tokio::sync::watch::channel(Default::default());
            self.tool.download(args, Arc::new(tx)).await
        };

        result.map(|_| output_dir)
    }
}

/// URLs must at least parse and carry a host.
pub fn validate_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url.trim()).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))?;
    if parsed.host_str().is_none() {
        return Err(Error::InvalidUrl(format!("{}: no host found", url)));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{MediaFormat, Quality};
    use crate::tool::MockMediaTool;
    use std::path::Path;

    const URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    fn quiet_config(dir: &Path) -> Config {
        Config {
            show_progress: false,
            open_folder: false,
            log_file: dir.join("download_log.txt"),
            ..Config::default()
        }
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url(URL).is_ok());
        assert!(matches!(validate_url("not a url"), Err(Error::InvalidUrl(_))));
        assert!(matches!(validate_url("mailto:a@b.c"), Err(Error::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_download_keeps_template_fields() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("media");

        let expected = out
            .join("%(uploader|unknown)s/%(upload_date>%Y-%m-%d)s %(title)s.%(ext)s")
            .to_string_lossy()
            .into_owned();
        let mut tool = MockMediaTool::new();
        tool.expect_download()
            .times(1)
            .withf(move |args, _| args.contains(&expected))
            .returning(|_, _| Ok(()));

        let downloader = Downloader::with_tool(Arc::new(tool), quiet_config(tmp.path()));
        let mut options = DownloadOptions::new(URL);
        options.output_dir = Some(out);
        options.filename = "%(uploader|unknown)s/%(upload_date>%Y-%m-%d)s %(title)s.%(ext)s".into();
        downloader.download(&options).await.unwrap();
    }

    #[tokio::test]
    async fn test_escaping_template_never_reaches_tool() {
        let tmp = tempfile::tempdir().unwrap();
        let mut tool = MockMediaTool::new();
        tool.expect_download().never();

        let downloader = Downloader::with_tool(Arc::new(tool), quiet_config(tmp.path()));
        let mut options = DownloadOptions::new(URL);
        options.output_dir = Some(tmp.path().to_path_buf());
        options.filename = "../%(title)s.%(ext)s".into();
        assert!(matches!(
            downloader.download(&options).await,
            Err(Error::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_download_builds_args_and_creates_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("media");

        let expected_dir = out.clone();
        let mut tool = MockMediaTool::new();
        tool.expect_download()
            .times(1)
            .withf(move |args, _| {
                let template = expected_dir.join("%(title)s.%(ext)s").to_string_lossy().into_owned();
                args.contains(&"--audio-quality".to_string())
                    && args.contains(&"5".to_string())
                    && args.contains(&template)
                    && args.last().map(String::as_str) == Some(URL)
            })
            .returning(|_, _| Ok(()));

        let downloader = Downloader::with_tool(Arc::new(tool), quiet_config(tmp.path()));
        let mut options = DownloadOptions::new(URL);
        options.format = MediaFormat::Mp3;
        options.quality = Quality::Medium;
        options.output_dir = Some(out.clone());

        let dir = downloader.download(&options).await.unwrap();
        assert_eq!(dir, out);
        assert!(out.is_dir());
        assert!(!tmp.path().join("download_log.txt").exists());
    }

    #[tokio::test]
    async fn test_failed_download_is_logged_and_propagated() {
        let tmp = tempfile::tempdir().unwrap();

        let mut tool = MockMediaTool::new();
        tool.expect_download().times(1).returning(|_, _| {
            Err(Error::ToolFailed {
                command: "yt-dlp".into(),
                code: Some(2),
                stderr_tail: "ERROR: Unsupported URL".into(),
            })
        });

        let downloader = Downloader::with_tool(Arc::new(tool), quiet_config(tmp.path()));
        let mut options = DownloadOptions::new(URL);
        options.output_dir = Some(tmp.path().to_path_buf());

        let err = downloader.download(&options).await.unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let log = std::fs::read_to_string(tmp.path().join("download_log.txt")).unwrap();
        assert!(log.contains(&format!("Download failed for {}", URL)));
        assert!(log.contains("Unsupported URL"));
    }

    #[tokio::test]
    async fn test_invalid_url_never_reaches_tool() {
        let tmp = tempfile::tempdir().unwrap();
        let mut tool = MockMediaTool::new();
        tool.expect_download().never();
        tool.expect_fetch_titles().never();

        let downloader = Downloader::with_tool(Arc::new(tool), quiet_config(tmp.path()));
        let options = DownloadOptions::new("definitely not a url");
        assert!(matches!(downloader.download(&options).await, Err(Error::InvalidUrl(_))));
        assert!(matches!(downloader.lookup_title("nope", false).await, Err(Error::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_lookup_title_takes_first_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let mut tool = MockMediaTool::new();
        tool.expect_fetch_titles()
            .withf(|url, playlist| url.to_string() == URL && *playlist)
            .returning(|_, _| Ok(vec!["First".to_string(), "Second".to_string()]));

        let downloader = Downloader::with_tool(Arc::new(tool), quiet_config(tmp.path()));
        assert_eq!(downloader.lookup_title(URL, true).await.unwrap(), "First");
    }

    #[tokio::test]
    async fn test_lookup_failure_is_logged() {
        let tmp = tempfile::tempdir().unwrap();
        let mut tool = MockMediaTool::new();
        tool.expect_fetch_titles().returning(|url, _| {
            Err(Error::InfoLookup {
                url: url.to_string(),
                reason: "Video unavailable".into(),
            })
        });

        let downloader = Downloader::with_tool(Arc::new(tool), quiet_config(tmp.path()));
        assert!(downloader.lookup_title(URL, false).await.is_err());

        let log = std::fs::read_to_string(tmp.path().join("download_log.txt")).unwrap();
        assert!(log.contains("Video unavailable"));
    }

    #[test]
    fn test_output_dir_resolution_order() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = quiet_config(tmp.path());
        config.download_dir = Some(PathBuf::from("/from/config"));
        let downloader = Downloader::with_tool(Arc::new(MockMediaTool::new()), config);

        let mut options = DownloadOptions::new(URL);
        assert_eq!(
            downloader.resolve_output_dir(&options).unwrap(),
            PathBuf::from("/from/config")
        );

        options.output_dir = Some(PathBuf::from("/from/options"));
        assert_eq!(
            downloader.resolve_output_dir(&options).unwrap(),
            PathBuf::from("/from/options")
        );

        let downloader = Downloader::with_tool(
            Arc::new(MockMediaTool::new()),
            quiet_config(tmp.path()),
        );
        assert_eq!(
            downloader.resolve_output_dir(&DownloadOptions::new(URL)).unwrap(),
            std::env::current_dir().unwrap()
        );
    }
}
