use console::style;
use tokio::process::Command;

use crate::tool::ytdlp::INSTALL_HINT;
use crate::tool::MediaTool;
use crate::{Config, Error, Result};

/// Dependency check result
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyStatus {
    pub yt_dlp_available: bool,
    pub yt_dlp_version: Option<String>,
    pub ffmpeg_available: bool,
    pub ffmpeg_version: Option<String>,
}

/// Check if required dependencies are available
pub async fn check_dependencies(tool: &dyn MediaTool) -> DependencyStatus {
    let yt_dlp_version = match tool.version().await {
        Ok(version) => Some(version),
        Err(e) => {
            log::debug!("{} unavailable: {}", tool.name(), e);
            None
        }
    };

    // ffmpeg is needed for mp3 extraction and merging formats
    let ffmpeg_version = match Command::new("ffmpeg").arg("-version").output().await {
        Ok(output) if output.status.success() => {
            Some(parse_ffmpeg_version(&String::from_utf8_lossy(&output.stdout)))
        }
        _ => None,
    };

    DependencyStatus {
        yt_dlp_available: yt_dlp_version.is_some(),
        yt_dlp_version,
        ffmpeg_available: ffmpeg_version.is_some(),
        ffmpeg_version,
    }
}

/// Extracts just the version number from `ffmpeg -version` output
fn parse_ffmpeg_version(output: &str) -> String {
    let version_line = output.lines().next().unwrap_or("");
    match version_line.find("version ") {
        Some(start) => {
            let version_str = &version_line[(start + 8)..];
            version_str
                .split_whitespace()
                .next()
                .unwrap_or("unknown")
                .to_string()
        }
        None => "unknown".to_string(),
    }
}

/// Makes sure yt-dlp can be run, installing it when allowed.
///
/// A missing ffmpeg only produces a warning.
pub async fn ensure_dependencies(tool: &dyn MediaTool, config: &Config) -> Result<DependencyStatus> {
    let mut status = check_dependencies(tool).await;

    if !status.yt_dlp_available {
        if !config.auto_install {
            print_dependency_status(&status);
            return Err(Error::ToolNotFound {
                tool: tool.name().to_string(),
                hint: INSTALL_HINT.to_string(),
            });
        }

        println!("{}", style(format!("{} not found. Installing it now...", tool.name())).yellow());
        if let Err(e) = tool.install().await {
            println!("{}", style(&e).red());
            println!("{}", style(INSTALL_HINT).yellow());
            return Err(e);
        }

        status = check_dependencies(tool).await;
        if !status.yt_dlp_available {
            return Err(Error::InstallFailed(format!(
                "{} still cannot be run after installation; is pip's script directory on PATH?",
                tool.name()
            )));
        }
        println!("{}", style(format!("{} installed successfully!", tool.name())).green());
    }

    if !all_dependencies_available(&status) {
        eprintln!("Warning: ffmpeg is missing. MP3 extraction and format merging will fail.");
        print_dependency_status(&status);
    }

    Ok(status)
}

/// Print dependency check results to console
pub fn print_dependency_status(status: &DependencyStatus) {
    println!("Dependency check:");

    println!("  yt-dlp: {}", if status.yt_dlp_available {
        format!("✓ Available (v{})", status.yt_dlp_version.as_deref().unwrap_or("unknown"))
    } else {
        "✗ Not found. Please install yt-dlp: https://github.com/yt-dlp/yt-dlp#installation".to_string()
    });

    println!("  ffmpeg: {}", if status.ffmpeg_available {
        format!("✓ Available (v{})", status.ffmpeg_version.as_deref().unwrap_or("unknown"))
    } else {
        "✗ Not found. Some formats may not be available without ffmpeg.".to_string()
    });
}

/// Check if all required dependencies are available
pub fn all_dependencies_available(status: &DependencyStatus) -> bool {
    status.yt_dlp_available && status.ffmpeg_available
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::MockMediaTool;
    use mockall::Sequence;

    #[test]
    fn test_parse_ffmpeg_version() {
        assert_eq!(
            parse_ffmpeg_version("ffmpeg version 6.1.1-3ubuntu5 Copyright (c) 2000-2023\nbuilt with gcc"),
            "6.1.1-3ubuntu5"
        );
        assert_eq!(parse_ffmpeg_version("ffmpeg version n7.0"), "n7.0");
        assert_eq!(parse_ffmpeg_version("garbage"), "unknown");
    }

    #[tokio::test]
    async fn test_available_tool_is_not_installed() {
        let mut tool = MockMediaTool::new();
        tool.expect_name().return_const("yt-dlp");
        tool.expect_version().returning(|| Ok("2024.08.06".to_string()));
        tool.expect_install().never();

        let status = ensure_dependencies(&tool, &Config::default()).await.unwrap();
        assert!(status.yt_dlp_available);
        assert_eq!(status.yt_dlp_version.as_deref(), Some("2024.08.06"));
    }

    #[tokio::test]
    async fn test_missing_tool_without_auto_install() {
        let mut tool = MockMediaTool::new();
        tool.expect_name().return_const("yt-dlp");
        tool.expect_version().returning(|| {
            Err(Error::ToolNotFound {
                tool: "yt-dlp".into(),
                hint: String::new(),
            })
        });
        tool.expect_install().never();

        let config = Config {
            auto_install: false,
            ..Config::default()
        };
        let err = ensure_dependencies(&tool, &config).await.unwrap_err();
        assert!(matches!(err, Error::ToolNotFound { .. }));
        assert_eq!(err.exit_code(), 3);
    }

    #[tokio::test]
    async fn test_missing_tool_is_installed_then_rechecked() {
        let mut seq = Sequence::new();
        let mut tool = MockMediaTool::new();
        tool.expect_name().return_const("yt-dlp");
        tool.expect_version()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| {
                Err(Error::ToolNotFound {
                    tool: "yt-dlp".into(),
                    hint: String::new(),
                })
            });
        tool.expect_install()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(()));
        tool.expect_version()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok("2024.08.06".to_string()));

        let status = ensure_dependencies(&tool, &Config::default()).await.unwrap();
        assert!(status.yt_dlp_available);
    }

    #[tokio::test]
    async fn test_failed_install_is_reported() {
        let mut tool = MockMediaTool::new();
        tool.expect_name().return_const("yt-dlp");
        tool.expect_version().returning(|| {
            Err(Error::ToolNotFound {
                tool: "yt-dlp".into(),
                hint: String::new(),
            })
        });
        tool.expect_install()
            .times(1)
            .returning(|| Err(Error::InstallFailed("pip exited with 1".into())));

        let err = ensure_dependencies(&tool, &Config::default()).await.unwrap_err();
        assert!(matches!(err, Error::InstallFailed(_)));
    }
}
