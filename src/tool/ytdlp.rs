use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio_stream::wrappers::SplitStream;
use tokio_stream::StreamExt;

use super::command::{info_args, title_args};
use super::output::{parse_line, OutputEvent};
use super::{MediaInfo, MediaTool, ProgressSender};
use crate::{Error, Result};

/// Number of stderr lines kept for error reports.
const STDERR_TAIL_LINES: usize = 5;

/// Install hint shown when yt-dlp cannot be found or installed.
pub const INSTALL_HINT: &str = "Please install it manually with: pip install yt-dlp";

/// yt-dlp driven as a subprocess.
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: PathBuf,
}

impl YtDlp {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Uses the configured path, or `yt-dlp` from PATH.
    pub fn from_path(path: Option<&Path>) -> Self {
        Self::new(path.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("yt-dlp")))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self, args: &[String]) -> Command {
        log::debug!("running {} {}", self.program.display(), args.join(" "));
        let mut cmd = Command::new(&self.program);
        cmd.args(args).stdin(Stdio::null()).kill_on_drop(true);
        cmd
    }

    /// Runs to completion and returns stdout; non-zero exits become
    /// `InfoLookup` errors carrying stderr.
    async fn lookup(&self, url: &str, args: Vec<String>) -> Result<String> {
        let output = self
            .command(&args)
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::InfoLookup {
                url: url.to_string(),
                reason: last_lines(&stderr, 1)
                    .unwrap_or_else(|| format!("exit status {}", output.status)),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn spawn_error(&self, e: std::io::Error) -> Error {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::ToolNotFound {
                tool: self.program.display().to_string(),
                hint: INSTALL_HINT.to_string(),
            }
        } else {
            Error::CommandExecution {
                command: self.program.display().to_string(),
                reason: e.to_string(),
            }
        }
    }
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::from_path(None)
    }
}

fn last_lines(text: &str, n: usize) -> Option<String> {
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    if lines.is_empty() {
        return None;
    }
    Some(lines[lines.len().saturating_sub(n)..].join("\n"))
}

type RawLines<R> = SplitStream<BufReader<R>>;

fn raw_lines<R: AsyncRead + Unpin>(reader: R) -> RawLines<R> {
    SplitStream::new(BufReader::new(reader).split(b'\n'))
}

/// Next line of a pipe, decoded lossily so a stray non-UTF-8 byte
/// cannot end the stream early.
async fn next_line<R: AsyncRead + Unpin>(lines: &mut RawLines<R>) -> Option<String> {
    match lines.next().await? {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).trim_end_matches('\r').to_string()),
        Err(e) => {
            log::warn!("stopped reading yt-dlp output: {}", e);
            None
        }
    }
}

/// What was left on stderr once the child closed it.
#[derive(Debug, Default, PartialEq)]
struct StderrTail {
    lines: String,
    error: Option<String>,
}

impl StderrTail {
    /// The most useful single line: the last `ERROR:` message, else the last line.
    fn summary(self) -> String {
        self.error
            .or_else(|| last_lines(&self.lines, 1))
            .unwrap_or_default()
    }
}

/// Drains a stream to EOF, keeping only the last few lines and the last error.
async fn drain_tail<R: AsyncRead + Unpin>(reader: R) -> StderrTail {
    let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
    let mut error = None;
    let mut lines = raw_lines(reader);
    while let Some(line) = next_line(&mut lines).await {
        log::debug!("yt-dlp: {}", line);
        if line.trim().is_empty() {
            continue;
        }
        if let Some(OutputEvent::Error(message)) = parse_line(&line) {
            error = Some(message);
        }
        if tail.len() == STDERR_TAIL_LINES {
            tail.pop_front();
        }
        tail.push_back(line);
    }
    StderrTail {
        lines: Vec::from(tail).join("\n"),
        error,
    }
}

#[async_trait]
impl MediaTool for YtDlp {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn version(&self) -> Result<String> {
        let output = self
            .command(&["--version".to_string()])
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(Error::CommandExecution {
                command: format!("{} --version", self.program.display()),
                reason: format!("exit status {}", output.status),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn install(&self) -> Result<()> {
        let mut last_error = String::from("no Python interpreter found");

        for python in ["python3", "python"] {
            log::info!("installing yt-dlp with {} -m pip", python);
            match Command::new(python)
                .args(["-m", "pip", "install", "yt-dlp"])
                .status()
                .await
            {
                Ok(status) if status.success() => return Ok(()),
                Ok(status) => {
                    last_error = format!("{} -m pip install yt-dlp exited with {}", python, status);
                    // the interpreter exists; trying another one would not help
                    break;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    last_error = e.to_string();
                    break;
                }
            }
        }

        Err(Error::InstallFailed(last_error))
    }

    async fn fetch_titles(&self, url: &str, playlist: bool) -> Result<Vec<String>> {
        let stdout = self.lookup(url, title_args(url, playlist)).await?;
        let titles: Vec<String> = stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect();

        if titles.is_empty() {
            return Err(Error::InfoLookup {
                url: url.to_string(),
                reason: "no title returned".to_string(),
            });
        }
        Ok(titles)
    }

    async fn fetch_info(&self, url: &str) -> Result<MediaInfo> {
        let stdout = self.lookup(url, info_args(url)).await?;
        Ok(serde_json::from_str(&stdout)?)
    }

    async fn download(&self, args: Vec<String>, progress_tx: ProgressSender) -> Result<()> {
        let mut child = self
            .command(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        // Drain stderr on its own task so a chatty child cannot block on a full pipe.
        let stderr_task = child.stderr.take().map(|stderr| tokio::spawn(drain_tail(stderr)));

        if let Some(stdout) = child.stdout.take() {
            let mut lines = raw_lines(stdout);
            while let Some(line) = next_line(&mut lines).await {
                match parse_line(&line) {
                    Some(OutputEvent::Progress(percent)) => {
                        progress_tx.send_modify(|p| p.percent = percent);
                    }
                    Some(OutputEvent::Item { index, count }) => {
                        progress_tx.send_modify(|p| {
                            p.item = Some((index, count));
                            p.percent = 0.0;
                        });
                    }
                    Some(OutputEvent::Destination(path)) => log::info!("writing {}", path),
                    Some(OutputEvent::Error(message)) => log::warn!("yt-dlp: {}", message),
                    None => log::trace!("yt-dlp: {}", line),
                }
            }
        }

        let status = child.wait().await.map_err(|e| Error::CommandExecution {
            command: self.program.display().to_string(),
            reason: e.to_string(),
        })?;

        let stderr_tail = match stderr_task {
            Some(task) => task.await.unwrap_or_default(),
            None => StderrTail::default(),
        };

        if !status.success() {
            return Err(Error::ToolFailed {
                command: self.name().to_string(),
                code: status.code(),
                stderr_tail: stderr_tail.summary(),
            });
        }

        Ok(())
    }
}
