use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid format: {0} (expected mp4 or mp3)")]
    InvalidFormat(String),

    #[error("Invalid quality: {0} (expected high, medium or low)")]
    InvalidQuality(String),

    #[error("Invalid trim range: {0}")]
    InvalidTrimRange(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{tool} not found. {hint}")]
    ToolNotFound { tool: String, hint: String },

    #[error("Failed to install yt-dlp: {0}")]
    InstallFailed(String),

    #[error("Failed to execute {command}: {reason}")]
    CommandExecution { command: String, reason: String },

    #[error("Error retrieving info for {url}: {reason}")]
    InfoLookup { url: String, reason: String },

    #[error("{command} exited with {}{}", exit_status(.code), stderr_suffix(.stderr_tail))]
    ToolFailed {
        command: String,
        code: Option<i32>,
        stderr_tail: String,
    },

    #[error("{failed} of {total} downloads failed")]
    BatchFailed { failed: usize, total: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse tool output: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn exit_status(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

fn stderr_suffix(tail: &str) -> String {
    if tail.is_empty() {
        String::new()
    } else {
        format!(": {}", tail)
    }
}

impl Error {
    /// Process exit code for this error.
    ///
    /// A failing child's own status is passed through when it fits in a
    /// process exit code.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::ToolFailed { code: Some(code), .. } if (1..=255).contains(code) => *code as u8,
            Error::InvalidUrl(_)
            | Error::InvalidFormat(_)
            | Error::InvalidQuality(_)
            | Error::InvalidTrimRange(_)
            | Error::InvalidArgument(_) => 2,
            Error::ToolNotFound { .. } | Error::InstallFailed(_) => 3,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

pub trait ErrorExt {
    fn context<C>(self, context: C) -> Self
    where
        C: std::fmt::Display + Send + Sync + 'static;
}

impl ErrorExt for Error {
    fn context<C>(self, context: C) -> Self
    where
        C: std::fmt::Display + Send + Sync + 'static,
    {
        match self {
            Error::Other(err) => Error::Other(err.context(context)),
            err => Error::Other(anyhow::Error::new(err).context(context)),
        }
    }
}
