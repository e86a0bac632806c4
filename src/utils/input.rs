//! Line-based prompts for interactive mode.
//!
//! Reads from any `BufRead` and writes to any `Write`, so the interactive
//! flow can be driven from a script in tests.

use std::io::{self, BufRead, Write};

use console::style;

use crate::{Error, Result};

pub struct Prompter<R, W> {
    reader: R,
    writer: W,
}

impl Prompter<io::StdinLock<'static>, io::Stdout> {
    /// Prompter over the process's stdin/stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn writer(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }

    /// Writes a line of text.
    pub fn say(&mut self, text: impl std::fmt::Display) -> Result<()> {
        writeln!(self.writer, "{}", text)?;
        Ok(())
    }

    /// Shows `prompt` and returns the trimmed reply.
    ///
    /// End of input is an error; an interactive session cannot continue
    /// without a reader.
    pub fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.writer, "{} ", style(prompt).yellow())?;
        self.writer.flush()?;

        let mut input = String::new();
        let read = self.reader.read_line(&mut input)?;
        if read == 0 {
            return Err(Error::InvalidArgument("unexpected end of input".to_string()));
        }
        Ok(input.trim().to_string())
    }

    /// Like [`ask`](Self::ask), but an empty reply gives `default`.
    pub fn ask_with_default(&mut self, prompt: &str, default: &str) -> Result<String> {
        let reply = self.ask(prompt)?;
        Ok(if reply.is_empty() {
            default.to_string()
        } else {
            reply
        })
    }

    /// Asks a `(y/n)` question. Only `y`/`yes` count as yes.
    pub fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let reply = self.ask(&format!("{} (y/n):", prompt))?;
        Ok(matches!(reply.to_lowercase().as_str(), "y" | "yes"))
    }

    /// Shows a numbered menu and returns the reply as a 1-based index.
    /// Anything that is not a listed number gives `None`.
    pub fn choose(&mut self, heading: &str, choices: &[&str]) -> Result<Option<usize>> {
        writeln!(self.writer, "\n{}", style(heading).cyan())?;
        for (i, choice) in choices.iter().enumerate() {
            writeln!(self.writer, "{}. {}", i + 1, style(choice).green())?;
        }
        let reply = self.ask(&format!("Enter choice (1-{}):", choices.len()))?;
        Ok(reply
            .parse::<usize>()
            .ok()
            .filter(|n| (1..=choices.len()).contains(n)))
    }
}
