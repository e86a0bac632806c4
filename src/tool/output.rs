//! Line-level parsing of yt-dlp's textual output.

use std::sync::OnceLock;

use regex::Regex;

#[derive(Debug, Clone, PartialEq)]
pub enum OutputEvent {
    /// Percent complete of the current item
    Progress(f64),
    /// Start of playlist entry `index` of `count`
    Item { index: u32, count: u32 },
    /// File the current item is being written to
    Destination(String),
    /// An `ERROR:` line
    Error(String),
}

fn progress_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\[download\]\s+(\d+(?:\.\d+)?)%").expect("progress pattern is valid")
    })
}

fn item_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\[download\] Downloading (?:item|video) (\d+) of (\d+)")
            .expect("item pattern is valid")
    })
}

/// Classifies one line of output. Unrecognized lines yield `None`.
pub fn parse_line(line: &str) -> Option<OutputEvent> {
    let line = line.trim_end();

    if let Some(message) = line.strip_prefix("ERROR:") {
        return Some(OutputEvent::Error(message.trim().to_string()));
    }

    if !line.starts_with("[download]") {
        return None;
    }

    if let Some(caps) = progress_re().captures(line) {
        return caps[1]
            .parse::<f64>()
            .ok()
            .map(|p| OutputEvent::Progress(p.clamp(0.0, 100.0)));
    }

    if let Some(caps) = item_re().captures(line) {
        let index = caps[1].parse().ok()?;
        let count = caps[2].parse().ok()?;
        return Some(OutputEvent::Item { index, count });
    }

    line.strip_prefix("[download] Destination:")
        .map(|path| OutputEvent::Destination(path.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_lines() {
        assert_eq!(
            parse_line("[download]  42.5% of   10.00MiB at    1.20MiB/s ETA 00:05"),
            Some(OutputEvent::Progress(42.5))
        );
        assert_eq!(
            parse_line("[download] 100% of   10.00MiB in 00:00:08 at 1.21MiB/s\n"),
            Some(OutputEvent::Progress(100.0))
        );
        assert_eq!(
            parse_line("[download]   0.0% of ~  3.51MiB at  Unknown B/s ETA Unknown (frag 0/12)"),
            Some(OutputEvent::Progress(0.0))
        );
    }

    #[test]
    fn test_playlist_item_lines() {
        assert_eq!(
            parse_line("[download] Downloading item 3 of 10"),
            Some(OutputEvent::Item { index: 3, count: 10 })
        );
        assert_eq!(
            parse_line("[download] Downloading video 1 of 2"),
            Some(OutputEvent::Item { index: 1, count: 2 })
        );
    }

    #[test]
    fn test_destination_and_error_lines() {
        assert_eq!(
            parse_line("[download] Destination: /tmp/out/My Video.mp4"),
            Some(OutputEvent::Destination("/tmp/out/My Video.mp4".into()))
        );
        assert_eq!(
            parse_line("ERROR: [youtube] abc: Video unavailable"),
            Some(OutputEvent::Error("[youtube] abc: Video unavailable".into()))
        );
    }

    #[test]
    fn test_unrelated_lines() {
        assert_eq!(parse_line("[youtube] dQw4w9WgXcQ: Downloading webpage"), None);
        assert_eq!(parse_line("[Merger] Merging formats into \"x.mp4\""), None);
        assert_eq!(parse_line("[download] x.mp4 has already been downloaded"), None);
        assert_eq!(parse_line("progress 50% done"), None);
        assert_eq!(parse_line(""), None);
    }
}
