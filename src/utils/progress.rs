use std::sync::Arc;
use tokio::sync::watch;
use indicatif::{ProgressBar, ProgressStyle};

use crate::tool::{DownloadProgress, ProgressSender};

const BAR_TEMPLATE: &str = "{msg:>12.cyan} [{bar:40.cyan/blue}] {percent:>3}% ({eta})";

/// Progress tracker for downloads with visual progress bar
pub struct ProgressTracker {
    progress_tx: ProgressSender,
    progress_bar: ProgressBar,
    _handle: Option<tokio::task::JoinHandle<()>>,
}

impl ProgressTracker {
    /// Creates a new progress tracker with a styled progress bar
    pub fn new() -> Self {
        Self::with_bar(ProgressBar::new(100))
    }

    /// Tracker that updates an existing bar; hidden bars are used in tests
    pub fn with_bar(pb: ProgressBar) -> Self {
        if let Ok(style) = ProgressStyle::default_bar().template(BAR_TEMPLATE) {
            pb.set_style(style.progress_chars("=>-"));
        }
        pb.set_message("Downloading");

        let (progress_tx, mut progress_rx) = watch::channel(DownloadProgress::default());

        let pb_handle = tokio::spawn({
            let pb = pb.clone();
            async move {
                while progress_rx.changed().await.is_ok() {
                    let progress = *progress_rx.borrow();
                    apply(&pb, &progress);
                }
            }
        });

        Self {
            progress_tx: Arc::new(progress_tx),
            progress_bar: pb,
            _handle: Some(pb_handle),
        }
    }

    /// Get the progress sender that can be passed to the download tool
    pub fn get_sender(&self) -> ProgressSender {
        self.progress_tx.clone()
    }

    /// Completes and clears the progress bar
    pub fn finish(mut self) {
        if let Some(handle) = self._handle.take() {
            handle.abort();
        }
        self.progress_bar.finish_and_clear();
    }
}

fn apply(pb: &ProgressBar, progress: &DownloadProgress) {
    pb.set_position(progress.percent.round() as u64);
    if let Some((index, count)) = progress.item {
        pb.set_message(format!("item {}/{}", index, count));
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        if let Some(handle) = self._handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_sets_position_and_item() {
        let pb = ProgressBar::hidden();
        pb.set_length(100);
        apply(
            &pb,
            &DownloadProgress {
                percent: 42.6,
                item: Some((2, 5)),
            },
        );
        assert_eq!(pb.position(), 43);
        assert_eq!(pb.message(), "item 2/5");
    }

    #[tokio::test]
    async fn test_tracker_follows_sender() {
        let pb = ProgressBar::hidden();
        pb.set_length(100);
        let tracker = ProgressTracker::with_bar(pb.clone());

        tracker.get_sender().send_modify(|p| p.percent = 75.0);

        for _ in 0..50 {
            if pb.position() == 75 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(pb.position(), 75);

        tracker.finish();
        assert!(pb.is_finished());
    }
}
