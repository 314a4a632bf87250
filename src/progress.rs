use crate::models::{DownloadProgress, ProgressEvent};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Fire-and-forget progress events for one consumer.
#[derive(Debug, Clone, Default)]
pub struct ProgressReporter {
    tx: Option<UnboundedSender<ProgressEvent>>,
}

impl ProgressReporter {
    pub fn channel() -> (Self, UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// Reporter that drops every event.
    pub fn silent() -> Self {
        Self { tx: None }
    }

    pub fn emit(&self, set_name: &str, progress: DownloadProgress) {
        if let Some(tx) = &self.tx {
            // A closed receiver only means nobody is watching.
            let _ = tx.send(ProgressEvent {
                set_name: set_name.to_string(),
                progress,
            });
        }
    }
}

/// Running counters for one set, turned into [`DownloadProgress`] snapshots.
#[derive(Debug, Clone)]
pub struct SetProgress {
    pub total: usize,
    pub success_count: usize,
    pub failed_count: usize,
}

impl SetProgress {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            success_count: 0,
            failed_count: 0,
        }
    }

    pub fn completed(&self) -> usize {
        self.success_count + self.failed_count
    }

    fn percentage(&self, done: usize) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (done as f64 / self.total as f64 * 100.0).min(100.0)
    }

    fn snapshot(&self, current: usize, done: usize, status: String) -> DownloadProgress {
        DownloadProgress {
            current,
            total: self.total,
            status,
            percentage: self.percentage(done),
            success_count: self.success_count,
            failed_count: self.failed_count,
        }
    }

    pub fn started(&self, title: &str) -> DownloadProgress {
        let mut p = self.snapshot(0, 0, format!("Downloading {title} ({} stickers)", self.total));
        p.percentage = 0.0;
        p
    }

    /// Sticker `index` (1-based) is about to be processed.
    pub fn sticker_started(&self, index: usize) -> DownloadProgress {
        self.snapshot(
            index,
            self.completed(),
            format!("Downloading sticker {index}/{}", self.total),
        )
    }

    pub fn sticker_finished(&self, index: usize) -> DownloadProgress {
        self.snapshot(
            index,
            self.completed(),
            format!(
                "Finished {index}/{} (ok: {}, failed: {})",
                self.total, self.success_count, self.failed_count
            ),
        )
    }

    pub fn finished(&self, title: &str) -> DownloadProgress {
        let mut p = self.snapshot(
            self.total,
            self.total,
            format!(
                "Downloaded {title} (ok: {}, failed: {})",
                self.success_count, self.failed_count
            ),
        );
        p.percentage = 100.0;
        p
    }
}
