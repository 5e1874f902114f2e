//! Progress observers for column translation

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing::{info, warn};

/// Receives notifications from the translation loop
///
/// All methods default to doing nothing, so implementations only override
/// what they display.
pub trait ProgressObserver: Send {
    /// Called once before the first request
    fn on_started(&mut self, _total_rows: usize) {}

    /// Called after each successful row
    fn on_row_translated(&mut self, _row_index: usize, _completed: usize) {}

    /// Called after every `progress_interval`-th successful row
    fn on_milestone(&mut self, _completed: usize) {}

    /// Called once when every row has been translated
    fn on_finished(&mut self, _completed: usize) {}

    /// Called once when the run is aborted
    fn on_aborted(&mut self, _row_index: Option<usize>, _completed: usize) {}
}

/// Observer that ignores every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {}

/// Milestones and outcome through `tracing` only
#[derive(Debug, Default, Clone)]
pub struct LogProgress {
    label: String,
}

impl LogProgress {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl ProgressObserver for LogProgress {
    fn on_started(&mut self, total_rows: usize) {
        info!("{}: translating {} rows", self.label, total_rows);
    }

    fn on_milestone(&mut self, completed: usize) {
        info!("{}: translated {} rows", self.label, completed);
    }

    fn on_finished(&mut self, completed: usize) {
        info!("{}: translation completed, {} rows", self.label, completed);
    }

    fn on_aborted(&mut self, row_index: Option<usize>, completed: usize) {
        match row_index {
            Some(row) => warn!(
                "{}: aborted at row {} after {} successful rows",
                self.label, row, completed
            ),
            None => warn!("{}: aborted before translating any row", self.label),
        }
    }
}

/// Live counter with an `indicatif` bar, milestones logged above it
pub struct BarProgress {
    bar: ProgressBar,
    log: LogProgress,
}

impl BarProgress {
    pub fn new(label: impl Into<String>) -> Self {
        let bar = ProgressBar::hidden();
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        bar.set_style(style);

        Self {
            bar,
            log: LogProgress::new(label),
        }
    }
}

impl ProgressObserver for BarProgress {
    fn on_started(&mut self, total_rows: usize) {
        self.bar.set_length(total_rows as u64);
        self.bar.set_draw_target(ProgressDrawTarget::stderr());
        let log = &mut self.log;
        self.bar.suspend(|| log.on_started(total_rows));
    }

    fn on_row_translated(&mut self, row_index: usize, _completed: usize) {
        self.bar.set_message(format!("row {}", row_index));
        self.bar.inc(1);
    }

    fn on_milestone(&mut self, completed: usize) {
        let log = &mut self.log;
        self.bar.suspend(|| log.on_milestone(completed));
    }

    fn on_finished(&mut self, completed: usize) {
        self.bar.finish_with_message("Completed");
        self.log.on_finished(completed);
    }

    fn on_aborted(&mut self, row_index: Option<usize>, completed: usize) {
        self.bar.abandon_with_message("Aborted");
        self.log.on_aborted(row_index, completed);
    }
}
