//! Terminal progress for batch runs: a bar fed by core progress events and a
//! summary table once the batch is done.

use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use lumalpha_core::{BatchReport, BatchStatus, Progress, ProgressObserver};

/// Drives an indicatif bar from batch progress events.
pub struct BarObserver {
    bar: ProgressBar,
    start: Instant,
}

impl BarObserver {
    /// Create a bar with an unknown length; the first event sets it.
    pub fn new() -> anyhow::Result<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
                )?
                .progress_chars("##-"),
        );
        bar.set_message("starting...");
        Ok(Self {
            bar,
            start: Instant::now(),
        })
    }

    /// Clear the bar from the terminal.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressObserver for BarObserver {
    fn on_progress(&self, progress: &Progress) {
        self.bar.set_length(progress.total as u64);
        self.bar.inc(1);

        if !progress.outcome.is_success() {
            self.bar.println(format!(
                "  failed: {} ({})",
                progress.outcome.source.display(),
                progress.outcome.outcome.detail()
            ));
        }

        let elapsed = self.start.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            let rate = (progress.index + 1) as f64 / elapsed;
            self.bar.set_message(format!("{:.1} img/sec", rate));
        }
    }
}

/// Print a formatted summary table after a batch run.
pub fn print_summary(report: &BatchReport) {
    let rate = if report.elapsed_seconds > 0.0 {
        report.total as f64 / report.elapsed_seconds
    } else {
        0.0
    };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Succeeded:    {:>8}", report.succeeded);
    if report.failed > 0 {
        eprintln!("    Failed:       {:>8}", report.failed);
    }
    if report.cancelled {
        eprintln!("    Not started:  {:>8}", report.requested - report.total);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", report.total);
    eprintln!("    Duration:     {:>7.1}s", report.elapsed_seconds);
    eprintln!("    Rate:         {:>7.1} img/sec", rate);
    eprintln!("    Status:       {:>8}", status_label(report.status()));
    eprintln!("  ====================================");
}

fn status_label(status: BatchStatus) -> &'static str {
    match status {
        BatchStatus::Succeeded => "ok",
        BatchStatus::CompletedWithErrors => "errors",
        BatchStatus::Cancelled => "cancelled",
    }
}
