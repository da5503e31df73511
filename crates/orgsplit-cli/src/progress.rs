//! Progress bars for fan-out batches.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use orgsplit_core::{NoProgress, ProgressReporter};

const BAR_TEMPLATE: &str = "{msg:<28} [{elapsed_precise}] {bar:40.green/white} {pos}/{len}";

/// Progress reporter drawing an indicatif bar on stderr.
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    /// Create a hidden-until-started bar labelled with `label`.
    #[must_use]
    pub fn new(label: &str) -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr());
        if let Ok(style) = ProgressStyle::with_template(BAR_TEMPLATE) {
            bar.set_style(style.progress_chars("=>-"));
        }
        bar.set_message(label.to_string());
        Self { bar }
    }
}

impl ProgressReporter for BarProgress {
    fn start(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(0);
    }

    fn advance(&self, completed: usize, _total: usize) {
        self.bar.set_position(completed as u64);
    }

    fn finish(&self) {
        self.bar.finish();
    }
}

/// Reporter for one batch: a bar when enabled, otherwise silent.
#[must_use]
pub fn batch_progress(label: &str, enabled: bool) -> Box<dyn ProgressReporter> {
    if enabled {
        Box::new(BarProgress::new(label))
    } else {
        Box::new(NoProgress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_tracks_completed_items() {
        let progress = BarProgress::new("Fetching networks");
        progress.start(25);
        progress.advance(10, 25);
        assert_eq!(progress.bar.length(), Some(25));
        assert_eq!(progress.bar.position(), 10);
        progress.finish();
        assert!(progress.bar.is_finished());
    }
}
