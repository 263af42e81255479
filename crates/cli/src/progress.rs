use indicatif::{ProgressBar, ProgressStyle};
use project_filter_protocol::{CancellationFlag, ProgressSink, ProgressSnapshot};

const TEMPLATE: &str = "{prefix} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}";

/// Progress bar on stderr. Cancellation is requested through the flag
/// handed out by [`TerminalProgress::cancellation`].
pub struct TerminalProgress {
    bar: ProgressBar,
    cancel: CancellationFlag,
}

impl TerminalProgress {
    pub fn new(visible: bool) -> Self {
        let bar = if visible {
            ProgressBar::new(0)
        } else {
            ProgressBar::hidden()
        };
        match ProgressStyle::default_bar().template(TEMPLATE) {
            Ok(style) => bar.set_style(style.progress_chars("=> ")),
            Err(err) => log::debug!("Invalid progress template: {err}"),
        }
        Self {
            bar,
            cancel: CancellationFlag::new(),
        }
    }

    pub fn cancellation(&self) -> CancellationFlag {
        self.cancel.clone()
    }
}

impl ProgressSink for TerminalProgress {
    fn begin(&self, title: &str) {
        self.bar.set_prefix(title.to_string());
        self.bar.reset();
    }

    fn report(&self, snapshot: &ProgressSnapshot) {
        self.bar.set_length(snapshot.total as u64);
        self.bar.set_position(snapshot.current as u64);
        self.bar.set_message(snapshot.detail_text.clone());
    }

    fn end(&self) {
        self.bar.finish_and_clear();
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
