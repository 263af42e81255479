use project_filter_protocol::{ProgressSink, ProgressSnapshot};
use std::sync::Arc;

/// Keeps the progress snapshot of one filter application and pushes every
/// change to the attached sink.
///
/// The tracker does not enforce monotonic progress. Callers keep the ratio
/// from visibly regressing by growing the planned total before recording the
/// completion that discovered the extra work.
pub struct ProgressTracker {
    sink: Arc<dyn ProgressSink>,
    snapshot: ProgressSnapshot,
}

impl ProgressTracker {
    pub fn new(sink: Arc<dyn ProgressSink>, message: impl Into<String>) -> Self {
        Self {
            sink,
            snapshot: ProgressSnapshot {
                message: message.into(),
                cancelable: true,
                ..ProgressSnapshot::default()
            },
        }
    }

    pub fn snapshot(&self) -> &ProgressSnapshot {
        &self.snapshot
    }

    pub fn set_detail_text(&mut self, text: impl Into<String>) {
        self.snapshot.detail_text = text.into();
        self.emit();
    }

    pub fn recompute_totals(
        &mut self,
        load_planned: usize,
        unload_planned: usize,
        load_done: usize,
        unload_done: usize,
    ) {
        self.snapshot.current = load_done + unload_done;
        self.snapshot.total = load_planned + unload_planned;
        self.snapshot.status_text = format!("{} of {}", self.snapshot.current, self.snapshot.total);
        self.emit();
    }

    pub fn is_cancelled(&self) -> bool {
        self.sink.is_cancelled()
    }

    fn emit(&self) {
        self.sink.report(&self.snapshot);
    }
}
