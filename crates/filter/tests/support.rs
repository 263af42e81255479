#![allow(dead_code)]

use project_filter::{FilterConfig, FilterPlanExecutor};
use project_filter_graph::{InMemoryExplorer, InMemorySolution, SolutionSpec};
use project_filter_protocol::{CancellationFlag, ProgressSink, ProgressSnapshot, ProjectId};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Progress sink that records every snapshot and can cancel itself once a
/// given number of operations has completed or a given detail text shows up.
#[derive(Default)]
pub struct RecordingProgress {
    snapshots: Mutex<Vec<ProgressSnapshot>>,
    cancel: CancellationFlag,
    cancel_at: Mutex<Option<usize>>,
    cancel_at_detail: Mutex<Option<String>>,
    begun: AtomicUsize,
    ended: AtomicUsize,
}

impl RecordingProgress {
    pub fn cancel_when_current_reaches(&self, current: usize) {
        *self.cancel_at.lock().unwrap() = Some(current);
    }

    pub fn cancel_when_detail_is(&self, text: &str) {
        *self.cancel_at_detail.lock().unwrap() = Some(text.to_string());
    }

    pub fn snapshots(&self) -> Vec<ProgressSnapshot> {
        self.snapshots.lock().unwrap().clone()
    }

    pub fn begun(&self) -> usize {
        self.begun.load(Ordering::SeqCst)
    }

    pub fn ended(&self) -> usize {
        self.ended.load(Ordering::SeqCst)
    }
}

impl ProgressSink for RecordingProgress {
    fn begin(&self, _title: &str) {
        self.begun.fetch_add(1, Ordering::SeqCst);
    }

    fn report(&self, snapshot: &ProgressSnapshot) {
        self.snapshots.lock().unwrap().push(snapshot.clone());
        if let Some(limit) = *self.cancel_at.lock().unwrap() {
            if snapshot.current >= limit {
                self.cancel.cancel();
            }
        }
        if let Some(text) = self.cancel_at_detail.lock().unwrap().as_deref() {
            if snapshot.detail_text == text {
                self.cancel.cancel();
            }
        }
    }

    fn end(&self) {
        self.ended.fetch_add(1, Ordering::SeqCst);
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

pub struct Harness {
    pub solution: Arc<InMemorySolution>,
    pub explorer: Arc<InMemoryExplorer>,
    pub progress: Arc<RecordingProgress>,
    pub executor: FilterPlanExecutor,
}

pub fn harness(spec: SolutionSpec) -> Harness {
    let _ = env_logger::builder().is_test(true).try_init();

    let solution = Arc::new(InMemorySolution::from_spec(&spec).expect("valid solution"));
    let explorer = Arc::new(InMemoryExplorer::new(solution.clone()));
    let progress = Arc::new(RecordingProgress::default());
    let executor = FilterPlanExecutor::new(
        solution.clone(),
        explorer.clone(),
        progress.clone(),
        FilterConfig::default(),
    );
    Harness {
        solution,
        explorer,
        progress,
        executor,
    }
}

pub fn ids(raw: &[&str]) -> Vec<ProjectId> {
    raw.iter().map(|id| ProjectId::new(*id)).collect()
}
