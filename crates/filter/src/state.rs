use crate::progress::ProgressTracker;
use project_filter_protocol::{FailedOperation, FilterReport, HostError, ProjectId};
use std::collections::HashSet;

/// Mutable bookkeeping of one filter application. Never reused.
pub struct FilterState {
    /// Grows as dependencies are discovered
    projects_to_load: HashSet<ProjectId>,
    loaded_projects: HashSet<ProjectId>,
    projects_to_unload: HashSet<ProjectId>,
    unloaded_projects: HashSet<ProjectId>,

    /// Only grows; a project is marked before any of its dependencies are walked
    visited_while_loading: HashSet<ProjectId>,

    /// The host's dependency view must be recalculated before the next query
    dependency_graph_dirty: bool,

    progress: ProgressTracker,
    cancelled: bool,
    loaded_order: Vec<ProjectId>,
    unloaded_order: Vec<ProjectId>,
    failed: Vec<FailedOperation>,
    dependency_recalculations: usize,
}

impl FilterState {
    pub fn new(progress: ProgressTracker) -> Self {
        Self {
            projects_to_load: HashSet::new(),
            loaded_projects: HashSet::new(),
            projects_to_unload: HashSet::new(),
            unloaded_projects: HashSet::new(),
            visited_while_loading: HashSet::new(),
            dependency_graph_dirty: true,
            progress,
            cancelled: false,
            loaded_order: Vec::new(),
            unloaded_order: Vec::new(),
            failed: Vec::new(),
            dependency_recalculations: 0,
        }
    }

    pub fn plan_load(&mut self, id: ProjectId) -> bool {
        self.projects_to_load.insert(id)
    }

    pub fn plan_unload(&mut self, id: ProjectId) -> bool {
        self.projects_to_unload.insert(id)
    }

    /// Loading a project invalidates the host's dependency view.
    pub fn mark_dependencies_dirty(&mut self) {
        self.dependency_graph_dirty = true;
    }

    /// Returns whether a recalculation is due, and clears the flag.
    pub fn take_dependencies_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dependency_graph_dirty)
    }

    /// Returns `false` when the project was already visited.
    pub fn mark_visited(&mut self, id: &ProjectId) -> bool {
        self.visited_while_loading.insert(id.clone())
    }

    pub fn record_loaded(&mut self, id: &ProjectId) {
        // loaded ⊆ to-load, even for projects that were loaded when planning began
        self.projects_to_load.insert(id.clone());
        if self.loaded_projects.insert(id.clone()) {
            self.loaded_order.push(id.clone());
        }
        self.update_progress();
    }

    pub fn record_unloaded(&mut self, id: &ProjectId) {
        if !self.projects_to_unload.contains(id) {
            return;
        }
        if self.unloaded_projects.insert(id.clone()) {
            self.unloaded_order.push(id.clone());
        }
        self.update_progress();
    }

    pub fn record_failure(&mut self, id: &ProjectId, operation: &str, error: &HostError) {
        self.failed.push(FailedOperation {
            project: id.clone(),
            operation: operation.to_string(),
            message: error.message.clone(),
        });
    }

    pub fn record_recalculation(&mut self) {
        self.dependency_recalculations += 1;
    }

    pub fn update_progress(&mut self) {
        self.progress.recompute_totals(
            self.projects_to_load.len(),
            self.projects_to_unload.len(),
            self.loaded_projects.len(),
            self.unloaded_projects.len(),
        );
    }

    pub fn set_detail_text(&mut self, text: impl Into<String>) {
        self.progress.set_detail_text(text);
    }

    /// Polls the progress UI; once cancelled, stays cancelled.
    pub fn check_cancelled(&mut self) -> bool {
        if !self.cancelled && self.progress.is_cancelled() {
            log::info!("Project filter cancelled by user");
            self.cancelled = true;
        }
        self.cancelled
    }

    pub fn planned_loads(&self) -> usize {
        self.projects_to_load.len()
    }

    pub fn planned_unloads(&self) -> usize {
        self.projects_to_unload.len()
    }

    pub fn into_report(self) -> FilterReport {
        FilterReport {
            loaded: self.loaded_order,
            unloaded: self.unloaded_order,
            failed: self.failed,
            cancelled: self.cancelled,
            skipped: false,
            dependency_recalculations: self.dependency_recalculations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use project_filter_protocol::{ProgressSink, ProgressSnapshot};
    use std::sync::Arc;

    struct Silent;

    impl ProgressSink for Silent {
        fn report(&self, _snapshot: &ProgressSnapshot) {}

        fn is_cancelled(&self) -> bool {
            false
        }
    }

    fn state() -> FilterState {
        FilterState::new(ProgressTracker::new(Arc::new(Silent), "test"))
    }

    #[test]
    fn starts_dirty_and_unvisited() {
        let mut state = state();
        assert!(state.take_dependencies_dirty());
        assert!(!state.take_dependencies_dirty());
        state.mark_dependencies_dirty();
        assert!(state.take_dependencies_dirty());
        assert!(state.mark_visited(&"a".into()));
        assert!(!state.mark_visited(&"a".into()));
    }

    #[test]
    fn unplanned_unloads_are_not_counted() {
        let mut state = state();
        state.plan_unload("a".into());
        state.record_unloaded(&"b".into());
        state.record_unloaded(&"a".into());
        state.record_unloaded(&"a".into());

        let report = state.into_report();
        assert_eq!(report.unloaded, vec![ProjectId::new("a")]);
    }

    #[test]
    fn recorded_loads_are_always_planned() {
        let mut state = state();
        state.record_loaded(&"x".into());
        assert_eq!(state.planned_loads(), 1);
        state.record_loaded(&"x".into());

        let report = state.into_report();
        assert_eq!(report.loaded, vec![ProjectId::new("x")]);
        assert!(!report.cancelled);
    }
}
