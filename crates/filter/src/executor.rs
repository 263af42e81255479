use crate::config::FilterConfig;
use crate::dependencies::DependencyResolver;
use crate::error::{FilterError, Result};
use crate::progress::ProgressTracker;
use crate::reconcile::ViewReconciler;
use crate::state::FilterState;
use project_filter_protocol::{
    FilterOptions, FilterReport, HostError, HostErrorKind, ProgressSink, ProjectExplorerView,
    ProjectGraphService, ProjectId, ProjectKind,
};
use std::collections::HashSet;
use std::sync::Arc;

/// Applies a [`FilterOptions`] request to the host's project graph.
///
/// ```text
/// plan ──> unload (request order) ──> load (request order, dependencies
///   │                                  walked depth-first)
///   └── selection captured            ──> reconcile view ──> expand folders
/// ```
///
/// Cancellation is polled between project operations. Work already done
/// stays done; the explorer view is reconciled on every non-fatal exit.
pub struct FilterPlanExecutor {
    graph: Arc<dyn ProjectGraphService>,
    progress: Arc<dyn ProgressSink>,
    resolver: DependencyResolver,
    reconciler: ViewReconciler,
    config: FilterConfig,
}

impl FilterPlanExecutor {
    pub fn new(
        graph: Arc<dyn ProjectGraphService>,
        view: Arc<dyn ProjectExplorerView>,
        progress: Arc<dyn ProgressSink>,
        config: FilterConfig,
    ) -> Self {
        Self {
            resolver: DependencyResolver::new(graph.clone()),
            reconciler: ViewReconciler::new(view, graph.clone()),
            graph,
            progress,
            config,
        }
    }

    pub async fn apply(&self, options: &FilterOptions) -> Result<FilterReport> {
        if options.is_empty() {
            log::debug!("Nothing to filter");
            return Ok(FilterReport::skipped());
        }

        // Load state changes alter what the selection API reports
        let previous_selection = self.reconciler.capture_selection().await?;

        let mut state = FilterState::new(ProgressTracker::new(
            self.progress.clone(),
            self.config.progress_title.clone(),
        ));
        self.progress.begin(&self.config.progress_title);
        let outcome = self.execute(options, &mut state).await;
        self.progress.end();
        outcome?;

        self.reconciler
            .show_only_loaded_projects(previous_selection.as_ref())
            .await?;

        let report = state.into_report();
        if options.expand_loaded_projects && !report.loaded.is_empty() {
            self.reconciler.expand_ancestors(&report.loaded).await?;
        }

        log::info!(
            "Project filter finished: {} loaded, {} unloaded, {} failed{}",
            report.loaded.len(),
            report.unloaded.len(),
            report.failed.len(),
            if report.cancelled { " (cancelled)" } else { "" }
        );
        Ok(report)
    }

    async fn execute(&self, options: &FilterOptions, state: &mut FilterState) -> Result<()> {
        let unload_requested: HashSet<&ProjectId> = options.projects_to_unload.iter().collect();

        self.plan(options, &unload_requested, state).await?;
        log::info!(
            "Filtering projects: {} to unload, {} to load",
            state.planned_unloads(),
            state.planned_loads()
        );

        for id in &options.projects_to_unload {
            if state.check_cancelled() {
                return Ok(());
            }
            if self.graph.is_loaded(id).await {
                let name = self.graph.display_name(id).await;
                state.set_detail_text(format!("Unloading {name}..."));
                if let Err(err) = self.graph.unload(id).await {
                    absorb(err, "unload", id, &name, state)?;
                }
            }
            state.record_unloaded(id);
        }

        for id in &options.projects_to_load {
            if state.check_cancelled() {
                return Ok(());
            }
            if unload_requested.contains(id) {
                log::debug!("{id} is requested for both load and unload; keeping it unloaded");
                continue;
            }
            self.load_project(id, options.load_dependencies, state).await?;
        }

        Ok(())
    }

    /// Seed the plan with the requests that actually change something.
    async fn plan(
        &self,
        options: &FilterOptions,
        unload_requested: &HashSet<&ProjectId>,
        state: &mut FilterState,
    ) -> Result<()> {
        for id in &options.projects_to_unload {
            if self.graph.is_loaded(id).await {
                state.plan_unload(id.clone());
            }
        }

        for id in &options.projects_to_load {
            if unload_requested.contains(id) || !self.is_loadable(id).await {
                continue;
            }
            if !self.graph.is_loaded(id).await {
                state.plan_load(id.clone());
            }
        }

        // The loader only resolves dependencies of projects it visits; an
        // already loaded request would otherwise contribute nothing to the total.
        if options.load_dependencies {
            for id in &options.projects_to_load {
                if unload_requested.contains(id) || !self.graph.is_loaded(id).await {
                    continue;
                }
                for dependency in self.resolver.dependencies(id, state).await? {
                    if !self.graph.is_loaded(&dependency).await {
                        state.plan_load(dependency);
                    }
                }
            }
        }

        state.update_progress();
        Ok(())
    }

    /// Load `root` and, when asked, everything it transitively depends on.
    ///
    /// Depth-first pre-order over an explicit stack. A project is marked
    /// visited before its dependencies are pushed, which also breaks cycles.
    /// Dependencies are always walked with dependency loading enabled.
    async fn load_project(
        &self,
        root: &ProjectId,
        load_dependencies: bool,
        state: &mut FilterState,
    ) -> Result<()> {
        let mut stack = vec![(root.clone(), load_dependencies)];
        let mut is_root = true;

        while let Some((id, with_dependencies)) = stack.pop() {
            // The caller polled cancellation right before the root
            if !is_root && state.check_cancelled() {
                break;
            }
            is_root = false;

            if !state.mark_visited(&id) {
                continue;
            }
            let Some(kind) = self.loadable_kind(&id).await else {
                log::debug!("Skipping {id}: not a loadable project");
                continue;
            };

            let mut just_loaded = false;
            if !self.graph.is_loaded(&id).await {
                let name = self.graph.display_name(&id).await;
                state.set_detail_text(format!("Loading {name}..."));
                if let Err(err) = self.graph.load(&id).await {
                    absorb(err, "load", &id, &name, state)?;
                }
                just_loaded = true;
                // Shared projects add no build edges of their own
                if kind != ProjectKind::SharedProject {
                    state.mark_dependencies_dirty();
                }
            }

            // Loaded but not yet recorded; the outer loop stops as well
            if state.check_cancelled() {
                break;
            }

            // Grow the total before counting this project as done, so the
            // ratio never climbs and then falls back when work is discovered.
            let mut dependencies = Vec::new();
            if with_dependencies {
                dependencies = self.resolver.dependencies(&id, state).await?;
                let mut discovered = false;
                for dependency in &dependencies {
                    if !self.graph.is_loaded(dependency).await {
                        discovered |= state.plan_load(dependency.clone());
                    }
                }
                if discovered {
                    state.update_progress();
                }
            }

            if just_loaded {
                state.record_loaded(&id);
            }

            for dependency in dependencies.into_iter().rev() {
                stack.push((dependency, true));
            }
        }

        Ok(())
    }

    async fn loadable_kind(&self, id: &ProjectId) -> Option<ProjectKind> {
        self.graph
            .project_kind(id)
            .await
            .filter(|kind| !kind.is_folder())
    }

    async fn is_loadable(&self, id: &ProjectId) -> bool {
        self.loadable_kind(id).await.is_some()
    }
}

fn absorb(
    err: HostError,
    operation: &'static str,
    id: &ProjectId,
    name: &str,
    state: &mut FilterState,
) -> Result<()> {
    match err.kind {
        HostErrorKind::Fatal => Err(FilterError::fatal(operation, name, err)),
        HostErrorKind::NotFound => {
            log::debug!("Cannot {operation} {name}: {err}");
            Ok(())
        }
        HostErrorKind::Failed => {
            log::warn!("Failed to {operation} {name}: {err}");
            state.record_failure(id, operation, &err);
            Ok(())
        }
    }
}
