mod support;

use async_trait::async_trait;
use project_filter::{FilterCommand, FilterConfig, FilterError, FilterPlanExecutor};
use project_filter_graph::{
    FaultPlan, InMemoryExplorer, InMemorySolution, ProjectSpec, SolutionSpec,
};
use project_filter_protocol::{
    FilterOptions, HostResult, ProjectGraphService, ProjectHandle, ProjectId, ProjectKind,
};
use std::collections::HashSet;
use std::sync::Arc;
use support::RecordingProgress;
use tokio::sync::Notify;

/// Holds every load until the test releases it.
struct GatedGraph {
    inner: Arc<InMemorySolution>,
    started: Notify,
    release: Notify,
}

#[async_trait]
impl ProjectGraphService for GatedGraph {
    async fn is_loaded(&self, id: &ProjectId) -> bool {
        self.inner.is_loaded(id).await
    }

    async fn project_kind(&self, id: &ProjectId) -> Option<ProjectKind> {
        self.inner.project_kind(id).await
    }

    async fn parent(&self, id: &ProjectId) -> Option<ProjectId> {
        self.inner.parent(id).await
    }

    async fn display_name(&self, id: &ProjectId) -> String {
        self.inner.display_name(id).await
    }

    async fn load(&self, id: &ProjectId) -> HostResult<()> {
        self.started.notify_one();
        self.release.notified().await;
        self.inner.load(id).await
    }

    async fn unload(&self, id: &ProjectId) -> HostResult<()> {
        self.inner.unload(id).await
    }

    async fn resolve_handle(&self, id: &ProjectId) -> Option<ProjectHandle> {
        self.inner.resolve_handle(id).await
    }

    async fn handle_to_id(&self, handle: ProjectHandle) -> Option<ProjectId> {
        self.inner.handle_to_id(handle).await
    }

    async fn recalculate_dependencies(&self) -> HostResult<()> {
        self.inner.recalculate_dependencies().await
    }

    async fn dependency_count(&self, handle: ProjectHandle) -> HostResult<usize> {
        self.inner.dependency_count(handle).await
    }

    async fn dependency_handles(
        &self,
        handle: ProjectHandle,
        count: usize,
    ) -> HostResult<Vec<ProjectHandle>> {
        self.inner.dependency_handles(handle, count).await
    }
}

fn solution() -> Arc<InMemorySolution> {
    let spec = SolutionSpec::new()
        .with(ProjectSpec::project("app"))
        .with(ProjectSpec::project("tests").loaded(true));
    Arc::new(InMemorySolution::from_spec(&spec).unwrap())
}

#[tokio::test]
async fn second_invocation_is_dropped_while_running() {
    let solution = solution();
    let graph = Arc::new(GatedGraph {
        inner: solution.clone(),
        started: Notify::new(),
        release: Notify::new(),
    });
    let explorer = Arc::new(InMemoryExplorer::new(solution.clone()));
    let command = Arc::new(FilterCommand::new(FilterPlanExecutor::new(
        graph.clone(),
        explorer,
        Arc::new(RecordingProgress::default()),
        FilterConfig::default(),
    )));

    let first = tokio::spawn({
        let command = command.clone();
        async move { command.run(&FilterOptions::new().load(["app"])).await }
    });

    graph.started.notified().await;
    assert!(command.is_running());

    let second = command
        .run(&FilterOptions::new().unload(["tests"]))
        .await
        .unwrap();
    assert!(second.skipped);

    graph.release.notify_one();
    let first = first.await.unwrap().unwrap();
    assert!(!first.skipped);
    assert_eq!(first.loaded, vec![ProjectId::new("app")]);
    assert!(!command.is_running());

    // The dropped request never reached the host
    assert!(solution.calls().await.unloads.is_empty());
    assert!(solution.is_loaded(&"tests".into()).await);
}

#[tokio::test]
async fn guard_is_released_after_a_fatal_error() {
    let solution = solution();
    solution
        .set_faults(FaultPlan {
            fatal_load: HashSet::from([ProjectId::new("app")]),
            ..FaultPlan::default()
        })
        .await;
    let command = FilterCommand::new(FilterPlanExecutor::new(
        solution.clone(),
        Arc::new(InMemoryExplorer::new(solution.clone())),
        Arc::new(RecordingProgress::default()),
        FilterConfig::default(),
    ));

    let err = command
        .run(&FilterOptions::new().load(["app"]))
        .await
        .unwrap_err();
    assert!(matches!(err, FilterError::Fatal { .. }));
    assert!(!command.is_running());

    solution.set_faults(FaultPlan::default()).await;
    let report = command
        .run(&FilterOptions::new().load(["app"]))
        .await
        .unwrap();
    assert_eq!(report.loaded, vec![ProjectId::new("app")]);
}
