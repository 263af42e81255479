use crate::{ExplorerSelection, HostResult, ProgressSnapshot, ProjectHandle, ProjectId, ProjectKind};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The host's solution model.
///
/// Every mutation is issued sequentially by the engine; implementations do
/// not need to tolerate concurrent load/unload calls.
#[async_trait]
pub trait ProjectGraphService: Send + Sync {
    /// Unknown ids report `false`.
    async fn is_loaded(&self, id: &ProjectId) -> bool;

    async fn project_kind(&self, id: &ProjectId) -> Option<ProjectKind>;

    /// Parent folder (or `None` for top-level nodes and unknown ids)
    async fn parent(&self, id: &ProjectId) -> Option<ProjectId>;

    async fn display_name(&self, id: &ProjectId) -> String;

    async fn load(&self, id: &ProjectId) -> HostResult<()>;

    async fn unload(&self, id: &ProjectId) -> HostResult<()>;

    /// Live handle of a loaded project; `None` for stubs, folders and unknown ids.
    async fn resolve_handle(&self, id: &ProjectId) -> Option<ProjectHandle>;

    async fn handle_to_id(&self, handle: ProjectHandle) -> Option<ProjectId>;

    /// Rebuild the host's build-dependency view.
    async fn recalculate_dependencies(&self) -> HostResult<()>;

    async fn dependency_count(&self, handle: ProjectHandle) -> HostResult<usize>;

    /// Fetch up to `count` dependency handles, as last calculated.
    async fn dependency_handles(
        &self,
        handle: ProjectHandle,
        count: usize,
    ) -> HostResult<Vec<ProjectHandle>>;
}

/// Progress UI attached to one filter application.
pub trait ProgressSink: Send + Sync {
    /// Called once before the first report.
    fn begin(&self, _title: &str) {}

    fn report(&self, snapshot: &ProgressSnapshot);

    /// Called once after the last report, on every exit path.
    fn end(&self) {}

    fn is_cancelled(&self) -> bool;
}

/// The project explorer tree.
#[async_trait]
pub trait ProjectExplorerView: Send + Sync {
    async fn selection(&self) -> HostResult<ExplorerSelection>;

    async fn set_selection(&self, selection: &ExplorerSelection) -> HostResult<()>;

    /// Select the solution root node and activate the explorer pane.
    async fn select_root(&self) -> HostResult<()>;

    async fn show_all(&self) -> HostResult<()>;

    async fn unhide_folders(&self) -> HostResult<()>;

    async fn hide_unloaded(&self) -> HostResult<()>;

    /// Expand one node; `NotFound` when the view does not know it (yet).
    async fn expand(&self, id: &ProjectId) -> HostResult<()>;
}

/// Cooperative cancellation signal shared between a progress UI and the engine.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
