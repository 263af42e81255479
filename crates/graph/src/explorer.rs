use crate::solution::InMemorySolution;
use async_trait::async_trait;
use project_filter_protocol::{
    ExplorerSelection, HostError, HostResult, ProjectExplorerView, ProjectId,
};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex as TokioMutex;

/// Node id of the solution root in the explorer tree.
pub const SOLUTION_ROOT: &str = "<solution>";

/// Name of the explorer pane, active after `select_root`.
pub const EXPLORER_PANE: &str = "Solution Explorer";

/// Explorer command, as recorded by [`InMemoryExplorer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplorerCommand {
    SelectRoot,
    SetSelection(Vec<ProjectId>),
    ShowAll,
    UnhideFolders,
    HideUnloaded,
    Expand(ProjectId),
}

#[derive(Debug, Default)]
struct ExplorerState {
    selection: ExplorerSelection,
    hidden: HashSet<ProjectId>,
    expanded: HashSet<ProjectId>,

    /// Nodes the view has not caught up with yet
    lagging: HashSet<ProjectId>,

    commands: Vec<ExplorerCommand>,
}

/// Explorer tree over an [`InMemorySolution`].
///
/// Visibility commands need a non-empty selection, like the real tree view.
pub struct InMemoryExplorer {
    solution: Arc<InMemorySolution>,
    state: TokioMutex<ExplorerState>,
}

impl InMemoryExplorer {
    pub fn new(solution: Arc<InMemorySolution>) -> Self {
        Self {
            solution,
            state: TokioMutex::new(ExplorerState::default()),
        }
    }

    /// Start with the given selection and active pane.
    pub async fn focus(&self, items: Vec<ProjectId>, active_pane: Option<&str>) {
        let mut state = self.state.lock().await;
        state.selection = ExplorerSelection {
            items,
            active_pane: active_pane.map(str::to_string),
        };
    }

    /// Pretend the view has not materialized a node yet.
    pub async fn mark_lagging(&self, id: impl Into<ProjectId>) {
        self.state.lock().await.lagging.insert(id.into());
    }

    pub async fn hide(&self, id: impl Into<ProjectId>) {
        self.state.lock().await.hidden.insert(id.into());
    }

    pub async fn is_visible(&self, id: &ProjectId) -> bool {
        !self.state.lock().await.hidden.contains(id)
    }

    pub async fn is_expanded(&self, id: &ProjectId) -> bool {
        self.state.lock().await.expanded.contains(id)
    }

    pub async fn commands(&self) -> Vec<ExplorerCommand> {
        self.state.lock().await.commands.clone()
    }

    pub async fn current_selection(&self) -> ExplorerSelection {
        self.state.lock().await.selection.clone()
    }

    async fn known(&self, id: &ProjectId) -> bool {
        id.as_str() == SOLUTION_ROOT || self.solution.contains(id).await
    }
}

impl ExplorerState {
    fn require_selection(&self, command: &str) -> HostResult<()> {
        if self.selection.items.is_empty() {
            return Err(HostError::failed(format!(
                "{command}: command requires a selected node"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ProjectExplorerView for InMemoryExplorer {
    async fn selection(&self) -> HostResult<ExplorerSelection> {
        Ok(self.state.lock().await.selection.clone())
    }

    async fn set_selection(&self, selection: &ExplorerSelection) -> HostResult<()> {
        let mut items = Vec::with_capacity(selection.items.len());
        for item in &selection.items {
            // Selecting a node that vanished is silently dropped by the view
            if self.known(item).await {
                items.push(item.clone());
            }
        }
        let mut state = self.state.lock().await;
        state.commands.push(ExplorerCommand::SetSelection(items.clone()));
        state.selection = ExplorerSelection {
            items,
            active_pane: selection.active_pane.clone(),
        };
        Ok(())
    }

    async fn select_root(&self) -> HostResult<()> {
        let mut state = self.state.lock().await;
        state.commands.push(ExplorerCommand::SelectRoot);
        state.selection = ExplorerSelection {
            items: vec![ProjectId::new(SOLUTION_ROOT)],
            active_pane: Some(EXPLORER_PANE.to_string()),
        };
        Ok(())
    }

    async fn show_all(&self) -> HostResult<()> {
        let mut state = self.state.lock().await;
        state.require_selection("show_all")?;
        state.commands.push(ExplorerCommand::ShowAll);
        state.hidden.clear();
        Ok(())
    }

    async fn unhide_folders(&self) -> HostResult<()> {
        let mut folders = HashSet::new();
        for entry in self.solution.tree().await {
            if entry.kind.is_folder() {
                folders.insert(entry.id);
            }
        }
        let mut state = self.state.lock().await;
        state.require_selection("unhide_folders")?;
        state.commands.push(ExplorerCommand::UnhideFolders);
        state.hidden.retain(|id| !folders.contains(id));
        Ok(())
    }

    async fn hide_unloaded(&self) -> HostResult<()> {
        let unloaded = self.solution.unloaded_nodes().await;
        let mut state = self.state.lock().await;
        state.require_selection("hide_unloaded")?;
        state.commands.push(ExplorerCommand::HideUnloaded);
        state.hidden.extend(unloaded);
        Ok(())
    }

    async fn expand(&self, id: &ProjectId) -> HostResult<()> {
        let known = self.known(id).await;
        let mut state = self.state.lock().await;
        if !known || state.lagging.contains(id) {
            return Err(HostError::not_found(format!("no explorer node for {id}")));
        }
        state.commands.push(ExplorerCommand::Expand(id.clone()));
        state.expanded.insert(id.clone());
        Ok(())
    }
}
