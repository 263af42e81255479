use crate::error::{FilterError, Result};
use project_filter_protocol::{
    ExplorerSelection, HostError, HostErrorKind, ProjectExplorerView, ProjectGraphService,
    ProjectId,
};
use std::collections::HashSet;
use std::sync::Arc;

/// Brings the explorer tree in line with the load state after a filter run.
pub struct ViewReconciler {
    view: Arc<dyn ProjectExplorerView>,
    graph: Arc<dyn ProjectGraphService>,
}

impl ViewReconciler {
    pub fn new(view: Arc<dyn ProjectExplorerView>, graph: Arc<dyn ProjectGraphService>) -> Self {
        Self { view, graph }
    }

    /// Must run before any load state changes.
    pub async fn capture_selection(&self) -> Result<Option<ExplorerSelection>> {
        match self.view.selection().await {
            Ok(selection) => Ok(Some(selection)),
            Err(err) => {
                absorb(err, "capture selection", "explorer")?;
                Ok(None)
            }
        }
    }

    /// Show everything, drop stale hidden folders, then hide unloaded
    /// projects. The three steps only produce a consistent tree in this order.
    pub async fn show_only_loaded_projects(
        &self,
        previous: Option<&ExplorerSelection>,
    ) -> Result<()> {
        // The visibility commands act on the current selection
        if let Err(err) = self.view.select_root().await {
            absorb(err, "select", "solution root")?;
        }

        if let Err(err) = self.view.show_all().await {
            absorb(err, "show all", "explorer")?;
        }
        if let Err(err) = self.view.unhide_folders().await {
            absorb(err, "unhide folders", "explorer")?;
        }
        if let Err(err) = self.view.hide_unloaded().await {
            absorb(err, "hide unloaded projects", "explorer")?;
        }

        if let Some(previous) = previous {
            if let Err(err) = self.view.set_selection(previous).await {
                absorb(err, "restore selection", "explorer")?;
            }
        }
        Ok(())
    }

    /// Expand the folders leading to each project, root-most first.
    ///
    /// A node the view cannot locate ends the walk for that project only.
    /// Returns the number of folders expanded.
    pub async fn expand_ancestors(&self, projects: &[ProjectId]) -> Result<usize> {
        let mut expanded: HashSet<ProjectId> = HashSet::new();

        for project in projects {
            let chain = self.ancestor_chain(project).await;
            for folder in chain {
                if expanded.contains(&folder) {
                    continue;
                }
                match self.view.expand(&folder).await {
                    Ok(()) => {
                        expanded.insert(folder);
                    }
                    Err(err) if err.is_fatal() => {
                        return Err(FilterError::fatal("expand", folder.to_string(), err));
                    }
                    Err(err) => {
                        log::debug!("Skipping expansion of {project} at {folder}: {err}");
                        break;
                    }
                }
            }
        }

        Ok(expanded.len())
    }

    async fn ancestor_chain(&self, project: &ProjectId) -> Vec<ProjectId> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self.graph.parent(project).await;
        while let Some(parent) = current {
            if !seen.insert(parent.clone()) {
                break;
            }
            current = self.graph.parent(&parent).await;
            chain.push(parent);
        }
        chain.reverse();
        chain
    }
}

fn absorb(err: HostError, operation: &'static str, target: &str) -> Result<()> {
    match err.kind {
        HostErrorKind::Fatal => Err(FilterError::fatal(operation, target, err)),
        HostErrorKind::NotFound => {
            log::debug!("Cannot {operation} ({target}): {err}");
            Ok(())
        }
        HostErrorKind::Failed => {
            log::warn!("Failed to {operation} ({target}): {err}");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use project_filter_graph::{
        ExplorerCommand, InMemoryExplorer, InMemorySolution, ProjectSpec, SolutionSpec,
        EXPLORER_PANE,
    };
    use pretty_assertions::assert_eq;

    fn setup() -> (Arc<InMemorySolution>, Arc<InMemoryExplorer>, ViewReconciler) {
        let spec = SolutionSpec::new()
            .with(ProjectSpec::folder("src"))
            .with(ProjectSpec::folder("libs").in_folder("src"))
            .with(ProjectSpec::project("core").in_folder("libs").loaded(true))
            .with(ProjectSpec::project("util").in_folder("libs"))
            .with(ProjectSpec::folder("tools"))
            .with(ProjectSpec::project("gen").in_folder("tools"))
            .with(ProjectSpec::project("app").loaded(true));
        let solution = Arc::new(InMemorySolution::from_spec(&spec).unwrap());
        let explorer = Arc::new(InMemoryExplorer::new(solution.clone()));
        let reconciler = ViewReconciler::new(explorer.clone(), solution.clone());
        (solution, explorer, reconciler)
    }

    #[tokio::test]
    async fn visibility_is_reset_in_order_and_selection_restored() {
        let (_, explorer, reconciler) = setup();
        explorer.focus(vec!["app".into()], Some("Editor")).await;
        let previous = reconciler.capture_selection().await.unwrap();

        reconciler
            .show_only_loaded_projects(previous.as_ref())
            .await
            .unwrap();

        assert_eq!(
            explorer.commands().await,
            vec![
                ExplorerCommand::SelectRoot,
                ExplorerCommand::ShowAll,
                ExplorerCommand::UnhideFolders,
                ExplorerCommand::HideUnloaded,
                ExplorerCommand::SetSelection(vec!["app".into()]),
            ]
        );
        assert!(!explorer.is_visible(&"util".into()).await);
        assert!(!explorer.is_visible(&"tools".into()).await);
        assert!(explorer.is_visible(&"libs".into()).await);
        let selection = explorer.current_selection().await;
        assert_eq!(selection.active_pane.as_deref(), Some("Editor"));
    }

    #[tokio::test]
    async fn without_previous_selection_root_stays_selected() {
        let (_, explorer, reconciler) = setup();
        reconciler.show_only_loaded_projects(None).await.unwrap();
        let selection = explorer.current_selection().await;
        assert_eq!(selection.active_pane.as_deref(), Some(EXPLORER_PANE));
    }

    #[tokio::test]
    async fn ancestors_expand_root_first_once() {
        let (_, explorer, reconciler) = setup();
        let expanded = reconciler
            .expand_ancestors(&["core".into(), "util".into(), "app".into()])
            .await
            .unwrap();

        assert_eq!(expanded, 2);
        assert_eq!(
            explorer.commands().await,
            vec![
                ExplorerCommand::Expand("src".into()),
                ExplorerCommand::Expand("libs".into()),
            ]
        );
    }

    #[tokio::test]
    async fn lagging_nodes_are_skipped() {
        let (_, explorer, reconciler) = setup();
        explorer.mark_lagging("src").await;

        let expanded = reconciler
            .expand_ancestors(&["core".into(), "gen".into()])
            .await
            .unwrap();

        assert_eq!(expanded, 1);
        assert!(!explorer.is_expanded(&"libs".into()).await);
        assert!(explorer.is_expanded(&"tools".into()).await);
    }
}
