use crate::error::{FilterError, Result};
use crate::state::FilterState;
use project_filter_protocol::{HostError, HostErrorKind, ProjectGraphService, ProjectId};
use std::collections::HashSet;
use std::sync::Arc;

/// Direct build dependencies of a project, read from the host's dependency
/// view and recalculated lazily when the state says the view is stale.
///
/// Host failures degrade to "no dependencies"; only fatal errors propagate.
pub struct DependencyResolver {
    graph: Arc<dyn ProjectGraphService>,
}

impl DependencyResolver {
    pub fn new(graph: Arc<dyn ProjectGraphService>) -> Self {
        Self { graph }
    }

    /// Dependencies of `id` in host order, without duplicates.
    pub async fn dependencies(
        &self,
        id: &ProjectId,
        state: &mut FilterState,
    ) -> Result<Vec<ProjectId>> {
        // Cleared even on failure: a stale view is an acceptable result
        if state.take_dependencies_dirty() {
            state.record_recalculation();
            if let Err(err) = self.graph.recalculate_dependencies().await {
                absorb(err, "recalculate dependencies", "solution")?;
            }
        }

        let Some(handle) = self.graph.resolve_handle(id).await else {
            return Ok(Vec::new());
        };

        let count = match self.graph.dependency_count(handle).await {
            Ok(count) => count,
            Err(err) => {
                let name = self.graph.display_name(id).await;
                absorb(err, "count dependencies", &name)?;
                return Ok(Vec::new());
            }
        };
        if count == 0 {
            return Ok(Vec::new());
        }

        let handles = match self.graph.dependency_handles(handle, count).await {
            Ok(handles) => handles,
            Err(err) => {
                let name = self.graph.display_name(id).await;
                absorb(err, "get dependencies", &name)?;
                return Ok(Vec::new());
            }
        };

        let mut seen = HashSet::new();
        let mut dependencies = Vec::with_capacity(handles.len());
        for handle in handles {
            let Some(dependency) = self.graph.handle_to_id(handle).await else {
                continue;
            };
            if seen.insert(dependency.clone()) {
                dependencies.push(dependency);
            }
        }

        log::debug!("{id} depends on {} project(s)", dependencies.len());
        Ok(dependencies)
    }
}

fn absorb(err: HostError, operation: &'static str, target: &str) -> Result<()> {
    match err.kind {
        HostErrorKind::Fatal => Err(FilterError::fatal(operation, target, err)),
        HostErrorKind::NotFound => {
            log::debug!("Cannot {operation} for {target}: {err}");
            Ok(())
        }
        HostErrorKind::Failed => {
            log::warn!("Failed to {operation} for {target}: {err}");
            Ok(())
        }
    }
}
