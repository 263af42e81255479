use crate::error::Result;
use crate::types::{ProjectSpec, SolutionGraph, SolutionSpec};
use async_trait::async_trait;
use petgraph::graph::NodeIndex;
use project_filter_protocol::{
    HostError, HostResult, ProjectGraphService, ProjectHandle, ProjectId, ProjectKind,
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex as TokioMutex;

/// One row of the solution tree, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeEntry {
    pub id: ProjectId,
    pub name: String,
    pub kind: ProjectKind,
    pub depth: usize,
    pub loaded: bool,
}

/// Host calls observed by the in-memory solution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallLog {
    pub loads: Vec<ProjectId>,
    pub unloads: Vec<ProjectId>,
    pub recalculations: usize,
    pub dependency_queries: Vec<ProjectId>,
}

/// Injected host failures.
#[derive(Debug, Clone, Default)]
pub struct FaultPlan {
    pub fail_load: HashSet<ProjectId>,
    pub fatal_load: HashSet<ProjectId>,
    pub fail_unload: HashSet<ProjectId>,
    pub fail_dependency_query: HashSet<ProjectId>,
    pub fail_recalculate: bool,
}

struct SolutionState {
    graph: SolutionGraph,

    /// Dependency view as of the last recalculation
    calculated: HashMap<NodeIndex, Vec<NodeIndex>>,

    faults: FaultPlan,
    calls: CallLog,
}

/// Solution model held in memory, standing in for an IDE's project system.
///
/// Dependency information follows the host rules: edges are only known for
/// projects that were loaded at the last `recalculate_dependencies`, so a
/// freshly loaded project reports no dependencies until the next
/// recalculation.
pub struct InMemorySolution {
    name: Option<String>,
    state: TokioMutex<SolutionState>,
}

fn handle_for(idx: NodeIndex) -> ProjectHandle {
    ProjectHandle::new(idx.index() as u64)
}

fn node_for(handle: ProjectHandle) -> NodeIndex {
    NodeIndex::new(usize::try_from(handle.raw()).unwrap_or(usize::MAX))
}

impl InMemorySolution {
    pub fn from_spec(spec: &SolutionSpec) -> Result<Self> {
        let graph = SolutionGraph::from_spec(spec)?;
        Ok(Self {
            name: spec.name.clone(),
            state: TokioMutex::new(SolutionState {
                graph,
                calculated: HashMap::new(),
                faults: FaultPlan::default(),
                calls: CallLog::default(),
            }),
        })
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("Solution")
    }

    pub async fn set_faults(&self, faults: FaultPlan) {
        self.state.lock().await.faults = faults;
    }

    pub async fn calls(&self) -> CallLog {
        self.state.lock().await.calls.clone()
    }

    pub async fn loaded_projects(&self) -> Vec<ProjectId> {
        let state = self.state.lock().await;
        state
            .graph
            .nodes()
            .filter(|(_, node)| node.loaded)
            .map(|(_, node)| node.id.clone())
            .collect()
    }

    /// Projects and folders in depth-first display order
    pub async fn tree(&self) -> Vec<TreeEntry> {
        let state = self.state.lock().await;
        let mut entries = Vec::with_capacity(state.graph.node_count());
        let mut stack: Vec<(ProjectId, usize)> = state
            .graph
            .children(None)
            .into_iter()
            .rev()
            .map(|node| (node.id.clone(), 0))
            .collect();

        while let Some((id, depth)) = stack.pop() {
            let Some(node) = state.graph.node_by_id(&id) else {
                continue;
            };
            entries.push(TreeEntry {
                id: node.id.clone(),
                name: node.name.clone(),
                kind: node.kind,
                depth,
                loaded: node.loaded,
            });
            if node.kind.is_folder() {
                for child in state.graph.children(Some(&id)).into_iter().rev() {
                    stack.push((child.id.clone(), depth + 1));
                }
            }
        }

        entries
    }

    /// Current load state as a solution description, for writing back to disk.
    pub async fn to_spec(&self) -> SolutionSpec {
        let state = self.state.lock().await;
        let projects = state
            .graph
            .nodes()
            .map(|(idx, node)| ProjectSpec {
                id: node.id.clone(),
                name: (node.name != node.id.as_str()).then(|| node.name.clone()),
                kind: node.kind,
                parent: node.parent.clone(),
                loaded: node.loaded,
                dependencies: state
                    .graph
                    .dependencies(idx)
                    .into_iter()
                    .filter_map(|dep| state.graph.get_node(dep).map(|n| n.id.clone()))
                    .collect(),
            })
            .collect();
        SolutionSpec {
            name: self.name.clone(),
            projects,
        }
    }

    /// Declared (not calculated) transitive dependencies of a project
    pub async fn declared_closure(&self, id: &ProjectId) -> Vec<ProjectId> {
        let state = self.state.lock().await;
        let Some(start) = state.graph.find_node(id) else {
            return Vec::new();
        };
        state
            .graph
            .transitive_dependencies(start)
            .into_iter()
            .filter_map(|idx| state.graph.get_node(idx).map(|node| node.id.clone()))
            .collect()
    }

    pub(crate) async fn unloaded_nodes(&self) -> HashSet<ProjectId> {
        let state = self.state.lock().await;
        let mut hidden = HashSet::new();
        for (_, node) in state.graph.nodes() {
            let unloaded = if node.kind.is_folder() {
                state.graph.folder_fully_unloaded(&node.id)
            } else {
                !node.loaded
            };
            if unloaded {
                hidden.insert(node.id.clone());
            }
        }
        hidden
    }

    pub(crate) async fn contains(&self, id: &ProjectId) -> bool {
        self.state.lock().await.graph.find_node(id).is_some()
    }
}

impl SolutionState {
    fn set_loaded(&mut self, id: &ProjectId, loaded: bool, operation: &str) -> HostResult<()> {
        let idx = self
            .graph
            .find_node(id)
            .ok_or_else(|| HostError::not_found(format!("{operation}: unknown project {id}")))?;
        let node = self
            .graph
            .get_node_mut(idx)
            .ok_or_else(|| HostError::not_found(format!("{operation}: unknown project {id}")))?;
        if node.kind.is_folder() {
            return Err(HostError::failed(format!(
                "{operation}: {} is a solution folder",
                node.name
            )));
        }
        node.loaded = loaded;
        Ok(())
    }
}

#[async_trait]
impl ProjectGraphService for InMemorySolution {
    async fn is_loaded(&self, id: &ProjectId) -> bool {
        let state = self.state.lock().await;
        state.graph.node_by_id(id).is_some_and(|node| node.loaded)
    }

    async fn project_kind(&self, id: &ProjectId) -> Option<ProjectKind> {
        let state = self.state.lock().await;
        state.graph.node_by_id(id).map(|node| node.kind)
    }

    async fn parent(&self, id: &ProjectId) -> Option<ProjectId> {
        let state = self.state.lock().await;
        state.graph.node_by_id(id).and_then(|node| node.parent.clone())
    }

    async fn display_name(&self, id: &ProjectId) -> String {
        let state = self.state.lock().await;
        state
            .graph
            .node_by_id(id)
            .map(|node| node.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    async fn load(&self, id: &ProjectId) -> HostResult<()> {
        let mut state = self.state.lock().await;
        state.calls.loads.push(id.clone());
        if state.faults.fatal_load.contains(id) {
            return Err(HostError::fatal(format!("project system crashed loading {id}")));
        }
        if state.faults.fail_load.contains(id) {
            return Err(HostError::failed(format!("project file of {id} is invalid")));
        }
        state.set_loaded(id, true, "load")
    }

    async fn unload(&self, id: &ProjectId) -> HostResult<()> {
        let mut state = self.state.lock().await;
        state.calls.unloads.push(id.clone());
        if state.faults.fail_unload.contains(id) {
            return Err(HostError::failed(format!("{id} refused to unload")));
        }
        state.set_loaded(id, false, "unload")
    }

    async fn resolve_handle(&self, id: &ProjectId) -> Option<ProjectHandle> {
        let state = self.state.lock().await;
        let idx = state.graph.find_node(id)?;
        let node = state.graph.get_node(idx)?;
        (node.loaded && !node.kind.is_folder()).then(|| handle_for(idx))
    }

    async fn handle_to_id(&self, handle: ProjectHandle) -> Option<ProjectId> {
        let state = self.state.lock().await;
        state.graph.get_node(node_for(handle)).map(|node| node.id.clone())
    }

    async fn recalculate_dependencies(&self) -> HostResult<()> {
        let mut state = self.state.lock().await;
        state.calls.recalculations += 1;
        if state.faults.fail_recalculate {
            return Err(HostError::failed("dependency calculation failed"));
        }

        let mut calculated = HashMap::new();
        for (idx, node) in state.graph.nodes() {
            // Shared projects have no build identity and no build dependencies
            if node.loaded && node.kind == ProjectKind::Project {
                calculated.insert(idx, state.graph.dependencies(idx));
            }
        }
        state.calculated = calculated;
        Ok(())
    }

    async fn dependency_count(&self, handle: ProjectHandle) -> HostResult<usize> {
        let mut state = self.state.lock().await;
        let idx = node_for(handle);
        let id = state
            .graph
            .get_node(idx)
            .map(|node| node.id.clone())
            .ok_or_else(|| HostError::not_found(format!("stale handle {}", handle.raw())))?;
        state.calls.dependency_queries.push(id.clone());
        if state.faults.fail_dependency_query.contains(&id) {
            return Err(HostError::failed(format!("dependency query for {id} failed")));
        }
        Ok(state.calculated.get(&idx).map_or(0, Vec::len))
    }

    async fn dependency_handles(
        &self,
        handle: ProjectHandle,
        count: usize,
    ) -> HostResult<Vec<ProjectHandle>> {
        let state = self.state.lock().await;
        let targets = state
            .calculated
            .get(&node_for(handle))
            .map(|targets| targets.iter().take(count).map(|&idx| handle_for(idx)).collect())
            .unwrap_or_default();
        Ok(targets)
    }
}
