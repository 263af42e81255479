use petgraph::graph::{DiGraph, NodeIndex};
use project_filter_protocol::{ProjectId, ProjectKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One node of a solution description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSpec {
    pub id: ProjectId,

    /// Display name; defaults to the id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub kind: ProjectKind,

    /// Containing solution folder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ProjectId>,

    #[serde(default)]
    pub loaded: bool,

    /// Build dependencies (projects this one requires to be built first)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<ProjectId>,
}

impl ProjectSpec {
    fn with_kind(id: impl Into<ProjectId>, kind: ProjectKind) -> Self {
        Self {
            id: id.into(),
            name: None,
            kind,
            parent: None,
            loaded: false,
            dependencies: Vec::new(),
        }
    }

    pub fn project(id: impl Into<ProjectId>) -> Self {
        Self::with_kind(id, ProjectKind::Project)
    }

    pub fn shared(id: impl Into<ProjectId>) -> Self {
        Self::with_kind(id, ProjectKind::SharedProject)
    }

    pub fn folder(id: impl Into<ProjectId>) -> Self {
        Self::with_kind(id, ProjectKind::Folder)
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn in_folder(mut self, parent: impl Into<ProjectId>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn loaded(mut self, loaded: bool) -> Self {
        self.loaded = loaded;
        self
    }

    pub fn depends_on<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ProjectId>,
    {
        self.dependencies.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.id.as_str())
    }
}

/// Solution description, as read from a solution file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionSpec {
    #[serde(default)]
    pub name: Option<String>,

    pub projects: Vec<ProjectSpec>,
}

impl SolutionSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, project: ProjectSpec) -> Self {
        self.projects.push(project);
        self
    }
}

/// Node in the solution graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectNode {
    pub id: ProjectId,
    pub name: String,
    pub kind: ProjectKind,
    pub parent: Option<ProjectId>,
    pub loaded: bool,
}

/// Edge `a -> b` means `a` requires `b` to be built first
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DependencyEdge;

/// Solution tree plus declared build dependencies
pub struct SolutionGraph {
    /// Directed dependency graph (project -> dependency)
    pub graph: DiGraph<ProjectNode, DependencyEdge>,

    /// Project id -> NodeIndex mapping for fast lookup
    pub id_index: HashMap<ProjectId, NodeIndex>,

    /// Declaration order, used for stable tree output
    pub order: Vec<NodeIndex>,
}

impl SolutionGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            id_index: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn add_node(&mut self, node: ProjectNode) -> NodeIndex {
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.id_index.insert(id, idx);
        self.order.push(idx);
        idx
    }

    pub fn add_dependency(&mut self, from: NodeIndex, to: NodeIndex) {
        self.graph.add_edge(from, to, DependencyEdge);
    }

    pub fn find_node(&self, id: &ProjectId) -> Option<NodeIndex> {
        self.id_index.get(id).copied()
    }

    pub fn get_node(&self, idx: NodeIndex) -> Option<&ProjectNode> {
        self.graph.node_weight(idx)
    }

    pub fn get_node_mut(&mut self, idx: NodeIndex) -> Option<&mut ProjectNode> {
        self.graph.node_weight_mut(idx)
    }

    pub fn node_by_id(&self, id: &ProjectId) -> Option<&ProjectNode> {
        self.find_node(id).and_then(|idx| self.get_node(idx))
    }

    /// Nodes in declaration order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &ProjectNode)> {
        self.order
            .iter()
            .filter_map(move |&idx| self.graph.node_weight(idx).map(|node| (idx, node)))
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

impl Default for SolutionGraph {
    fn default() -> Self {
        Self::new()
    }
}
