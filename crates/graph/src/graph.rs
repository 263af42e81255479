use crate::types::{ProjectNode, SolutionGraph};
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use project_filter_protocol::ProjectId;
use std::collections::HashSet;

impl SolutionGraph {
    /// Declared dependencies of a node, in declaration order
    pub fn dependencies(&self, node: NodeIndex) -> Vec<NodeIndex> {
        // petgraph walks outgoing edges newest-first
        let mut targets: Vec<NodeIndex> = self.graph.edges(node).map(|e| e.target()).collect();
        targets.reverse();
        targets
    }

    /// Whether following parent links from `id` comes back to a node already seen
    pub fn in_folder_cycle(&self, id: &ProjectId) -> bool {
        let mut seen = HashSet::new();
        let mut current = Some(id.clone());

        while let Some(node) = current {
            if !seen.insert(node.clone()) {
                return true;
            }
            current = self.node_by_id(&node).and_then(|n| n.parent.clone());
        }

        false
    }

    /// Direct children of a folder, or top-level nodes for `None`
    pub fn children(&self, parent: Option<&ProjectId>) -> Vec<&ProjectNode> {
        self.nodes()
            .map(|(_, node)| node)
            .filter(|node| node.parent.as_ref() == parent)
            .collect()
    }

    /// Whether every project below a folder is unloaded (empty folders count as unloaded)
    pub fn folder_fully_unloaded(&self, folder: &ProjectId) -> bool {
        self.children(Some(folder)).into_iter().all(|child| {
            if child.kind.is_folder() {
                self.folder_fully_unloaded(&child.id)
            } else {
                !child.loaded
            }
        })
    }

    /// Nodes reachable from `start` over dependency edges, excluding `start`
    pub fn transitive_dependencies(&self, start: NodeIndex) -> Vec<NodeIndex> {
        let mut visited = HashSet::new();
        let mut result = Vec::new();
        let mut stack = vec![start];

        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            if current != start {
                result.push(current);
            }
            for target in self.dependencies(current).into_iter().rev() {
                if !visited.contains(&target) {
                    stack.push(target);
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use crate::types::{ProjectSpec, SolutionGraph, SolutionSpec};

    fn sample() -> SolutionGraph {
        let spec = SolutionSpec::new()
            .with(ProjectSpec::folder("src"))
            .with(ProjectSpec::folder("libs").in_folder("src"))
            .with(ProjectSpec::project("core").in_folder("libs"))
            .with(ProjectSpec::project("util").in_folder("libs").loaded(true))
            .with(ProjectSpec::project("app").depends_on(["core", "util"]))
            .with(ProjectSpec::project("cli").depends_on(["app"]));
        SolutionGraph::from_spec(&spec).unwrap()
    }

    fn ids(graph: &SolutionGraph, nodes: Vec<petgraph::graph::NodeIndex>) -> Vec<String> {
        nodes
            .into_iter()
            .map(|idx| graph.get_node(idx).unwrap().id.to_string())
            .collect()
    }

    #[test]
    fn dependencies_keep_declaration_order() {
        let graph = sample();
        let app = graph.find_node(&"app".into()).unwrap();
        assert_eq!(ids(&graph, graph.dependencies(app)), vec!["core", "util"]);
    }

    #[test]
    fn folder_hierarchy_without_cycles() {
        let graph = sample();
        assert!(!graph.in_folder_cycle(&"core".into()));
        assert!(!graph.in_folder_cycle(&"missing".into()));
    }

    #[test]
    fn folder_load_state_follows_descendants() {
        let graph = sample();
        assert!(!graph.folder_fully_unloaded(&"libs".into()));
        assert!(!graph.folder_fully_unloaded(&"src".into()));
    }

    #[test]
    fn transitive_dependencies_walk_depth_first() {
        let graph = sample();
        let cli = graph.find_node(&"cli".into()).unwrap();
        assert_eq!(
            ids(&graph, graph.transitive_dependencies(cli)),
            vec!["app", "core", "util"]
        );
    }
}
