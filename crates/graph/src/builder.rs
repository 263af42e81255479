use crate::error::{GraphError, Result};
use crate::types::{ProjectNode, SolutionGraph, SolutionSpec};
use std::collections::HashMap;
use std::path::Path;

impl SolutionSpec {
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }
}

impl SolutionGraph {
    /// Build and validate a solution graph from its description
    pub fn from_spec(spec: &SolutionSpec) -> Result<Self> {
        let mut graph = SolutionGraph::new();

        // Phase 1: nodes
        for project in &spec.projects {
            if graph.find_node(&project.id).is_some() {
                return Err(GraphError::DuplicateId(project.id.to_string()));
            }
            graph.add_node(ProjectNode {
                id: project.id.clone(),
                name: project.display_name().to_string(),
                kind: project.kind,
                parent: project.parent.clone(),
                // Folders have no load state of their own
                loaded: project.loaded && !project.kind.is_folder(),
            });
        }

        // Phase 2: hierarchy and dependency edges
        let kinds: HashMap<_, _> = spec.projects.iter().map(|p| (&p.id, p.kind)).collect();
        for project in &spec.projects {
            if let Some(parent) = &project.parent {
                match kinds.get(parent) {
                    None => {
                        return Err(GraphError::UnknownParent {
                            child: project.id.to_string(),
                            parent: parent.to_string(),
                        })
                    }
                    Some(kind) if !kind.is_folder() => {
                        return Err(GraphError::ParentNotFolder {
                            child: project.id.to_string(),
                            parent: parent.to_string(),
                        })
                    }
                    Some(_) => {}
                }
            }

            if project.kind.is_folder() && !project.dependencies.is_empty() {
                return Err(GraphError::InvalidDependency {
                    project: project.id.to_string(),
                    dependency: project.dependencies[0].to_string(),
                    reason: "folders cannot have dependencies".to_string(),
                });
            }

            let Some(from) = graph.find_node(&project.id) else {
                continue;
            };
            for dependency in &project.dependencies {
                let to = graph.find_node(dependency).ok_or_else(|| {
                    GraphError::UnknownDependency {
                        project: project.id.to_string(),
                        dependency: dependency.to_string(),
                    }
                })?;
                if kinds.get(dependency).is_some_and(|kind| kind.is_folder()) {
                    return Err(GraphError::InvalidDependency {
                        project: project.id.to_string(),
                        dependency: dependency.to_string(),
                        reason: "target is a solution folder".to_string(),
                    });
                }
                if from == to {
                    return Err(GraphError::InvalidDependency {
                        project: project.id.to_string(),
                        dependency: dependency.to_string(),
                        reason: "project depends on itself".to_string(),
                    });
                }
                graph.add_dependency(from, to);
            }
        }

        // Phase 3: folders must form a tree
        for project in &spec.projects {
            if project.kind.is_folder() && graph.in_folder_cycle(&project.id) {
                return Err(GraphError::FolderCycle(project.id.to_string()));
            }
        }

        log::debug!(
            "Built solution graph: {} nodes, {} dependency edges",
            graph.node_count(),
            graph.edge_count()
        );

        Ok(graph)
    }
}
