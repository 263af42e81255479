use crate::config::FilterConfig;
use nucleo_matcher::pattern::{CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Matcher, Utf32String};
use project_filter_protocol::{FilterOptions, ProjectId, ProjectKind};
use std::collections::HashSet;

/// A node as presented by the project picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectableProject {
    pub id: ProjectId,
    pub name: String,
    pub kind: ProjectKind,
    pub loaded: bool,
}

/// Turn the picker's checked set into a filter request.
///
/// Checked stubs are loaded, unchecked loaded projects are unloaded, folders
/// are ignored. Order follows `projects`.
pub fn plan_from_selection(
    projects: &[SelectableProject],
    checked: &HashSet<ProjectId>,
    config: &FilterConfig,
) -> FilterOptions {
    let mut options = FilterOptions::new()
        .with_dependencies(config.load_dependencies)
        .expand_loaded(config.expand_loaded_projects);

    for project in projects.iter().filter(|p| !p.kind.is_folder()) {
        let wanted = checked.contains(&project.id);
        if wanted && !project.loaded {
            options.projects_to_load.push(project.id.clone());
        } else if !wanted && project.loaded {
            options.projects_to_unload.push(project.id.clone());
        }
    }

    options
}

/// Fuzzy project-name search, as typed into the picker's search box.
pub struct ProjectMatcher {
    matcher: Matcher,
}

impl ProjectMatcher {
    pub fn new() -> Self {
        Self {
            matcher: Matcher::new(nucleo_matcher::Config::DEFAULT),
        }
    }

    /// Projects whose display name matches `query`, best match first.
    /// Folders never match; an empty query matches nothing.
    pub fn find(&mut self, query: &str, projects: &[SelectableProject]) -> Vec<ProjectId> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        let pattern = Pattern::parse(query, CaseMatching::Smart, Normalization::Smart);

        let mut scored: Vec<(usize, u32)> = projects
            .iter()
            .enumerate()
            .filter(|(_, project)| !project.kind.is_folder())
            .filter_map(|(idx, project)| {
                let haystack = Utf32String::from(project.name.as_str());
                pattern
                    .score(haystack.slice(..), &mut self.matcher)
                    .map(|score| (idx, score))
            })
            .collect();

        // Stable: equal scores keep tree order
        scored.sort_by(|a, b| b.1.cmp(&a.1));
        scored
            .into_iter()
            .map(|(idx, _)| projects[idx].id.clone())
            .collect()
    }
}

impl Default for ProjectMatcher {
    fn default() -> Self {
        Self::new()
    }
}
