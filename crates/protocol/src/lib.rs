//! # Project Filter Protocol
//!
//! Value types shared between the filter engine and the host environment,
//! plus the host capability traits the engine drives.
//!
//! ```text
//! FilterOptions ──> engine ──> ProjectGraphService   (load / unload / dependencies)
//!                     │ ├────> ProgressSink          (snapshots, cancellation)
//!                     │ └────> ProjectExplorerView   (visibility, expansion)
//!                     └──────> FilterReport
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

mod error;
mod host;

pub use error::{HostError, HostErrorKind, HostResult};
pub use host::{CancellationFlag, ProgressSink, ProjectExplorerView, ProjectGraphService};

/// Stable identity of a node in the solution tree.
///
/// A stub (unloaded) and a real (loaded) project share the same id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProjectId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for ProjectId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&ProjectId> for ProjectId {
    fn from(id: &ProjectId) -> Self {
        id.clone()
    }
}

/// Opaque handle issued by the host for a live (loaded) project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectHandle(u64);

impl ProjectHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectKind {
    /// Buildable project
    #[default]
    Project,

    /// Contributes source items to other projects; has no build identity of its own
    SharedProject,

    /// Organizational grouping node, never loadable
    Folder,
}

impl ProjectKind {
    pub fn is_folder(self) -> bool {
        matches!(self, Self::Folder)
    }

    pub fn is_shared(self) -> bool {
        matches!(self, Self::SharedProject)
    }
}

/// Input of one filter application.
///
/// The load and unload lists are expected to be disjoint; when they are not,
/// the unload request wins for the direct request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub projects_to_load: Vec<ProjectId>,
    pub projects_to_unload: Vec<ProjectId>,
    pub load_dependencies: bool,
    pub expand_loaded_projects: bool,
}

impl FilterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ProjectId>,
    {
        self.projects_to_load.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn unload<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ProjectId>,
    {
        self.projects_to_unload.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_dependencies(mut self, load_dependencies: bool) -> Self {
        self.load_dependencies = load_dependencies;
        self
    }

    pub fn expand_loaded(mut self, expand: bool) -> Self {
        self.expand_loaded_projects = expand;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.projects_to_load.is_empty() && self.projects_to_unload.is_empty()
    }
}

/// What the progress UI shows at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Title of the whole operation
    pub message: String,

    /// What is happening right now, e.g. "Loading Core..."
    pub detail_text: String,

    /// Rendered counts, e.g. "3 of 7"
    pub status_text: String,

    pub cancelable: bool,
    pub current: usize,
    pub total: usize,
}

impl ProgressSnapshot {
    /// Completed-over-planned ratio in `[0, 1]`; zero when nothing is planned.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let ratio = self.current as f64 / self.total as f64;
        ratio.clamp(0.0, 1.0)
    }
}

/// A host failure that was absorbed instead of aborting the filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedOperation {
    pub project: ProjectId,
    pub operation: String,
    pub message: String,
}

/// Outcome of one filter application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterReport {
    /// Projects loaded by this run, in load order
    pub loaded: Vec<ProjectId>,

    /// Projects unloaded by this run, in unload order
    pub unloaded: Vec<ProjectId>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<FailedOperation>,

    pub cancelled: bool,

    /// True when the run did nothing: empty request or another run in flight
    pub skipped: bool,

    pub dependency_recalculations: usize,
}

impl FilterReport {
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }
}

/// Explorer focus captured before mutating load state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerSelection {
    pub items: Vec<ProjectId>,
    pub active_pane: Option<String>,
}
