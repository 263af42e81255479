//! # Project Filter Graph
//!
//! In-memory host environment for the project filter: a solution tree with
//! build dependencies, and an explorer view over it.
//!
//! ## Architecture
//!
//! ```text
//! SolutionSpec (JSON)
//!     │
//!     ├──> SolutionGraph (petgraph)
//!     │      ├─ Nodes: projects, shared projects, folders
//!     │      └─ Edges: build dependencies
//!     │
//!     ├──> InMemorySolution  (ProjectGraphService)
//!     │      ├─ load / unload with fault injection
//!     │      └─ dependency view refreshed only on recalculation
//!     │
//!     └──> InMemoryExplorer  (ProjectExplorerView)
//!            └─ hidden / expanded node sets, selection, command log
//! ```

mod builder;
mod error;
mod explorer;
mod graph;
mod solution;
mod types;

pub use error::{GraphError, Result};
pub use explorer::{ExplorerCommand, InMemoryExplorer, EXPLORER_PANE, SOLUTION_ROOT};
pub use solution::{CallLog, FaultPlan, InMemorySolution, TreeEntry};
pub use types::{DependencyEdge, ProjectNode, ProjectSpec, SolutionGraph, SolutionSpec};
