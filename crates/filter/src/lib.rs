//! # Project Filter
//!
//! Selectively loads and unloads projects of a large solution.
//!
//! ## Pipeline
//!
//! ```text
//! FilterOptions
//!     │
//!     ├──> Plan (skip no-op requests, pre-resolve dependencies)
//!     │
//!     ├──> Unload phase (request order)
//!     │
//!     ├──> Load phase (depth-first over build dependencies)
//!     │      └─> DependencyResolver (lazy recalculation)
//!     │
//!     └──> ViewReconciler
//!            ├─> show only loaded projects
//!            └─> expand folders of newly loaded projects
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use project_filter::{FilterCommand, FilterConfig, FilterPlanExecutor};
//! use project_filter_protocol::{
//!     FilterOptions, ProgressSink, ProjectExplorerView, ProjectGraphService,
//! };
//! use std::sync::Arc;
//!
//! async fn filter(
//!     graph: Arc<dyn ProjectGraphService>,
//!     view: Arc<dyn ProjectExplorerView>,
//!     progress: Arc<dyn ProgressSink>,
//! ) -> project_filter::Result<()> {
//!     let command = FilterCommand::new(FilterPlanExecutor::new(
//!         graph,
//!         view,
//!         progress,
//!         FilterConfig::from_env(),
//!     ));
//!     let options = FilterOptions::new().load(["app"]).with_dependencies(true);
//!     let report = command.run(&options).await?;
//!     println!("loaded {} projects", report.loaded.len());
//!     Ok(())
//! }
//! ```

mod command;
mod config;
mod dependencies;
mod error;
mod executor;
mod progress;
mod reconcile;
mod selection;
mod state;

pub use command::FilterCommand;
pub use config::FilterConfig;
pub use dependencies::DependencyResolver;
pub use error::{FilterError, Result};
pub use executor::FilterPlanExecutor;
pub use progress::ProgressTracker;
pub use reconcile::ViewReconciler;
pub use selection::{plan_from_selection, ProjectMatcher, SelectableProject};
pub use state::FilterState;
