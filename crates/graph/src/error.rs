use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Duplicate project id: {0}")]
    DuplicateId(String),

    #[error("Unknown parent {parent} for {child}")]
    UnknownParent { child: String, parent: String },

    #[error("Parent {parent} of {child} is not a folder")]
    ParentNotFolder { child: String, parent: String },

    #[error("Unknown dependency {dependency} of {project}")]
    UnknownDependency { project: String, dependency: String },

    #[error("Invalid dependency {project} -> {dependency}: {reason}")]
    InvalidDependency {
        project: String,
        dependency: String,
        reason: String,
    },

    #[error("Folder {0} is nested inside itself")]
    FolderCycle(String),

    #[error("Invalid solution file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
