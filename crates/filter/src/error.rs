use project_filter_protocol::HostError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FilterError>;

#[derive(Error, Debug)]
pub enum FilterError {
    /// The host reported a failure it cannot recover from
    #[error("Fatal host error during {operation} of {target}: {source}")]
    Fatal {
        operation: &'static str,
        target: String,
        source: HostError,
    },
}

impl FilterError {
    pub fn fatal(operation: &'static str, target: impl Into<String>, source: HostError) -> Self {
        Self::Fatal {
            operation,
            target: target.into(),
            source,
        }
    }
}
