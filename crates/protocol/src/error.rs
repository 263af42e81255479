use thiserror::Error;

pub type HostResult<T> = std::result::Result<T, HostError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostErrorKind {
    /// The host rejected the operation; the caller may carry on
    Failed,

    /// The target no longer exists in the host
    NotFound,

    /// Host state is unusable; the whole command must stop
    Fatal,
}

/// Failure reported by a host capability call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct HostError {
    pub kind: HostErrorKind,
    pub message: String,
}

impl HostError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            kind: HostErrorKind::Failed,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: HostErrorKind::NotFound,
            message: message.into(),
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            kind: HostErrorKind::Fatal,
            message: message.into(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.kind == HostErrorKind::Fatal
    }
}
