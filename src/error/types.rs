use thiserror::Error;

use crate::host::InstanceId;

/// Unified result type for the status-bar host.
pub type Result<T> = std::result::Result<T, HostError>;

/// Errors surfaced by host-level operations.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("status bar instance {0} not found")]
    InstanceNotFound(InstanceId),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Defects attributable to a single widget or listener. These are logged and
/// never abort the mutation that observed them.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WidgetError {
    #[error("widget id must not be empty")]
    EmptyId,
    #[error("widget `{0}` returned no presentation")]
    MissingPresentation(String),
    #[error("widget `{id}` could not be replicated: {reason}")]
    ReplicationFailed { id: String, reason: String },
    #[error("listener failed: {0}")]
    Listener(String),
}
