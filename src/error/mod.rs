//! Error module orchestrator.

mod types;

pub use types::{HostError, Result, WidgetError};
