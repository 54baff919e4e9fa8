//! Host module orchestrator.
//!
//! `core` owns the arena of status-bar instances and every public mutation;
//! `types` holds frame identity and configuration; `tasks` is the cross-thread
//! queue drained on the owning thread.

mod core;
mod tasks;
mod types;

pub use self::core::{StatusBarHost, StatusBarInstance};
pub use tasks::{HostTask, TaskFn, TaskSender};
pub use types::{
    ContextValue, FrameRef, HOVERED_WIDGET_ID_KEY, HostConfig, InstanceId, PROJECT_KEY,
    PopupPresenter, ProjectRef, STATUS_BAR_INSTANCE_KEY,
};
