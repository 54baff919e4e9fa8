use std::fmt;
use std::sync::{Arc, Mutex};

use crate::geometry::Point;
use crate::logging::Logger;
use crate::metrics::HostMetrics;
use crate::pointer::{PopupRequest, WindowId};
use crate::registry::{FATAL_ERROR_WIDGET_ID, NOTIFICATIONS_WIDGET_ID};
use crate::widget::WidgetId;

/// Identifier of a status-bar instance inside a [`StatusBarHost`](super::StatusBarHost).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u64);

impl InstanceId {
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "statusbar#{}", self.0)
    }
}

/// Workspace a frame is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRef {
    pub name: String,
}

impl ProjectRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// The window frame a status-bar instance lives in. The strip is one row at
/// `origin`, `width` cells wide, in the window's coordinate space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameRef {
    pub window: WindowId,
    pub project: Option<ProjectRef>,
    pub origin: Point,
    pub width: u16,
}

impl FrameRef {
    pub fn new(window: WindowId, width: u16) -> Self {
        Self {
            window,
            project: None,
            origin: Point::default(),
            width,
        }
    }

    pub fn with_project(mut self, project: ProjectRef) -> Self {
        self.project = Some(project);
        self
    }

    pub fn at(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }
}

/// Answer to a context [`query`](super::StatusBarHost::query).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextValue {
    Project(ProjectRef),
    Instance(InstanceId),
    HoveredWidget(WidgetId),
}

pub const PROJECT_KEY: &str = "project";
pub const STATUS_BAR_INSTANCE_KEY: &str = "status-bar-instance";
pub const HOVERED_WIDGET_ID_KEY: &str = "hovered-widget-id";

/// Shows the status-bar context menu.
pub trait PopupPresenter: Send {
    fn show(&mut self, instance: InstanceId, request: &PopupRequest);
}

/// Configuration for a [`StatusBarHost`](super::StatusBarHost).
#[derive(Clone)]
pub struct HostConfig {
    /// Optional structured logger used by the host.
    pub logger: Option<Logger>,
    /// Shared counters; `None` disables metrics.
    pub metrics: Option<Arc<Mutex<HostMetrics>>>,
    /// Right-zone widgets that unresolved anchors insert in front of, in
    /// priority order.
    pub sentinel_ids: Vec<WidgetId>,
    /// Action group that populates the context menu.
    pub action_group_id: String,
    /// Target field used when emitting metrics snapshots.
    pub metrics_target: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            logger: None,
            metrics: None,
            sentinel_ids: vec![
                NOTIFICATIONS_WIDGET_ID.to_string(),
                FATAL_ERROR_WIDGET_ID.to_string(),
            ],
            action_group_id: "StatusBarWidgetsActionGroup".to_string(),
            metrics_target: "room::statusbar.metrics".to_string(),
        }
    }
}

impl HostConfig {
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Enable metrics collection if it has not already been configured.
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(HostMetrics::new())));
        }
    }

    pub fn disable_metrics(&mut self) {
        self.metrics = None;
    }

    pub fn metrics_handle(&self) -> Option<Arc<Mutex<HostMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }
}
