//! Status-bar widget host for terminal frames.
//!
//! Each window frame owns a status-bar instance: a one-row strip split into
//! left, center and right zones. Features register widgets into those zones,
//! replicable widgets are mirrored into every child frame, and pointer input
//! drives a single hover/pressed effect plus a context menu on the right zone.

pub mod cursor;
pub mod error;
pub mod geometry;
pub mod host;
pub mod layout;
pub mod listener;
pub mod logging;
pub mod metrics;
pub mod pointer;
pub mod registry;
pub mod render;
pub mod scope;
pub mod surface;
pub mod widget;
pub mod width;

pub use error::{HostError, Result, WidgetError};
pub use geometry::{Point, Rect};
pub use host::{
    ContextValue, FrameRef, HostConfig, HostTask, InstanceId, PopupPresenter, ProjectRef,
    StatusBarHost, StatusBarInstance, TaskSender,
};
pub use layout::{PlacedSurface, StripLayout, Zone, ZoneLayout};
pub use listener::{ListenerHub, ListenerId, ListenerResult, StatusBarListener, WidgetNotice};
pub use logging::{LogEvent, LogFields, LogLevel, Logger, LoggingError, LoggingResult};
pub use metrics::{HostMetrics, MetricSnapshot};
pub use pointer::{
    EffectKind, EffectState, EffectTarget, PointerEvent, PointerPhase, PopupRequest, WindowId,
};
pub use registry::{Anchor, AnchorRelation, WidgetEntry, WidgetRegistry};
pub use render::{RendererSettings, StripRenderer, StripView};
pub use scope::ScopeId;
pub use surface::{SurfaceContent, SurfaceId, SurfaceKind};
pub use widget::{
    Capabilities, CustomSurface, Presentable, TextWidget, WidgetBody, WidgetHandle, WidgetId,
    WidgetPresentation,
};
pub use width::display_width;
