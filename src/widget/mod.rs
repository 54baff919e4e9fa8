//! Widget module orchestrator.
//!
//! Widgets are modelled as a tagged capability set: a [`WidgetBody`] variant
//! says how the surface is produced, and an optional replicator marks the
//! widget as mirrored into every child status bar.

mod core;

pub use self::core::{
    Capabilities, CustomSurface, Presentable, Replicator, TextWidget, WidgetBody, WidgetHandle,
    WidgetId, WidgetPresentation,
};
