//! Registry module orchestrator.
//!
//! `core` holds the per-instance widget registry; `anchor` holds the textual
//! anchor grammar and the insertion-index resolution used by the right zone.

mod anchor;
mod core;

pub use self::core::{Detached, Inserted, WidgetEntry, WidgetRegistry};
pub use anchor::{
    Anchor, AnchorRelation, FATAL_ERROR_WIDGET_ID, NOTIFICATIONS_WIDGET_ID, resolve_insert_index,
};
