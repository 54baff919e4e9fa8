//! Pointer module orchestrator.
//!
//! `event` carries the window-tagged pointer event and its crossterm adapter;
//! `router` is the pure hover/pressed/popup state transition.

mod event;
mod router;

pub use event::{PointerEvent, PointerPhase, WindowId};
pub use router::{
    EffectKind, EffectState, EffectTarget, PopupRequest, RouteOutcome, RouterSnapshot, route,
};
