//! Layout module orchestrator.
//!
//! `zones` keeps the display order of widgets per zone; `strip` solves that
//! order into cell rectangles for hit-testing and rendering.

mod strip;
mod zones;

pub use strip::{PlacedSurface, StripItem, StripLayout};
pub use zones::{Zone, ZoneLayout};
