use std::fmt;

use crossterm::event::{KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::geometry::Point;

/// Identity of a top-level window managed by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Moved,
    Dragged,
    Pressed,
    Released,
}

/// Low-level pointer event tagged with the window it originated in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerEvent {
    pub window: WindowId,
    pub phase: PointerPhase,
    /// Position in the window's cell grid.
    pub position: Point,
    pub click_count: u8,
    /// Platform popup gesture (secondary button, ctrl-click).
    pub popup_trigger: bool,
    consumed: bool,
}

impl PointerEvent {
    pub fn new(window: WindowId, phase: PointerPhase, position: Point) -> Self {
        let click_count = match phase {
            PointerPhase::Moved | PointerPhase::Dragged => 0,
            PointerPhase::Pressed | PointerPhase::Released => 1,
        };
        Self {
            window,
            phase,
            position,
            click_count,
            popup_trigger: false,
            consumed: false,
        }
    }

    pub fn moved(window: WindowId, position: Point) -> Self {
        Self::new(window, PointerPhase::Moved, position)
    }

    pub fn pressed(window: WindowId, position: Point) -> Self {
        Self::new(window, PointerPhase::Pressed, position)
    }

    pub fn released(window: WindowId, position: Point) -> Self {
        Self::new(window, PointerPhase::Released, position)
    }

    pub fn with_click_count(mut self, count: u8) -> Self {
        self.click_count = count;
        self
    }

    pub fn with_popup_trigger(mut self) -> Self {
        self.popup_trigger = true;
        self
    }

    pub fn consume(&mut self) {
        self.consumed = true;
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// Translate a crossterm mouse event. Scroll events have no counterpart.
    pub fn from_crossterm(window: WindowId, event: &MouseEvent) -> Option<Self> {
        let position = Point::new(event.column, event.row);
        let popup_gesture = |button: MouseButton| {
            button == MouseButton::Right
                || (button == MouseButton::Left && event.modifiers.contains(KeyModifiers::CONTROL))
        };
        let built = match event.kind {
            MouseEventKind::Moved => Self::moved(window, position),
            MouseEventKind::Drag(_) => Self::new(window, PointerPhase::Dragged, position),
            MouseEventKind::Down(button) if popup_gesture(button) => {
                Self::pressed(window, position).with_popup_trigger()
            }
            MouseEventKind::Down(_) => Self::pressed(window, position),
            MouseEventKind::Up(button) if popup_gesture(button) => {
                Self::released(window, position).with_popup_trigger()
            }
            MouseEventKind::Up(_) => Self::released(window, position),
            _ => return None,
        };
        Some(built)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mouse(kind: MouseEventKind, modifiers: KeyModifiers) -> MouseEvent {
        MouseEvent {
            kind,
            column: 7,
            row: 2,
            modifiers,
        }
    }

    #[test]
    fn crossterm_presses_map_click_counts_and_popup() {
        let window = WindowId(1);
        let left = PointerEvent::from_crossterm(
            window,
            &mouse(MouseEventKind::Down(MouseButton::Left), KeyModifiers::NONE),
        )
        .unwrap();
        assert_eq!(left.phase, PointerPhase::Pressed);
        assert_eq!(left.click_count, 1);
        assert!(!left.popup_trigger);
        assert_eq!(left.position, Point::new(7, 2));

        let right = PointerEvent::from_crossterm(
            window,
            &mouse(MouseEventKind::Down(MouseButton::Right), KeyModifiers::NONE),
        )
        .unwrap();
        assert!(right.popup_trigger);

        let ctrl = PointerEvent::from_crossterm(
            window,
            &mouse(MouseEventKind::Down(MouseButton::Left), KeyModifiers::CONTROL),
        )
        .unwrap();
        assert!(ctrl.popup_trigger);
    }

    #[test]
    fn crossterm_motion_has_zero_clicks_and_scroll_is_dropped() {
        let window = WindowId(4);
        let moved =
            PointerEvent::from_crossterm(window, &mouse(MouseEventKind::Moved, KeyModifiers::NONE))
                .unwrap();
        assert_eq!(moved.click_count, 0);
        assert!(
            PointerEvent::from_crossterm(
                window,
                &mouse(MouseEventKind::ScrollUp, KeyModifiers::NONE)
            )
            .is_none()
        );
    }
}
