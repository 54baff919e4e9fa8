use crate::geometry::{Point, Rect};
use crate::layout::StripLayout;
use crate::surface::SurfaceId;
use crate::widget::WidgetId;

use super::event::{PointerEvent, PointerPhase, WindowId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    Hover,
    Pressed,
}

/// The single surface showing hover or pressed feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectTarget {
    pub surface: SurfaceId,
    pub kind: EffectKind,
}

/// Per-instance pointer feedback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EffectState {
    #[default]
    Idle,
    Hovering(SurfaceId),
    Pressed(SurfaceId),
}

impl EffectState {
    fn with(kind: EffectKind, surface: Option<SurfaceId>) -> Self {
        match (kind, surface) {
            (_, None) => Self::Idle,
            (EffectKind::Hover, Some(id)) => Self::Hovering(id),
            (EffectKind::Pressed, Some(id)) => Self::Pressed(id),
        }
    }

    pub fn target(&self) -> Option<EffectTarget> {
        match *self {
            Self::Idle => None,
            Self::Hovering(surface) => Some(EffectTarget {
                surface,
                kind: EffectKind::Hover,
            }),
            Self::Pressed(surface) => Some(EffectTarget {
                surface,
                kind: EffectKind::Pressed,
            }),
        }
    }

    pub fn surface(&self) -> Option<SurfaceId> {
        self.target().map(|t| t.surface)
    }
}

/// Everything the router reads about one instance.
#[derive(Debug, Clone, Copy)]
pub struct RouterSnapshot<'a> {
    pub window: WindowId,
    /// Window position of the strip's top-left cell.
    pub strip_origin: Point,
    pub visible: bool,
    pub layout: &'a StripLayout,
    pub has_project: bool,
    pub action_group: Option<&'a str>,
}

/// Context menu the host should open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupRequest {
    pub group: String,
    /// Pointer position relative to the right-zone container.
    pub anchor: Point,
    pub widget_id: WidgetId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteOutcome {
    pub state: EffectState,
    /// Strip-local regions needing a repaint.
    pub invalidated: Vec<Rect>,
    pub handled: bool,
    /// The event should be marked consumed.
    pub consume: bool,
    pub popup: Option<PopupRequest>,
}

impl RouteOutcome {
    fn unchanged(state: EffectState) -> Self {
        Self {
            state,
            invalidated: Vec::new(),
            handled: false,
            consume: false,
            popup: None,
        }
    }
}

/// Compute the next effect state for `event`. Pure: the caller applies the
/// outcome.
pub fn route(state: EffectState, event: &PointerEvent, snapshot: &RouterSnapshot<'_>) -> RouteOutcome {
    if !snapshot.visible {
        return RouteOutcome::unchanged(state);
    }

    if event.window != snapshot.window {
        let mut outcome = RouteOutcome::unchanged(EffectState::Idle);
        if let Some(rect) = state.surface().and_then(|s| snapshot.layout.rect_of(s)) {
            outcome.invalidated.push(rect);
        }
        return outcome;
    }

    let local = event.position.relative_to(snapshot.strip_origin);
    let hit = local.and_then(|point| snapshot.layout.hit_right(point));
    let hit_surface = hit.map(|placed| placed.surface);

    let next = if event.click_count == 0 || event.phase == PointerPhase::Released {
        EffectState::with(EffectKind::Hover, hit_surface)
    } else if event.click_count == 1 && event.phase == PointerPhase::Pressed {
        EffectState::with(EffectKind::Pressed, hit_surface)
    } else {
        state
    };

    let mut outcome = RouteOutcome::unchanged(next);
    if next != state {
        for surface in [state.surface(), next.surface()].into_iter().flatten() {
            if let Some(rect) = snapshot.layout.rect_of(surface) {
                if !outcome.invalidated.contains(&rect) {
                    outcome.invalidated.push(rect);
                }
            }
        }
    }

    let (Some(placed), Some(point)) = (hit, local) else {
        return outcome;
    };
    if event.is_consumed() {
        return outcome;
    }
    let popup_phase = matches!(event.phase, PointerPhase::Pressed | PointerPhase::Released);
    if event.popup_trigger && popup_phase && snapshot.has_project {
        if let Some(group) = snapshot.action_group {
            outcome.popup = Some(PopupRequest {
                group: group.to_string(),
                anchor: snapshot.layout.to_right_local(point),
                widget_id: placed.widget_id.clone(),
            });
            outcome.consume = true;
            outcome.handled = true;
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::StripItem;
    use crate::surface::{SurfaceArena, SurfaceContent};

    const WINDOW: WindowId = WindowId(1);

    struct Fixture {
        layout: StripLayout,
        git: SurfaceId,
        memory: SurfaceId,
        tools: SurfaceId,
    }

    // Strip of 30 cells at window row 9: [Tools 0..4] ... [Git 20..25][Memory 25..30]
    fn fixture() -> Fixture {
        let mut arena = SurfaceArena::new();
        let mut item = |id: &str, width| StripItem {
            widget_id: id.to_string(),
            surface: arena.mount(id, SurfaceContent::text(id)),
            width,
        };
        let tools = item("Tools", 4);
        let git = item("Git", 5);
        let memory = item("Memory", 5);
        let ids = (git.surface, memory.surface, tools.surface);
        let layout = StripLayout::solve(30, &[tools], None, &[git, memory]);
        Fixture {
            layout,
            git: ids.0,
            memory: ids.1,
            tools: ids.2,
        }
    }

    fn snapshot(layout: &StripLayout) -> RouterSnapshot<'_> {
        RouterSnapshot {
            window: WINDOW,
            strip_origin: Point::new(0, 9),
            visible: true,
            layout,
            has_project: true,
            action_group: Some("StatusBarWidgets"),
        }
    }

    #[test]
    fn moving_between_widgets_swaps_the_single_target() {
        let fx = fixture();
        let snap = snapshot(&fx.layout);

        let first = route(
            EffectState::Idle,
            &PointerEvent::moved(WINDOW, Point::new(21, 9)),
            &snap,
        );
        assert_eq!(first.state, EffectState::Hovering(fx.git));
        assert_eq!(first.invalidated, vec![Rect::new(20, 0, 5, 1)]);

        let second = route(
            first.state,
            &PointerEvent::moved(WINDOW, Point::new(27, 9)),
            &snap,
        );
        assert_eq!(second.state, EffectState::Hovering(fx.memory));
        assert_eq!(
            second.invalidated,
            vec![Rect::new(20, 0, 5, 1), Rect::new(25, 0, 5, 1)]
        );
        assert!(!second.handled);
    }

    #[test]
    fn repeated_hover_on_same_widget_repaints_nothing() {
        let fx = fixture();
        let snap = snapshot(&fx.layout);
        let outcome = route(
            EffectState::Hovering(fx.git),
            &PointerEvent::moved(WINDOW, Point::new(22, 9)),
            &snap,
        );
        assert_eq!(outcome.state, EffectState::Hovering(fx.git));
        assert!(outcome.invalidated.is_empty());
    }

    #[test]
    fn left_zone_never_receives_effects() {
        let fx = fixture();
        let snap = snapshot(&fx.layout);
        let outcome = route(
            EffectState::Idle,
            &PointerEvent::pressed(WINDOW, Point::new(1, 9)),
            &snap,
        );
        assert_eq!(outcome.state, EffectState::Idle);
        assert_ne!(outcome.state, EffectState::Pressed(fx.tools));
    }

    #[test]
    fn press_then_release_goes_pressed_then_hover() {
        let fx = fixture();
        let snap = snapshot(&fx.layout);
        let pressed = route(
            EffectState::Hovering(fx.git),
            &PointerEvent::pressed(WINDOW, Point::new(21, 9)),
            &snap,
        );
        assert_eq!(pressed.state, EffectState::Pressed(fx.git));

        let released = route(
            pressed.state,
            &PointerEvent::released(WINDOW, Point::new(21, 9)),
            &snap,
        );
        assert_eq!(released.state, EffectState::Hovering(fx.git));
    }

    #[test]
    fn double_press_leaves_state_alone() {
        let fx = fixture();
        let snap = snapshot(&fx.layout);
        let outcome = route(
            EffectState::Hovering(fx.memory),
            &PointerEvent::pressed(WINDOW, Point::new(21, 9)).with_click_count(2),
            &snap,
        );
        assert_eq!(outcome.state, EffectState::Hovering(fx.memory));
        assert!(!outcome.handled);
    }

    #[test]
    fn foreign_window_clears_effect() {
        let fx = fixture();
        let snap = snapshot(&fx.layout);
        let outcome = route(
            EffectState::Hovering(fx.git),
            &PointerEvent::moved(WindowId(2), Point::new(21, 9)),
            &snap,
        );
        assert_eq!(outcome.state, EffectState::Idle);
        assert_eq!(outcome.invalidated, vec![Rect::new(20, 0, 5, 1)]);
        assert!(!outcome.handled);
    }

    #[test]
    fn popup_trigger_requests_menu_at_right_local_point() {
        let fx = fixture();
        let snap = snapshot(&fx.layout);
        let outcome = route(
            EffectState::Idle,
            &PointerEvent::pressed(WINDOW, Point::new(26, 9)).with_popup_trigger(),
            &snap,
        );
        assert!(outcome.handled);
        assert!(outcome.consume);
        let popup = outcome.popup.unwrap();
        assert_eq!(popup.anchor, Point::new(6, 0));
        assert_eq!(popup.widget_id, "Memory");
        assert_eq!(popup.group, "StatusBarWidgets");
    }

    #[test]
    fn popup_needs_project_hit_and_unconsumed_event() {
        let fx = fixture();
        let mut snap = snapshot(&fx.layout);
        let trigger = PointerEvent::pressed(WINDOW, Point::new(26, 9)).with_popup_trigger();

        snap.has_project = false;
        let outcome = route(EffectState::Idle, &trigger, &snap);
        assert!(!outcome.handled && !outcome.consume && outcome.popup.is_none());

        snap.has_project = true;
        let mut consumed = trigger.clone();
        consumed.consume();
        assert!(route(EffectState::Idle, &consumed, &snap).popup.is_none());

        let miss = PointerEvent::pressed(WINDOW, Point::new(10, 9)).with_popup_trigger();
        assert!(route(EffectState::Idle, &miss, &snap).popup.is_none());

        let dragged = PointerEvent::new(WINDOW, PointerPhase::Dragged, Point::new(26, 9))
            .with_popup_trigger();
        assert!(route(EffectState::Idle, &dragged, &snap).popup.is_none());
    }

    #[test]
    fn hidden_strip_ignores_events() {
        let fx = fixture();
        let mut snap = snapshot(&fx.layout);
        snap.visible = false;
        let outcome = route(
            EffectState::Hovering(fx.git),
            &PointerEvent::moved(WindowId(9), Point::new(0, 0)),
            &snap,
        );
        assert_eq!(outcome.state, EffectState::Hovering(fx.git));
    }
}
