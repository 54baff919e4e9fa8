use crate::geometry::{Point, Rect};
use crate::surface::SurfaceId;
use crate::widget::WidgetId;

/// A surface with its solved rectangle in strip-local coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedSurface {
    pub widget_id: WidgetId,
    pub surface: SurfaceId,
    pub rect: Rect,
}

/// Input item for [`StripLayout::solve`].
#[derive(Debug, Clone)]
pub struct StripItem {
    pub widget_id: WidgetId,
    pub surface: SurfaceId,
    pub width: u16,
}

/// Solved geometry of one status-bar strip.
///
/// The right zone is packed against the right edge and wins space first, then
/// the left zone, and the center (primary widget followed by the info text)
/// takes whatever remains.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StripLayout {
    pub strip: Rect,
    pub left: Vec<PlacedSurface>,
    pub center: Option<PlacedSurface>,
    pub info: Rect,
    pub right_container: Rect,
    pub right: Vec<PlacedSurface>,
}

impl StripLayout {
    pub fn solve(
        width: u16,
        left: &[StripItem],
        center: Option<&StripItem>,
        right: &[StripItem],
    ) -> Self {
        let strip = Rect::new(0, 0, width, 1);

        let mut cursor = width;
        let mut placed_right = Vec::with_capacity(right.len());
        for item in right.iter().rev() {
            let span = item.width.min(cursor);
            cursor -= span;
            placed_right.push(place(item, cursor, span));
        }
        placed_right.reverse();
        let right_container = Rect::new(cursor, 0, width - cursor, 1);

        let available = cursor;
        let mut x = 0u16;
        let placed_left = left
            .iter()
            .map(|item| {
                let span = item.width.min(available - x);
                let placed = place(item, x, span);
                x += span;
                placed
            })
            .collect::<Vec<_>>();

        let middle = available - x;
        let placed_center = center.map(|item| {
            let span = item.width.min(middle);
            let placed = place(item, x, span);
            x += span;
            placed
        });
        let info = Rect::new(x, 0, available - x, 1);

        Self {
            strip,
            left: placed_left,
            center: placed_center,
            info,
            right_container,
            right: placed_right,
        }
    }

    /// Right-zone surface under `point`, if any.
    pub fn hit_right(&self, point: Point) -> Option<&PlacedSurface> {
        if !self.right_container.contains(point) {
            return None;
        }
        self.right
            .iter()
            .find(|placed| !placed.rect.is_empty() && placed.rect.contains(point))
    }

    pub fn rect_of(&self, surface: SurfaceId) -> Option<Rect> {
        self.left
            .iter()
            .chain(self.center.iter())
            .chain(self.right.iter())
            .find(|placed| placed.surface == surface)
            .map(|placed| placed.rect)
    }

    /// Convert a strip-local point into right-container-local coordinates.
    pub fn to_right_local(&self, point: Point) -> Point {
        point
            .relative_to(self.right_container.origin())
            .unwrap_or_default()
    }
}

fn place(item: &StripItem, x: u16, span: u16) -> PlacedSurface {
    PlacedSurface {
        widget_id: item.widget_id.clone(),
        surface: item.surface,
        rect: Rect::new(x, 0, span, 1),
    }
}
