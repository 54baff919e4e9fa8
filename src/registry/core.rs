use std::collections::HashMap;

use crate::layout::{StripItem, StripLayout, Zone, ZoneLayout};
use crate::surface::{SurfaceArena, SurfaceContent, SurfaceId};
use crate::widget::{WidgetHandle, WidgetId};

use super::anchor::Anchor;

/// Registry record for one widget.
#[derive(Debug)]
pub struct WidgetEntry {
    pub widget: WidgetHandle,
    pub zone: Zone,
    pub anchor: Anchor,
    pub surface: SurfaceId,
    /// Content was supplied by the caller and is not re-queried on update.
    pub pinned: bool,
}

/// An entry taken out of the registry together with the surfaces it released.
#[derive(Debug)]
pub struct Detached {
    pub entry: WidgetEntry,
    pub released: Vec<SurfaceId>,
}

/// What an insertion displaced.
#[derive(Debug, Default)]
pub struct Inserted {
    /// Previous entry with the same id (last write wins).
    pub replaced: Option<Detached>,
    /// Previous center occupant with a different id.
    pub evicted: Option<Detached>,
}

/// Widget id → entry map for one status-bar instance, plus the zone order and
/// the surfaces backing each entry.
#[derive(Debug, Default)]
pub struct WidgetRegistry {
    order: Vec<WidgetId>,
    entries: HashMap<WidgetId, WidgetEntry>,
    zones: ZoneLayout,
    surfaces: SurfaceArena,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        widget: WidgetHandle,
        zone: Zone,
        anchor: Anchor,
        content: SurfaceContent,
        pinned: bool,
        sentinels: &[WidgetId],
    ) -> Inserted {
        let id = widget.id().to_string();
        let replaced = self.detach_entry(&id, true);

        let evicted = self
            .zones
            .insert(zone, &id, &anchor, sentinels)
            .and_then(|previous| self.detach_entry(&previous, false));

        let surface = self.surfaces.mount(&id, content);
        if !self.order.contains(&id) {
            self.order.push(id.clone());
        }
        self.entries.insert(
            id,
            WidgetEntry {
                widget,
                zone,
                anchor,
                surface,
                pinned,
            },
        );

        Inserted { replaced, evicted }
    }

    pub fn remove(&mut self, id: &str) -> Option<Detached> {
        self.detach_entry(id, false)
    }

    /// Refresh the surface of `id`. Returns `None` when absent, otherwise
    /// whether the content changed.
    pub fn refresh(&mut self, id: &str, content: SurfaceContent) -> Option<bool> {
        let entry = self.entries.get(id)?;
        Some(self.surfaces.refresh(entry.surface, content))
    }

    /// Mark a surface dirty without changing its content.
    pub fn touch(&mut self, id: &str) -> bool {
        match self.entries.get(id) {
            Some(entry) => self.surfaces.mark_dirty(entry.surface),
            None => false,
        }
    }

    pub fn get(&self, id: &str) -> Option<&WidgetEntry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Entries in registration order.
    pub fn entries(&self) -> impl Iterator<Item = &WidgetEntry> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    pub fn widgets(&self) -> impl Iterator<Item = &WidgetHandle> {
        self.entries().map(|entry| &entry.widget)
    }

    pub fn ids(&self) -> Vec<WidgetId> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn zones(&self) -> &ZoneLayout {
        &self.zones
    }

    pub fn surfaces(&self) -> &SurfaceArena {
        &self.surfaces
    }

    pub fn take_dirty(&mut self) -> Vec<SurfaceId> {
        self.surfaces.take_dirty()
    }

    /// Id of the widget whose surface tree contains `surface`.
    pub fn widget_for_surface(&self, surface: SurfaceId) -> Option<&str> {
        self.surfaces.get(surface).map(|s| s.widget_id.as_str())
    }

    /// Solve the strip geometry for the current zone order.
    pub fn layout(&self, width: u16) -> StripLayout {
        let item = |id: &WidgetId| {
            let entry = self.entries.get(id)?;
            let width = self
                .surfaces
                .get(entry.surface)
                .map(|s| s.content.cell_width())
                .unwrap_or(0);
            Some(StripItem {
                widget_id: id.clone(),
                surface: entry.surface,
                width,
            })
        };
        let left: Vec<_> = self.zones.left().iter().filter_map(item).collect();
        let right: Vec<_> = self.zones.right().iter().filter_map(item).collect();
        let center = self
            .zones
            .center()
            .and_then(|id| item(&id.to_string()));
        StripLayout::solve(width, &left, center.as_ref(), &right)
    }

    /// Remove every entry, returning them in registration order.
    pub fn drain(&mut self) -> Vec<WidgetEntry> {
        let order = std::mem::take(&mut self.order);
        let entries = order
            .into_iter()
            .filter_map(|id| self.entries.remove(&id))
            .collect();
        self.entries.clear();
        self.zones.clear();
        self.surfaces.clear();
        entries
    }

    fn detach_entry(&mut self, id: &str, keep_order: bool) -> Option<Detached> {
        let entry = self.entries.remove(id)?;
        self.zones.detach(entry.zone, id);
        if !keep_order {
            self.order.retain(|existing| existing != id);
        }
        let released = self.surfaces.release(entry.surface);
        Some(Detached { entry, released })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::TextWidget;

    fn text(id: &str) -> WidgetHandle {
        WidgetHandle::presentable(id, TextWidget::new(id))
    }

    fn add(registry: &mut WidgetRegistry, id: &str, zone: Zone, anchor: Anchor) -> Inserted {
        registry.insert(
            text(id),
            zone,
            anchor,
            SurfaceContent::text(id),
            false,
            &[],
        )
    }

    #[test]
    fn duplicate_ids_overwrite_in_place() {
        let mut registry = WidgetRegistry::new();
        add(&mut registry, "A", Zone::Right, Anchor::Default);
        add(&mut registry, "B", Zone::Right, Anchor::Default);
        let inserted = add(&mut registry, "A", Zone::Left, Anchor::Default);

        assert!(inserted.replaced.is_some());
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.ids(), vec!["A".to_string(), "B".to_string()]);
        assert_eq!(registry.zones().right(), &["B".to_string()]);
        assert_eq!(registry.zones().left(), &["A".to_string()]);
        assert_eq!(registry.surfaces().len(), 2);
    }

    #[test]
    fn center_eviction_detaches_previous_entry() {
        let mut registry = WidgetRegistry::new();
        add(&mut registry, "Info", Zone::Center, Anchor::Default);
        let inserted = add(&mut registry, "NavBar", Zone::Center, Anchor::Default);

        let evicted = inserted.evicted.unwrap();
        assert_eq!(evicted.entry.widget.id(), "Info");
        assert!(!registry.contains("Info"));
        assert_eq!(registry.zones().center(), Some("NavBar"));
    }

    #[test]
    fn remove_releases_surfaces() {
        let mut registry = WidgetRegistry::new();
        add(&mut registry, "A", Zone::Right, Anchor::Default);
        let detached = registry.remove("A").unwrap();
        assert_eq!(detached.released, vec![detached.entry.surface]);
        assert!(registry.remove("A").is_none());
        assert!(registry.surfaces().is_empty());
    }

    #[test]
    fn layout_uses_surface_widths() {
        let mut registry = WidgetRegistry::new();
        registry.insert(
            text("Git"),
            Zone::Right,
            Anchor::Default,
            SurfaceContent::text("main").with_padding(1),
            false,
            &[],
        );
        let layout = registry.layout(30);
        assert_eq!(layout.right[0].rect.width, 6);
        assert_eq!(layout.right[0].rect.x, 24);
    }
}
