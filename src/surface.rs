//! Rendered surfaces backing widget entries.
//!
//! Every registered widget is mounted as one top-level surface. Label-like
//! custom surfaces get a host-owned wrapper, so the label itself is a descendant
//! of the surface that sits in the zone. Content is hashed so refreshes only mark
//! a surface dirty when something actually changed.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use blake3::Hash;

use crate::width::cell_width;

/// Stable handle for a mounted surface within one status-bar instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(u64);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

/// How the host should mount a piece of surface content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceKind {
    #[default]
    Panel,
    /// Bare label; the host wraps it so it fills the strip height.
    Label,
}

/// Content displayed by a surface.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SurfaceContent {
    pub text: String,
    pub tooltip: Option<String>,
    /// Explicit width in cells; defaults to the text width plus padding.
    pub width: Option<u16>,
    /// Blank cells on either side of the text.
    pub padding: u16,
    pub kind: SurfaceKind,
}

impl SurfaceContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn label(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: SurfaceKind::Label,
            ..Self::default()
        }
    }

    /// Fallback used when a widget fails to supply anything to show.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn with_width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_padding(mut self, padding: u16) -> Self {
        self.padding = padding;
        self
    }

    pub fn cell_width(&self) -> u16 {
        self.width.unwrap_or_else(|| {
            cell_width(&self.text).saturating_add(self.padding.saturating_mul(2))
        })
    }

    fn digest(&self) -> Hash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.text.as_bytes());
        hasher.update(&[0]);
        if let Some(tooltip) = &self.tooltip {
            hasher.update(tooltip.as_bytes());
        }
        hasher.update(&[0]);
        hasher.update(&self.width.unwrap_or(u16::MAX).to_le_bytes());
        hasher.update(&self.padding.to_le_bytes());
        hasher.update(&[self.kind as u8]);
        hasher.finalize()
    }
}

#[derive(Debug, Clone)]
pub struct RenderedSurface {
    pub id: SurfaceId,
    pub widget_id: String,
    pub parent: Option<SurfaceId>,
    pub content: SurfaceContent,
    hash: Hash,
    pub is_dirty: bool,
}

impl RenderedSurface {
    fn new(id: SurfaceId, widget_id: &str, parent: Option<SurfaceId>, content: SurfaceContent) -> Self {
        let hash = content.digest();
        Self {
            id,
            widget_id: widget_id.to_string(),
            parent,
            content,
            hash,
            is_dirty: true,
        }
    }

    fn update_content(&mut self, content: SurfaceContent) -> bool {
        let new_hash = content.digest();
        if new_hash == self.hash {
            return false;
        }
        self.content = content;
        self.hash = new_hash;
        self.is_dirty = true;
        true
    }
}

/// Arena of surfaces owned by one status-bar instance.
#[derive(Debug, Default)]
pub struct SurfaceArena {
    next_id: u64,
    surfaces: HashMap<SurfaceId, RenderedSurface>,
    dirty: BTreeSet<SurfaceId>,
}

impl SurfaceArena {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> SurfaceId {
        self.next_id += 1;
        SurfaceId(self.next_id)
    }

    /// Mount content for `widget_id`, returning the top-level surface.
    pub fn mount(&mut self, widget_id: &str, content: SurfaceContent) -> SurfaceId {
        let top = self.allocate();
        match content.kind {
            SurfaceKind::Panel => {
                self.surfaces
                    .insert(top, RenderedSurface::new(top, widget_id, None, content));
            }
            SurfaceKind::Label => {
                let inner = self.allocate();
                let wrapper = SurfaceContent {
                    kind: SurfaceKind::Panel,
                    ..content.clone()
                };
                self.surfaces
                    .insert(top, RenderedSurface::new(top, widget_id, None, wrapper));
                self.surfaces.insert(
                    inner,
                    RenderedSurface::new(inner, widget_id, Some(top), content),
                );
            }
        }
        self.dirty.insert(top);
        top
    }

    /// Refresh a mounted surface and any wrapped label beneath it. A change of
    /// kind adds or releases the wrapped label. Returns `true` when the visible
    /// content changed.
    pub fn refresh(&mut self, id: SurfaceId, content: SurfaceContent) -> bool {
        let children = self.children_of(id);
        let wrapped = SurfaceContent {
            kind: SurfaceKind::Panel,
            ..content.clone()
        };
        let (mut changed, widget_id) = match self.surfaces.get_mut(&id) {
            Some(surface) => (surface.update_content(wrapped), surface.widget_id.clone()),
            None => return false,
        };
        match (content.kind, children.is_empty()) {
            (SurfaceKind::Label, true) => {
                let inner = self.allocate();
                self.surfaces.insert(
                    inner,
                    RenderedSurface::new(inner, &widget_id, Some(id), content),
                );
                changed = true;
            }
            (SurfaceKind::Panel, false) => {
                for child in children {
                    self.release(child);
                }
                changed = true;
            }
            _ => {
                for child in children {
                    if let Some(surface) = self.surfaces.get_mut(&child) {
                        changed |= surface.update_content(content.clone());
                    }
                }
            }
        }
        if changed {
            if let Some(surface) = self.surfaces.get_mut(&id) {
                surface.is_dirty = true;
            }
            self.dirty.insert(id);
        }
        changed
    }

    pub fn mark_dirty(&mut self, id: SurfaceId) -> bool {
        match self.surfaces.get_mut(&id) {
            Some(surface) => {
                surface.is_dirty = true;
                self.dirty.insert(id);
                true
            }
            None => false,
        }
    }

    /// Release a surface and all its descendants, returning every released id.
    pub fn release(&mut self, id: SurfaceId) -> Vec<SurfaceId> {
        let mut released = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if self.surfaces.remove(&current).is_some() {
                self.dirty.remove(&current);
                released.push(current);
                stack.extend(self.children_of(current));
            }
        }
        released
    }

    pub fn get(&self, id: SurfaceId) -> Option<&RenderedSurface> {
        self.surfaces.get(&id)
    }

    pub fn contains(&self, id: SurfaceId) -> bool {
        self.surfaces.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    pub fn take_dirty(&mut self) -> Vec<SurfaceId> {
        let ids: Vec<_> = std::mem::take(&mut self.dirty).into_iter().collect();
        for id in &ids {
            if let Some(surface) = self.surfaces.get_mut(id) {
                surface.is_dirty = false;
            }
        }
        ids
    }

    pub fn clear(&mut self) {
        self.surfaces.clear();
        self.dirty.clear();
    }

    fn children_of(&self, id: SurfaceId) -> Vec<SurfaceId> {
        self.surfaces
            .values()
            .filter(|s| s.parent == Some(id))
            .map(|s| s.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_wrapped() {
        let mut arena = SurfaceArena::new();
        let top = arena.mount("Position", SurfaceContent::label("12:4"));
        assert_eq!(arena.len(), 2);
        let inner = arena
            .surfaces
            .values()
            .find(|s| s.parent == Some(top))
            .map(|s| s.id)
            .unwrap();
        assert_eq!(arena.get(inner).unwrap().content.kind, SurfaceKind::Label);
        assert_eq!(arena.get(top).unwrap().content.kind, SurfaceKind::Panel);

        let released = arena.release(top);
        assert_eq!(released.len(), 2);
        assert!(arena.is_empty());
    }

    #[test]
    fn refresh_only_dirties_on_change() {
        let mut arena = SurfaceArena::new();
        let id = arena.mount("Encoding", SurfaceContent::text("UTF-8"));
        assert_eq!(arena.take_dirty(), vec![id]);

        assert!(!arena.refresh(id, SurfaceContent::text("UTF-8")));
        assert!(arena.take_dirty().is_empty());

        assert!(arena.refresh(id, SurfaceContent::text("UTF-16")));
        assert_eq!(arena.take_dirty(), vec![id]);
        assert_eq!(arena.get(id).unwrap().content.text, "UTF-16");
    }

    #[test]
    fn kind_change_rewraps_the_surface() {
        let mut arena = SurfaceArena::new();
        let id = arena.mount("Indent", SurfaceContent::text("4 spaces"));
        arena.take_dirty();
        assert_eq!(arena.len(), 1);

        assert!(arena.refresh(id, SurfaceContent::label("4 spaces")));
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.take_dirty(), vec![id]);
        assert!(!arena.refresh(id, SurfaceContent::label("4 spaces")));

        assert!(arena.refresh(id, SurfaceContent::text("4 spaces")));
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.take_dirty(), vec![id]);
    }

    #[test]
    fn width_defaults_to_padded_text() {
        assert_eq!(SurfaceContent::text("LF").with_padding(1).cell_width(), 4);
        assert_eq!(SurfaceContent::text("LF").with_width(9).cell_width(), 9);
    }
}
