use crate::registry::{Anchor, resolve_insert_index};
use crate::widget::WidgetId;

/// Horizontal region of the strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    Left,
    Center,
    Right,
}

impl Zone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::Left => "left",
            Zone::Center => "center",
            Zone::Right => "right",
        }
    }
}

/// Display order of widget ids across the three zones.
///
/// Left and right are ordered sequences. Center has a single primary slot;
/// the host-level status text lives alongside it on the instance.
#[derive(Debug, Default, Clone)]
pub struct ZoneLayout {
    left: Vec<WidgetId>,
    center: Option<WidgetId>,
    right: Vec<WidgetId>,
}

impl ZoneLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place `id` into `zone`. Only the right zone honours anchors. Returns the
    /// previous center occupant when a different widget displaces it.
    pub fn insert(
        &mut self,
        zone: Zone,
        id: &str,
        anchor: &Anchor,
        sentinels: &[WidgetId],
    ) -> Option<WidgetId> {
        match zone {
            Zone::Left => {
                self.left.push(id.to_string());
                None
            }
            Zone::Center => self.center.replace(id.to_string()).filter(|prev| prev != id),
            Zone::Right => {
                let index = resolve_insert_index(&self.right, anchor, sentinels);
                self.right.insert(index.min(self.right.len()), id.to_string());
                None
            }
        }
    }

    /// Remove `id` from `zone`; returns whether it was present.
    pub fn detach(&mut self, zone: Zone, id: &str) -> bool {
        match zone {
            Zone::Left => detach_from(&mut self.left, id),
            Zone::Right => detach_from(&mut self.right, id),
            Zone::Center => {
                if self.center.as_deref() == Some(id) {
                    self.center = None;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn left(&self) -> &[WidgetId] {
        &self.left
    }

    pub fn center(&self) -> Option<&str> {
        self.center.as_deref()
    }

    pub fn right(&self) -> &[WidgetId] {
        &self.right
    }

    pub fn position(&self, zone: Zone, id: &str) -> Option<usize> {
        match zone {
            Zone::Left => self.left.iter().position(|w| w == id),
            Zone::Right => self.right.iter().position(|w| w == id),
            Zone::Center => (self.center.as_deref() == Some(id)).then_some(0),
        }
    }

    pub fn len(&self) -> usize {
        self.left.len() + self.right.len() + usize::from(self.center.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.left.clear();
        self.center = None;
        self.right.clear();
    }
}

fn detach_from(sequence: &mut Vec<WidgetId>, id: &str) -> bool {
    match sequence.iter().position(|w| w == id) {
        Some(index) => {
            sequence.remove(index);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_zone_ignores_anchors() {
        let mut zones = ZoneLayout::new();
        zones.insert(Zone::Left, "A", &Anchor::Default, &[]);
        zones.insert(Zone::Left, "B", &Anchor::before("A"), &[]);
        assert_eq!(zones.left(), &["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn center_replacement_reports_previous_occupant() {
        let mut zones = ZoneLayout::new();
        assert_eq!(zones.insert(Zone::Center, "Info", &Anchor::Default, &[]), None);
        assert_eq!(
            zones.insert(Zone::Center, "NavBar", &Anchor::Default, &[]),
            Some("Info".to_string())
        );
        assert_eq!(zones.insert(Zone::Center, "NavBar", &Anchor::Default, &[]), None);
        assert_eq!(zones.center(), Some("NavBar"));
    }

    #[test]
    fn detach_is_idempotent() {
        let mut zones = ZoneLayout::new();
        zones.insert(Zone::Right, "A", &Anchor::Default, &[]);
        assert!(zones.detach(Zone::Right, "A"));
        assert!(!zones.detach(Zone::Right, "A"));
        assert!(zones.is_empty());
    }
}
