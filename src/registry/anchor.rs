use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::widget::WidgetId;

/// Widget ids consulted, in order, when an anchor cannot be resolved.
pub const NOTIFICATIONS_WIDGET_ID: &str = "Notifications";
pub const FATAL_ERROR_WIDGET_ID: &str = "FatalError";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorRelation {
    Before,
    After,
}

/// One-time placement instruction for a right-zone widget.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Anchor {
    #[default]
    Default,
    Relative {
        relation: AnchorRelation,
        target: WidgetId,
    },
}

impl Anchor {
    pub fn before(target: impl Into<WidgetId>) -> Self {
        Self::Relative {
            relation: AnchorRelation::Before,
            target: target.into(),
        }
    }

    pub fn after(target: impl Into<WidgetId>) -> Self {
        Self::Relative {
            relation: AnchorRelation::After,
            target: target.into(),
        }
    }

    /// Parse `"<before|after> <widgetId>"`. Anything else is [`Anchor::Default`].
    pub fn parse(text: &str) -> Self {
        let mut parts = text.split_whitespace();
        let (Some(keyword), Some(target)) = (parts.next(), parts.next()) else {
            return Self::Default;
        };
        let relation = if keyword.eq_ignore_ascii_case("before") {
            AnchorRelation::Before
        } else if keyword.eq_ignore_ascii_case("after") {
            AnchorRelation::After
        } else {
            return Self::Default;
        };
        Self::Relative {
            relation,
            target: target.to_string(),
        }
    }
}

impl FromStr for Anchor {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => Ok(()),
            Self::Relative {
                relation: AnchorRelation::Before,
                target,
            } => write!(f, "before {target}"),
            Self::Relative {
                relation: AnchorRelation::After,
                target,
            } => write!(f, "after {target}"),
        }
    }
}

/// Insertion index for `anchor` within `sequence`.
///
/// A present target places the widget next to it. Otherwise the first present
/// sentinel is used as a `before` target, and failing that the widget is
/// appended.
pub fn resolve_insert_index(sequence: &[WidgetId], anchor: &Anchor, sentinels: &[WidgetId]) -> usize {
    let position = |id: &str| sequence.iter().position(|existing| existing == id);

    if let Anchor::Relative { relation, target } = anchor {
        if let Some(index) = position(target) {
            return match relation {
                AnchorRelation::Before => index,
                AnchorRelation::After => index + 1,
            };
        }
    }

    sentinels
        .iter()
        .find_map(|sentinel| position(sentinel))
        .unwrap_or(sequence.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(items: &[&str]) -> Vec<WidgetId> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_accepts_case_insensitive_keywords() {
        assert_eq!(Anchor::parse("BEFORE Encoding"), Anchor::before("Encoding"));
        assert_eq!(Anchor::parse("after   Position"), Anchor::after("Position"));
        assert_eq!(Anchor::parse("beside Position"), Anchor::Default);
        assert_eq!(Anchor::parse("after"), Anchor::Default);
        assert_eq!(Anchor::parse("__AUTODETECT__"), Anchor::Default);
        assert_eq!("after Git".parse::<Anchor>().unwrap(), Anchor::after("Git"));
    }

    #[test]
    fn display_round_trips_through_parse() {
        let anchor = Anchor::before("Memory");
        assert_eq!(Anchor::parse(&anchor.to_string()), anchor);
        assert_eq!(Anchor::Default.to_string(), "");
    }

    #[test]
    fn relative_targets_win() {
        let seq = ids(&["A", "B", "C"]);
        assert_eq!(resolve_insert_index(&seq, &Anchor::before("B"), &[]), 1);
        assert_eq!(resolve_insert_index(&seq, &Anchor::after("B"), &[]), 2);
        assert_eq!(resolve_insert_index(&seq, &Anchor::after("C"), &[]), 3);
    }

    #[test]
    fn stale_targets_fall_back_to_sentinels_then_end() {
        let sentinels = ids(&[NOTIFICATIONS_WIDGET_ID, FATAL_ERROR_WIDGET_ID]);
        let seq = ids(&["A", "FatalError", "B"]);
        assert_eq!(
            resolve_insert_index(&seq, &Anchor::before("nonexistent"), &sentinels),
            1
        );

        let seq = ids(&["A", "FatalError", "Notifications"]);
        assert_eq!(resolve_insert_index(&seq, &Anchor::Default, &sentinels), 2);

        let seq = ids(&["A", "B"]);
        assert_eq!(
            resolve_insert_index(&seq, &Anchor::before("nonexistent"), &sentinels),
            2
        );
    }
}
