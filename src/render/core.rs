use std::io::Write;

use crate::cursor;
use crate::error::Result;
use crate::geometry::{Point, Rect};
use crate::layout::{PlacedSurface, StripLayout};
use crate::pointer::{EffectKind, EffectTarget};
use crate::surface::{SurfaceArena, SurfaceContent};
use crate::width::{display_width, has_escapes, truncate_to_width};

/// Renderer runtime parameters.
#[derive(Debug, Clone)]
pub struct RendererSettings {
    /// SGR parameters applied to the hovered surface.
    pub hover_style: String,
    /// SGR parameters applied to the pressed surface.
    pub pressed_style: String,
    /// Wrap each frame in save/restore so the caller's cursor stays put.
    pub preserve_cursor: bool,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            hover_style: "7".to_string(),
            pressed_style: "1;7".to_string(),
            preserve_cursor: true,
        }
    }
}

/// Everything needed to paint one strip.
#[derive(Debug, Clone, Copy)]
pub struct StripView<'a> {
    /// Window position of the strip's first cell.
    pub origin: Point,
    pub layout: &'a StripLayout,
    pub surfaces: &'a SurfaceArena,
    pub effect: Option<EffectTarget>,
    pub info: &'a str,
}

/// Writes a status-bar strip to a terminal as ANSI text.
pub struct StripRenderer {
    settings: RendererSettings,
}

impl StripRenderer {
    pub fn new(settings: RendererSettings) -> Self {
        Self { settings }
    }

    pub fn with_default() -> Self {
        Self::new(RendererSettings::default())
    }

    pub fn settings_mut(&mut self) -> &mut RendererSettings {
        &mut self.settings
    }

    pub fn render(&mut self, writer: &mut impl Write, view: &StripView<'_>) -> Result<()> {
        if view.layout.strip.is_empty() {
            return Ok(());
        }
        if self.settings.preserve_cursor {
            write!(writer, "{}", cursor::save_position())?;
        }

        let row = view.origin.y + 1;
        write!(writer, "{}", cursor::move_to(row, view.origin.x + 1))?;
        write!(writer, "{}", cursor::clear_to_line_end())?;

        let placed = view
            .layout
            .left
            .iter()
            .chain(view.layout.center.iter())
            .chain(view.layout.right.iter());
        for surface in placed {
            self.render_surface(writer, view, surface)?;
        }

        let info = view.layout.info;
        if !info.is_empty() && !view.info.is_empty() {
            write!(writer, "{}", cursor::move_to(row, view.origin.x + info.x + 1))?;
            write!(writer, "{}", fit(&format!(" {}", view.info), info.width, false))?;
        }

        if self.settings.preserve_cursor {
            write!(writer, "{}", cursor::restore_position())?;
        }
        writer.flush()?;
        Ok(())
    }

    fn render_surface(
        &self,
        writer: &mut impl Write,
        view: &StripView<'_>,
        placed: &PlacedSurface,
    ) -> Result<()> {
        let Rect { x, width, .. } = placed.rect;
        if width == 0 {
            return Ok(());
        }
        let Some(surface) = view.surfaces.get(placed.surface) else {
            return Ok(());
        };

        let style = match view.effect {
            Some(target) if target.surface == placed.surface => match target.kind {
                EffectKind::Hover => cursor::sgr(&self.settings.hover_style),
                EffectKind::Pressed => cursor::sgr(&self.settings.pressed_style),
            },
            _ => String::new(),
        };

        write!(
            writer,
            "{}",
            cursor::move_to(view.origin.y + 1, view.origin.x + x + 1)
        )?;
        write!(writer, "{style}{}", padded(&surface.content, width))?;
        if !style.is_empty() {
            write!(writer, "{}", cursor::reset_style())?;
        }
        Ok(())
    }
}

fn padded(content: &SurfaceContent, width: u16) -> String {
    let pad = " ".repeat(content.padding as usize);
    fit(&format!("{pad}{}{pad}", content.text), width, true)
}

/// Truncate or space-fill `text` to exactly `width` cells. Centering splits
/// the slack evenly, extra cell on the right.
fn fit(text: &str, width: u16, center: bool) -> String {
    let mut clipped = truncate_to_width(text, width);
    if has_escapes(&clipped) {
        clipped.push_str(cursor::reset_style());
    }
    let slack = (width as usize).saturating_sub(display_width(&clipped));
    let (before, after) = if center {
        (slack / 2, slack - slack / 2)
    } else {
        (0, slack)
    };
    format!("{}{clipped}{}", " ".repeat(before), " ".repeat(after))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::StripItem;
    use crate::surface::SurfaceId;

    fn strip(arena: &mut SurfaceArena) -> (StripLayout, SurfaceId) {
        let git = arena.mount("Git", SurfaceContent::text("main").with_padding(1));
        let tools = arena.mount("Tools", SurfaceContent::label("T"));
        let layout = StripLayout::solve(
            20,
            &[StripItem {
                widget_id: "Tools".into(),
                surface: tools,
                width: 1,
            }],
            None,
            &[StripItem {
                widget_id: "Git".into(),
                surface: git,
                width: 6,
            }],
        );
        (layout, git)
    }

    #[test]
    fn fit_pads_and_truncates() {
        assert_eq!(fit("ab", 5, false), "ab   ");
        assert_eq!(fit("ab", 5, true), " ab  ");
        assert_eq!(fit("abcdef", 3, false), "abc");
    }

    #[test]
    fn styled_text_is_clipped_by_cells_and_reset() {
        let mut arena = SurfaceArena::new();
        let encoding = arena.mount("Encoding", SurfaceContent::text("\x1b[1mUTF-8\x1b[0m"));
        let layout = StripLayout::solve(
            20,
            &[],
            None,
            &[StripItem {
                widget_id: "Encoding".into(),
                surface: encoding,
                width: 4,
            }],
        );
        let view = StripView {
            origin: Point::new(0, 0),
            layout: &layout,
            surfaces: &arena,
            effect: None,
            info: "",
        };

        let mut output = Vec::new();
        let mut renderer = StripRenderer::with_default();
        renderer.settings_mut().preserve_cursor = false;
        renderer.render(&mut output, &view).unwrap();

        let rendered = String::from_utf8(output).unwrap();
        assert!(rendered.contains("\u{1b}[1;17H\u{1b}[1mUTF-\u{1b}[0m"));
        assert!(rendered.ends_with("\u{1b}[0m"));
        assert_eq!(
            fit("\x1b[1mUTF-8\x1b[0m", 7, false),
            "\x1b[1mUTF-8\x1b[0m\x1b[0m  "
        );
    }

    #[test]
    fn writes_surfaces_at_strip_positions() {
        let mut arena = SurfaceArena::new();
        let (layout, _) = strip(&mut arena);
        let view = StripView {
            origin: Point::new(0, 23),
            layout: &layout,
            surfaces: &arena,
            effect: None,
            info: "Indexing",
        };

        let mut output = Vec::new();
        let mut renderer = StripRenderer::with_default();
        renderer.settings_mut().preserve_cursor = false;
        renderer.render(&mut output, &view).unwrap();

        let rendered = String::from_utf8(output).unwrap();
        assert!(rendered.starts_with("\u{1b}[24;1H\u{1b}[K"));
        assert!(rendered.contains("\u{1b}[24;1HT"));
        assert!(rendered.contains("\u{1b}[24;15H main "));
        assert!(rendered.contains("\u{1b}[24;2H Indexing"));
    }

    #[test]
    fn effect_target_is_highlighted_and_reset() {
        let mut arena = SurfaceArena::new();
        let (layout, git) = strip(&mut arena);
        let view = StripView {
            origin: Point::new(0, 0),
            layout: &layout,
            surfaces: &arena,
            effect: Some(EffectTarget {
                surface: git,
                kind: EffectKind::Pressed,
            }),
            info: "",
        };

        let mut output = Vec::new();
        StripRenderer::with_default()
            .render(&mut output, &view)
            .unwrap();

        let rendered = String::from_utf8(output).unwrap();
        assert!(rendered.starts_with(cursor::save_position()));
        assert!(rendered.contains("\u{1b}[1;7m main \u{1b}[0m"));
        assert!(rendered.ends_with(cursor::restore_position()));
    }
}
