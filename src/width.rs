//! Terminal display width helpers.
//!
//! Widget presentations may carry ANSI styling, so surface widths are measured
//! after stripping escape sequences.

/// Compute the display width of a string after stripping ANSI escapes.
pub fn display_width(text: &str) -> usize {
    let clean = strip_ansi_escapes::strip(text);
    let clean_str = String::from_utf8_lossy(&clean);
    unicode_width::UnicodeWidthStr::width(&*clean_str)
}

/// Display width clamped into a cell count.
pub fn cell_width(text: &str) -> u16 {
    display_width(text).min(u16::MAX as usize) as u16
}

/// Truncate `text` so that its display width does not exceed `max` cells.
///
/// Escape sequences occupy no cells and are copied whole, never split.
pub fn truncate_to_width(text: &str, max: u16) -> String {
    let mut out = String::new();
    let mut used = 0usize;
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            out.push(ch);
            match chars.next() {
                Some('[') => {
                    out.push('[');
                    // CSI: parameter and intermediate bytes up to a final byte.
                    for next in chars.by_ref() {
                        out.push(next);
                        if ('\x40'..='\x7e').contains(&next) {
                            break;
                        }
                    }
                }
                Some(next) => out.push(next),
                None => {}
            }
            continue;
        }
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > max as usize {
            break;
        }
        used += w;
        out.push(ch);
    }
    out
}

/// Whether `text` carries any escape sequence.
pub fn has_escapes(text: &str) -> bool {
    text.contains('\x1b')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ansi_sequences_have_no_width() {
        assert_eq!(display_width("\x1b[1mUTF-8\x1b[0m"), 5);
    }

    #[test]
    fn wide_glyphs_count_twice() {
        assert_eq!(cell_width("日本"), 4);
        assert_eq!(truncate_to_width("日本語", 5), "日本");
    }

    #[test]
    fn truncation_skips_and_keeps_escape_sequences() {
        let styled = "\x1b[1mUTF-8\x1b[0m";
        assert_eq!(truncate_to_width(styled, 5), styled);
        assert_eq!(truncate_to_width(styled, 3), "\x1b[1mUTF");
        assert_eq!(truncate_to_width("\x1b[38;5;196mred", 10), "\x1b[38;5;196mred");
        assert!(has_escapes(styled));
        assert!(!has_escapes("plain"));
    }
}
