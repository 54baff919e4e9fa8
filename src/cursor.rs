//! Terminal cursor and style helpers for composing ANSI sequences.
//!
//! All functions return owned `String`s or static slices so callers can write
//! them straight into the output buffer.

const CSI: &str = "\x1b[";

/// Move the cursor to an absolute 1-based `row` and `column`.
pub fn move_to(row: u16, column: u16) -> String {
    format!("{CSI}{row};{column}H")
}

/// Save the current cursor position.
pub fn save_position() -> &'static str {
    "\x1b[s"
}

/// Restore the most recently saved cursor position.
pub fn restore_position() -> &'static str {
    "\x1b[u"
}

/// Clear from the cursor to the end of the line.
pub fn clear_to_line_end() -> &'static str {
    "\x1b[K"
}

/// Select graphic rendition, e.g. `sgr("7")` for reverse video. An empty
/// parameter list yields nothing.
pub fn sgr(params: &str) -> String {
    if params.is_empty() {
        String::new()
    } else {
        format!("{CSI}{params}m")
    }
}

/// Reset all graphic rendition attributes.
pub fn reset_style() -> &'static str {
    "\x1b[0m"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_position_is_well_formed() {
        assert_eq!(move_to(3, 5), "\x1b[3;5H");
    }

    #[test]
    fn empty_rendition_is_omitted() {
        assert_eq!(sgr(""), "");
        assert_eq!(sgr("1;7"), "\x1b[1;7m");
    }
}
