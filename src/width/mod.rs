//! Terminal display width helpers.
//!
//! ANSI-aware width calculation so label placement in the terminal surface
//! stays aligned even when content carries escape sequences or wide glyphs.

/// Compute the display width of a string after stripping ANSI escapes.
pub fn display_width(text: &str) -> usize {
    let clean = strip_ansi_escapes::strip(text);
    let clean_str = String::from_utf8_lossy(&clean);
    unicode_width::UnicodeWidthStr::width(&*clean_str)
}

/// Truncate `text` so its display width does not exceed `width`.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    if display_width(text) <= width {
        return text.to_string();
    }
    let mut out = String::new();
    for ch in text.chars() {
        out.push(ch);
        if display_width(&out) > width {
            out.pop();
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ansi_sequences_have_no_width() {
        assert_eq!(display_width("\x1b[31m1.0 in\x1b[0m"), 6);
    }

    #[test]
    fn wide_glyphs_count_double() {
        assert_eq!(display_width("宽"), 2);
    }

    #[test]
    fn truncation_respects_display_width() {
        assert_eq!(truncate_to_width("100.0 px", 5), "100.0");
        assert_eq!(truncate_to_width("ab", 5), "ab");
        assert_eq!(truncate_to_width("宽宽宽", 4), "宽宽");
    }
}
