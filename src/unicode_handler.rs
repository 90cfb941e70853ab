//! Display-width helpers for fitting text into terminal cells
//!
//! Prompts, file names and generated source can contain wide characters and
//! combining sequences, so everything is measured in terminal columns and cut
//! on grapheme boundaries.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Tab stop used when showing source in the editor pane
pub const TAB_WIDTH: usize = 4;

/// Calculate the display width of a string
pub fn display_width(s: &str) -> usize {
    s.width()
}

/// Truncate a string to fit within a maximum display width
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;

    for grapheme in s.graphemes(true) {
        let grapheme_width = grapheme.width();
        if current_width + grapheme_width > max_width {
            break;
        }
        result.push_str(grapheme);
        current_width += grapheme_width;
    }

    result
}

/// Like [`truncate_to_width`] but marks the cut with `…`
pub fn truncate_with_ellipsis(s: &str, max_width: usize) -> String {
    if display_width(s) <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let mut out = truncate_to_width(s, max_width - 1);
    out.push('…');
    out
}

/// Pad a string to a specific display width
pub fn pad_to_width(s: &str, target_width: usize) -> String {
    let current_width = display_width(s);
    if current_width >= target_width {
        return truncate_to_width(s, target_width);
    }
    format!("{}{}", s, " ".repeat(target_width - current_width))
}

/// Skip the first `columns` display columns of a line
pub fn skip_columns(s: &str, columns: usize) -> &str {
    let mut skipped = 0;
    for (i, grapheme) in s.grapheme_indices(true) {
        if skipped >= columns {
            return &s[i..];
        }
        skipped += grapheme.width();
    }
    ""
}

/// Replace tabs with spaces up to the next tab stop
pub fn expand_tabs(line: &str) -> String {
    if !line.contains('\t') {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len() + TAB_WIDTH);
    let mut column = 0;
    for grapheme in line.graphemes(true) {
        if grapheme == "\t" {
            let pad = TAB_WIDTH - column % TAB_WIDTH;
            out.push_str(&" ".repeat(pad));
            column += pad;
        } else {
            out.push_str(grapheme);
            column += grapheme.width();
        }
    }
    out
}

/// Single-line summary of multi-line text, for form fields
pub fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or("")
}
