//! Cursor editing over the working copy
//!
//! The cursor is a byte offset that always sits on a grapheme boundary, so
//! combining marks and emoji move and delete as one unit.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
    cursor: usize,
    /// First visible line
    pub scroll: usize,
}

impl TextBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            cursor: 0,
            scroll: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replace the contents, keeping the cursor in range
    pub fn reset(&mut self, text: impl Into<String>) {
        self.text = text.into();
        if self.cursor > self.text.len() || !self.text.is_char_boundary(self.cursor) {
            self.cursor = self.text.len();
        }
        self.cursor = self.snap(self.cursor);
    }

    pub fn insert_char(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn insert_str(&mut self, s: &str) {
        self.text.insert_str(self.cursor, s);
        self.cursor += s.len();
    }

    pub fn newline(&mut self) {
        self.insert_char('\n');
    }

    /// Delete the grapheme before the cursor
    pub fn backspace(&mut self) -> bool {
        match self.prev_boundary() {
            Some(start) => {
                self.text.replace_range(start..self.cursor, "");
                self.cursor = start;
                true
            }
            None => false,
        }
    }

    /// Delete the grapheme under the cursor
    pub fn delete(&mut self) -> bool {
        match self.next_boundary() {
            Some(end) => {
                self.text.replace_range(self.cursor..end, "");
                true
            }
            None => false,
        }
    }

    pub fn move_left(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.cursor = prev;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(next) = self.next_boundary() {
            self.cursor = next;
        }
    }

    pub fn home(&mut self) {
        self.cursor = self.line_start(self.cursor);
    }

    pub fn end(&mut self) {
        self.cursor = self.line_end(self.cursor);
    }

    pub fn move_up(&mut self) {
        let start = self.line_start(self.cursor);
        if start == 0 {
            self.cursor = 0;
            return;
        }
        let column = self.display_column();
        let prev_start = self.line_start(start - 1);
        self.cursor = self.offset_at_column(prev_start, column);
    }

    pub fn move_down(&mut self) {
        let end = self.line_end(self.cursor);
        if end == self.text.len() {
            self.cursor = end;
            return;
        }
        let column = self.display_column();
        self.cursor = self.offset_at_column(end + 1, column);
    }

    /// Zero-based line of the cursor
    pub fn cursor_line(&self) -> usize {
        self.text[..self.cursor].matches('\n').count()
    }

    /// Terminal column of the cursor within its line
    pub fn display_column(&self) -> usize {
        let start = self.line_start(self.cursor);
        self.text[start..self.cursor].width()
    }

    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }

    /// Adjust `scroll` so the cursor line is inside a window of `height` lines
    pub fn scroll_to_cursor(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        let line = self.cursor_line();
        if line < self.scroll {
            self.scroll = line;
        } else if line >= self.scroll + height {
            self.scroll = line + 1 - height;
        }
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.text[..self.cursor]
            .grapheme_indices(true)
            .next_back()
            .map(|(i, _)| i)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.text[self.cursor..]
            .graphemes(true)
            .next()
            .map(|g| self.cursor + g.len())
    }

    fn line_start(&self, offset: usize) -> usize {
        self.text[..offset].rfind('\n').map_or(0, |i| i + 1)
    }

    fn line_end(&self, offset: usize) -> usize {
        self.text[offset..]
            .find('\n')
            .map_or(self.text.len(), |i| offset + i)
    }

    /// Offset in the line starting at `start` closest to `column` without
    /// passing it
    fn offset_at_column(&self, start: usize, column: usize) -> usize {
        let end = self.line_end(start);
        let mut width = 0;
        for (i, g) in self.text[start..end].grapheme_indices(true) {
            let w = g.width();
            if width + w > column {
                return start + i;
            }
            width += w;
        }
        end
    }

    fn snap(&self, offset: usize) -> usize {
        let mut last = 0;
        for (i, _) in self.text.grapheme_indices(true) {
            if i > offset {
                break;
            }
            last = i;
        }
        if offset >= self.text.len() {
            self.text.len()
        } else {
            last
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_end(text: &str) -> TextBuffer {
        let mut buf = TextBuffer::new(text);
        buf.reset(text);
        while buf.next_boundary().is_some() {
            buf.move_right();
        }
        buf
    }

    #[test]
    fn test_insert_and_backspace() {
        let mut buf = TextBuffer::new("");
        for c in "<div>".chars() {
            buf.insert_char(c);
        }
        assert_eq!(buf.text(), "<div>");
        assert!(buf.backspace());
        assert_eq!(buf.text(), "<div");
        assert_eq!(buf.cursor(), 4);
    }

    #[test]
    fn test_backspace_removes_whole_grapheme() {
        let mut buf = at_end("ae\u{301}");
        assert!(buf.backspace());
        assert_eq!(buf.text(), "a");
    }

    #[test]
    fn test_backspace_at_start_is_noop() {
        let mut buf = TextBuffer::new("abc");
        assert!(!buf.backspace());
        assert_eq!(buf.text(), "abc");
    }

    #[test]
    fn test_delete_under_cursor() {
        let mut buf = TextBuffer::new("abc");
        buf.move_right();
        assert!(buf.delete());
        assert_eq!(buf.text(), "ac");
        buf.end();
        assert!(!buf.delete());
    }

    #[test]
    fn test_vertical_movement_keeps_column() {
        let mut buf = TextBuffer::new("hello\nhi\nworld");
        buf.move_right();
        buf.move_right();
        buf.move_right();
        buf.move_down();
        // "hi" is shorter, cursor clamps to its end
        assert_eq!(buf.cursor_line(), 1);
        assert_eq!(buf.display_column(), 2);
        buf.move_down();
        assert_eq!(buf.cursor_line(), 2);
        assert_eq!(buf.display_column(), 2);
        buf.move_up();
        buf.move_up();
        assert_eq!(buf.cursor_line(), 0);
    }

    #[test]
    fn test_newline_and_home_end() {
        let mut buf = TextBuffer::new("ab");
        buf.end();
        buf.newline();
        buf.insert_str("cd");
        assert_eq!(buf.text(), "ab\ncd");
        buf.home();
        assert_eq!(buf.display_column(), 0);
        assert_eq!(buf.cursor_line(), 1);
        assert_eq!(buf.line_count(), 2);
    }

    #[test]
    fn test_reset_clamps_cursor() {
        let mut buf = at_end("a long line of text");
        buf.reset("short");
        assert_eq!(buf.cursor(), 5);
    }

    #[test]
    fn test_scroll_follows_cursor() {
        let mut buf = TextBuffer::new("1\n2\n3\n4\n5\n6");
        for _ in 0..5 {
            buf.move_down();
        }
        buf.scroll_to_cursor(3);
        assert_eq!(buf.scroll, 3);
        for _ in 0..5 {
            buf.move_up();
        }
        buf.scroll_to_cursor(3);
        assert_eq!(buf.scroll, 0);
    }
}
