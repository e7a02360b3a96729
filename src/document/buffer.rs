use ropey::{Rope, RopeSlice};
use std::ops::Range;

/// Plain text storage for a document. One line per block.
pub struct Buffer {
    text: Rope,
}

impl Buffer {
    pub fn new() -> Self {
        Self { text: Rope::new() }
    }

    pub fn from_text(s: &str) -> Self {
        Self {
            text: Rope::from_str(s),
        }
    }

    pub fn len_chars(&self) -> usize {
        self.text.len_chars()
    }

    pub fn line_count(&self) -> usize {
        self.text.len_lines()
    }

    pub fn line(&self, idx: usize) -> RopeSlice<'_> {
        self.text.line(idx)
    }

    pub fn line_len(&self, idx: usize) -> usize {
        // Length excluding newline character
        let line = self.text.line(idx);
        let len = line.len_chars();
        if len > 0 && line.char(len - 1) == '\n' {
            len - 1
        } else {
            len
        }
    }

    /// Line contents without the trailing newline
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.text
            .lines()
            .map(|l| l.to_string().trim_end_matches('\n').to_string())
    }

    pub fn char_to_line(&self, idx: usize) -> usize {
        self.text.char_to_line(idx.min(self.len_chars()))
    }

    pub fn line_to_char(&self, line: usize) -> usize {
        self.text.line_to_char(line.min(self.line_count()))
    }

    /// Convert a char index to (line, col)
    pub fn position(&self, idx: usize) -> (usize, usize) {
        let idx = idx.min(self.len_chars());
        let line = self.text.char_to_line(idx);
        (line, idx - self.text.line_to_char(line))
    }

    /// Text in `from..to`, empty if the range falls outside the buffer
    pub fn text_between(&self, from: usize, to: usize) -> String {
        if from > to || to > self.len_chars() {
            return String::new();
        }
        self.text.slice(from..to).to_string()
    }

    pub fn insert(&mut self, idx: usize, s: &str) {
        let idx = idx.min(self.len_chars());
        self.text.insert(idx, s);
    }

    pub fn remove(&mut self, range: Range<usize>) {
        let end = range.end.min(self.len_chars());
        let start = range.start.min(end);
        if start < end {
            self.text.remove(start..end);
        }
    }

    pub fn replace_all(&mut self, s: &str) {
        self.text = Rope::from_str(s);
    }

    pub fn contents(&self) -> String {
        self.text.to_string()
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_is_empty() {
        let buf = Buffer::new();
        assert_eq!(buf.line_count(), 1); // empty rope has 1 line
        assert_eq!(buf.len_chars(), 0);
    }

    #[test]
    fn line_len_excludes_newline() {
        let buf = Buffer::from_text("hello\nworld");
        assert_eq!(buf.line_len(0), 5);
        assert_eq!(buf.line_len(1), 5);
    }

    #[test]
    fn lines_strip_newlines() {
        let buf = Buffer::from_text("first\n\nthird");
        let lines: Vec<String> = buf.lines().collect();
        assert_eq!(lines, vec!["first", "", "third"]);
    }

    #[test]
    fn text_between_reads_range() {
        let buf = Buffer::from_text("hello ++");
        assert_eq!(buf.text_between(6, 8), "++");
        assert_eq!(buf.text_between(0, 5), "hello");
    }

    #[test]
    fn text_between_out_of_range_is_empty() {
        let buf = Buffer::from_text("hi");
        assert_eq!(buf.text_between(1, 5), "");
        assert_eq!(buf.text_between(2, 1), "");
    }

    #[test]
    fn text_between_counts_chars_not_bytes() {
        let buf = Buffer::from_text("a🤖...");
        assert_eq!(buf.len_chars(), 5);
        assert_eq!(buf.text_between(1, 5), "🤖...");
    }

    #[test]
    fn position_maps_index_to_line_col() {
        let buf = Buffer::from_text("ab\ncde");
        assert_eq!(buf.position(0), (0, 0));
        assert_eq!(buf.position(2), (0, 2));
        assert_eq!(buf.position(3), (1, 0));
        assert_eq!(buf.position(6), (1, 3));
    }

    #[test]
    fn insert_and_remove() {
        let mut buf = Buffer::from_text("helo");
        buf.insert(3, "l");
        assert_eq!(buf.contents(), "hello");
        buf.remove(0..1);
        assert_eq!(buf.contents(), "ello");
    }

    #[test]
    fn remove_clamps_to_buffer() {
        let mut buf = Buffer::from_text("abc");
        buf.remove(1..10);
        assert_eq!(buf.contents(), "a");
    }
}
