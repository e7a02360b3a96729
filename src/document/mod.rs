//! The rich-text document: a line-per-block rope plus a selection, with
//! structured (JSON), plain text and HTML views.

mod block;
mod buffer;
mod default_content;
mod html;
mod schema;
mod selection;

pub use block::{Block, BlockKind, Marks, inline_marks, prefix_len};
use buffer::Buffer;
pub use default_content::starter_document;
pub use schema::Node;
pub use selection::Selection;

pub struct Document {
    pub buffer: Buffer,
    pub selection: Selection,
}

impl Document {
    pub fn new() -> Self {
        Self {
            buffer: Buffer::new(),
            selection: Selection::default(),
        }
    }

    #[cfg(test)]
    pub fn from_text(s: &str) -> Self {
        Self {
            buffer: Buffer::from_text(s),
            selection: Selection::cursor(s.chars().count()),
        }
    }

    pub fn len_chars(&self) -> usize {
        self.buffer.len_chars()
    }

    pub fn cursor(&self) -> usize {
        self.selection.head
    }

    /// Text of the `n` chars immediately before the selection start
    pub fn text_before_cursor(&self, n: usize) -> String {
        let from = self.selection.from();
        if from < n {
            return String::new();
        }
        self.buffer.text_between(from - n, from)
    }

    // Content

    /// Replace the whole document. The cursor moves to the end.
    pub fn set_content(&mut self, doc: &Node) {
        let lines: Vec<String> = schema::doc_to_blocks(doc)
            .iter()
            .map(Block::to_line)
            .collect();
        self.buffer.replace_all(&lines.join("\n"));
        self.selection = Selection::cursor(self.buffer.len_chars());
    }

    pub fn blocks(&self) -> Vec<Block> {
        self.buffer.lines().map(|l| Block::parse(&l)).collect()
    }

    pub fn get_json(&self) -> Node {
        schema::blocks_to_doc(&self.blocks())
    }

    /// Plain text with markup removed, blocks separated by a blank line
    pub fn get_text(&self) -> String {
        self.blocks()
            .iter()
            .map(Block::plain_text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn get_html(&self) -> String {
        html::to_html(&self.get_json())
    }

    // Commands

    /// Insert text at the cursor, replacing any selection
    pub fn insert_content(&mut self, text: &str) {
        if !self.selection.is_empty() {
            self.delete_range(self.selection.from(), self.selection.to());
        }
        let at = self.selection.head;
        self.buffer.insert(at, text);
        self.selection = Selection::cursor(at + text.chars().count());
    }

    pub fn delete_range(&mut self, from: usize, to: usize) {
        let to = to.min(self.buffer.len_chars());
        if from >= to {
            return;
        }
        self.buffer.remove(from..to);
        self.selection.map_removal(from, to);
    }

    pub fn set_text_selection(&mut self, from: usize, to: usize) {
        let len = self.buffer.len_chars();
        self.selection = Selection::range(from.min(len), to.min(len));
    }

    pub fn select_all(&mut self) {
        self.selection = Selection::range(0, self.buffer.len_chars());
    }

    pub fn delete_backward(&mut self) {
        if !self.selection.is_empty() {
            self.delete_range(self.selection.from(), self.selection.to());
        } else if self.selection.head > 0 {
            let head = self.selection.head;
            self.delete_range(head - 1, head);
        }
    }

    pub fn delete_forward(&mut self) {
        if !self.selection.is_empty() {
            self.delete_range(self.selection.from(), self.selection.to());
        } else {
            let head = self.selection.head;
            self.delete_range(head, head + 1);
        }
    }

    // Motion

    pub fn move_left(&mut self, extend: bool) {
        let pos = if !extend && !self.selection.is_empty() {
            self.selection.from()
        } else {
            self.selection.head.saturating_sub(1)
        };
        self.selection.move_to(pos, extend);
    }

    pub fn move_right(&mut self, extend: bool) {
        let pos = if !extend && !self.selection.is_empty() {
            self.selection.to()
        } else {
            (self.selection.head + 1).min(self.buffer.len_chars())
        };
        self.selection.move_to(pos, extend);
    }

    pub fn move_up(&mut self, extend: bool) {
        let (line, col) = self.buffer.position(self.selection.head);
        let pos = if line == 0 {
            0
        } else {
            self.line_col_to_char(line - 1, col)
        };
        self.selection.move_to(pos, extend);
    }

    pub fn move_down(&mut self, extend: bool) {
        let (line, col) = self.buffer.position(self.selection.head);
        let pos = if line + 1 >= self.buffer.line_count() {
            self.buffer.len_chars()
        } else {
            self.line_col_to_char(line + 1, col)
        };
        self.selection.move_to(pos, extend);
    }

    pub fn move_to_line_start(&mut self, extend: bool) {
        let (line, _) = self.buffer.position(self.selection.head);
        let pos = self.buffer.line_to_char(line);
        self.selection.move_to(pos, extend);
    }

    pub fn move_to_line_end(&mut self, extend: bool) {
        let (line, _) = self.buffer.position(self.selection.head);
        let pos = self.buffer.line_to_char(line) + self.buffer.line_len(line);
        self.selection.move_to(pos, extend);
    }

    fn line_col_to_char(&self, line: usize, col: usize) -> usize {
        self.buffer.line_to_char(line) + col.min(self.buffer.line_len(line))
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
