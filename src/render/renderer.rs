use std::io::{self, Write, stdout};

use crossterm::{
    cursor::{Hide, MoveTo, SetCursorStyle, Show},
    execute, queue,
    style::{Attribute, Print, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, Clear, ClearType, DisableLineWrap, EnableLineWrap, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::document::{BlockKind, Marks, inline_marks, prefix_len};
use crate::editor::{Editor, Focus, ToastKind};
use crate::theme::{Color, Style, Theme};

/// Blank columns before each recipient input
const INPUT_MARGIN: usize = 1;
const SEND_LABEL: &str = " Send ";

/// Rows taken by the recipient inputs (top) plus button and status (bottom)
const CHROME_ROWS: u16 = 3;

pub struct Renderer {
    pub width: u16,
    pub height: u16,
}

impl Renderer {
    pub fn new() -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self { width, height })
    }

    pub fn setup() -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            EnterAlternateScreen,
            DisableLineWrap,
            Hide,
            Clear(ClearType::All)
        )?;
        Ok(())
    }

    pub fn teardown() -> io::Result<()> {
        execute!(
            stdout(),
            SetCursorStyle::DefaultUserShape,
            Show,
            EnableLineWrap,
            LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Rows available to the document body
    pub fn text_height(&self) -> usize {
        self.height.saturating_sub(CHROME_ROWS) as usize
    }

    pub fn render(&self, editor: &Editor, theme: &Theme) -> io::Result<()> {
        let mut stdout = stdout();

        queue!(stdout, Hide)?;
        queue!(stdout, SetBackgroundColor(theme.background.to_crossterm()))?;

        self.render_inputs(&mut stdout, editor, theme)?;
        self.render_body(&mut stdout, editor, theme)?;
        self.render_send_button(&mut stdout, editor, theme)?;
        self.render_status_line(&mut stdout, editor, theme)?;
        self.position_cursor(&mut stdout, editor)?;

        stdout.flush()?;
        Ok(())
    }

    fn render_inputs(
        &self,
        stdout: &mut impl Write,
        editor: &Editor,
        theme: &Theme,
    ) -> io::Result<()> {
        let half = self.width / 2;
        let fields = [
            (&editor.from_input, "from", Focus::From, 0),
            (&editor.to_input, "to", Focus::To, half),
        ];

        for (value, placeholder, focus, x) in fields {
            let field_width = half as usize;
            queue!(stdout, MoveTo(x, 0))?;
            queue!(stdout, SetBackgroundColor(theme.background.to_crossterm()))?;
            queue!(stdout, Print(" ".repeat(INPUT_MARGIN)))?;

            let bg = if editor.focus == focus {
                theme.input_focus_bg
            } else {
                theme.input_bg
            };
            let (text, fg) = if value.is_empty() {
                (placeholder, theme.placeholder)
            } else {
                (value.as_str(), theme.foreground)
            };
            let room = field_width.saturating_sub(INPUT_MARGIN + 1);
            queue!(stdout, SetBackgroundColor(bg.to_crossterm()))?;
            queue!(stdout, SetForegroundColor(fg.to_crossterm()))?;
            queue!(stdout, Print(pad_to_width(&tail_to_width(text, room), room)))?;
            queue!(stdout, SetBackgroundColor(theme.background.to_crossterm()))?;
            queue!(stdout, Print(" "))?;
        }
        Ok(())
    }

    fn render_body(
        &self,
        stdout: &mut impl Write,
        editor: &Editor,
        theme: &Theme,
    ) -> io::Result<()> {
        let doc = &editor.doc;
        let buffer = &doc.buffer;
        let width = self.width as usize;
        let (sel_from, sel_to) = (doc.selection.from(), doc.selection.to());

        for row in 0..self.text_height() {
            let line_idx = row + editor.scroll_offset;
            queue!(stdout, MoveTo(0, 1 + row as u16))?;
            queue!(stdout, SetBackgroundColor(theme.background.to_crossterm()))?;

            if line_idx >= buffer.line_count() {
                queue!(stdout, Print(" ".repeat(width)))?;
                continue;
            }

            let line: String = buffer.line(line_idx).chars().filter(|c| *c != '\n').collect();
            let line_start = buffer.line_to_char(line_idx);
            let kind = BlockKind::of_line(&line);
            let body_style = block_style(kind, theme);
            let prefix = prefix_len(&line);
            let rest: String = line.chars().skip(prefix).collect();
            let marks: Vec<Option<Marks>> = inline_marks(&rest);

            let mut used = 0;
            let mut current: Option<(Color, Color, bool, bool)> = None;
            for (i, ch) in line.chars().enumerate() {
                let w = ch.width().unwrap_or(0);
                if used + w > width {
                    break;
                }
                let pos = line_start + i;
                let selected = pos >= sel_from && pos < sel_to;
                let inline = if i < prefix {
                    None
                } else {
                    marks.get(i - prefix).copied().flatten()
                };
                let (fg, bold, italic) = match inline {
                    _ if i < prefix => (prefix_color(kind, theme), body_style.bold, false),
                    None => (theme.muted, false, false),
                    Some(m) if m.code => (theme.code, body_style.bold || m.bold, m.italic),
                    Some(m) => (
                        body_style.fg,
                        body_style.bold || m.bold,
                        body_style.italic || m.italic,
                    ),
                };
                let bg = if selected {
                    theme.selection
                } else {
                    theme.background
                };
                let look = (fg, bg, bold, italic);
                if current != Some(look) {
                    apply_look(stdout, look)?;
                    current = Some(look);
                }
                queue!(stdout, Print(ch))?;
                used += w;
            }

            // A selected line break shows as one highlighted cell
            let newline_selected = line_start + line.chars().count() >= sel_from
                && line_start + line.chars().count() < sel_to;
            queue!(stdout, SetAttribute(Attribute::Reset))?;
            if newline_selected && used < width {
                queue!(stdout, SetBackgroundColor(theme.selection.to_crossterm()))?;
                queue!(stdout, Print(" "))?;
                used += 1;
            }
            queue!(stdout, SetBackgroundColor(theme.background.to_crossterm()))?;
            queue!(stdout, Print(" ".repeat(width.saturating_sub(used))))?;
        }
        Ok(())
    }

    fn render_send_button(
        &self,
        stdout: &mut impl Write,
        editor: &Editor,
        theme: &Theme,
    ) -> io::Result<()> {
        let row = self.height.saturating_sub(2);
        queue!(stdout, MoveTo(0, row))?;
        queue!(stdout, SetBackgroundColor(theme.background.to_crossterm()))?;
        queue!(stdout, Clear(ClearType::CurrentLine))?;

        let bg = if editor.focus == Focus::Send {
            theme.button_focus_bg
        } else {
            theme.button_bg
        };
        let x = self.width.saturating_sub(SEND_LABEL.len() as u16 + 1);
        queue!(stdout, MoveTo(x, row))?;
        queue!(stdout, SetBackgroundColor(bg.to_crossterm()))?;
        queue!(stdout, SetForegroundColor(theme.button_fg.to_crossterm()))?;
        queue!(stdout, SetAttribute(Attribute::Bold))?;
        queue!(stdout, Print(SEND_LABEL))?;
        queue!(stdout, SetAttribute(Attribute::Reset))?;
        queue!(stdout, SetBackgroundColor(theme.background.to_crossterm()))?;
        Ok(())
    }

    fn render_status_line(
        &self,
        stdout: &mut impl Write,
        editor: &Editor,
        theme: &Theme,
    ) -> io::Result<()> {
        let row = self.height.saturating_sub(1);
        let width = self.width as usize;
        queue!(stdout, MoveTo(0, row))?;

        // Toasts take over the whole line
        if let Some(toast) = &editor.toast {
            let color = match toast.kind {
                ToastKind::Info => theme.info,
                ToastKind::Error => theme.error,
            };
            queue!(stdout, SetBackgroundColor(theme.background.to_crossterm()))?;
            queue!(stdout, SetForegroundColor(color.to_crossterm()))?;
            queue!(stdout, Clear(ClearType::CurrentLine))?;
            queue!(stdout, Print(tail_to_width(&format!(" {}", toast.message), width)))?;
            return Ok(());
        }

        let (left, right) = status_text(editor);
        let status = join_status(&left, &right, width);

        queue!(stdout, SetBackgroundColor(theme.status_bar_bg.to_crossterm()))?;
        queue!(stdout, SetForegroundColor(theme.status_bar_fg.to_crossterm()))?;
        if editor.completion.is_loading() {
            // Draw the loading indicator in its own colour
            let split = left.len().min(status.len());
            queue!(stdout, Print(&status[..split]))?;
            queue!(stdout, SetForegroundColor(theme.loading.to_crossterm()))?;
            queue!(stdout, Print(&status[split..]))?;
        } else {
            queue!(stdout, Print(status))?;
        }
        queue!(stdout, SetBackgroundColor(theme.background.to_crossterm()))?;
        Ok(())
    }

    fn position_cursor(&self, stdout: &mut impl Write, editor: &Editor) -> io::Result<()> {
        match editor.focus {
            Focus::Body => {
                let doc = &editor.doc;
                let (line, col) = doc.buffer.position(doc.cursor());
                if line < editor.scroll_offset
                    || line - editor.scroll_offset >= self.text_height()
                {
                    queue!(stdout, Hide)?;
                    return Ok(());
                }
                let text: String = doc.buffer.line(line).chars().take(col).collect();
                let x = UnicodeWidthStr::width(text.as_str()).min(self.width as usize) as u16;
                let y = 1 + (line - editor.scroll_offset) as u16;
                queue!(stdout, MoveTo(x, y))?;
                queue!(stdout, SetCursorStyle::BlinkingBar)?;
                queue!(stdout, Show)?;
            }
            Focus::From | Focus::To => {
                let (value, x0) = if editor.focus == Focus::From {
                    (&editor.from_input, 0)
                } else {
                    (&editor.to_input, self.width / 2)
                };
                let room = ((self.width / 2) as usize).saturating_sub(INPUT_MARGIN + 1);
                let shown = UnicodeWidthStr::width(value.as_str()).min(room);
                queue!(stdout, MoveTo(x0 + (INPUT_MARGIN + shown) as u16, 0))?;
                queue!(stdout, SetCursorStyle::BlinkingBar)?;
                queue!(stdout, Show)?;
            }
            Focus::Send => queue!(stdout, Hide)?,
        }
        Ok(())
    }
}

fn block_style(kind: BlockKind, theme: &Theme) -> Style {
    match kind {
        BlockKind::Heading(_) => theme.heading,
        BlockKind::Quote => theme.quote,
        BlockKind::Paragraph | BlockKind::Bullet => Style::new(theme.foreground),
    }
}

fn prefix_color(kind: BlockKind, theme: &Theme) -> Color {
    match kind {
        BlockKind::Bullet => theme.bullet,
        _ => theme.muted,
    }
}

fn apply_look(
    stdout: &mut impl Write,
    (fg, bg, bold, italic): (Color, Color, bool, bool),
) -> io::Result<()> {
    queue!(stdout, SetAttribute(Attribute::Reset))?;
    queue!(stdout, SetForegroundColor(fg.to_crossterm()))?;
    queue!(stdout, SetBackgroundColor(bg.to_crossterm()))?;
    if bold {
        queue!(stdout, SetAttribute(Attribute::Bold))?;
    }
    if italic {
        queue!(stdout, SetAttribute(Attribute::Italic))?;
    }
    Ok(())
}

/// Left and right halves of the status line
fn status_text(editor: &Editor) -> (String, String) {
    let mut left = format!(" {} ", editor.save_status.display());
    if editor.completion.is_loading() {
        left.push_str("| writing... ");
    }
    let (line, col) = editor.doc.buffer.position(editor.doc.cursor());
    let right = format!(" {}:{} ", line + 1, col + 1);
    (left, right)
}

fn join_status(left: &str, right: &str, width: usize) -> String {
    let padding = width.saturating_sub(left.len() + right.len());
    let status = format!("{}{}{}", left, " ".repeat(padding), right);
    status.chars().take(width).collect()
}

/// Last part of `s` that fits in `width` columns
fn tail_to_width(s: &str, width: usize) -> String {
    let mut used = 0;
    let mut out: Vec<char> = Vec::new();
    for ch in s.chars().rev() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.into_iter().rev().collect()
}

fn pad_to_width(s: &str, width: usize) -> String {
    let used = UnicodeWidthStr::width(s);
    format!("{}{}", s, " ".repeat(width.saturating_sub(used)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::editor_with_text;

    #[test]
    fn tail_keeps_end_of_long_input() {
        assert_eq!(tail_to_width("hello world", 5), "world");
        assert_eq!(tail_to_width("hi", 5), "hi");
        // Wide characters count as two columns
        assert_eq!(tail_to_width("日本語", 4), "本語");
    }

    #[test]
    fn pad_fills_display_columns() {
        assert_eq!(pad_to_width("ab", 4), "ab  ");
        assert_eq!(pad_to_width("日", 3), "日 ");
        assert_eq!(pad_to_width("abcdef", 3), "abcdef");
    }

    #[test]
    fn status_shows_save_state_and_position() {
        let (editor, _client, _rx) = editor_with_text("ab\ncd");
        let (left, right) = status_text(&editor);
        assert_eq!(left, " Saved ");
        assert_eq!(right, " 2:3 ");
        assert_eq!(join_status(&left, &right, 14), " Saved    2:3 ");
    }

    #[test]
    fn status_shows_loading_indicator() {
        let (mut editor, _client, _rx) = editor_with_text("x ");
        for c in "++".chars() {
            editor.insert_char(c, std::time::Instant::now());
        }
        let (left, _) = status_text(&editor);
        assert!(left.contains("writing..."));
        assert!(left.starts_with(" Unsaved "));
    }

    #[test]
    fn block_styles_follow_theme() {
        let theme = Theme::default();
        assert!(block_style(BlockKind::Heading(1), &theme).bold);
        assert!(block_style(BlockKind::Quote, &theme).italic);
        assert_eq!(prefix_color(BlockKind::Bullet, &theme), theme.bullet);
        assert_eq!(prefix_color(BlockKind::Heading(2), &theme), theme.muted);
    }
}
