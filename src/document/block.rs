//! Line-level rich text: each buffer line is one block, written with a
//! markdown-like surface syntax.
//!
//! - `# `, `## `, `### ` heading
//! - `- ` bullet item
//! - `> ` quote
//! - `**bold**`, `*italic*`, `` `code` `` inline
//! - `\` before a markup character makes it literal

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    Heading(u8),
    Bullet,
    Quote,
}

impl BlockKind {
    pub fn of_line(line: &str) -> Self {
        split_prefix(line).0
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            BlockKind::Paragraph => "",
            BlockKind::Heading(1) => "# ",
            BlockKind::Heading(2) => "## ",
            BlockKind::Heading(_) => "### ",
            BlockKind::Bullet => "- ",
            BlockKind::Quote => "> ",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Marks {
    pub bold: bool,
    pub italic: bool,
    pub code: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub marks: Marks,
}

#[cfg(test)]
impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Marks::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub spans: Vec<Span>,
}

impl Block {
    pub fn parse(line: &str) -> Self {
        let (kind, rest) = split_prefix(line);
        Self {
            kind,
            spans: parse_inline(rest),
        }
    }

    /// Render back to the surface syntax. Markup characters in the text are
    /// escaped so that `Block::parse(&b.to_line()) == b` for normalized spans.
    pub fn to_line(&self) -> String {
        let mut body = String::new();
        let mut open = Marks::default();
        for span in self.spans.iter().filter(|s| !s.text.is_empty()) {
            push_toggles(&mut body, &mut open, span.marks);
            if span.marks.code {
                body.push('`');
                push_escaped(&mut body, &span.text);
                body.push('`');
            } else {
                push_escaped(&mut body, &span.text);
            }
        }
        push_toggles(&mut body, &mut open, Marks::default());

        let mut out = String::from(self.kind.prefix());
        // Paragraph text that reads as a block prefix
        if self.kind == BlockKind::Paragraph && BlockKind::of_line(&body) != BlockKind::Paragraph {
            out.push(ESCAPE);
        }
        out.push_str(&body);
        out
    }

    /// Text with all markup removed
    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Length in chars of the block prefix at the start of `line`
pub fn prefix_len(line: &str) -> usize {
    let (kind, _) = split_prefix(line);
    kind.prefix().chars().count()
}

fn split_prefix(line: &str) -> (BlockKind, &str) {
    const PREFIXES: [(&str, BlockKind); 5] = [
        ("### ", BlockKind::Heading(3)),
        ("## ", BlockKind::Heading(2)),
        ("# ", BlockKind::Heading(1)),
        ("- ", BlockKind::Bullet),
        ("> ", BlockKind::Quote),
    ];
    for (prefix, kind) in PREFIXES {
        if let Some(rest) = line.strip_prefix(prefix) {
            return (kind, rest);
        }
    }
    (BlockKind::Paragraph, line)
}

const ESCAPE: char = '\\';

/// Characters written with a leading `\` when they are text
const MARKUP: [char; 3] = ['\\', '*', '`'];

/// Characters a `\` makes literal when reading a line
const ESCAPABLE: [char; 6] = ['\\', '*', '`', '#', '-', '>'];

fn is_escape(chars: &[char], i: usize) -> bool {
    chars[i] == ESCAPE && chars.get(i + 1).is_some_and(|c| ESCAPABLE.contains(c))
}

fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        if MARKUP.contains(&c) {
            out.push(ESCAPE);
        }
        out.push(c);
    }
}

/// Emit the star toggles that move from `open` to `next`, bold pair first
fn push_toggles(out: &mut String, open: &mut Marks, next: Marks) {
    if open.bold != next.bold {
        out.push_str("**");
    }
    if open.italic != next.italic {
        out.push('*');
    }
    *open = next;
}

/// Next unescaped occurrence of `pat` at or after `start`
fn find_unescaped(chars: &[char], start: usize, pat: &[char]) -> Option<usize> {
    let mut i = start;
    while i + pat.len() <= chars.len() {
        if is_escape(chars, i) {
            i += 2;
        } else if chars[i..i + pat.len()] == *pat {
            return Some(i);
        } else {
            i += 1;
        }
    }
    None
}

/// A lone `*` (not part of `**`) at or after `start`
fn find_single_star(chars: &[char], start: usize) -> Option<usize> {
    let mut i = start;
    while i < chars.len() {
        if is_escape(chars, i) {
            i += 2;
        } else if chars[i] == '*' {
            if chars.get(i + 1) != Some(&'*') {
                return Some(i);
            }
            i += 2;
        } else {
            i += 1;
        }
    }
    None
}

pub fn parse_inline(s: &str) -> Vec<Span> {
    let mut spans: Vec<Span> = Vec::new();
    for (c, marks) in s.chars().zip(inline_marks(s)) {
        let Some(marks) = marks else { continue };
        match spans.last_mut() {
            Some(last) if last.marks == marks => last.text.push(c),
            _ => spans.push(Span {
                text: c.to_string(),
                marks,
            }),
        }
    }
    spans
}

/// Marks for every char of `s`, `None` for the markup characters themselves
pub fn inline_marks(s: &str) -> Vec<Option<Marks>> {
    let chars: Vec<char> = s.chars().collect();
    let mut out = Vec::with_capacity(chars.len());
    let mut marks = Marks::default();

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if is_escape(&chars, i) {
            out.extend([None, Some(marks)]);
            i += 2;
            continue;
        }
        if c == '`' {
            if let Some(end) = find_unescaped(&chars, i + 1, &['`']) {
                if end > i + 1 {
                    let code = Marks {
                        code: true,
                        ..marks
                    };
                    out.push(None);
                    let mut j = i + 1;
                    while j < end {
                        if is_escape(&chars, j) {
                            out.extend([None, Some(code)]);
                            j += 2;
                        } else {
                            out.push(Some(code));
                            j += 1;
                        }
                    }
                    out.push(None);
                    i = end + 1;
                    continue;
                }
            }
        } else if c == '*' && chars.get(i + 1) == Some(&'*') {
            if marks.bold || find_unescaped(&chars, i + 2, &['*', '*']).is_some() {
                marks.bold = !marks.bold;
                out.extend([None, None]);
                i += 2;
                continue;
            }
        } else if c == '*' && (marks.italic || find_single_star(&chars, i + 1).is_some()) {
            marks.italic = !marks.italic;
            out.push(None);
            i += 1;
            continue;
        }
        out.push(Some(marks));
        i += 1;
    }
    out
}
