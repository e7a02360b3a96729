#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// From a packed `0xRRGGBB` value
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: (rgb >> 16) as u8,
            g: (rgb >> 8) as u8,
            b: rgb as u8,
        }
    }

    pub fn to_crossterm(&self) -> crossterm::style::Color {
        crossterm::style::Color::Rgb {
            r: self.r,
            g: self.g,
            b: self.b,
        }
    }
}

/// Style for a piece of text (color + optional attributes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub fg: Color,
    pub bold: bool,
    pub italic: bool,
}

impl Style {
    pub const fn new(fg: Color) -> Self {
        Self {
            fg,
            bold: false,
            italic: false,
        }
    }

    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub const fn italic(mut self) -> Self {
        self.italic = true;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,

    // Surface
    pub background: Color,
    pub foreground: Color,
    pub selection: Color,
    pub muted: Color,

    // Rich text
    pub heading: Style,
    pub quote: Style,
    pub code: Color,
    pub bullet: Color,

    // Inputs and button
    pub input_bg: Color,
    pub input_focus_bg: Color,
    pub placeholder: Color,
    pub button_bg: Color,
    pub button_fg: Color,
    pub button_focus_bg: Color,

    // Status line
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    pub loading: Color,
    pub error: Color,
    pub info: Color,
}

impl Theme {
    /// Gruvbox Dark - warm retro theme
    pub fn gruvbox_dark() -> Self {
        Self {
            name: "gruvbox-dark".to_string(),
            background: Color::hex(0x282828),
            foreground: Color::hex(0xebdbb2),
            selection: Color::hex(0x504945),
            muted: Color::hex(0x665c54),

            heading: Style::new(Color::hex(0xfabd2f)).bold(),
            quote: Style::new(Color::hex(0x928374)).italic(),
            code: Color::hex(0x8ec07c),
            bullet: Color::hex(0xfe8019),

            input_bg: Color::hex(0x1d2021),
            input_focus_bg: Color::hex(0x3c3836),
            placeholder: Color::hex(0xa89984),
            button_bg: Color::hex(0x000000),
            button_fg: Color::hex(0xebdbb2),
            button_focus_bg: Color::hex(0x504945),

            status_bar_bg: Color::hex(0x3c3836),
            status_bar_fg: Color::hex(0xebdbb2),
            loading: Color::hex(0x83a598),
            error: Color::hex(0xfb4934),
            info: Color::hex(0xb8bb26),
        }
    }

    /// Nord - arctic blue theme
    pub fn nord() -> Self {
        Self {
            name: "nord".to_string(),
            background: Color::hex(0x2e3440),
            foreground: Color::hex(0xd8dee9),
            selection: Color::hex(0x434c5e),
            muted: Color::hex(0x4c566a),

            heading: Style::new(Color::hex(0x88c0d0)).bold(),
            quote: Style::new(Color::hex(0x616e88)).italic(),
            code: Color::hex(0xa3be8c),
            bullet: Color::hex(0x81a1c1),

            input_bg: Color::hex(0x3b4252),
            input_focus_bg: Color::hex(0x434c5e),
            placeholder: Color::hex(0x7b88a1),
            button_bg: Color::hex(0x242933),
            button_fg: Color::hex(0xeceff4),
            button_focus_bg: Color::hex(0x4c566a),

            status_bar_bg: Color::hex(0x3b4252),
            status_bar_fg: Color::hex(0xd8dee9),
            loading: Color::hex(0x88c0d0),
            error: Color::hex(0xbf616a),
            info: Color::hex(0xa3be8c),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::gruvbox_dark()
    }
}
