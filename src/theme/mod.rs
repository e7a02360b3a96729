mod theme;

pub use theme::{Color, Style, Theme};

pub fn list_builtin_themes() -> Vec<&'static str> {
    vec!["gruvbox-dark", "nord"]
}

pub fn get_builtin_theme(name: &str) -> Option<Theme> {
    match name {
        "gruvbox-dark" => Some(Theme::gruvbox_dark()),
        "nord" => Some(Theme::nord()),
        _ => None,
    }
}
