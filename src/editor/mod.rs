mod editor;
mod focus;
mod session;

pub use editor::{EditOrigin, Editor, ToastKind};
pub use focus::Focus;
pub use session::{SaveStatus, SessionContext};

#[cfg(test)]
pub(crate) use editor::tests::editor_with_text;
