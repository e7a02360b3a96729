//! "Send": copy the document as HTML to the system clipboard.

use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;

use crate::error::ClipboardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyStatus {
    Copied,
    Failed,
}

impl CopyStatus {
    pub fn message(&self) -> &'static str {
        match self {
            CopyStatus::Copied => "Copied!",
            CopyStatus::Failed => "Failed to copy text",
        }
    }
}

pub trait ClipboardWriter: Send + Sync {
    fn write_text(&self, text: String) -> BoxFuture<'static, Result<(), ClipboardError>>;
}

/// The platform clipboard. The handle is created on first use and kept, as
/// some platforms drop the contents when their owner goes away.
#[derive(Clone, Default)]
pub struct SystemClipboard {
    inner: Arc<Mutex<Option<arboard::Clipboard>>>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardWriter for SystemClipboard {
    fn write_text(&self, text: String) -> BoxFuture<'static, Result<(), ClipboardError>> {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            tokio::task::spawn_blocking(move || {
                let mut guard = inner
                    .lock()
                    .map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
                if guard.is_none() {
                    let clipboard = arboard::Clipboard::new()
                        .map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
                    *guard = Some(clipboard);
                }
                match guard.as_mut() {
                    Some(clipboard) => clipboard
                        .set_text(text)
                        .map_err(|e| ClipboardError::WriteFailed(e.to_string())),
                    None => Err(ClipboardError::Unavailable("no clipboard".to_string())),
                }
            })
            .await
            .map_err(|e| ClipboardError::WriteFailed(e.to_string()))?
        })
    }
}

/// Write `text` to the clipboard, reporting the outcome instead of failing
pub async fn copy_text(clipboard: &dyn ClipboardWriter, text: String) -> CopyStatus {
    let len = text.len();
    match clipboard.write_text(text).await {
        Ok(()) => {
            tracing::info!(target: "clipboard", bytes = len, "document copied");
            CopyStatus::Copied
        }
        Err(e) => {
            tracing::warn!(target: "clipboard", error = %e, "copy failed");
            CopyStatus::Failed
        }
    }
}
