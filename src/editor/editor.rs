use std::time::{Duration, Instant};

use super::{Focus, SaveStatus, SessionContext};
use crate::clipboard::CopyStatus;
use crate::completion::{Completion, PLACEHOLDER, TRIGGER};
use crate::config::Settings;
use crate::document::{Document, Node, starter_document};
use crate::storage::{CONTENT_KEY, KeyValueStore};

/// Who changed the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOrigin {
    User,
    Completion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
    pub expires: Instant,
}

pub struct Editor {
    pub doc: Document,
    pub focus: Focus,
    pub from_input: String,
    pub to_input: String,
    pub save_status: SaveStatus,
    pub toast: Option<Toast>,
    pub completion: Completion,
    pub session: SessionContext,
    pub running: bool,
    pub scroll_offset: usize,
    toast_duration: Duration,
}

impl Editor {
    pub fn new(settings: &Settings, completion: Completion) -> Self {
        Self {
            doc: Document::new(),
            focus: Focus::default(),
            from_input: String::new(),
            to_input: String::new(),
            save_status: SaveStatus::Saved,
            toast: None,
            completion,
            session: SessionContext::new(
                Duration::from_millis(settings.debounce_ms),
                Duration::from_millis(settings.saved_delay_ms),
            ),
            running: true,
            scroll_offset: 0,
            toast_duration: Duration::from_millis(settings.toast_ms),
        }
    }

    /// Load persisted content into the document, once per session.
    /// Returns true if the document was set.
    pub fn hydrate(&mut self, store: &dyn KeyValueStore) -> bool {
        if self.session.hydrated {
            return false;
        }
        let doc = match store.get(CONTENT_KEY) {
            Some(value) => serde_json::from_value::<Node>(value).unwrap_or_else(|e| {
                tracing::warn!(target: "storage", error = %e, "stored content unreadable, using starter document");
                starter_document()
            }),
            None => starter_document(),
        };
        self.doc.set_content(&doc);
        self.session.hydrated = true;
        tracing::info!(target: "editor", chars = self.doc.len_chars(), "document hydrated");
        true
    }

    /// Called after every document change
    pub fn on_update(&mut self, origin: EditOrigin, now: Instant) {
        self.save_status = SaveStatus::Unsaved;

        if origin == EditOrigin::User
            && !self.completion.is_loading()
            && self.doc.text_before_cursor(2) == TRIGGER
        {
            let from = self.doc.selection.from();
            self.doc.delete_range(from - 2, from);
            let prompt = self.doc.get_text();
            self.doc.insert_content(PLACEHOLDER);
            if self.completion.start(prompt).is_some() {
                tracing::info!(target: "analytics", event = "Autocomplete Shortcut Used");
            }
        } else {
            self.session.debounce.schedule(now);
        }
    }

    /// Write the document to the store and show the cosmetic save transition
    pub fn flush(&mut self, store: &mut dyn KeyValueStore, now: Instant) {
        let json = match serde_json::to_value(self.doc.get_json()) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(target: "storage", error = %e, "failed to serialize document");
                return;
            }
        };
        self.save_status = SaveStatus::Saving;
        if let Err(e) = store.set(CONTENT_KEY, json) {
            tracing::error!(target: "storage", error = %e, "failed to persist document");
        }
        self.session.saved_at = Some(now + self.session.saved_delay);
    }

    /// Write a pending debounced flush right away (used on quit)
    pub fn flush_pending(&mut self, store: &mut dyn KeyValueStore, now: Instant) {
        if self.session.debounce.is_pending() {
            self.session.debounce.cancel();
            self.flush(store, now);
        }
    }

    /// Advance timers: debounced flush, "Saved" transition, toast expiry
    pub fn poll_timers(&mut self, now: Instant, store: &mut dyn KeyValueStore) {
        if self.session.debounce.fire_if_due(now) {
            self.flush(store, now);
        }
        if let Some(at) = self.session.saved_at {
            if at <= now {
                self.session.saved_at = None;
                self.save_status = SaveStatus::Saved;
            }
        }
        if self.toast.as_ref().is_some_and(|t| t.expires <= now) {
            self.toast = None;
        }
    }

    /// Earliest instant at which `poll_timers` has something to do
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.session.debounce.deadline(),
            self.session.saved_at,
            self.toast.as_ref().map(|t| t.expires),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    pub fn show_toast(&mut self, kind: ToastKind, message: impl Into<String>, now: Instant) {
        self.toast = Some(Toast {
            kind,
            message: message.into(),
            expires: now + self.toast_duration,
        });
    }

    pub fn clear_toast(&mut self) {
        self.toast = None;
    }

    pub fn show_copy_status(&mut self, status: CopyStatus, now: Instant) {
        let kind = match status {
            CopyStatus::Copied => ToastKind::Info,
            CopyStatus::Failed => ToastKind::Error,
        };
        self.show_toast(kind, status.message(), now);
    }

    /// Adjust scroll offset to keep cursor visible within viewport
    pub fn adjust_scroll(&mut self, viewport_height: usize) {
        let (line, _) = self.doc.buffer.position(self.doc.cursor());
        if line < self.scroll_offset {
            self.scroll_offset = line;
        }
        if viewport_height > 0 && line >= self.scroll_offset + viewport_height {
            self.scroll_offset = line - viewport_height + 1;
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    // Text editing

    pub fn insert_char(&mut self, ch: char, now: Instant) {
        let mut buf = [0u8; 4];
        self.doc.insert_content(ch.encode_utf8(&mut buf));
        self.on_update(EditOrigin::User, now);
    }

    pub fn insert_newline(&mut self, now: Instant) {
        self.insert_char('\n', now);
    }

    pub fn delete_backward(&mut self, now: Instant) {
        let before = self.doc.len_chars();
        self.doc.delete_backward();
        if self.doc.len_chars() != before {
            self.on_update(EditOrigin::User, now);
        }
    }

    pub fn delete_forward(&mut self, now: Instant) {
        let before = self.doc.len_chars();
        self.doc.delete_forward();
        if self.doc.len_chars() != before {
            self.on_update(EditOrigin::User, now);
        }
    }
}
