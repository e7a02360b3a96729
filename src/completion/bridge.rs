//! Applies completion events to the editor and handles cancellation keys.
//!
//! Every event carries the id of the session that produced it. Events for a
//! session that is no longer active (finished, failed or cancelled) are
//! dropped, so a chunk that was already queued when the user pressed Escape
//! never reaches the document.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::{CompletionEvent, EventKind, PLACEHOLDER, TRIGGER};
use crate::editor::{EditOrigin, Editor, ToastKind};
use crate::error::CompletionError;

const RATE_LIMIT_MESSAGE: &str = "You have reached your request limit for the day.";
const FAILURE_MESSAGE: &str = "Something went wrong.";

pub fn apply_event(editor: &mut Editor, event: CompletionEvent, now: Instant) {
    let active = editor.completion.session().map(|s| s.id);
    if active != Some(event.session) {
        tracing::debug!(target: "completion", session = event.session, "dropping event for inactive session");
        return;
    }

    match event.kind {
        EventKind::Chunk(text) => insert_chunk(editor, &text, now),
        EventKind::Finished => finish(editor, now),
        EventKind::Failed(error) => fail(editor, error, now),
    }
}

fn insert_chunk(editor: &mut Editor, text: &str, now: Instant) {
    let Some(session) = editor.completion.session() else {
        return;
    };
    let Some(delta) = text.strip_prefix(session.completion.as_str()) else {
        tracing::warn!(target: "completion", session = session.id, "completion text is not an extension of what was received");
        return;
    };
    if delta.is_empty() {
        return;
    }
    let delta = delta.to_string();

    if remove_placeholder(editor) {
        editor.on_update(EditOrigin::Completion, now);
    }
    editor.doc.insert_content(&delta);

    if let Some(session) = editor.completion.session_mut() {
        session.completion = text.to_string();
        session.inserted += delta.chars().count();
        session.placeholder_pending = false;
    }
    editor.on_update(EditOrigin::Completion, now);
}

/// Remove the placeholder if it still sits right before the cursor
fn remove_placeholder(editor: &mut Editor) -> bool {
    let pending = editor
        .completion
        .session()
        .is_some_and(|s| s.placeholder_pending);
    if !pending {
        return false;
    }
    let len = PLACEHOLDER.chars().count();
    if editor.doc.text_before_cursor(len) != PLACEHOLDER {
        return false;
    }
    let from = editor.doc.selection.from();
    editor.doc.delete_range(from - len, from);
    if let Some(session) = editor.completion.session_mut() {
        session.placeholder_pending = false;
    }
    true
}

fn finish(editor: &mut Editor, now: Instant) {
    if remove_placeholder(editor) {
        editor.on_update(EditOrigin::Completion, now);
    }
    let Some(session) = editor.completion.finish() else {
        return;
    };
    // Select what was generated so it can be accepted or typed over
    let to = editor.doc.cursor();
    editor
        .doc
        .set_text_selection(to.saturating_sub(session.inserted), to);
    tracing::info!(target: "completion", session = session.id, chars = session.inserted, "completion finished");
}

fn fail(editor: &mut Editor, error: CompletionError, now: Instant) {
    if remove_placeholder(editor) {
        editor.on_update(EditOrigin::Completion, now);
    }
    editor.completion.finish();
    match error {
        CompletionError::RateLimited => {
            editor.show_toast(ToastKind::Error, RATE_LIMIT_MESSAGE, now);
            tracing::info!(target: "analytics", event = "Rate Limit Reached");
        }
        CompletionError::RequestFailed(reason) => {
            tracing::warn!(target: "completion", %reason, "completion request failed");
            editor.show_toast(ToastKind::Error, FAILURE_MESSAGE, now);
        }
    }
}

fn is_undo_chord(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('z') | KeyCode::Char('Z'))
        && key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER)
}

/// Cancellation keys, consulted only while a completion is running.
/// Returns true if the key was consumed.
pub fn handle_cancel_key(editor: &mut Editor, key: &KeyEvent, now: Instant) -> bool {
    if !editor.completion.is_loading() {
        return false;
    }
    if key.code == KeyCode::Esc {
        cancel(editor, true, now);
        true
    } else if is_undo_chord(key) {
        cancel(editor, false, now);
        true
    } else {
        false
    }
}

/// Stop the request and put the trigger back. With `discard`, the text
/// generated so far is removed too.
pub fn cancel(editor: &mut Editor, discard: bool, now: Instant) {
    remove_placeholder(editor);
    let Some(session) = editor.completion.stop() else {
        return;
    };
    if discard {
        let to = editor.doc.cursor();
        editor
            .doc
            .delete_range(to.saturating_sub(session.inserted), to);
    }
    editor.doc.insert_content(TRIGGER);
    editor.on_update(EditOrigin::Completion, now);
    tracing::info!(target: "completion", session = session.id, discard, "completion cancelled");
}
