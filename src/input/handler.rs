use std::time::Instant;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::completion::bridge;
use crate::editor::{Editor, Focus};

/// Work the event loop has to do on behalf of a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    CopyDocument,
}

pub fn handle_event(editor: &mut Editor, event: Event, now: Instant) -> Option<Request> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(editor, key, now),
        Event::Paste(text) => {
            paste(editor, &text, now);
            None
        }
        _ => None,
    }
}

fn handle_key(editor: &mut Editor, key: KeyEvent, now: Instant) -> Option<Request> {
    // Escape / undo chord belong to the running completion, if any
    if bridge::handle_cancel_key(editor, &key, now) {
        return None;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('q') if ctrl => {
            editor.quit();
            return None;
        }
        KeyCode::Char('c') if ctrl => {
            editor.quit();
            return None;
        }
        KeyCode::Char('s') if ctrl => return Some(Request::CopyDocument),
        KeyCode::Tab => {
            editor.focus = editor.focus.next();
            return None;
        }
        KeyCode::BackTab => {
            editor.focus = editor.focus.prev();
            return None;
        }
        _ => {}
    }

    match editor.focus {
        Focus::From | Focus::To => {
            handle_input_field(editor, key);
            None
        }
        Focus::Body => {
            handle_body(editor, key, now);
            None
        }
        Focus::Send => match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => Some(Request::CopyDocument),
            KeyCode::Esc => {
                editor.focus = Focus::Body;
                None
            }
            _ => None,
        },
    }
}

fn handle_input_field(editor: &mut Editor, key: KeyEvent) {
    let field = match editor.focus {
        Focus::From => &mut editor.from_input,
        Focus::To => &mut editor.to_input,
        _ => return,
    };
    match key.code {
        KeyCode::Char(c) if is_text_input(&key) => field.push(c),
        KeyCode::Backspace => {
            field.pop();
        }
        KeyCode::Enter => editor.focus = editor.focus.next(),
        KeyCode::Esc => editor.focus = Focus::Body,
        _ => {}
    }
}

fn handle_body(editor: &mut Editor, key: KeyEvent, now: Instant) {
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char(c) if is_text_input(&key) => return editor.insert_char(c, now),
        KeyCode::Enter => return editor.insert_newline(now),
        KeyCode::Backspace => return editor.delete_backward(now),
        KeyCode::Delete => return editor.delete_forward(now),
        KeyCode::Esc => {
            let head = editor.doc.cursor();
            editor.doc.set_text_selection(head, head);
            return editor.clear_toast();
        }
        _ => {}
    }

    let doc = &mut editor.doc;
    match key.code {
        KeyCode::Char('a') if ctrl => doc.select_all(),
        KeyCode::Left => doc.move_left(shift),
        KeyCode::Right => doc.move_right(shift),
        KeyCode::Up => doc.move_up(shift),
        KeyCode::Down => doc.move_down(shift),
        KeyCode::Home => doc.move_to_line_start(shift),
        KeyCode::End => doc.move_to_line_end(shift),
        _ => {}
    }
}

/// A printable key. AltGr arrives as Ctrl+Alt on Windows terminals.
fn is_text_input(key: &KeyEvent) -> bool {
    let altgr = KeyModifiers::CONTROL | KeyModifiers::ALT;
    !key.modifiers.contains(KeyModifiers::CONTROL) || key.modifiers.contains(altgr)
}

/// Pasted text lands in the focused field as one edit
fn paste(editor: &mut Editor, text: &str, now: Instant) {
    match editor.focus {
        Focus::From => editor.from_input.push_str(text),
        Focus::To => editor.to_input.push_str(text),
        Focus::Body => {
            editor.doc.insert_content(text);
            editor.on_update(crate::editor::EditOrigin::User, now);
        }
        Focus::Send => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::editor_with_text;

    fn press(editor: &mut Editor, code: KeyCode, modifiers: KeyModifiers) -> Option<Request> {
        handle_event(
            editor,
            Event::Key(KeyEvent::new(code, modifiers)),
            Instant::now(),
        )
    }

    fn type_str(editor: &mut Editor, s: &str) {
        for c in s.chars() {
            press(editor, KeyCode::Char(c), KeyModifiers::NONE);
        }
    }

    #[test]
    fn typing_edits_the_body() {
        let (mut editor, _client, _rx) = editor_with_text("");
        type_str(&mut editor, "hi");
        press(&mut editor, KeyCode::Enter, KeyModifiers::NONE);
        type_str(&mut editor, "there");
        press(&mut editor, KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(editor.doc.buffer.contents(), "hi\nther");
    }

    #[test]
    fn typing_the_trigger_starts_a_completion() {
        let (mut editor, client, _rx) = editor_with_text("Write ");
        type_str(&mut editor, "++");
        assert!(editor.completion.is_loading());
        assert_eq!(client.requests.lock().unwrap().len(), 1);
    }

    #[test]
    fn escape_during_completion_restores_trigger() {
        let (mut editor, _client, _rx) = editor_with_text("Write ");
        type_str(&mut editor, "++");
        press(&mut editor, KeyCode::Esc, KeyModifiers::NONE);
        assert!(!editor.completion.is_loading());
        assert_eq!(editor.doc.buffer.contents(), "Write ++");
    }

    #[test]
    fn escape_without_completion_collapses_selection() {
        let (mut editor, _client, _rx) = editor_with_text("abc");
        press(&mut editor, KeyCode::Char('a'), KeyModifiers::CONTROL);
        assert!(!editor.doc.selection.is_empty());
        press(&mut editor, KeyCode::Esc, KeyModifiers::NONE);
        assert!(editor.doc.selection.is_empty());
        assert_eq!(editor.doc.buffer.contents(), "abc");
    }

    #[test]
    fn ctrl_z_outside_completion_does_nothing() {
        let (mut editor, _client, _rx) = editor_with_text("abc");
        press(&mut editor, KeyCode::Char('z'), KeyModifiers::CONTROL);
        assert_eq!(editor.doc.buffer.contents(), "abc");
    }

    #[test]
    fn tab_cycles_focus_and_inputs_take_text() {
        let (mut editor, _client, _rx) = editor_with_text("body");
        press(&mut editor, KeyCode::BackTab, KeyModifiers::SHIFT);
        assert_eq!(editor.focus, Focus::To);
        type_str(&mut editor, "bob");
        press(&mut editor, KeyCode::BackTab, KeyModifiers::SHIFT);
        type_str(&mut editor, "alice");
        assert_eq!(editor.from_input, "alice");
        assert_eq!(editor.to_input, "bob");
        assert_eq!(editor.doc.buffer.contents(), "body");
    }

    #[test]
    fn send_button_requests_copy() {
        let (mut editor, _client, _rx) = editor_with_text("body");
        press(&mut editor, KeyCode::Tab, KeyModifiers::NONE);
        assert_eq!(editor.focus, Focus::Send);
        assert_eq!(
            press(&mut editor, KeyCode::Enter, KeyModifiers::NONE),
            Some(Request::CopyDocument)
        );
        assert_eq!(
            press(&mut editor, KeyCode::Char('s'), KeyModifiers::CONTROL),
            Some(Request::CopyDocument)
        );
    }

    #[test]
    fn ctrl_q_quits() {
        let (mut editor, _client, _rx) = editor_with_text("");
        press(&mut editor, KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(!editor.running);
    }

    #[test]
    fn shift_arrows_select() {
        let (mut editor, _client, _rx) = editor_with_text("abc");
        press(&mut editor, KeyCode::Left, KeyModifiers::SHIFT);
        press(&mut editor, KeyCode::Left, KeyModifiers::SHIFT);
        type_str(&mut editor, "X");
        assert_eq!(editor.doc.buffer.contents(), "aX");
    }

    #[test]
    fn altgr_characters_are_typed() {
        let (mut editor, _client, _rx) = editor_with_text("a");
        let altgr = KeyModifiers::CONTROL | KeyModifiers::ALT;
        press(&mut editor, KeyCode::Char('@'), altgr);
        press(&mut editor, KeyCode::Char('{'), altgr);
        assert_eq!(editor.doc.buffer.contents(), "a@{");

        press(&mut editor, KeyCode::BackTab, KeyModifiers::SHIFT);
        press(&mut editor, KeyCode::Char('€'), altgr);
        assert_eq!(editor.to_input, "€");
    }

    #[test]
    fn ctrl_letters_are_not_typed() {
        let (mut editor, _client, _rx) = editor_with_text("a");
        press(&mut editor, KeyCode::Char('b'), KeyModifiers::CONTROL);
        assert_eq!(editor.doc.buffer.contents(), "a");
    }

    #[test]
    fn paste_inserts_into_body() {
        let (mut editor, _client, _rx) = editor_with_text("a");
        handle_event(&mut editor, Event::Paste("bc\nd".to_string()), Instant::now());
        assert_eq!(editor.doc.buffer.contents(), "abc\nd");
        assert!(editor.session.debounce.is_pending());
    }
}
