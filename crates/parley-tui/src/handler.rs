use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use parley_core::TextInput;
use crate::app::{App, FocusPane};
use crate::tui::AppEvent;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Paste(text) => handle_paste(app, &text),
        AppEvent::Resize => {}
        AppEvent::Tick => {
            app.tick_animation();
            app.poll_tasks().await;
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any pane
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
    {
        app.should_quit = true;
        return;
    }

    if matches!(key.code, KeyCode::Tab | KeyCode::BackTab) {
        app.toggle_focus();
        return;
    }

    match app.focus {
        FocusPane::Sidebar => handle_sidebar_key(app, key),
        FocusPane::Chat => handle_chat_key(app, key),
    }
}

fn handle_sidebar_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.save_api_key(),
        KeyCode::Esc => app.notice = None,
        _ => {
            if edit_input(&mut app.key_form.input, key) {
                app.notice = None;
            }
        }
    }
}

fn handle_chat_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_message(),
        KeyCode::PageUp => app.scroll_chat_up(app.chat_height.max(1)),
        KeyCode::PageDown => app.scroll_chat_down(app.chat_height.max(1)),
        KeyCode::Up if key.modifiers.contains(KeyModifiers::CONTROL) => app.scroll_chat_up(1),
        KeyCode::Down if key.modifiers.contains(KeyModifiers::CONTROL) => app.scroll_chat_down(1),
        _ => {
            edit_input(&mut app.conversation.draft, key);
        }
    }
}

/// Apply an editing key to a text field. Returns whether the key was used.
fn edit_input(input: &mut TextInput, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.move_left(),
        KeyCode::Right => input.move_right(),
        KeyCode::Home => input.move_home(),
        KeyCode::End => input.move_end(),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => input.clear(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => input.insert(c),
        _ => return false,
    }
    true
}

fn handle_paste(app: &mut App, text: &str) {
    // Single-line fields: newlines in pasted text become spaces
    let input = match app.focus {
        FocusPane::Sidebar => {
            app.notice = None;
            &mut app.key_form.input
        }
        FocusPane::Chat => &mut app.conversation.draft,
    };
    for c in text.chars() {
        match c {
            '\r' => {}
            '\n' => input.insert(' '),
            c => input.insert(c),
        }
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.scroll_chat_up(3),
        MouseEventKind::ScrollDown => app.scroll_chat_down(3),
        _ => {}
    }
}
