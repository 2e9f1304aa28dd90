use crate::tui::App;
use crate::tui::app::{Mode, Tab, View};
use crate::tui::error::TuiError;
use crate::tui::layout::Layout;
use crate::utils::{has_primary_modifier, parse_key_binding};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
    size as terminal_size,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use std::io;

/// Guard that restores the terminal even on panic. A terminal left in
/// raw mode or the alternate screen is unusable for the user.
struct TerminalGuard {
    raw_mode_enabled: bool,
    alternate_screen_enabled: bool,
}

impl TerminalGuard {
    fn new() -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        Ok(Self {
            raw_mode_enabled: true,
            alternate_screen_enabled: true,
        })
    }

    /// Restore terminal state on normal exit; drop then does nothing.
    fn restore(&mut self) -> Result<(), TuiError> {
        if self.raw_mode_enabled {
            disable_raw_mode()?;
            self.raw_mode_enabled = false;
        }
        if self.alternate_screen_enabled {
            execute!(io::stdout(), LeaveAlternateScreen)?;
            self.alternate_screen_enabled = false;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Ignore errors, we are already in a cleanup path
        if self.raw_mode_enabled {
            let _ = disable_raw_mode();
        }
        if self.alternate_screen_enabled {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
    }
}

pub fn run_event_loop(mut app: App) -> Result<(), TuiError> {
    // Check the size before entering the alternate screen so the error
    // message lands in the normal terminal
    let (width, height) = terminal_size().map_err(TuiError::IoError)?;
    let min_width_with_border = Layout::MIN_WIDTH + 2;
    let min_height_with_border = Layout::MIN_HEIGHT + 2;
    if width < min_width_with_border || height < min_height_with_border {
        return Err(TuiError::RenderError(format!(
            "Terminal size too small. Current: {}x{}, Minimum required: {}x{}. Please resize your terminal window.",
            width, height, min_width_with_border, min_height_with_border
        )));
    }

    let mut guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    loop {
        app.check_status_message_timeout();

        // Keep the active editor's viewport tracking its cursor before drawing
        if matches!(app.ui.mode, Mode::Form | Mode::Memo | Mode::Chat) {
            let size = terminal.size()?;
            let rect = Rect::new(0, 0, size.width, size.height);
            let layout = Layout::calculate(
                rect,
                app.config.sidebar_width_percent,
                app.ui.sidebar_collapsed,
            );
            let (viewport_height, viewport_width) = editor_viewport(&app, &layout);
            if let Some(editor) = app.active_editor_mut() {
                editor.update_scroll(viewport_height);
                editor.update_horizontal_scroll(viewport_width);
            }
        }

        // Explicit terminal size instead of f.area(); some terminals
        // report them differently
        let size = terminal.size()?;
        let terminal_rect = Rect::new(0, 0, size.width, size.height);
        terminal.draw(|f| {
            let layout = Layout::calculate(
                terminal_rect,
                app.config.sidebar_width_percent,
                app.ui.sidebar_collapsed,
            );
            crate::tui::render::render(f, &mut app, &layout);
        })?;

        if event::poll(std::time::Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key_event) => {
                    // Press only, to avoid double-processing on Windows
                    if key_event.kind == KeyEventKind::Press {
                        handle_key_event(&mut app, key_event);
                        if app.ui.should_quit {
                            break;
                        }
                    }
                }
                Event::Resize(_, _) => {
                    // Next draw picks up the new size
                }
                _ => {}
            }
        }
    }

    guard.restore()?;

    Ok(())
}

/// Rough inner viewport of the editor that currently has focus, for
/// scroll tracking. Field boxes are 3 rows high; the memo popup and
/// multiline fields get taller viewports.
fn editor_viewport(app: &App, layout: &Layout) -> (usize, usize) {
    match app.ui.mode {
        Mode::Memo => {
            let height = (layout.inner_area.height / 2).saturating_sub(2) as usize;
            let width = (layout.inner_area.width * 60 / 100) as usize;
            (height.max(1), width)
        }
        Mode::Chat => (3, layout.main_area.width as usize),
        Mode::Form => {
            let is_multiline = app
                .modal
                .form
                .as_ref()
                .is_some_and(|form| form.is_multiline_active());
            if is_multiline {
                ((layout.main_area.height.saturating_sub(4)) as usize, layout.main_area.width as usize)
            } else {
                (1, layout.main_area.width as usize)
            }
        }
        _ => (1, layout.main_area.width as usize),
    }
}

fn matches_binding(key_event: &KeyEvent, binding: &str) -> bool {
    match parse_key_binding(binding) {
        Ok(parsed) => {
            if parsed.key_code != key_event.code {
                return false;
            }
            if parsed.requires_ctrl {
                has_primary_modifier(key_event.modifiers)
            } else {
                !has_primary_modifier(key_event.modifiers)
            }
        }
        Err(_) => false,
    }
}

fn handle_key_event(app: &mut App, key_event: KeyEvent) {
    match app.ui.mode {
        Mode::Help => handle_help_keys(app, key_event),
        Mode::Confirm => handle_confirm_keys(app, key_event),
        Mode::Form => handle_form_keys(app, key_event),
        Mode::Memo => handle_memo_keys(app, key_event),
        Mode::Chat => handle_chat_keys(app, key_event),
        Mode::View => handle_view_keys(app, key_event),
    }
}

fn handle_help_keys(app: &mut App, key_event: KeyEvent) {
    let keys = app.config.key_bindings.clone();
    if key_event.code == KeyCode::Esc || matches_binding(&key_event, &keys.help) {
        app.toggle_help();
    }
}

fn handle_confirm_keys(app: &mut App, key_event: KeyEvent) {
    match key_event.code {
        KeyCode::Up | KeyCode::Down => app.confirm_toggle(),
        KeyCode::Enter => app.execute_confirm(),
        KeyCode::Esc => app.cancel_confirm(),
        _ => {}
    }
}

/// Keys shared by every text-editing surface. Returns true when handled.
fn handle_editor_keys(app: &mut App, key_event: KeyEvent) -> bool {
    let keys = app.config.key_bindings.clone();

    if matches_binding(&key_event, &keys.undo) {
        if let Some(editor) = app.active_editor_mut() {
            editor.undo();
        }
        return true;
    }
    if matches_binding(&key_event, &keys.word_left) {
        if let Some(editor) = app.active_editor_mut() {
            editor.move_cursor_word_left();
        }
        return true;
    }
    if matches_binding(&key_event, &keys.word_right) {
        if let Some(editor) = app.active_editor_mut() {
            editor.move_cursor_word_right();
        }
        return true;
    }

    let Some(editor) = app.active_editor_mut() else {
        return false;
    };
    match key_event.code {
        KeyCode::Char(c) if !has_primary_modifier(key_event.modifiers) => {
            editor.insert_char(c);
            true
        }
        KeyCode::Backspace => {
            editor.delete_char();
            true
        }
        KeyCode::Left => {
            editor.move_cursor_left();
            true
        }
        KeyCode::Right => {
            editor.move_cursor_right();
            true
        }
        KeyCode::Up => {
            editor.move_cursor_up();
            true
        }
        KeyCode::Down => {
            editor.move_cursor_down();
            true
        }
        KeyCode::Home => {
            editor.move_cursor_home();
            true
        }
        KeyCode::End => {
            editor.move_cursor_end();
            true
        }
        _ => false,
    }
}

fn handle_form_keys(app: &mut App, key_event: KeyEvent) {
    let keys = app.config.key_bindings.clone();

    if key_event.code == KeyCode::Esc {
        app.cancel_form();
        return;
    }
    if matches_binding(&key_event, &keys.save) {
        app.submit_form();
        return;
    }
    match key_event.code {
        KeyCode::Tab => {
            if let Some(form) = app.modal.form.as_mut() {
                form.next_field();
            }
            return;
        }
        KeyCode::BackTab => {
            if let Some(form) = app.modal.form.as_mut() {
                form.prev_field();
            }
            return;
        }
        _ => {}
    }

    // Select fields consume arrows and Enter; text fields fall through
    // to the editor
    let on_select = app
        .modal
        .form
        .as_ref()
        .and_then(|form| form.current_field())
        .is_some_and(|field| !field.accepts_text());
    if on_select {
        match key_event.code {
            KeyCode::Left | KeyCode::Up => {
                if let Some(form) = app.modal.form.as_mut() {
                    form.cycle_selected(false);
                }
            }
            KeyCode::Right | KeyCode::Down | KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(form) = app.modal.form.as_mut() {
                    form.cycle_selected(true);
                }
            }
            _ => {}
        }
        return;
    }

    // Enter inserts a newline in multiline fields, advances otherwise
    if key_event.code == KeyCode::Enter {
        let multiline = app
            .modal
            .form
            .as_ref()
            .is_some_and(|form| form.is_multiline_active());
        if multiline {
            if let Some(editor) = app.active_editor_mut() {
                editor.insert_newline();
            }
        } else if let Some(form) = app.modal.form.as_mut() {
            form.next_field();
        }
        return;
    }

    handle_editor_keys(app, key_event);
}

fn handle_memo_keys(app: &mut App, key_event: KeyEvent) {
    let keys = app.config.key_bindings.clone();

    if key_event.code == KeyCode::Esc {
        app.cancel_memo_modal();
        return;
    }
    if matches_binding(&key_event, &keys.save) {
        app.save_memo_modal();
        return;
    }
    if key_event.code == KeyCode::Enter {
        if let Some(editor) = app.active_editor_mut() {
            editor.insert_newline();
        }
        return;
    }
    handle_editor_keys(app, key_event);
}

fn handle_chat_keys(app: &mut App, key_event: KeyEvent) {
    if key_event.code == KeyCode::Esc {
        app.leave_chat_mode();
        return;
    }
    if key_event.code == KeyCode::Enter {
        app.send_chat_message();
        return;
    }
    handle_editor_keys(app, key_event);
}

fn handle_view_keys(app: &mut App, key_event: KeyEvent) {
    let keys = app.config.key_bindings.clone();

    if matches_binding(&key_event, &keys.quit) {
        app.quit();
        return;
    }
    if matches_binding(&key_event, &keys.help) {
        app.toggle_help();
        return;
    }
    if matches_binding(&key_event, &keys.toggle_sidebar) {
        app.toggle_sidebar();
        return;
    }
    if matches_binding(&key_event, &keys.refresh) {
        app.refresh();
        return;
    }
    if matches_binding(&key_event, &keys.list_up) || key_event.code == KeyCode::Up {
        app.move_selection(false);
        return;
    }
    if matches_binding(&key_event, &keys.list_down) || key_event.code == KeyCode::Down {
        app.move_selection(true);
        return;
    }
    if matches_binding(&key_event, &keys.new) {
        app.new_item_form();
        return;
    }
    if matches_binding(&key_event, &keys.edit) {
        app.edit_item_form();
        return;
    }
    if matches_binding(&key_event, &keys.delete) {
        app.request_delete();
        return;
    }

    match app.ui.view {
        View::Dashboard => {
            if matches_binding(&key_event, &keys.select) {
                app.open_selected_project();
            }
        }
        View::Project => {
            if matches_binding(&key_event, &keys.back) {
                app.back_to_dashboard();
                return;
            }
            if matches_binding(&key_event, &keys.tab_left) {
                app.prev_tab();
                return;
            }
            if matches_binding(&key_event, &keys.tab_right) {
                app.next_tab();
                return;
            }
            let tab_jumps = [
                &keys.tab_1,
                &keys.tab_2,
                &keys.tab_3,
                &keys.tab_4,
                &keys.tab_5,
            ];
            for (index, binding) in tab_jumps.iter().enumerate() {
                if matches_binding(&key_event, binding) {
                    app.set_tab(index);
                    return;
                }
            }

            match app.ui.active_tab {
                Tab::Tasks => {
                    if matches_binding(&key_event, &keys.toggle_complete) {
                        app.toggle_selected_task();
                    } else if matches_binding(&key_event, &keys.memo) {
                        app.open_memo_modal();
                    } else if matches_binding(&key_event, &keys.generate_defaults) {
                        app.generate_defaults();
                    }
                }
                Tab::Checklist => {
                    if matches_binding(&key_event, &keys.generate_defaults) {
                        app.generate_defaults();
                    } else if key_event.code == KeyCode::Char('a')
                        && key_event.modifiers == KeyModifiers::NONE
                    {
                        app.open_attach_file_form();
                    }
                }
                Tab::Rejections => {
                    if key_event.code == KeyCode::Char('a')
                        && key_event.modifiers == KeyModifiers::NONE
                    {
                        app.analyze_selected_rejection();
                    }
                }
                Tab::Assistant => {
                    if matches_binding(&key_event, &keys.select) {
                        app.enter_chat_mode();
                    } else if matches_binding(&key_event, &keys.copy) {
                        app.copy_chat_response();
                    }
                }
                Tab::Overview => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::CONTROL)
    }

    #[test]
    fn bindings_match_plain_and_ctrl_keys() {
        assert!(matches_binding(&key(KeyCode::Char('q')), "q"));
        assert!(!matches_binding(&key(KeyCode::Char('x')), "q"));
        assert!(matches_binding(&ctrl(KeyCode::Char('s')), "Ctrl+s"));
        assert!(!matches_binding(&key(KeyCode::Char('s')), "Ctrl+s"));
        assert!(matches_binding(&key(KeyCode::Enter), "Enter"));
        assert!(matches_binding(&key(KeyCode::F(1)), "F1"));
    }

    #[test]
    fn ctrl_modified_key_does_not_match_plain_binding() {
        assert!(!matches_binding(&ctrl(KeyCode::Char('s')), "s"));
    }
}
