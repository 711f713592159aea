use crate::app::AppState;
use crate::domain::{UiMode, View};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Handle keyboard input events. Returns true when the app should quit.
pub fn handle_key(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Ok(true);
    }

    // A status message lives until the next key press
    app.status = None;

    match app.ui_mode {
        UiMode::Normal => handle_normal_mode(app, key),
        UiMode::Modal => handle_modal_mode(app, key),
        UiMode::EditingForm => handle_input_form_mode(app, key),
        UiMode::ConfirmDeleteTask => handle_confirm_delete_mode(app, key),
        UiMode::ConfirmCancelSession => handle_confirm_cancel_mode(app, key),
    }
}

/// Handle keys in normal mode, per view
fn handle_normal_mode(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Up => {
            app.move_selection_up();
            return Ok(false);
        }
        KeyCode::Down => {
            app.move_selection_down();
            return Ok(false);
        }
        _ => {}
    }

    match app.view {
        View::Onboarding => handle_onboarding(app, key),
        View::Home => handle_home(app, key),
        View::CreateTask => handle_create_task(app, key),
        View::TaskDetails => handle_task_details(app, key),
        View::Pomodoro => handle_pomodoro(app, key),
        View::Statistics => handle_statistics(app, key),
    }
}

fn handle_onboarding(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Enter | KeyCode::Right => app.onboarding_confirm(),
        KeyCode::Left | KeyCode::Backspace => app.onboarding_back(),
        // Leaving is only possible once preferences exist
        KeyCode::Esc if app.settings.is_onboarded => app.go_home(),
        KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(true),
        _ => {}
    }
    Ok(false)
}

fn handle_home(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Enter => app.open_selected_task(),
        KeyCode::Char('a') | KeyCode::Char('n') => app.open_create_task(),
        KeyCode::Char('f') | KeyCode::Char('F') => app.open_focus_form(),
        KeyCode::Char('p') | KeyCode::Char('P') => app.open_pomodoro(),
        KeyCode::Char('s') | KeyCode::Char('S') => app.open_statistics(),
        KeyCode::Char('x') | KeyCode::Char('X') | KeyCode::Delete => app.request_delete_task(),
        KeyCode::Char('o') | KeyCode::Char('O') => app.restart_onboarding(),
        KeyCode::Char('r') | KeyCode::Char('R') => app.new_quote(),
        KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(true),
        _ => {}
    }
    Ok(false)
}

fn handle_create_task(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Enter => app.save_draft(),
        KeyCode::Char('+') | KeyCode::Char('=') => app.draft_adjust_estimate(1),
        KeyCode::Char('-') | KeyCode::Char('_') => app.draft_adjust_estimate(-1),
        KeyCode::Char('e') | KeyCode::Char('E') => app.draft_start_rename(),
        KeyCode::Char('x') | KeyCode::Char('X') | KeyCode::Delete => app.draft_remove_step(),
        KeyCode::Esc => app.go_home(),
        _ => {}
    }
    Ok(false)
}

fn handle_task_details(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Enter | KeyCode::Char(' ') => app.start_selected_subtask(),
        KeyCode::Char('c') | KeyCode::Char('C') => app.toggle_selected_subtask_done(),
        KeyCode::Char('+') | KeyCode::Char('=') => app.resize_selected_subtask(1),
        KeyCode::Char('-') | KeyCode::Char('_') => app.resize_selected_subtask(-1),
        KeyCode::Char('e') | KeyCode::Char('E') => app.start_rename_selected_subtask(),
        KeyCode::Char('x') | KeyCode::Char('X') | KeyCode::Delete => app.delete_selected_subtask(),
        KeyCode::Char('D') => app.request_delete_task(),
        KeyCode::Char('p') | KeyCode::Char('P') => app.open_pomodoro(),
        KeyCode::Esc | KeyCode::Backspace => app.go_home(),
        KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(true),
        _ => {}
    }
    Ok(false)
}

fn handle_pomodoro(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char(' ') | KeyCode::Enter => app.toggle_timer(),
        KeyCode::Char('c') | KeyCode::Char('C') => app.request_cancel_session(),
        KeyCode::Esc | KeyCode::Backspace => app.leave_pomodoro(),
        KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(true),
        _ => {}
    }
    Ok(false)
}

fn handle_statistics(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc | KeyCode::Backspace => app.go_home(),
        KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(true),
        _ => {}
    }
    Ok(false)
}

/// Handle keys while the completion modal is shown
fn handle_modal_mode(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
        app.dismiss_modal();
    }
    Ok(false)
}

/// Handle keys in input form mode
fn handle_input_form_mode(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Enter => app.submit_input_form(),
        KeyCode::Esc => app.cancel_input_form(),
        KeyCode::Tab => app.input_form_toggle_field(),
        KeyCode::Backspace => app.input_form_backspace(),
        KeyCode::Char(c) => app.input_form_add_char(c),
        _ => {}
    }
    Ok(false)
}

fn handle_confirm_delete_mode(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_delete_task(),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.ui_mode = UiMode::Normal,
        _ => {}
    }
    Ok(false)
}

fn handle_confirm_cancel_mode(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            app.cancel_session()?;
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.ui_mode = UiMode::Normal,
        _ => {}
    }
    Ok(false)
}
