pub mod details_pane;
pub mod draft_pane;
pub mod input_form;
pub mod keybindings;
pub mod layout;
pub mod list_pane;
pub mod modal;
pub mod onboarding_pane;
pub mod pomodoro_pane;
pub mod stats_pane;
pub mod styles;

use crate::app::AppState;
use crate::domain::{UiMode, View};
use details_pane::render_details_pane;
use draft_pane::render_draft_pane;
use input_form::render_input_form;
use keybindings::{render_keybindings, render_status};
use layout::{create_layout, split_main_side};
use list_pane::{render_home_sidebar, render_list_pane};
use modal::{render_completion_modal, render_confirm_modal};
use onboarding_pane::render_onboarding_pane;
use pomodoro_pane::render_pomodoro_pane;
use ratatui::Frame;
use stats_pane::render_stats_pane;

/// Main render function - draws the entire UI
pub fn render(f: &mut Frame, app: &AppState) {
    let size = f.size();
    let layout = create_layout(size);

    render_keybindings(f, app, layout.keybindings_area);
    render_status(f, app, layout.status_area);

    match app.view {
        View::Onboarding => render_onboarding_pane(f, app, layout.content_area),
        View::Home => {
            let (list_area, side_area) = split_main_side(layout.content_area);
            render_list_pane(f, app, list_area);
            render_home_sidebar(f, app, side_area);
        }
        View::CreateTask => render_draft_pane(f, app, layout.content_area),
        View::TaskDetails => render_details_pane(f, app, layout.content_area),
        View::Pomodoro => render_pomodoro_pane(f, app, layout.content_area),
        View::Statistics => render_stats_pane(f, app, layout.content_area),
    }

    match app.ui_mode {
        UiMode::Modal => render_completion_modal(f, app, size),
        UiMode::ConfirmDeleteTask | UiMode::ConfirmCancelSession => render_confirm_modal(f, app, size),
        UiMode::EditingForm => render_input_form(f, app, size),
        UiMode::Normal => {}
    }
}
