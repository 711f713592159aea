use crate::app::{AppState, FormPurpose};
use crate::ui::{
    layout::create_modal_area,
    styles::{modal_bg_style, modal_title_style},
};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

fn form_title(purpose: &FormPurpose) -> &'static str {
    match purpose {
        FormPurpose::NewTask => " Новая задача ",
        FormPurpose::FocusLabel => " Фокус-сессия ",
        FormPurpose::RenameSubtask { .. } | FormPurpose::RenameDraftStep(_) => " Переименовать шаг ",
    }
}

/// Render the text input form
pub fn render_input_form(f: &mut Frame, app: &AppState, area: Rect) {
    let Some(form) = &app.input_form else {
        return;
    };

    let mut lines = vec![Line::raw("")];

    for (i, (label, value)) in form.fields.iter().enumerate() {
        let editing = i == form.editing_field;
        if editing {
            lines.push(Line::raw(format!("{}: (editing)", label)));
        } else {
            lines.push(Line::raw(format!("{}:", label)));
        }
        lines.push(Line::from(vec![
            Span::raw("> "),
            Span::styled(value.as_str(), modal_title_style()),
            if editing {
                Span::styled("█", modal_title_style()) // Cursor
            } else {
                Span::raw("")
            },
        ]));
        lines.push(Line::raw(""));
    }

    if form.fields.len() > 1 {
        lines.push(Line::raw("Tab to switch fields  ·  Enter to submit  ·  Esc to cancel"));
    } else {
        lines.push(Line::raw("Enter to submit  ·  Esc to cancel"));
    }

    let height = (lines.len() as u16).saturating_add(2);
    let modal_area = create_modal_area(area, height);

    // Clear the area behind the form
    f.render_widget(Clear, modal_area);

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(form_title(&form.purpose), modal_title_style()))
                .style(modal_bg_style()),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, modal_area);
}
