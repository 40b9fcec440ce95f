use crate::manager::Mode;
use crate::tui::state::{AppState, Focus, FormField};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};
use std::time::Instant;

pub fn draw(f: &mut Frame, state: &mut AppState) {
    let v_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(3),
        ])
        .split(f.area());

    let h_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(v_chunks[1]);

    // --- Heading ---
    let heading = Paragraph::new(Line::from(vec![
        Span::styled(
            "Event Management",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", state.server),
            Style::default().fg(Color::DarkGray),
        ),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(heading, v_chunks[0]);

    draw_list(f, state, h_chunks[0]);
    draw_details(f, state, h_chunks[1]);
    draw_form(f, state, v_chunks[2], v_chunks[3]);
    draw_footer(f, state, v_chunks[4]);
}

fn focus_style(active: bool) -> Style {
    if active {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

fn draw_list(f: &mut Frame, state: &mut AppState, area: Rect) {
    let editing = state.editor.mode.editing_id().cloned();
    let items: Vec<ListItem> = state
        .editor
        .events()
        .iter()
        .map(|e| {
            let marker = if Some(&e.id) == editing.as_ref() {
                "> "
            } else {
                "  "
            };
            let style = if state.editor.is_pending(&e.id) {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![Span::styled(
                format!("{}{}", marker, e.name()),
                style,
            )]))
        })
        .collect();

    let title = if state.loading {
        " Events (Loading...) ".to_string()
    } else {
        format!(" Events ({}) ", state.editor.store.len())
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(focus_style(state.focus == Focus::List)),
        )
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::Blue),
        );
    f.render_stateful_widget(list, area, &mut state.list_state);
}

fn draw_details(f: &mut Frame, state: &AppState, area: Rect) {
    let mut details = String::new();

    if let Some(event) = state.get_selected_event() {
        details.push_str(event.name());
        details.push_str("\n\n");
        if !event.description().is_empty() {
            details.push_str(event.description());
            details.push_str("\n\n");
        }
        let attrs = &event.attributes;
        if let Some(ts) = attrs.created_at {
            details.push_str(&format!("Created:   {}\n", ts.format("%Y-%m-%d %H:%M")));
        }
        if let Some(ts) = attrs.updated_at {
            details.push_str(&format!("Updated:   {}\n", ts.format("%Y-%m-%d %H:%M")));
        }
        if let Some(ts) = attrs.published_at {
            details.push_str(&format!("Published: {}\n", ts.format("%Y-%m-%d %H:%M")));
        }
        details.push_str(&format!("Id:        {}", event.id));
    }

    if details.is_empty() {
        details = "No event selected.".to_string();
    }

    let widget = Paragraph::new(details)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" Details "));
    f.render_widget(widget, area);
}

fn draw_form(f: &mut Frame, state: &AppState, name_area: Rect, desc_area: Rect) {
    let in_form = state.focus == Focus::Form;
    let color = match state.editor.mode {
        Mode::Creating => Color::Yellow,
        Mode::Editing(_) => Color::Magenta,
    };
    let label = state.editor.mode.submit_label();

    let name = Paragraph::new(state.editor.draft.name.as_str())
        .style(Style::default().fg(color))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} - Event name ", label))
                .border_style(focus_style(in_form && state.field == FormField::Name)),
        );
    f.render_widget(name, name_area);

    let description = Paragraph::new(state.editor.draft.description.as_str())
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Event description ")
                .border_style(focus_style(in_form && state.field == FormField::Description)),
        );
    f.render_widget(description, desc_area);

    if in_form {
        let area = match state.field {
            FormField::Name => name_area,
            FormField::Description => desc_area,
        };
        // Cursor position on the last line of the field
        let before: String = state
            .field_value()
            .chars()
            .take(state.cursor_position)
            .collect();
        let line = before.matches('\n').count() as u16;
        let column = before.rsplit('\n').next().unwrap_or("").chars().count() as u16;
        f.set_cursor_position((area.x + 1 + column, area.y + 1 + line));
    }
}

fn draw_footer(f: &mut Frame, state: &AppState, area: Rect) {
    let f_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let status = match state.active_notice(Instant::now()) {
        Some(notice) => Paragraph::new(notice.title.clone()).style(Style::default().fg(Color::Green)),
        None => Paragraph::new(state.message.clone()).style(Style::default().fg(Color::Cyan)),
    }
    .block(
        Block::default()
            .borders(Borders::LEFT | Borders::TOP | Borders::BOTTOM)
            .title(" Status "),
    );

    let help_str = match state.focus {
        Focus::List => "a:Add | e:Edit | d:Del | r:Reload | q:Quit",
        Focus::Form => match state.editor.mode {
            Mode::Creating => "Enter:Create | Tab:Field | Esc:Back",
            Mode::Editing(_) => "Enter:Update | Tab:Field | Esc:Cancel",
        },
    };

    let help = Paragraph::new(help_str)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::TOP | Borders::BOTTOM)
                .title(" Actions "),
        );
    f.render_widget(status, f_chunks[0]);
    f.render_widget(help, f_chunks[1]);
}
