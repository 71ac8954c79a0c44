//! Settings view: model selection and output toggles.

use crate::app::App;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

pub(super) fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(4), Constraint::Length(4)])
        .split(area);

    draw_models(frame, rows[0], app);
    draw_options(frame, rows[1], app);
}

fn draw_models(frame: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = if app.models.is_empty() {
        vec![ListItem::new(Span::styled(
            "Waiting for the model list...",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        app.models
            .iter()
            .map(|model| {
                let active = app.dashboard.model() == Some(model.as_str());
                if active {
                    ListItem::new(Line::from(vec![
                        Span::raw(model.clone()),
                        Span::styled("  (active)", Style::default().fg(Color::Green)),
                    ]))
                } else {
                    ListItem::new(model.clone())
                }
            })
            .collect()
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(" Models "),
        )
        .highlight_symbol("> ")
        .highlight_style(Style::default().add_modifier(Modifier::BOLD));

    let mut state = ListState::default();
    if !app.models.is_empty() {
        state.select(Some(app.model_cursor.min(app.models.len() - 1)));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_options(frame: &mut Frame, area: Rect, app: &App) {
    let speak = if app.speaker.is_enabled() {
        Span::styled("on", Style::default().fg(Color::Green))
    } else {
        Span::styled("off", Style::default().fg(Color::DarkGray))
    };
    let lines = vec![
        Line::from(vec![Span::raw("Speech output: "), speak]),
        Line::from(Span::styled(
            "Up/Down select model  Enter apply  Ctrl+V toggle speech",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let options = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(" Options "),
    );
    frame.render_widget(options, area);
}
