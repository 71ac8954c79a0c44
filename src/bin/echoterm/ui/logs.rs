//! Logs view: the backend's buffered log text, error lines highlighted.

use crate::app::App;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use ratatui::Frame;

pub(super) fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let lines: Vec<Line> = if app.logs_text.is_empty() {
        vec![Line::from(Span::styled(
            "No logs received yet.",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        app.logs_text
            .lines()
            .map(|line| {
                let style = if line.contains("ERROR") {
                    Style::default().fg(Color::Red)
                } else if line.contains("WARNING") {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default()
                };
                Line::from(Span::styled(line.to_string(), style))
            })
            .collect()
    };

    let total = lines.len() as u16;
    let viewport = area.height.saturating_sub(2);
    let tail = total.saturating_sub(viewport);
    let scroll = tail.saturating_sub(app.logs_scroll_back.min(tail));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(" Backend Logs "),
        )
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}
