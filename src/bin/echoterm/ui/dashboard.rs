//! Dashboard view: rolling CPU/RAM charts and the context gauge.

use crate::app::App;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Gauge, Paragraph, Sparkline};
use ratatui::Frame;

pub(super) fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(3),
        ])
        .split(area);

    draw_readouts(frame, rows[0], app);

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);
    draw_cpu(frame, charts[0], app);
    draw_ram(frame, charts[1], app);

    draw_context(frame, rows[2], app);
}

fn draw_readouts(frame: &mut Frame, area: Rect, app: &App) {
    let status_color = if app.dashboard.is_online() {
        Color::Green
    } else {
        Color::Red
    };
    let mut spans = vec![
        Span::raw("System: "),
        Span::styled(
            app.dashboard.status().to_string(),
            Style::default()
                .fg(status_color)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("   Model: "),
        Span::styled(
            app.dashboard.model().unwrap_or("-").to_string(),
            Style::default().fg(Color::Magenta),
        ),
    ];
    if let Some(tokens) = app.dashboard.backend_tokens() {
        spans.push(Span::raw("   Session tokens: "));
        spans.push(Span::styled(
            tokens.to_string(),
            Style::default().fg(Color::Cyan),
        ));
    }

    let readouts = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(" Backend "),
    );
    frame.render_widget(readouts, area);
}

fn draw_cpu(frame: &mut Frame, area: Rect, app: &App) {
    let data = app.dashboard.cpu_series().sparkline_data();
    let sparkline = Sparkline::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(format!(" CPU {:.1}% ", app.dashboard.cpu_now())),
        )
        .data(&data)
        .max(100)
        .style(Style::default().fg(Color::Cyan));
    frame.render_widget(sparkline, area);
}

fn draw_ram(frame: &mut Frame, area: Rect, app: &App) {
    let data = app.dashboard.ram_series().sparkline_data();
    let title = match app.dashboard.ram_mb() {
        Some(mb) => format!(" RAM {:.1}% ({mb:.0} MB) ", app.dashboard.ram_now()),
        None => format!(" RAM {:.1}% ", app.dashboard.ram_now()),
    };
    let sparkline = Sparkline::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(title),
        )
        .data(&data)
        .max(100)
        .style(Style::default().fg(Color::Green));
    frame.render_widget(sparkline, area);
}

fn draw_context(frame: &mut Frame, area: Rect, app: &App) {
    let percent = app.dashboard.context_percent().round() as u16;
    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(" Context "),
        )
        .gauge_style(if percent > 85 {
            Style::default().fg(Color::Red)
        } else if percent > 60 {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Cyan)
        })
        .percent(percent.min(100))
        .label(app.dashboard.context_label());
    frame.render_widget(gauge, area);
}
