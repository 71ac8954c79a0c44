//! Rendering. One draw call per frame; each view builds its own widgets.

mod chat;
mod dashboard;
mod logs;
mod settings;

use crate::app::{App, Toast, View};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

pub(crate) fn draw(frame: &mut Frame, app: &App) {
    let with_input = app.view == View::Chat;
    let constraints: Vec<Constraint> = if with_input {
        vec![
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(3),
            Constraint::Length(1),
        ]
    } else {
        vec![
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
        ]
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(frame.size());

    draw_tabs(frame, chunks[0], app);
    match app.view {
        View::Chat => {
            chat::draw(frame, chunks[1], app);
            draw_input(frame, chunks[2], app);
            draw_status(frame, chunks[3], app);
        }
        View::Dashboard => {
            dashboard::draw(frame, chunks[1], app);
            draw_status(frame, chunks[2], app);
        }
        View::Logs => {
            logs::draw(frame, chunks[1], app);
            draw_status(frame, chunks[2], app);
        }
        View::Settings => {
            settings::draw(frame, chunks[1], app);
            draw_status(frame, chunks[2], app);
        }
    }

    if let Some(toast) = &app.toast {
        draw_toast(frame, toast);
    }
}

fn draw_tabs(frame: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<Line> = View::ALL
        .iter()
        .enumerate()
        .map(|(index, view)| {
            Line::from(vec![
                Span::styled(
                    format!("F{}", index + 1),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(" "),
                Span::raw(view.title()),
            ])
        })
        .collect();
    let selected = View::ALL
        .iter()
        .position(|view| *view == app.view)
        .unwrap_or(0);
    let tabs = Tabs::new(titles)
        .select(selected)
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .divider(Span::styled("|", Style::default().fg(Color::DarkGray)));
    frame.render_widget(tabs, area);
}

fn draw_input(frame: &mut Frame, area: Rect, app: &App) {
    let listening = app.voice.may_record();
    let border_color = if listening { Color::Green } else { Color::Blue };

    let content: Line = if app.input.is_empty() {
        Line::from(Span::styled(
            app.placeholder(),
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(app.input.as_str())
    };

    let input_block = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border_color))
            .title(" Message ")
            .title_bottom(Line::from(vec![
                Span::styled(" Enter ", Style::default().fg(Color::Cyan)),
                Span::styled("send  ", Style::default().fg(Color::DarkGray)),
                Span::styled("Ctrl+R ", Style::default().fg(Color::Cyan)),
                Span::styled("mic  ", Style::default().fg(Color::DarkGray)),
                Span::styled("Ctrl+T ", Style::default().fg(Color::Cyan)),
                Span::styled("mode ", Style::default().fg(Color::DarkGray)),
            ])),
    );
    frame.render_widget(input_block, area);

    let inner_width = area.width.saturating_sub(2);
    let input_width = UnicodeWidthStr::width(app.input.as_str()).min(u16::MAX as usize) as u16;
    let cursor_x = area.x.saturating_add(1).saturating_add(input_width.min(inner_width));
    frame.set_cursor(cursor_x, area.y + 1);
}

fn draw_status(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = Vec::new();

    let (mode_label, mode_color) = match app.voice.mode() {
        echoterm::voice::VoiceMode::Ai => (" AI ", Color::Cyan),
        echoterm::voice::VoiceMode::Task => (" TASK ", Color::Yellow),
    };
    spans.push(Span::styled(
        mode_label,
        Style::default()
            .fg(Color::Black)
            .bg(mode_color)
            .add_modifier(Modifier::BOLD),
    ));
    spans.push(Span::raw(" "));

    let voice_label = if !app.mic_available {
        Span::styled("mic unavailable", Style::default().fg(Color::DarkGray))
    } else {
        match app.voice.mode() {
            echoterm::voice::VoiceMode::Ai => {
                if app.voice.is_manual_listening() {
                    Span::styled("● listening", Style::default().fg(Color::Green))
                } else {
                    Span::styled("○ idle", Style::default().fg(Color::DarkGray))
                }
            }
            echoterm::voice::VoiceMode::Task => {
                if app.voice.is_awake() {
                    Span::styled("● awake", Style::default().fg(Color::Green))
                } else {
                    Span::styled("◌ standby", Style::default().fg(Color::DarkGray))
                }
            }
        }
    };
    spans.push(voice_label);

    spans.push(Span::raw("  "));
    spans.push(if app.speaker.is_enabled() {
        Span::styled("spk on", Style::default().fg(Color::Green))
    } else {
        Span::styled("spk off", Style::default().fg(Color::DarkGray))
    });

    spans.push(Span::raw("  "));
    let status_color = if app.dashboard.is_online() {
        Color::Green
    } else {
        Color::Red
    };
    spans.push(Span::styled(
        app.dashboard.status().to_string(),
        Style::default().fg(status_color),
    ));

    if let Some(model) = app.dashboard.model() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            model.to_string(),
            Style::default().fg(Color::Magenta),
        ));
    }

    spans.push(Span::raw("  "));
    spans.push(Span::styled(
        "Tab views  Ctrl+V speak  Ctrl+C quit",
        Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_toast(frame: &mut Frame, toast: &Toast) {
    let size = frame.size();
    if size.height < 3 || size.width < 6 {
        return;
    }
    let text = format!(" {} ", toast.text);
    let width = (UnicodeWidthStr::width(text.as_str()) as u16).min(size.width);
    let rect = Rect {
        x: size.width.saturating_sub(width) / 2,
        y: size.height.saturating_sub(2),
        width,
        height: 1,
    };
    frame.render_widget(Clear, rect);
    let banner = Paragraph::new(Line::from(text)).style(
        Style::default()
            .fg(Color::White)
            .bg(Color::Red)
            .add_modifier(Modifier::BOLD),
    );
    frame.render_widget(banner, rect);
}
