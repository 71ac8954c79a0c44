//! Conversation view: the message log with streaming and thinking bubbles.

use crate::app::App;
use echoterm::chat::{ChatMessage, MessageSender};
use echoterm::link::SystemNote;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use ratatui::Frame;

pub(super) fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let mut lines: Vec<Line> = Vec::new();

    if app.chat.messages().is_empty() && !app.chat.is_thinking() {
        lines.push(Line::from(Span::styled(
            "No messages yet. Type below, or press Ctrl+R to speak.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let message_count = app.chat.messages().len();
    for (index, message) in app.chat.messages().iter().enumerate() {
        let streaming_tail = app.chat.has_active_stream() && index + 1 == message_count;
        push_message_lines(&mut lines, message, streaming_tail);
    }

    if app.chat.is_thinking() {
        lines.push(Line::from(vec![
            Span::styled("Assistant  ", bot_style()),
            Span::styled(
                "● ● ● Processing...",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ),
        ]));
    }

    let total = lines.len() as u16;
    let viewport = area.height.saturating_sub(2);
    let tail = total.saturating_sub(viewport);
    let scroll = tail.saturating_sub(app.chat_scroll_back.min(tail));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(" Conversation "),
        )
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

fn push_message_lines(lines: &mut Vec<Line<'_>>, message: &ChatMessage, streaming_tail: bool) {
    let (label, label_style) = match message.sender {
        MessageSender::User => ("You", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        MessageSender::Bot => ("Assistant", bot_style()),
        MessageSender::System => ("System", system_style(message.note)),
    };

    let mut header = Vec::new();
    if !message.timestamp.is_empty() {
        header.push(Span::styled(
            format!("{} ", message.timestamp),
            Style::default().fg(Color::DarkGray),
        ));
    }
    header.push(Span::styled(format!("{label}  "), label_style));

    let mut text_lines = message.text.split('\n');
    let first = text_lines.next().unwrap_or_default();
    let mut first_spans = header;
    let body_style = match message.sender {
        MessageSender::System => system_style(message.note),
        _ => Style::default(),
    };
    first_spans.push(Span::styled(first.to_string(), body_style));
    let mut rendered: Vec<Line> = vec![Line::from(first_spans)];
    for text_line in text_lines {
        rendered.push(Line::from(Span::styled(
            format!("  {text_line}"),
            body_style,
        )));
    }

    if streaming_tail {
        if let Some(last) = rendered.last_mut() {
            last.spans.push(Span::styled("▌", Style::default().fg(Color::Green)));
        }
    }

    lines.append(&mut rendered);

    if let Some(stats) = &message.stats {
        lines.push(Line::from(Span::styled(
            format!("  {} tokens • {}", stats.tokens, stats.time),
            Style::default().fg(Color::DarkGray),
        )));
    }
}

fn bot_style() -> Style {
    Style::default()
        .fg(Color::Magenta)
        .add_modifier(Modifier::BOLD)
}

fn system_style(note: Option<SystemNote>) -> Style {
    let color = match note {
        Some(SystemNote::Error) => Color::Red,
        Some(SystemNote::Warning) => Color::Yellow,
        _ => Color::DarkGray,
    };
    Style::default().fg(color)
}
