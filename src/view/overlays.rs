//! Overlay rendering (notification toast, help popup)

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::utils::centered_rect;
use crate::model::{Notification, NotificationLevel};

pub const KEYBINDINGS: &[(&str, &str)] = &[
    ("", "── Playback ──"),
    ("Space", "Play / Pause"),
    ("X", "Stop"),
    ("← / →", "Rewind / Forward 10s"),
    ("0-9", "Seek to 0-90%"),
    ("[ / ]", "Speed down / up"),
    ("N", "Next track"),
    ("P", "Previous track"),
    ("S", "Toggle shuffle"),
    ("R", "Toggle repeat"),
    ("", ""),
    ("", "── Volume ──"),
    ("↑ / ↓", "Volume up / down"),
    ("M", "Mute"),
    ("", ""),
    ("", "── Queue & Commands ──"),
    ("U", "Show queue (↑↓ Enter)"),
    (":", "song <id> | episode <id> | queue <n>"),
    ("", ""),
    ("", "── General ──"),
    ("F", "Fullscreen visualizer"),
    ("Esc", "Dismiss notification"),
    ("H", "Toggle this help"),
    ("Q", "Quit"),
];

fn level_style(level: NotificationLevel) -> (Color, &'static str) {
    match level {
        NotificationLevel::Info => (Color::Cyan, " Info "),
        NotificationLevel::Success => (Color::Green, " Success "),
        NotificationLevel::Warning => (Color::Yellow, " Warning "),
        NotificationLevel::Error => (Color::Red, " Error (Esc to dismiss) "),
    }
}

/// Toast in the top-right corner, over the device box
pub fn render_notification(frame: &mut Frame, notification: &Notification) {
    let area = frame.area();
    let (color, title) = level_style(notification.level);

    let popup_width = 48.min(area.width.saturating_sub(2));
    let inner_width = popup_width.saturating_sub(2).max(1) as usize;
    let text_lines = notification.message.chars().count().div_ceil(inner_width).max(1) as u16;
    let popup_height = (text_lines + 2).min(area.height.saturating_sub(2));

    let popup_area = Rect {
        x: area.width.saturating_sub(popup_width + 1),
        y: 1,
        width: popup_width,
        height: popup_height,
    };

    frame.render_widget(Clear, popup_area);

    let toast = Paragraph::new(notification.message.as_str())
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(title)
                .title_bottom(Line::from(notification.shown_at.format(" %H:%M:%S ").to_string()).right_aligned())
                .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
                .style(Style::default().bg(Color::Black)),
        );

    frame.render_widget(toast, popup_area);
}

pub fn render_help_popup(frame: &mut Frame) {
    let popup_area = centered_rect(frame.area(), 62, KEYBINDINGS.len() as u16 + 2);

    frame.render_widget(Clear, popup_area);

    let lines: Vec<Line> = KEYBINDINGS
        .iter()
        .map(|(key, desc)| {
            if key.is_empty() {
                Line::from(Span::styled(
                    format!("{:^38}", desc),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(vec![
                    Span::styled(
                        format!("{:>12}", key),
                        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::styled(desc.to_string(), Style::default().fg(Color::White)),
                ])
            }
        })
        .collect();

    let help_text = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help (H or Esc to close) ")
                .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                .style(Style::default().bg(Color::Black)),
        )
        .style(Style::default().bg(Color::Black));

    frame.render_widget(help_text, popup_area);
}
