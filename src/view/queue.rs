//! Queue panel

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Padding},
};

use super::utils::{format_time, truncate_string};
use crate::model::{MediaKind, QueueView};

pub fn render_queue(frame: &mut Frame, area: Rect, queue: &QueueView, selected: usize) {
    let width = area.width.saturating_sub(14) as usize;

    let items: Vec<ListItem> = queue
        .tracks
        .iter()
        .enumerate()
        .map(|(i, track)| {
            let marker = if i == queue.current { "▶" } else { " " };
            let icon = match track.kind {
                MediaKind::Song => "♪",
                MediaKind::Episode => "🎙",
            };
            let text = format!(
                "{marker} {:>2}. {icon} {} {}",
                i + 1,
                truncate_string(&format!("{} - {}", track.title, track.subtitle), width),
                format_time(track.duration)
            );

            let style = if i == selected {
                Style::default().fg(Color::Black).bg(Color::Green).add_modifier(Modifier::BOLD)
            } else if i == queue.current {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(text).style(style)
        })
        .collect();

    let title = format!(" Queue ({}) ", queue.tracks.len());
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .padding(Padding::horizontal(1))
                .border_style(Style::default().fg(Color::Green)),
        )
        .highlight_style(Style::default());

    let mut list_state = ListState::default();
    if !queue.tracks.is_empty() {
        list_state.select(Some(selected.min(queue.tracks.len() - 1)));
    }

    frame.render_stateful_widget(list, area, &mut list_state);
}
