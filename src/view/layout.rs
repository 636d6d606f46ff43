//! Layout rendering (top bar, now-playing panel)

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};

use crate::model::{InputMode, PlaybackState, UiState};

pub fn render_top_bar(frame: &mut Frame, area: Rect, ui_state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Command input
            Constraint::Length(36), // Server / device
        ])
        .split(area);

    let in_command = ui_state.input_mode == InputMode::Command;
    let (text, style) = if in_command {
        (format!(":{}▏", ui_state.command_input), Style::default().fg(Color::Green))
    } else if ui_state.loading {
        ("Loading...".to_string(), Style::default().fg(Color::Yellow))
    } else {
        (
            "Press : to play a track, H for help".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    };

    let command = Paragraph::new(text).style(style).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Command ")
            .padding(Padding::horizontal(1))
            .border_style(if in_command {
                Style::default().fg(Color::Green)
            } else {
                Style::default()
            }),
    );
    frame.render_widget(command, chunks[0]);

    let (server_title, border) = if ui_state.server_unreachable {
        (format!(" {} (offline) ", ui_state.server_label), Style::default().fg(Color::Red))
    } else {
        (format!(" {} ", ui_state.server_label), Style::default())
    };
    let device = Paragraph::new(format!("🎵 {}", ui_state.device_name))
        .style(Style::default().fg(Color::Cyan))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(server_title)
                .border_style(border),
        );
    frame.render_widget(device, chunks[1]);
}

pub fn render_now_playing(frame: &mut Frame, area: Rect, playback: &PlaybackState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Now Playing ")
        .padding(Padding::horizontal(1));

    let Some(track) = &playback.track else {
        let empty = Paragraph::new("Nothing loaded")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(
            track.title.clone(),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(track.subtitle.clone(), Style::default().fg(Color::White))),
        Line::from(Span::styled(
            format!("{} #{} · {}", track.kind, track.id, playback.state.label()),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(track.cover_url.clone(), Style::default().fg(Color::DarkGray))),
        Line::from(""),
    ];

    match &track.lyrics {
        Some(lyrics) => {
            lines.push(Line::from(Span::styled(
                "Lyrics",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            lines.extend(lyrics.lines().map(|l| Line::from(l.to_string())));
        }
        None => lines.push(Line::from(Span::styled(
            "No lyrics available",
            Style::default().fg(Color::DarkGray),
        ))),
    }

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(block);
    frame.render_widget(paragraph, area);
}
