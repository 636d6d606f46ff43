//! Progress bar rendering

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Gauge},
};

use super::utils::format_time;
use crate::model::{PlaybackState, PlayerState};

fn status_icon(state: PlayerState) -> &'static str {
    match state {
        PlayerState::Playing => "▶",
        PlayerState::Paused => "⏸",
        PlayerState::Stopped => "⏹",
        PlayerState::Loading => "…",
        PlayerState::Error => "✗",
        PlayerState::Idle | PlayerState::Ready => "•",
    }
}

pub fn controls_line(playback: &PlaybackState) -> String {
    let volume = if playback.muted {
        "Vol: muted".to_string()
    } else {
        format!("Vol: {:.0}%", playback.volume * 100.0)
    };
    format!(
        " Shuffle: {} | Repeat: {} | {} | Speed: {}x ",
        if playback.shuffle { "On" } else { "Off" },
        if playback.repeat { "On" } else { "Off" },
        volume,
        playback.rate,
    )
}

pub fn render_progress_bar(frame: &mut Frame, area: Rect, playback: &PlaybackState) {
    let title = match &playback.track {
        Some(track) => format!(
            " {} {} | {} [{}] ",
            status_icon(playback.state),
            track.title,
            track.subtitle,
            playback.state.label()
        ),
        None => " No track playing ".to_string(),
    };

    let time_str = format!(
        "{} / {}",
        format_time(Some(playback.elapsed)),
        format_time(playback.duration)
    );

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .title_bottom(Line::from(controls_line(playback)).right_aligned()),
        )
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(playback.progress_ratio())
        .label(time_str);

    frame.render_widget(gauge, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Preferences;

    #[test]
    fn controls_show_preferences() {
        let state = PlaybackState::from_preferences(&Preferences {
            volume: 0.7,
            speed: 1.25,
            repeat: true,
            shuffle: false,
            muted: false,
        });
        assert_eq!(
            controls_line(&state),
            " Shuffle: Off | Repeat: On | Vol: 70% | Speed: 1.25x "
        );

        let muted = PlaybackState::from_preferences(&Preferences {
            muted: true,
            ..Preferences::default()
        });
        assert!(controls_line(&muted).contains("Vol: muted"));
        assert!(controls_line(&muted).contains("Speed: 1x"));
    }
}
