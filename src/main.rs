mod audio;
mod config;
mod controller;
mod error;
mod logging;
mod model;
mod view;

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use anyhow::Result;
use crossterm::{
    event::{self, DisableFocusChange, EnableFocusChange, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use audio::{MediaElement, RodioElement};
use config::{ClientConfig, TICK_INTERVAL};
use controller::PlaybackClient;
use model::{AppModel, HttpSessionClient, MediaKind, Preferences, PreferencesStore, SessionServer};
use view::AppView;

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = logging::init_logging() {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== mediaplayer-rs starting ===");

    let initial = parse_initial_track(std::env::args().skip(1))?;

    let mut config = ClientConfig::from_env();
    if let Err(e) = config.ensure_csrf_token().await {
        tracing::warn!(error = %e, "Could not obtain a CSRF token");
    }

    let server = Arc::new(HttpSessionClient::new(&config)?);

    let prefs_store = PreferencesStore::default();
    let prefs = prefs_store.load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, path = %prefs_store.path().display(), "Preferences unreadable, using defaults");
        Preferences::default()
    });

    let model = Arc::new(AppModel::new(prefs));
    model.set_labels(audio::get_device_name(), config.base_url.clone()).await;

    let element = Arc::new(RodioElement::new()?);
    let client = PlaybackClient::new(model.clone(), server, element, &config, prefs_store).await;
    if !client.visualizer().is_available() {
        tracing::info!("No analysis tap on this output, visualizer disabled");
    }

    let mut events = client.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match serde_json::to_string(&event) {
                Ok(detail) => tracing::debug!(event = event.kind.name(), %detail, "Media event"),
                Err(e) => tracing::warn!(error = %e, "Could not serialize media event"),
            }
        }
    });

    if let Some((id, kind)) = initial {
        let client = client.clone();
        tokio::spawn(async move {
            let _ = client.play_track(id, kind).await;
        });
    }

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &client).await;

    client.visualizer().stop();
    client.save_preferences().await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableFocusChange, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("mediaplayer-rs shutting down");
    Ok(())
}

/// `[song|episode] <id>` on the command line starts that track right away
fn parse_initial_track(mut args: impl Iterator<Item = String>) -> Result<Option<(u64, MediaKind)>> {
    let Some(first) = args.next() else {
        return Ok(None);
    };

    let (kind, id) = match MediaKind::parse(&first) {
        Some(kind) => (kind, args.next()),
        None => (MediaKind::Song, Some(first)),
    };

    let Some(id) = id else {
        anyhow::bail!("Usage: mediaplayer-rs [song|episode] <id>");
    };
    let id = id
        .parse::<u64>()
        .map_err(|_| anyhow::anyhow!("Invalid track id: {id}"))?;

    Ok(Some((id, kind)))
}

async fn run_app<S: SessionServer, M: MediaElement>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    client: &PlaybackClient<S, M>,
) -> io::Result<()> {
    let model = client.model();
    let mut last_tick = Instant::now();

    loop {
        if last_tick.elapsed() >= TICK_INTERVAL {
            last_tick = Instant::now();
            client.tick().await;
        }

        model.auto_clear_old_notifications().await;

        let playback = model.get_playback_state().await;
        let queue = model.get_queue_view().await;
        let ui_state = model.get_ui_state().await;
        let bars = client.visualizer().frame();

        terminal.draw(|f| {
            AppView::render(f, &playback, &queue, &ui_state, &bars);
        })?;

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => client.handle_key_event(key).await,
                Event::FocusLost => client.on_focus_lost().await,
                Event::FocusGained => client.on_focus_gained().await,
                _ => {}
            }
        }

        if model.should_quit().await {
            break;
        }
    }

    Ok(())
}
