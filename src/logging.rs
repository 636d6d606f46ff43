//! Tracing setup for mediaplayer-rs
//!
//! The terminal belongs to ratatui, so nothing is printed. Events go to
//! `.logs/mediaplayer-rs.<date>`, one file per day.
//!
//! Targets worth filtering on with `RUST_LOG`:
//! - `mediaplayer_rs::controller`: transport actions, queue steps, syncs, media events
//! - `mediaplayer_rs::model::session_client`: every endpoint request and its outcome
//! - `mediaplayer_rs::audio`: source fetch/decode and the output thread
//! - `reqwest`, `rodio`: the HTTP and audio stacks underneath

use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

const LOG_DIR: &str = ".logs";
const LOG_FILE_PREFIX: &str = "mediaplayer-rs";

/// Crate at debug, the HTTP and audio stacks at info, everything else at warn.
const DEFAULT_DIRECTIVES: &[&str] = &["mediaplayer_rs=debug", "reqwest=info", "rodio=info", "warn"];

fn default_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_DIRECTIVES.join(","))
}

/// Install the file subscriber. `RUST_LOG` replaces the default directives.
pub fn init_logging() -> anyhow::Result<()> {
    fs::create_dir_all(LOG_DIR)?;

    let appender = RollingFileAppender::new(Rotation::DAILY, LOG_DIR, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    // Buffered lines are flushed when the guard drops; it has to outlive main
    let _: &'static WorkerGuard = Box::leak(Box::new(guard));

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter());

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_span_events(FmtSpan::CLOSE),
        )
        .init();

    tracing::info!(dir = LOG_DIR, directives = %DEFAULT_DIRECTIVES.join(","), "Logging to file");
    Ok(())
}

/// Log the outcome of a session endpoint call
#[macro_export]
macro_rules! log_api_result {
    ($operation:expr, $result:expr) => {
        match &$result {
            Ok(_) => tracing::info!(operation = $operation, "Session request succeeded"),
            Err(e) => tracing::error!(operation = $operation, error = %e, "Session request failed"),
        }
    };
}

/// Log a session endpoint call before it goes out
#[macro_export]
macro_rules! log_api_request {
    ($operation:expr, $($field:tt)*) => {
        tracing::debug!(operation = $operation, $($field)*, "Session request");
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directives_parse() {
        for directive in DEFAULT_DIRECTIVES {
            assert!(directive.parse::<tracing_subscriber::filter::Directive>().is_ok(), "{directive}");
        }
    }
}
