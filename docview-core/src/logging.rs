use std::{
    path::Path,
    sync::OnceLock,
    sync::atomic::{AtomicUsize, Ordering},
};

use tracing::Metadata;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    EnvFilter,
    filter::LevelFilter,
    fmt::{
        self, FmtContext,
        format::{FormatEvent, FormatFields, Writer},
    },
    layer::SubscriberExt,
    prelude::*,
};

use crate::config::{LogRotation, LoggingConfig};

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Logger already initialized")]
    AlreadyInitialized,

    #[error("Failed to create log directory: {0}")]
    DirectoryCreationFailed(#[from] std::io::Error),

    #[error("Invalid log level directive: {0}")]
    InvalidLevel(String),

    #[error("Failed to create file appender: {0}")]
    Appender(String),
}

pub struct Logger;

impl Logger {
    /// Call **once** near the start of `main` and keep the guard alive until exit.
    ///
    /// Only a file layer is installed: the terminal belongs to the UI.
    pub fn init_tracing(config: &LoggingConfig) -> Result<WorkerGuard, LoggingError> {
        if SEQ.set(AtomicUsize::new(1)).is_err() {
            return Err(LoggingError::AlreadyInitialized);
        }

        let log_dir: &Path = config.log_dir.as_path();
        std::fs::create_dir_all(log_dir)?;

        let rotation = match config.rotation {
            LogRotation::Never => Rotation::NEVER,
            LogRotation::Daily => Rotation::DAILY,
        };

        // <log_dir>/<prefix>.YYYY-MM-DD.log
        let file = RollingFileAppender::builder()
            .rotation(rotation)
            .filename_prefix(config.log_file_prefix.as_str())
            .filename_suffix("log")
            .build(log_dir)
            .map_err(|e| LoggingError::Appender(e.to_string()))?;
        let (writer, guard) = tracing_appender::non_blocking(file);

        let file_layer = fmt::layer()
            .event_format(SeqFileMod)
            .with_writer(writer)
            .with_ansi(false)
            .with_filter(env_filter(&config.level)?);

        tracing_subscriber::registry()
            .with(file_layer)
            .try_init()
            .map_err(|_| LoggingError::AlreadyInitialized)?;

        Ok(guard)
    }
}

fn env_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    let level: LevelFilter = level
        .trim()
        .parse()
        .map_err(|_| LoggingError::InvalidLevel(level.to_string()))?;
    Ok(EnvFilter::from_default_env().add_directive(level.into()))
}

static SEQ: OnceLock<AtomicUsize> = OnceLock::new();

/// Custom formatter: `[SEQ] LEVEL [file:line mod::path] message`
struct SeqFileMod;

impl<S, N> FormatEvent<S, N> for SeqFileMod
where
    S: tracing::Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut w: Writer<'_>,
        ev: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let seq: usize = SEQ
            .get()
            .map_or(0, |counter| counter.fetch_add(1, Ordering::Relaxed));

        let meta: &'static Metadata<'static> = ev.metadata();
        write!(
            w,
            "{seq:06} {:5} [{}:{} {}] ",
            meta.level(),
            meta.file().unwrap_or("??"),
            meta.line().unwrap_or(0),
            meta.module_path().unwrap_or("???"),
        )?;

        ctx.field_format().format_fields(w.by_ref(), ev)?;
        writeln!(w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_level_is_reported() {
        assert!(matches!(
            env_filter("not a level!!"),
            Err(LoggingError::InvalidLevel(_))
        ));
        assert!(matches!(
            env_filter("degub"),
            Err(LoggingError::InvalidLevel(_))
        ));
        assert!(env_filter("debug").is_ok());
        assert!(env_filter("WARN").is_ok());
    }

    #[test]
    fn second_init_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            log_dir: dir.path().join("logs"),
            ..LoggingConfig::default()
        };

        let _guard = Logger::init_tracing(&config).unwrap();
        assert!(dir.path().join("logs").is_dir());
        assert!(matches!(
            Logger::init_tracing(&config),
            Err(LoggingError::AlreadyInitialized)
        ));
    }
}
