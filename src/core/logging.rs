use crate::shared::paths::ensure_dir;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Target families that get their own log file; everything else goes to
/// `system.log`.
pub const LOG_FAMILIES: [&str; 2] = ["tasks", "suggest"];

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Failed to create logs directory: {0}")]
    Directory(#[from] std::io::Error),
    #[error("Failed to set global tracing subscriber: {0}")]
    Subscriber(String),
}

/// Keeps the background log writers alive; drop it to flush and stop them.
pub struct LoggingGuards {
    _guards: Vec<WorkerGuard>,
}

struct FamilyWriter {
    writers: HashMap<String, NonBlocking>,
    system_writer: NonBlocking,
}

/// `tasks` covers `tasks` and `tasks::storage` but not `taskset`.
fn belongs_to(target: &str, family: &str) -> bool {
    target == family
        || target
            .strip_prefix(family)
            .is_some_and(|rest| rest.starts_with("::"))
}

impl<'a> MakeWriter<'a> for FamilyWriter {
    type Writer = NonBlocking;

    fn make_writer(&'a self) -> Self::Writer {
        self.system_writer.clone()
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        let target = meta.target();

        self.writers
            .iter()
            .find(|(family, _)| belongs_to(target, family))
            .map(|(_, writer)| writer.clone())
            .unwrap_or_else(|| self.system_writer.clone())
    }
}

/// Installs the global subscriber writing daily-rolled files under
/// `log_dir`. `RUST_LOG` overrides `default_filter`.
pub fn init_logging(log_dir: &Path, default_filter: &str) -> Result<LoggingGuards, LoggingError> {
    ensure_dir(log_dir)?;

    let mut guards = Vec::new();
    let mut family_writers = HashMap::new();

    for family in LOG_FAMILIES {
        let file_appender =
            RollingFileAppender::new(Rotation::DAILY, log_dir, format!("{}.log", family));
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        family_writers.insert(family.to_string(), non_blocking);
        guards.push(guard);
    }

    let system_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "system.log");
    let (system_writer, system_guard) = tracing_appender::non_blocking(system_appender);
    guards.push(system_guard);

    let writer = FamilyWriter {
        writers: family_writers,
        system_writer,
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .try_init()
        .map_err(|e| LoggingError::Subscriber(e.to_string()))?;

    tracing::info!(target: "system", "Logging initialized at {:?}", log_dir);

    Ok(LoggingGuards { _guards: guards })
}
