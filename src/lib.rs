pub mod core;
pub mod plugins;
pub mod shared;

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::logging::{init_logging, LoggingError, LoggingGuards};
use crate::core::settings::{load_settings_from, AppSettings};
use crate::plugins::tasks::errors::SuggestError;
use crate::plugins::tasks::storage::KeyValuePersistence;
use crate::plugins::tasks::suggest::{HttpTagSuggester, TagSuggester};
use crate::plugins::tasks::TasksStore;
use crate::shared::errors::StorageError;
use crate::shared::paths::{get_log_dir, get_storage_dir};

#[derive(Error, Debug)]
pub enum InitError {
    #[error(transparent)]
    Logging(#[from] LoggingError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Suggest(#[from] SuggestError),
}

/// Everything a front end needs: the store, the optional suggester and the
/// settings they were built from.
pub struct TaskFlow {
    pub store: TasksStore,
    pub suggester: Option<Box<dyn TagSuggester>>,
    pub settings: AppSettings,
    data_dir: PathBuf,
    _logging: Option<LoggingGuards>,
}

impl TaskFlow {
    /// Builds the app around `data_dir` without touching global logging.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, InitError> {
        let data_dir = data_dir.into();
        let settings = load_settings_from(&data_dir);

        let store = TasksStore::open(Box::new(KeyValuePersistence::in_dir(&data_dir)))?;

        let suggester = HttpTagSuggester::from_settings(&settings.suggestion)?
            .map(|s| Box::new(s) as Box<dyn TagSuggester>);
        if suggester.is_none() {
            tracing::info!(target: "suggest", "No suggestion endpoint configured, tag suggestions disabled");
        }

        Ok(Self {
            store,
            suggester,
            settings,
            data_dir,
            _logging: None,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

/// Initializes logging and opens the app in the default data directory
/// (or `data_dir` when given).
pub fn run(data_dir: Option<PathBuf>) -> Result<TaskFlow, InitError> {
    let data_dir = data_dir.unwrap_or_else(get_storage_dir);
    let settings = load_settings_from(&data_dir);

    // Logging first, so store initialization is recorded.
    let guards = init_logging(&get_log_dir(&data_dir), &settings.log_filter)?;

    let mut app = TaskFlow::open(data_dir)?;
    app._logging = Some(guards);
    Ok(app)
}
