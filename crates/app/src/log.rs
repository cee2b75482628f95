use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use chrono::Local;
use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};
use serde::{Deserialize, Serialize};

/// Number of entries kept by a repository.
pub const MAX_ENTRIES: usize = 100;

/// Targets which are printed but not stored, as they log every database statement.
const UNSTORED_TARGETS: &[&str] = &["sqlx"];

static LOG: Mutex<Option<Arc<Mutex<dyn Repository>>>> = Mutex::new(None);

#[allow(clippy::missing_errors_doc)]
pub trait Repository: Send + Sync + 'static {
    fn read_entries(&self) -> Result<VecDeque<Entry>, Error>;
    fn write_entry(&self, entry: Entry) -> Result<(), Error>;
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{0}")]
    Unknown(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub time: String,
    #[serde(with = "LevelDef")]
    pub level: Level,
    pub message: String,
}

#[derive(Serialize, Deserialize)]
#[serde(remote = "Level")]
pub enum LevelDef {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

static LOGGER: Logger = Logger;

/// Install a logger which prints to stderr and stores recent entries in `repository`.
///
/// Records of `sqlx` are only printed.
///
/// # Errors
///
/// Returns an error if the logger has already been initialized.
pub fn init(
    repository: Arc<Mutex<dyn Repository>>,
    max_level: LevelFilter,
) -> Result<(), SetLoggerError> {
    if let Ok(mut log) = LOG.lock() {
        *log = Some(repository);
    }
    log::set_logger(&LOGGER).map(|()| log::set_max_level(max_level))
}

struct Logger;

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let time = Local::now().format("%b %d %H:%M:%S").to_string();
        eprintln!(
            "{time} {:<5} {}: {}",
            record.level(),
            record.target(),
            record.args()
        );

        if !is_stored(record.target()) {
            return;
        }

        let Ok(log) = LOG.lock() else {
            return;
        };
        if let Some(repository) = log.as_ref() {
            if let Ok(repository) = repository.lock() {
                if let Err(err) = repository.write_entry(Entry {
                    time,
                    level: record.level(),
                    message: record.args().to_string(),
                }) {
                    eprintln!("failed to store log entry: {err}");
                }
            }
        }
    }

    fn flush(&self) {}
}

fn is_stored(target: &str) -> bool {
    !UNSTORED_TARGETS.iter().any(|unstored| {
        target
            .strip_prefix(unstored)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
    })
}
