use std::{
    collections::VecDeque,
    fs, io,
    path::{Path, PathBuf},
};

use fitlog_app::{Settings, SettingsRepository, log};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use strum::AsRefStr;

/// Small JSON object on disk mapping keys to values.
///
/// Messages must not be logged from here. The logger writes its entries through this store while
/// holding its lock.
#[derive(Debug, Clone)]
pub struct KeyValueStore {
    path: PathBuf,
}

#[derive(AsRefStr, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    #[strum(serialize = "settings")]
    Settings,
    #[strum(serialize = "log")]
    Log,
}

#[derive(thiserror::Error, Debug)]
pub enum KeyValueError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl KeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get<T: DeserializeOwned>(&self, key: Key) -> Result<Option<T>, KeyValueError> {
        match self.read()?.remove(key.as_ref()) {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub fn set<T: Serialize>(&self, key: Key, value: &T) -> Result<(), KeyValueError> {
        let mut entries = self.read()?;
        entries.insert(key.as_ref().to_string(), serde_json::to_value(value)?);
        self.write(&entries)
    }

    pub fn remove(&self, key: Key) -> Result<(), KeyValueError> {
        let mut entries = self.read()?;
        if entries.remove(key.as_ref()).is_some() {
            self.write(&entries)?;
        }
        Ok(())
    }

    fn read(&self) -> Result<Map<String, Value>, KeyValueError> {
        match fs::read(&self.path) {
            Ok(content) => Ok(serde_json::from_slice(&content)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Map::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, entries: &Map<String, Value>) -> Result<(), KeyValueError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_vec_pretty(entries)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl SettingsRepository for KeyValueStore {
    async fn read_settings(&self) -> Result<Settings, String> {
        self.get(Key::Settings)
            .map(Option::unwrap_or_default)
            .map_err(|err| err.to_string())
    }

    async fn write_settings(&self, settings: Settings) -> Result<(), String> {
        self.set(Key::Settings, &settings)
            .map_err(|err| err.to_string())
    }
}

/// Recent log entries, newest first.
pub struct Log(KeyValueStore);

impl Log {
    #[must_use]
    pub fn new(store: KeyValueStore) -> Self {
        Self(store)
    }
}

impl log::Repository for Log {
    fn read_entries(&self) -> Result<VecDeque<log::Entry>, log::Error> {
        self.0
            .get(Key::Log)
            .map(Option::unwrap_or_default)
            .map_err(|err| log::Error::Unknown(err.to_string()))
    }

    fn write_entry(&self, entry: log::Entry) -> Result<(), log::Error> {
        let mut entries = self.read_entries()?;
        entries.push_front(entry);
        entries.truncate(log::MAX_ENTRIES);
        self.0
            .set(Key::Log, &entries)
            .map_err(|err| log::Error::Unknown(err.to_string()))
    }
}
