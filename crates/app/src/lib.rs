#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod log;
pub mod paths;
pub mod settings;

pub use paths::DataPaths;
pub use settings::{Settings, SettingsRepository, Theme, WeightUnit};
