use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

#[allow(async_fn_in_trait)]
pub trait SettingsRepository {
    async fn read_settings(&self) -> Result<Settings, String>;
    async fn write_settings(&self, settings: Settings) -> Result<(), String>;
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub weight_unit: WeightUnit,
    pub theme: Theme,
}

impl Settings {
    /// Resolve `Theme::System` with the color scheme preferred by the platform.
    #[must_use]
    pub fn current_theme(&self, system_prefers_dark: bool) -> Theme {
        match self.theme {
            Theme::System => {
                if system_prefers_dark {
                    Theme::Dark
                } else {
                    Theme::Light
                }
            }
            Theme::Light | Theme::Dark => self.theme,
        }
    }
}

#[derive(
    Serialize, Deserialize, Display, EnumIter, EnumString, Debug, Default, Clone, Copy, PartialEq, Eq,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lbs,
}

#[derive(
    Serialize, Deserialize, Display, EnumIter, EnumString, Debug, Default, Clone, Copy, PartialEq, Eq,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Theme {
    #[default]
    System,
    Light,
    Dark,
}
