use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::RwLock,
};

use crate::cycles::validation::validate_minutes;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimerSettings {
    /// Duration used when `start` is given no minutes.
    pub default_minutes: u32,
    pub tick_interval_ms: u64,
    /// Mirror the countdown into the terminal title while a cycle runs.
    pub mirror_title: bool,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            default_minutes: 25,
            tick_interval_ms: 1000,
            mirror_title: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct UserSettings {
    timer: TimerSettings,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            match serde_json::from_str(&contents) {
                Ok(data) => data,
                Err(err) => {
                    log::warn!(
                        "Ignoring unreadable settings at {}: {err}",
                        path.display()
                    );
                    UserSettings::default()
                }
            }
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn timer(&self) -> TimerSettings {
        match self.data.read() {
            Ok(guard) => guard.timer.clone(),
            Err(poisoned) => poisoned.into_inner().timer.clone(),
        }
    }

    pub fn update_timer(&self, settings: TimerSettings) -> Result<()> {
        validate_minutes(settings.default_minutes)?;
        if settings.tick_interval_ms == 0 {
            bail!("tick interval must be greater than zero");
        }

        let mut guard = match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.timer = settings;
        self.persist(&guard)
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create settings directory {}", parent.display())
                })?;
            }
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

/// `$POMODORO_SETTINGS`, else `$HOME/.config/pomodoro/settings.json`, else the
/// working directory.
pub fn default_settings_path() -> PathBuf {
    if let Ok(path) = std::env::var("POMODORO_SETTINGS") {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    match std::env::var("HOME") {
        Ok(home) if !home.is_empty() => PathBuf::from(home)
            .join(".config")
            .join("pomodoro")
            .join("settings.json"),
        _ => PathBuf::from("pomodoro-settings.json"),
    }
}
