// Import necessary libraries and modules for file I/O and serialization.
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::SettingsError;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

// Application settings, stored as JSON under the data directory.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub openai_api_key: Option<String>, // Optional API key for OpenAI services.
    pub model: String,
    pub temperature: f32,
    pub request_timeout_secs: Option<u64>, // None waits on the Game Master forever.
    pub debug_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            openai_api_key: None,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            request_timeout_secs: Some(120),
            debug_mode: false,
        }
    }
}

// Where logs and settings live: <home>/linglong/data
pub fn data_dir() -> Result<PathBuf, SettingsError> {
    let home_dir = dir::home_dir().ok_or(SettingsError::NoHomeDir)?;
    Ok(home_dir.join("linglong").join("data"))
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_path() -> Result<PathBuf, SettingsError> {
        Ok(data_dir()?.join("settings.json"))
    }

    pub fn display_path() -> String {
        Self::default_path()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|_| "~/linglong/data/settings.json".to_string())
    }

    // Load settings from the default location, falling back to defaults when no file exists yet.
    // The environment fills in a missing API key.
    pub fn load() -> Result<Self, SettingsError> {
        let path = Self::default_path()?;
        let mut settings = match Self::load_settings_from_file(&path) {
            Ok(settings) => settings,
            Err(SettingsError::IO(e)) if e.kind() == io::ErrorKind::NotFound => Self::default(),
            Err(e) => return Err(e),
        };
        settings.fill_api_key_from(std::env::var(API_KEY_ENV).ok());
        Ok(settings)
    }

    pub fn save(&self) -> Result<(), SettingsError> {
        self.save_to_file(Self::default_path()?)
    }

    pub fn load_settings_from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let data = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&data)?;
        Ok(settings)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        let data = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?; // Create the directory if it doesn't exist.
        }
        let mut file = fs::File::create(path)?;
        file.write_all(data.as_bytes())?;
        Ok(())
    }

    pub fn fill_api_key_from(&mut self, key: Option<String>) {
        if self.openai_api_key.as_deref().is_none_or(str::is_empty) {
            self.openai_api_key = key.filter(|key| !key.trim().is_empty());
        }
    }
}
